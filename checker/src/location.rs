//! Request data buckets and field location
//!
//! A request exposes four buckets of named values. Fields are looked up by
//! name, which doubles as a path (`user.tags[0]`), or by explicit segments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ValidatorError;
use crate::format::is_truthy;

/// One of the four request data sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Params,
    Query,
    Body,
    Header,
}

impl Location {
    /// Locator precedence, first match wins
    pub const PRECEDENCE: [Location; 4] = [
        Location::Params,
        Location::Query,
        Location::Body,
        Location::Header,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Params => "params",
            Location::Query => "query",
            Location::Body => "body",
            Location::Header => "header",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = ValidatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "params" => Ok(Location::Params),
            "query" => Ok(Location::Query),
            "body" => Ok(Location::Body),
            "header" => Ok(Location::Header),
            other => Err(ValidatorError::UnknownLocation(other.to_string())),
        }
    }
}

/// Where a check should read its field from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSpec {
    /// Resolve with the field locator
    Any,
    At(Location),
}

impl From<Location> for LocationSpec {
    fn from(location: Location) -> Self {
        LocationSpec::At(location)
    }
}

/// A field reference: a name (also read as a lookup path) or explicit path
/// segments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldRef {
    Name(String),
    Segments(Vec<String>),
}

impl From<&str> for FieldRef {
    fn from(name: &str) -> Self {
        FieldRef::Name(name.to_string())
    }
}

impl From<String> for FieldRef {
    fn from(name: String) -> Self {
        FieldRef::Name(name)
    }
}

impl From<Vec<&str>> for FieldRef {
    fn from(segments: Vec<&str>) -> Self {
        FieldRef::Segments(segments.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for FieldRef {
    fn from(segments: Vec<String>) -> Self {
        FieldRef::Segments(segments)
    }
}

impl FieldRef {
    /// Look the field up in one bucket.
    ///
    /// A name that exists verbatim as a key wins over its path reading, so a
    /// body key literally called `a.b` is still found.
    pub fn lookup<'a>(&self, bucket: &'a Map<String, Value>) -> Option<&'a Value> {
        match self {
            FieldRef::Name(name) => match bucket.get(name) {
                Some(value) => Some(value),
                None => {
                    let segments = parse_path(name);
                    if segments.len() > 1 {
                        walk(bucket, &segments)
                    } else {
                        None
                    }
                }
            },
            FieldRef::Segments(segments) => walk(bucket, segments),
        }
    }
}

/// Split `a.b[0]["c"]` into `["a", "b", "0", "c"]`
fn parse_path(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                let mut index = String::new();
                for inner in chars.by_ref() {
                    if inner == ']' {
                        break;
                    }
                    index.push(inner);
                }
                let index = index.trim_matches(|q| q == '"' || q == '\'');
                segments.push(index.to_string());
            }
            other => current.push(other),
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn walk<'a>(bucket: &'a Map<String, Value>, segments: &[String]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = bucket.get(first)?;
    for segment in rest {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// The four buckets of an already-parsed request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestData {
    pub params: Map<String, Value>,
    pub query: Map<String, Value>,
    pub body: Map<String, Value>,
    pub headers: Map<String, Value>,
}

impl RequestData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn bucket(&self, location: Location) -> &Map<String, Value> {
        match location {
            Location::Params => &self.params,
            Location::Query => &self.query,
            Location::Body => &self.body,
            Location::Header => &self.headers,
        }
    }

    pub fn get(&self, location: Location, field: &FieldRef) -> Option<&Value> {
        field.lookup(self.bucket(location))
    }

    /// Find the bucket currently holding `field`.
    ///
    /// Path params only count when their value is truthy; the other buckets
    /// count on key presence, so `0` or `false` in the body is still found.
    pub fn locate(&self, field: &FieldRef) -> Option<Location> {
        Location::PRECEDENCE.into_iter().find(|&location| {
            let value = self.get(location, field);
            match location {
                Location::Params => is_truthy(value),
                _ => value.is_some(),
            }
        })
    }

    /// Resolve a location spec for `field`: fixed locations pass through,
    /// `Any` goes through [`RequestData::locate`]
    pub fn resolve(&self, spec: LocationSpec, field: &FieldRef) -> Option<Location> {
        match spec {
            LocationSpec::At(location) => Some(location),
            LocationSpec::Any => self.locate(field),
        }
    }
}
