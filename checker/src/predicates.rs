//! Built-in predicates
//!
//! String checks in the shape of the common validator libraries: every
//! predicate receives the coerced field value and the constraint's argument
//! list, and answers yes or no. Options are read from the first argument when
//! it is an object (`{"min": 1, "max": 10}`).

use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use crate::format::to_display_string;

/// Signature shared by every built-in predicate
pub type BuiltinFn = fn(&str, &[Value]) -> bool;

/// The declared set of built-in predicates, by the names schemas refer to
pub const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("isAlpha", is_alpha),
    ("isAlphanumeric", is_alphanumeric),
    ("isAscii", is_ascii),
    ("isBase64", is_base64),
    ("isBoolean", is_boolean),
    ("isDate", is_date),
    ("isDecimal", is_decimal),
    ("isEmail", is_email),
    ("isEmpty", is_empty),
    ("isFloat", is_float),
    ("isHexColor", is_hex_color),
    ("isHexadecimal", is_hexadecimal),
    ("isIP", is_ip),
    ("isISO8601", is_iso8601),
    ("isIn", is_in),
    ("isInt", is_int),
    ("isJSON", is_json),
    ("isLength", is_length),
    ("isLowercase", is_lowercase),
    ("isMobilePhone", is_mobile_phone),
    ("isNumeric", is_numeric),
    ("isSemVer", is_semver),
    ("isURL", is_url),
    ("isUUID", is_uuid),
    ("isUppercase", is_uppercase),
    ("contains", contains),
    ("equals", equals),
    ("matches", matches),
];

lazy_static! {
    static ref INT_REGEX: Regex = Regex::new(r"^[-+]?(?:0|[1-9][0-9]*)$").unwrap();
    static ref INT_LEADING_ZEROES_REGEX: Regex = Regex::new(r"^[-+]?[0-9]+$").unwrap();
    static ref FLOAT_REGEX: Regex =
        Regex::new(r"^[-+]?(?:[0-9]*\.)?[0-9]+(?:[eE][-+]?[0-9]+)?$").unwrap();
    static ref NUMERIC_REGEX: Regex = Regex::new(r"^[-+]?(?:[0-9]*\.)?[0-9]+$").unwrap();
    static ref DECIMAL_REGEX: Regex = Regex::new(r"^[-+]?(?:[0-9]+)?(?:\.[0-9]+)?$").unwrap();
    static ref ALPHA_REGEX: Regex = Regex::new(r"^[A-Za-z]+$").unwrap();
    static ref ALPHANUMERIC_REGEX: Regex = Regex::new(r"^[0-9A-Za-z]+$").unwrap();
    static ref ASCII_REGEX: Regex = Regex::new(r"^[\x00-\x7F]+$").unwrap();
    static ref HEXADECIMAL_REGEX: Regex = Regex::new(r"^(?:0[xXhH])?[0-9A-Fa-f]+$").unwrap();
    static ref HEX_COLOR_REGEX: Regex =
        Regex::new(r"^#?(?:[0-9A-Fa-f]{3}|[0-9A-Fa-f]{4}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").unwrap();
    static ref BASE64_REGEX: Regex = Regex::new(r"^[A-Za-z0-9+/]+={0,2}$").unwrap();
    static ref MOBILE_PHONE_REGEX: Regex = Regex::new(r"^\+?[1-9][0-9]{6,14}$").unwrap();

    /// Local part, then one or more dot-separated DNS labels
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$"
    ).unwrap();

    /// Optional http/https/ftp scheme, optional credentials, host with TLD,
    /// optional port and path
    static ref URL_REGEX: Regex = Regex::new(
        r"(?i)^(?:(?:https?|ftp)://)?(?:[^\s:@/]+(?::[^\s:@/]*)?@)?(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,}(?::[0-9]{1,5})?(?:[/?#][^\s]*)?$"
    ).unwrap();

    /// Semver pattern: major.minor.patch with optional pre-release
    static ref SEMVER_REGEX: Regex = Regex::new(
        r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$"
    ).unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Named option from the leading options object
fn option<'a>(args: &'a [Value], key: &str) -> Option<&'a Value> {
    args.first()?.as_object()?.get(key)
}

fn option_f64(args: &[Value], key: &str) -> Option<f64> {
    option(args, key).and_then(as_f64)
}

fn option_bool(args: &[Value], key: &str) -> Option<bool> {
    option(args, key).and_then(Value::as_bool)
}

/// Numbers and numeric strings both count as numbers
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn within_bounds(number: f64, args: &[Value]) -> bool {
    option_f64(args, "min").map_or(true, |min| number >= min)
        && option_f64(args, "max").map_or(true, |max| number <= max)
        && option_f64(args, "gt").map_or(true, |gt| number > gt)
        && option_f64(args, "lt").map_or(true, |lt| number < lt)
}

fn argument_string(args: &[Value], index: usize) -> String {
    to_display_string(args.get(index))
}

// ─────────────────────────────────────────────────────────────────────────────
// Numbers
// ─────────────────────────────────────────────────────────────────────────────

pub fn is_int(value: &str, args: &[Value]) -> bool {
    let pattern = if option_bool(args, "allow_leading_zeroes") == Some(false) {
        &*INT_REGEX
    } else {
        &*INT_LEADING_ZEROES_REGEX
    };
    if !pattern.is_match(value) {
        return false;
    }
    match value.parse::<f64>() {
        Ok(number) => within_bounds(number, args),
        Err(_) => false,
    }
}

pub fn is_float(value: &str, args: &[Value]) -> bool {
    if !FLOAT_REGEX.is_match(value) {
        return false;
    }
    match value.parse::<f64>() {
        Ok(number) => within_bounds(number, args),
        Err(_) => false,
    }
}

pub fn is_numeric(value: &str, _args: &[Value]) -> bool {
    NUMERIC_REGEX.is_match(value)
}

pub fn is_decimal(value: &str, _args: &[Value]) -> bool {
    value.bytes().any(|b| b.is_ascii_digit()) && DECIMAL_REGEX.is_match(value)
}

// ─────────────────────────────────────────────────────────────────────────────
// Character classes
// ─────────────────────────────────────────────────────────────────────────────

pub fn is_alpha(value: &str, _args: &[Value]) -> bool {
    ALPHA_REGEX.is_match(value)
}

pub fn is_alphanumeric(value: &str, _args: &[Value]) -> bool {
    ALPHANUMERIC_REGEX.is_match(value)
}

pub fn is_ascii(value: &str, _args: &[Value]) -> bool {
    ASCII_REGEX.is_match(value)
}

pub fn is_hexadecimal(value: &str, _args: &[Value]) -> bool {
    HEXADECIMAL_REGEX.is_match(value)
}

pub fn is_hex_color(value: &str, _args: &[Value]) -> bool {
    HEX_COLOR_REGEX.is_match(value)
}

pub fn is_lowercase(value: &str, _args: &[Value]) -> bool {
    value == value.to_lowercase()
}

pub fn is_uppercase(value: &str, _args: &[Value]) -> bool {
    value == value.to_uppercase()
}

pub fn is_base64(value: &str, _args: &[Value]) -> bool {
    value.len() % 4 == 0 && BASE64_REGEX.is_match(value)
}

// ─────────────────────────────────────────────────────────────────────────────
// Formats
// ─────────────────────────────────────────────────────────────────────────────

/// Accepts `true`, `false`, `1`, `0`; `{"loose": true}` adds `yes`/`no`
pub fn is_boolean(value: &str, args: &[Value]) -> bool {
    if matches!(value, "true" | "false" | "1" | "0") {
        return true;
    }
    option_bool(args, "loose") == Some(true)
        && matches!(value.to_lowercase().as_str(), "true" | "false" | "yes" | "no")
}

pub fn is_email(value: &str, _args: &[Value]) -> bool {
    value.len() <= 254 && EMAIL_REGEX.is_match(value)
}

pub fn is_url(value: &str, _args: &[Value]) -> bool {
    value.len() <= 2083 && URL_REGEX.is_match(value)
}

/// Hyphenated UUID; an optional version argument (`4` or `"4"`) pins it
pub fn is_uuid(value: &str, args: &[Value]) -> bool {
    if value.len() != 36 {
        return false;
    }
    let Ok(uuid) = Uuid::try_parse(value) else {
        return false;
    };
    match args.first().map(|v| to_display_string(Some(v))) {
        None => true,
        Some(version) if version == "all" || version.is_empty() => true,
        Some(version) => version.parse::<usize>().ok() == Some(uuid.get_version_num()),
    }
}

pub fn is_ip(value: &str, args: &[Value]) -> bool {
    let Ok(ip) = value.parse::<IpAddr>() else {
        return false;
    };
    match argument_string(args, 0).as_str() {
        "4" => ip.is_ipv4(),
        "6" => ip.is_ipv6(),
        _ => true,
    }
}

/// JSON objects and arrays; bare primitives are not accepted
pub fn is_json(value: &str, _args: &[Value]) -> bool {
    matches!(
        serde_json::from_str::<Value>(value),
        Ok(Value::Object(_)) | Ok(Value::Array(_))
    )
}

pub fn is_iso8601(value: &str, _args: &[Value]) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Calendar date; `{"format": "%d/%m/%Y"}` overrides the default
/// `YYYY-MM-DD` / `YYYY/MM/DD` forms
pub fn is_date(value: &str, args: &[Value]) -> bool {
    if let Some(format) = option(args, "format").and_then(Value::as_str) {
        return NaiveDate::parse_from_str(value, format).is_ok();
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || NaiveDate::parse_from_str(value, "%Y/%m/%d").is_ok()
}

pub fn is_mobile_phone(value: &str, _args: &[Value]) -> bool {
    let compact: String = value.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    MOBILE_PHONE_REGEX.is_match(&compact)
}

pub fn is_semver(value: &str, _args: &[Value]) -> bool {
    SEMVER_REGEX.is_match(value)
}

// ─────────────────────────────────────────────────────────────────────────────
// Length and membership
// ─────────────────────────────────────────────────────────────────────────────

/// `{"ignore_whitespace": true}` treats whitespace-only input as empty
pub fn is_empty(value: &str, args: &[Value]) -> bool {
    if option_bool(args, "ignore_whitespace") == Some(true) {
        value.trim().is_empty()
    } else {
        value.is_empty()
    }
}

/// Character length within `{"min", "max"}`, or positional `(min, max)`
pub fn is_length(value: &str, args: &[Value]) -> bool {
    let (min, max) = match args.first() {
        Some(Value::Object(_)) => (
            option_f64(args, "min").unwrap_or(0.0),
            option_f64(args, "max"),
        ),
        Some(first) => (as_f64(first).unwrap_or(0.0), args.get(1).and_then(as_f64)),
        None => (0.0, None),
    };
    let len = value.chars().count() as f64;
    len >= min && max.map_or(true, |max| len <= max)
}

/// Membership in an array (by string form), an object's keys, or a string
pub fn is_in(value: &str, args: &[Value]) -> bool {
    match args.first() {
        Some(Value::Array(options)) => options
            .iter()
            .any(|option| to_display_string(Some(option)) == value),
        Some(Value::Object(map)) => map.contains_key(value),
        Some(Value::String(s)) => s.contains(value),
        _ => false,
    }
}

/// `contains(seed)`, optionally `{"ignoreCase": true}` as second argument
pub fn contains(value: &str, args: &[Value]) -> bool {
    let seed = argument_string(args, 0);
    let ignore_case = args
        .get(1)
        .and_then(Value::as_object)
        .and_then(|o| o.get("ignoreCase"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if ignore_case {
        value.to_lowercase().contains(&seed.to_lowercase())
    } else {
        value.contains(&seed)
    }
}

pub fn equals(value: &str, args: &[Value]) -> bool {
    value == argument_string(args, 0)
}

/// `matches(pattern, flags)` with flags drawn from `i`, `m`, `s`, `x`
pub fn matches(value: &str, args: &[Value]) -> bool {
    let Some(pattern) = args.first().and_then(Value::as_str) else {
        return false;
    };
    let flags: String = args
        .get(1)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .chars()
        .filter(|c| matches!(c, 'i' | 'm' | 's' | 'x'))
        .collect();
    let source = if flags.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{}){}", flags, pattern)
    };
    match Regex::new(&source) {
        Ok(regex) => regex.is_match(value),
        Err(err) => {
            tracing::debug!(pattern = %pattern, error = %err, "matches: invalid pattern");
            false
        }
    }
}
