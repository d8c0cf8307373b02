//! Predicate registry
//!
//! Maps predicate names to a uniform invocation. Built-ins see the field value
//! coerced to a string; custom predicates see the raw value and the whole
//! request. Built once at setup and shared read-only by every session.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::format::to_display_string;
use crate::location::RequestData;
use crate::predicates::{BuiltinFn, BUILTINS};

/// Signature of a custom predicate: raw value, constraint arguments, request
pub type CustomFn = dyn Fn(Option<&Value>, &[Value], &RequestData) -> bool + Send + Sync;

#[derive(Clone)]
pub enum Predicate {
    Builtin(BuiltinFn),
    Custom(Arc<CustomFn>),
}

impl Predicate {
    pub fn is_builtin(&self) -> bool {
        matches!(self, Predicate::Builtin(_))
    }

    pub fn invoke(&self, value: Option<&Value>, args: &[Value], request: &RequestData) -> bool {
        match self {
            Predicate::Builtin(check) => check(&to_display_string(value), args),
            Predicate::Custom(check) => check(value, args, request),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Builtin(_) => f.write_str("Predicate::Builtin"),
            Predicate::Custom(_) => f.write_str("Predicate::Custom"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PredicateRegistry {
    entries: HashMap<String, Predicate>,
}

impl PredicateRegistry {
    /// Registry holding only the built-in predicates
    pub fn builtin() -> Self {
        Self::register(BUILTINS, Vec::new())
    }

    /// Merge built-ins and custom predicates into one table.
    ///
    /// Custom predicates are inserted last, so one registered under a
    /// built-in's name replaces it.
    pub fn register<I>(builtins: &[(&str, BuiltinFn)], custom: I) -> Self
    where
        I: IntoIterator<Item = (String, Arc<CustomFn>)>,
    {
        let mut entries: HashMap<String, Predicate> = builtins
            .iter()
            .map(|(name, check)| (name.to_string(), Predicate::Builtin(*check)))
            .collect();

        for (name, check) in custom {
            if let Some(previous) = entries.insert(name.clone(), Predicate::Custom(check)) {
                tracing::debug!(
                    predicate = %name,
                    builtin = previous.is_builtin(),
                    "custom predicate shadows an existing entry"
                );
            }
        }

        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn custom(check: fn(Option<&Value>, &[Value], &RequestData) -> bool) -> Arc<CustomFn> {
        Arc::new(check)
    }

    #[test]
    fn test_builtin_registry() {
        let registry = PredicateRegistry::builtin();
        assert_eq!(registry.len(), BUILTINS.len());
        assert!(registry.get("isInt").unwrap().is_builtin());
        assert!(registry.contains("matches"));
        assert!(!registry.contains("toInt"));
    }

    #[test]
    fn test_builtins_receive_coerced_value() {
        let registry = PredicateRegistry::builtin();
        let request = RequestData::new();
        let is_int = registry.get("isInt").unwrap();

        assert!(is_int.invoke(Some(&json!(17)), &[], &request));
        assert!(is_int.invoke(Some(&json!("17")), &[], &request));
        assert!(!is_int.invoke(None, &[], &request));
    }

    #[test]
    fn test_custom_receives_raw_value_and_request() {
        let registry = PredicateRegistry::register(
            BUILTINS,
            vec![(
                "isArray".to_string(),
                custom(|value, _, _| matches!(value, Some(Value::Array(_)))),
            ), (
                "matchesBodyField".to_string(),
                custom(|value, args, request| {
                    let other = args.first().and_then(Value::as_str).unwrap_or_default();
                    value.is_some() && value == request.body.get(other)
                }),
            )],
        );
        let request = RequestData::new()
            .with_body("password", "hunter2")
            .with_body("confirm", "hunter2");

        let is_array = registry.get("isArray").unwrap();
        assert!(!is_array.is_builtin());
        assert!(is_array.invoke(Some(&json!([1, 2])), &[], &request));
        assert!(!is_array.invoke(Some(&json!("1,2")), &[], &request));

        let same = registry.get("matchesBodyField").unwrap();
        assert!(same.invoke(Some(&json!("hunter2")), &[json!("password")], &request));
        assert!(!same.invoke(Some(&json!("other")), &[json!("password")], &request));
    }

    #[test]
    fn test_custom_shadows_builtin() {
        let registry = PredicateRegistry::register(
            BUILTINS,
            vec![("isInt".to_string(), custom(|_, _, _| true))],
        );
        let request = RequestData::new();
        let is_int = registry.get("isInt").unwrap();

        assert!(!is_int.is_builtin());
        assert!(is_int.invoke(Some(&json!("not a number")), &[], &request));
        assert_eq!(registry.len(), BUILTINS.len());
    }
}
