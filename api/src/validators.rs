//! Host-specific predicates registered next to the built-ins

use checker::{FieldValidator, RequestData, ValidatorOptions};
use serde_json::Value;

pub const MAX_TAGS: usize = 10;

const RESERVED_NAMES: &[&str] = &["admin", "root", "system", "registry"];

/// Equal to the body field named by the first argument
pub fn same_as_body(value: Option<&Value>, args: &[Value], request: &RequestData) -> bool {
    let Some(other) = args.first().and_then(Value::as_str) else {
        return false;
    };
    value.is_some() && value == request.body.get(other)
}

/// Array of at most [`MAX_TAGS`] non-empty strings
pub fn is_tag_list(value: Option<&Value>, _args: &[Value], _request: &RequestData) -> bool {
    match value {
        Some(Value::Array(tags)) => {
            tags.len() <= MAX_TAGS
                && tags
                    .iter()
                    .all(|tag| tag.as_str().map_or(false, |s| !s.trim().is_empty()))
        }
        _ => false,
    }
}

pub fn not_reserved(value: Option<&Value>, _args: &[Value], _request: &RequestData) -> bool {
    match value.and_then(Value::as_str) {
        Some(name) => !RESERVED_NAMES.contains(&name.trim().to_lowercase().as_str()),
        None => true,
    }
}

pub fn build(options: ValidatorOptions) -> FieldValidator {
    FieldValidator::builder()
        .options(options)
        .custom_validator("sameAsBody", same_as_body)
        .custom_validator("isTagList", is_tag_list)
        .custom_validator("notReserved", not_reserved)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_same_as_body() {
        let request = RequestData::new().with_body("password", "hunter2");
        assert!(same_as_body(Some(&json!("hunter2")), &[json!("password")], &request));
        assert!(!same_as_body(Some(&json!("hunter3")), &[json!("password")], &request));
        assert!(!same_as_body(None, &[json!("missing")], &request));
        assert!(!same_as_body(Some(&json!("hunter2")), &[], &request));
    }

    #[test]
    fn test_is_tag_list() {
        let request = RequestData::new();
        assert!(is_tag_list(Some(&json!(["defi", "token"])), &[], &request));
        assert!(is_tag_list(Some(&json!([])), &[], &request));
        assert!(!is_tag_list(Some(&json!(["ok", ""])), &[], &request));
        assert!(!is_tag_list(Some(&json!(["ok", 3])), &[], &request));
        assert!(!is_tag_list(Some(&json!("defi")), &[], &request));
        assert!(!is_tag_list(Some(&json!(vec!["t"; MAX_TAGS + 1])), &[], &request));
    }

    #[test]
    fn test_not_reserved() {
        let request = RequestData::new();
        assert!(not_reserved(Some(&json!("ada")), &[], &request));
        assert!(!not_reserved(Some(&json!(" Admin ")), &[], &request));
    }

    #[test]
    fn test_build_registers_custom_predicates() {
        let validator = build(ValidatorOptions::default());
        for name in ["sameAsBody", "isTagList", "notReserved", "isEmail"] {
            assert!(validator.registry().contains(name), "missing {}", name);
        }
    }
}
