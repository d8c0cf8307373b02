//! Display helpers
//!
//! Renders field paths for error messages and coerces raw request values to
//! the strings built-in predicates operate on.

use serde_json::{Number, Value};

use crate::location::FieldRef;

/// Render a field reference for error output.
///
/// Integer-like segments become array indexes (`items[0]`), everything else
/// is joined with `.`.
pub fn format_param(field: &FieldRef) -> String {
    match field {
        FieldRef::Name(name) => name.clone(),
        FieldRef::Segments(segments) => segments.iter().fold(String::new(), |acc, segment| {
            if is_int_like(segment) {
                format!("{}[{}]", acc, segment)
            } else if acc.is_empty() {
                segment.clone()
            } else {
                format!("{}.{}", acc, segment)
            }
        }),
    }
}

/// `-1`, `0`, `+42` and `007` are integer-like; `1.5` and `` are not
pub fn is_int_like(segment: &str) -> bool {
    let digits = segment
        .strip_prefix('-')
        .or_else(|| segment.strip_prefix('+'))
        .unwrap_or(segment);

    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Coerce a raw value to the string handed to built-in predicates.
///
/// Missing values and `null` become the empty string, arrays join their
/// elements with `,` and objects render as `[object Object]`.
pub fn to_display_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => number_to_string(n),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| to_display_string(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_string(),
    }
}

fn number_to_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        // 17.0 prints as "17", the way request data reads back from a query string
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Truthiness of a request value: missing, `null`, `false`, `0` and `""` are falsy
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_scalar_name() {
        assert_eq!(format_param(&FieldRef::from("user.name")), "user.name");
    }

    #[test]
    fn test_format_segments() {
        let field = FieldRef::from(vec!["users", "0", "address", "city"]);
        assert_eq!(format_param(&field), "users[0].address.city");

        let nested = FieldRef::from(vec!["matrix", "1", "2"]);
        assert_eq!(format_param(&nested), "matrix[1][2]");
    }

    #[test]
    fn test_format_zero_padded_index() {
        let field = FieldRef::from(vec!["agents", "007", "codename"]);
        assert_eq!(format_param(&field), "agents[007].codename");
    }

    #[test]
    fn test_format_leading_index() {
        let field = FieldRef::from(vec!["0", "name"]);
        assert_eq!(format_param(&field), "[0].name");
    }

    #[test]
    fn test_is_int_like() {
        assert!(is_int_like("0"));
        assert!(is_int_like("42"));
        assert!(is_int_like("-7"));
        assert!(is_int_like("007"));
        assert!(!is_int_like("1.5"));
        assert!(!is_int_like("name"));
        assert!(!is_int_like(""));
        assert!(!is_int_like("-"));
    }

    #[test]
    fn test_display_string() {
        assert_eq!(to_display_string(None), "");
        assert_eq!(to_display_string(Some(&Value::Null)), "");
        assert_eq!(to_display_string(Some(&json!("17"))), "17");
        assert_eq!(to_display_string(Some(&json!(17))), "17");
        assert_eq!(to_display_string(Some(&json!(17.0))), "17");
        assert_eq!(to_display_string(Some(&json!(1.5))), "1.5");
        assert_eq!(to_display_string(Some(&json!(false))), "false");
        assert_eq!(to_display_string(Some(&json!([1, "a", null]))), "1,a,");
        assert_eq!(to_display_string(Some(&json!({"a": 1}))), "[object Object]");
    }

    #[test]
    fn test_truthiness() {
        for falsy in [json!(0), json!(""), json!(false), Value::Null] {
            assert!(!is_truthy(Some(&falsy)), "{:?} should be falsy", falsy);
        }
        assert!(!is_truthy(None));

        for truthy in [json!(1), json!("0"), json!(true), json!([]), json!({})] {
            assert!(is_truthy(Some(&truthy)), "{:?} should be truthy", truthy);
        }
    }
}
