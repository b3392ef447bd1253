// Lenient field deserializers.
//
// The backend is inconsistent about codes: the same field arrives as
// `"12"` from one endpoint and `12` from another.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// A required string that may be sent as a JSON number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(value).unwrap_or_default())
}

/// An optional string that may be sent as a JSON number or `null`.
pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_string))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "super::string_or_number")]
        code: String,
        #[serde(default, deserialize_with = "super::opt_string_or_number")]
        extra: Option<String>,
    }

    #[test]
    fn accepts_numbers_and_strings() {
        let a: Row = serde_json::from_value(json!({ "code": 13, "extra": "x" })).unwrap();
        let b: Row = serde_json::from_value(json!({ "code": "13", "extra": null })).unwrap();
        let c: Row = serde_json::from_value(json!({ "code": "7" })).unwrap();
        assert_eq!(a.code, "13");
        assert_eq!(a.extra.as_deref(), Some("x"));
        assert_eq!(b.code, "13");
        assert_eq!(b.extra, None);
        assert_eq!(c.extra, None);
    }
}
