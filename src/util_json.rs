//! Serde helpers for loose chain payloads
//!
//! WAX APIs are inconsistent about integer width: 64-bit ids usually arrive
//! as JSON strings, smaller counters as numbers, and some hosts flip between
//! the two. These deserializers accept either form so row structs stay typed.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept `"123"` or `123` as an owned string.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(DeError::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Accept `"123"` or `123` as u64.
pub fn u64_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| DeError::custom(format!("invalid u64 string {s:?}"))),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| DeError::custom(format!("number {n} out of u64 range"))),
        other => Err(DeError::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Accept `"123"` or `123` as u32.
pub fn u32_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let wide = u64_string_or_number(deserializer)?;
    u32::try_from(wide).map_err(|_| DeError::custom(format!("number {wide} out of u32 range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
        #[serde(deserialize_with = "u32_string_or_number")]
        template: u32,
        #[serde(deserialize_with = "u64_string_or_number")]
        mint: u64,
    }

    #[test]
    fn accepts_both_forms() {
        let row: Row =
            serde_json::from_str(r#"{"id": 1099511627776, "template": "640001", "mint": 42}"#)
                .unwrap();
        assert_eq!(row.id, "1099511627776");
        assert_eq!(row.template, 640_001);
        assert_eq!(row.mint, 42);

        let row: Row =
            serde_json::from_str(r#"{"id": "1099511627777", "template": 7, "mint": "9"}"#)
                .unwrap();
        assert_eq!(row.id, "1099511627777");
        assert_eq!(row.template, 7);
        assert_eq!(row.mint, 9);
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Row>(r#"{"id": {}, "template": 1, "mint": 1}"#).is_err());
        assert!(
            serde_json::from_str::<Row>(r#"{"id": "x", "template": "abc", "mint": 1}"#).is_err()
        );
    }
}
