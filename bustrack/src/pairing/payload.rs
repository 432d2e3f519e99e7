//! Pairing payload parsing.
//!
//! A conductor's QR code carries UTF-8 JSON:
//!
//! ```text
//! { "id": "C-102", "name": "Juan Dela Cruz", "user_id": "u-88" }
//! ```
//!
//! Parsing is fallible and typed; a bad payload is a value, not a panic.

use serde_json::Value;
use thiserror::Error;

/// Why a scanned payload could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// Not a JSON object.
    #[error("Payload is not a JSON object: {0}")]
    Malformed(String),

    /// A required field is absent.
    #[error("Payload is missing field '{0}'")]
    MissingField(&'static str),

    /// A required field is empty or of the wrong type.
    #[error("Payload field '{0}' is empty or not text")]
    InvalidField(&'static str),
}

/// Conductor identity decoded from a scanned code.
///
/// Untrusted until the conductor lookup confirms the id exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPairingPayload {
    pub conductor_id: String,
    pub conductor_name: String,
    pub requesting_user_id: String,
}

/// Extracts a non-blank text value; numbers are accepted and stringified.
fn field_text(value: Option<Value>, field: &'static str) -> Result<String, PayloadError> {
    match value {
        None | Some(Value::Null) => Err(PayloadError::MissingField(field)),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(PayloadError::InvalidField(field)),
    }
}

/// Parses a scanned code's text into a pairing payload.
pub fn parse_payload(text: &str) -> Result<DecodedPairingPayload, PayloadError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| PayloadError::Malformed(e.to_string()))?;

    // Arrays and scalars are valid JSON but never a payload
    let Value::Object(mut fields) = value else {
        return Err(PayloadError::Malformed(format!(
            "expected an object, found {}",
            json_kind(&value)
        )));
    };

    Ok(DecodedPairingPayload {
        conductor_id: field_text(fields.remove("id"), "id")?,
        conductor_name: field_text(fields.remove("name"), "name")?,
        requesting_user_id: field_text(fields.remove("user_id"), "user_id")?,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_payload() {
        let payload =
            parse_payload(r#"{"id":"C-102","name":"Juan Dela Cruz","user_id":"u-88"}"#).unwrap();
        assert_eq!(
            payload,
            DecodedPairingPayload {
                conductor_id: "C-102".to_string(),
                conductor_name: "Juan Dela Cruz".to_string(),
                requesting_user_id: "u-88".to_string(),
            }
        );
    }

    #[test]
    fn test_numeric_ids_are_stringified() {
        let payload = parse_payload(r#"{"id":102,"name":"Ana","user_id":7}"#).unwrap();
        assert_eq!(payload.conductor_id, "102");
        assert_eq!(payload.requesting_user_id, "7");
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        assert!(parse_payload(r#"{"id":"a","name":"b","user_id":"c","role":"x"}"#).is_ok());
    }

    #[test]
    fn test_non_json_is_malformed() {
        assert!(matches!(
            parse_payload("https://example.com/ticket/42"),
            Err(PayloadError::Malformed(_))
        ));
        assert!(matches!(parse_payload("[1,2]"), Err(PayloadError::Malformed(_))));
    }

    #[test]
    fn test_positional_array_is_malformed() {
        // Same three values in field order must not decode as a payload
        let result = parse_payload(r#"["C-1","Ana","u-1"]"#);
        assert!(matches!(result, Err(PayloadError::Malformed(ref m)) if m.contains("array")));

        assert!(matches!(parse_payload(r#""C-1""#), Err(PayloadError::Malformed(_))));
        assert!(matches!(parse_payload("42"), Err(PayloadError::Malformed(_))));
    }

    #[test]
    fn test_missing_field() {
        assert_eq!(
            parse_payload(r#"{"id":"a","user_id":"c"}"#),
            Err(PayloadError::MissingField("name"))
        );
        assert_eq!(
            parse_payload(r#"{"id":null,"name":"b","user_id":"c"}"#),
            Err(PayloadError::MissingField("id"))
        );
    }

    #[test]
    fn test_blank_or_wrong_type_field() {
        assert_eq!(
            parse_payload(r#"{"id":"  ","name":"b","user_id":"c"}"#),
            Err(PayloadError::InvalidField("id"))
        );
        assert_eq!(
            parse_payload(r#"{"id":"a","name":["b"],"user_id":"c"}"#),
            Err(PayloadError::InvalidField("name"))
        );
    }
}
