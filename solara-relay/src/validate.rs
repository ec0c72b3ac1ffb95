use serde_json::Value;
use solara_core::PipelineError;

pub const REQUIRED_IDENTITY_FIELDS: &[&str] = &["firstName", "lastName", "customerEmail"];
pub const REQUIRED_ADDRESS_FIELDS: &[&str] = &["streetAddress", "city", "state", "postalCode"];

/// Check that the intake payload carries the required identity and
/// address fields as non-empty strings. Reports every missing field,
/// not just the first.
pub fn validate_intake(raw: &Value) -> Result<(), PipelineError> {
    let mut missing = Vec::new();

    for field in REQUIRED_IDENTITY_FIELDS.iter().chain(REQUIRED_ADDRESS_FIELDS) {
        if non_empty_str(raw, field).is_none() {
            missing.push(*field);
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

pub(crate) fn non_empty_str<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({
            "firstName": "Ana",
            "lastName": "Reyes",
            "customerEmail": "ana@example.com",
            "streetAddress": "1 Main St",
            "city": "Fresno",
            "state": "CA",
            "postalCode": "93706"
        })
    }

    #[test]
    fn test_complete_payload_passes() {
        assert!(validate_intake(&full_payload()).is_ok());
    }

    #[test]
    fn test_missing_email_names_the_field() {
        let mut payload = full_payload();
        payload.as_object_mut().unwrap().remove("customerEmail");

        let err = validate_intake(&payload).unwrap_err();
        assert!(err.to_string().contains("customerEmail"));
    }

    #[test]
    fn test_blank_field_counts_as_missing() {
        let mut payload = full_payload();
        payload["city"] = json!("   ");

        let err = validate_intake(&payload).unwrap_err();
        assert!(err.to_string().contains("city"));
    }

    #[test]
    fn test_all_missing_fields_are_reported() {
        let err = validate_intake(&json!({})).unwrap_err();
        let msg = err.to_string();
        for field in REQUIRED_IDENTITY_FIELDS.iter().chain(REQUIRED_ADDRESS_FIELDS) {
            assert!(msg.contains(field), "{} missing from message", field);
        }
    }
}
