use serde_json::{Map, Value};
use solara_shared::lead::{Address, CustomerInfo, LeadPayload};
use std::collections::BTreeMap;

use crate::validate::non_empty_str;

const DEFAULT_LEAD_TYPE: &str = "solar_project";

/// Raw keys that are lifted into the fixed top-level blocks and
/// therefore excluded from `projectDetails`.
const LIFTED_KEYS: &[&str] = &[
    "leadType",
    "firstName",
    "lastName",
    "customerEmail",
    "customerPhone",
    "streetAddress",
    "city",
    "state",
    "postalCode",
    "secondaryContactName",
    "secondaryContactPhone",
    "secondaryContactEmail",
    "tenantName",
    "tenantPhone",
];

/// Convenience duplicates the receiver's templating references at the
/// top level, in addition to their nested homes.
const CONVENIENCE_KEYS: &[&str] = &[
    "secondaryContactName",
    "secondaryContactPhone",
    "secondaryContactEmail",
    "tenantName",
    "tenantPhone",
];

/// Reshape a validated intake payload into the fixed nested schema the
/// workflow webhook expects. Project fields not lifted into a fixed
/// block pass through under `projectDetails` untouched.
pub fn normalize_intake(raw: &Value) -> LeadPayload {
    let customer_info = CustomerInfo {
        first_name: owned(raw, "firstName"),
        last_name: owned(raw, "lastName"),
        email: owned(raw, "customerEmail"),
        phone: non_empty_str(raw, "customerPhone").map(str::to_string),
    };

    let address = Address {
        street_address: owned(raw, "streetAddress"),
        city: owned(raw, "city"),
        state: owned(raw, "state"),
        postal_code: owned(raw, "postalCode"),
    };

    let mut project_details = Map::new();
    if let Some(obj) = raw.as_object() {
        for (key, value) in obj {
            if !LIFTED_KEYS.contains(&key.as_str()) {
                project_details.insert(key.clone(), value.clone());
            }
        }
    }

    let mut convenience = BTreeMap::new();
    for key in CONVENIENCE_KEYS {
        if let Some(value) = non_empty_str(raw, key) {
            convenience.insert((*key).to_string(), value.to_string());
        }
    }
    if let Some(urls) = uploaded_file_urls(raw) {
        convenience.insert("uploadedFileUrls".to_string(), urls);
    }

    LeadPayload {
        lead_type: non_empty_str(raw, "leadType")
            .unwrap_or(DEFAULT_LEAD_TYPE)
            .to_string(),
        customer_info,
        project_details: Value::Object(project_details),
        address,
        convenience,
    }
}

fn owned(raw: &Value, key: &str) -> String {
    non_empty_str(raw, key).unwrap_or_default().to_string()
}

/// `uploadedFiles` arrives either as URL strings or objects carrying a
/// `url` field; either way the receiver wants one comma-joined string.
fn uploaded_file_urls(raw: &Value) -> Option<String> {
    let files = raw.get("uploadedFiles")?.as_array()?;
    let urls: Vec<&str> = files
        .iter()
        .filter_map(|f| f.as_str().or_else(|| f.get("url").and_then(Value::as_str)))
        .collect();
    if urls.is_empty() {
        None
    } else {
        Some(urls.join(", "))
    }
}
