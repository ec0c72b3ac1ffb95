use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The normalized payload shape the workflow webhook receiver expects.
///
/// `convenience` carries flattened duplicates of secondary-contact,
/// tenant and uploaded-file fields so the receiver's templating can
/// reference them without walking the nested blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPayload {
    pub lead_type: String,
    pub customer_info: CustomerInfo,
    pub project_details: Value,
    pub address: Address,
    #[serde(flatten)]
    pub convenience: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}
