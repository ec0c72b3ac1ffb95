use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A lead's stored record: two independent payload slots, one per form.
///
/// Records are upserted by submission id and never deleted; either form
/// may be the one that creates the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub form1_data: Option<Value>,
    pub form2_data: Option<Value>,
    pub form1_filled: bool,
    pub form2_filled: bool,
}

impl Submission {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            form1_data: None,
            form2_data: None,
            form1_filled: false,
            form2_filled: false,
        }
    }

    pub fn with_form1(mut self, payload: Value) -> Self {
        self.form1_data = Some(payload);
        self.form1_filled = true;
        self
    }

    pub fn with_form2(mut self, payload: Value) -> Self {
        self.form2_data = Some(payload);
        self.form2_filled = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_fill_flags() {
        let id = Uuid::new_v4();
        let sub = Submission::new(id).with_form1(serde_json::json!({"firstName": "Ana"}));

        assert!(sub.form1_filled);
        assert!(!sub.form2_filled);
        assert!(sub.form2_data.is_none());

        let sub = sub.with_form2(serde_json::json!({"surveyDate": "2026-01-09"}));
        assert!(sub.form1_filled);
        assert!(sub.form2_filled);
    }
}
