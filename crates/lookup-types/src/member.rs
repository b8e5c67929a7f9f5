//! Member records as held by the record store.
//!
//! Members are read-only to the lookup core. Both name orders are exposed
//! because visitors type either "first last" or "last first".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// Name fields a substring query can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameField {
    LastName,
    FirstName,
}

impl NameField {
    /// Both name fields, last name first (the order the store is queried in).
    pub const BOTH: [NameField; 2] = [NameField::LastName, NameField::FirstName];

    pub fn as_str(&self) -> &'static str {
        match self {
            NameField::LastName => "last_name",
            NameField::FirstName => "first_name",
        }
    }
}

impl std::fmt::Display for NameField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Stable unique identifier
    pub id: i64,

    pub last_name: String,

    pub first_name: String,

    /// Opaque handle to the member's stored document
    pub document_ref: String,

    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Create a member stamped with the current time.
    pub fn new(
        id: i64,
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        document_ref: impl Into<String>,
    ) -> Self {
        Self {
            id,
            last_name: last_name.into(),
            first_name: first_name.into(),
            document_ref: document_ref.into(),
            created_at: Utc::now(),
        }
    }

    /// Set the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Read one of the name fields.
    pub fn field(&self, field: NameField) -> &str {
        match field {
            NameField::LastName => &self.last_name,
            NameField::FirstName => &self.first_name,
        }
    }

    /// "first last", the form shown in the search input after selection.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// "last first"
    pub fn reversed_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }

    /// Check the non-empty name invariant.
    pub fn validate(&self) -> Result<(), LookupError> {
        if self.last_name.trim().is_empty() {
            return Err(LookupError::InvalidInput(format!(
                "member {} has an empty last name",
                self.id
            )));
        }
        if self.first_name.trim().is_empty() {
            return Err(LookupError::InvalidInput(format!(
                "member {} has an empty first name",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_orders() {
        let member = Member::new(1, "BENALI", "AHMED", "AHMED-BENALI.PDF");
        assert_eq!(member.display_name(), "AHMED BENALI");
        assert_eq!(member.reversed_name(), "BENALI AHMED");
        assert_eq!(member.field(NameField::LastName), "BENALI");
        assert_eq!(member.field(NameField::FirstName), "AHMED");
    }

    #[test]
    fn test_validate_rejects_blank_names() {
        assert!(Member::new(1, "ZAHRA", "FATIMA", "f.pdf").validate().is_ok());
        assert!(Member::new(2, "  ", "FATIMA", "f.pdf").validate().is_err());
        assert!(Member::new(3, "ZAHRA", "", "f.pdf").validate().is_err());
    }

    #[test]
    fn test_member_json_shape() {
        let json = r#"{
            "id": 7,
            "last_name": "AMRANI",
            "first_name": "YOUSSEF",
            "document_ref": "YOUSSEF-AMRANI.PDF",
            "created_at": "2025-03-01T09:30:00Z"
        }"#;
        let member: Member = serde_json::from_str(json).unwrap();
        assert_eq!(member.id, 7);
        assert_eq!(member.display_name(), "YOUSSEF AMRANI");
        assert_eq!(member.created_at.to_rfc3339(), "2025-03-01T09:30:00+00:00");
    }

    #[test]
    fn test_name_field_serde() {
        let json = serde_json::to_string(&NameField::FirstName).unwrap();
        assert_eq!(json, "\"first_name\"");
        assert_eq!(NameField::BOTH, [NameField::LastName, NameField::FirstName]);
    }
}
