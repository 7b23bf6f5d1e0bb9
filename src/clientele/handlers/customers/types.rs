//! Request and response schemas for the customer endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::super::valid_email;

/// A persisted customer record.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// System-assigned identifier, immutable once created.
    pub id: i64,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub email: String,
    pub phone_number: String,
}

/// Candidate customer accepted by create and update.
///
/// Field presence and types are enforced by deserialization; content checks
/// live in [`CustomerDraft::invalid_fields`].
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct CustomerDraft {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub email: String,
    pub phone_number: String,
}

impl CustomerDraft {
    /// Names of the fields that fail validation, empty when the draft is
    /// acceptable. No storage call is made while this is non-empty.
    #[must_use]
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();

        if self.first_name.trim().is_empty() {
            fields.push("first_name");
        }
        if self.last_name.trim().is_empty() {
            fields.push("last_name");
        }
        if !valid_email(&self.email) {
            fields.push("email");
        }
        if self.phone_number.trim().is_empty() {
            fields.push("phone_number");
        }

        fields
    }
}

/// Pagination window for customer listings.
#[derive(IntoParams, Deserialize, Debug, Default)]
pub struct Page {
    /// Records to skip before the page starts, defaults to 0.
    pub skip: Option<i64>,
    /// Maximum records returned, defaults to 10.
    pub limit: Option<i64>,
}
