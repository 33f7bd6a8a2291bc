// models/verificationmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    PendingReview,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub fn to_str(&self) -> &str {
        match self {
            VerificationStatus::PendingReview => "pending_review",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    #[default]
    NationalId,
    Passport,
    DriverLicense,
}

/// Identity-document review for one owner. Keyed by `owner_id` in the store.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Verification {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(default)]
    pub document_type: DocumentType,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub status: VerificationStatus,
    #[serde(default)]
    pub reviewed_by: Option<Uuid>,
    #[serde(default)]
    pub review_notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}
