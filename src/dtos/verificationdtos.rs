use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::verificationmodels::{DocumentType, Verification, VerificationStatus};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct SubmitDocumentsDto {
    #[serde(default)]
    pub document_type: DocumentType,

    /// Base64 encoded document scans.
    #[validate(length(min = 1, max = 5, message = "Upload between 1 and 5 document images"))]
    pub documents: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ReviewVerificationDto {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VerificationResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub document_type: DocumentType,
    pub documents: Vec<String>,
    pub status: VerificationStatus,
    pub review_notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub message: String,
}

impl VerificationResponse {
    pub fn from_verification(v: &Verification) -> Self {
        let message = match v.status {
            VerificationStatus::PendingReview => {
                "Your documents are awaiting review by an administrator"
            }
            VerificationStatus::Verified => "Your identity has been verified",
            VerificationStatus::Rejected => {
                "Your documents were rejected. Please upload clearer copies"
            }
        };

        VerificationResponse {
            id: v.id,
            owner_id: v.owner_id,
            document_type: v.document_type,
            documents: v.documents.clone(),
            status: v.status,
            review_notes: v.review_notes.clone(),
            submitted_at: v.submitted_at,
            reviewed_at: v.reviewed_at,
            message: message.to_string(),
        }
    }
}
