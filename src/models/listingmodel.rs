use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    PendingPayment,
    AwaitingActivation,
    Active,
    Inactive,
    PaymentRejected,
}

impl ListingStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ListingStatus::PendingPayment => "pending_payment",
            ListingStatus::AwaitingActivation => "awaiting_activation",
            ListingStatus::Active => "active",
            ListingStatus::Inactive => "inactive",
            ListingStatus::PaymentRejected => "payment_rejected",
        }
    }
}

/// Payment progress as shown on the listing itself. Tracks the
/// [`PaymentStatus`] of the attached payment, with an extra step for
/// proofs the owner has uploaded but nobody has looked at yet.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListingPaymentStatus {
    #[default]
    Pending,
    ProofSubmitted,
    /// Never set by the listing workflow, which records `ProofSubmitted`
    /// instead. Kept so records written with this value still load.
    AwaitingVerification,
    Verified,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    AwaitingVerification,
    Verified,
    Rejected,
}

impl PaymentStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::AwaitingVerification => "awaiting_verification",
            PaymentStatus::Verified => "verified",
            PaymentStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    #[default]
    Rent,
    Sale,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    House,
    Apartment,
    Room,
    Land,
    Commercial,
}

fn default_currency() -> String {
    "ZMW".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Listing {
    pub id: Uuid,
    pub owner_id: Uuid,

    pub title: String,
    pub description: String,
    pub location: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub listing_type: ListingType,
    #[serde(default)]
    pub property_type: PropertyType,

    // Property attributes
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub amenities: Vec<String>,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub status: ListingStatus,
    #[serde(default)]
    pub payment_status: ListingPaymentStatus,
    pub payment_reference: String,

    #[serde(default)]
    pub views: u64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub owner_id: Uuid,
    pub amount: f64,
    pub reference: String,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub proof_image: Option<String>,
    #[serde(default)]
    pub proof_submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Builds the reconciliation reference shared by a listing and its payment.
pub fn payment_reference(owner_id: Uuid, listing_id: Uuid) -> String {
    format!(
        "UHOUSE_{}_{}",
        id_prefix(owner_id),
        id_prefix(listing_id)
    )
}

fn id_prefix(id: Uuid) -> String {
    id.simple().to_string()[..8].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_reference_uses_id_prefixes() {
        let owner = Uuid::parse_str("a1b2c3d4-0000-0000-0000-000000000000").unwrap();
        let listing = Uuid::parse_str("0f0e0d0c-1111-1111-1111-111111111111").unwrap();

        assert_eq!(payment_reference(owner, listing), "UHOUSE_A1B2C3D4_0F0E0D0C");
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ListingStatus::PaymentRejected).unwrap(),
            "\"payment_rejected\""
        );
        assert_eq!(
            serde_json::to_string(&ListingPaymentStatus::ProofSubmitted).unwrap(),
            "\"proof_submitted\""
        );
        assert_eq!(ListingStatus::AwaitingActivation.to_str(), "awaiting_activation");
        assert_eq!(PaymentStatus::AwaitingVerification.to_str(), "awaiting_verification");
    }

    #[test]
    fn test_stored_awaiting_verification_still_loads() {
        let status: ListingPaymentStatus = serde_json::from_str("\"awaiting_verification\"").unwrap();
        assert_eq!(status, ListingPaymentStatus::AwaitingVerification);
    }
}
