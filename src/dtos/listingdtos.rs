use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::listingmodel::{
    Listing, ListingPaymentStatus, ListingStatus, ListingType, Payment, PaymentStatus,
    PropertyType,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateListingDto {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, max = 5000, message = "Description is required"))]
    pub description: String,

    #[validate(length(min = 1, max = 300, message = "Location is required"))]
    pub location: String,

    pub price: f64,
    pub listing_type: ListingType,
    #[serde(default)]
    pub property_type: PropertyType,

    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub amenities: Vec<String>,

    /// Base64 encoded photos, optionally as data URLs.
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitProofDto {
    pub proof_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingFilterDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_name: Option<String>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub price: f64,
    pub currency: String,
    pub listing_type: ListingType,
    pub property_type: PropertyType,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub status: ListingStatus,
    pub payment_status: ListingPaymentStatus,
    pub payment_reference: String,
    pub views: u64,
    pub created_at: DateTime<Utc>,
}

impl ListingFilterDto {
    pub fn from_listing(listing: &Listing, owner_name: Option<String>) -> Self {
        ListingFilterDto {
            id: listing.id,
            owner_id: listing.owner_id,
            owner_name,
            title: listing.title.clone(),
            description: listing.description.clone(),
            location: listing.location.clone(),
            price: listing.price,
            currency: listing.currency.clone(),
            listing_type: listing.listing_type,
            property_type: listing.property_type,
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            amenities: listing.amenities.clone(),
            images: listing.images.clone(),
            status: listing.status,
            payment_status: listing.payment_status,
            payment_reference: listing.payment_reference.clone(),
            views: listing.views,
            created_at: listing.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDto {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub owner_id: Uuid,
    pub amount: f64,
    pub reference: String,
    pub status: PaymentStatus,
    pub proof_image: Option<String>,
    pub proof_submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl PaymentDto {
    pub fn from_payment(payment: &Payment) -> Self {
        PaymentDto {
            id: payment.id,
            listing_id: payment.listing_id,
            owner_id: payment.owner_id,
            amount: payment.amount,
            reference: payment.reference.clone(),
            status: payment.status,
            proof_image: payment.proof_image.clone(),
            proof_submitted_at: payment.proof_submitted_at,
            verified_at: payment.verified_at,
        }
    }
}

/// Query string for the public browse endpoint.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct BrowseQueryDto {
    pub listing_type: Option<ListingType>,
    pub property_type: Option<PropertyType>,
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub search: Option<String>,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}
