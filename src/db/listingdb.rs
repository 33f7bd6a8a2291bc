use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use super::DBClient;
use crate::models::listingmodel::{Listing, ListingType, Payment, PaymentStatus, PropertyType};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListingSearchFilters {
    pub listing_type: Option<ListingType>,
    pub property_type: Option<PropertyType>,
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub search: Option<String>,
}

impl ListingSearchFilters {
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(listing_type) = self.listing_type {
            if listing.listing_type != listing_type {
                return false;
            }
        }
        if let Some(property_type) = self.property_type {
            if listing.property_type != property_type {
                return false;
            }
        }
        if let Some(location) = non_empty(&self.location) {
            if !contains_ci(&listing.location, location) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if listing.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if listing.price > max {
                return false;
            }
        }
        if let Some(bedrooms) = self.bedrooms {
            if listing.bedrooms.unwrap_or(0) < bedrooms {
                return false;
            }
        }
        if let Some(term) = non_empty(&self.search) {
            if !contains_ci(&listing.title, term) && !contains_ci(&listing.description, term) {
                return false;
            }
        }
        true
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
pub trait ListingExt {
    async fn get_listing_by_id(&self, listing_id: Uuid) -> Option<Listing>;

    async fn get_listings_by_owner(&self, owner_id: Uuid) -> Vec<(Listing, Option<Payment>)>;

    async fn get_active_listings(
        &self,
        filters: ListingSearchFilters,
        page: u32,
        limit: usize,
    ) -> (Vec<Listing>, usize);

    async fn get_payment(&self, payment_id: Uuid) -> Option<Payment>;

    async fn get_payments_by_status(&self, status: PaymentStatus) -> Vec<Payment>;
}

#[async_trait]
impl ListingExt for DBClient {
    async fn get_listing_by_id(&self, listing_id: Uuid) -> Option<Listing> {
        self.read(|c| c.listing(listing_id).cloned()).await
    }

    async fn get_listings_by_owner(&self, owner_id: Uuid) -> Vec<(Listing, Option<Payment>)> {
        self.read(|c| {
            let mut listings: Vec<(Listing, Option<Payment>)> = c
                .listings
                .iter()
                .filter(|l| l.owner_id == owner_id)
                .map(|l| (l.clone(), c.payment_for_listing(l.id).cloned()))
                .collect();
            listings.sort_by(|a, b| b.0.created_at.cmp(&a.0.created_at));
            listings
        })
        .await
    }

    /// Returns one page of active listings (newest first) and the total
    /// number of matches.
    async fn get_active_listings(
        &self,
        filters: ListingSearchFilters,
        page: u32,
        limit: usize,
    ) -> (Vec<Listing>, usize) {
        let offset = (page.saturating_sub(1) as usize) * limit;

        self.read(|c| {
            let mut matching: Vec<&Listing> = c
                .listings
                .iter()
                .filter(|l| l.is_active() && filters.matches(l))
                .collect();
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            let total = matching.len();
            let page = matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect();
            (page, total)
        })
        .await
    }

    async fn get_payment(&self, payment_id: Uuid) -> Option<Payment> {
        self.read(|c| c.payments.get(&payment_id).cloned()).await
    }

    async fn get_payments_by_status(&self, status: PaymentStatus) -> Vec<Payment> {
        self.read(|c| {
            let mut payments: Vec<Payment> = c
                .payments
                .values()
                .filter(|p| p.status == status)
                .cloned()
                .collect();
            payments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            payments
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::listingmodel::ListingStatus;
    use chrono::Utc;

    fn listing(title: &str, location: &str, price: f64, bedrooms: Option<u32>) -> Listing {
        let now = Utc::now();
        Listing {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: title.to_string(),
            description: "Quiet street, close to shops".to_string(),
            location: location.to_string(),
            price,
            currency: "ZMW".to_string(),
            listing_type: ListingType::Rent,
            property_type: PropertyType::House,
            bedrooms,
            bathrooms: None,
            amenities: vec![],
            images: vec![],
            status: ListingStatus::Active,
            payment_status: Default::default(),
            payment_reference: "UHOUSE_A_B".to_string(),
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_filters_match_location_and_price_range() {
        let l = listing("Modern 3BR", "Kabulonga, Lusaka", 2500.0, Some(3));

        let filters = ListingSearchFilters {
            location: Some("lusaka".to_string()),
            min_price: Some(2000.0),
            max_price: Some(3000.0),
            ..Default::default()
        };
        assert!(filters.matches(&l));

        let too_cheap = ListingSearchFilters {
            max_price: Some(1000.0),
            ..Default::default()
        };
        assert!(!too_cheap.matches(&l));
    }

    #[test]
    fn test_filters_search_and_bedrooms() {
        let l = listing("Modern 3BR", "Ndola", 2500.0, Some(3));

        let search = ListingSearchFilters {
            search: Some("modern".to_string()),
            bedrooms: Some(2),
            ..Default::default()
        };
        assert!(search.matches(&l));

        let sale_only = ListingSearchFilters {
            listing_type: Some(ListingType::Sale),
            ..Default::default()
        };
        assert!(!sale_only.matches(&l));

        let blank = ListingSearchFilters {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(blank.matches(&l));
    }
}
