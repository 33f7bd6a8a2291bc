// service/listing_service.rs
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::Config,
    db::{Collections, DBClient},
    dtos::listingdtos::CreateListingDto,
    models::{
        listingmodel::{
            payment_reference, Listing, ListingPaymentStatus, ListingStatus, Payment,
            PaymentStatus,
        },
        usermodel::User,
        verificationmodels::VerificationStatus,
    },
    service::error::ServiceError,
    utils::image_utils::{ImageStore, LISTINGS_FOLDER, PROOFS_FOLDER},
};

/// Drives a listing from submission to activation:
///
/// `pending_payment -> awaiting_activation -> active | payment_rejected`,
/// and `active -> inactive` when the owner takes it down.
#[derive(Debug)]
pub struct ListingService {
    db_client: Arc<DBClient>,
    images: ImageStore,
    listing_fee: f64,
    min_listing_price: f64,
    require_verified_owner: bool,
}

impl ListingService {
    pub fn new(db_client: Arc<DBClient>, images: ImageStore, config: &Config) -> Self {
        Self {
            db_client,
            images,
            listing_fee: config.listing_fee,
            min_listing_price: config.min_listing_price,
            require_verified_owner: config.require_verified_owner,
        }
    }

    /// Creates the listing together with its pending payment. Photos are
    /// saved best-effort: a photo that fails to save is dropped and the
    /// listing is still created.
    pub async fn submit(
        &self,
        owner: &User,
        body: CreateListingDto,
    ) -> Result<(Listing, Payment), ServiceError> {
        if !owner.is_owner {
            return Err(ServiceError::NotAnOwner(owner.id));
        }

        body.validate()?;

        let title = body.title.trim().to_string();
        let description = body.description.trim().to_string();
        let location = body.location.trim().to_string();
        if title.is_empty() || description.is_empty() || location.is_empty() {
            return Err(ServiceError::Validation(
                "Title, description and location are required".to_string(),
            ));
        }

        if !body.price.is_finite() || body.price < self.min_listing_price {
            return Err(ServiceError::Validation(format!(
                "Price must be at least {}",
                self.min_listing_price
            )));
        }

        let listing_id = Uuid::new_v4();
        let images = self
            .images
            .save_all(&body.images, LISTINGS_FOLDER, &listing_id.to_string())
            .await;
        if images.len() < body.images.len() {
            tracing::warn!(
                "Listing {} saved {} of {} uploaded images",
                listing_id,
                images.len(),
                body.images.len()
            );
        }

        let now = Utc::now();
        let reference = payment_reference(owner.id, listing_id);
        let listing = Listing {
            id: listing_id,
            owner_id: owner.id,
            title,
            description,
            location,
            price: body.price,
            currency: "ZMW".to_string(),
            listing_type: body.listing_type,
            property_type: body.property_type,
            bedrooms: body.bedrooms,
            bathrooms: body.bathrooms,
            amenities: body.amenities,
            images,
            status: ListingStatus::PendingPayment,
            payment_status: ListingPaymentStatus::Pending,
            payment_reference: reference.clone(),
            views: 0,
            created_at: now,
            updated_at: now,
        };
        let payment = Payment {
            id: Uuid::new_v4(),
            listing_id,
            owner_id: owner.id,
            amount: self.listing_fee,
            reference,
            status: PaymentStatus::Pending,
            proof_image: None,
            proof_submitted_at: None,
            verified_at: None,
            created_at: now,
        };

        let owner_id = owner.id;
        self.db_client
            .write(|c| {
                let user = c
                    .users
                    .get_mut(&owner_id)
                    .ok_or(ServiceError::UserNotFound(owner_id))?;
                user.listing_ids.push(listing_id);
                c.listings.push(listing.clone());
                c.payments.insert(payment.id, payment.clone());
                Ok::<_, ServiceError>(())
            })
            .await?;

        tracing::info!(
            "Listing {} created by {} with payment reference {}",
            listing.id,
            owner_id,
            listing.payment_reference
        );

        Ok((listing, payment))
    }

    /// Attaches the owner's proof of payment and moves the listing to
    /// `awaiting_activation`.
    pub async fn submit_proof(
        &self,
        user_id: Uuid,
        listing_id: Uuid,
        proof_image: Option<&str>,
    ) -> Result<(Listing, Payment), ServiceError> {
        self.db_client
            .read(|c| check_proof_allowed(c, user_id, listing_id).map(|_| ()))
            .await?;

        let proof_image = proof_image
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(ServiceError::NoProof)?;

        // one file per attempt; a refused attempt removes its own
        let stem = format!("{}_{}", listing_id, Uuid::new_v4().simple());
        let proof_path = self
            .images
            .save(proof_image, PROOFS_FOLDER, &stem, 0)
            .await?;

        let now = Utc::now();
        let stored_path = proof_path.clone();
        let result = self
            .db_client
            .write(|c| {
                let payment_id = check_proof_allowed(c, user_id, listing_id)?;

                let payment = c
                    .payments
                    .get_mut(&payment_id)
                    .ok_or(ServiceError::PaymentNotFound(payment_id))?;
                payment.status = PaymentStatus::AwaitingVerification;
                payment.proof_image = Some(stored_path);
                payment.proof_submitted_at = Some(now);
                let payment = payment.clone();

                let listing = c
                    .listing_mut(listing_id)
                    .ok_or(ServiceError::ListingNotFound(listing_id))?;
                listing.status = ListingStatus::AwaitingActivation;
                listing.payment_status = ListingPaymentStatus::ProofSubmitted;
                listing.updated_at = now;

                Ok::<_, ServiceError>((listing.clone(), payment))
            })
            .await;

        let (listing, payment) = match result {
            Ok(records) => records,
            Err(e) => {
                self.images.remove(&proof_path).await;
                return Err(e);
            }
        };

        tracing::info!("Payment proof submitted for listing {} ({})", listing.id, payment.reference);

        Ok((listing, payment))
    }

    /// Admin approval of a payment; activates the listing. Approving an
    /// already verified payment changes nothing, and a deactivated listing
    /// cannot be brought back.
    pub async fn approve_payment(&self, payment_id: Uuid) -> Result<(Listing, Payment), ServiceError> {
        let require_verified_owner = self.require_verified_owner;
        let now = Utc::now();

        let (listing, payment) = self
            .db_client
            .write(|c| -> Result<(Listing, Payment), ServiceError> {
                let (payment, listing_idx) = payment_and_listing(c, payment_id)?;

                if payment.status == PaymentStatus::Verified {
                    return Ok((c.listings[listing_idx].clone(), payment));
                }
                if c.listings[listing_idx].status == ListingStatus::Inactive {
                    return Err(ServiceError::ListingInactive(payment.listing_id));
                }

                if require_verified_owner {
                    let verified = c
                        .verifications
                        .get(&payment.owner_id)
                        .map_or(false, |v| v.status == VerificationStatus::Verified);
                    if !verified {
                        return Err(ServiceError::OwnerNotVerified(payment.owner_id));
                    }
                }

                let listing = &mut c.listings[listing_idx];
                listing.status = ListingStatus::Active;
                listing.payment_status = ListingPaymentStatus::Verified;
                listing.updated_at = now;
                let listing = listing.clone();

                let payment = c
                    .payments
                    .get_mut(&payment_id)
                    .ok_or(ServiceError::PaymentNotFound(payment_id))?;
                payment.status = PaymentStatus::Verified;
                payment.verified_at = Some(now);

                Ok((listing, payment.clone()))
            })
            .await?;

        tracing::info!("Payment {} approved, listing {} is active", payment.id, listing.id);

        Ok((listing, payment))
    }

    /// Refuses the payment; a verified payment can no longer be rejected.
    /// A deactivated listing stays inactive.
    pub async fn reject_payment(&self, payment_id: Uuid) -> Result<(Listing, Payment), ServiceError> {
        let now = Utc::now();

        let (listing, payment) = self
            .db_client
            .write(|c| {
                let (payment, listing_idx) = payment_and_listing(c, payment_id)?;
                if payment.status == PaymentStatus::Verified {
                    return Err(ServiceError::InvalidPaymentStatus(payment.id, payment.status));
                }

                let listing = &mut c.listings[listing_idx];
                if listing.status != ListingStatus::Inactive {
                    listing.status = ListingStatus::PaymentRejected;
                }
                listing.payment_status = ListingPaymentStatus::Rejected;
                listing.updated_at = now;
                let listing = listing.clone();

                let payment = c
                    .payments
                    .get_mut(&payment_id)
                    .ok_or(ServiceError::PaymentNotFound(payment_id))?;
                payment.status = PaymentStatus::Rejected;

                Ok::<_, ServiceError>((listing, payment.clone()))
            })
            .await?;

        tracing::info!("Payment {} rejected for listing {}", payment.id, listing.id);

        Ok((listing, payment))
    }

    /// Takes a listing out of browsing. Only `status` changes.
    pub async fn deactivate(&self, user: &User, listing_id: Uuid) -> Result<Listing, ServiceError> {
        let user_id = user.id;
        let is_admin = user.is_admin();

        let listing = self
            .db_client
            .write(|c| -> Result<Listing, ServiceError> {
                let listing = c
                    .listing_mut(listing_id)
                    .ok_or(ServiceError::ListingNotFound(listing_id))?;
                if listing.owner_id != user_id && !is_admin {
                    return Err(ServiceError::UnauthorizedListingAccess(user_id, listing_id));
                }
                listing.status = ListingStatus::Inactive;
                listing.updated_at = Utc::now();
                Ok(listing.clone())
            })
            .await?;

        tracing::info!("Listing {} deactivated by {}", listing_id, user_id);

        Ok(listing)
    }

    /// Fetches a listing for display, counting a view when it is live.
    pub async fn view_listing(&self, listing_id: Uuid) -> Result<Listing, ServiceError> {
        let is_active = self
            .db_client
            .read(|c| c.listing(listing_id).map(Listing::is_active))
            .await
            .ok_or(ServiceError::ListingNotFound(listing_id))?;

        if !is_active {
            return self
                .db_client
                .read(|c| c.listing(listing_id).cloned())
                .await
                .ok_or(ServiceError::ListingNotFound(listing_id));
        }

        self.db_client
            .write(|c| -> Result<Listing, ServiceError> {
                let listing = c
                    .listing_mut(listing_id)
                    .ok_or(ServiceError::ListingNotFound(listing_id))?;
                listing.views += 1;
                Ok(listing.clone())
            })
            .await
    }
}

/// Returns the payment id when `user_id` may submit proof for `listing_id`.
fn check_proof_allowed(c: &Collections, user_id: Uuid, listing_id: Uuid) -> Result<Uuid, ServiceError> {
    let listing = c
        .listing(listing_id)
        .ok_or(ServiceError::ListingNotFound(listing_id))?;
    if listing.owner_id != user_id {
        return Err(ServiceError::UnauthorizedListingAccess(user_id, listing_id));
    }
    if listing.status == ListingStatus::Inactive {
        return Err(ServiceError::ListingInactive(listing_id));
    }

    let payment = c
        .payment_for_listing(listing_id)
        .ok_or(ServiceError::ListingNotFound(listing_id))?;
    if payment.status != PaymentStatus::Pending {
        return Err(ServiceError::InvalidPaymentStatus(payment.id, payment.status));
    }

    Ok(payment.id)
}

fn payment_and_listing(c: &Collections, payment_id: Uuid) -> Result<(Payment, usize), ServiceError> {
    let payment = c
        .payments
        .get(&payment_id)
        .cloned()
        .ok_or(ServiceError::PaymentNotFound(payment_id))?;
    let listing_idx = c
        .listings
        .iter()
        .position(|l| l.id == payment.listing_id)
        .ok_or(ServiceError::ListingNotFound(payment.listing_id))?;
    Ok((payment, listing_idx))
}
