use serde::{Deserialize, Serialize};

use crate::{
    db::{DBClient, UserExt},
    models::{
        listingmodel::{ListingStatus, PaymentStatus},
        reportmodel::ReportStatus,
        usermodel::{User, UserRole},
        verificationmodels::VerificationStatus,
    },
    service::error::ServiceError,
    utils::password,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListingCounts {
    pub pending_payment: usize,
    pub awaiting_activation: usize,
    pub active: usize,
    pub inactive: usize,
    pub payment_rejected: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlatformStats {
    pub total_users: usize,
    pub total_owners: usize,
    pub listings: ListingCounts,
    pub pending_payments: usize,
    pub verified_payments: usize,
    pub pending_verifications: usize,
    pub open_reports: usize,
    /// Sum of verified payment amounts.
    pub revenue: f64,
}

/// Dashboard figures, taken from one consistent snapshot of the store.
pub async fn platform_stats(db_client: &DBClient) -> PlatformStats {
    db_client
        .read(|c| {
            let mut listings = ListingCounts::default();
            for listing in &c.listings {
                match listing.status {
                    ListingStatus::PendingPayment => listings.pending_payment += 1,
                    ListingStatus::AwaitingActivation => listings.awaiting_activation += 1,
                    ListingStatus::Active => listings.active += 1,
                    ListingStatus::Inactive => listings.inactive += 1,
                    ListingStatus::PaymentRejected => listings.payment_rejected += 1,
                }
            }

            let verified: Vec<f64> = c
                .payments
                .values()
                .filter(|p| p.status == PaymentStatus::Verified)
                .map(|p| p.amount)
                .collect();

            PlatformStats {
                total_users: c.users.len(),
                total_owners: c.users.values().filter(|u| u.is_owner).count(),
                listings,
                pending_payments: c
                    .payments
                    .values()
                    .filter(|p| p.status == PaymentStatus::AwaitingVerification)
                    .count(),
                verified_payments: verified.len(),
                pending_verifications: c
                    .verifications
                    .values()
                    .filter(|v| v.status == VerificationStatus::PendingReview)
                    .count(),
                open_reports: c
                    .reports
                    .iter()
                    .filter(|r| r.status == ReportStatus::Pending)
                    .count(),
                revenue: verified.iter().sum(),
            }
        })
        .await
}

/// Creates the admin account on first start. An existing account with the
/// same email is left as it is.
pub async fn ensure_admin(
    db_client: &DBClient,
    email: &str,
    admin_password: &str,
) -> Result<Option<User>, ServiceError> {
    if db_client.get_user(None, Some(email)).await.is_some() {
        return Ok(None);
    }

    let hashed = password::hash(admin_password)
        .map_err(|e| ServiceError::Validation(e.to_string()))?;
    let admin = db_client
        .save_user("Administrator", email, "", hashed.as_str(), false, UserRole::Admin)
        .await?;

    tracing::info!("Seeded admin account {}", admin.email);

    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{listing_dto, proof_image, TestApp};

    #[tokio::test]
    async fn test_double_approval_does_not_double_count_revenue() {
        let app = TestApp::new().await;
        let owner = app.owner("owner@example.com").await;
        app.renter("renter@example.com").await;
        let (listing, payment) = app.listings.submit(&owner, listing_dto("Modern 3BR", 2500.0)).await.unwrap();
        app.listings.submit(&owner, listing_dto("Plot in Chongwe", 90000.0)).await.unwrap();
        let image = proof_image();
        app.listings.submit_proof(owner.id, listing.id, Some(&image)).await.unwrap();

        let before = platform_stats(&app.db_client).await;
        assert_eq!(before.pending_payments, 1);
        assert_eq!(before.revenue, 0.0);

        app.listings.approve_payment(payment.id).await.unwrap();
        app.listings.approve_payment(payment.id).await.unwrap();

        let stats = platform_stats(&app.db_client).await;
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_owners, 1);
        assert_eq!(stats.verified_payments, 1);
        assert_eq!(stats.revenue, 250.0);
        assert_eq!(stats.pending_payments, 0);
        assert_eq!(
            stats.listings,
            ListingCounts {
                pending_payment: 1,
                active: 1,
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn test_ensure_admin_runs_once() {
        let app = TestApp::new().await;

        let seeded = ensure_admin(&app.db_client, "admin@uhouse.test", "admin-pass").await.unwrap();
        let admin = seeded.expect("admin should be created");
        assert!(admin.is_admin());
        assert!(password::compare("admin-pass", &admin.password).unwrap());

        let again = ensure_admin(&app.db_client, "admin@uhouse.test", "other-pass").await.unwrap();
        assert!(again.is_none());
        assert_eq!(app.db_client.get_user_count().await, 1);
    }
}
