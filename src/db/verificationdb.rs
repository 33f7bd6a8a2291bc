use async_trait::async_trait;
use uuid::Uuid;

use super::DBClient;
use crate::models::verificationmodels::{Verification, VerificationStatus};

#[async_trait]
pub trait VerificationExt {
    async fn get_verification(&self, owner_id: Uuid) -> Option<Verification>;

    async fn get_verifications_by_status(&self, status: VerificationStatus) -> Vec<Verification>;

    async fn is_owner_verified(&self, owner_id: Uuid) -> bool;
}

#[async_trait]
impl VerificationExt for DBClient {
    async fn get_verification(&self, owner_id: Uuid) -> Option<Verification> {
        self.read(|c| c.verifications.get(&owner_id).cloned()).await
    }

    async fn get_verifications_by_status(&self, status: VerificationStatus) -> Vec<Verification> {
        self.read(|c| {
            let mut records: Vec<Verification> = c
                .verifications
                .values()
                .filter(|v| v.status == status)
                .cloned()
                .collect();
            records.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
            records
        })
        .await
    }

    async fn is_owner_verified(&self, owner_id: Uuid) -> bool {
        self.read(|c| {
            c.verifications
                .get(&owner_id)
                .map(|v| v.status == VerificationStatus::Verified)
                .unwrap_or(false)
        })
        .await
    }
}
