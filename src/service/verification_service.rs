// service/verification_service.rs
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::DBClient,
    models::{
        usermodel::User,
        verificationmodels::{DocumentType, Verification, VerificationStatus},
    },
    service::error::ServiceError,
    utils::image_utils::{ImageStore, VERIFICATIONS_FOLDER},
};

/// Owner identity review: `pending_review -> verified | rejected`.
#[derive(Debug)]
pub struct VerificationService {
    db_client: Arc<DBClient>,
    images: ImageStore,
}

impl VerificationService {
    pub fn new(db_client: Arc<DBClient>, images: ImageStore) -> Self {
        Self { db_client, images }
    }

    /// Stores the owner's documents. A later submission replaces the earlier
    /// documents in place and puts the record back into `pending_review`.
    pub async fn submit_documents(
        &self,
        owner: &User,
        document_type: DocumentType,
        documents: &[String],
    ) -> Result<Verification, ServiceError> {
        if !owner.is_owner {
            return Err(ServiceError::NotAnOwner(owner.id));
        }
        if documents.is_empty() {
            return Err(ServiceError::Validation(
                "At least one document image is required".to_string(),
            ));
        }

        let owner_id = owner.id;
        let saved = self
            .images
            .save_all(documents, VERIFICATIONS_FOLDER, &owner_id.to_string())
            .await;
        if saved.is_empty() {
            return Err(ServiceError::Validation(
                "None of the uploaded documents could be saved".to_string(),
            ));
        }

        let now = Utc::now();
        let verification = self
            .db_client
            .write(|c| -> Result<Verification, ServiceError> {
                let user = c
                    .users
                    .get_mut(&owner_id)
                    .ok_or(ServiceError::UserNotFound(owner_id))?;

                let verification = match c.verifications.get_mut(&owner_id) {
                    Some(existing) => {
                        existing.document_type = document_type;
                        existing.documents = saved;
                        existing.status = VerificationStatus::PendingReview;
                        existing.reviewed_by = None;
                        existing.review_notes = None;
                        existing.reviewed_at = None;
                        existing.submitted_at = now;
                        existing.clone()
                    }
                    None => {
                        let created = Verification {
                            id: Uuid::new_v4(),
                            owner_id,
                            document_type,
                            documents: saved,
                            status: VerificationStatus::PendingReview,
                            reviewed_by: None,
                            review_notes: None,
                            submitted_at: now,
                            reviewed_at: None,
                        };
                        c.verifications.insert(owner_id, created.clone());
                        created
                    }
                };

                user.verification_id = Some(verification.id);
                Ok(verification)
            })
            .await?;

        tracing::info!("Verification documents submitted by owner {}", owner_id);

        Ok(verification)
    }

    pub async fn approve(&self, owner_id: Uuid, admin_id: Uuid) -> Result<Verification, ServiceError> {
        self.review(owner_id, admin_id, VerificationStatus::Verified, None)
            .await
    }

    pub async fn reject(
        &self,
        owner_id: Uuid,
        admin_id: Uuid,
        notes: Option<String>,
    ) -> Result<Verification, ServiceError> {
        self.review(owner_id, admin_id, VerificationStatus::Rejected, notes)
            .await
    }

    async fn review(
        &self,
        owner_id: Uuid,
        admin_id: Uuid,
        outcome: VerificationStatus,
        notes: Option<String>,
    ) -> Result<Verification, ServiceError> {
        let verification = self
            .db_client
            .write(|c| -> Result<Verification, ServiceError> {
                let verification = c
                    .verifications
                    .get_mut(&owner_id)
                    .ok_or(ServiceError::VerificationNotFound(owner_id))?;

                if verification.status != VerificationStatus::PendingReview {
                    return Err(ServiceError::InvalidVerificationStatus(
                        owner_id,
                        verification.status,
                    ));
                }

                verification.status = outcome;
                verification.reviewed_by = Some(admin_id);
                verification.review_notes = notes;
                verification.reviewed_at = Some(Utc::now());
                Ok(verification.clone())
            })
            .await?;

        tracing::info!(
            "Verification for owner {} marked {} by {}",
            owner_id,
            outcome.to_str(),
            admin_id
        );

        Ok(verification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::verificationdb::VerificationExt,
        service::test_support::{proof_image, TestApp},
    };

    #[tokio::test]
    async fn test_submit_creates_pending_record() {
        let app = TestApp::new().await;
        let owner = app.owner("owner@example.com").await;

        let v = app
            .verifications
            .submit_documents(&owner, DocumentType::Passport, &[proof_image(), proof_image()])
            .await
            .unwrap();

        assert_eq!(v.status, VerificationStatus::PendingReview);
        assert_eq!(v.documents.len(), 2);
        assert_eq!(v.documents[0], format!("verifications/{}_0.png", owner.id));

        let user_ref = app
            .db_client
            .read(|c| c.users[&owner.id].verification_id)
            .await;
        assert_eq!(user_ref, Some(v.id));
    }

    #[tokio::test]
    async fn test_review_is_terminal() {
        let app = TestApp::new().await;
        let owner = app.owner("owner@example.com").await;
        let admin = Uuid::new_v4();
        app.verifications
            .submit_documents(&owner, DocumentType::NationalId, &[proof_image()])
            .await
            .unwrap();

        let approved = app.verifications.approve(owner.id, admin).await.unwrap();
        assert_eq!(approved.status, VerificationStatus::Verified);
        assert_eq!(approved.reviewed_by, Some(admin));
        assert!(app.db_client.is_owner_verified(owner.id).await);

        let again = app.verifications.reject(owner.id, admin, None).await;
        assert!(matches!(
            again,
            Err(ServiceError::InvalidVerificationStatus(_, VerificationStatus::Verified))
        ));
    }

    #[tokio::test]
    async fn test_resubmission_replaces_documents_and_resets_status() {
        let app = TestApp::new().await;
        let owner = app.owner("owner@example.com").await;
        let admin = Uuid::new_v4();
        let first = app
            .verifications
            .submit_documents(&owner, DocumentType::NationalId, &[proof_image(), proof_image()])
            .await
            .unwrap();
        app.verifications
            .reject(owner.id, admin, Some("Blurry scan".to_string()))
            .await
            .unwrap();

        let second = app
            .verifications
            .submit_documents(&owner, DocumentType::Passport, &[proof_image()])
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.status, VerificationStatus::PendingReview);
        assert_eq!(second.document_type, DocumentType::Passport);
        assert_eq!(second.documents.len(), 1);
        assert!(second.review_notes.is_none());
        assert_eq!(app.db_client.read(|c| c.verifications.len()).await, 1);
    }

    #[tokio::test]
    async fn test_unknown_owner_and_missing_documents() {
        let app = TestApp::new().await;
        let owner = app.owner("owner@example.com").await;
        let renter = app.renter("renter@example.com").await;

        let missing = app.verifications.approve(owner.id, Uuid::new_v4()).await;
        assert!(matches!(missing, Err(ServiceError::VerificationNotFound(_))));

        let empty = app.verifications.submit_documents(&owner, DocumentType::Passport, &[]).await;
        assert!(matches!(empty, Err(ServiceError::Validation(_))));

        let broken = app
            .verifications
            .submit_documents(&owner, DocumentType::Passport, &["%%%".to_string()])
            .await;
        assert!(matches!(broken, Err(ServiceError::Validation(_))));

        let renter_docs = app
            .verifications
            .submit_documents(&renter, DocumentType::Passport, &[proof_image()])
            .await;
        assert!(matches!(renter_docs, Err(ServiceError::NotAnOwner(_))));
    }
}
