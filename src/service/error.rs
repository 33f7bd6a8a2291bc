use thiserror::Error;
use uuid::Uuid;

use crate::{
    db::StoreError,
    error::HttpError,
    models::{
        listingmodel::PaymentStatus, reportmodel::ReportStatus,
        verificationmodels::VerificationStatus,
    },
    utils::image_utils::ImageError,
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("User {0} not found")]
    UserNotFound(Uuid),

    #[error("Listing {0} not found")]
    ListingNotFound(Uuid),

    #[error("Payment {0} not found")]
    PaymentNotFound(Uuid),

    #[error("No verification record for owner {0}")]
    VerificationNotFound(Uuid),

    #[error("Report {0} not found")]
    ReportNotFound(Uuid),

    #[error("A payment proof image is required")]
    NoProof,

    #[error("Payment {0} is {1:?}; proof can only be submitted while pending")]
    InvalidPaymentStatus(Uuid, PaymentStatus),

    #[error("Verification for owner {0} is already {1:?}")]
    InvalidVerificationStatus(Uuid, VerificationStatus),

    #[error("Report {0} is already {1:?}")]
    InvalidReportStatus(Uuid, ReportStatus),

    #[error("Listing {0} has been deactivated")]
    ListingInactive(Uuid),

    #[error("Owner {0} has not completed identity verification")]
    OwnerNotVerified(Uuid),

    #[error("User {0} is not authorized to perform this action on listing {1}")]
    UnauthorizedListingAccess(Uuid, Uuid),

    #[error("Only property owner accounts can do this")]
    NotAnOwner(Uuid),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Image upload failed: {0}")]
    Image(#[from] ImageError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::UserNotFound(_)
            | ServiceError::ListingNotFound(_)
            | ServiceError::PaymentNotFound(_)
            | ServiceError::VerificationNotFound(_)
            | ServiceError::ReportNotFound(_) => HttpError::not_found(error.to_string()),

            ServiceError::NoProof
            | ServiceError::InvalidPaymentStatus(_, _)
            | ServiceError::InvalidVerificationStatus(_, _)
            | ServiceError::InvalidReportStatus(_, _)
            | ServiceError::ListingInactive(_)
            | ServiceError::OwnerNotVerified(_)
            | ServiceError::Validation(_)
            | ServiceError::Image(_) => HttpError::bad_request(error.to_string()),

            ServiceError::UnauthorizedListingAccess(_, _)
            | ServiceError::NotAnOwner(_) => HttpError::forbidden(error.to_string()),

            ServiceError::Storage(StoreError::EmailExists(_)) => {
                HttpError::unique_constraint_violation(error.to_string())
            }

            ServiceError::Storage(_) => {
                tracing::error!("{}", error);
                HttpError::server_error(error.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::Validation(errors.to_string())
    }
}
