// handler/admin.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    db::{listingdb::ListingExt, reportdb::ReportExt, verificationdb::VerificationExt, UserExt},
    dtos::{
        listingdtos::{ListingFilterDto, PaymentDto},
        reportdtos::ReportQueryDto,
        verificationdtos::{ReviewVerificationDto, VerificationResponse},
    },
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::{listingmodel::PaymentStatus, usermodel::UserRole, verificationmodels::VerificationStatus},
    service::admin_service::platform_stats,
    AppState,
};

pub fn admin_handler() -> Router {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/payments/pending", get(get_pending_payments))
        .route("/payments/:payment_id/approve", put(approve_payment))
        .route("/payments/:payment_id/reject", put(reject_payment))
        .route("/verifications/pending", get(get_pending_verifications))
        .route("/verifications/:owner_id/approve", put(approve_verification))
        .route("/verifications/:owner_id/reject", put(reject_verification))
        .route("/reports", get(get_reports))
        .route("/reports/:report_id/resolve", put(resolve_report))
        .route("/reports/:report_id/dismiss", put(dismiss_report))
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Admin])
        }))
}

pub async fn get_stats(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = platform_stats(&app_state.db_client).await;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": stats
    })))
}

/// Payments with an uploaded proof, oldest first, with the listing and
/// owner needed to reconcile the reference.
pub async fn get_pending_payments(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let payments = app_state.db_client
        .get_payments_by_status(PaymentStatus::AwaitingVerification)
        .await;

    let mut data = Vec::with_capacity(payments.len());
    for payment in &payments {
        let listing = app_state.db_client.get_listing_by_id(payment.listing_id).await;
        let owner = app_state.db_client.get_user(Some(payment.owner_id), None).await;
        let owner_verified = app_state.db_client.is_owner_verified(payment.owner_id).await;

        data.push(serde_json::json!({
            "payment": PaymentDto::from_payment(payment),
            "listing": listing.as_ref().map(|l| ListingFilterDto::from_listing(l, owner.as_ref().map(|o| o.name.clone()))),
            "owner": owner.map(|o| serde_json::json!({
                "id": o.id,
                "name": o.name,
                "email": o.email,
                "phone": o.phone,
                "verified": owner_verified,
            })),
        }));
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "payments": data,
            "total": data.len()
        }
    })))
}

pub async fn approve_payment(
    Path(payment_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(admin): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let (listing, payment) = app_state.listing_service
        .approve_payment(payment_id)
        .await?;

    tracing::info!("Admin {} approved payment {}", admin.user.email, payment.reference);

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Payment approved and listing published",
        "data": {
            "listing": ListingFilterDto::from_listing(&listing, None),
            "payment": PaymentDto::from_payment(&payment),
        }
    })))
}

pub async fn reject_payment(
    Path(payment_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(admin): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let (listing, payment) = app_state.listing_service
        .reject_payment(payment_id)
        .await?;

    tracing::info!("Admin {} rejected payment {}", admin.user.email, payment.reference);

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Payment rejected",
        "data": {
            "listing": ListingFilterDto::from_listing(&listing, None),
            "payment": PaymentDto::from_payment(&payment),
        }
    })))
}

pub async fn get_pending_verifications(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let records = app_state.db_client
        .get_verifications_by_status(VerificationStatus::PendingReview)
        .await;

    let data: Vec<VerificationResponse> = records
        .iter()
        .map(VerificationResponse::from_verification)
        .collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "verifications": data,
            "total": data.len()
        }
    })))
}

pub async fn approve_verification(
    Path(owner_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(admin): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let verification = app_state.verification_service
        .approve(owner_id, admin.user.id)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": VerificationResponse::from_verification(&verification)
    })))
}

pub async fn reject_verification(
    Path(owner_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(admin): Extension<JWTAuthMiddeware>,
    body: Option<Json<ReviewVerificationDto>>,
) -> Result<impl IntoResponse, HttpError> {
    let notes = body.and_then(|Json(b)| b.notes);

    let verification = app_state.verification_service
        .reject(owner_id, admin.user.id, notes)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": VerificationResponse::from_verification(&verification)
    })))
}

pub async fn get_reports(
    Query(query): Query<ReportQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let reports = app_state.db_client.get_reports(query.status).await;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "reports": reports,
            "total": reports.len()
        }
    })))
}

pub async fn resolve_report(
    Path(report_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(admin): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let report = app_state.report_service
        .resolve(report_id, admin.user.id)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": { "report": report }
    })))
}

pub async fn dismiss_report(
    Path(report_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(admin): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let report = app_state.report_service
        .dismiss(report_id, admin.user.id)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": { "report": report }
    })))
}
