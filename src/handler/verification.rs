use std::sync::Arc;

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    db::verificationdb::VerificationExt,
    dtos::verificationdtos::{SubmitDocumentsDto, VerificationResponse},
    error::HttpError,
    middleware::{owner_check, JWTAuthMiddeware},
    AppState,
};

pub fn verification_handler() -> Router {
    Router::new()
        .route("/documents", post(submit_documents))
        .route("/status", get(get_verification_status))
        .layer(middleware::from_fn(owner_check))
}

pub async fn submit_documents(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<SubmitDocumentsDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let verification = app_state.verification_service
        .submit_documents(&user.user, body.document_type, &body.documents)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": VerificationResponse::from_verification(&verification)
    })))
}

pub async fn get_verification_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let verification = app_state.db_client
        .get_verification(user.user.id)
        .await
        .ok_or_else(|| HttpError::not_found("No verification documents submitted yet"))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": VerificationResponse::from_verification(&verification)
    })))
}
