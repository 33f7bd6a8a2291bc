use std::sync::Arc;

use axum::{response::IntoResponse, routing::post, Extension, Json, Router};
use validator::Validate;

use crate::{
    dtos::reportdtos::CreateReportDto,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn reports_handler() -> Router {
    Router::new().route("/", post(create_report))
}

pub async fn create_report(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateReportDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let report = app_state.report_service
        .report(user.user.id, body.target_type, body.target_id.as_deref(), &body.reason)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Thank you. An administrator will review your report",
        "data": { "report": report }
    })))
}
