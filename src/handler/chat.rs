use std::sync::Arc;

use axum::{
    extract::Query,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::chatdtos::{SendMessageDto, ThreadQueryDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn chat_handler() -> Router {
    Router::new()
        .route("/send", post(send_message))
        .route("/conversations", get(get_conversations))
        .route("/thread", get(get_thread))
}

pub async fn send_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<SendMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let message = app_state.chat_service
        .send(user.user.id, body.receiver_id, body.listing_id, &body.body)
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": { "message": message }
    })))
}

pub async fn get_conversations(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let conversations = app_state.chat_service
        .conversations(user.user.id)
        .await;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "conversations": conversations,
            "total": conversations.len()
        }
    })))
}

pub async fn get_thread(
    Query(query): Query<ThreadQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let messages = app_state.chat_service
        .thread(user.user.id, query.other_party_id, query.listing_id)
        .await;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": { "messages": messages }
    })))
}
