use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use super::AppState;
use crate::services::ContactRequest;
use crate::StorefrontError;

pub async fn send_message(State(s): State<AppState>, Json(r): Json<ContactRequest>) -> Result<(StatusCode, Json<Value>), StorefrontError> {
    s.contact.submit(r).await?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "message": "Message sent" }))))
}
