use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::AppState;
use crate::remote::{PaymentRecord, RemoteOrder};
use crate::services::{CreateOrderRequest, CreatePaymentRequest};
use crate::StorefrontError;

#[derive(Debug, Deserialize)]
pub struct CompletePaymentRequest {
    pub payment_id: String,
}

pub async fn create_order(State(s): State<AppState>, Json(r): Json<CreateOrderRequest>) -> Result<(StatusCode, Json<RemoteOrder>), StorefrontError> {
    Ok((StatusCode::CREATED, Json(s.checkout.create_order(r).await?)))
}

pub async fn create_payment(State(s): State<AppState>, Json(r): Json<CreatePaymentRequest>) -> Result<(StatusCode, Json<PaymentRecord>), StorefrontError> {
    Ok((StatusCode::CREATED, Json(s.checkout.create_payment(r).await?)))
}

pub async fn complete_payment(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<CompletePaymentRequest>) -> Result<Json<RemoteOrder>, StorefrontError> {
    if r.payment_id.is_empty() {
        return Err(StorefrontError::Validation("payment_id must not be empty".into()));
    }
    Ok(Json(s.checkout.complete_payment(&id, &r.payment_id).await?))
}

pub async fn get_order(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<RemoteOrder>, StorefrontError> {
    Ok(Json(s.checkout.order(&id).await?))
}

pub async fn customer_orders(State(s): State<AppState>, Path(email): Path<String>) -> Result<Json<Vec<RemoteOrder>>, StorefrontError> {
    Ok(Json(s.checkout.customer_orders(&email).await?))
}
