use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::StorefrontError;

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (status, axum::Json(json!({ "error": code, "message": message.into() }))).into_response()
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        match &self {
            Self::Remote { .. } | Self::Transport(_) => {
                tracing::error!(error = %self, "Commerce platform call failed");
                json_error(StatusCode::BAD_GATEWAY, "remote_service_error", self.to_string())
            }
            Self::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", self.to_string()),
            Self::EmailDelivery { status } => {
                tracing::error!(status, "Email delivery failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "email_delivery_failed", "Failed to send email")
            }
            Self::Database(e) => {
                tracing::error!(error = %e, "Order store failure");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "internal storage error")
            }
            Self::InvalidSignature(reason) => json_error(StatusCode::UNAUTHORIZED, "invalid_signature", *reason),
            Self::Validation(msg) => json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (StorefrontError::not_found("Order"), StatusCode::NOT_FOUND),
            (StorefrontError::EmailDelivery { status: 400 }, StatusCode::INTERNAL_SERVER_ERROR),
            (StorefrontError::InvalidSignature("mismatch"), StatusCode::UNAUTHORIZED),
            (StorefrontError::Validation("bad".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (
                StorefrontError::Remote { status: StatusCode::BAD_REQUEST, message: "nope".into() },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
