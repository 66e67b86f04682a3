//! Service-error to HTTP mapping
//!
//! Upstream and internal failures never leak details to the caller; the
//! specifics go to the log, the response carries a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::error::ServiceError;

pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            ServiceError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "errors": errors }),
            ),
            ServiceError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "error": format!("{what} não encontrado") }),
            ),
            ServiceError::Upstream(context) => {
                error!(%context, "upstream failure");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "success": false, "error": "serviço externo indisponível" }),
                )
            }
            ServiceError::Configuration(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "error": message }),
            ),
            ServiceError::Internal(cause) => {
                error!(%cause, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "success": false, "error": "erro interno" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
