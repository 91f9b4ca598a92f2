use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use railbook_core::{BoxError, EngineError};

#[derive(Debug)]
pub enum AppError {
    Engine(EngineError),
    Internal(anyhow::Error),
}

impl AppError {
    pub fn storage(err: BoxError) -> Self {
        AppError::Internal(anyhow::anyhow!("{err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Engine(err) => {
                let status = match &err {
                    EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    EngineError::InsufficientSeats { .. } => StatusCode::CONFLICT,
                    EngineError::InvalidState { .. } => StatusCode::CONFLICT,
                    EngineError::AlreadyReleased => StatusCode::CONFLICT,
                    EngineError::PaymentDeclined(_) => StatusCode::PAYMENT_REQUIRED,
                    EngineError::NotFound(_) => StatusCode::NOT_FOUND,
                    EngineError::Storage(_) => {
                        tracing::error!("storage failure: {err}");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.to_string())
            }
            AppError::Internal(err) => {
                tracing::error!("internal server error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::Engine(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}
