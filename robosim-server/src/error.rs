//! HTTP error mapping

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use robosim_core::{AuthError, RobotError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Robot(#[from] RobotError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::EncodingError(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Robot(RobotError::AlreadyStarted) => StatusCode::CONFLICT,
            ApiError::Robot(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("{}", message);
        }

        // Conflicts are reported under "error", everything else under "message"
        let body = if status == StatusCode::CONFLICT {
            serde_json::json!({ "error": message })
        } else {
            serde_json::json!({ "message": message })
        };

        (status, Json(body)).into_response()
    }
}
