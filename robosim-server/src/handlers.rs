//! HTTP handlers and the bearer-token middleware

use axum::{
    Json,
    body::Bytes,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use robosim_core::robot::{LiftStatus, StatusSnapshot, parse_floor};
use robosim_core::{AuthError, LogEntry};

use crate::error::ApiError;
use crate::state::SharedState;

/// Plain `{ "message": ... }` reply
#[derive(Serialize)]
pub struct MessageResponse {
    message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Login request body
#[derive(Deserialize, Default)]
pub struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    token: String,
}

#[derive(Deserialize, Default)]
pub struct MoveRequest {
    direction: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct FloorRequest {
    floor: Option<serde_json::Value>,
}

/// Missing or malformed bodies read as empty, so field validation decides
/// the reply.
fn lenient_body<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

/// Liveness endpoint
pub async fn status_handler() -> Json<MessageResponse> {
    MessageResponse::new("API is up")
}

pub async fn login_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<LoginResponse>, ApiError> {
    let req: LoginRequest = lenient_body(&body);
    let (Some(username), Some(password)) = (req.username, req.password) else {
        tracing::warn!("Login rejected: missing username or password");
        return Err(AuthError::InvalidCredentials.into());
    };

    let s = state.read().await;
    if !s.credentials.verify(&username, &password) {
        tracing::warn!("Login rejected for {}", username);
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = s.jwt_auth.issue_token(&username)?;
    tracing::info!("Issued token for {}", username);

    Ok(Json(LoginResponse { token }))
}

/// Reject requests without a valid bearer token.
///
/// Decoded claims are stored in the request extensions.
pub async fn require_token(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let claims = {
        let s = state.read().await;
        s.jwt_auth.authorize(auth_header)
    };

    match claims {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
            Err(e.into())
        }
    }
}

pub async fn start_handler(State(state): State<SharedState>) -> Result<Json<MessageResponse>, ApiError> {
    state.write().await.robot.start()?;
    Ok(MessageResponse::new("Robot started"))
}

pub async fn stop_handler(State(state): State<SharedState>) -> Json<MessageResponse> {
    state.write().await.robot.stop();
    MessageResponse::new("Robot stopped")
}

pub async fn reset_handler(State(state): State<SharedState>) -> Json<MessageResponse> {
    state.write().await.robot.reset();
    MessageResponse::new("Robot reset")
}

pub async fn robot_status_handler(State(state): State<SharedState>) -> Json<StatusSnapshot> {
    Json(state.read().await.robot.status())
}

pub async fn move_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let req: MoveRequest = lenient_body(&body);
    let direction = state.write().await.robot.move_to(req.direction.as_deref())?;
    Ok(MessageResponse::new(format!("Moved {}", direction)))
}

pub async fn go_to_floor_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let req: FloorRequest = lenient_body(&body);
    let floor = parse_floor(req.floor.as_ref())?;
    let floor = state.write().await.robot.go_to_floor(floor)?;
    Ok(MessageResponse::new(format!("Robot requested lift to floor {}", floor)))
}

pub async fn lift_status_handler(State(state): State<SharedState>) -> Json<LiftStatus> {
    Json(state.read().await.robot.lift_status())
}

pub async fn logs_handler(State(state): State<SharedState>) -> Json<Vec<LogEntry>> {
    let s = state.read().await;
    tracing::debug!(entries = s.robot.logs().len(), "Serving action log");
    Json(s.robot.logs().to_vec())
}
