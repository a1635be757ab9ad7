//! robosim-server: authenticated HTTP API for a simulated robot
//!
//! Public routes: `/status` and `/auth/login`. Everything under `/robot`
//! requires a bearer token issued by the login route.

pub mod error;
pub mod handlers;
pub mod state;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use state::{AppState, SharedState};

/// Build the full application router
pub fn router(state: SharedState) -> Router {
    let robot = Router::new()
        .route("/start", post(handlers::start_handler))
        .route("/stop", post(handlers::stop_handler))
        .route("/reset", post(handlers::reset_handler))
        .route("/status", get(handlers::robot_status_handler))
        .route("/move", post(handlers::move_handler))
        .route("/go_to_floor", post(handlers::go_to_floor_handler))
        .route("/lift_status", get(handlers::lift_status_handler))
        .route("/logs", get(handlers::logs_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::require_token,
        ));

    Router::new()
        .route("/status", get(handlers::status_handler))
        .route("/auth/login", post(handlers::login_handler))
        .nest("/robot", robot)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
