//! Shared server state

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::RwLock;

use robosim_core::{Config, CredentialStore, JwtAuth, Robot, UserStore};

pub type SharedState = Arc<RwLock<AppState>>;

/// Shared application state
///
/// The whole record sits behind one lock; mutating routes hold the write
/// guard for their full read-modify-respond step.
pub struct AppState {
    /// JWT authentication handler
    pub jwt_auth: JwtAuth,

    /// Accounts accepted by the login route
    pub credentials: Box<dyn CredentialStore>,

    /// The simulated robot
    pub robot: Robot,
}

impl AppState {
    pub fn new(jwt_auth: JwtAuth, credentials: impl CredentialStore + 'static, robot: Robot) -> Self {
        Self {
            jwt_auth,
            credentials: Box::new(credentials),
            robot,
        }
    }

    /// Build state from a loaded config
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let jwt_secret = match config.server.jwt_secret_bytes()? {
            Some(secret) => secret,
            None => {
                let secret = robosim_core::auth::generate_secret();
                tracing::info!("Generated random JWT secret (will change on restart)");
                secret.to_vec()
            }
        };

        let jwt_auth = JwtAuth::new(&jwt_secret, Some(config.server.access_token_ttl));
        let credentials =
            UserStore::from_config(&config.users).context("Invalid [[users]] entry in config")?;
        if credentials.is_empty() {
            tracing::warn!("No users configured, every login will be rejected");
        }

        Ok(Self::new(
            jwt_auth,
            credentials,
            Robot::new(config.robot.initial_battery),
        ))
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }
}
