//! robosim-core: Shared library for the simulated robot service
//!
//! This crate provides:
//! - JWT authentication and bearer token extraction
//! - Pluggable credential store (plaintext or argon2 hashes)
//! - Robot state machine with an append-only action log
//! - Configuration loading

pub mod auth;
pub mod config;
pub mod credentials;
pub mod robot;

pub use auth::{AuthError, Claims, JwtAuth};
pub use config::Config;
pub use credentials::{CredentialStore, UserStore};
pub use robot::{Direction, LogEntry, Position, Robot, RobotError, RobotStatus};

/// Default HTTP port for robosim-server
pub const DEFAULT_HTTP_PORT: u16 = 5000;

/// Default token lifetime in seconds (30 min)
pub const DEFAULT_TOKEN_TTL: u64 = 1800;

/// Lowest floor the lift serves
pub const MIN_FLOOR: u32 = 1;

/// Highest floor the lift serves
pub const MAX_FLOOR: u32 = 100;
