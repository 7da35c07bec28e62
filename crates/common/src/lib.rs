//! Shared types for the sightline culling subsystem.
//!
//! # Invariants
//! - Handles are opaque; the culling subsystem never owns object lifetime.
//! - Configuration is validated once at startup and immutable afterwards.

pub mod config;
pub mod types;

pub use config::{ConfigError, CullConfig, TierConfig};
pub use types::{Domain, ObjectHandle};

pub fn crate_info() -> &'static str {
    "sightline-common v0.1.0"
}
