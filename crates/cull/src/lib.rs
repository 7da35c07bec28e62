//! Culling facade: one owned context tying together the per-domain
//! visibility indices, registries, realization queues and manipulation
//! exemptions.
//!
//! # Invariants
//! - All state lives in the explicit [`Culler`] context passed by reference;
//!   no hidden singletons.
//! - All mutation flows through explicit operations on the context.
//! - An object is realized at most once per world generation.
//! - Per-object failures never abort the frame update; only configuration
//!   errors are fatal.

mod culler;
mod inspect;

pub use culler::{CullStats, Culler, RegisterError};
pub use inspect::{CullSummary, DomainSummary};

// Host-facing traits and shared types, re-exported so embedders depend on
// one crate.
pub use sightline_common::{ConfigError, CullConfig, Domain, ObjectHandle, TierConfig};
pub use sightline_manip::MotionSource;
pub use sightline_realize::{RealizeError, RealizeHost};

pub fn crate_info() -> &'static str {
    "sightline-cull v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("cull"));
    }
}
