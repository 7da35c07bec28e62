//! Spatial visibility index: bounding-sphere sets evaluated against a moving
//! observer, plus the slot ⇄ handle registry for each domain.
//!
//! # Invariants
//! - The sphere array and the tracked-object registry for a domain have the
//!   same length after every commit; slot N in one refers to slot N in the
//!   other.
//! - Every true near/far classification crossing produces exactly one change
//!   notification; fresh spheres always notify on their first evaluation.

mod registry;
mod volume;

pub use registry::{ObjectRegistry, TrackedObject};
pub use volume::{BoundingVolumeIndex, Sphere, VisibilityChange};

pub fn crate_info() -> &'static str {
    "sightline-index v0.1.0"
}
