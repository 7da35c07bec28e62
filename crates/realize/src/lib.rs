//! Lazy realization: per-domain FIFO queues of objects awaiting one-time
//! construction, drained cooperatively under a per-frame time budget.
//!
//! # Invariants
//! - A handle appears at most once in its domain's queue at any time
//!   (guarded upstream by the tracked object's `requested` flag).
//! - Entries are never reprocessed: dequeue is terminal, the outcome is
//!   Realized, Failed, or silently dropped as stale.
//! - The drain never blocks; remaining entries simply carry over to the
//!   next frame.

mod budget;
mod queue;

use sightline_common::ObjectHandle;

pub use budget::{FrameBudget, FrameTimer};
pub use queue::{PendingRealize, RealizeQueue};

/// Host failure while building an object's renderable/audible
/// representation. Per-object failures never abort the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum RealizeError {
    #[error("resource construction failed: {0}")]
    Construction(String),
    #[error("host rejected handle {0:?}")]
    Rejected(ObjectHandle),
}

/// The external collaborator that builds and toggles object representations.
///
/// `realize` is called at most once per handle per world generation;
/// `set_active` is the cheap show/hide toggle for already-realized objects
/// and must not destroy resources.
pub trait RealizeHost {
    fn realize(&mut self, handle: ObjectHandle) -> Result<(), RealizeError>;
    fn set_active(&mut self, handle: ObjectHandle, active: bool);
}

pub fn crate_info() -> &'static str {
    "sightline-realize v0.1.0"
}
