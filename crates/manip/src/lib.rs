//! Manipulation exemptions: objects currently grabbed by the user are
//! excluded from static-culling assumptions, then re-admitted once their
//! motion settles after release.
//!
//! Live position sync for every object every frame is too costly; it is
//! opt-in only while an object is being manipulated. Settling is an
//! explicit deadline comparison polled once per frame tick, not a timer
//! construct.
//!
//! # Invariants
//! - An exempt object is never activation-toggled by the dispatch pass.
//! - A re-grab at any point before settling aborts the previous release.
//! - An object that never settles stays exempt (and visible) indefinitely.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use glam::Vec3;
use sightline_common::{Domain, ObjectHandle};

/// Position and velocity primitives exposed by the physics subsystem,
/// consumed for settle polling.
pub trait MotionSource {
    fn velocity(&self, handle: ObjectHandle) -> Vec3;
    fn position(&self, handle: ObjectHandle) -> Vec3;
}

/// Where an exempt object lives in its domain's index, stamped with the
/// world generation it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct ExemptSlot {
    pub domain: Domain,
    pub sphere_index: usize,
    pub generation: u64,
}

/// A released object whose motion has settled; its bounding sphere should be
/// relocated to `position` and static culling resumed from there.
#[derive(Debug, Clone, Copy)]
pub struct Settled {
    pub handle: ObjectHandle,
    pub domain: Domain,
    pub sphere_index: usize,
    pub position: Vec3,
}

/// Tracks objects temporarily excluded from static culling while grabbed,
/// with delayed re-admission after release.
#[derive(Debug)]
pub struct ManipulationSet {
    exempt: HashMap<ObjectHandle, ExemptSlot>,
    settling: HashMap<ObjectHandle, Instant>,
    delay: Duration,
    epsilon: f32,
}

impl ManipulationSet {
    pub fn new(delay: Duration, epsilon: f32) -> Self {
        Self {
            exempt: HashMap::new(),
            settling: HashMap::new(),
            delay,
            epsilon,
        }
    }

    /// Begin exempting a grabbed object. Cancels any pending settle flow for
    /// the handle: a re-grab during settling aborts the previous release.
    pub fn start_tracking(&mut self, handle: ObjectHandle, slot: ExemptSlot) {
        if self.settling.remove(&handle).is_some() {
            tracing::debug!(?handle, "re-grab cancelled pending settle");
        }
        self.exempt.insert(handle, slot);
    }

    /// Release a grabbed object: it stays exempt, and becomes a settle
    /// candidate once the delay elapses. Returns false for handles that were
    /// never tracked.
    pub fn stop_tracking(&mut self, handle: ObjectHandle, now: Instant) -> bool {
        if !self.exempt.contains_key(&handle) {
            return false;
        }
        self.settling.insert(handle, now + self.delay);
        true
    }

    /// Whether the object is currently excluded from activation toggling.
    pub fn is_exempt(&self, handle: ObjectHandle) -> bool {
        self.exempt.contains_key(&handle)
    }

    /// Whether the object has been released and awaits settling.
    pub fn is_settling(&self, handle: ObjectHandle) -> bool {
        self.settling.contains_key(&handle)
    }

    pub fn exempt_count(&self) -> usize {
        self.exempt.len()
    }

    /// Drop every entry belonging to a domain (domain reset).
    pub fn clear_domain(&mut self, domain: Domain) {
        self.exempt.retain(|handle, slot| {
            let keep = slot.domain != domain;
            if !keep {
                self.settling.remove(handle);
            }
            keep
        });
    }

    /// Drop everything (world unload).
    pub fn clear(&mut self) {
        self.exempt.clear();
        self.settling.clear();
    }

    /// Poll released objects whose settle deadline has passed. Each one with
    /// velocity magnitude at or below the epsilon is removed from both sets
    /// and reported with its current world position; the rest stay exempt
    /// and are retried next frame. Entries from a stale world generation are
    /// dropped silently.
    pub fn poll(
        &mut self,
        now: Instant,
        motion: &dyn MotionSource,
        current_generation: u64,
    ) -> Vec<Settled> {
        let mut settled = Vec::new();
        let due: Vec<ObjectHandle> = self
            .settling
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(handle, _)| *handle)
            .collect();

        for handle in due {
            let Some(slot) = self.exempt.get(&handle).copied() else {
                self.settling.remove(&handle);
                continue;
            };
            if slot.generation != current_generation {
                self.exempt.remove(&handle);
                self.settling.remove(&handle);
                continue;
            }
            let velocity = motion.velocity(handle);
            if velocity.length() <= self.epsilon {
                self.exempt.remove(&handle);
                self.settling.remove(&handle);
                let position = motion.position(handle);
                tracing::debug!(?handle, ?position, "object settled, resuming static culling");
                settled.push(Settled {
                    handle,
                    domain: slot.domain,
                    sphere_index: slot.sphere_index,
                    position,
                });
            }
        }
        settled
    }
}

pub fn crate_info() -> &'static str {
    "sightline-manip v0.1.0"
}
