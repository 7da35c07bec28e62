use std::time::{Duration, Instant};

use glam::Vec3;
use sightline_common::{ConfigError, CullConfig, Domain, ObjectHandle};
use sightline_index::{BoundingVolumeIndex, ObjectRegistry, VisibilityChange};
use sightline_manip::{ExemptSlot, ManipulationSet, MotionSource};
use sightline_realize::{FrameBudget, FrameTimer, RealizeHost, RealizeQueue};

/// Errors from object registration.
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    /// The object has no derivable bounding volume. It is never registered,
    /// never culled, never realized.
    #[error("object {handle:?} has no usable bounding volume (radius {radius})")]
    MissingBounds { handle: ObjectHandle, radius: f32 },
}

/// Per-frame counters filled by [`Culler::update`].
#[derive(Debug, Clone, Default)]
pub struct CullStats {
    /// Visibility classification flips across all enabled domains.
    pub changes: usize,
    /// Objects enqueued for first-time realization this frame.
    pub enqueued: usize,
    /// Realize calls completed this frame.
    pub realized: usize,
    /// Realize calls that failed terminally this frame.
    pub failed: usize,
    /// Queue entries dropped because their world generation was stale.
    pub stale_dropped: usize,
    /// Cheap activation toggles issued to the host.
    pub toggles: usize,
    /// Manipulated objects re-admitted to static culling this frame.
    pub settled: usize,
    /// Entries still pending across all queues after the drain.
    pub pending: usize,
    pub frame_time: Duration,
}

/// Everything one domain owns: its sphere index, its registry and its
/// realization queue, plus a reused change-scratch buffer.
struct DomainState {
    volume: BoundingVolumeIndex,
    registry: ObjectRegistry,
    queue: RealizeQueue,
    changes: Vec<VisibilityChange>,
}

impl DomainState {
    fn new(domain: Domain, threshold: f32) -> Self {
        Self {
            volume: BoundingVolumeIndex::new(threshold),
            registry: ObjectRegistry::new(domain),
            queue: RealizeQueue::new(domain),
            changes: Vec::new(),
        }
    }
}

/// The culling context. Owns all per-domain state, the manipulation
/// exemptions, the frame budget and the world generation counter; passed by
/// reference into every operation.
pub struct Culler {
    config: CullConfig,
    domains: [DomainState; Domain::COUNT],
    manip: ManipulationSet,
    budget: FrameBudget,
    timer: FrameTimer,
    generation: u64,
    observer: Option<ObjectHandle>,
    stats: CullStats,
}

impl Culler {
    /// Build a culler from a validated configuration. Configuration errors
    /// are fatal: the subsystem refuses to initialize.
    pub fn new(config: CullConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let domains = Domain::ALL.map(|domain| DomainState::new(domain, config.threshold(domain)));
        let manip = ManipulationSet::new(config.settle_delay, config.settle_epsilon);
        let budget = FrameBudget::new(config.budget_fraction, config.fallback_frame_rate);
        Ok(Self {
            config,
            domains,
            manip,
            budget,
            timer: FrameTimer::new(240),
            generation: 1,
            observer: None,
            stats: CullStats::default(),
        })
    }

    pub fn config(&self) -> &CullConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn observer(&self) -> Option<ObjectHandle> {
        self.observer
    }

    /// Counters from the most recent update.
    pub fn stats(&self) -> &CullStats {
        &self.stats
    }

    /// Recent update durations for instrumentation.
    pub fn frame_timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn tracked_count(&self, domain: Domain) -> usize {
        self.domains[domain.index()].registry.len()
    }

    pub fn realized_count(&self, domain: Domain) -> usize {
        self.domains[domain.index()].registry.realized_count()
    }

    pub fn pending_count(&self, domain: Domain) -> usize {
        self.domains[domain.index()].queue.len()
    }

    pub fn exempt_count(&self) -> usize {
        self.manip.exempt_count()
    }

    /// Domain an object was registered under, if any.
    pub fn domain_of(&self, handle: ObjectHandle) -> Option<Domain> {
        Domain::ALL
            .into_iter()
            .find(|domain| self.domains[domain.index()].registry.slot_of(handle).is_some())
    }

    /// Whether an object has been realized in the current world generation.
    pub fn is_realized(&self, handle: ObjectHandle) -> bool {
        self.domain_of(handle)
            .and_then(|domain| self.domains[domain.index()].registry.get_by_handle(handle))
            .is_some_and(|obj| obj.realized)
    }

    /// Register a static object under an explicit domain. Returns its slot.
    ///
    /// Objects without a usable bounding volume are rejected and never enter
    /// any index. Registering an already-known handle returns its existing
    /// slot.
    pub fn register_static(
        &mut self,
        domain: Domain,
        handle: ObjectHandle,
        center: Vec3,
        radius: f32,
    ) -> Result<usize, RegisterError> {
        if !(center.is_finite() && radius.is_finite() && radius > 0.0) {
            tracing::warn!(
                ?handle,
                %domain,
                radius,
                "no usable bounding volume; object will never be culled or realized"
            );
            return Err(RegisterError::MissingBounds { handle, radius });
        }
        let state = &mut self.domains[domain.index()];
        if let Some(slot) = state.registry.slot_of(handle) {
            tracing::debug!(?handle, %domain, slot, "handle already registered");
            return Ok(slot);
        }
        let sphere_index = state.volume.push(center, radius);
        let slot = state.registry.register(handle, sphere_index, self.generation);
        tracing::trace!(?handle, %domain, slot, "registered static object");
        Ok(slot)
    }

    /// Register a static mesh, classifying its size tier from the
    /// bounding-sphere diameter.
    pub fn register_mesh(
        &mut self,
        handle: ObjectHandle,
        center: Vec3,
        radius: f32,
    ) -> Result<(Domain, usize), RegisterError> {
        let domain = self.config.classify_mesh(radius * 2.0);
        let slot = self.register_static(domain, handle, center, radius)?;
        Ok((domain, slot))
    }

    /// Clear a domain entirely before repopulating it. Cancels the domain's
    /// pending realizations and manipulation entries so nothing dangles.
    pub fn reset_domain(&mut self, domain: Domain) {
        let state = &mut self.domains[domain.index()];
        let dropped = state.registry.len();
        state.registry.reset();
        state.volume.clear();
        let cancelled = state.queue.cancel_all();
        self.manip.clear_domain(domain);
        tracing::debug!(%domain, dropped, cancelled, "domain reset");
    }

    /// Begin exempting a grabbed object from static-culling assumptions.
    /// Unknown handles are ignored.
    pub fn start_tracking(&mut self, handle: ObjectHandle) -> bool {
        for domain in Domain::ALL {
            if let Some(obj) = self.domains[domain.index()].registry.get_by_handle(handle) {
                self.manip.start_tracking(
                    handle,
                    ExemptSlot {
                        domain,
                        sphere_index: obj.sphere_index,
                        generation: obj.generation,
                    },
                );
                return true;
            }
        }
        tracing::debug!(?handle, "start_tracking for unregistered handle ignored");
        false
    }

    /// Release a grabbed object; it stays exempt until the settle delay
    /// elapses and its velocity reads settled.
    pub fn stop_tracking(&mut self, handle: ObjectHandle) -> bool {
        if self.manip.stop_tracking(handle, Instant::now()) {
            return true;
        }
        tracing::debug!(?handle, "stop_tracking for untracked handle ignored");
        false
    }

    /// World teardown: everything is invalidated, stale work from the old
    /// generation is dropped silently wherever it surfaces.
    pub fn on_world_unloaded(&mut self) {
        self.begin_generation();
        self.observer = None;
        tracing::info!(generation = self.generation, "world unloaded; culling state cleared");
    }

    /// World switch-in: record the observer and start a fresh generation
    /// awaiting registrations.
    pub fn on_world_loaded(&mut self, observer: ObjectHandle) {
        self.begin_generation();
        self.observer = Some(observer);
        tracing::info!(generation = self.generation, ?observer, "world loaded");
    }

    fn begin_generation(&mut self) {
        self.generation += 1;
        for state in &mut self.domains {
            state.registry.reset();
            state.volume.clear();
            state.queue.cancel_all();
        }
        self.manip.clear();
    }

    /// The per-frame tick, run on the host's update thread.
    ///
    /// Order matters: settle polling first so a re-admitted object is
    /// evaluated at its new location this frame, then evaluation and
    /// dispatch per enabled domain, then the budgeted queue drain.
    pub fn update(
        &mut self,
        observer_position: Vec3,
        frame_rate_hint: Option<f32>,
        host: &mut dyn RealizeHost,
        motion: &dyn MotionSource,
    ) -> &CullStats {
        let _span = tracing::info_span!("cull_update", generation = self.generation).entered();
        let tick_start = Instant::now();
        let mut stats = CullStats::default();

        // Re-admit settled objects at their release position. Toggles were
        // suppressed while the object was exempt, so the delivered activation
        // may lag the committed classification; invalidating the slot makes
        // the next evaluation re-notify and re-sync it.
        for settled in self.manip.poll(tick_start, motion, self.generation) {
            let state = &mut self.domains[settled.domain.index()];
            if state.volume.set_center(settled.sphere_index, settled.position) {
                state.volume.invalidate(settled.sphere_index);
                stats.settled += 1;
            }
        }

        // Evaluate each enabled domain and dispatch its visibility changes.
        for domain in Domain::ALL {
            if !self.config.is_enabled(domain) {
                continue;
            }
            let state = &mut self.domains[domain.index()];
            state.volume.set_reference_point(observer_position);
            state.changes.clear();
            state.volume.evaluate(&mut state.changes);
            stats.changes += state.changes.len();

            let DomainState {
                registry,
                queue,
                changes,
                ..
            } = state;
            for change in changes.iter() {
                let Some(obj) = registry.get_mut(change.index) else {
                    continue;
                };
                if obj.realized {
                    // Exempt objects are left untouched by the toggle step.
                    if self.manip.is_exempt(obj.handle) {
                        continue;
                    }
                    host.set_active(obj.handle, change.visible);
                    stats.toggles += 1;
                } else if change.visible && !obj.requested && !obj.failed {
                    // First-ever visibility this generation: enqueue once.
                    obj.requested = true;
                    queue.push(obj.handle, obj.generation);
                    stats.enqueued += 1;
                }
            }
        }

        // Drain the queues round-robin within the time budget, measured from
        // the start of the tick so evaluation cost counts against it. At
        // least one entry is processed per tick so a tiny budget still makes
        // progress.
        let budget = self.budget.for_frame(frame_rate_hint);
        let mut processed_any = false;
        'drain: loop {
            let mut advanced = false;
            for domain in Domain::ALL {
                if processed_any && tick_start.elapsed() >= budget {
                    break 'drain;
                }
                let state = &mut self.domains[domain.index()];
                let Some(entry) = state.queue.pop() else {
                    continue;
                };
                advanced = true;
                processed_any = true;
                if entry.generation != self.generation {
                    stats.stale_dropped += 1;
                    continue;
                }
                let Some(obj) = state.registry.get_by_handle_mut(entry.handle) else {
                    stats.stale_dropped += 1;
                    continue;
                };
                if obj.realized {
                    continue;
                }
                match host.realize(entry.handle) {
                    Ok(()) => {
                        obj.realized = true;
                        stats.realized += 1;
                        // The object may have flickered invisible while
                        // queued; sync the toggle with the current
                        // classification.
                        let visible = state.volume.is_visible(obj.sphere_index).unwrap_or(true);
                        if !self.manip.is_exempt(entry.handle) {
                            host.set_active(entry.handle, visible);
                        }
                    }
                    Err(err) => {
                        obj.failed = true;
                        stats.failed += 1;
                        tracing::warn!(
                            handle = ?entry.handle,
                            %domain,
                            error = %err,
                            "realize failed; object stays absent"
                        );
                    }
                }
            }
            if !advanced {
                break;
            }
        }

        stats.pending = self.domains.iter().map(|d| d.queue.len()).sum();
        stats.frame_time = tick_start.elapsed();
        self.timer.record(stats.frame_time);
        tracing::trace!(
            changes = stats.changes,
            enqueued = stats.enqueued,
            realized = stats.realized,
            toggles = stats.toggles,
            pending = stats.pending,
            "cull update complete"
        );
        self.stats = stats;
        &self.stats
    }
}
