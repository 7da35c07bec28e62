use glam::Vec3;

/// A bounding sphere: world-space center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// A near/far classification flip for one sphere slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityChange {
    pub index: usize,
    pub visible: bool,
}

/// Ordered bounding-sphere set for one domain, evaluated against a reference
/// point each frame.
///
/// Classification is `distance(center, reference) - radius < threshold`.
/// Each sphere carries a tri-state classification: freshly added or rebuilt
/// spheres are `None` (unknown) and therefore always emit a change on their
/// first evaluation, so first-frame visibility is never silently skipped.
#[derive(Debug)]
pub struct BoundingVolumeIndex {
    spheres: Vec<Sphere>,
    visible: Vec<Option<bool>>,
    reference: Vec3,
    threshold: f32,
}

impl BoundingVolumeIndex {
    pub fn new(threshold: f32) -> Self {
        Self {
            spheres: Vec::new(),
            visible: Vec::new(),
            reference: Vec3::ZERO,
            threshold,
        }
    }

    /// Replace the entire backing array. All classification state resets to
    /// unknown.
    pub fn rebuild(&mut self, spheres: Vec<Sphere>) {
        self.visible = vec![None; spheres.len()];
        self.spheres = spheres;
    }

    /// Append one sphere in the unknown state. Returns its slot index.
    pub fn push(&mut self, center: Vec3, radius: f32) -> usize {
        self.spheres.push(Sphere::new(center, radius));
        self.visible.push(None);
        self.spheres.len() - 1
    }

    /// Remove every sphere.
    pub fn clear(&mut self) {
        self.spheres.clear();
        self.visible.clear();
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// Update the evaluation anchor. Called once per frame after observer
    /// movement.
    pub fn set_reference_point(&mut self, position: Vec3) {
        self.reference = position;
    }

    /// Configure the near/far boundary for this domain.
    pub fn set_threshold(&mut self, distance: f32) {
        self.threshold = distance;
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Relocate a sphere, e.g. after a manipulated object settles at a new
    /// position. The classification state is kept; if the move crosses the
    /// boundary the next evaluation emits the change.
    pub fn set_center(&mut self, index: usize, center: Vec3) -> bool {
        match self.spheres.get_mut(index) {
            Some(sphere) => {
                sphere.center = center;
                true
            }
            None => false,
        }
    }

    /// Reset one slot's classification to unknown so the next evaluation
    /// notifies unconditionally. Used when delivered state may have drifted
    /// from the committed classification, e.g. after suppressed toggles
    /// while an object was exempt.
    pub fn invalidate(&mut self, index: usize) -> bool {
        match self.visible.get_mut(index) {
            Some(state) => {
                *state = None;
                true
            }
            None => false,
        }
    }

    pub fn sphere(&self, index: usize) -> Option<Sphere> {
        self.spheres.get(index).copied()
    }

    /// Last known classification of a slot, `None` if not yet evaluated.
    pub fn is_visible(&self, index: usize) -> Option<bool> {
        self.visible.get(index).copied().flatten()
    }

    /// Evaluate every sphere against the current reference point, appending
    /// one `VisibilityChange` per sphere whose classification changed since
    /// the previous evaluation.
    pub fn evaluate(&mut self, out: &mut Vec<VisibilityChange>) {
        for (index, sphere) in self.spheres.iter().enumerate() {
            let now_visible =
                sphere.center.distance(self.reference) - sphere.radius < self.threshold;
            if self.visible[index] != Some(now_visible) {
                self.visible[index] = Some(now_visible);
                out.push(VisibilityChange {
                    index,
                    visible: now_visible,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(index: &mut BoundingVolumeIndex) -> Vec<VisibilityChange> {
        let mut out = Vec::new();
        index.evaluate(&mut out);
        out
    }

    #[test]
    fn first_evaluation_always_notifies() {
        let mut index = BoundingVolumeIndex::new(50.0);
        index.push(Vec3::ZERO, 1.0); // near
        index.push(Vec3::new(500.0, 0.0, 0.0), 1.0); // far
        index.set_reference_point(Vec3::ZERO);

        let out = changes(&mut index);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], VisibilityChange { index: 0, visible: true });
        assert_eq!(out[1], VisibilityChange { index: 1, visible: false });
    }

    #[test]
    fn no_change_no_notification() {
        let mut index = BoundingVolumeIndex::new(50.0);
        index.push(Vec3::ZERO, 1.0);
        index.set_reference_point(Vec3::ZERO);
        changes(&mut index);
        assert!(changes(&mut index).is_empty());
    }

    #[test]
    fn crossing_emits_exactly_once() {
        let mut index = BoundingVolumeIndex::new(50.0);
        index.push(Vec3::ZERO, 1.0);
        index.set_reference_point(Vec3::new(100.0, 0.0, 0.0));
        let out = changes(&mut index);
        assert_eq!(out, vec![VisibilityChange { index: 0, visible: false }]);

        // Move inside the threshold: one became-visible notification.
        index.set_reference_point(Vec3::new(40.0, 0.0, 0.0));
        let out = changes(&mut index);
        assert_eq!(out, vec![VisibilityChange { index: 0, visible: true }]);

        // Stay inside: silence.
        index.set_reference_point(Vec3::new(30.0, 0.0, 0.0));
        assert!(changes(&mut index).is_empty());

        // Leave again: one became-invisible notification.
        index.set_reference_point(Vec3::new(200.0, 0.0, 0.0));
        let out = changes(&mut index);
        assert_eq!(out, vec![VisibilityChange { index: 0, visible: false }]);
    }

    #[test]
    fn radius_counts_toward_visibility() {
        let mut index = BoundingVolumeIndex::new(50.0);
        // Center is 55 away but the radius closes the gap: 55 - 10 < 50.
        index.push(Vec3::new(55.0, 0.0, 0.0), 10.0);
        index.set_reference_point(Vec3::ZERO);
        let out = changes(&mut index);
        assert_eq!(out, vec![VisibilityChange { index: 0, visible: true }]);
    }

    #[test]
    fn threshold_change_reclassifies() {
        let mut index = BoundingVolumeIndex::new(50.0);
        index.push(Vec3::new(80.0, 0.0, 0.0), 1.0);
        index.set_reference_point(Vec3::ZERO);
        assert_eq!(changes(&mut index)[0].visible, false);

        // Widening the boundary flips the classification on the next pass.
        index.set_threshold(100.0);
        let out = changes(&mut index);
        assert_eq!(out, vec![VisibilityChange { index: 0, visible: true }]);
    }

    #[test]
    fn rebuild_resets_classification_state() {
        let mut index = BoundingVolumeIndex::new(50.0);
        index.push(Vec3::ZERO, 1.0);
        index.set_reference_point(Vec3::ZERO);
        changes(&mut index);

        index.rebuild(vec![Sphere::new(Vec3::ZERO, 1.0)]);
        // Same sphere, but after a rebuild the first evaluation notifies again.
        let out = changes(&mut index);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn set_center_relocation_reflects_in_next_evaluation() {
        let mut index = BoundingVolumeIndex::new(50.0);
        let slot = index.push(Vec3::ZERO, 1.0);
        index.set_reference_point(Vec3::ZERO);
        changes(&mut index);
        assert_eq!(index.is_visible(slot), Some(true));

        assert!(index.set_center(slot, Vec3::new(300.0, 0.0, 0.0)));
        let out = changes(&mut index);
        assert_eq!(out, vec![VisibilityChange { index: slot, visible: false }]);

        assert!(!index.set_center(99, Vec3::ZERO));
    }

    #[test]
    fn invalidate_forces_renotification() {
        let mut index = BoundingVolumeIndex::new(50.0);
        let slot = index.push(Vec3::ZERO, 1.0);
        index.set_reference_point(Vec3::ZERO);
        changes(&mut index);
        assert_eq!(index.is_visible(slot), Some(true));

        // No boundary crossing, but an invalidated slot re-notifies with its
        // current classification.
        assert!(index.invalidate(slot));
        assert_eq!(index.is_visible(slot), None);
        let out = changes(&mut index);
        assert_eq!(out, vec![VisibilityChange { index: slot, visible: true }]);

        // Settled state; no further notification without another invalidate.
        assert!(changes(&mut index).is_empty());
        assert!(!index.invalidate(99));
    }

    /// Randomized observer path: the delta stream must match brute-force
    /// classification at every step — no duplicates, none missed.
    #[test]
    fn randomized_path_matches_brute_force() {
        // Deterministic xorshift so the test is reproducible.
        let mut rng_state: u64 = 0x9e37_79b9;
        let mut next = move || {
            rng_state ^= rng_state << 13;
            rng_state ^= rng_state >> 7;
            rng_state ^= rng_state << 17;
            rng_state
        };
        let coord = |v: u64| (v % 2001) as f32 / 10.0 - 100.0; // [-100, 100]

        let mut index = BoundingVolumeIndex::new(60.0);
        let mut spheres = Vec::new();
        for _ in 0..64 {
            let center = Vec3::new(coord(next()), coord(next()), coord(next()));
            let radius = (next() % 50) as f32 / 10.0;
            spheres.push(Sphere::new(center, radius));
            index.push(center, radius);
        }

        let mut mirror: Vec<Option<bool>> = vec![None; spheres.len()];
        for _ in 0..200 {
            let observer = Vec3::new(coord(next()), coord(next()), coord(next()));
            index.set_reference_point(observer);
            let mut out = Vec::new();
            index.evaluate(&mut out);

            let mut expected = Vec::new();
            for (i, s) in spheres.iter().enumerate() {
                let visible = s.center.distance(observer) - s.radius < 60.0;
                if mirror[i] != Some(visible) {
                    mirror[i] = Some(visible);
                    expected.push(VisibilityChange { index: i, visible });
                }
            }
            assert_eq!(out, expected);
        }
    }
}
