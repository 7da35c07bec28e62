use std::collections::HashMap;

use sightline_common::{Domain, ObjectHandle};

/// Per-object culling state for one registered object.
///
/// `realized` flips true exactly once per world generation; `requested`
/// guards the realization queue against duplicate entries under visibility
/// flicker; `failed` marks a terminal realization failure.
#[derive(Debug, Clone, Copy)]
pub struct TrackedObject {
    pub handle: ObjectHandle,
    pub domain: Domain,
    pub sphere_index: usize,
    pub realized: bool,
    pub requested: bool,
    pub failed: bool,
    pub generation: u64,
}

/// Slot ⇄ handle registry for one domain.
///
/// Slot N here corresponds to sphere N in the domain's
/// `BoundingVolumeIndex`; the two are appended and reset in lockstep.
#[derive(Debug)]
pub struct ObjectRegistry {
    domain: Domain,
    objects: Vec<TrackedObject>,
    by_handle: HashMap<ObjectHandle, usize>,
}

impl ObjectRegistry {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            objects: Vec::new(),
            by_handle: HashMap::new(),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Register a handle and return its slot. Registering a handle that is
    /// already present returns its existing slot without growing the set.
    pub fn register(&mut self, handle: ObjectHandle, sphere_index: usize, generation: u64) -> usize {
        if let Some(&slot) = self.by_handle.get(&handle) {
            return slot;
        }
        let slot = self.objects.len();
        self.objects.push(TrackedObject {
            handle,
            domain: self.domain,
            sphere_index,
            realized: false,
            requested: false,
            failed: false,
            generation,
        });
        self.by_handle.insert(handle, slot);
        slot
    }

    /// Clear the domain entirely, e.g. before repopulating for a new world.
    /// Callers must also cancel the domain's queue and exemption entries so
    /// no dangling references survive.
    pub fn reset(&mut self) {
        self.objects.clear();
        self.by_handle.clear();
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&TrackedObject> {
        self.objects.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut TrackedObject> {
        self.objects.get_mut(slot)
    }

    pub fn slot_of(&self, handle: ObjectHandle) -> Option<usize> {
        self.by_handle.get(&handle).copied()
    }

    pub fn get_by_handle(&self, handle: ObjectHandle) -> Option<&TrackedObject> {
        self.slot_of(handle).and_then(|slot| self.get(slot))
    }

    pub fn get_by_handle_mut(&mut self, handle: ObjectHandle) -> Option<&mut TrackedObject> {
        match self.slot_of(handle) {
            Some(slot) => self.get_mut(slot),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.iter()
    }

    /// Number of objects realized in the current registration set.
    pub fn realized_count(&self) -> usize {
        self.objects.iter().filter(|o| o.realized).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_assigns_sequential_slots() {
        let mut registry = ObjectRegistry::new(Domain::Npc);
        let a = ObjectHandle::new();
        let b = ObjectHandle::new();
        assert_eq!(registry.register(a, 0, 1), 0);
        assert_eq!(registry.register(b, 1, 1), 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.slot_of(b), Some(1));
    }

    #[test]
    fn duplicate_registration_returns_existing_slot() {
        let mut registry = ObjectRegistry::new(Domain::SmallMesh);
        let handle = ObjectHandle::new();
        let slot = registry.register(handle, 0, 1);
        assert_eq!(registry.register(handle, 5, 1), slot);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn fresh_objects_are_unrealized() {
        let mut registry = ObjectRegistry::new(Domain::Sound);
        let slot = registry.register(ObjectHandle::new(), 0, 3);
        let obj = registry.get(slot).unwrap();
        assert!(!obj.realized);
        assert!(!obj.requested);
        assert!(!obj.failed);
        assert_eq!(obj.generation, 3);
        assert_eq!(obj.domain, Domain::Sound);
    }

    #[test]
    fn reset_clears_everything() {
        let mut registry = ObjectRegistry::new(Domain::LargeMesh);
        let handle = ObjectHandle::new();
        registry.register(handle, 0, 1);
        registry.reset();
        assert!(registry.is_empty());
        assert_eq!(registry.slot_of(handle), None);
    }

    #[test]
    fn realized_count_tracks_flag() {
        let mut registry = ObjectRegistry::new(Domain::MediumMesh);
        let slot = registry.register(ObjectHandle::new(), 0, 1);
        registry.register(ObjectHandle::new(), 1, 1);
        assert_eq!(registry.realized_count(), 0);
        registry.get_mut(slot).unwrap().realized = true;
        assert_eq!(registry.realized_count(), 1);
    }
}
