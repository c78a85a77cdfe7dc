use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;

/// Handle to a geometry buffer owned by a [`GeometryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeometryId(u64);

impl GeometryId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allocation counters for the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub allocated: u64,
    pub released: u64,
    pub live: usize,
    pub live_bytes: usize,
}

/// Owner of every live geometry buffer.
///
/// Buffers stand in for renderer allocations that are not reclaimed
/// automatically: a buffer only leaves the store through [`release`], so a
/// mesh that swaps its geometry without releasing the old id leaks it, and
/// the leak shows up in [`live_count`].
///
/// [`release`]: GeometryStore::release
/// [`live_count`]: GeometryStore::live_count
#[derive(Debug, Default)]
pub struct GeometryStore {
    buffers: HashMap<GeometryId, Geometry>,
    next_id: u64,
    allocated: u64,
    released: u64,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a geometry and returns its handle.
    pub fn insert(&mut self, geometry: Geometry) -> GeometryId {
        let id = GeometryId(self.next_id);
        self.next_id += 1;
        self.allocated += 1;
        self.buffers.insert(id, geometry);
        id
    }

    pub fn get(&self, id: GeometryId) -> Option<&Geometry> {
        self.buffers.get(&id)
    }

    pub fn get_mut(&mut self, id: GeometryId) -> Option<&mut Geometry> {
        self.buffers.get_mut(&id)
    }

    pub fn contains(&self, id: GeometryId) -> bool {
        self.buffers.contains_key(&id)
    }

    /// Frees the buffer behind `id`, handing back its contents. Releasing an
    /// id twice is a no-op that returns `None`.
    pub fn release(&mut self, id: GeometryId) -> Option<Geometry> {
        let geometry = self.buffers.remove(&id);
        match &geometry {
            Some(_) => self.released += 1,
            None => tracing::warn!(%id, "release of unknown geometry"),
        }
        geometry
    }

    pub fn live_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            allocated: self.allocated,
            released: self.released,
            live: self.buffers.len(),
            live_bytes: self.buffers.values().map(Geometry::byte_size).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn tracks_allocations_and_releases() {
        let mut store = GeometryStore::new();
        let a = store.insert(Geometry::points(&[Vec3::X]));
        let b = store.insert(Geometry::points(&[Vec3::Y, Vec3::Z]));
        assert_ne!(a, b);
        assert_eq!(store.live_count(), 2);

        assert!(store.release(a).is_some());
        assert!(store.release(a).is_none());
        assert!(!store.contains(a));
        assert!(store.contains(b));

        let stats = store.stats();
        assert_eq!(stats.allocated, 2);
        assert_eq!(stats.released, 1);
        assert_eq!(stats.live, 1);
        assert_eq!(stats.live_bytes, 64);
    }
}
