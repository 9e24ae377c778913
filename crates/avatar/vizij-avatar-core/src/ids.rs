//! Identifiers and simple allocators for stage entities.

use serde::{Deserialize, Serialize};

/// Tag attached to a configuration and to the asset request it issues.
/// Only results carrying the live generation may touch the scene.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Generation(pub u64);

/// Platform handle for a scheduled per-frame callback.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(pub u64);

/// Monotonic allocator for generations. Starts at 1 so `Generation(0)` is
/// never live.
#[derive(Debug)]
pub struct GenerationCounter {
    next: u64,
}

impl Default for GenerationCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn advance(&mut self) -> Generation {
        let generation = Generation(self.next);
        self.next = self.next.checked_add(1).unwrap_or(1);
        generation
    }
}
