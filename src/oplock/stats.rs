use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::oplock::level::{BreakReason, OplockLevel};

/// Point-in-time copy of the counters kept by an oplock table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OplockStats {
    /// Grants created, including level 2 holders attached to an existing grant
    pub total_granted: u64,
    pub level2_granted: u64,
    /// Exclusive, batch and filter grants
    pub exclusive_granted: u64,
    /// Requests refused because of a conflicting grant
    pub denied: u64,
    pub breaks_to_level2: u64,
    pub breaks_to_none: u64,
    /// Grants released by their last holder without having been broken
    pub released: u64,
    pub break_acks: u64,
}

impl OplockStats {
    pub fn total_breaks(&self) -> u64 {
        self.breaks_to_level2 + self.breaks_to_none
    }
}

#[derive(Debug, Default)]
pub(crate) struct OplockCounters {
    total_granted: AtomicU64,
    level2_granted: AtomicU64,
    exclusive_granted: AtomicU64,
    denied: AtomicU64,
    breaks_to_level2: AtomicU64,
    breaks_to_none: AtomicU64,
    released: AtomicU64,
    break_acks: AtomicU64,
}

impl OplockCounters {
    pub(crate) fn granted(&self, level: OplockLevel) {
        self.total_granted.fetch_add(1, Ordering::Relaxed);
        match level {
            OplockLevel::Level2 => self.level2_granted.fetch_add(1, Ordering::Relaxed),
            _ => self.exclusive_granted.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub(crate) fn denied(&self) {
        self.denied.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn broken(&self, reason: BreakReason) {
        match reason {
            BreakReason::BrokenToLevel2 => self.breaks_to_level2.fetch_add(1, Ordering::Relaxed),
            BreakReason::BrokenToNone => self.breaks_to_none.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub(crate) fn released(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn acknowledged(&self) {
        self.break_acks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> OplockStats {
        OplockStats {
            total_granted: self.total_granted.load(Ordering::Relaxed),
            level2_granted: self.level2_granted.load(Ordering::Relaxed),
            exclusive_granted: self.exclusive_granted.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
            breaks_to_level2: self.breaks_to_level2.load(Ordering::Relaxed),
            breaks_to_none: self.breaks_to_none.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            break_acks: self.break_acks.load(Ordering::Relaxed),
        }
    }
}
