use serde::{Deserialize, Serialize};

use crate::open::{CreateDisposition, FileAccessMask, ShareAccess};
use crate::oplock::level::{BreakReason, OplockLevel};

/// Verdict on an existing grant when a new open arrives.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreakDecision {
    NoBreak,
    BreakToLevel2,
    BreakToNone,
}

impl BreakDecision {
    pub fn reason(&self) -> Option<BreakReason> {
        match self {
            Self::NoBreak => None,
            Self::BreakToLevel2 => Some(BreakReason::BrokenToLevel2),
            Self::BreakToNone => Some(BreakReason::BrokenToNone),
        }
    }
}

/// Decides whether an open conflicts with the caching rights of a grant.
/// Holds no state besides its policy, so it can be shared freely.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConflictEvaluator {
    allow_exclusive_downgrade: bool,
}

impl Default for ConflictEvaluator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConflictEvaluator {
    pub fn new(allow_exclusive_downgrade: bool) -> Self {
        Self { allow_exclusive_downgrade }
    }

    pub fn decide(
        &self,
        existing: OplockLevel,
        disposition: CreateDisposition,
        access: FileAccessMask,
        share_mode: ShareAccess,
    ) -> BreakDecision {
        if existing == OplockLevel::None {
            return BreakDecision::NoBreak;
        }
        // Cached content is gone once the file is replaced, whatever the level.
        if disposition.truncates() {
            return BreakDecision::BreakToNone;
        }
        if access.is_attribute_only() {
            return BreakDecision::NoBreak;
        }

        match existing {
            OplockLevel::None | OplockLevel::Level2 => BreakDecision::NoBreak,
            OplockLevel::Exclusive | OplockLevel::Batch => {
                if access.writes_data() || !share_mode.contains(ShareAccess::READ) {
                    BreakDecision::BreakToNone
                } else if self.allow_exclusive_downgrade && existing.can_downgrade() {
                    BreakDecision::BreakToLevel2
                } else {
                    BreakDecision::BreakToNone
                }
            }
            OplockLevel::Filter => {
                if access.writes_data() || !share_mode.contains(ShareAccess::all()) {
                    BreakDecision::BreakToNone
                } else {
                    BreakDecision::NoBreak
                }
            }
        }
    }
}
