use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::open::{FileIdentity, HandleId};
use crate::oplock::level::{BreakReason, GrantState, OplockLevel};
use crate::oplock::notifier::BreakNotifier;
use crate::oplock::token::PendingToken;

/// One instance of cached-access rights over a file. Only the oplock table
/// mutates grants, always under the lock of the shard owning the file.
#[derive(Debug)]
pub struct OplockGrant {
    grant_id: Uuid,
    level: OplockLevel,
    holders: BTreeSet<HandleId>,
    notifier: BreakNotifier,
    break_reason: Option<BreakReason>,
    state: GrantState,
}

impl OplockGrant {
    pub(crate) fn new(level: OplockLevel, holder: HandleId) -> Self {
        Self {
            grant_id: Uuid::new_v4(),
            level,
            holders: BTreeSet::from([holder]),
            notifier: BreakNotifier::new(),
            break_reason: None,
            state: GrantState::Granted,
        }
    }

    pub fn grant_id(&self) -> Uuid {
        self.grant_id
    }

    pub fn level(&self) -> OplockLevel {
        self.level
    }

    pub fn state(&self) -> GrantState {
        self.state
    }

    pub fn break_reason(&self) -> Option<BreakReason> {
        self.break_reason
    }

    pub fn is_holder(&self, handle: HandleId) -> bool {
        self.holders.contains(&handle)
    }

    pub fn holder_count(&self) -> usize {
        self.holders.len()
    }

    /// Adds a level 2 holder. Returns `false` if the handle already held it.
    pub(crate) fn attach(&mut self, handle: HandleId) -> bool {
        debug_assert_eq!(self.level, OplockLevel::Level2);
        self.holders.insert(handle)
    }

    pub(crate) fn detach(&mut self, handle: HandleId) -> bool {
        self.holders.remove(&handle)
    }

    /// Records the break and signals the notifier. A grant breaks at most
    /// once; later calls leave it untouched and return `false`.
    pub(crate) fn break_with(&mut self, reason: BreakReason) -> bool {
        if self.state != GrantState::Granted {
            return false;
        }
        self.state = GrantState::Broken;
        self.break_reason = Some(reason);
        self.notifier.signal(reason)
    }

    /// Retires a grant whose last holder closed. Broken grants stay broken.
    pub(crate) fn release(&mut self) {
        if self.state == GrantState::Granted {
            self.state = GrantState::Released;
        }
    }

    pub(crate) fn token(&self, file: FileIdentity, handle: HandleId) -> PendingToken {
        PendingToken::new(file, handle, self.level, self.grant_id, self.notifier.clone())
    }

    pub fn snapshot(&self) -> GrantSnapshot {
        GrantSnapshot {
            grant_id: self.grant_id,
            level: self.level,
            state: self.state,
            break_reason: self.break_reason,
            holder_count: self.holders.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantSnapshot {
    pub grant_id: Uuid,
    pub level: OplockLevel,
    pub state: GrantState,
    pub break_reason: Option<BreakReason>,
    pub holder_count: usize,
}
