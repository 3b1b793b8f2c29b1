use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};

use oplock_core::error::OplockError;
use oplock_core::logging::{debug, info, trace, warn};
use oplock_core::OplockResult;

use crate::config::OplockConfig;
use crate::open::{CreateDisposition, FileAccessMask, FileIdentity, HandleId, ShareAccess};
use crate::oplock::conflict::{BreakDecision, ConflictEvaluator};
use crate::oplock::grant::{GrantSnapshot, OplockGrant};
use crate::oplock::level::{BreakReason, GrantState, OplockLevel};
use crate::oplock::stats::{OplockCounters, OplockStats};
use crate::oplock::token::PendingToken;

type Shard = HashMap<FileIdentity, OplockGrant>;

/// Registry of the active grant of every file.
///
/// Files are hashed onto independently locked shards. Every operation on a
/// file runs to completion under its shard lock, so a break decided by
/// [`evaluate_open`](Self::evaluate_open) is recorded and signaled before the
/// open that caused it returns, and [`release`](Self::release) can never
/// interleave with it.
#[derive(Debug)]
pub struct OplockTable {
    shards: Box<[Mutex<Shard>]>,
    evaluator: ConflictEvaluator,
    counters: OplockCounters,
}

impl Default for OplockTable {
    fn default() -> Self {
        Self::new(&OplockConfig::default())
    }
}

impl OplockTable {
    pub fn new(config: &OplockConfig) -> Self {
        let shards = (0..config.shard_count().max(1))
            .map(|_| Mutex::new(Shard::new()))
            .collect();
        Self {
            shards,
            evaluator: ConflictEvaluator::new(config.allow_exclusive_downgrade()),
            counters: OplockCounters::default(),
        }
    }

    fn shard(&self, file: &FileIdentity) -> MutexGuard<'_, Shard> {
        let mut hasher = DefaultHasher::new();
        file.hash(&mut hasher);
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        self.shards[index].lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn request(&self, file: FileIdentity, handle: HandleId, level: OplockLevel) -> OplockResult<PendingToken> {
        self.request_checked(file, handle, level, || Ok(()))
    }

    /// Like [`request`](Self::request), but runs `precondition` under the
    /// file's arbitration lock first, so checks on state that opens of the
    /// same file change cannot go stale before the grant is installed.
    pub fn request_checked<F>(&self, file: FileIdentity, handle: HandleId, level: OplockLevel, precondition: F) -> OplockResult<PendingToken>
    where
        F: FnOnce() -> OplockResult<()>,
    {
        if level == OplockLevel::None {
            return Err(OplockError::invalid_request("an oplock of level None cannot be requested"));
        }

        let mut shard = self.shard(&file);
        precondition()?;

        if let Some(grant) = shard.get_mut(&file) {
            if grant.state() == GrantState::Granted {
                return match (grant.level(), level) {
                    (OplockLevel::Level2, OplockLevel::Level2) => {
                        if grant.attach(handle) {
                            self.counters.granted(level);
                        }
                        debug!(%file, %handle, holders = grant.holder_count(), "level 2 oplock shared");
                        Ok(grant.token(file, handle))
                    }
                    (OplockLevel::Level2, requested) => {
                        self.counters.denied();
                        warn!(%file, %handle, ?requested, "exclusive oplock refused, level 2 oplocks present");
                        Err(OplockError::not_granted(format!("file {} has level 2 oplocks, {:?} cannot be granted", file, requested)))
                    }
                    (held, _) => {
                        self.counters.denied();
                        warn!(%file, %handle, ?held, ?level, "oplock refused, exclusive oplock held");
                        Err(OplockError::already_exclusive(format!("file {} holds a {:?} oplock", file, held)))
                    }
                };
            }
            // A downgrade still owed to its holder keeps the file until acknowledged or closed.
            if grant.break_reason() == Some(BreakReason::BrokenToLevel2) && !grant.is_holder(handle) {
                self.counters.denied();
                warn!(%file, %handle, ?level, "oplock refused, break to level 2 not yet acknowledged");
                return Err(OplockError::break_in_progress(format!("oplock on {} is being broken to level 2", file)));
            }
            trace!(%file, grant_id = %grant.grant_id(), "retiring broken oplock");
        }

        let grant = OplockGrant::new(level, handle);
        let token = grant.token(file, handle);
        debug!(%file, %handle, ?level, grant_id = %grant.grant_id(), "oplock granted");
        shard.insert(file, grant);
        self.counters.granted(level);
        Ok(token)
    }

    /// Called by the open path for every new handle on `file`. The returned
    /// decision has already been applied when this returns.
    pub fn evaluate_open(&self, file: FileIdentity, disposition: CreateDisposition, access: FileAccessMask, share_mode: ShareAccess) -> BreakDecision {
        let mut shard = self.shard(&file);
        let Some(grant) = shard.get_mut(&file) else {
            return BreakDecision::NoBreak;
        };
        if grant.state() != GrantState::Granted {
            return BreakDecision::NoBreak;
        }

        let decision = self.evaluator.decide(grant.level(), disposition, access, share_mode);
        if let Some(reason) = decision.reason() {
            if grant.break_with(reason) {
                self.counters.broken(reason);
                info!(%file, level = ?grant.level(), ?reason, ?disposition, "oplock broken");
            }
        } else {
            trace!(%file, level = ?grant.level(), ?disposition, "open does not conflict with oplock");
        }
        decision
    }

    /// Called by the close path. Removes `handle` from the grant's holders
    /// and drops the grant once nobody holds it. Never signals.
    pub fn release(&self, file: FileIdentity, handle: HandleId) {
        let mut shard = self.shard(&file);
        let Some(grant) = shard.get_mut(&file) else {
            return;
        };
        if !grant.detach(handle) || grant.holder_count() > 0 {
            return;
        }

        grant.release();
        if grant.state() == GrantState::Released {
            self.counters.released();
        }
        debug!(%file, %handle, state = ?grant.state(), "last oplock holder closed");
        shard.remove(&file);
    }

    /// Completes the break handshake for a holder of a broken grant.
    ///
    /// A holder whose grant was broken to level 2 may accept the downgrade,
    /// which installs a fresh level 2 grant and returns its token. Any other
    /// acknowledgement gives up the holder's caching rights.
    pub fn acknowledge_break(&self, file: FileIdentity, handle: HandleId, accept_level2: bool) -> OplockResult<Option<PendingToken>> {
        self.acknowledge_break_checked(file, handle, accept_level2, || true)
    }

    /// Like [`acknowledge_break`](Self::acknowledge_break), but the downgrade
    /// only happens if `level2_allowed` returns `true` under the file's lock.
    /// Otherwise the holder is left without an oplock.
    pub fn acknowledge_break_checked<F>(&self, file: FileIdentity, handle: HandleId, accept_level2: bool, level2_allowed: F) -> OplockResult<Option<PendingToken>>
    where
        F: FnOnce() -> bool,
    {
        let mut shard = self.shard(&file);
        let grant = shard.get_mut(&file)
            .ok_or_else(|| OplockError::unknown_file_identity(file.to_string()))?;
        if grant.state() != GrantState::Broken {
            return Err(OplockError::invalid_oplock_protocol(format!("oplock on {} is not broken", file)));
        }
        if !grant.is_holder(handle) {
            return Err(OplockError::invalid_oplock_protocol(format!("handle {} does not hold the oplock on {}", handle, file)));
        }
        self.counters.acknowledged();

        let wants_level2 = accept_level2 && grant.break_reason() == Some(BreakReason::BrokenToLevel2);
        if wants_level2 && level2_allowed() {
            let successor = OplockGrant::new(OplockLevel::Level2, handle);
            let token = successor.token(file, handle);
            debug!(%file, %handle, grant_id = %successor.grant_id(), "break acknowledged, holding level 2");
            shard.insert(file, successor);
            self.counters.granted(OplockLevel::Level2);
            return Ok(Some(token));
        }

        if wants_level2 {
            warn!(%file, %handle, "level 2 refused on acknowledgement");
        }
        grant.detach(handle);
        debug!(%file, %handle, "break acknowledged, holding none");
        if grant.holder_count() == 0 {
            shard.remove(&file);
        }
        Ok(None)
    }

    pub fn snapshot(&self, file: FileIdentity) -> Option<GrantSnapshot> {
        self.shard(&file).get(&file).map(OplockGrant::snapshot)
    }

    /// Number of files with a grant entry, broken ones included.
    pub fn tracked_files(&self) -> usize {
        self.shards.iter()
            .map(|shard| shard.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn stats(&self) -> OplockStats {
        self.counters.snapshot()
    }
}
