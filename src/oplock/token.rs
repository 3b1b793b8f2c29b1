use std::time::Duration;

use uuid::Uuid;

use oplock_core::nt_status::NTStatus;

use crate::open::{FileIdentity, HandleId};
use crate::oplock::level::{BreakReason, OplockLevel};
use crate::oplock::notifier::BreakNotifier;

/// What the caller of an oplock request holds while the request is pending.
#[derive(Debug, Clone)]
pub struct PendingToken {
    file: FileIdentity,
    handle: HandleId,
    level: OplockLevel,
    grant_id: Uuid,
    notifier: BreakNotifier,
}

impl PendingToken {
    pub(crate) fn new(file: FileIdentity, handle: HandleId, level: OplockLevel, grant_id: Uuid, notifier: BreakNotifier) -> Self {
        Self { file, handle, level, grant_id, notifier }
    }

    pub fn file(&self) -> FileIdentity {
        self.file
    }

    pub fn handle(&self) -> HandleId {
        self.handle
    }

    pub fn level(&self) -> OplockLevel {
        self.level
    }

    pub fn grant_id(&self) -> Uuid {
        self.grant_id
    }

    pub fn notifier(&self) -> &BreakNotifier {
        &self.notifier
    }

    pub fn is_signaled(&self) -> bool {
        self.notifier.is_signaled()
    }

    pub fn break_reason(&self) -> Option<BreakReason> {
        self.notifier.break_reason()
    }

    pub fn wait(&self, timeout: Duration) -> Option<BreakReason> {
        self.notifier.wait(timeout)
    }

    #[cfg(feature = "async")]
    pub async fn wait_async(&self) -> BreakReason {
        self.notifier.wait_async().await
    }

    /// Pending until the grant breaks, success afterwards.
    pub fn status(&self) -> NTStatus {
        match self.is_signaled() {
            true => NTStatus::StatusSuccess,
            false => NTStatus::StatusPending
        }
    }

    /// The I/O status information of the completed request, zero while pending.
    pub fn information(&self) -> usize {
        self.break_reason()
            .map(|reason| reason.information())
            .unwrap_or_default()
    }
}
