use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::oplock::level::BreakReason;

#[derive(Debug, Default)]
struct NotifierInner {
    reason: Mutex<Option<BreakReason>>,
    signaled: Condvar,
    #[cfg(feature = "async")]
    notify: tokio::sync::Notify,
}

/// One-shot, manually reset completion object shared by a grant and every
/// token issued for it.
///
/// The first [`signal`](Self::signal) records the break reason and wakes all
/// waiters; the notifier then stays signaled for as long as any clone lives.
/// Queries never consume the signal.
#[derive(Debug, Clone, Default)]
pub struct BreakNotifier {
    inner: Arc<NotifierInner>,
}

impl BreakNotifier {
    pub fn new() -> Self {
        Default::default()
    }

    fn reason_guard(&self) -> MutexGuard<'_, Option<BreakReason>> {
        self.inner.reason.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` only for the call that performed the transition.
    pub fn signal(&self, reason: BreakReason) -> bool {
        let mut guard = self.reason_guard();
        if guard.is_some() {
            return false;
        }
        *guard = Some(reason);
        drop(guard);

        self.inner.signaled.notify_all();
        #[cfg(feature = "async")]
        self.inner.notify.notify_waiters();
        true
    }

    pub fn is_signaled(&self) -> bool {
        self.reason_guard().is_some()
    }

    pub fn break_reason(&self) -> Option<BreakReason> {
        *self.reason_guard()
    }

    /// Blocks until signaled or until `timeout` elapses; `None` means the
    /// wait timed out.
    pub fn wait(&self, timeout: Duration) -> Option<BreakReason> {
        let guard = self.reason_guard();
        let (guard, _timeout) = self.inner.signaled
            .wait_timeout_while(guard, timeout, |reason| reason.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }

    #[cfg(feature = "async")]
    pub async fn wait_async(&self) -> BreakReason {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a signal in between is not lost.
            notified.as_mut().enable();
            if let Some(reason) = self.break_reason() {
                return reason;
            }
            notified.await;
        }
    }

    pub fn same_instance(&self, other: &BreakNotifier) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
