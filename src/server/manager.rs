use std::sync::Arc;

use oplock_core::error::OplockError;
use oplock_core::logging::debug;
use oplock_core::OplockResult;

use crate::config::OplockConfig;
use crate::open::{FileIdentity, HandleId, OpenParameters};
use crate::oplock::{BreakDecision, BreakReason, GrantSnapshot, OplockLevel, OplockStats, OplockTable, PendingToken};
use crate::server::fsctl::FsControlOutcome;
use crate::server::open_table::OpenTable;
use crate::server::request_handler::OplockRequestHandler;

/// Ties the open/close path to the oplock table.
///
/// [`create`](Self::create) and [`close`](Self::close) stand in for the
/// filesystem's own open and close; the remaining methods are what a handle
/// holder calls.
#[derive(Debug)]
pub struct OplockManager {
    config: OplockConfig,
    table: Arc<OplockTable>,
    opens: Arc<OpenTable>,
    handler: OplockRequestHandler<OpenTable>,
}

impl Default for OplockManager {
    fn default() -> Self {
        Self::new(OplockConfig::default())
    }
}

impl OplockManager {
    pub fn new(config: OplockConfig) -> Self {
        let table = Arc::new(OplockTable::new(&config));
        let opens = Arc::new(OpenTable::new());
        let handler = OplockRequestHandler::new(table.clone(), opens.clone());
        Self { config, table, opens, handler }
    }

    pub fn config(&self) -> &OplockConfig {
        &self.config
    }

    pub fn table(&self) -> &Arc<OplockTable> {
        &self.table
    }

    /// Opens `file`. Any oplock the open conflicts with is broken, and its
    /// holders can observe the break, before this returns.
    pub fn create(&self, file: FileIdentity, parameters: OpenParameters) -> HandleId {
        self.create_with_decision(file, parameters).0
    }

    /// Like [`create`](Self::create), also reporting what happened to the
    /// file's oplock.
    pub fn create_with_decision(&self, file: FileIdentity, parameters: OpenParameters) -> (HandleId, BreakDecision) {
        // Registered first so exclusive requests racing with this open see it.
        let handle = self.opens.insert(file, parameters);
        let decision = self.table.evaluate_open(
            file,
            parameters.disposition(),
            parameters.desired_access(),
            parameters.share_access(),
        );
        debug!(%file, %handle, disposition = ?parameters.disposition(), ?decision, "handle opened");
        (handle, decision)
    }

    pub fn close(&self, handle: HandleId) -> OplockResult<()> {
        let info = self.opens.remove(handle)
            .ok_or_else(|| OplockError::unknown_handle(handle))?;
        self.table.release(info.file, handle);
        debug!(%handle, file = %info.file, "handle closed");
        Ok(())
    }

    pub fn request_oplock(&self, handle: HandleId, level: OplockLevel) -> OplockResult<PendingToken> {
        self.handler.request(handle, level)
    }

    pub fn fs_control(&self, handle: HandleId, code: u32) -> OplockResult<FsControlOutcome> {
        self.handler.fs_control(handle, code)
    }

    pub fn acknowledge_break(&self, handle: HandleId, accept_level2: bool) -> OplockResult<Option<PendingToken>> {
        self.handler.acknowledge(handle, accept_level2)
    }

    /// Reported by the byte-range lock manager whenever a handle's lock count changes.
    pub fn set_byte_range_locks(&self, handle: HandleId, count: u32) -> OplockResult<()> {
        self.opens.set_byte_range_locks(handle, count)
    }

    /// Blocks for at most the configured wait timeout.
    pub fn wait_for_break(&self, token: &PendingToken) -> Option<BreakReason> {
        token.wait(self.config.default_wait_timeout())
    }

    pub fn snapshot(&self, file: FileIdentity) -> Option<GrantSnapshot> {
        self.table.snapshot(file)
    }

    pub fn open_handles(&self) -> usize {
        self.opens.len()
    }

    pub fn stats(&self) -> OplockStats {
        self.table.stats()
    }
}
