use std::sync::Arc;

use oplock_core::error::OplockError;
use oplock_core::logging::{debug, warn};
use oplock_core::OplockResult;

use crate::open::HandleId;
use crate::oplock::{OplockLevel, OplockTable, PendingToken};
use crate::server::fsctl::{FsControlCode, FsControlOutcome};
use crate::server::open_table::{HandleInfo, HandleResolver};

/// Entry point for oplock requests made through a handle.
///
/// A request never blocks: it either fails, or hands back a token whose
/// notifier reports the break whenever one happens.
#[derive(Debug)]
pub struct OplockRequestHandler<R: HandleResolver> {
    table: Arc<OplockTable>,
    resolver: Arc<R>,
}

impl<R: HandleResolver> OplockRequestHandler<R> {
    pub fn new(table: Arc<OplockTable>, resolver: Arc<R>) -> Self {
        Self { table, resolver }
    }

    fn resolve(&self, handle: HandleId) -> OplockResult<HandleInfo> {
        self.resolver.resolve(handle)
            .ok_or_else(|| OplockError::unknown_handle(handle))
    }

    pub fn request(&self, handle: HandleId, level: OplockLevel) -> OplockResult<PendingToken> {
        let info = self.resolve(handle)?;
        let options = info.parameters.create_options();
        if options.is_directory() {
            return Err(OplockError::invalid_request("oplocks are not supported on directories"));
        }
        if options.is_synchronous() {
            warn!(%handle, "oplock requested on a synchronous handle");
            return Err(OplockError::not_granted("oplocks require a handle opened for asynchronous I/O"));
        }

        let file = info.file;
        let resolver = &self.resolver;
        let token = self.table.request_checked(file, handle, level, || {
            if level == OplockLevel::Level2 && resolver.has_byte_range_locks(file) {
                return Err(OplockError::not_granted(format!("file {} has byte-range locks", file)));
            }
            if level.is_exclusive() && resolver.open_count(file) > 1 {
                return Err(OplockError::not_granted(format!("file {} has other opens, {:?} needs a single opener", file, level)));
            }
            Ok(())
        })?;
        debug!(%handle, %file, ?level, "oplock request pending");
        Ok(token)
    }

    pub fn acknowledge(&self, handle: HandleId, accept_level2: bool) -> OplockResult<Option<PendingToken>> {
        let info = self.resolve(handle)?;
        let file = info.file;
        let resolver = &self.resolver;
        self.table.acknowledge_break_checked(file, handle, accept_level2, || !resolver.has_byte_range_locks(file))
    }

    /// Dispatches a raw file system control code issued on `handle`.
    pub fn fs_control(&self, handle: HandleId, code: u32) -> OplockResult<FsControlOutcome> {
        let code = FsControlCode::from_code(code)?;
        if let Some(level) = code.requested_level() {
            return self.request(handle, level).map(FsControlOutcome::Pending);
        }
        let accept_level2 = code == FsControlCode::OplockBreakAcknowledge;
        Ok(match self.acknowledge(handle, accept_level2)? {
            Some(token) => FsControlOutcome::Pending(token),
            None => FsControlOutcome::Completed
        })
    }
}

#[cfg(test)]
mod tests {
    use oplock_core::nt_status::NTStatus;

    use crate::open::{CreateDisposition, CreateOptions, FileAccessMask, FileIdentity, OpenParameters, ShareAccess};
    use crate::server::open_table::OpenTable;

    use super::*;

    const FILE: FileIdentity = FileIdentity::new(7, 0x700);

    fn setup() -> (Arc<OpenTable>, OplockRequestHandler<OpenTable>) {
        let opens = Arc::new(OpenTable::new());
        let handler = OplockRequestHandler::new(Arc::new(OplockTable::default()), opens.clone());
        (opens, handler)
    }

    fn read_params() -> OpenParameters {
        OpenParameters::new(CreateDisposition::Open, FileAccessMask::FILE_READ_DATA, ShareAccess::all())
    }

    #[test]
    fn unknown_handle_is_rejected() {
        let (_opens, handler) = setup();
        let err = handler.request(HandleId::new(42), OplockLevel::Level2).unwrap_err();
        assert!(matches!(err, OplockError::UnknownHandle(_)));
    }

    #[test]
    fn directory_and_synchronous_handles_are_refused() {
        let (opens, handler) = setup();
        let dir = opens.insert(FILE, read_params().with_options(CreateOptions::DIRECTORY_FILE));
        let err = handler.request(dir, OplockLevel::Level2).unwrap_err();
        assert!(matches!(err, OplockError::InvalidRequest(_)));

        let sync = opens.insert(FileIdentity::new(7, 0x701), read_params().with_options(CreateOptions::SYNCHRONOUS_IO_NONALERT));
        let err = handler.request(sync, OplockLevel::Level2).unwrap_err();
        assert!(matches!(err, OplockError::NotGranted(_)));
    }

    #[test]
    fn byte_range_locks_block_level2() {
        let (opens, handler) = setup();
        let handle = opens.insert(FILE, read_params());
        opens.set_byte_range_locks(handle, 1).unwrap();
        assert!(handler.request(handle, OplockLevel::Level2).unwrap_err().is_not_granted());

        opens.set_byte_range_locks(handle, 0).unwrap();
        assert!(handler.request(handle, OplockLevel::Level2).is_ok());
    }

    #[test]
    fn exclusive_needs_single_opener() {
        let (opens, handler) = setup();
        let first = opens.insert(FILE, read_params());
        let second = opens.insert(FILE, read_params());
        assert!(handler.request(first, OplockLevel::Batch).unwrap_err().is_not_granted());

        opens.remove(second);
        let token = handler.request(first, OplockLevel::Batch).unwrap();
        assert_eq!(token.level(), OplockLevel::Batch);
    }

    #[test]
    fn byte_range_locks_turn_downgrade_into_none() {
        let (opens, handler) = setup();
        let holder = opens.insert(FILE, read_params());
        handler.request(holder, OplockLevel::Exclusive).unwrap();
        handler.table.evaluate_open(FILE, CreateDisposition::Open, FileAccessMask::FILE_READ_DATA, ShareAccess::all());

        opens.set_byte_range_locks(holder, 3).unwrap();
        assert!(handler.acknowledge(holder, true).unwrap().is_none());
        assert!(handler.table.snapshot(FILE).is_none());
    }

    #[test]
    fn fs_control_dispatch() {
        let (opens, handler) = setup();
        let handle = opens.insert(FILE, read_params());

        let outcome = handler.fs_control(handle, 0x00090004).unwrap();
        assert_eq!(outcome.status(), NTStatus::StatusPending);
        assert_eq!(outcome.into_token().unwrap().level(), OplockLevel::Level2);

        let err = handler.fs_control(handle, 0x00091234).unwrap_err();
        assert_eq!(NTStatus::from(&err), NTStatus::InvalidParameter);

        // Nothing has been broken yet, so there is nothing to acknowledge.
        let err = handler.fs_control(handle, 0x00090050).unwrap_err();
        assert_eq!(NTStatus::from(&err), NTStatus::InvalidOplockProtocol);
    }
}
