use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use oplock_core::error::OplockError;
use oplock_core::OplockResult;

use crate::open::{FileIdentity, HandleId, OpenParameters};

/// What the oplock layer needs to know about an open handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleInfo {
    pub file: FileIdentity,
    pub parameters: OpenParameters,
    /// Byte-range locks currently held through this handle
    pub byte_range_locks: u32,
}

/// The open/close path's view of handles, as consulted by the request handler.
pub trait HandleResolver: Send + Sync {
    fn resolve(&self, handle: HandleId) -> Option<HandleInfo>;
    fn open_count(&self, file: FileIdentity) -> usize;
    fn has_byte_range_locks(&self, file: FileIdentity) -> bool;
}

/// Opens and held byte-range locks of one file, summed over its handles.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
struct FileOpens {
    handles: usize,
    byte_range_locks: u64,
}

#[derive(Debug, Default)]
struct Opens {
    handles: HashMap<HandleId, HandleInfo>,
    files: HashMap<FileIdentity, FileOpens>,
}

/// In-memory handle registry, indexed by handle and by file.
#[derive(Debug)]
pub struct OpenTable {
    next_handle: AtomicU64,
    opens: RwLock<Opens>,
}

impl Default for OpenTable {
    fn default() -> Self {
        Self {
            next_handle: AtomicU64::new(1),
            opens: Default::default(),
        }
    }
}

impl OpenTable {
    pub fn new() -> Self {
        Default::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Opens> {
        self.opens.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Opens> {
        self.opens.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, file: FileIdentity, parameters: OpenParameters) -> HandleId {
        let handle = HandleId::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let mut opens = self.write();
        opens.handles.insert(handle, HandleInfo {
            file,
            parameters,
            byte_range_locks: 0,
        });
        opens.files.entry(file).or_default().handles += 1;
        handle
    }

    pub fn remove(&self, handle: HandleId) -> Option<HandleInfo> {
        let mut opens = self.write();
        let info = opens.handles.remove(&handle)?;
        if let Some(counts) = opens.files.get_mut(&info.file) {
            counts.handles -= 1;
            counts.byte_range_locks -= u64::from(info.byte_range_locks);
            if counts.handles == 0 {
                opens.files.remove(&info.file);
            }
        }
        Some(info)
    }

    pub fn set_byte_range_locks(&self, handle: HandleId, count: u32) -> OplockResult<()> {
        let mut guard = self.write();
        let opens = &mut *guard;
        let info = opens.handles.get_mut(&handle)
            .ok_or_else(|| OplockError::unknown_handle(handle))?;
        let previous = std::mem::replace(&mut info.byte_range_locks, count);
        if let Some(counts) = opens.files.get_mut(&info.file) {
            counts.byte_range_locks = counts.byte_range_locks - u64::from(previous) + u64::from(count);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.read().handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().handles.is_empty()
    }

    /// Number of files with at least one open handle.
    pub fn open_files(&self) -> usize {
        self.read().files.len()
    }
}

impl HandleResolver for OpenTable {
    fn resolve(&self, handle: HandleId) -> Option<HandleInfo> {
        self.read().handles.get(&handle).cloned()
    }

    fn open_count(&self, file: FileIdentity) -> usize {
        self.read().files.get(&file)
            .map(|counts| counts.handles)
            .unwrap_or_default()
    }

    fn has_byte_range_locks(&self, file: FileIdentity) -> bool {
        self.read().files.get(&file)
            .is_some_and(|counts| counts.byte_range_locks > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::open::{CreateDisposition, FileAccessMask, ShareAccess};

    use super::*;

    fn params() -> OpenParameters {
        OpenParameters::new(CreateDisposition::Open, FileAccessMask::FILE_READ_DATA, ShareAccess::all())
    }

    #[test]
    fn handles_are_unique_and_resolvable() {
        let table = OpenTable::new();
        let file = FileIdentity::new(1, 1);
        let a = table.insert(file, params());
        let b = table.insert(file, params());
        assert_ne!(a, b);
        assert_eq!(table.resolve(a).unwrap().file, file);
        assert_eq!(table.open_count(file), 2);

        assert!(table.remove(a).is_some());
        assert!(table.resolve(a).is_none());
        assert_eq!(table.open_count(file), 1);

        table.remove(b);
        assert_eq!(table.open_count(file), 0);
        assert_eq!(table.open_files(), 0);
    }

    #[test]
    fn byte_range_locks_are_tracked_per_file() {
        let table = OpenTable::new();
        let file = FileIdentity::new(1, 1);
        let handle = table.insert(file, params());
        assert!(!table.has_byte_range_locks(file));

        table.set_byte_range_locks(handle, 2).unwrap();
        assert!(table.has_byte_range_locks(file));
        assert!(!table.has_byte_range_locks(FileIdentity::new(1, 2)));

        let other = table.insert(file, params());
        table.set_byte_range_locks(other, 1).unwrap();
        table.set_byte_range_locks(handle, 0).unwrap();
        assert!(table.has_byte_range_locks(file));

        // Closing a handle drops the locks held through it.
        table.remove(other);
        assert!(!table.has_byte_range_locks(file));
        assert_eq!(table.open_count(file), 1);

        let err = table.set_byte_range_locks(HandleId::new(999), 1).unwrap_err();
        assert!(matches!(err, OplockError::UnknownHandle(_)));
    }
}
