//! # Oplock Manager
//!
//! Opportunistic locks for a filesystem or storage engine: a handle holder is
//! granted read (or exclusive) caching rights over a file until a conflicting
//! open forces those rights to be given up.
//!
//! This crate provides:
//! - **Open layer** ([`open`]): typed create dispositions, access masks, share
//!   modes and create options, and the identities of files and handles.
//! - **Oplock layer** ([`oplock`]): the conflict rules, the sharded grant table,
//!   the one-shot break notifier and the pending token handed to requesters.
//! - **Server layer** ([`server`]): the request handler with its precondition
//!   checks, FSCTL dispatch, and a manager tying opens and closes to the table.
//!
//! ## Quick Start
//!
//! ```
//! use oplock_manager::open::{CreateDisposition, FileAccessMask, FileIdentity, OpenParameters, ShareAccess};
//! use oplock_manager::oplock::{BreakReason, OplockLevel};
//! use oplock_manager::server::OplockManager;
//!
//! let manager = OplockManager::default();
//! let file = FileIdentity::new(1, 42);
//! let reader = OpenParameters::new(CreateDisposition::OpenIf, FileAccessMask::FILE_READ_DATA, ShareAccess::all());
//!
//! let handle = manager.create(file, reader);
//! let token = manager.request_oplock(handle, OplockLevel::Level2)?;
//! assert!(!token.is_signaled());
//!
//! let replacer = OpenParameters::new(CreateDisposition::Supersede, FileAccessMask::FILE_READ_DATA, ShareAccess::all());
//! manager.create(file, replacer);
//! assert_eq!(token.break_reason(), Some(BreakReason::BrokenToNone));
//! # Ok::<(), oplock_core::error::OplockError>(())
//! ```

/// Configuration shared by the table and the manager.
pub mod config;
/// Open parameters and file/handle identities.
pub mod open;
/// Grants, conflict rules, break notification.
pub mod oplock;
/// Request handling and the open/close facade.
pub mod server;
