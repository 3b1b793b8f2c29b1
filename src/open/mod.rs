use serde::{Deserialize, Serialize};

use oplock_core::OplockResult;

pub use access_mask::FileAccessMask;
pub use disposition::CreateDisposition;
pub use identity::{FileIdentity, HandleId};
pub use options::CreateOptions;
pub use share_access::ShareAccess;

mod access_mask;
mod disposition;
mod identity;
mod options;
mod share_access;

/// Parameters of one open of a file, as seen by the oplock layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenParameters {
    disposition: CreateDisposition,
    desired_access: FileAccessMask,
    share_access: ShareAccess,
    create_options: CreateOptions,
}

impl OpenParameters {
    pub fn new(disposition: CreateDisposition, desired_access: FileAccessMask, share_access: ShareAccess) -> Self {
        Self {
            disposition,
            desired_access,
            share_access,
            create_options: CreateOptions::empty(),
        }
    }

    /// Builds parameters from the raw codes a native create call carries.
    pub fn from_raw(disposition: u32, desired_access: u32, share_access: u32, create_options: u32) -> OplockResult<Self> {
        Ok(Self {
            disposition: CreateDisposition::from_code(disposition)?,
            desired_access: FileAccessMask::from_code(desired_access),
            share_access: ShareAccess::from_code(share_access)?,
            create_options: CreateOptions::from_code(create_options)?,
        })
    }

    pub fn with_options(mut self, create_options: CreateOptions) -> Self {
        self.create_options = create_options;
        self
    }

    pub fn disposition(&self) -> CreateDisposition {
        self.disposition
    }

    pub fn desired_access(&self) -> FileAccessMask {
        self.desired_access
    }

    pub fn share_access(&self) -> ShareAccess {
        self.share_access
    }

    pub fn create_options(&self) -> CreateOptions {
        self.create_options
    }
}
