use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use oplock_core::error::OplockError;
use oplock_core::OplockResult;

/// What an open does when the target file already exists (or does not).
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TryFromPrimitive)]
pub enum CreateDisposition {
    Supersede = 0x0,
    Open = 0x1,
    Create = 0x2,
    OpenIf = 0x3,
    Overwrite = 0x4,
    OverwriteIf = 0x5,
}

impl CreateDisposition {
    pub fn from_code(code: u32) -> OplockResult<Self> {
        Self::try_from_primitive(code)
            .map_err(|_e| OplockError::invalid_request(format!("unknown create disposition {:#x}", code)))
    }

    /// Supersede, overwrite and overwrite-if all discard the existing
    /// content of the file when it is present.
    pub fn truncates(&self) -> bool {
        matches!(self, Self::Supersede | Self::Overwrite | Self::OverwriteIf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncating_dispositions() {
        let truncating: Vec<_> = (0..=5)
            .map(|code| CreateDisposition::from_code(code).unwrap())
            .filter(CreateDisposition::truncates)
            .collect();
        assert_eq!(truncating, vec![
            CreateDisposition::Supersede,
            CreateDisposition::Overwrite,
            CreateDisposition::OverwriteIf,
        ]);
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(CreateDisposition::from_code(6).is_err());
    }
}
