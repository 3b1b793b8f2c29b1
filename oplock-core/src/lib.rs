//! Shared building blocks for the oplock manager: the error type every
//! manager-facing operation returns, the native completion codes those errors
//! map onto, and the feature-gated logging macros.

use error::OplockError;

pub mod error;
pub mod logging;
pub mod nt_status;

pub type OplockResult<T, E = OplockError> = Result<T, E>;
