use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum OplockError {
    AlreadyExclusive(OplockAlreadyExclusiveError),
    NotGranted(OplockNotGrantedError),
    BreakInProgress(OplockBreakInProgressError),
    UnknownFileIdentity(OplockUnknownFileError),
    UnknownHandle(OplockUnknownHandleError),
    InvalidRequest(OplockInvalidRequestError),
    InvalidOplockProtocol(OplockInvalidProtocolError),
}

impl OplockError {
    pub fn already_exclusive<T: Into<OplockAlreadyExclusiveError>>(error: T) -> Self {
        Self::AlreadyExclusive(error.into())
    }

    pub fn not_granted<T: Into<OplockNotGrantedError>>(error: T) -> Self {
        Self::NotGranted(error.into())
    }

    pub fn break_in_progress<T: Into<OplockBreakInProgressError>>(error: T) -> Self {
        Self::BreakInProgress(error.into())
    }

    pub fn unknown_file_identity<T: Into<OplockUnknownFileError>>(error: T) -> Self {
        Self::UnknownFileIdentity(error.into())
    }

    pub fn unknown_handle<T: Into<OplockUnknownHandleError>>(error: T) -> Self {
        Self::UnknownHandle(error.into())
    }

    pub fn invalid_request<T: Into<OplockInvalidRequestError>>(error: T) -> Self {
        Self::InvalidRequest(error.into())
    }

    pub fn invalid_oplock_protocol<T: Into<OplockInvalidProtocolError>>(error: T) -> Self {
        Self::InvalidOplockProtocol(error.into())
    }

    /// Whether the error means "the oplock was refused", as opposed to a
    /// malformed or misdirected call.
    pub fn is_not_granted(&self) -> bool {
        matches!(self, Self::AlreadyExclusive(_) | Self::NotGranted(_) | Self::BreakInProgress(_))
    }
}

#[derive(Debug)]
pub struct OplockAlreadyExclusiveError {
    message: String,
}

impl<T: Into<String>> From<T> for OplockAlreadyExclusiveError {
    fn from(value: T) -> Self {
        Self {
            message: value.into()
        }
    }
}

impl Display for OplockAlreadyExclusiveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Oplock denied, an exclusive grant is already held: {}", self.message)
    }
}

#[derive(Debug)]
pub struct OplockNotGrantedError {
    message: String,
}

impl<T: Into<String>> From<T> for OplockNotGrantedError {
    fn from(value: T) -> Self {
        Self {
            message: value.into()
        }
    }
}

impl Display for OplockNotGrantedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Oplock not granted: {}", self.message)
    }
}

#[derive(Debug)]
pub struct OplockBreakInProgressError {
    message: String,
}

impl<T: Into<String>> From<T> for OplockBreakInProgressError {
    fn from(value: T) -> Self {
        Self {
            message: value.into()
        }
    }
}

impl Display for OplockBreakInProgressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Oplock break awaiting acknowledgement: {}", self.message)
    }
}

#[derive(Debug)]
pub struct OplockUnknownFileError {
    file: String,
}

impl<T: Into<String>> From<T> for OplockUnknownFileError {
    fn from(value: T) -> Self {
        Self {
            file: value.into()
        }
    }
}

impl Display for OplockUnknownFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "No oplock state is tracked for file {}", self.file)
    }
}

#[derive(Debug)]
pub struct OplockUnknownHandleError {
    handle: u64,
}

impl<T: Into<u64>> From<T> for OplockUnknownHandleError {
    fn from(value: T) -> Self {
        Self {
            handle: value.into()
        }
    }
}

impl Display for OplockUnknownHandleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle {:#x} is not open", self.handle)
    }
}

#[derive(Debug)]
pub struct OplockInvalidRequestError {
    message: String,
}

impl<T: Into<String>> From<T> for OplockInvalidRequestError {
    fn from(value: T) -> Self {
        Self {
            message: value.into()
        }
    }
}

impl Display for OplockInvalidRequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid oplock request: {}", self.message)
    }
}

#[derive(Debug)]
pub struct OplockInvalidProtocolError {
    message: String,
}

impl<T: Into<String>> From<T> for OplockInvalidProtocolError {
    fn from(value: T) -> Self {
        Self {
            message: value.into()
        }
    }
}

impl Display for OplockInvalidProtocolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Oplock protocol violated: {}", self.message)
    }
}

impl Display for OplockError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExclusive(x) => write!(f, "{}", x),
            Self::NotGranted(x) => write!(f, "{}", x),
            Self::BreakInProgress(x) => write!(f, "{}", x),
            Self::UnknownFileIdentity(x) => write!(f, "{}", x),
            Self::UnknownHandle(x) => write!(f, "{}", x),
            Self::InvalidRequest(x) => write!(f, "{}", x),
            Self::InvalidOplockProtocol(x) => write!(f, "{}", x)
        }
    }
}

impl Error for OplockError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = OplockError::unknown_handle(0x2au64);
        assert_eq!(err.to_string(), "Handle 0x2a is not open");

        let err = OplockError::invalid_request("level None cannot be requested");
        assert!(err.to_string().ends_with("level None cannot be requested"));
    }

    #[test]
    fn refusals_are_classified() {
        assert!(OplockError::already_exclusive("batch").is_not_granted());
        assert!(OplockError::not_granted("synchronous handle").is_not_granted());
        assert!(OplockError::break_in_progress("batch broken to level 2").is_not_granted());
        assert!(!OplockError::invalid_oplock_protocol("not broken").is_not_granted());
    }
}
