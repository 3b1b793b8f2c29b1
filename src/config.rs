use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use oplock_core::error::OplockError;

const DEFAULT_SHARD_COUNT: usize = 16;
/// Matches the break timeout native oplock packages apply.
const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(35);

#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned")]
#[builder(build_fn(validate = "Self::validate"))]
pub struct OplockConfig {
    /// Number of independently locked partitions of the oplock table
    #[builder(default = "DEFAULT_SHARD_COUNT")]
    shard_count: usize,
    /// How long [`OplockManager::wait_for_break`](crate::server::OplockManager::wait_for_break) blocks
    #[builder(default = "DEFAULT_WAIT_TIMEOUT")]
    default_wait_timeout: Duration,
    /// When unset, exclusive and batch grants always break to none
    #[builder(default = "true")]
    allow_exclusive_downgrade: bool,
}

impl OplockConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.shard_count {
            Some(0) => Err("shard_count must be at least 1".into()),
            _ => Ok(())
        }
    }
}

impl Default for OplockConfig {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            default_wait_timeout: DEFAULT_WAIT_TIMEOUT,
            allow_exclusive_downgrade: true,
        }
    }
}

impl OplockConfig {
    pub fn builder() -> OplockConfigBuilder {
        OplockConfigBuilder::default()
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    pub fn default_wait_timeout(&self) -> Duration {
        self.default_wait_timeout
    }

    pub fn allow_exclusive_downgrade(&self) -> bool {
        self.allow_exclusive_downgrade
    }
}

impl From<OplockConfigBuilderError> for OplockError {
    fn from(value: OplockConfigBuilderError) -> Self {
        OplockError::invalid_request(format!("invalid oplock configuration: {}", value))
    }
}
