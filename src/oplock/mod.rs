pub use conflict::{BreakDecision, ConflictEvaluator};
pub use grant::{GrantSnapshot, OplockGrant};
pub use level::{BreakReason, GrantState, OplockLevel};
pub use notifier::BreakNotifier;
pub use stats::OplockStats;
pub use table::OplockTable;
pub use token::PendingToken;

mod conflict;
mod grant;
mod level;
mod notifier;
mod stats;
mod table;
mod token;
