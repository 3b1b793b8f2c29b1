pub use fsctl::{FsControlCode, FsControlOutcome};
pub use manager::OplockManager;
pub use open_table::{HandleInfo, HandleResolver, OpenTable};
pub use request_handler::OplockRequestHandler;

mod fsctl;
mod manager;
mod open_table;
mod request_handler;
