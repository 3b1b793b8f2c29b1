//! Log points of the oplock table and request path.
//!
//! Grants, releases and handle lifecycle events go out at `debug!`, with the
//! file and handle as structured fields. Breaks are `info!` and refused
//! requests `warn!`. Builds without the `tracing` feature drop every call
//! site, fields included.

#[cfg(feature = "tracing")]
pub use tracing::{trace, debug, info, warn, error};

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! trace {
    ($($t:tt)*) => {()};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($t:tt)*) => {()};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! info {
    ($($t:tt)*) => {()};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! warn {
    ($($t:tt)*) => {()};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! error {
    ($($t:tt)*) => {()};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{trace, debug, info, warn, error};
