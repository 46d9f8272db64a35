//! Command implementations.

pub mod known_hubs;
pub mod logcat;

pub use known_hubs::run_known_hubs;
pub use logcat::run_logcat;
