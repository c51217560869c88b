//! System-level modules
//!
//! - Logging initialization
//! - Interrupt handling for long-running jobs

pub mod logging;
pub mod shutdown;

pub use logging::init_logging;
pub use shutdown::{CancellationFlag, install_ctrl_c};
