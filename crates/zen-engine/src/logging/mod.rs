//! Logging utilities.
//!
//! Centralizes logger initialization. Library code only uses the `log` facade;
//! the binary picks the backend by calling [`init_logging`] once.

mod init;

pub use init::{init_logging, LoggingConfig};
