//! Logging setup.
//!
//! Everything in the workspace logs through the `log` facade; binaries call
//! [`init_logging`] once at startup to install `env_logger`.

mod init;

pub use init::{init_logging, LoggingConfig};
