//! Logger setup for binaries built on the engine.
//!
//! Library code only uses the `log` facade; `init_logging` installs the
//! `env_logger` backend once per process.

mod init;

pub use init::{LoggingConfig, init_logging, resolve_filter};
