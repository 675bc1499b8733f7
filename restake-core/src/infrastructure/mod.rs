//! Infrastructure layer: chain access, configuration, log channels, logging.

pub mod chain;
pub mod config;
pub mod logbus;
pub mod logging;
