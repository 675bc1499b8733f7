//! Logging constants.

pub const LOG_FILE_NAME: &str = "restake.log";
/// Warn-and-above log file.
pub const ERR_LOG_FILE_NAME: &str = "restake_err.log";

/// Console log pattern (colored).
///
/// Format: `timestamp [LEVEL] message [module] [thread-id]`
pub const LOG_LINE_PATTERN_COLORED: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{h({l:5})}] {m} [{M}] [{I}]{n}";

pub const LOG_LINE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l:5}] {m} [{M}] [{I}]{n}";

/// 50 MB before rotation.
pub const LOG_FILE_MAX_SIZE: u64 = 50_000_000;

pub const LOG_FILE_MAX_ROLLS: u32 = 5;

/// Targets enabled at the app level by default; everything else is off unless opted in.
/// `oplog` carries the mirrored per-operation progress lines.
pub const WHITELISTED_TARGETS: &[&str] = &["restake_core", "restake_service", "oplog"];
