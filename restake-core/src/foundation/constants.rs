//! System-wide constants for staking orchestration.

/// Seconds in a (non-leap) year; delegated approvals are renewed for this long.
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// Default swap deadline offset from now (30 minutes).
pub const DEFAULT_SWAP_DEADLINE_SECS: u64 = 1800;

/// Default V3 pool fee tier in hundredths of a bip (2500 = 0.25%).
pub const DEFAULT_FEE_TIER: u32 = 2500;

/// Fee tiers are encoded as 3 bytes in a V3 path.
pub const MAX_FEE_TIER: u32 = (1 << 24) - 1;

/// Default bound on waiting for a transaction receipt.
pub const DEFAULT_FINALITY_TIMEOUT_SECS: u64 = 120;

/// Default interval between receipt polls.
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 1000;
/// Consecutive failed receipt lookups after which the node is considered unreachable.
pub const RECEIPT_LOOKUP_FAILURE_LIMIT: u32 = 5;

/// Decimals of the native token and every staking share token in use.
pub const TOKEN_DECIMALS: u8 = 18;

/// Human-unit balance below which a staking position counts as empty.
pub const DEFAULT_DUST_THRESHOLD: &str = "0.0001";

/// Slippage applied to rebalance swaps, in basis points (100 = 1%).
pub const DEFAULT_REBALANCE_SLIPPAGE_BPS: u32 = 100;

pub const BPS_DENOMINATOR: u32 = 10_000;

/// Universal Router command byte for a V3 exact-input swap.
pub const CMD_V3_SWAP_EXACT_IN: u8 = 0x00;

/// Monad testnet.
pub const DEFAULT_CHAIN_ID: u64 = 10143;

/// Completed operation ids remembered so late subscribers see a finished stream.
pub const COMPLETED_OPERATION_MEMORY: usize = 1024;

/// Env var that pins "now" (unix seconds) for deterministic tests.
pub const TEST_NOW_SECS_ENV_VAR: &str = "RESTAKE_TEST_NOW_SECS";

pub const RPC_RATE_LIMIT_WINDOW_SECS: u64 = 1;
pub const RPC_RATE_LIMIT_ENTRY_TTL_SECS: u64 = 300;
pub const RPC_RATE_LIMIT_CLEANUP_INTERVAL_SECS: u64 = 60;
