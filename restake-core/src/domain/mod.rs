//! Domain layer: pure decision logic (no I/O).

pub mod allowance;
pub mod flow;
pub mod rebalance;
pub mod results;
pub mod swap;

pub use allowance::*;
pub use flow::*;
pub use rebalance::*;
pub use results::*;
pub use swap::*;
