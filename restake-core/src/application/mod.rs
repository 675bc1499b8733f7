//! Application layer: flows composed from domain decisions and chain I/O.

pub mod allowance;
pub mod orchestrator;
pub mod sequencer;
pub mod settings;

pub use allowance::{AllowanceResolver, AllowanceTarget};
pub use orchestrator::{InstantUnstakeParams, Orchestrator};
pub use sequencer::{NoopTxObserver, TransactionSequencer, TxObserver};
pub use settings::FlowSettings;
