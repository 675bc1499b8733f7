pub mod constants;
pub mod harness;

#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use harness::*;
