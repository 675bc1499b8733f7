mod allowance_resolver;
mod instant_unstake;
mod log_channel;
mod staking;
