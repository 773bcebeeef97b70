pub mod chain;
pub mod config;
pub mod evm;
pub mod memory;
pub mod telemetry;
