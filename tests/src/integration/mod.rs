//! # Integration Scenarios

pub mod concurrency;
pub mod propagation_flows;
pub mod tcp_runtime;
pub mod update_flows;
