//! Cross-subsystem integration flows.

pub mod reentrancy;
pub mod relay_flows;
pub mod version_flows;
