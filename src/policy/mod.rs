//! Policy module.
//!
//! Capability availability, the live-execution safety gate and trade risk limits.

pub mod capability;
pub mod gate;
pub mod risk;

pub use capability::{Capability, CapabilityRegistry};
pub use gate::{SafetyGate, CONFIRMATION_TOKEN};
pub use risk::{DailyRiskReport, RiskGuard};
