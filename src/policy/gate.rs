//! Safety gate for state-changing actions.

use std::sync::Arc;

use crate::config::Config;

/// The only confirmation value that opens the gate. Compared exactly.
pub const CONFIRMATION_TOKEN: &str = "YES";

/// Decides whether a state-changing action may reach live infrastructure.
///
/// Live execution needs both live mode and the exact confirmation token.
/// The answer is recomputed on every call and never cached.
#[derive(Debug, Clone)]
pub struct SafetyGate {
    config: Arc<Config>,
}

impl SafetyGate {
    /// Create a gate over a configuration snapshot.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Whether live execution is permitted right now.
    pub fn may_execute_live(&self) -> bool {
        self.config.mode.is_live() && self.config.confirmation == CONFIRMATION_TOKEN
    }
}
