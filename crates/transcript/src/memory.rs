use serde::{Deserialize, Serialize};

use crate::StrategyId;

/// The last strategy that produced a transcript.
///
/// Owned by the caller and threaded through successive acquisition calls. It
/// only reorders the chain; every strategy stays reachable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyMemory {
    last_success: Option<StrategyId>,
}

impl StrategyMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_success(&self) -> Option<StrategyId> {
        self.last_success
    }

    /// Returns the memory updated with a new success.
    pub fn record(self, strategy: StrategyId) -> Self {
        Self {
            last_success: Some(strategy),
        }
    }
}
