//! Configuration for the Router Registry actor

use serde::{Deserialize, Serialize};

/// Registry configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Minimum attached value for requests that emit a response
    pub min_response_value: u64,
    /// Re-check snapshot invariants after every transition
    pub check_invariants: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            min_response_value: 10_000_000, // 0.01 of the native coin
            check_invariants: true,
        }
    }
}
