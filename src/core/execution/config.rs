//! Configuration for a ring simulation
//!
//! Holds the three values the command line requires (ring size and the two
//! delay maxima) plus optional knobs for reproducible and bounded runs.

use crate::core::errors::{Result, SimulationError};
use serde::{Deserialize, Serialize};

/// Configuration for simulation execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of agents, and therefore resources, on the ring
    pub agents: i64,
    /// Upper bound used when drawing each agent's think bound
    pub max_think_ms: i64,
    /// Upper bound used when drawing each agent's eat bound
    pub max_eat_ms: i64,
    /// Seed for reproducible bounds and delays; entropy when absent
    pub seed: Option<u64>,
    /// Cycles after which every agent stops on its own
    pub max_cycles: Option<u64>,
}

impl SimulationConfig {
    /// Create a new configuration with no seed and no cycle limit
    ///
    /// # Arguments
    /// * `agents` - Number of agents on the ring; checked by `validate`
    /// * `max_think_ms` - Upper bound for drawing think bounds
    /// * `max_eat_ms` - Upper bound for drawing eat bounds
    pub fn new(agents: i64, max_think_ms: i64, max_eat_ms: i64) -> Self {
        Self {
            agents,
            max_think_ms,
            max_eat_ms,
            seed: None,
            max_cycles: None,
        }
    }

    /// Seed every random draw of the run
    ///
    /// # Arguments
    /// * `seed` - Seed for the ring's bound draws; agent `i` uses `seed + i`
    ///
    /// # Returns
    /// A new configuration that reproduces the same bounds and delays
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of cycles each agent runs before stopping by itself
    ///
    /// # Arguments
    /// * `cycles` - Completed cycles after which an agent leaves its loop
    ///
    /// # Returns
    /// A new configuration with the cycle limit set
    ///
    /// # Note
    /// A stop request still ends the run early.
    pub fn with_max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Reject rings that cannot be built, before anything is constructed
    ///
    /// # Returns
    /// The ring size, or `TooFewAgents` when it is below two
    pub fn validate(&self) -> Result<usize> {
        if self.agents < 2 {
            return Err(SimulationError::TooFewAgents {
                agents: self.agents,
            });
        }
        usize::try_from(self.agents).map_err(|_| SimulationError::TooFewAgents {
            agents: self.agents,
        })
    }

    /// Seed for agent `index`'s delay RNG
    pub fn agent_seed(&self, index: usize) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(index as u64))
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new(5, 500, 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.agents, 5);
        assert_eq!(config.seed, None);
        assert_eq!(config.max_cycles, None);
        assert_eq!(config.validate().unwrap(), 5);
    }

    #[test]
    fn test_config_builder() {
        let config = SimulationConfig::new(3, 10, 20)
            .with_seed(9)
            .with_max_cycles(50);

        assert_eq!(config.seed, Some(9));
        assert_eq!(config.max_cycles, Some(50));
        assert_eq!(config.agent_seed(2), Some(11));
    }

    #[test]
    fn test_rejects_small_rings() {
        for agents in [-1, 0, 1] {
            let err = SimulationConfig::new(agents, 10, 10).validate().unwrap_err();
            assert!(matches!(err, SimulationError::TooFewAgents { agents: a } if a == agents));
        }
        assert_eq!(SimulationConfig::new(2, 1, 1).validate().unwrap(), 2);
    }
}
