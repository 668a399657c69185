use super::types::AgentId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing of one completed think/acquire/eat/release cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleRecord {
    pub cycle: u64,
    /// From the start of acquisition until both resources were held
    pub wait: Duration,
    /// From the start of acquisition until both resources were released
    pub total: Duration,
}

impl CycleRecord {
    /// Share of the cycle spent blocked on acquisition, in percent.
    ///
    /// A cycle with no measurable duration counts as zero contention.
    pub fn wait_percentage(&self) -> f64 {
        if self.total.is_zero() {
            return 0.0;
        }
        let pct = self.wait.as_nanos() as f64 / self.total.as_nanos() as f64 * 100.0;
        pct.clamp(0.0, 100.0)
    }
}

/// Per-agent series of wait percentages, one entry per completed cycle
#[derive(Debug, Clone, Default)]
pub struct WaitStats {
    percentages: Vec<f64>,
}

impl WaitStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: &CycleRecord) -> f64 {
        let pct = record.wait_percentage();
        self.percentages.push(pct);
        pct
    }

    pub fn cycles(&self) -> u64 {
        self.percentages.len() as u64
    }

    pub fn percentages(&self) -> &[f64] {
        &self.percentages
    }

    /// Arithmetic mean of the series; NaN when no cycle completed
    pub fn average(&self) -> f64 {
        if self.percentages.is_empty() {
            return f64::NAN;
        }
        self.percentages.iter().sum::<f64>() / self.percentages.len() as f64
    }
}

/// Terminal report of an agent, emitted once its loop exits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReport {
    pub agent: AgentId,
    pub cycles: u64,
    pub average_wait_percentage: f64,
}

impl AgentReport {
    pub fn from_stats(agent: AgentId, stats: &WaitStats) -> Self {
        Self {
            agent,
            cycles: stats.cycles(),
            average_wait_percentage: stats.average(),
        }
    }
}

impl std::fmt::Display for AgentReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "philosopher {} waited {:.2}% of the time on average ({} cycles)",
            self.agent, self.average_wait_percentage, self.cycles
        )
    }
}
