use super::types::AgentId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Number of agents has to be >= 2 (got {agents})")]
    TooFewAgents { agents: i64 },

    #[error("Acquisition order of {agents} agents forms a circular wait")]
    CircularWait { agents: usize },

    #[error("Agent {0} panicked before reporting")]
    AgentPanicked(AgentId),

    #[error("Simulation already started")]
    AlreadyStarted,

    #[error("Simulation not started")]
    NotStarted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
