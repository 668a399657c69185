pub mod core;

// Re-export commonly used types
pub use crate::core::agent::{Agent, AgentBounds, AgentPhase, StopHandle};
pub use crate::core::errors::{Result, SimulationError};
pub use crate::core::execution::{Ring, SimulationConfig, SimulationEngine};
pub use crate::core::observer::{AgentObserver, ConsoleObserver, NullObserver, RecordingObserver};
pub use crate::core::report::{AgentReport, CycleRecord, WaitStats};
pub use crate::core::resource::{Resource, ResourceGuard, ResourceStats};
pub use crate::core::types::{AgentId, ResourceId, Side};
