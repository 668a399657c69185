pub mod config;
pub mod ring;
pub mod simulation_engine;

// Re-export commonly used types
pub use config::SimulationConfig;
pub use ring::Ring;
pub use simulation_engine::SimulationEngine;
