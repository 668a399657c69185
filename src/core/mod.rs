pub mod agent;
pub mod errors;
pub mod execution;
pub mod observer;
pub mod ordering;
pub mod random;
pub mod report;
pub mod resource;
pub mod types;
