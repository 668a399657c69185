use super::config::SimulationConfig;
use super::ring::Ring;
use crate::core::agent::StopHandle;
use crate::core::errors::{Result, SimulationError};
use crate::core::observer::{AgentObserver, ObserverSet};
use crate::core::report::AgentReport;
use crate::core::resource::Resource;
use crate::core::types::AgentId;
use log::{info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Orchestrates a ring run: one OS thread per agent, a stop request that
/// reaches every agent, and a join that collects the agents' reports.
pub struct SimulationEngine {
    ring: Option<Ring>,
    resources: Arc<[Resource]>,
    observers: ObserverSet,
    stops: Vec<StopHandle>,
    workers: Vec<(AgentId, JoinHandle<AgentReport>)>,
}

impl SimulationEngine {
    /// Build the ring described by `config`; nothing runs until `start`
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let ring = Ring::build(config)?;
        Ok(Self {
            resources: ring.resources(),
            ring: Some(ring),
            observers: ObserverSet::new(),
            stops: Vec::new(),
            workers: Vec::new(),
        })
    }

    /// Add an observer; only observers added before `start` see the run
    pub fn add_observer(&mut self, observer: Arc<dyn AgentObserver>) {
        self.observers.push(observer);
    }

    pub fn ring_size(&self) -> usize {
        self.resources.len()
    }

    /// Shared handle to the resource arena, for sampling holders
    pub fn resources(&self) -> Arc<[Resource]> {
        Arc::clone(&self.resources)
    }

    /// Spawn one thread per agent
    pub fn start(&mut self) -> Result<()> {
        let ring = self.ring.take().ok_or(SimulationError::AlreadyStarted)?;
        let observers: Arc<ObserverSet> = Arc::new(std::mem::take(&mut self.observers));
        let (resources, agents) = ring.into_parts();

        for agent in agents {
            let id = agent.id();
            let (left, right) = (agent.left().index(), agent.right().index());
            self.stops.push(agent.stop_handle());

            let resources = Arc::clone(&resources);
            let observers = Arc::clone(&observers);
            let handle = thread::Builder::new()
                .name(format!("agent-{}", id))
                .spawn(move || agent.run(&resources[left], &resources[right], observers.as_ref()))?;
            self.workers.push((id, handle));
        }

        info!("Started {} agents", self.workers.len());
        Ok(())
    }

    /// Ask every agent to leave its loop at its next cycle start
    pub fn stop(&self) {
        info!("Stopping {} agents", self.stops.len());
        for stop in &self.stops {
            stop.stop();
        }
    }

    /// Wait for every agent thread and return their reports ordered by id
    pub fn join(&mut self) -> Result<Vec<AgentReport>> {
        if self.workers.is_empty() {
            return Err(SimulationError::NotStarted);
        }

        let mut reports = Vec::with_capacity(self.workers.len());
        let mut failure = None;
        for (id, handle) in self.workers.drain(..) {
            match handle.join() {
                Ok(report) => reports.push(report),
                Err(_) => {
                    warn!("[Agent {}] thread panicked", id);
                    failure.get_or_insert(SimulationError::AgentPanicked(id));
                }
            }
        }

        match failure {
            Some(err) => Err(err),
            None => {
                reports.sort_by_key(|report| report.agent);
                Ok(reports)
            }
        }
    }

    /// Start, block on `trigger`, then stop and join.
    ///
    /// The agents are stopped and joined even when the trigger fails.
    pub fn run_until<F>(mut self, trigger: F) -> Result<Vec<AgentReport>>
    where
        F: FnOnce() -> Result<()>,
    {
        self.start()?;
        let triggered = trigger();
        self.stop();
        let reports = self.join();
        triggered?;
        reports
    }
}

impl Drop for SimulationEngine {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.stop();
            let _ = self.join();
        }
    }
}
