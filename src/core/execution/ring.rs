use super::config::SimulationConfig;
use crate::core::agent::{Agent, AgentBounds};
use crate::core::errors::{Result, SimulationError};
use crate::core::ordering::{has_circular_wait, AcquisitionOrder};
use crate::core::random::{draw, make_rng};
use crate::core::resource::Resource;
use crate::core::types::{AgentId, ResourceId};
use log::{debug, info};
use std::sync::Arc;

/// Lower bound used when drawing per-agent delay bounds
pub const MIN_BOUND_MS: i64 = 10;

/// Agents and resources arranged in a ring.
///
/// Both live in index-addressed arenas: agent `i` is bound to resource `i`
/// and resource `(i + 1) mod N`, and the bindings never change.
#[derive(Debug)]
pub struct Ring {
    resources: Arc<[Resource]>,
    agents: Vec<Agent>,
}

impl Ring {
    /// Validate the configuration, then build N resources and N agents
    ///
    /// # Errors
    /// `TooFewAgents` for rings below two agents. `CircularWait` if the
    /// acquisition orders could close a wait cycle, which the parity rule
    /// never produces; the check guards changes to the ordering.
    pub fn build(config: &SimulationConfig) -> Result<Self> {
        let n = config.validate()?;
        let mut rng = make_rng(config.seed);

        let agents: Vec<Agent> = (0..n)
            .map(|i| {
                let bounds = AgentBounds::new(
                    draw(&mut rng, MIN_BOUND_MS, config.max_think_ms),
                    draw(&mut rng, MIN_BOUND_MS, config.max_eat_ms),
                );
                debug!(
                    "[Agent {}] think bound {}ms, eat bound {}ms",
                    i, bounds.think_ms, bounds.eat_ms
                );
                Agent::new(AgentId::new(i), n, bounds)
                    .with_rng(make_rng(config.agent_seed(i)))
                    .with_max_cycles(config.max_cycles)
            })
            .collect();

        let resources: Arc<[Resource]> = (0..n).map(|i| Resource::new(ResourceId::new(i))).collect();

        let ring = Self { resources, agents };
        check_orders(&ring.orders())?;

        info!("Built ring of {} agents and {} resources", n, n);
        Ok(ring)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Shared handle to the resource arena
    pub fn resources(&self) -> Arc<[Resource]> {
        Arc::clone(&self.resources)
    }

    pub fn orders(&self) -> Vec<AcquisitionOrder> {
        self.agents.iter().map(Agent::order).collect()
    }

    /// Hand the agents over for launching; the resource arena stays shared
    pub(crate) fn into_parts(self) -> (Arc<[Resource]>, Vec<Agent>) {
        (self.resources, self.agents)
    }
}

/// Refuse acquisition orders under which every agent could end up holding
/// one resource while waiting on its neighbour
pub(crate) fn check_orders(orders: &[AcquisitionOrder]) -> Result<()> {
    if has_circular_wait(orders) {
        return Err(SimulationError::CircularWait {
            agents: orders.len(),
        });
    }
    Ok(())
}
