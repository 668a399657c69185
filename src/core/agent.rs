use super::observer::AgentObserver;
use super::ordering::{acquisition_order, AcquisitionOrder};
use super::random::{draw, make_rng};
use super::report::{AgentReport, CycleRecord, WaitStats};
use super::resource::{Resource, ResourceGuard};
use super::types::{AgentId, ResourceId, Side};
use log::{debug, info};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Stage of an agent's cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentPhase {
    Thinking,
    Acquiring,
    Eating,
    Releasing,
}

impl std::fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AgentPhase::Thinking => "thinking",
            AgentPhase::Acquiring => "acquiring",
            AgentPhase::Eating => "eating",
            AgentPhase::Releasing => "releasing",
        };
        f.write_str(name)
    }
}

/// Upper bounds (exclusive, in milliseconds) for an agent's random delays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentBounds {
    pub think_ms: i64,
    pub eat_ms: i64,
}

impl AgentBounds {
    /// Bounds below one millisecond are raised to one so every draw has a
    /// non-empty range.
    pub fn new(think_ms: i64, eat_ms: i64) -> Self {
        Self {
            think_ms: think_ms.max(1),
            eat_ms: eat_ms.max(1),
        }
    }
}

/// Cloneable handle used to ask a running agent to stop.
///
/// The flag only ever goes from running to stopped. The agent samples it at
/// the start of each cycle, so the cycle in flight always completes and
/// releases its resources.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// A philosopher at the ring: thinks, takes both neighbouring resources in
/// parity order, eats, releases, and measures how long it was kept waiting.
#[derive(Debug)]
pub struct Agent {
    id: AgentId,
    bounds: AgentBounds,
    order: AcquisitionOrder,
    stop: StopHandle,
    max_cycles: Option<u64>,
    rng: StdRng,
}

impl Agent {
    pub fn new(id: AgentId, ring_size: usize, bounds: AgentBounds) -> Self {
        Self {
            id,
            bounds,
            order: acquisition_order(id, ring_size),
            stop: StopHandle::new(),
            max_cycles: None,
            rng: make_rng(None),
        }
    }

    /// Replace the entropy-seeded RNG used for think and eat delays
    ///
    /// # Arguments
    /// * `rng` - Generator for this agent's per-cycle draws
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Leave the loop on its own after a number of completed cycles
    ///
    /// # Arguments
    /// * `cycles` - Cycle limit, or `None` to run until stopped
    ///
    /// # Returns
    /// The agent with the limit applied; a stop request still ends it early
    pub fn with_max_cycles(mut self, cycles: Option<u64>) -> Self {
        self.max_cycles = cycles;
        self
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn bounds(&self) -> AgentBounds {
        self.bounds
    }

    pub fn order(&self) -> AcquisitionOrder {
        self.order
    }

    pub fn left(&self) -> ResourceId {
        match self.order.first {
            (Side::Left, id) => id,
            _ => self.order.second.1,
        }
    }

    pub fn right(&self) -> ResourceId {
        match self.order.first {
            (Side::Right, id) => id,
            _ => self.order.second.1,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run cycles until stopped, then report the average wait percentage.
    ///
    /// `left` and `right` must be the resources this agent is bound to.
    pub fn run(
        mut self,
        left: &Resource,
        right: &Resource,
        observer: &dyn AgentObserver,
    ) -> AgentReport {
        debug_assert_eq!(left.id(), self.left());
        debug_assert_eq!(right.id(), self.right());

        let mut stats = WaitStats::new();
        while self.should_continue(stats.cycles()) {
            let record = self.cycle(stats.cycles(), left, right, observer);
            let pct = stats.record(&record);
            debug!(
                "[Agent {}] cycle {} waited {:?} of {:?} ({:.2}%)",
                self.id, record.cycle, record.wait, record.total, pct
            );
            observer.on_cycle_complete(self.id, &record);
        }

        let report = AgentReport::from_stats(self.id, &stats);
        info!(
            "[Agent {}] stopped after {} cycles, average wait {:.2}%",
            self.id, report.cycles, report.average_wait_percentage
        );
        observer.on_agent_finished(&report);
        report
    }

    fn should_continue(&self, completed: u64) -> bool {
        self.stop.is_running() && self.max_cycles.map_or(true, |max| completed < max)
    }

    fn cycle(
        &mut self,
        cycle: u64,
        left: &Resource,
        right: &Resource,
        observer: &dyn AgentObserver,
    ) -> CycleRecord {
        let think = draw(&mut self.rng, 0, self.bounds.think_ms);
        let eat = draw(&mut self.rng, 0, self.bounds.eat_ms);

        self.enter(AgentPhase::Thinking);
        sleep_ms(think);
        observer.on_finished_thinking(self.id);

        self.enter(AgentPhase::Acquiring);
        let started = Instant::now();
        let first = self.take(self.order.first.0, left, right, observer);
        let second = self.take(self.order.second.0, left, right, observer);
        let wait = started.elapsed();

        self.enter(AgentPhase::Eating);
        sleep_ms(eat);

        self.enter(AgentPhase::Releasing);
        first.release();
        second.release();
        let total = started.elapsed();
        observer.on_finished_eating(self.id);

        CycleRecord { cycle, wait, total }
    }

    fn take<'r>(
        &self,
        side: Side,
        left: &'r Resource,
        right: &'r Resource,
        observer: &dyn AgentObserver,
    ) -> ResourceGuard<'r> {
        let resource = match side {
            Side::Left => left,
            Side::Right => right,
        };
        let guard = resource.acquire(self.id);
        observer.on_resource_taken(self.id, side, resource.id());
        guard
    }

    fn enter(&self, phase: AgentPhase) {
        debug!("[Agent {}] {}", self.id, phase);
    }
}

fn sleep_ms(ms: i64) {
    if ms > 0 {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::observer::{NullObserver, ObservedEvent, RecordingObserver};

    fn ring_of_two() -> (Resource, Resource) {
        (
            Resource::new(ResourceId::new(0)),
            Resource::new(ResourceId::new(1)),
        )
    }

    #[test]
    fn test_bounds_are_at_least_one() {
        let bounds = AgentBounds::new(0, -4);
        assert_eq!(bounds, AgentBounds { think_ms: 1, eat_ms: 1 });
    }

    #[test]
    fn test_bindings_follow_ring() {
        let agent = Agent::new(AgentId::new(4), 5, AgentBounds::new(1, 1));
        assert_eq!(agent.left(), ResourceId::new(4));
        assert_eq!(agent.right(), ResourceId::new(0));
    }

    #[test]
    fn test_runs_requested_cycles_and_releases() {
        let (left, right) = ring_of_two();
        let agent = Agent::new(AgentId::new(0), 2, AgentBounds::new(1, 1))
            .with_rng(make_rng(Some(7)))
            .with_max_cycles(Some(5));

        let report = agent.run(&left, &right, &NullObserver);
        assert_eq!(report.cycles, 5);
        assert!((0.0..=100.0).contains(&report.average_wait_percentage));
        assert_eq!(left.holder(), None);
        assert_eq!(right.holder(), None);
        assert_eq!(left.stats().acquisitions, 5);
        assert_eq!(right.stats().acquisitions, 5);
    }

    #[test]
    fn test_stopped_agent_reports_nan() {
        let (left, right) = ring_of_two();
        let agent = Agent::new(AgentId::new(0), 2, AgentBounds::new(1, 1));
        agent.stop_handle().stop();

        let report = agent.run(&left, &right, &NullObserver);
        assert_eq!(report.cycles, 0);
        assert!(report.average_wait_percentage.is_nan());
        assert_eq!(left.stats().acquisitions, 0);
    }

    #[test]
    fn test_even_agent_takes_right_then_left() {
        let (left, right) = ring_of_two();
        let observer = RecordingObserver::new();
        let agent = Agent::new(AgentId::new(0), 2, AgentBounds::new(1, 1)).with_max_cycles(Some(1));
        agent.run(&left, &right, &observer);

        let events = observer.events();
        assert_eq!(events[0], ObservedEvent::FinishedThinking(AgentId::new(0)));
        assert_eq!(
            events[1],
            ObservedEvent::ResourceTaken(AgentId::new(0), Side::Right, ResourceId::new(1))
        );
        assert_eq!(
            events[2],
            ObservedEvent::ResourceTaken(AgentId::new(0), Side::Left, ResourceId::new(0))
        );
        assert_eq!(events[3], ObservedEvent::FinishedEating(AgentId::new(0)));
        assert!(matches!(events[4], ObservedEvent::CycleComplete(_, _)));
        assert_eq!(events[5], ObservedEvent::AgentFinished(AgentId::new(0)));
    }

    #[test]
    fn test_odd_agent_takes_left_then_right() {
        // Agent 1 on a ring of two: left is resource 1, right is resource 0
        let left = Resource::new(ResourceId::new(1));
        let right = Resource::new(ResourceId::new(0));
        let observer = RecordingObserver::new();
        let agent = Agent::new(AgentId::new(1), 2, AgentBounds::new(1, 1)).with_max_cycles(Some(1));
        agent.run(&left, &right, &observer);

        let taken: Vec<_> = observer
            .events()
            .into_iter()
            .filter_map(|event| match event {
                ObservedEvent::ResourceTaken(_, side, resource) => Some((side, resource)),
                _ => None,
            })
            .collect();
        assert_eq!(
            taken,
            vec![(Side::Left, ResourceId::new(1)), (Side::Right, ResourceId::new(0))]
        );
    }

    #[test]
    fn test_stop_is_observed_at_cycle_start() {
        let (left, right) = ring_of_two();
        let agent = Agent::new(AgentId::new(0), 2, AgentBounds::new(20, 20));
        let stop = agent.stop_handle();

        let report = thread::scope(|scope| {
            let worker = scope.spawn(|| agent.run(&left, &right, &NullObserver));
            let deadline = Instant::now() + Duration::from_secs(10);
            while left.stats().acquisitions == 0 && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(5));
            }
            stop.stop();
            worker.join().unwrap()
        });

        assert!(!stop.is_running());
        assert!(report.cycles >= 1);
        assert_eq!(left.holder(), None);
        assert_eq!(right.holder(), None);
    }
}
