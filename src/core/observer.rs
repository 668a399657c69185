use super::report::{AgentReport, CycleRecord};
use super::types::{AgentId, ResourceId, Side};
use log::warn;
use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Observer for agent progress.
///
/// Hooks are called from the agent's own thread, so implementations must be
/// shareable across threads. Every hook defaults to doing nothing.
pub trait AgentObserver: Send + Sync {
    /// Called when the think delay of a cycle has elapsed
    fn on_finished_thinking(&self, _agent: AgentId) {}

    /// Called each time the agent gets hold of one of its resources
    fn on_resource_taken(&self, _agent: AgentId, _side: Side, _resource: ResourceId) {}

    /// Called after both resources have been released
    fn on_finished_eating(&self, _agent: AgentId) {}

    /// Called with the timing of every completed cycle
    fn on_cycle_complete(&self, _agent: AgentId, _record: &CycleRecord) {}

    /// Called once when the agent's loop has exited
    fn on_agent_finished(&self, _report: &AgentReport) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl AgentObserver for NullObserver {}

/// Prints progress lines and final reports to stdout.
///
/// Once stdout is gone (a closed pipe, for instance) the observer goes
/// silent instead of failing the agents.
#[derive(Debug)]
pub struct ConsoleObserver {
    progress: bool,
    closed: AtomicBool,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self {
            progress: true,
            closed: AtomicBool::new(false),
        }
    }

    /// Only print the final per-agent reports
    pub fn quiet() -> Self {
        Self {
            progress: false,
            ..Self::new()
        }
    }

    /// True after a write to stdout has failed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn print(&self, line: fmt::Arguments<'_>) {
        self.emit(&mut io::stdout().lock(), line);
    }

    fn emit<W: Write>(&self, out: &mut W, line: fmt::Arguments<'_>) {
        if self.is_closed() {
            return;
        }
        if let Err(err) = writeln!(out, "{}", line) {
            if err.kind() != io::ErrorKind::BrokenPipe {
                warn!("Console output failed: {}", err);
            }
            self.closed.store(true, Ordering::Release);
        }
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentObserver for ConsoleObserver {
    fn on_finished_thinking(&self, agent: AgentId) {
        if self.progress {
            self.print(format_args!("philosopher {} finished thinking", agent));
        }
    }

    fn on_resource_taken(&self, agent: AgentId, side: Side, resource: ResourceId) {
        if self.progress {
            self.print(format_args!("philosopher {} took {} fork {}", agent, side, resource));
        }
    }

    fn on_finished_eating(&self, agent: AgentId) {
        if self.progress {
            self.print(format_args!("philosopher {} finished eating", agent));
        }
    }

    fn on_agent_finished(&self, report: &AgentReport) {
        self.print(format_args!("{}", report));
    }
}

/// Event captured by [`RecordingObserver`]
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    FinishedThinking(AgentId),
    ResourceTaken(AgentId, Side, ResourceId),
    FinishedEating(AgentId),
    CycleComplete(AgentId, CycleRecord),
    AgentFinished(AgentId),
}

/// Keeps every event in arrival order
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.lock().clone()
    }

    /// Events emitted by a single agent, in order
    pub fn events_for(&self, agent: AgentId) -> Vec<ObservedEvent> {
        self.lock()
            .iter()
            .filter(|event| event.agent() == agent)
            .cloned()
            .collect()
    }

    fn push(&self, event: ObservedEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ObservedEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ObservedEvent {
    pub fn agent(&self) -> AgentId {
        match self {
            ObservedEvent::FinishedThinking(agent)
            | ObservedEvent::ResourceTaken(agent, _, _)
            | ObservedEvent::FinishedEating(agent)
            | ObservedEvent::CycleComplete(agent, _)
            | ObservedEvent::AgentFinished(agent) => *agent,
        }
    }
}

impl AgentObserver for RecordingObserver {
    fn on_finished_thinking(&self, agent: AgentId) {
        self.push(ObservedEvent::FinishedThinking(agent));
    }

    fn on_resource_taken(&self, agent: AgentId, side: Side, resource: ResourceId) {
        self.push(ObservedEvent::ResourceTaken(agent, side, resource));
    }

    fn on_finished_eating(&self, agent: AgentId) {
        self.push(ObservedEvent::FinishedEating(agent));
    }

    fn on_cycle_complete(&self, agent: AgentId, record: &CycleRecord) {
        self.push(ObservedEvent::CycleComplete(agent, *record));
    }

    fn on_agent_finished(&self, report: &AgentReport) {
        self.push(ObservedEvent::AgentFinished(report.agent));
    }
}

/// Forwards every hook to each inner observer in turn
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<std::sync::Arc<dyn AgentObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, observer: std::sync::Arc<dyn AgentObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl AgentObserver for ObserverSet {
    fn on_finished_thinking(&self, agent: AgentId) {
        for observer in &self.observers {
            observer.on_finished_thinking(agent);
        }
    }

    fn on_resource_taken(&self, agent: AgentId, side: Side, resource: ResourceId) {
        for observer in &self.observers {
            observer.on_resource_taken(agent, side, resource);
        }
    }

    fn on_finished_eating(&self, agent: AgentId) {
        for observer in &self.observers {
            observer.on_finished_eating(agent);
        }
    }

    fn on_cycle_complete(&self, agent: AgentId, record: &CycleRecord) {
        for observer in &self.observers {
            observer.on_cycle_complete(agent, record);
        }
    }

    fn on_agent_finished(&self, report: &AgentReport) {
        for observer in &self.observers {
            observer.on_agent_finished(report);
        }
    }
}
