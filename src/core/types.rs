use serde::{Deserialize, Serialize};

/// Identifier of an agent seated at the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub(crate) usize);

impl AgentId {
    /// Create a new agent ID
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index into the ring
    pub fn index(&self) -> usize {
        self.0
    }

    /// Odd-numbered agents reach for their left resource first
    pub fn is_odd(&self) -> bool {
        self.0 % 2 == 1
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an exclusive resource on the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub(crate) usize);

impl ResourceId {
    /// Create a new resource ID
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index into the ring
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which of an agent's two bound resources is meant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}
