//! Acquisition ordering for the ring.
//!
//! Agent `i` is bound to resource `i` on its left and `(i + 1) mod N` on its
//! right. Odd agents take left then right, even agents right then left. A
//! circular wait needs every agent to hold its first resource while waiting
//! on its second, which in turn must be some neighbour's first resource. As
//! long as at least one resource is the second pick of both agents sharing
//! it, that chain is broken.

use super::types::{AgentId, ResourceId, Side};

/// The two resources an agent needs, in the order it requests them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionOrder {
    pub first: (Side, ResourceId),
    pub second: (Side, ResourceId),
}

/// Left resource of agent `index`
pub fn left_of(index: usize) -> ResourceId {
    ResourceId::new(index)
}

/// Right resource of agent `index` on a ring of `ring_size`
pub fn right_of(index: usize, ring_size: usize) -> ResourceId {
    ResourceId::new((index + 1) % ring_size)
}

/// Parity rule: odd agents go left first, even agents go right first
pub fn acquisition_order(agent: AgentId, ring_size: usize) -> AcquisitionOrder {
    let left = (Side::Left, left_of(agent.index()));
    let right = (Side::Right, right_of(agent.index(), ring_size));
    if agent.is_odd() {
        AcquisitionOrder {
            first: left,
            second: right,
        }
    } else {
        AcquisitionOrder {
            first: right,
            second: left,
        }
    }
}

/// True when the given per-agent orders allow every agent to hold one
/// resource while waiting on the next one around the ring.
///
/// On a ring every agent's wait edge points either clockwise (left first) or
/// counter-clockwise (right first); a cycle of waits exists exactly when all
/// edges point the same way.
pub fn has_circular_wait(orders: &[AcquisitionOrder]) -> bool {
    if orders.len() < 2 {
        return false;
    }
    let all_left_first = orders.iter().all(|o| o.first.0 == Side::Left);
    let all_right_first = orders.iter().all(|o| o.first.0 == Side::Right);
    all_left_first || all_right_first
}

/// Resources that both sharing agents request second. Holding one of these
/// means its holder already holds both of its resources.
pub fn second_pick_resources(orders: &[AcquisitionOrder]) -> Vec<ResourceId> {
    let n = orders.len();
    (0..n)
        .map(ResourceId::new)
        .filter(|resource| {
            // Resource r is the left of agent r and the right of agent r - 1
            let owner_left = &orders[resource.index()];
            let owner_right = &orders[(resource.index() + n - 1) % n];
            owner_left.second.1 == *resource && owner_right.second.1 == *resource
        })
        .collect()
}
