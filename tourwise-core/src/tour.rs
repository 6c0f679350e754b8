//! Exact open-path tour solving.
//!
//! [`HeldKarpSolver`] runs a bitmask dynamic programme over subsets of visited
//! waypoints. Node `0` is always the start and the path does not return to it.
//!
//! `cost[mask][i]` holds the cheapest path that starts at node `0`, visits
//! exactly the nodes in `mask` and currently stands on `i`. Both tables are
//! flat buffers of `2^N × N` entries, allocated once per solve.

use thiserror::Error;

use crate::matrix::DistanceMatrix;
use crate::waypoint::MAX_WAYPOINTS;

/// Marker for states no path has reached yet.
const UNSET: u64 = u64::MAX;

/// Marker for states without a predecessor.
const NO_PARENT: u8 = u8::MAX;

/// Ordered visiting sequence and its cost.
///
/// `order` is a permutation of `0..N` beginning with `0`.
///
/// # Examples
/// ```
/// use tourwise_core::Tour;
///
/// let tour = Tour::new(vec![0, 2, 1], 250);
/// assert_eq!(tour.legs().collect::<Vec<_>>(), vec![(0, 2), (2, 1)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tour {
    /// Waypoint indices in visiting order.
    pub order: Vec<usize>,
    /// Sum of consecutive leg distances in metres.
    pub total_cost: u64,
}

impl Tour {
    /// Construct a tour from an order and its cost.
    #[must_use]
    pub const fn new(order: Vec<usize>, total_cost: u64) -> Self {
        Self { order, total_cost }
    }

    /// Consecutive `(from, to)` index pairs.
    pub fn legs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.order.windows(2).filter_map(|pair| match *pair {
            [from, to] => Some((from, to)),
            _ => None,
        })
    }
}

/// Errors returned by [`TourSolver::solve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TourError {
    /// The matrix had no nodes.
    #[error("cannot solve a tour over zero waypoints")]
    EmptyMatrix,
    /// The node count exceeds what the exact solver accepts.
    #[error("too many stops: {nodes} waypoints exceed the limit of {max}")]
    TooManyNodes {
        /// Nodes in the matrix.
        nodes: usize,
        /// Configured maximum.
        max: usize,
    },
    /// Reconstruction hit a missing predecessor. Indicates a solver defect.
    #[error("tour reconstruction failed at node {node}")]
    Reconstruction {
        /// Node whose predecessor was missing.
        node: usize,
    },
}

/// Compute a visiting order over a distance matrix.
///
/// Implementations must reject oversized inputs up front rather than running
/// for an unbounded time. Solvers must be `Send + Sync` to operate safely
/// across threads.
pub trait TourSolver: Send + Sync {
    /// Solve for the cheapest open path starting at node `0`.
    ///
    /// # Errors
    ///
    /// Returns a [`TourError`] when the input cannot be solved.
    fn solve(&self, matrix: &DistanceMatrix) -> Result<Tour, TourError>;
}

/// Exact bitmask dynamic-programming solver.
///
/// # Examples
/// ```
/// use tourwise_core::{DistanceMatrix, HeldKarpSolver, TourSolver};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let matrix = DistanceMatrix::from_rows(vec![
///     vec![0, 100, 300],
///     vec![100, 0, 150],
///     vec![300, 150, 0],
/// ])?;
/// let tour = HeldKarpSolver::default().solve(&matrix)?;
/// assert_eq!(tour.order, vec![0, 1, 2]);
/// assert_eq!(tour.total_cost, 250);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldKarpSolver {
    max_nodes: usize,
}

impl Default for HeldKarpSolver {
    fn default() -> Self {
        Self {
            max_nodes: MAX_WAYPOINTS,
        }
    }
}

impl HeldKarpSolver {
    /// Construct a solver with a custom node limit.
    ///
    /// The limit is clamped to [`MAX_WAYPOINTS`]; larger tables are never
    /// allocated.
    #[must_use]
    pub fn with_max_nodes(max_nodes: usize) -> Self {
        Self {
            max_nodes: max_nodes.min(MAX_WAYPOINTS),
        }
    }

    /// Largest node count this solver accepts.
    #[must_use]
    pub const fn max_nodes(&self) -> usize {
        self.max_nodes
    }
}

impl TourSolver for HeldKarpSolver {
    fn solve(&self, matrix: &DistanceMatrix) -> Result<Tour, TourError> {
        let nodes = matrix.size();
        if nodes == 0 {
            return Err(TourError::EmptyMatrix);
        }
        if nodes > self.max_nodes {
            return Err(TourError::TooManyNodes {
                nodes,
                max: self.max_nodes,
            });
        }

        let mut table = DpTable::new(nodes);
        table.fill(matrix);
        let (last, total_cost) = table.best_final_state();
        let order = table.reconstruct(last)?;
        log::debug!("solved {nodes}-node tour with cost {total_cost}");
        Ok(Tour::new(order, total_cost))
    }
}

/// Solve with the default [`HeldKarpSolver`].
///
/// # Errors
///
/// See [`TourSolver::solve`].
pub fn solve(matrix: &DistanceMatrix) -> Result<Tour, TourError> {
    HeldKarpSolver::default().solve(matrix)
}

/// Flat cost and parent tables indexed by `(mask, node)`.
struct DpTable {
    nodes: usize,
    cost: Vec<u64>,
    parent: Vec<u8>,
}

impl DpTable {
    fn new(nodes: usize) -> Self {
        let states = (1_usize << nodes) * nodes;
        let mut table = Self {
            nodes,
            cost: vec![UNSET; states],
            parent: vec![NO_PARENT; states],
        };
        table.set(1, 0, 0, NO_PARENT);
        table
    }

    const fn full_mask(&self) -> usize {
        (1_usize << self.nodes) - 1
    }

    const fn slot(&self, mask: usize, node: usize) -> usize {
        mask * self.nodes + node
    }

    fn cost(&self, mask: usize, node: usize) -> u64 {
        self.cost.get(self.slot(mask, node)).copied().unwrap_or(UNSET)
    }

    fn parent(&self, mask: usize, node: usize) -> Option<usize> {
        self.parent
            .get(self.slot(mask, node))
            .copied()
            .filter(|&p| p != NO_PARENT)
            .map(usize::from)
    }

    fn set(&mut self, mask: usize, node: usize, cost: u64, parent: u8) {
        let slot = self.slot(mask, node);
        if let (Some(c), Some(p)) = (self.cost.get_mut(slot), self.parent.get_mut(slot)) {
            *c = cost;
            *p = parent;
        }
    }

    /// Relax every transition in ascending mask, node and successor order.
    ///
    /// Only strictly cheaper candidates replace a state, so the first optimum
    /// found wins ties.
    fn fill(&mut self, matrix: &DistanceMatrix) {
        let full = self.full_mask();
        // Every reachable mask contains the start bit, so odd masks suffice.
        for mask in (1..=full).step_by(2) {
            for from in 0..self.nodes {
                let base = self.cost(mask, from);
                if mask & (1 << from) == 0 || base == UNSET {
                    continue;
                }
                self.relax_successors(matrix, mask, from, base);
            }
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "node indices are bounded by MAX_WAYPOINTS, far below u8::MAX"
    )]
    fn relax_successors(&mut self, matrix: &DistanceMatrix, mask: usize, from: usize, base: u64) {
        for to in 0..self.nodes {
            if mask & (1 << to) != 0 {
                continue;
            }
            let Some(leg) = matrix.get(from, to) else {
                continue;
            };
            let candidate = base.saturating_add(u64::from(leg));
            let next = mask | (1 << to);
            if candidate < self.cost(next, to) {
                self.set(next, to, candidate, from as u8);
            }
        }
    }

    /// Cheapest state covering every node, preferring the lowest end index.
    fn best_final_state(&self) -> (usize, u64) {
        let full = self.full_mask();
        (0..self.nodes)
            .map(|node| (node, self.cost(full, node)))
            .fold((0, UNSET), |best, current| {
                if current.1 < best.1 { current } else { best }
            })
    }

    fn reconstruct(&self, last: usize) -> Result<Vec<usize>, TourError> {
        let mut order = Vec::with_capacity(self.nodes);
        let mut mask = self.full_mask();
        let mut node = last;
        while node != 0 {
            order.push(node);
            let previous = self
                .parent(mask, node)
                .ok_or(TourError::Reconstruction { node })?;
            mask &= !(1 << node);
            node = previous;
        }
        order.push(0);
        order.reverse();
        if order.len() == self.nodes {
            Ok(order)
        } else {
            Err(TourError::Reconstruction { node: last })
        }
    }
}
