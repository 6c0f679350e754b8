//! Test-only helpers shared by unit, behaviour and property tests.
//!
//! Available under `cfg(test)` or the `test-support` feature.

use geo::Coord;

use crate::{DistanceMatrix, Tour, Waypoint};

/// Construct an ordinary waypoint whose name is the upper-cased id.
///
/// # Examples
/// ```rust
/// use tourwise_core::test_support::stop;
///
/// let w = stop("cafe", 0.1, 51.5);
/// assert_eq!(w.name, "CAFE");
/// assert!(!w.is_start);
/// ```
#[must_use]
pub fn stop(id: &str, longitude: f64, latitude: f64) -> Waypoint {
    Waypoint::new(
        id,
        id.to_uppercase(),
        Coord {
            x: longitude,
            y: latitude,
        },
    )
}

/// Construct a start waypoint whose name is the upper-cased id.
#[must_use]
pub fn start(id: &str, longitude: f64, latitude: f64) -> Waypoint {
    Waypoint {
        is_start: true,
        ..stop(id, longitude, latitude)
    }
}

/// Build a matrix from literal rows, panicking on malformed input.
///
/// # Panics
///
/// Panics when `rows` is empty or not square.
#[must_use]
#[expect(clippy::expect_used, reason = "test helper surfaces fixture mistakes")]
pub fn matrix(rows: Vec<Vec<u32>>) -> DistanceMatrix {
    DistanceMatrix::from_rows(rows).expect("fixture matrix must be square")
}

/// Sum of consecutive legs along `order`.
///
/// Missing cells count as zero so callers can compare against solver output.
#[must_use]
pub fn path_cost(matrix: &DistanceMatrix, order: &[usize]) -> u64 {
    order
        .windows(2)
        .filter_map(|pair| match *pair {
            [from, to] => matrix.get(from, to),
            _ => None,
        })
        .map(u64::from)
        .sum()
}

/// Exhaustively search every order that starts at node `0`.
///
/// Exponentially slower than the dynamic programme; intended as an oracle for
/// matrices of at most eight nodes.
#[must_use]
pub fn brute_force_tour(matrix: &DistanceMatrix) -> Tour {
    let nodes = matrix.size();
    if nodes <= 1 {
        return Tour::new(vec![0], 0);
    }
    let mut rest: Vec<usize> = (1..nodes).collect();
    let mut best = Tour::new(Vec::new(), u64::MAX);
    permute(&mut rest, 0, &mut |tail| {
        let order: Vec<usize> = std::iter::once(0).chain(tail.iter().copied()).collect();
        let cost = path_cost(matrix, &order);
        if cost < best.total_cost {
            best = Tour::new(order, cost);
        }
    });
    best
}

fn permute(items: &mut [usize], k: usize, visit: &mut dyn FnMut(&[usize])) {
    if k >= items.len() {
        visit(items);
        return;
    }
    for i in k..items.len() {
        items.swap(k, i);
        permute(items, k + 1, visit);
        items.swap(k, i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn brute_force_matches_known_optimum() {
        let m = matrix(vec![
            vec![0, 100, 300],
            vec![100, 0, 150],
            vec![300, 150, 0],
        ]);
        let tour = brute_force_tour(&m);
        assert_eq!(tour.total_cost, 250);
        assert_eq!(tour.order, vec![0, 1, 2]);
    }

    #[rstest]
    fn path_cost_sums_legs() {
        let m = matrix(vec![vec![0, 4], vec![9, 0]]);
        assert_eq!(path_cost(&m, &[0, 1]), 4);
        assert_eq!(path_cost(&m, &[1, 0]), 9);
        assert_eq!(path_cost(&m, &[0]), 0);
    }
}
