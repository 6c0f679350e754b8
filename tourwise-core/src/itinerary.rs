//! Human-readable itineraries built from a solved tour.

use std::fmt;

use thiserror::Error;

use crate::matrix::{DistanceMatrix, UNREACHABLE};
use crate::waypoint::Waypoint;

/// Errors returned by [`assemble`].
///
/// These only arise from inconsistent inputs and indicate a caller defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItineraryError {
    /// The order referenced a waypoint that does not exist.
    #[error("order references waypoint {index} but only {len} were supplied")]
    WaypointOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of waypoints supplied.
        len: usize,
    },
    /// The order referenced a matrix cell that does not exist.
    #[error("no distance for leg {from} -> {to} in a {size}x{size} matrix")]
    LegOutOfRange {
        /// Origin index.
        from: usize,
        /// Destination index.
        to: usize,
        /// Matrix dimension.
        size: usize,
    },
}

/// One leg of the itinerary.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItineraryStep {
    /// Name of the waypoint the leg starts from.
    pub from: String,
    /// Name of the waypoint the leg ends at.
    pub to: String,
    /// Leg distance in metres; [`UNREACHABLE`] when unknown.
    pub distance_meters: u32,
}

impl ItineraryStep {
    /// Whether the leg distance is the [`UNREACHABLE`] sentinel.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        self.distance_meters == UNREACHABLE
    }
}

impl fmt::Display for ItineraryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unreachable() {
            write!(f, "From {} to {}: distance unavailable", self.from, self.to)
        } else {
            write!(
                f,
                "From {} to {}: {} m",
                self.from, self.to, self.distance_meters
            )
        }
    }
}

/// Ordered legs with their summed distance.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use tourwise_core::{DistanceMatrix, Waypoint, assemble};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let waypoints = vec![
///     Waypoint::start("a", "Home", Coord { x: 0.0, y: 0.0 }),
///     Waypoint::new("b", "Library", Coord { x: 0.0, y: 0.01 }),
/// ];
/// let matrix = DistanceMatrix::from_rows(vec![vec![0, 1_100], vec![1_050, 0]])?;
/// let itinerary = assemble(&[0, 1], &matrix, &waypoints)?;
/// assert_eq!(itinerary.describe(), vec!["From Home to Library: 1100 m"]);
/// assert_eq!(itinerary.total_distance_meters, 1_100);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Itinerary {
    /// Legs in travel order.
    pub steps: Vec<ItineraryStep>,
    /// Sum of every leg distance, sentinel legs included.
    pub total_distance_meters: u64,
}

impl Itinerary {
    /// Render each step as a sentence.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        self.steps.iter().map(ToString::to_string).collect()
    }

    /// Number of legs whose distance is unknown.
    #[must_use]
    pub fn unreachable_legs(&self) -> usize {
        self.steps.iter().filter(|step| step.is_unreachable()).count()
    }

    /// One-line total for the whole route.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("Total distance: {} m", self.total_distance_meters)
    }
}

/// Describe the legs of `order` using names from `waypoints`.
///
/// `order` indexes both `waypoints` and `matrix`.
///
/// # Errors
///
/// Returns an [`ItineraryError`] when an index is out of range.
pub fn assemble(
    order: &[usize],
    matrix: &DistanceMatrix,
    waypoints: &[Waypoint],
) -> Result<Itinerary, ItineraryError> {
    let name_of = |index: usize| {
        waypoints
            .get(index)
            .map(|w| w.name.clone())
            .ok_or(ItineraryError::WaypointOutOfRange {
                index,
                len: waypoints.len(),
            })
    };

    if let [only] = order {
        name_of(*only)?;
    }

    let mut itinerary = Itinerary::default();
    for pair in order.windows(2) {
        let &[from, to] = pair else { continue };
        let distance_meters = matrix
            .get(from, to)
            .ok_or(ItineraryError::LegOutOfRange {
                from,
                to,
                size: matrix.size(),
            })?;
        itinerary.steps.push(ItineraryStep {
            from: name_of(from)?,
            to: name_of(to)?,
            distance_meters,
        });
        itinerary.total_distance_meters += u64::from(distance_meters);
    }
    Ok(itinerary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use rstest::{fixture, rstest};

    #[fixture]
    fn waypoints() -> Vec<Waypoint> {
        vec![
            Waypoint::start("a", "A", Coord { x: 0.0, y: 0.0 }),
            Waypoint::new("b", "B", Coord { x: 0.0, y: 0.0 }),
            Waypoint::new("c", "C", Coord { x: 0.0, y: 0.0 }),
        ]
    }

    #[fixture]
    fn matrix() -> DistanceMatrix {
        DistanceMatrix::from_rows(vec![
            vec![0, 100, 300],
            vec![100, 0, 150],
            vec![300, 150, 0],
        ])
        .expect("square matrix")
    }

    #[rstest]
    fn steps_follow_order(waypoints: Vec<Waypoint>, matrix: DistanceMatrix) {
        let itinerary = assemble(&[0, 1, 2], &matrix, &waypoints).expect("valid order");
        assert_eq!(
            itinerary.describe(),
            vec!["From A to B: 100 m", "From B to C: 150 m"]
        );
        assert_eq!(itinerary.total_distance_meters, 250);
        assert_eq!(itinerary.summary(), "Total distance: 250 m");
    }

    #[rstest]
    fn single_stop_has_no_legs(waypoints: Vec<Waypoint>, matrix: DistanceMatrix) {
        let itinerary = assemble(&[0], &matrix, &waypoints).expect("valid order");
        assert!(itinerary.steps.is_empty());
        assert_eq!(itinerary.total_distance_meters, 0);
    }

    #[rstest]
    fn unreachable_legs_are_flagged_and_counted(waypoints: Vec<Waypoint>) {
        let matrix = DistanceMatrix::from_rows(vec![
            vec![0, UNREACHABLE, 5],
            vec![UNREACHABLE, 0, UNREACHABLE],
            vec![5, 7, 0],
        ])
        .expect("square matrix");
        let itinerary = assemble(&[0, 1, 2], &matrix, &waypoints).expect("valid order");
        assert_eq!(itinerary.unreachable_legs(), 2);
        assert_eq!(
            itinerary.total_distance_meters,
            2 * u64::from(UNREACHABLE)
        );
        assert_eq!(
            itinerary.describe()[0],
            "From A to B: distance unavailable"
        );
    }

    #[rstest]
    fn out_of_range_waypoint_is_an_error(matrix: DistanceMatrix) {
        let short = vec![Waypoint::start("a", "A", Coord { x: 0.0, y: 0.0 })];
        let err = assemble(&[0, 1], &matrix, &short).expect_err("missing waypoint");
        assert_eq!(err, ItineraryError::WaypointOutOfRange { index: 1, len: 1 });
    }

    #[rstest]
    fn out_of_range_leg_is_an_error(waypoints: Vec<Waypoint>) {
        let small = DistanceMatrix::unreachable(2);
        let err = assemble(&[0, 1, 2], &small, &waypoints).expect_err("missing leg");
        assert_eq!(
            err,
            ItineraryError::LegOutOfRange {
                from: 1,
                to: 2,
                size: 2,
            }
        );
    }

    #[rstest]
    fn single_out_of_range_index_is_an_error(waypoints: Vec<Waypoint>, matrix: DistanceMatrix) {
        let err = assemble(&[5], &matrix, &waypoints).expect_err("bad index");
        assert!(matches!(err, ItineraryError::WaypointOutOfRange { index: 5, .. }));
    }
}
