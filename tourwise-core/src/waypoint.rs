//! Waypoints and the validated set handed to the optimiser.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude`, matching the
//! `geo` convention used throughout the workspace.

use std::collections::HashSet;

use geo::Coord;
use thiserror::Error;

/// Fewest waypoints (start included) worth optimising.
pub const MIN_WAYPOINTS: usize = 2;

/// Largest waypoint count the exact solver accepts.
///
/// The dynamic programme keeps `2^N × N` states, so sixteen stops already
/// means roughly a million table entries.
pub const MAX_WAYPOINTS: usize = 16;

/// A named location the traveller may visit.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use tourwise_core::Waypoint;
///
/// let home = Waypoint::start("home", "Home", Coord { x: -0.12, y: 51.5 });
/// assert!(home.is_start);
/// assert_eq!(home.latitude(), 51.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    /// Stable identifier supplied by the caller.
    pub id: String,
    /// Display name used in itinerary steps.
    pub name: String,
    /// Geospatial position (`x = longitude`, `y = latitude`).
    pub location: Coord<f64>,
    /// Whether the tour starts here.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_start: bool,
}

impl Waypoint {
    /// Construct an ordinary stop.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
            is_start: false,
        }
    }

    /// Construct the tour's starting point.
    #[must_use]
    pub fn start(id: impl Into<String>, name: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            is_start: true,
            ..Self::new(id, name, location)
        }
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.location.x
    }

    fn has_valid_coordinates(&self) -> bool {
        let Coord { x, y } = self.location;
        x.is_finite()
            && y.is_finite()
            && (-180.0..=180.0).contains(&x)
            && (-90.0..=90.0).contains(&y)
    }
}

/// Errors returned by [`WaypointSet::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaypointSetError {
    /// Fewer than [`MIN_WAYPOINTS`] waypoints were supplied.
    #[error("select at least two locations including the start")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        count: usize,
    },
    /// More waypoints than the exact solver can handle.
    #[error("too many stops: {count} selected, at most {max} are supported")]
    TooManyWaypoints {
        /// Number of waypoints supplied.
        count: usize,
        /// Maximum accepted.
        max: usize,
    },
    /// No waypoint was marked as the start.
    #[error("no starting location was selected")]
    MissingStart,
    /// More than one waypoint was marked as the start.
    #[error("{count} waypoints are marked as the start; exactly one is required")]
    MultipleStarts {
        /// Number of start markers found.
        count: usize,
    },
    /// Two waypoints share an identifier.
    #[error("waypoint id {id:?} is used more than once")]
    DuplicateId {
        /// The repeated identifier.
        id: String,
    },
    /// A coordinate was non-finite or outside the WGS84 range.
    #[error("waypoint {id:?} has invalid coordinates")]
    InvalidCoordinates {
        /// Identifier of the offending waypoint.
        id: String,
    },
}

/// An immutable, validated list of waypoints with the start at index zero.
///
/// The remaining waypoints keep the caller's relative order, so matrix rows
/// and columns line up with [`WaypointSet::as_slice`].
///
/// # Examples
/// ```
/// use geo::Coord;
/// use tourwise_core::{Waypoint, WaypointSet};
///
/// # fn main() -> Result<(), tourwise_core::WaypointSetError> {
/// let set = WaypointSet::new(vec![
///     Waypoint::new("cafe", "Cafe", Coord { x: -0.11, y: 51.51 }),
///     Waypoint::start("home", "Home", Coord { x: -0.12, y: 51.5 }),
/// ])?;
/// assert_eq!(set.start().id, "home");
/// assert_eq!(set.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointSet {
    waypoints: Vec<Waypoint>,
}

impl WaypointSet {
    /// Validate `waypoints` and move the start to the front.
    ///
    /// # Errors
    ///
    /// Returns a [`WaypointSetError`] describing the first violated rule.
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self, WaypointSetError> {
        let count = waypoints.len();
        if count < MIN_WAYPOINTS {
            return Err(WaypointSetError::TooFewWaypoints { count });
        }
        if count > MAX_WAYPOINTS {
            return Err(WaypointSetError::TooManyWaypoints {
                count,
                max: MAX_WAYPOINTS,
            });
        }

        let starts = waypoints.iter().filter(|w| w.is_start).count();
        match starts {
            0 => return Err(WaypointSetError::MissingStart),
            1 => {}
            _ => return Err(WaypointSetError::MultipleStarts { count: starts }),
        }

        let mut seen = HashSet::with_capacity(count);
        for waypoint in &waypoints {
            if !seen.insert(waypoint.id.as_str()) {
                return Err(WaypointSetError::DuplicateId {
                    id: waypoint.id.clone(),
                });
            }
            if !waypoint.has_valid_coordinates() {
                return Err(WaypointSetError::InvalidCoordinates {
                    id: waypoint.id.clone(),
                });
            }
        }

        let (start, rest): (Vec<Waypoint>, Vec<Waypoint>) =
            waypoints.into_iter().partition(|w| w.is_start);
        let mut ordered = start;
        ordered.extend(rest);
        Ok(Self { waypoints: ordered })
    }

    /// The starting waypoint.
    #[must_use]
    #[expect(
        clippy::indexing_slicing,
        reason = "construction guarantees at least two waypoints"
    )]
    pub fn start(&self) -> &Waypoint {
        &self.waypoints[0]
    }

    /// Number of waypoints, start included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always `false`; kept for API symmetry with slices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoint at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    /// Borrow the waypoints in matrix order.
    #[must_use]
    pub fn as_slice(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Iterate over the waypoints in matrix order.
    pub fn iter(&self) -> std::slice::Iter<'_, Waypoint> {
        self.waypoints.iter()
    }

    /// Coordinates in matrix order.
    #[must_use]
    pub fn locations(&self) -> Vec<Coord<f64>> {
        self.waypoints.iter().map(|w| w.location).collect()
    }

    /// Consume the set and return the ordered waypoints.
    #[must_use]
    pub fn into_inner(self) -> Vec<Waypoint> {
        self.waypoints
    }
}

impl<'a> IntoIterator for &'a WaypointSet {
    type Item = &'a Waypoint;
    type IntoIter = std::slice::Iter<'a, Waypoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TryFrom<Vec<Waypoint>> for WaypointSet {
    type Error = WaypointSetError;

    fn try_from(waypoints: Vec<Waypoint>) -> Result<Self, Self::Error> {
        Self::new(waypoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn stop(id: &str) -> Waypoint {
        Waypoint::new(id, id.to_uppercase(), Coord { x: 0.0, y: 0.0 })
    }

    #[fixture]
    fn home() -> Waypoint {
        Waypoint::start("home", "Home", Coord { x: -0.12, y: 51.5 })
    }

    #[rstest]
    fn start_is_moved_to_front(home: Waypoint) {
        let set = WaypointSet::new(vec![stop("a"), home, stop("b")]).expect("valid set");
        let ids: Vec<&str> = set.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, ["home", "a", "b"]);
        assert_eq!(set.start().name, "Home");
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    fn rejects_too_few_waypoints(#[case] count: usize) {
        let waypoints: Vec<Waypoint> = (0..count)
            .map(|i| Waypoint::start(format!("w{i}"), "W", Coord { x: 0.0, y: 0.0 }))
            .collect();
        let err = WaypointSet::new(waypoints).expect_err("too few");
        assert_eq!(err, WaypointSetError::TooFewWaypoints { count });
        assert_eq!(
            err.to_string(),
            "select at least two locations including the start"
        );
    }

    #[rstest]
    fn rejects_too_many_waypoints(home: Waypoint) {
        let mut waypoints = vec![home];
        waypoints.extend((0..MAX_WAYPOINTS).map(|i| stop(&format!("s{i}"))));
        let err = WaypointSet::new(waypoints).expect_err("too many");
        assert_eq!(
            err,
            WaypointSetError::TooManyWaypoints {
                count: MAX_WAYPOINTS + 1,
                max: MAX_WAYPOINTS,
            }
        );
    }

    #[rstest]
    fn accepts_exactly_the_maximum(home: Waypoint) {
        let mut waypoints = vec![home];
        waypoints.extend((1..MAX_WAYPOINTS).map(|i| stop(&format!("s{i}"))));
        let set = WaypointSet::new(waypoints).expect("boundary is inclusive");
        assert_eq!(set.len(), MAX_WAYPOINTS);
    }

    #[rstest]
    fn requires_a_start() {
        let err = WaypointSet::new(vec![stop("a"), stop("b")]).expect_err("no start");
        assert_eq!(err, WaypointSetError::MissingStart);
    }

    #[rstest]
    fn rejects_two_starts(home: Waypoint) {
        let other = Waypoint::start("work", "Work", Coord { x: 0.0, y: 0.0 });
        let err = WaypointSet::new(vec![home, other]).expect_err("two starts");
        assert_eq!(err, WaypointSetError::MultipleStarts { count: 2 });
    }

    #[rstest]
    fn rejects_duplicate_ids(home: Waypoint) {
        let err = WaypointSet::new(vec![home, stop("a"), stop("a")]).expect_err("duplicate");
        assert_eq!(err, WaypointSetError::DuplicateId { id: "a".into() });
    }

    #[rstest]
    #[case(Coord { x: 181.0, y: 0.0 })]
    #[case(Coord { x: 0.0, y: -90.5 })]
    #[case(Coord { x: f64::NAN, y: 0.0 })]
    #[case(Coord { x: 0.0, y: f64::INFINITY })]
    fn rejects_invalid_coordinates(home: Waypoint, #[case] location: Coord<f64>) {
        let bad = Waypoint::new("bad", "Bad", location);
        let err = WaypointSet::new(vec![home, bad]).expect_err("invalid coordinates");
        assert_eq!(err, WaypointSetError::InvalidCoordinates { id: "bad".into() });
    }

    #[rstest]
    fn locations_follow_matrix_order(home: Waypoint) {
        let cafe = Waypoint::new("cafe", "Cafe", Coord { x: 1.0, y: 2.0 });
        let set = WaypointSet::new(vec![cafe, home]).expect("valid set");
        assert_eq!(
            set.locations(),
            vec![Coord { x: -0.12, y: 51.5 }, Coord { x: 1.0, y: 2.0 }]
        );
    }
}
