//! End-to-end route planning: matrix, tour, itinerary.
//!
//! [`RoutePlanner`] wires a [`DistanceMatrixBuilder`] to the exact
//! [`HeldKarpSolver`] and the itinerary assembler. Each call to
//! [`RoutePlanner::plan_async`] is an independent run with its own matrix.

use std::fmt;

use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use tourwise_core::{
    HeldKarpSolver, Itinerary, ItineraryError, Tour, TourError, TourSolver, Waypoint,
    WaypointSet, WaypointSetError, assemble,
};

use crate::matrix::{BuildReport, DistanceMatrixBuilder, MatrixBuildError};
use crate::routing::DistanceService;

/// Message shown to users for failures they cannot act on.
const GENERIC_FAILURE: &str = "failed to build route";

/// Error type for [`RoutePlanner`] construction failures.
#[derive(Debug, Error)]
pub enum PlannerBuildError {
    /// Failed to build the Tokio runtime used by [`RoutePlanner::plan`].
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Errors from a planning run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The waypoint list failed validation.
    #[error(transparent)]
    InvalidWaypoints(#[from] WaypointSetError),
    /// The matrix builder rejected the input.
    #[error("failed to build distance matrix: {0}")]
    MatrixBuild(#[from] MatrixBuildError),
    /// The solver rejected the matrix.
    #[error("failed to solve tour: {0}")]
    Solve(#[from] TourError),
    /// The solved order did not fit the matrix or waypoints.
    #[error("failed to assemble itinerary: {0}")]
    Itinerary(#[from] ItineraryError),
}

impl PlanError {
    /// A single actionable message suitable for end users.
    ///
    /// Validation problems are reported verbatim; anything else collapses to
    /// a generic failure so internals stay hidden.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidWaypoints(err) => err.to_string(),
            Self::MatrixBuild(err @ MatrixBuildError::TooManyWaypoints { .. }) => err.to_string(),
            Self::Solve(TourError::TooManyNodes { nodes, max }) => {
                format!("too many stops: {nodes} selected, at most {max} are supported")
            }
            Self::MatrixBuild(_) | Self::Solve(_) | Self::Itinerary(_) => {
                GENERIC_FAILURE.to_owned()
            }
        }
    }
}

/// Result of a successful planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoute {
    /// Waypoints in visiting order, start first.
    pub stops: Vec<Waypoint>,
    /// Solver output, indices into the validated waypoint set.
    pub tour: Tour,
    /// Human-readable steps and total distance.
    pub itinerary: Itinerary,
    /// How the distance matrix was obtained.
    pub report: BuildReport,
}

impl PlannedRoute {
    /// Total distance in metres, counting unreachable legs at face value.
    #[must_use]
    pub const fn total_distance_meters(&self) -> u64 {
        self.itinerary.total_distance_meters
    }

    /// Legs that fell back to the unreachable placeholder.
    #[must_use]
    pub fn unreachable_legs(&self) -> usize {
        self.itinerary.unreachable_legs()
    }
}

/// Plans optimal open tours over a [`DistanceService`].
///
/// # Runtime behaviour
///
/// [`RoutePlanner::plan_async`] runs on the caller's executor. The blocking
/// [`RoutePlanner::plan`] uses the caller's runtime when it is
/// multi-threaded (via [`tokio::task::block_in_place`]). Otherwise it drives
/// the run on a `current_thread` runtime owned by the planner, from a scoped
/// helper thread when the caller is itself inside a `current_thread` runtime.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use tourwise_core::{Waypoint, WaypointSet};
/// use tourwise_data::RoutePlanner;
/// use tourwise_data::routing::HaversineDistanceService;
///
/// let stops = WaypointSet::new(vec![
///     Waypoint::start("home", "Home", Coord { x: 0.0, y: 0.0 }),
///     Waypoint::new("far", "Far", Coord { x: 0.0, y: 0.02 }),
///     Waypoint::new("near", "Near", Coord { x: 0.0, y: 0.01 }),
/// ])?;
/// let planner = RoutePlanner::new(HaversineDistanceService::new())?;
/// let route = planner.plan(&stops)?;
/// let names: Vec<_> = route.stops.iter().map(|stop| stop.name.as_str()).collect();
/// assert_eq!(names, ["Home", "Near", "Far"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RoutePlanner<S> {
    builder: DistanceMatrixBuilder<S>,
    solver: HeldKarpSolver,
    runtime: Runtime,
}

impl<S: fmt::Debug> fmt::Debug for RoutePlanner<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutePlanner")
            .field("builder", &self.builder)
            .field("solver", &self.solver)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl<S: DistanceService> RoutePlanner<S> {
    /// Create a planner with default batching limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the Tokio runtime fails to build.
    pub fn new(service: S) -> Result<Self, PlannerBuildError> {
        Self::with_builder(DistanceMatrixBuilder::new(service))
    }

    /// Create a planner around a configured matrix builder.
    ///
    /// The solver accepts as many nodes as the builder does, up to the
    /// solver's own hard limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the Tokio runtime fails to build.
    pub fn with_builder(builder: DistanceMatrixBuilder<S>) -> Result<Self, PlannerBuildError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(PlannerBuildError::Runtime)?;
        let solver = HeldKarpSolver::with_max_nodes(builder.config().max_waypoints);
        Ok(Self {
            builder,
            solver,
            runtime,
        })
    }

    /// The matrix builder in use.
    #[must_use]
    pub const fn builder(&self) -> &DistanceMatrixBuilder<S> {
        &self.builder
    }

    /// Plan the shortest open tour starting at the set's start waypoint.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] when the input exceeds a configured limit.
    /// Distance service failures do not fail the run; they surface as
    /// unreachable legs and in [`PlannedRoute::report`].
    pub async fn plan_async(&self, waypoints: &WaypointSet) -> Result<PlannedRoute, PlanError> {
        let stops = waypoints.as_slice();
        let built = self.builder.build(stops).await?;
        let tour = self.solver.solve(&built.matrix)?;
        let itinerary = assemble(&tour.order, &built.matrix, stops)?;
        let ordered = tour
            .order
            .iter()
            .filter_map(|&index| waypoints.get(index).cloned())
            .collect();

        log::info!(
            "planned {} stops: {} m over {} legs ({} unreachable)",
            tour.order.len(),
            itinerary.total_distance_meters,
            itinerary.steps.len(),
            itinerary.unreachable_legs(),
        );
        Ok(PlannedRoute {
            stops: ordered,
            tour,
            itinerary,
            report: built.report,
        })
    }

    /// Blocking form of [`RoutePlanner::plan_async`].
    ///
    /// # Runtime behaviour
    ///
    /// Inside a multi-threaded Tokio runtime the run uses that runtime.
    /// Inside a `current_thread` runtime a runtime cannot be entered again on
    /// the same thread, so the run moves to a scoped thread driving the
    /// planner's own runtime. The caller's executor is blocked until the run
    /// finishes in either case.
    ///
    /// # Errors
    ///
    /// See [`RoutePlanner::plan_async`].
    pub fn plan(&self, waypoints: &WaypointSet) -> Result<PlannedRoute, PlanError> {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.plan_async(waypoints)))
            }
            Ok(_) => std::thread::scope(|scope| {
                scope
                    .spawn(|| self.runtime.block_on(self.plan_async(waypoints)))
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            }),
            Err(_) => self.runtime.block_on(self.plan_async(waypoints)),
        }
    }
}
