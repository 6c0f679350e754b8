//! Facade crate for the Tourwise route optimiser.
//!
//! This crate re-exports the core domain types and, behind the `routing`
//! feature, the distance services and the end-to-end route planner.

#![forbid(unsafe_code)]

pub use tourwise_core::{
    DistanceMatrix, DistanceMatrixError, HeldKarpSolver, Itinerary, ItineraryError,
    ItineraryStep, MAX_WAYPOINTS, Tour, TourError, TourSolver, UNREACHABLE, Waypoint,
    WaypointSet, WaypointSetError, assemble, solve,
};

#[cfg(feature = "routing")]
pub use tourwise_data::routing::{
    DistanceApi, DistanceService, DistanceServiceError, HaversineDistanceService,
    HttpDistanceService, HttpDistanceServiceConfig, LegDistance, ProviderBuildError,
};
#[cfg(feature = "routing")]
pub use tourwise_data::{
    BuildReport, BuiltMatrix, DistanceMatrixBuilder, MatrixBuildError, MatrixBuilderConfig,
    PlanError, PlannedRoute, PlannerBuildError, RoutePlanner,
};
