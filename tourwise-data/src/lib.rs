//! Distance retrieval and route planning for the Tourwise engine.
//!
//! Responsibilities:
//! - Define the [`routing::DistanceService`] boundary and its HTTP and offline
//!   adapters.
//! - Assemble complete distance matrices from quota-limited batch requests.
//! - Run the full plan pipeline: build matrix, solve tour, assemble itinerary.
//!
//! Boundaries:
//! - Do not encode optimisation rules (they live in `tourwise-core`).
//! - Keep blocking work off async executors; HTTP calls are async.
//!
//! Invariants:
//! - Each build owns its matrix buffer; nothing is cached between runs.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod matrix;
pub mod planner;
pub mod routing;

pub use matrix::{
    BuildReport, BuiltMatrix, DistanceMatrixBuilder, MatrixBuildError, MatrixBuilderConfig,
};
pub use planner::{PlanError, PlannedRoute, PlannerBuildError, RoutePlanner};
