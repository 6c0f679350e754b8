//! Core domain types for the Tourwise route optimiser.
//!
//! Responsibilities:
//! - Model the waypoints a traveller wants to visit and validate them early.
//! - Hold pairwise distances in a dense matrix with an explicit
//!   [`UNREACHABLE`] sentinel.
//! - Solve the open-path tour exactly and turn the result into an itinerary.
//!
//! Boundaries:
//! - No network I/O lives here; distances are fetched by `tourwise-data`.
//! - Every stage is a pure transformation of its inputs.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod itinerary;
pub mod matrix;
pub mod tour;
pub mod waypoint;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use itinerary::{Itinerary, ItineraryError, ItineraryStep, assemble};
pub use matrix::{DistanceMatrix, DistanceMatrixError, UNREACHABLE};
pub use tour::{HeldKarpSolver, Tour, TourError, TourSolver, solve};
pub use waypoint::{MAX_WAYPOINTS, MIN_WAYPOINTS, Waypoint, WaypointSet, WaypointSetError};
