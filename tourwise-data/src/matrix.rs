//! Assemble a complete distance matrix from batched service requests.
//!
//! Every waypoint is used as an origin once. The full destination list (the
//! origin included) is split into contiguous chunks of at most
//! `max_destinations_per_request` columns and each `(origin, chunk)` pair is
//! sent as one request, so a build issues `N × ceil(N / k)` requests.
//!
//! Requests run concurrently up to `max_concurrent_requests`. Each chunk owns
//! a disjoint `(row, column range)` of the output, so results are written as
//! they arrive without further coordination.
//!
//! Failures never abort a build:
//! - a per-element non-OK status leaves that cell at [`UNREACHABLE`];
//! - a failed or malformed chunk leaves every cell in the chunk at
//!   [`UNREACHABLE`] and is logged.
//!
//! Dropping the future returned by [`DistanceMatrixBuilder::build`] abandons
//! all in-flight requests; the partially written matrix is dropped with it.

use std::num::NonZeroUsize;

use futures_util::stream::{self, StreamExt};
use geo::Coord;
use thiserror::Error;
use tourwise_core::{DistanceMatrix, MAX_WAYPOINTS, UNREACHABLE, Waypoint};

use crate::routing::{DistanceService, DistanceServiceError, LegDistance, MAX_MEASURED_METERS};

const fn non_zero(value: usize) -> NonZeroUsize {
    match NonZeroUsize::new(value) {
        Some(n) => n,
        None => NonZeroUsize::MIN,
    }
}

/// Destination cap per request used by common hosted matrix APIs.
pub const DEFAULT_MAX_DESTINATIONS_PER_REQUEST: NonZeroUsize = non_zero(25);

/// Default number of requests kept in flight at once.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: NonZeroUsize = non_zero(4);

/// Errors raised before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixBuildError {
    /// No waypoints were supplied.
    #[error("at least one waypoint is required")]
    EmptyInput,
    /// More waypoints than the configured cap.
    #[error("too many stops: {count} selected, at most {max} are supported")]
    TooManyWaypoints {
        /// Waypoints supplied.
        count: usize,
        /// Configured cap.
        max: usize,
    },
}

/// Batching and concurrency limits for [`DistanceMatrixBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixBuilderConfig {
    /// Most destinations sent in one request.
    pub max_destinations_per_request: NonZeroUsize,
    /// Most requests in flight at once.
    pub max_concurrent_requests: NonZeroUsize,
    /// Largest waypoint count accepted by [`DistanceMatrixBuilder::build`].
    pub max_waypoints: usize,
}

impl Default for MatrixBuilderConfig {
    fn default() -> Self {
        Self {
            max_destinations_per_request: DEFAULT_MAX_DESTINATIONS_PER_REQUEST,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            max_waypoints: MAX_WAYPOINTS,
        }
    }
}

impl MatrixBuilderConfig {
    /// Set the per-request destination cap.
    #[must_use]
    pub const fn with_max_destinations_per_request(mut self, cap: NonZeroUsize) -> Self {
        self.max_destinations_per_request = cap;
        self
    }

    /// Set how many requests may be in flight at once.
    ///
    /// One means strictly sequential.
    #[must_use]
    pub const fn with_max_concurrent_requests(mut self, limit: NonZeroUsize) -> Self {
        self.max_concurrent_requests = limit;
        self
    }

    /// Set the largest accepted waypoint count.
    #[must_use]
    pub const fn with_max_waypoints(mut self, max: usize) -> Self {
        self.max_waypoints = max;
        self
    }
}

/// Number of requests a build of `waypoints` issues with cap `k`.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use tourwise_data::matrix::expected_requests;
///
/// let k = NonZeroUsize::new(2).unwrap();
/// assert_eq!(expected_requests(4, k), 8);
/// ```
#[must_use]
pub const fn expected_requests(waypoints: usize, k: NonZeroUsize) -> usize {
    waypoints.saturating_mul(waypoints.div_ceil(k.get()))
}

/// Request statistics for one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Requests issued.
    pub requests: usize,
    /// Requests that failed outright or returned a malformed batch.
    pub failed_requests: usize,
    /// Off-diagonal cells left at [`UNREACHABLE`].
    pub unreachable_cells: usize,
}

impl BuildReport {
    /// Whether any cell fell back to [`UNREACHABLE`].
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.failed_requests > 0 || self.unreachable_cells > 0
    }
}

/// A fully populated matrix plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltMatrix {
    /// `N × N` distances in metres.
    pub matrix: DistanceMatrix,
    /// Request statistics.
    pub report: BuildReport,
}

/// One `(origin, destination chunk)` request.
#[derive(Debug)]
struct ChunkRequest<'a> {
    origin: usize,
    first_column: usize,
    from: Coord<f64>,
    destinations: &'a [Coord<f64>],
}

/// Split the full destination list into per-origin chunks.
fn plan_chunks(locations: &[Coord<f64>], cap: NonZeroUsize) -> Vec<ChunkRequest<'_>> {
    locations
        .iter()
        .enumerate()
        .flat_map(|(origin, &from)| {
            locations
                .chunks(cap.get())
                .enumerate()
                .map(move |(index, destinations)| ChunkRequest {
                    origin,
                    first_column: index.saturating_mul(cap.get()),
                    from,
                    destinations,
                })
        })
        .collect()
}

/// Builds distance matrices through a [`DistanceService`].
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use tourwise_core::Waypoint;
/// use tourwise_data::DistanceMatrixBuilder;
/// use tourwise_data::routing::HaversineDistanceService;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let stops = vec![
///     Waypoint::start("home", "Home", Coord { x: 0.0, y: 0.0 }),
///     Waypoint::new("shop", "Shop", Coord { x: 0.0, y: 0.01 }),
/// ];
/// let built = DistanceMatrixBuilder::new(HaversineDistanceService::new())
///     .build(&stops)
///     .await
///     .unwrap();
/// assert_eq!(built.matrix.size(), 2);
/// assert_eq!(built.report.requests, 2);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrixBuilder<S> {
    service: S,
    config: MatrixBuilderConfig,
}

impl<S: DistanceService> DistanceMatrixBuilder<S> {
    /// Create a builder with default limits.
    #[must_use]
    pub fn new(service: S) -> Self {
        Self::with_config(service, MatrixBuilderConfig::default())
    }

    /// Create a builder with explicit limits.
    #[must_use]
    pub const fn with_config(service: S, config: MatrixBuilderConfig) -> Self {
        Self { service, config }
    }

    /// Limits in use.
    #[must_use]
    pub const fn config(&self) -> &MatrixBuilderConfig {
        &self.config
    }

    /// The wrapped service.
    #[must_use]
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// Fetch every pairwise distance between `waypoints`.
    ///
    /// The returned matrix is always complete: cells the service could not
    /// measure hold [`UNREACHABLE`].
    ///
    /// # Errors
    ///
    /// Returns [`MatrixBuildError`] only for invalid input; service failures
    /// are absorbed into the matrix and counted in [`BuildReport`].
    pub async fn build(&self, waypoints: &[Waypoint]) -> Result<BuiltMatrix, MatrixBuildError> {
        let count = waypoints.len();
        if count == 0 {
            return Err(MatrixBuildError::EmptyInput);
        }
        if count > self.config.max_waypoints {
            return Err(MatrixBuildError::TooManyWaypoints {
                count,
                max: self.config.max_waypoints,
            });
        }

        let locations: Vec<Coord<f64>> = waypoints.iter().map(|stop| stop.location).collect();
        let chunks = plan_chunks(&locations, self.config.max_destinations_per_request);
        let mut report = BuildReport {
            requests: chunks.len(),
            ..BuildReport::default()
        };
        log::debug!(
            "building {count}x{count} matrix with {} requests ({} destinations each, {} concurrent)",
            report.requests,
            self.config.max_destinations_per_request,
            self.config.max_concurrent_requests,
        );

        let mut matrix = DistanceMatrix::unreachable(count);
        let mut responses = stream::iter(chunks)
            .map(|chunk| async move {
                let result = self
                    .service
                    .fetch_distances(chunk.from, chunk.destinations)
                    .await;
                (chunk, result)
            })
            .buffer_unordered(self.config.max_concurrent_requests.get());

        while let Some((chunk, result)) = responses.next().await {
            if !merge_chunk(&mut matrix, &chunk, result) {
                report.failed_requests += 1;
            }
        }

        report.unreachable_cells = matrix.unreachable_cells();
        if report.is_degraded() {
            log::warn!(
                "distance matrix degraded: {} of {} requests failed, {} cells unreachable",
                report.failed_requests,
                report.requests,
                report.unreachable_cells,
            );
        }
        Ok(BuiltMatrix { matrix, report })
    }
}

/// Write one chunk's response into its row segment.
///
/// Returns `false` when the chunk failed as a whole; its cells keep their
/// [`UNREACHABLE`] initial value.
fn merge_chunk(
    matrix: &mut DistanceMatrix,
    chunk: &ChunkRequest<'_>,
    result: Result<Vec<LegDistance>, DistanceServiceError>,
) -> bool {
    let legs = match result {
        Ok(legs) if legs.len() == chunk.destinations.len() => legs,
        Ok(legs) => {
            log::warn!(
                "origin {} columns {}..: expected {} distances, received {}",
                chunk.origin,
                chunk.first_column,
                chunk.destinations.len(),
                legs.len(),
            );
            return false;
        }
        Err(err) => {
            log::warn!(
                "origin {} columns {}..: request failed: {err}",
                chunk.origin,
                chunk.first_column,
            );
            return false;
        }
    };

    let Some(row) = matrix.row_mut(chunk.origin) else {
        return false;
    };
    let cells = row.iter_mut().skip(chunk.first_column);
    for (cell, leg) in cells.zip(legs) {
        *cell = leg
            .meters()
            .map_or(UNREACHABLE, |meters| meters.min(MAX_MEASURED_METERS));
    }
    true
}
