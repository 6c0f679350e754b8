//! Test utilities for distance services.
//!
//! This module provides [`StubDistanceService`], a deterministic test double
//! for [`DistanceService`] that answers from a fixed matrix without making
//! HTTP requests, and records every request it receives.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;
use tourwise_core::{DistanceMatrix, UNREACHABLE, Waypoint};

use super::service::{DistanceService, DistanceServiceError, LegDistance};

/// Per-element status reported for cells that hold [`UNREACHABLE`].
pub const STUB_NO_ROUTE: &str = "ZERO_RESULTS";

/// One request received by [`StubDistanceService`], as waypoint indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Origin index.
    pub origin: usize,
    /// Destination indices in request order.
    pub destinations: Vec<usize>,
}

/// Stub `DistanceService` for testing.
///
/// Coordinates are mapped back to waypoint indices by exact equality, so the
/// stub must be built from the same waypoints the caller later requests.
///
/// # Example
///
/// ```
/// use geo::Coord;
/// use tourwise_core::{DistanceMatrix, Waypoint};
/// use tourwise_data::routing::test_support::StubDistanceService;
///
/// let stops = vec![
///     Waypoint::start("a", "A", Coord { x: 0.0, y: 0.0 }),
///     Waypoint::new("b", "B", Coord { x: 1.0, y: 1.0 }),
/// ];
/// let matrix = DistanceMatrix::from_rows(vec![vec![0, 60], vec![60, 0]]).unwrap();
/// let service = StubDistanceService::new(&stops, matrix);
/// assert_eq!(service.request_count(), 0);
/// ```
#[derive(Debug)]
pub struct StubDistanceService {
    locations: Vec<Coord<f64>>,
    matrix: DistanceMatrix,
    failure: Option<DistanceServiceError>,
    failing_origins: HashSet<usize>,
    failing_destinations: HashSet<usize>,
    delay: Option<Duration>,
    requests: Mutex<Vec<RecordedRequest>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StubDistanceService {
    /// Create a stub answering from `matrix` for the given waypoints.
    #[must_use]
    pub fn new(waypoints: &[Waypoint], matrix: DistanceMatrix) -> Self {
        Self::from_locations(waypoints.iter().map(|stop| stop.location).collect(), matrix)
    }

    /// Create a stub answering from `matrix` for raw coordinates.
    #[must_use]
    pub fn from_locations(locations: Vec<Coord<f64>>, matrix: DistanceMatrix) -> Self {
        Self {
            locations,
            matrix,
            failure: None,
            failing_origins: HashSet::new(),
            failing_destinations: HashSet::new(),
            delay: None,
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Fail every request with `error`.
    #[must_use]
    pub fn with_error(mut self, error: DistanceServiceError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Fail requests issued from `origin`.
    ///
    /// Uses the configured error, or a network error if none was set.
    #[must_use]
    pub fn failing_origin(mut self, origin: usize) -> Self {
        self.failing_origins.insert(origin);
        self
    }

    /// Fail any request whose batch contains `destination`.
    #[must_use]
    pub fn failing_destination(mut self, destination: usize) -> Self {
        self.failing_destinations.insert(destination);
        self
    }

    /// Sleep before answering each request.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().map_or(0, |requests| requests.len())
    }

    /// Requests received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map_or_else(|_| Vec::new(), |requests| requests.clone())
    }

    /// Largest number of requests that were in flight at once.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn index_of(&self, coord: Coord<f64>) -> Result<usize, DistanceServiceError> {
        self.locations
            .iter()
            .position(|known| *known == coord)
            .ok_or_else(|| DistanceServiceError::ServiceError {
                code: "InvalidQuery".to_owned(),
                message: format!("unknown coordinate {},{}", coord.x, coord.y),
            })
    }

    fn record(&self, request: RecordedRequest) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
    }

    fn should_fail(&self, request: &RecordedRequest) -> bool {
        self.failure.is_some()
            || self.failing_origins.contains(&request.origin)
            || request
                .destinations
                .iter()
                .any(|index| self.failing_destinations.contains(index))
    }

    fn failure(&self) -> DistanceServiceError {
        self.failure
            .clone()
            .unwrap_or_else(|| DistanceServiceError::NetworkError {
                url: "stub://distances".to_owned(),
                message: "connection refused".to_owned(),
            })
    }

    fn answer(&self, request: &RecordedRequest) -> Vec<LegDistance> {
        request
            .destinations
            .iter()
            .map(|&to| match self.matrix.get(request.origin, to) {
                Some(meters) if meters != UNREACHABLE => LegDistance::Meters(meters),
                _ => LegDistance::Unavailable {
                    status: STUB_NO_ROUTE.to_owned(),
                },
            })
            .collect()
    }

    async fn respond(
        &self,
        origin: Coord<f64>,
        destinations: &[Coord<f64>],
    ) -> Result<Vec<LegDistance>, DistanceServiceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let request = RecordedRequest {
            origin: self.index_of(origin)?,
            destinations: destinations
                .iter()
                .map(|coord| self.index_of(*coord))
                .collect::<Result<_, _>>()?,
        };
        self.record(request.clone());
        if self.should_fail(&request) {
            return Err(self.failure());
        }
        Ok(self.answer(&request))
    }
}

#[async_trait]
impl DistanceService for StubDistanceService {
    async fn fetch_distances(
        &self,
        origin: Coord<f64>,
        destinations: &[Coord<f64>],
    ) -> Result<Vec<LegDistance>, DistanceServiceError> {
        if destinations.is_empty() {
            return Err(DistanceServiceError::EmptyInput);
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        let result = self.respond(origin, destinations).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
