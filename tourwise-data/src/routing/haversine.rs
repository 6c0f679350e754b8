//! Offline great-circle distance estimates.

use async_trait::async_trait;
use geo::{Coord, Distance, Haversine, Point};

use super::service::{DistanceService, DistanceServiceError, LegDistance, meters_from_f64};

/// Status reported when a coordinate pair yields no finite distance.
const INVALID_COORDINATE: &str = "InvalidCoordinate";

/// [`DistanceService`] that measures straight-line distances on a sphere.
///
/// No network I/O is performed, so every request succeeds. Road distances are
/// always at least as long as these estimates, which makes the service useful
/// for offline planning and demos rather than turn-by-turn accuracy.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use tourwise_data::routing::{DistanceService, HaversineDistanceService, LegDistance};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let service = HaversineDistanceService::new();
/// let legs = service
///     .fetch_distances(Coord { x: 0.0, y: 0.0 }, &[Coord { x: 0.0, y: 0.0 }])
///     .await
///     .unwrap();
/// assert_eq!(legs, vec![LegDistance::Meters(0)]);
/// # });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineDistanceService;

impl HaversineDistanceService {
    /// Create the service.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn leg(origin: Point<f64>, destination: Coord<f64>) -> LegDistance {
        meters_from_f64(Haversine.distance(origin, Point::from(destination))).map_or_else(
            || LegDistance::Unavailable {
                status: INVALID_COORDINATE.to_owned(),
            },
            LegDistance::Meters,
        )
    }
}

#[async_trait]
impl DistanceService for HaversineDistanceService {
    async fn fetch_distances(
        &self,
        origin: Coord<f64>,
        destinations: &[Coord<f64>],
    ) -> Result<Vec<LegDistance>, DistanceServiceError> {
        if destinations.is_empty() {
            return Err(DistanceServiceError::EmptyInput);
        }
        let from = Point::from(origin);
        Ok(destinations
            .iter()
            .map(|destination| Self::leg(from, *destination))
            .collect())
    }
}
