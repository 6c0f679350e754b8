//! The distance-service boundary consumed by the matrix builder.

use std::sync::Arc;

use async_trait::async_trait;
use geo::Coord;
use thiserror::Error;
use tourwise_core::UNREACHABLE;

/// Largest distance a measured leg may carry.
///
/// Measured legs stay strictly below [`UNREACHABLE`] so a real route, however
/// long, always ranks ahead of a pair the service could not measure.
pub const MAX_MEASURED_METERS: u32 = UNREACHABLE - 1;

/// Outcome for a single origin → destination pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegDistance {
    /// The service measured the leg.
    Meters(u32),
    /// The service answered but reported a non-OK status for this pair.
    Unavailable {
        /// Status reported by the service (e.g. `"ZERO_RESULTS"`).
        status: String,
    },
}

impl LegDistance {
    /// A measured leg, capped at [`MAX_MEASURED_METERS`].
    #[must_use]
    pub fn measured(meters: u64) -> Self {
        let capped = meters.min(u64::from(MAX_MEASURED_METERS));
        Self::Meters(u32::try_from(capped).unwrap_or(MAX_MEASURED_METERS))
    }

    /// Distance in metres, if the leg was measured.
    #[must_use]
    pub const fn meters(&self) -> Option<u32> {
        match self {
            Self::Meters(meters) => Some(*meters),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Errors that fail a whole request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistanceServiceError {
    /// A request needs at least one destination.
    #[error("at least one destination is required")]
    EmptyInput,
    /// Network-level failure (connection refused, DNS resolution, etc.).
    #[error("network error for {url}: {message}")]
    NetworkError {
        /// Request URL.
        url: String,
        /// Underlying error message.
        message: String,
    },
    /// Request exceeded the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },
    /// HTTP status outside the 2xx range.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Underlying error message.
        message: String,
    },
    /// The service answered with a non-OK overall status.
    #[error("distance service error {code}: {message}")]
    ServiceError {
        /// Status code reported by the service.
        code: String,
        /// Accompanying message, possibly empty.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse distance response: {message}")]
    ParseError {
        /// Decoder message.
        message: String,
    },
    /// The response did not contain one entry per requested destination.
    #[error("expected {expected} distances, received {actual}")]
    DimensionMismatch {
        /// Destinations requested.
        expected: usize,
        /// Entries received.
        actual: usize,
    },
}

/// Fetch distances from one origin to a batch of destinations.
///
/// Implementations return exactly one [`LegDistance`] per destination, in the
/// order given. Per-pair failures are reported as
/// [`LegDistance::Unavailable`]; whole-request failures as
/// [`DistanceServiceError`]. Retries, if any, belong inside the implementation.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use geo::Coord;
/// use tourwise_data::routing::{DistanceService, DistanceServiceError, LegDistance};
///
/// struct Flat;
///
/// #[async_trait]
/// impl DistanceService for Flat {
///     async fn fetch_distances(
///         &self,
///         _origin: Coord<f64>,
///         destinations: &[Coord<f64>],
///     ) -> Result<Vec<LegDistance>, DistanceServiceError> {
///         Ok(vec![LegDistance::Meters(1); destinations.len()])
///     }
/// }
/// ```
#[async_trait]
pub trait DistanceService: Send + Sync {
    /// Return one distance per entry of `destinations`.
    async fn fetch_distances(
        &self,
        origin: Coord<f64>,
        destinations: &[Coord<f64>],
    ) -> Result<Vec<LegDistance>, DistanceServiceError>;
}

/// Round a floating-point distance to whole metres.
///
/// Negative and non-finite values yield `None`. Longer distances are capped
/// at [`MAX_MEASURED_METERS`].
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to 0..=MAX_MEASURED_METERS before the cast"
)]
pub(crate) fn meters_from_f64(value: f64) -> Option<u32> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value.round().min(f64::from(MAX_MEASURED_METERS)) as u32)
}

#[async_trait]
impl<T> DistanceService for Arc<T>
where
    T: DistanceService + ?Sized,
{
    async fn fetch_distances(
        &self,
        origin: Coord<f64>,
        destinations: &[Coord<f64>],
    ) -> Result<Vec<LegDistance>, DistanceServiceError> {
        (**self).fetch_distances(origin, destinations).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn meters_is_none_for_unavailable_legs() {
        assert_eq!(LegDistance::Meters(12).meters(), Some(12));
        let missing = LegDistance::Unavailable {
            status: "NOT_FOUND".into(),
        };
        assert_eq!(missing.meters(), None);
    }

    #[rstest]
    #[case(1_204, 1_204)]
    #[case(u64::from(UNREACHABLE), MAX_MEASURED_METERS)]
    #[case(1_200_000, MAX_MEASURED_METERS)]
    #[case(u64::MAX, MAX_MEASURED_METERS)]
    fn measured_legs_stay_below_unreachable(#[case] meters: u64, #[case] expected: u32) {
        assert_eq!(LegDistance::measured(meters), LegDistance::Meters(expected));
    }

    #[rstest]
    #[case(0.0, Some(0))]
    #[case(120.4, Some(120))]
    #[case(120.5, Some(121))]
    #[case(-1.0, None)]
    #[case(f64::NAN, None)]
    #[case(f64::INFINITY, None)]
    #[case(999_999.0, Some(MAX_MEASURED_METERS))]
    #[case(1.0e12, Some(MAX_MEASURED_METERS))]
    fn meters_from_f64_rounds_and_rejects(#[case] value: f64, #[case] expected: Option<u32>) {
        assert_eq!(meters_from_f64(value), expected);
    }

    #[rstest]
    fn errors_render_context() {
        let err = DistanceServiceError::Timeout {
            url: "http://example.com".into(),
            timeout_secs: 30,
        };
        assert_eq!(err.to_string(), "request to http://example.com timed out after 30s");
    }
}
