//! OSRM Table API response types.
//!
//! Requests use `sources=0` so the table has a single row: distances from the
//! origin to every destination.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#table-service>

use serde::Deserialize;

use super::service::{DistanceServiceError, LegDistance, meters_from_f64};

/// Status reported for `null` cells, which OSRM uses for pairs with no route.
const NO_ROUTE: &str = "NoRoute";

/// Status reported for negative or non-finite cells.
const INVALID_DISTANCE: &str = "InvalidDistance";

/// OSRM Table API response.
///
/// The `code` field indicates the response status. On success the requested
/// annotation is present; this crate only asks for `distance`.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"InvalidQuery"` - Invalid query parameters
    /// - `"InvalidOptions"` - Invalid option combination
    /// - `"NoTable"` - Table computation failed
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Matrix of distances in metres, `None` when no route exists.
    pub distances: Option<Vec<Vec<Option<f64>>>>,
}

impl TableResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }

    /// Convert the single-row table into per-destination legs.
    pub fn into_legs(self, expected: usize) -> Result<Vec<LegDistance>, DistanceServiceError> {
        if !self.is_ok() {
            return Err(DistanceServiceError::ServiceError {
                code: self.code,
                message: self.message.unwrap_or_default(),
            });
        }

        let row = self
            .distances
            .and_then(|rows| rows.into_iter().next())
            .ok_or_else(|| DistanceServiceError::ParseError {
                message: "OSRM response missing distances row".to_owned(),
            })?;

        if row.len() != expected {
            return Err(DistanceServiceError::DimensionMismatch {
                expected,
                actual: row.len(),
            });
        }

        Ok(row
            .into_iter()
            .map(|cell| match cell {
                None => LegDistance::Unavailable {
                    status: NO_ROUTE.to_owned(),
                },
                Some(value) => meters_from_f64(value).map_or_else(
                    || LegDistance::Unavailable {
                        status: INVALID_DISTANCE.to_owned(),
                    },
                    LegDistance::Meters,
                ),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::MAX_MEASURED_METERS;

    fn parse(json: &str) -> TableResponse {
        serde_json::from_str(json).expect("should deserialise")
    }

    #[test]
    fn deserialise_success_response() {
        let response = parse(r#"{ "code": "Ok", "distances": [[0.0, 1204.6]] }"#);

        assert!(response.is_ok());
        assert!(response.message.is_none());
        let legs = response.into_legs(2).expect("should convert");
        assert_eq!(legs, vec![LegDistance::Meters(0), LegDistance::Meters(1205)]);
    }

    #[test]
    fn null_cells_become_unavailable() {
        let response = parse(r#"{ "code": "Ok", "distances": [[null, 10.0]] }"#);

        let legs = response.into_legs(2).expect("should convert");
        assert_eq!(
            legs[0],
            LegDistance::Unavailable {
                status: NO_ROUTE.to_owned()
            }
        );
        assert_eq!(legs[1], LegDistance::Meters(10));
    }

    #[test]
    fn negative_cells_become_unavailable() {
        let response = parse(r#"{ "code": "Ok", "distances": [[-3.0]] }"#);

        let legs = response.into_legs(1).expect("should convert");
        assert_eq!(
            legs,
            vec![LegDistance::Unavailable {
                status: INVALID_DISTANCE.to_owned()
            }]
        );
    }

    #[test]
    fn very_long_legs_are_capped_below_unreachable() {
        let response = parse(r#"{ "code": "Ok", "distances": [[1200000.0, 999999.0]] }"#);

        let legs = response.into_legs(2).expect("should convert");
        assert_eq!(
            legs,
            vec![
                LegDistance::Meters(MAX_MEASURED_METERS),
                LegDistance::Meters(MAX_MEASURED_METERS)
            ]
        );
    }

    #[test]
    fn error_code_is_a_service_error() {
        let response = parse(r#"{ "code": "InvalidQuery", "message": "Coordinates are invalid" }"#);

        assert!(!response.is_ok());
        let err = response.into_legs(1).expect_err("should fail");
        assert_eq!(
            err,
            DistanceServiceError::ServiceError {
                code: "InvalidQuery".into(),
                message: "Coordinates are invalid".into(),
            }
        );
    }

    #[test]
    fn missing_distances_is_a_parse_error() {
        let err = parse(r#"{ "code": "Ok" }"#)
            .into_legs(1)
            .expect_err("should fail");
        assert!(matches!(err, DistanceServiceError::ParseError { .. }));
    }

    #[test]
    fn short_row_is_a_dimension_mismatch() {
        let err = parse(r#"{ "code": "Ok", "distances": [[1.0]] }"#)
            .into_legs(3)
            .expect_err("should fail");
        assert_eq!(
            err,
            DistanceServiceError::DimensionMismatch {
                expected: 3,
                actual: 1,
            }
        );
    }
}
