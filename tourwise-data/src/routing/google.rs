//! Google-style Distance Matrix API response types.
//!
//! The response carries an overall `status` plus one element per destination,
//! each with its own `status`. Only the `distance.value` field (metres) is
//! read.

use serde::Deserialize;

use super::service::{DistanceServiceError, LegDistance};

/// Status string for successful responses and elements.
const OK: &str = "OK";

/// Distance Matrix API response.
#[derive(Debug, Deserialize)]
pub struct DistanceMatrixResponse {
    /// Overall status (`"OK"`, `"INVALID_REQUEST"`, `"OVER_QUERY_LIMIT"`, ...).
    pub status: String,
    /// Optional diagnostic accompanying a non-OK status.
    pub error_message: Option<String>,
    /// One row per origin; requests here always send a single origin.
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// A row of elements for one origin.
#[derive(Debug, Deserialize)]
pub struct Row {
    /// One element per destination.
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// Result for one origin/destination pair.
#[derive(Debug, Deserialize)]
pub struct Element {
    /// Element status (`"OK"`, `"NOT_FOUND"`, `"ZERO_RESULTS"`, ...).
    pub status: String,
    /// Distance, present when `status` is `"OK"`.
    pub distance: Option<TextValue>,
}

/// Human-readable text paired with a numeric value.
#[derive(Debug, Deserialize)]
pub struct TextValue {
    /// Numeric value; metres for distances.
    pub value: u64,
}

impl DistanceMatrixResponse {
    /// Check if the overall response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == OK
    }

    /// Convert the single-origin response into per-destination legs.
    pub fn into_legs(self, expected: usize) -> Result<Vec<LegDistance>, DistanceServiceError> {
        if !self.is_ok() {
            return Err(DistanceServiceError::ServiceError {
                code: self.status,
                message: self.error_message.unwrap_or_default(),
            });
        }

        let elements = self
            .rows
            .into_iter()
            .next()
            .map(|row| row.elements)
            .ok_or_else(|| DistanceServiceError::ParseError {
                message: "distance matrix response has no rows".to_owned(),
            })?;

        if elements.len() != expected {
            return Err(DistanceServiceError::DimensionMismatch {
                expected,
                actual: elements.len(),
            });
        }

        Ok(elements.into_iter().map(Element::into_leg).collect())
    }
}

impl Element {
    fn into_leg(self) -> LegDistance {
        if self.status != OK {
            return LegDistance::Unavailable {
                status: self.status,
            };
        }
        self.distance.map_or_else(
            || LegDistance::Unavailable {
                status: "MISSING_DISTANCE".to_owned(),
            },
            |distance| LegDistance::measured(distance.value),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::MAX_MEASURED_METERS;

    fn parse(json: &str) -> DistanceMatrixResponse {
        serde_json::from_str(json).expect("should deserialise")
    }

    #[test]
    fn converts_mixed_element_statuses() {
        let response = parse(
            r#"{
                "status": "OK",
                "origin_addresses": ["A"],
                "destination_addresses": ["B", "C", "D"],
                "rows": [{ "elements": [
                    { "status": "OK", "distance": { "text": "1.2 km", "value": 1204 } },
                    { "status": "ZERO_RESULTS" },
                    { "status": "OK" }
                ]}]
            }"#,
        );

        let legs = response.into_legs(3).expect("should convert");
        assert_eq!(legs[0], LegDistance::Meters(1204));
        assert_eq!(
            legs[1],
            LegDistance::Unavailable {
                status: "ZERO_RESULTS".into()
            }
        );
        assert_eq!(
            legs[2],
            LegDistance::Unavailable {
                status: "MISSING_DISTANCE".into()
            }
        );
    }

    #[test]
    fn very_long_legs_rank_ahead_of_unknown_ones() {
        let response = parse(
            r#"{
                "status": "OK",
                "rows": [{ "elements": [
                    { "status": "OK", "distance": { "text": "1,200 km", "value": 1200000 } },
                    { "status": "OK", "distance": { "text": "1,000 km", "value": 999999 } }
                ]}]
            }"#,
        );

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
    fn overall_failure_is_a_service_error() {
        let response = parse(
            r#"{ "status": "OVER_QUERY_LIMIT", "error_message": "quota exceeded", "rows": [] }"#,
        );

        let err = response.into_legs(2).expect_err("should fail");
        assert_eq!(
            err,
            DistanceServiceError::ServiceError {
                code: "OVER_QUERY_LIMIT".into(),
                message: "quota exceeded".into(),
            }
        );
    }

    #[test]
    fn missing_rows_is_a_parse_error() {
        let err = parse(r#"{ "status": "OK" }"#)
            .into_legs(1)
            .expect_err("should fail");
        assert!(matches!(err, DistanceServiceError::ParseError { .. }));
    }

    #[test]
    fn element_count_must_match() {
        let err = parse(r#"{ "status": "OK", "rows": [{ "elements": [] }] }"#)
            .into_legs(2)
            .expect_err("should fail");
        assert_eq!(
            err,
            DistanceServiceError::DimensionMismatch {
                expected: 2,
                actual: 0,
            }
        );
    }
}
