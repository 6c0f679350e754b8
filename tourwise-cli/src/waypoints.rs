//! JSON waypoint records read from and written to disk.

use camino::Utf8Path;
use geo::Coord;
use serde::{Deserialize, Serialize};
use tourwise_core::Waypoint;

use crate::CliError;
use crate::fs::read_utf8_file;

/// One waypoint as it appears in the input file.
///
/// ```json
/// { "id": "home", "name": "Home", "latitude": 51.5, "longitude": -0.1, "start": true }
/// ```
///
/// `name` defaults to `id`; `start` defaults to `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WaypointRecord {
    pub(crate) id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) start: bool,
}

impl From<WaypointRecord> for Waypoint {
    fn from(record: WaypointRecord) -> Self {
        let WaypointRecord {
            id,
            name,
            latitude,
            longitude,
            start,
        } = record;
        let label = name.unwrap_or_else(|| id.clone());
        let location = Coord {
            x: longitude,
            y: latitude,
        };
        if start {
            Self::start(id, label, location)
        } else {
            Self::new(id, label, location)
        }
    }
}

impl From<&Waypoint> for WaypointRecord {
    fn from(waypoint: &Waypoint) -> Self {
        Self {
            id: waypoint.id.clone(),
            name: Some(waypoint.name.clone()),
            latitude: waypoint.latitude(),
            longitude: waypoint.longitude(),
            start: waypoint.is_start,
        }
    }
}

/// Load a JSON array of [`WaypointRecord`]s from disk.
pub(crate) fn load_waypoints(path: &Utf8Path) -> Result<Vec<Waypoint>, CliError> {
    let payload = read_utf8_file(path).map_err(|source| CliError::ReadWaypoints {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<WaypointRecord> =
        serde_json::from_str(&payload).map_err(|source| CliError::ParseWaypoints {
            path: path.to_path_buf(),
            source,
        })?;
    log::debug!("loaded {} waypoints from {path}", records.len());
    Ok(records.into_iter().map(Waypoint::from).collect())
}
