//! Test helpers for writing waypoint files and stubbing distance services.

use super::*;
use crate::plan::{PlanConfig, PlanServiceBuilder};
use crate::waypoints::WaypointRecord;
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tourwise_core::test_support::{matrix, start, stop};
use tourwise_core::{DistanceMatrix, Waypoint};
use tourwise_data::routing::DistanceService;
use tourwise_data::routing::test_support::StubDistanceService;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write file");
}

/// A temporary directory addressed by a UTF-8 path.
pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Start `a` plus stops `b` and `c`, laid out in a line running north-west.
pub(super) fn sample_waypoints() -> Vec<Waypoint> {
    vec![
        start("a", -0.10, 51.50),
        stop("b", -0.11, 51.51),
        stop("c", -0.12, 51.52),
    ]
}

/// Distances for [`sample_waypoints`]; A, B, C is the shortest order.
pub(super) fn sample_distances() -> DistanceMatrix {
    matrix(vec![
        vec![0, 100, 300],
        vec![100, 0, 150],
        vec![300, 150, 0],
    ])
}

pub(super) fn write_waypoints(path: &Utf8Path, waypoints: &[Waypoint]) {
    let records: Vec<WaypointRecord> = waypoints.iter().map(WaypointRecord::from).collect();
    let payload = serde_json::to_string_pretty(&records).expect("serialize waypoints");
    write_utf8(path, payload.as_bytes());
}

/// Hands the same stub to every plan invocation.
pub(super) struct StubServiceBuilder {
    pub(super) service: Arc<StubDistanceService>,
}

impl StubServiceBuilder {
    pub(super) fn new(service: StubDistanceService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl PlanServiceBuilder for StubServiceBuilder {
    fn build(&self, _config: &PlanConfig) -> Result<Arc<dyn DistanceService>, CliError> {
        Ok(self.service.clone())
    }
}
