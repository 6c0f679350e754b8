//! Error types emitted by the Tourwise CLI.
//!
//! Keep this error type reasonably small, as every CLI helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use tourwise_core::WaypointSetError;
use tourwise_data::routing::ProviderBuildError;
use tourwise_data::{PlanError, PlannerBuildError};

/// Errors emitted by the Tourwise CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// The global logger could not be installed.
    #[error("failed to initialise logging: {0}")]
    InitLogging(#[source] log::SetLoggerError),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Name of the affected option.
        field: &'static str,
        /// Environment variable that can supply the option.
        env: &'static str,
    },
    /// An option was present but unusable.
    #[error("invalid --{field}: {reason}")]
    InvalidArgument {
        /// Name of the affected option.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Name of the affected option.
        field: &'static str,
        /// Path involved in the failure.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Name of the affected option.
        field: &'static str,
        /// Path involved in the failure.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Name of the affected option.
        field: &'static str,
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Reading the waypoint file failed.
    #[error("failed to read waypoints from {path:?}: {source}")]
    ReadWaypoints {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Waypoint JSON could not be decoded.
    #[error("failed to parse waypoint JSON at {path:?}: {source}")]
    ParseWaypoints {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The waypoint list failed validation.
    #[error("waypoints in {path:?} are invalid: {source}")]
    InvalidWaypoints {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: WaypointSetError,
    },
    /// Constructing the HTTP distance service failed.
    #[error("failed to build distance service for {base_url:?}: {source}")]
    BuildDistanceService {
        /// Base URL of the distance service.
        base_url: String,
        /// Underlying error.
        #[source]
        source: ProviderBuildError,
    },
    /// Constructing the route planner failed.
    #[error(transparent)]
    BuildPlanner(#[from] PlannerBuildError),
    /// Planning the route failed.
    #[error("{}", .0.user_message())]
    Plan(#[source] PlanError),
    /// Serializing the planned route failed.
    #[error("failed to serialize route: {0}")]
    SerializeRoute(#[source] serde_json::Error),
    /// Writing the plan output failed.
    #[error("failed to write plan output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
