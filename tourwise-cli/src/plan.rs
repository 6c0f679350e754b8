//! Plan command implementation for the Tourwise CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tourwise_core::{ItineraryStep, WaypointSet};
use tourwise_data::routing::{
    DistanceApi, DistanceService, HaversineDistanceService, HttpDistanceService,
    HttpDistanceServiceConfig,
};
use tourwise_data::{DistanceMatrixBuilder, MatrixBuilderConfig, PlannedRoute, RoutePlanner};

use crate::waypoints::{WaypointRecord, load_waypoints};
use crate::{
    ARG_PLAN_API, ARG_PLAN_API_KEY, ARG_PLAN_BASE_URL, ARG_PLAN_FORMAT, ARG_PLAN_MAX_CONCURRENT,
    ARG_PLAN_MAX_DESTINATIONS, ARG_PLAN_OFFLINE, ARG_PLAN_PROFILE, ARG_PLAN_TIMEOUT,
    ARG_PLAN_WAYPOINTS, CliError, ENV_PLAN_API_KEY, ENV_PLAN_WAYPOINTS,
};

/// Base URL used for the Google-style API when none is configured.
pub(crate) const GOOGLE_BASE_URL: &str = "https://maps.googleapis.com";

/// Wire schema of the remote distance service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ApiKind {
    /// OSRM Table API.
    #[default]
    Osrm,
    /// Google-style Distance Matrix API.
    Google,
}

/// How the planned route is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    /// One line per leg followed by the total.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "plan",
    long_about = "Order a set of waypoints into the shortest open route that \
                 starts at the waypoint marked as the start. Distances come \
                 from an OSRM or Google-style distance service, or from \
                 great-circle estimates with --offline.",
    about = "Plan the shortest route through a set of waypoints"
)]
#[ortho_config(prefix = "TOURWISE")]
pub(crate) struct PlanArgs {
    /// Path to a JSON file listing the waypoints.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) waypoints_path: Option<Utf8PathBuf>,
    /// Base URL of the distance service (e.g. "http://localhost:5000").
    #[arg(long = ARG_PLAN_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Wire schema spoken by the distance service.
    #[arg(long = ARG_PLAN_API, value_enum, value_name = "api")]
    #[serde(default)]
    pub(crate) api: Option<ApiKind>,
    /// OSRM routing profile (e.g. "driving", "walking").
    #[arg(long = ARG_PLAN_PROFILE, value_name = "profile")]
    #[serde(default)]
    pub(crate) profile: Option<String>,
    /// API key for the Google-style service.
    #[arg(long = ARG_PLAN_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long = ARG_PLAN_TIMEOUT, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Most destinations sent in one request.
    #[arg(long = ARG_PLAN_MAX_DESTINATIONS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_destinations: Option<usize>,
    /// Most requests in flight at once.
    #[arg(long = ARG_PLAN_MAX_CONCURRENT, value_name = "count")]
    #[serde(default)]
    pub(crate) max_concurrent_requests: Option<usize>,
    /// Estimate great-circle distances instead of calling a service.
    #[arg(
        long = ARG_PLAN_OFFLINE,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) offline: Option<bool>,
    /// Output format.
    #[arg(long = ARG_PLAN_FORMAT, value_enum, value_name = "format")]
    #[serde(default)]
    pub(crate) format: Option<OutputFormat>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Where distances come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DistanceSource {
    /// Great-circle estimates, no network.
    Offline,
    /// A remote distance service.
    Http(HttpDistanceServiceConfig),
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlanConfig {
    /// Path to the JSON waypoint file.
    pub(crate) waypoints_path: Utf8PathBuf,
    /// Distance backend.
    pub(crate) source: DistanceSource,
    /// Batching limits for the matrix builder.
    pub(crate) matrix: MatrixBuilderConfig,
    /// Output format.
    pub(crate) format: OutputFormat,
}

impl PlanConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.waypoints_path, ARG_PLAN_WAYPOINTS)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match crate::fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let PlanArgs {
            waypoints_path: path,
            base_url,
            api,
            profile,
            api_key,
            timeout_secs,
            max_destinations,
            max_concurrent_requests,
            offline,
            format,
        } = args;

        let waypoints_path = path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_WAYPOINTS,
            env: ENV_PLAN_WAYPOINTS,
        })?;

        let source = if offline.unwrap_or(false) {
            DistanceSource::Offline
        } else {
            let distance_api = match api.unwrap_or_default() {
                ApiKind::Osrm => {
                    profile.map_or_else(DistanceApi::default, |name| DistanceApi::Osrm {
                        profile: name,
                    })
                }
                ApiKind::Google => DistanceApi::GoogleDistanceMatrix {
                    api_key: api_key.ok_or(CliError::MissingArgument {
                        field: ARG_PLAN_API_KEY,
                        env: ENV_PLAN_API_KEY,
                    })?,
                },
            };
            let url = base_url.unwrap_or_else(|| default_base_url(&distance_api));
            let mut http = HttpDistanceServiceConfig::new(url).with_api(distance_api);
            if let Some(secs) = timeout_secs {
                if secs == 0 {
                    return Err(CliError::InvalidArgument {
                        field: ARG_PLAN_TIMEOUT,
                        reason: "must be at least one second",
                    });
                }
                http = http.with_timeout(Duration::from_secs(secs));
            }
            DistanceSource::Http(http)
        };

        let mut matrix = MatrixBuilderConfig::default();
        if let Some(cap) = positive(max_destinations, ARG_PLAN_MAX_DESTINATIONS)? {
            matrix = matrix.with_max_destinations_per_request(cap);
        }
        if let Some(limit) = positive(max_concurrent_requests, ARG_PLAN_MAX_CONCURRENT)? {
            matrix = matrix.with_max_concurrent_requests(limit);
        }

        Ok(Self {
            waypoints_path,
            source,
            matrix,
            format: format.unwrap_or_default(),
        })
    }
}

fn default_base_url(api: &DistanceApi) -> String {
    match api {
        DistanceApi::Osrm { .. } => HttpDistanceServiceConfig::default().base_url,
        DistanceApi::GoogleDistanceMatrix { .. } => GOOGLE_BASE_URL.to_owned(),
    }
}

fn positive(value: Option<usize>, field: &'static str) -> Result<Option<NonZeroUsize>, CliError> {
    value
        .map(|count| {
            NonZeroUsize::new(count).ok_or(CliError::InvalidArgument {
                field,
                reason: "must be at least 1",
            })
        })
        .transpose()
}

/// Builds the distance service for the current plan invocation.
pub(super) trait PlanServiceBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Arc<dyn DistanceService>, CliError>;
}

pub(super) struct DefaultPlanServiceBuilder;

impl PlanServiceBuilder for DefaultPlanServiceBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Arc<dyn DistanceService>, CliError> {
        match &config.source {
            DistanceSource::Offline => Ok(Arc::new(HaversineDistanceService::new())),
            DistanceSource::Http(http) => {
                let service = HttpDistanceService::with_config(http.clone()).map_err(|source| {
                    CliError::BuildDistanceService {
                        base_url: http.base_url.clone(),
                        source,
                    }
                })?;
                Ok(Arc::new(service))
            }
        }
    }
}

pub(super) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultPlanServiceBuilder;
    run_plan_with(args, &builder, &mut stdout)
}

pub(super) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn PlanServiceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_plan_config(args)?;
    let route = execute_plan(&config, builder)?;
    write_route(writer, &route, config.format)
}

fn resolve_plan_config(args: PlanArgs) -> Result<PlanConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn execute_plan(
    config: &PlanConfig,
    builder: &dyn PlanServiceBuilder,
) -> Result<PlannedRoute, CliError> {
    let waypoints = load_waypoints(&config.waypoints_path)?;
    let set = WaypointSet::new(waypoints).map_err(|source| CliError::InvalidWaypoints {
        path: config.waypoints_path.clone(),
        source,
    })?;
    let service = builder.build(config)?;
    let planner =
        RoutePlanner::with_builder(DistanceMatrixBuilder::with_config(service, config.matrix))?;
    let route = planner.plan(&set).map_err(CliError::Plan)?;
    if route.report.is_degraded() {
        log::warn!(
            "{} of {} distance requests failed",
            route.report.failed_requests,
            route.report.requests
        );
    }
    Ok(route)
}

/// JSON shape of a planned route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PlanOutput {
    /// Waypoints in visiting order.
    pub(crate) stops: Vec<WaypointRecord>,
    /// One entry per leg.
    pub(crate) steps: Vec<ItineraryStep>,
    /// Sum of all leg distances in metres.
    pub(crate) total_distance_meters: u64,
    /// Legs whose distance could not be measured.
    pub(crate) unreachable_legs: usize,
    /// Distance requests issued.
    pub(crate) requests: usize,
    /// Distance requests that failed.
    pub(crate) failed_requests: usize,
}

impl From<&PlannedRoute> for PlanOutput {
    fn from(route: &PlannedRoute) -> Self {
        Self {
            stops: route.stops.iter().map(WaypointRecord::from).collect(),
            steps: route.itinerary.steps.clone(),
            total_distance_meters: route.total_distance_meters(),
            unreachable_legs: route.unreachable_legs(),
            requests: route.report.requests,
            failed_requests: route.report.failed_requests,
        }
    }
}

/// Render a route as numbered legs followed by the total.
pub(crate) fn render_text(route: &PlannedRoute) -> String {
    let mut lines: Vec<String> = (1_usize..)
        .zip(route.itinerary.describe())
        .map(|(number, line)| format!("{number}. {line}"))
        .collect();
    lines.push(route.itinerary.summary());
    let unreachable = route.unreachable_legs();
    if unreachable > 0 {
        lines.push(format!(
            "Warning: {unreachable} of {} legs have no measured distance",
            route.itinerary.steps.len()
        ));
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn write_route(
    writer: &mut dyn Write,
    route: &PlannedRoute,
    format: OutputFormat,
) -> Result<(), CliError> {
    let payload = match format {
        OutputFormat::Text => render_text(route),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&PlanOutput::from(route))
                .map_err(CliError::SerializeRoute)?;
            json.push('\n');
            json
        }
    };
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
