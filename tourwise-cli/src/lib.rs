//! Command-line interface for planning multi-stop routes.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use log::LevelFilter;

mod error;
mod fs;
mod logging;
mod plan;
mod waypoints;

pub use error::CliError;
use plan::{PlanArgs, run_plan};

pub(crate) const ARG_LOG_LEVEL: &str = "log-level";
pub(crate) const ARG_PLAN_WAYPOINTS: &str = "waypoints";
pub(crate) const ARG_PLAN_BASE_URL: &str = "base-url";
pub(crate) const ARG_PLAN_API: &str = "api";
pub(crate) const ARG_PLAN_PROFILE: &str = "profile";
pub(crate) const ARG_PLAN_API_KEY: &str = "api-key";
pub(crate) const ARG_PLAN_TIMEOUT: &str = "timeout-secs";
pub(crate) const ARG_PLAN_MAX_DESTINATIONS: &str = "max-destinations";
pub(crate) const ARG_PLAN_MAX_CONCURRENT: &str = "max-concurrent-requests";
pub(crate) const ARG_PLAN_OFFLINE: &str = "offline";
pub(crate) const ARG_PLAN_FORMAT: &str = "format";
pub(crate) const ENV_LOG: &str = "TOURWISE_LOG";
pub(crate) const ENV_PLAN_WAYPOINTS: &str = "TOURWISE_CMDS_PLAN_WAYPOINTS_PATH";
pub(crate) const ENV_PLAN_API_KEY: &str = "TOURWISE_CMDS_PLAN_API_KEY";

/// Run the Tourwise CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    logging::init(cli.log_level)?;
    match cli.command {
        Command::Plan(args) => run_plan(args)?,
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "tourwise",
    about = "Plan the shortest visiting order for a handful of stops",
    version
)]
struct Cli {
    /// Log verbosity (off, error, warn, info, debug, trace).
    #[arg(long = ARG_LOG_LEVEL, value_name = "level", global = true)]
    log_level: Option<LevelFilter>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Order a list of waypoints and print the itinerary.
    Plan(PlanArgs),
}

#[cfg(test)]
mod tests;
