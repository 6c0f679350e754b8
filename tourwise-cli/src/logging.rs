//! Logger installation for the CLI.
//!
//! Records go to stderr so the plan output on stdout stays machine-readable.

use env_logger::{Builder, Env, Target, WriteStyle};
use log::LevelFilter;
use std::io::Write;

use crate::{CliError, ENV_LOG};

/// Level used when neither `--log-level` nor the environment sets one.
const DEFAULT_FILTER: &str = "warn";

/// Build a logger honouring `level`, or the `TOURWISE_LOG` filter when unset.
pub(crate) fn builder(level: Option<LevelFilter>) -> Builder {
    let mut builder = Builder::from_env(Env::new().filter_or(ENV_LOG, DEFAULT_FILTER));
    if let Some(filter) = level {
        builder.filter_level(filter);
    }
    builder
        .target(Target::Stderr)
        .write_style(WriteStyle::Never)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        });
    builder
}

/// Install the global logger.
pub(crate) fn init(level: Option<LevelFilter>) -> Result<(), CliError> {
    builder(level).try_init().map_err(CliError::InitLogging)
}
