//! Logging setup for binaries and demos embedding the scheduler.

use crate::core::domain::error::{SchedulerError, SchedulerResult};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,power_scheduler=debug,reqwest=warn,hyper=warn";

/// Installs a global `tracing` subscriber writing to stderr.
///
/// The filter comes from `RUST_LOG` when set. Fails if a global subscriber
/// is already installed.
pub fn init_tracing() -> SchedulerResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| SchedulerError::Config(format!("Failed to initialise tracing: {}", e)))
}
