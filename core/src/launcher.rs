use clap::Parser as _;
use derive_more::Display;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::cli::Cli;
use crate::config::{Config, ConfigError};
use crate::invoker::InvocationClaim;
use crate::payload::SharedObject;
use crate::reporter::{Reporter, TracingSink};
use crate::sequence::{BootstrapOutcome, Sequence};

/// Process glue: subscriber, configuration, then the bootstrap sequence.
pub struct Launcher {
    cli: Cli,
}

impl Launcher {
    #[expect(clippy::single_call_fn, reason = "process entry glue")]
    pub fn from_args() -> Self {
        Self { cli: Cli::parse() }
    }

    #[expect(clippy::single_call_fn, reason = "process entry glue")]
    pub fn launch(self) -> Result<(), LaunchError> {
        init_tracing();
        let config = Config::resolve(&self.cli)?;
        tracing::info!(
            payload = %config.payload.display(),
            entry = &*config.entry_symbol,
            "bootstrapping payload"
        );
        let sequence = Sequence::new(InvocationClaim::process(), Reporter::new(TracingSink));
        match sequence.run(SharedObject::new(config.payload), &config.entry_symbol) {
            // Either way the sequence is terminal and the failure, if any,
            // is already on the diagnostic channel. Exit status stays 0.
            BootstrapOutcome::Completed | BootstrapOutcome::Failed(_) => Ok(()),
        }
    }
}

#[expect(clippy::single_call_fn, reason = "subscriber is installed once per process")]
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

#[derive(Debug, Display, Error)]
pub enum LaunchError {
    Config(#[from] ConfigError),
}
