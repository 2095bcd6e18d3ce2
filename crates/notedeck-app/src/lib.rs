mod explorer;
mod listing;
mod processing;
mod setup;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use notedeck_core::collab::{ProcessingPipeline, SessionProvider, TreeMutations, TreeSource};
use notedeck_core::config::{NotedeckConfig, load_config, resolve_config_path};
use notedeck_core::doctor::{DoctorReport, run_doctor};
use notedeck_core::policy::Role;

pub use explorer::{MenuOutcome, Workspace};
pub use listing::TreeRow;
pub use processing::{BatchOutcome, ProcessingError};
pub use setup::{InitRequest, InitResult, initialize, sample_library};

/// Use-case layer over the explorer engine. Every collaborator is borrowed so the binary owns
/// the concrete store and tests can pass fakes.
pub struct App<'a> {
    pub source: &'a dyn TreeSource,
    pub mutations: &'a dyn TreeMutations,
    pub pipeline: &'a dyn ProcessingPipeline,
    pub session: &'a dyn SessionProvider,
}

impl<'a> App<'a> {
    pub fn new(
        source: &'a dyn TreeSource,
        mutations: &'a dyn TreeMutations,
        pipeline: &'a dyn ProcessingPipeline,
        session: &'a dyn SessionProvider,
    ) -> Self {
        Self {
            source,
            mutations,
            pipeline,
            session,
        }
    }

    pub fn role(&self) -> Role {
        self.session.current_role()
    }
}

#[derive(Debug, Clone)]
pub struct ReadyConfig {
    pub config_path: PathBuf,
    pub config: NotedeckConfig,
}

impl ReadyConfig {
    pub fn library_path(&self) -> PathBuf {
        self.config.library_path(&self.config_path)
    }
}

pub fn doctor() -> DoctorReport {
    run_doctor()
}

pub fn ensure_config_ready() -> Result<ReadyConfig> {
    let config_path = resolve_config_path().context("failed to resolve config path")?;

    if !config_path.exists() {
        bail!(
            "missing config at {}\nRun `notedeck init` to create one, or `notedeck doctor` to inspect the setup.",
            config_path.display()
        );
    }

    let config = load_config(&config_path).map_err(|error| {
        anyhow!(
            "invalid config at {}: {error}\nFix the config and retry, or run `notedeck init --force`.",
            config_path.display()
        )
    })?;

    Ok(ReadyConfig {
        config_path,
        config,
    })
}
