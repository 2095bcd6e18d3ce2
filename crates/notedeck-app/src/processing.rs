use anyhow::{Context, Result};
use notedeck_core::collab::{BatchReport, MutationError};
use notedeck_core::mode_gate::SubMode;
use thiserror::Error;
use tracing::info;

use crate::App;
use crate::explorer::Workspace;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("selection mode is not active")]
    NotInSelectionMode,
    #[error("selection mode is set to {active}, not {requested}")]
    WrongSubMode { active: SubMode, requested: SubMode },
    #[error("no selected note is eligible to {requested}")]
    NothingEligible { requested: SubMode },
    #[error(transparent)]
    Pipeline(#[from] MutationError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub sub_mode: SubMode,
    pub report: BatchReport,
}

impl<'a> App<'a> {
    /// Sends the selected notes to the processing pipeline.
    pub fn submit_selection(&self, workspace: &mut Workspace) -> Result<BatchOutcome> {
        self.run_batch(workspace, SubMode::Process)
    }

    /// Withdraws the selected notes from processing.
    pub fn retract_selection(&self, workspace: &mut Workspace) -> Result<BatchOutcome> {
        self.run_batch(workspace, SubMode::Retract)
    }

    fn run_batch(&self, workspace: &mut Workspace, requested: SubMode) -> Result<BatchOutcome> {
        let mode = *workspace.state.mode();
        if !mode.is_active() {
            return Err(ProcessingError::NotInSelectionMode.into());
        }
        if mode.sub_mode() != requested {
            return Err(ProcessingError::WrongSubMode {
                active: mode.sub_mode(),
                requested,
            }
            .into());
        }

        let selected = workspace.state.selected_in_order(&workspace.tree);
        let eligible = mode.filter_eligible(&workspace.tree, &selected);
        if eligible.is_empty() {
            return Err(ProcessingError::NothingEligible { requested }.into());
        }

        let report = match requested {
            SubMode::Process => self.pipeline.submit(&eligible),
            SubMode::Retract => self.pipeline.retract(&eligible),
        }
        .map_err(ProcessingError::from)?;

        info!(
            sub_mode = %requested,
            accepted = report.accepted.len(),
            skipped = report.skipped.len(),
            "processing batch sent"
        );

        workspace.state.exit_selection_mode();
        self.refresh(workspace)
            .context("batch was sent but the tree could not be refreshed")?;

        Ok(BatchOutcome {
            sub_mode: requested,
            report,
        })
    }
}
