use std::time::Instant;

use anyhow::{Context, Result};
use notedeck_core::collab::MutationError;
use notedeck_core::edit::{CreateCommit, RenameCommit, Resolution};
use notedeck_core::explorer::{ExplorerSettings, ExplorerState};
use notedeck_core::menu::MenuAction;
use notedeck_core::navigation::Rebind;
use notedeck_core::node::Node;
use notedeck_core::policy::{Action, allowed, creatable_child};
use notedeck_core::rubber_band::Point;
use notedeck_core::tree::TreeIndex;
use tracing::{debug, info, warn};

use crate::App;

/// Explorer state plus the tree it was last bound to.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub state: ExplorerState,
    pub tree: TreeIndex,
}

impl Workspace {
    pub fn new(state: ExplorerState, tree: TreeIndex) -> Self {
        Self { state, tree }
    }

    /// Nodes listed in the current view.
    pub fn listing(&self) -> &[Node] {
        self.tree
            .children_of(self.state.navigator().current_id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    /// No menu was open, or the action was not offered.
    Ignored,
    Navigated,
    OpenNote { node_id: String },
    Download { filename: String },
    Editing,
    Deleted,
    /// The action ran and the failure went to the warning dialog.
    Reported,
}

impl<'a> App<'a> {
    pub fn open_workspace(&self, settings: ExplorerSettings) -> Result<Workspace> {
        let nodes = self
            .source
            .get_tree()
            .context("failed to load the library tree")?;
        let tree = TreeIndex::new(nodes);
        debug!(nodes = tree.len(), "opened workspace");
        Ok(Workspace::new(ExplorerState::new(settings), tree))
    }

    /// Re-fetches the tree and re-aligns the store with it.
    pub fn refresh(&self, workspace: &mut Workspace) -> Result<Rebind> {
        let nodes = self
            .source
            .get_tree()
            .context("failed to refresh the library tree")?;
        workspace.tree = TreeIndex::new(nodes);
        let outcome = workspace.state.rebind(&workspace.tree);
        debug!(nodes = workspace.tree.len(), ?outcome, "refreshed tree");
        Ok(outcome)
    }

    /// Opens the rename input for `node_id` when the role may rename it.
    pub fn start_rename(&self, workspace: &mut Workspace, node_id: &str) -> bool {
        let Some(node_type) = workspace.tree.node_type_of(node_id) else {
            return false;
        };
        if !allowed(self.role(), node_type, Action::Rename) {
            return false;
        }
        workspace.state.start_renaming(&workspace.tree, node_id)
    }

    /// Opens the create input for a child of the current view.
    pub fn start_create_here(&self, workspace: &mut Workspace) -> bool {
        let tail = workspace.state.navigator().tail();
        let parent_type = tail.map(|crumb| crumb.node_type);
        let parent_id = tail.map(|crumb| crumb.id.clone());
        let Some(child_type) = creatable_child(self.role(), parent_type) else {
            return false;
        };
        workspace
            .state
            .start_creating(child_type, parent_id.as_deref());
        true
    }

    /// Runs a rename synchronously. `None` when no commit started.
    pub fn commit_rename(
        &self,
        workspace: &mut Workspace,
        label: &str,
        now: Instant,
    ) -> Result<Option<Resolution<String>>> {
        let Some(commit) = workspace.state.begin_rename_commit(label) else {
            return Ok(None);
        };
        let result = self
            .mutations
            .rename(&commit.node_id, commit.node_type, &commit.label);
        self.finish_rename(workspace, &commit, result, now).map(Some)
    }

    /// Applies a rename result. The tree is re-fetched whenever the store accepted the
    /// rename, even if the edit was closed while it ran.
    pub fn finish_rename(
        &self,
        workspace: &mut Workspace,
        commit: &RenameCommit,
        result: Result<(), MutationError>,
        now: Instant,
    ) -> Result<Resolution<String>> {
        let stored = result.is_ok();
        let resolution = workspace.state.complete_rename(commit, result, now);
        match &resolution {
            Resolution::Committed(node_id) => {
                info!(node_id = %node_id, label = %commit.label, "renamed node");
                self.refresh(workspace)?;
            }
            Resolution::Duplicate { name } => {
                debug!(node_id = %commit.node_id, name = %name, "rename clashed with a sibling");
            }
            Resolution::Failed { message } => {
                warn!(node_id = %commit.node_id, error = %message, "rename failed");
            }
            Resolution::Stale => {
                debug!(token = commit.token, stored, "rename finished after its edit closed");
                if stored {
                    self.refresh(workspace)?;
                }
            }
        }
        Ok(resolution)
    }

    /// Runs a create synchronously. `None` when no commit started.
    pub fn commit_create(
        &self,
        workspace: &mut Workspace,
        label: &str,
        now: Instant,
    ) -> Result<Option<Resolution<Node>>> {
        let Some(commit) = workspace.state.begin_create_commit(label) else {
            return Ok(None);
        };
        let result =
            self.mutations
                .create(commit.parent_id.as_deref(), commit.child_type, &commit.label);
        self.finish_create(workspace, &commit, result, now).map(Some)
    }

    pub fn finish_create(
        &self,
        workspace: &mut Workspace,
        commit: &CreateCommit,
        result: Result<Node, MutationError>,
        now: Instant,
    ) -> Result<Resolution<Node>> {
        let stored = result.is_ok();
        let resolution = workspace.state.complete_create(commit, result, now);
        match &resolution {
            Resolution::Committed(node) => {
                info!(node_id = %node.id, node_type = %node.node_type, "created node");
                self.refresh(workspace)?;
            }
            Resolution::Duplicate { name } => {
                debug!(name = %name, "create clashed with a sibling");
            }
            Resolution::Failed { message } => {
                warn!(child_type = %commit.child_type, error = %message, "create failed");
            }
            Resolution::Stale => {
                debug!(token = commit.token, stored, "create finished after its edit closed");
                if stored {
                    self.refresh(workspace)?;
                }
            }
        }
        Ok(resolution)
    }

    /// Deletes `node_id` when the role may. Collaborator failures are reported through the
    /// warning dialog; only a failed refresh is returned as an error.
    pub fn delete(&self, workspace: &mut Workspace, node_id: &str, now: Instant) -> Result<bool> {
        let Some(node_type) = workspace.tree.node_type_of(node_id) else {
            return Ok(false);
        };
        if !allowed(self.role(), node_type, Action::Delete) {
            return Ok(false);
        }

        match self.mutations.delete(node_id, node_type) {
            Ok(()) => {
                info!(node_id = %node_id, node_type = %node_type, "deleted node");
                self.refresh(workspace)?;
                Ok(true)
            }
            Err(error) => {
                warn!(node_id = %node_id, error = %error, "delete failed");
                workspace.state.report_error(&error.to_string(), now);
                Ok(false)
            }
        }
    }

    pub fn open_menu(&self, workspace: &mut Workspace, node_id: &str, position: Point) -> bool {
        workspace
            .state
            .open_menu(&workspace.tree, node_id, self.role(), position)
    }

    /// Closes the open menu and runs `action` against its node.
    pub fn invoke_menu_action(
        &self,
        workspace: &mut Workspace,
        action: MenuAction,
        now: Instant,
    ) -> Result<MenuOutcome> {
        let Some(menu) = workspace.state.close_menu() else {
            return Ok(MenuOutcome::Ignored);
        };
        if !menu.actions().any(|offered| offered == action) {
            return Ok(MenuOutcome::Ignored);
        }
        let node_id = menu.node_id;

        let outcome = match action {
            MenuAction::Open => {
                if workspace.state.open(&workspace.tree, &node_id) {
                    MenuOutcome::Navigated
                } else if workspace.tree.get(&node_id).is_some_and(Node::is_note) {
                    MenuOutcome::OpenNote { node_id }
                } else {
                    MenuOutcome::Ignored
                }
            }
            MenuAction::Download => match workspace
                .tree
                .get(&node_id)
                .and_then(|node| node.meta.pdf_filename.clone())
            {
                Some(filename) => MenuOutcome::Download { filename },
                None => MenuOutcome::Ignored,
            },
            MenuAction::CreateChild(child_type) => {
                if !workspace.state.open(&workspace.tree, &node_id) {
                    return Ok(MenuOutcome::Ignored);
                }
                workspace
                    .state
                    .start_creating(child_type, Some(node_id.as_str()));
                MenuOutcome::Editing
            }
            MenuAction::Rename => {
                if self.start_rename(workspace, &node_id) {
                    MenuOutcome::Editing
                } else {
                    MenuOutcome::Ignored
                }
            }
            MenuAction::Delete => {
                if self.delete(workspace, &node_id, now)? {
                    MenuOutcome::Deleted
                } else {
                    MenuOutcome::Reported
                }
            }
        };
        Ok(outcome)
    }
}
