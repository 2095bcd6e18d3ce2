mod keys;
mod layout;
mod mouse;
mod render;

use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

use anyhow::Result;
use notedeck_app::{App, MenuOutcome, Workspace};
use notedeck_core::edit::{Resolution, TransientEdit};
use notedeck_core::menu::MenuAction;
use notedeck_core::node::Node;
use tracing::warn;
use tui_input::Input;

use crate::worker::{CommitDispatcher, CommitEvent, CommitJob};

use self::layout::HitMap;

struct PendingCommit {
    job: CommitJob,
    receiver: Receiver<CommitEvent>,
}

/// The explorer screen: breadcrumbs, the current listing, inline inputs, the context menu and
/// the selection-mode action bar.
pub(crate) struct BrowserScreen {
    workspace: Workspace,
    cursor: usize,
    input: Input,
    menu_cursor: usize,
    pending: Vec<PendingCommit>,
    notice: Option<String>,
    last_click: Option<(String, Instant)>,
    hits: HitMap,
}

impl BrowserScreen {
    pub(crate) fn new(workspace: Workspace) -> Self {
        Self {
            workspace,
            cursor: 0,
            input: Input::default(),
            menu_cursor: 0,
            pending: Vec::new(),
            notice: None,
            last_click: None,
            hits: HitMap::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Drains a finished commit and advances the warning timer.
    pub(crate) fn on_tick(&mut self, app: &App<'_>, now: Instant) -> Result<()> {
        self.drain_commits(app, now)?;
        self.workspace.state.tick(now);
        Ok(())
    }

    /// Applies every commit whose worker has answered. Results for edits that were closed in
    /// the meantime still reach the app, so a stored change always refreshes the tree.
    fn drain_commits(&mut self, app: &App<'_>, now: Instant) -> Result<()> {
        let mut waiting = Vec::with_capacity(self.pending.len());
        let mut finished = Vec::new();
        for pending in std::mem::take(&mut self.pending) {
            match pending.receiver.try_recv() {
                Ok(event) => finished.push(event),
                Err(TryRecvError::Empty) => waiting.push(pending),
                Err(TryRecvError::Disconnected) => {
                    warn!(token = pending.job.token(), "commit worker hung up without a result");
                    self.workspace
                        .state
                        .report_error("The save was interrupted. Please try again.", now);
                }
            }
        }
        self.pending = waiting;

        for event in finished {
            self.apply_commit(app, event, now)?;
        }
        Ok(())
    }

    fn apply_commit(&mut self, app: &App<'_>, event: CommitEvent, now: Instant) -> Result<()> {
        match event {
            CommitEvent::Renamed { commit, result } => {
                let resolution = app.finish_rename(&mut self.workspace, &commit, result, now)?;
                if let Resolution::Committed(node_id) = resolution {
                    self.focus_id(&node_id);
                }
            }
            CommitEvent::Created { commit, result } => {
                let resolution = app.finish_create(&mut self.workspace, &commit, result, now)?;
                if let Resolution::Committed(node) = resolution {
                    self.focus_id(&node.id);
                }
            }
        }
        self.clamp_cursor();
        Ok(())
    }

    /// Starts the commit for the open input. A blank or unchanged rename leaves it open.
    fn commit_input(&mut self, dispatcher: &dyn CommitDispatcher) {
        let value = self.input.value().to_string();
        let job = match self.workspace.state.edits().current() {
            Some(TransientEdit::Renaming { .. }) => self
                .workspace
                .state
                .begin_rename_commit(&value)
                .map(CommitJob::Rename),
            Some(TransientEdit::Creating { .. }) => self
                .workspace
                .state
                .begin_create_commit(&value)
                .map(CommitJob::Create),
            None => None,
        };

        if let Some(job) = job {
            let receiver = dispatcher.dispatch(job.clone());
            self.pending.push(PendingCommit { job, receiver });
        }
    }

    fn listing(&self) -> &[Node] {
        self.workspace.listing()
    }

    fn cursor_node(&self) -> Option<&Node> {
        self.listing().get(self.cursor)
    }

    fn cursor_id(&self) -> Option<String> {
        self.cursor_node().map(|node| node.id.clone())
    }

    fn focus_id(&mut self, id: &str) {
        if let Some(index) = self.listing().iter().position(|node| node.id == id) {
            self.cursor = index;
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.listing().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Resets per-view widget state after the store changed view.
    fn after_navigation(&mut self) {
        self.cursor = 0;
        self.last_click = None;
    }

    fn sync_input_with_edit(&mut self) {
        self.input = match self.workspace.state.edits().current() {
            Some(TransientEdit::Renaming { draft, .. }) => Input::new(draft.clone()),
            _ => Input::default(),
        };
    }

    fn open_cursor(&mut self) {
        let Some(node) = self.cursor_node() else {
            return;
        };
        if node.is_note() {
            self.notice = Some(open_note_notice(node));
            return;
        }
        let id = node.id.clone();
        if self.workspace.state.open(&self.workspace.tree, &id) {
            self.after_navigation();
        }
    }

    fn menu_actions(&self) -> Vec<MenuAction> {
        self.workspace
            .state
            .menu()
            .map(|menu| menu.actions().collect())
            .unwrap_or_default()
    }

    fn invoke_menu(&mut self, app: &App<'_>, action: MenuAction, now: Instant) -> Result<()> {
        let outcome = app.invoke_menu_action(&mut self.workspace, action, now)?;
        self.menu_cursor = 0;
        match outcome {
            MenuOutcome::Navigated => self.after_navigation(),
            MenuOutcome::Editing => {
                if self.workspace.state.edits().is_creating() {
                    self.after_navigation();
                }
                self.sync_input_with_edit();
            }
            MenuOutcome::OpenNote { node_id } => {
                if let Some(node) = self.workspace.tree.get(&node_id) {
                    self.notice = Some(open_note_notice(node));
                }
            }
            MenuOutcome::Download { filename } => {
                self.notice = Some(format!("Download started: {filename}"));
            }
            MenuOutcome::Deleted => self.clamp_cursor(),
            MenuOutcome::Ignored | MenuOutcome::Reported => {}
        }
        Ok(())
    }
}

fn open_note_notice(node: &Node) -> String {
    match node.meta.pdf_filename.as_deref() {
        Some(filename) if node.has_file() => format!("Opening {filename}"),
        _ => format!("'{}' has no file attached", node.label),
    }
}
