use std::time::Instant;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent};
use notedeck_app::App;
use notedeck_core::mode_gate::SubMode;
use notedeck_core::rubber_band::PointerTarget;
use tui_input::backend::crossterm::EventHandler;

use super::BrowserScreen;
use super::layout::cell_point;
use crate::UiExit;
use crate::keymap::{
    is_back, is_confirm, is_ctrl, is_delete, is_down, is_open, is_parent, is_quit, is_range_down,
    is_range_up, is_rename, is_toggle, is_up,
};
use crate::worker::CommitDispatcher;

impl BrowserScreen {
    pub(crate) fn on_key(
        &mut self,
        key: KeyEvent,
        app: &App<'_>,
        dispatcher: &dyn CommitDispatcher,
        now: Instant,
    ) -> Result<Option<UiExit>> {
        if self.workspace.state.warning().is_open() {
            if is_back(key) || is_confirm(key) {
                self.workspace.state.dismiss_warning();
            }
            return Ok(None);
        }

        if self.workspace.state.menu().is_some() {
            self.on_menu_key(key, app, now)?;
            return Ok(None);
        }

        if self.workspace.state.edits().current().is_some() {
            self.on_edit_key(key, dispatcher);
            return Ok(None);
        }

        self.notice = None;
        self.on_browse_key(key, app, now)
    }

    fn on_menu_key(&mut self, key: KeyEvent, app: &App<'_>, now: Instant) -> Result<()> {
        let actions = self.menu_actions();
        if is_back(key) {
            self.workspace.state.close_menu();
            self.menu_cursor = 0;
        } else if is_up(key) {
            self.menu_cursor = self.menu_cursor.saturating_sub(1);
        } else if is_down(key) {
            self.menu_cursor = (self.menu_cursor + 1).min(actions.len().saturating_sub(1));
        } else if is_confirm(key)
            && let Some(action) = actions.get(self.menu_cursor).copied()
        {
            self.invoke_menu(app, action, now)?;
        }
        Ok(())
    }

    fn on_edit_key(&mut self, key: KeyEvent, dispatcher: &dyn CommitDispatcher) {
        if self.workspace.state.edits().is_busy() {
            return;
        }

        if is_back(key) {
            self.workspace.state.cancel_edit();
            self.sync_input_with_edit();
            return;
        }

        if is_confirm(key) {
            self.commit_input(dispatcher);
            return;
        }

        if self.input.handle_event(&Event::Key(key)).is_some() {
            let value = self.input.value().to_string();
            self.workspace.state.set_draft(&value);
        }
    }

    fn on_browse_key(
        &mut self,
        key: KeyEvent,
        app: &App<'_>,
        now: Instant,
    ) -> Result<Option<UiExit>> {
        if is_quit(key) {
            return Ok(Some(UiExit::Completed));
        }

        if is_ctrl(key, 'a') {
            self.workspace.state.select_all(&self.workspace.tree);
            return Ok(None);
        }

        if is_back(key) {
            self.step_back();
            return Ok(None);
        }

        if is_range_up(key) || is_range_down(key) {
            self.move_cursor(is_range_down(key));
            if let Some(id) = self.cursor_id() {
                self.workspace.state.range_select(&self.workspace.tree, &id);
            }
            return Ok(None);
        }

        if is_up(key) || is_down(key) {
            self.move_cursor(is_down(key));
            return Ok(None);
        }

        if is_open(key) {
            self.open_cursor();
            return Ok(None);
        }

        if is_parent(key) {
            if self.workspace.state.navigate_up() {
                self.after_navigation();
            }
            return Ok(None);
        }

        if is_toggle(key) {
            self.toggle_cursor();
            return Ok(None);
        }

        if is_rename(key) {
            self.rename_cursor(app);
            return Ok(None);
        }

        if is_delete(key) {
            self.delete_cursor(app, now)?;
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('~') => {
                self.workspace.state.navigate_home();
                self.after_navigation();
            }
            KeyCode::Char('n') => {
                if app.start_create_here(&mut self.workspace) {
                    self.sync_input_with_edit();
                } else {
                    self.notice = Some("You cannot create items here.".to_string());
                }
            }
            KeyCode::Char('m') => self.open_cursor_menu(app),
            KeyCode::Char('v') => self.toggle_selection_mode(),
            KeyCode::Char('t') => {
                let next = match self.workspace.state.mode().sub_mode() {
                    SubMode::Process => SubMode::Retract,
                    SubMode::Retract => SubMode::Process,
                };
                self.workspace.state.set_sub_mode(next);
            }
            KeyCode::Char('s') => self.run_batch(app, now),
            KeyCode::Char('x') => {
                let count = self.workspace.state.cut_selection(&self.workspace.tree);
                self.notice = Some(clipboard_notice("Cut", count));
            }
            KeyCode::Char('y') => {
                let count = self.workspace.state.copy_selection(&self.workspace.tree);
                self.notice = Some(clipboard_notice("Copied", count));
            }
            KeyCode::Char('g') | KeyCode::F(5) => {
                app.refresh(&mut self.workspace)?;
                self.clamp_cursor();
            }
            _ => {}
        }
        Ok(None)
    }

    /// Esc peels one layer: selection mode, then the selection, then one level of the path.
    fn step_back(&mut self) {
        if self.workspace.state.mode().is_active() {
            self.workspace.state.exit_selection_mode();
        } else if !self.workspace.state.selection().is_empty() {
            self.workspace.state.clear_selection();
        } else if self.workspace.state.navigate_up() {
            self.after_navigation();
        }
    }

    pub(crate) fn move_cursor(&mut self, down: bool) {
        let len = self.listing().len();
        if len == 0 {
            return;
        }
        self.cursor = if down {
            (self.cursor + 1).min(len - 1)
        } else {
            self.cursor.saturating_sub(1)
        };
    }

    fn toggle_cursor(&mut self) {
        let Some(node) = self.cursor_node() else {
            return;
        };
        let (id, label) = (node.id.clone(), node.label.clone());
        if !self.workspace.state.toggle_select(&self.workspace.tree, &id) {
            let sub_mode = self.workspace.state.mode().sub_mode();
            self.notice = Some(format!("'{label}' cannot be selected to {sub_mode}."));
        }
    }

    fn rename_cursor(&mut self, app: &App<'_>) {
        let Some(id) = self.cursor_id() else {
            return;
        };
        if app.start_rename(&mut self.workspace, &id) {
            self.sync_input_with_edit();
        } else {
            self.notice = Some("You cannot rename this item.".to_string());
        }
    }

    fn delete_cursor(&mut self, app: &App<'_>, now: Instant) -> Result<()> {
        let Some(id) = self.cursor_id() else {
            return Ok(());
        };
        let deleted = app.delete(&mut self.workspace, &id, now)?;
        if !deleted && !self.workspace.state.warning().is_open() {
            self.notice = Some("You cannot delete this item.".to_string());
        }
        self.clamp_cursor();
        Ok(())
    }

    fn open_cursor_menu(&mut self, app: &App<'_>) {
        let Some(hit) = self
            .hits
            .rows
            .iter()
            .find(|hit| hit.index == self.cursor)
            .cloned()
        else {
            return;
        };
        let anchor = cell_point(hit.item.x.saturating_add(2), hit.row.y.saturating_add(1));
        self.workspace.state.pointer_down(PointerTarget::Interactive, anchor);
        if app.open_menu(&mut self.workspace, &hit.id, anchor) {
            self.menu_cursor = 0;
        } else {
            self.notice = Some("No actions here. Press v for selection mode.".to_string());
        }
    }

    fn toggle_selection_mode(&mut self) {
        if self.workspace.state.mode().is_active() {
            self.workspace.state.exit_selection_mode();
        } else if !self.workspace.state.enter_selection_mode(SubMode::Process) {
            self.notice = Some("Selection mode is only available inside a module.".to_string());
        }
    }

    fn run_batch(&mut self, app: &App<'_>, now: Instant) {
        let mode = *self.workspace.state.mode();
        if !mode.is_active() {
            self.notice = Some("Press v to enter selection mode first.".to_string());
            return;
        }

        let result = match mode.sub_mode() {
            SubMode::Process => app.submit_selection(&mut self.workspace),
            SubMode::Retract => app.retract_selection(&mut self.workspace),
        };
        match result {
            Ok(outcome) => {
                let accepted = outcome.report.accepted.len();
                let noun = if accepted == 1 { "note" } else { "notes" };
                self.notice = Some(match outcome.sub_mode {
                    SubMode::Process => format!("Submitted {accepted} {noun} for processing."),
                    SubMode::Retract => format!("Retracted {accepted} {noun} from processing."),
                });
                self.clamp_cursor();
            }
            Err(error) => {
                self.workspace.state.report_error(&format!("{error:#}"), now);
            }
        }
    }
}

fn clipboard_notice(verb: &str, count: usize) -> String {
    match count {
        0 => "Nothing selected.".to_string(),
        1 => format!("{verb} 1 item."),
        _ => format!("{verb} {count} items."),
    }
}
