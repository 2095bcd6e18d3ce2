use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use notedeck_app::App;
use notedeck_core::rubber_band::PointerTarget;

use super::BrowserScreen;
use super::layout::{RowHit, cell_point, contains};

const DOUBLE_CLICK: Duration = Duration::from_millis(500);

impl BrowserScreen {
    pub(crate) fn on_mouse(&mut self, mouse: MouseEvent, app: &App<'_>, now: Instant) -> Result<()> {
        let (column, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.on_left_down(column, row, mouse.modifiers, app, now)?;
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.workspace.state.pointer_move(cell_point(column, row));
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let items = self.hits.item_bounds();
                self.workspace
                    .state
                    .pointer_up(&self.workspace.tree, cell_point(column, row), &items);
            }
            MouseEventKind::Down(MouseButton::Right) => self.on_right_down(column, row, app),
            MouseEventKind::ScrollDown if self.is_idle() => self.move_cursor(true),
            MouseEventKind::ScrollUp if self.is_idle() => self.move_cursor(false),
            _ => {}
        }
        Ok(())
    }

    /// No modal layer is in front of the listing.
    fn is_idle(&self) -> bool {
        let state = &self.workspace.state;
        !state.warning().is_open() && state.menu().is_none() && state.edits().current().is_none()
    }

    fn on_left_down(
        &mut self,
        column: u16,
        row: u16,
        modifiers: KeyModifiers,
        app: &App<'_>,
        now: Instant,
    ) -> Result<()> {
        if self.workspace.state.warning().is_open() {
            self.workspace.state.dismiss_warning();
            return Ok(());
        }

        if let Some(menu) = self.hits.menu.clone()
            && contains(menu.area, column, row)
        {
            let action = menu
                .rows
                .iter()
                .find(|(area, _)| contains(*area, column, row))
                .and_then(|(_, action)| *action);
            if let Some(action) = action {
                self.invoke_menu(app, action, now)?;
            }
            return Ok(());
        }

        if self.workspace.state.edits().current().is_some() {
            if !self.workspace.state.edits().is_busy() {
                self.workspace.state.cancel_edit();
                self.sync_input_with_edit();
            }
            return Ok(());
        }

        self.notice = None;
        let at = cell_point(column, row);

        if let Some(len) = self.hits.crumb_at(column, row) {
            self.workspace.state.pointer_down(PointerTarget::Interactive, at);
            if self.workspace.state.truncate_path(len) {
                self.after_navigation();
            }
            return Ok(());
        }

        let target = match self.hits.row_at(column, row).cloned() {
            Some(hit) if contains(hit.item, column, row) => {
                self.click_item(&hit, modifiers, now);
                PointerTarget::Item
            }
            Some(_) => PointerTarget::Background,
            None if self.hits.in_list(column, row) => PointerTarget::Background,
            None => PointerTarget::Interactive,
        };
        self.workspace.state.pointer_down(target, at);
        Ok(())
    }

    fn click_item(&mut self, hit: &RowHit, modifiers: KeyModifiers, now: Instant) {
        self.cursor = hit.index;
        let tree = &self.workspace.tree;

        if modifiers.contains(KeyModifiers::CONTROL) {
            self.workspace.state.toggle_select(tree, &hit.id);
            self.last_click = None;
            return;
        }
        if modifiers.contains(KeyModifiers::SHIFT) {
            self.workspace.state.range_select(tree, &hit.id);
            self.last_click = None;
            return;
        }

        let repeated = self.last_click.as_ref().is_some_and(|(id, at)| {
            *id == hit.id && now.saturating_duration_since(*at) <= DOUBLE_CLICK
        });
        if repeated {
            self.last_click = None;
            self.open_cursor();
            return;
        }

        self.workspace.state.select(tree, &hit.id);
        self.last_click = Some((hit.id.clone(), now));
    }

    fn on_right_down(&mut self, column: u16, row: u16, app: &App<'_>) {
        if !self.is_idle() {
            return;
        }
        let Some(hit) = self.hits.row_at(column, row).cloned() else {
            return;
        };
        self.cursor = hit.index;
        let at = cell_point(column, row);
        if app.open_menu(&mut self.workspace, &hit.id, at) {
            self.menu_cursor = 0;
        }
    }
}
