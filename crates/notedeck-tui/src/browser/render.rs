use std::time::Instant;

use notedeck_core::clipboard::ClipMode;
use notedeck_core::edit::TransientEdit;
use notedeck_core::mode_gate::SubMode;
use notedeck_core::node::{Node, NodeType};
use notedeck_core::policy::Role;
use notedeck_core::time::display_date;
use notedeck_core::warning::WarningKind;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::BrowserScreen;
use super::layout::{CRUMB_SEPARATOR, MARKER_WIDTH, RowHit, bounds_rect};
use crate::theme;
use crate::ui::modal::{error_dialog, warning_dialog};
use crate::ui::text::{
    compact_hint, focus_line, key_hint_paragraph, label_value_line, truncate_to, wrapped_paragraph,
};

impl BrowserScreen {
    pub(crate) fn render(&mut self, frame: &mut Frame<'_>, role: Role, now: Instant) {
        self.relayout(frame.area());

        self.render_crumbs(frame, role);
        self.render_list(frame);
        self.render_band(frame);
        self.render_status(frame);
        frame.render_widget(
            key_hint_paragraph(self.key_hint(frame.area().width)).block(theme::key_block()),
            self.hits.areas.keys,
        );
        self.render_menu(frame);
        self.render_warning(frame, now);
    }

    pub(super) fn key_hint(&self, width: u16) -> &'static str {
        let state = &self.workspace.state;
        if state.menu().is_some() {
            return "Up/Down: move    Enter: run    Esc: close";
        }
        if state.edits().current().is_some() {
            return "Enter: save    Esc: cancel";
        }
        if state.mode().is_active() {
            return compact_hint(
                width,
                "Space: toggle    Shift+Up/Down: range    Ctrl+A: all    s: send    t: process/retract    Esc: leave",
                "Space: toggle    Ctrl+A: all    s: send    t: switch    Esc: leave",
                "Space  ^A  s  t  Esc",
            );
        }
        compact_hint(
            width,
            "Enter: open    Backspace: up    Space: select    n: new    r: rename    D: delete    m: menu    v: select mode    q: quit",
            "Enter: open    Bksp: up    Space: select    n/r/D: edit    m: menu    v: mode    q: quit",
            "Enter  Bksp  Space  n r D  m  v  q",
        )
    }

    fn render_crumbs(&self, frame: &mut Frame<'_>, role: Role) {
        let labels = self.workspace.state.navigator().breadcrumb_labels();
        let current = labels.len();
        let mut spans = Vec::with_capacity(current * 2 + 1);
        for (index, label) in std::iter::once("Home").chain(labels).enumerate() {
            if index > 0 {
                spans.push(Span::styled(CRUMB_SEPARATOR, theme::secondary_text()));
            }
            let style = if index == current {
                theme::focus_prompt()
            } else {
                Style::default()
            };
            spans.push(Span::styled(label.to_string(), style));
        }

        frame.render_widget(
            Paragraph::new(Line::from(spans)).block(theme::chrome(format!("Notedeck ({role})"))),
            self.hits.areas.crumbs,
        );
    }

    fn render_list(&self, frame: &mut Frame<'_>) {
        let listed = self.workspace.state.navigator().listed_type();
        let title = list_title(listed, self.listing().len(), self.workspace.state.selection().len());
        frame.render_widget(theme::chrome(title), self.hits.areas.list);

        if self.hits.rows.is_empty() && self.hits.create_row.is_none() {
            if self.hits.list.height > 0 {
                let area = Rect::new(self.hits.list.x, self.hits.list.y, self.hits.list.width, 1);
                frame.render_widget(
                    Paragraph::new(Span::styled(empty_message(listed), theme::secondary_text())),
                    area,
                );
            }
            return;
        }

        let editing = self.workspace.state.edits().current();
        for hit in &self.hits.rows {
            let Some(node) = self.listing().get(hit.index) else {
                continue;
            };
            match editing {
                Some(TransientEdit::Renaming { node_id, .. }) if *node_id == node.id => {
                    self.render_input_row(frame, hit.row, "[~] ");
                }
                _ => frame.render_widget(Paragraph::new(self.row_line(node, hit)), hit.row),
            }
        }

        if let Some(row) = self.hits.create_row {
            self.render_input_row(frame, row, "[+] ");
        }
    }

    fn row_line(&self, node: &Node, hit: &RowHit) -> Line<'static> {
        let state = &self.workspace.state;
        let selected = state.selection().contains(&node.id);
        let eligible = !state.mode().is_active() || state.mode().admits(&self.workspace.tree, &node.id);

        let style = if hit.index == self.cursor {
            theme::row_highlight()
        } else if selected {
            theme::selected_row()
        } else if !eligible {
            theme::secondary_text()
        } else {
            Style::default()
        };

        let (detail, detail_style) = row_detail(node);
        let width = usize::from(hit.row.width);
        let detail_width = detail.chars().count();
        let label_room = width
            .saturating_sub(usize::from(MARKER_WIDTH))
            .saturating_sub(detail_width + 1);
        let label = truncate_to(&node.label, label_room);
        let padding = width
            .saturating_sub(usize::from(MARKER_WIDTH) + label.chars().count() + detail_width);

        let marker = if selected { "[x] " } else { "[ ] " };
        let mut spans = vec![
            Span::styled(marker, style),
            Span::styled(label, style),
            Span::styled(" ".repeat(padding), style),
        ];
        if padding > 0 {
            spans.push(Span::styled(detail, detail_style.patch(style)));
        }
        Line::from(spans)
    }

    fn render_input_row(&self, frame: &mut Frame<'_>, row: Rect, marker: &'static str) {
        let marker_width = MARKER_WIDTH.min(row.width);
        frame.render_widget(
            Paragraph::new(Span::styled(marker, theme::focus_prompt())),
            Rect::new(row.x, row.y, marker_width, 1),
        );

        let input_area = Rect::new(row.x + marker_width, row.y, row.width - marker_width, 1);
        let width = usize::from(input_area.width);
        if width == 0 {
            return;
        }

        let value = self.input.value();
        if value.is_empty() {
            let placeholder = self
                .workspace
                .state
                .edits()
                .current()
                .map(TransientEdit::placeholder)
                .unwrap_or_default();
            frame.render_widget(
                Paragraph::new(Span::styled(placeholder.to_string(), theme::secondary_text())),
                input_area,
            );
        } else {
            let scroll = self.input.visual_scroll(width);
            frame.render_widget(
                Paragraph::new(value.to_string()).scroll((0, scroll as u16)),
                input_area,
            );
        }

        if !self.workspace.state.edits().is_busy() {
            let scroll = self.input.visual_scroll(width);
            let visual = self.input.visual_cursor();
            let relative = visual.saturating_sub(scroll).min(width.saturating_sub(1));
            frame.set_cursor_position((input_area.x + relative as u16, input_area.y));
        }
    }

    fn render_band(&self, frame: &mut Frame<'_>) {
        let Some(bounds) = self.workspace.state.drag().live_bounds() else {
            return;
        };
        let area = bounds_rect(bounds, self.hits.list);
        if area.width < 2 || area.height < 2 {
            return;
        }
        frame.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::band()),
            area,
        );
    }

    fn render_status(&self, frame: &mut Frame<'_>) {
        let state = &self.workspace.state;
        let line = if let Some(pending) = self.pending.last() {
            focus_line(format!("Saving '{}'…", pending.job.label()))
        } else if state.mode().is_active() {
            let sub_mode = state.mode().sub_mode();
            let verb = match sub_mode {
                SubMode::Process => "submit",
                SubMode::Retract => "retract",
            };
            Line::from(vec![
                Span::styled(format!("Selecting to {sub_mode}"), theme::warning_prompt()),
                Span::raw(format!(
                    "  {} selected, s to {verb}",
                    state.selection().len()
                )),
            ])
        } else if let Some(notice) = &self.notice {
            Line::from(notice.clone())
        } else if let Some(payload) = state.clipboard().payload() {
            let verb = match payload.mode {
                ClipMode::Cut => "cut",
                ClipMode::Copy => "copied",
            };
            label_value_line("clipboard", format!("{} {verb}", payload.node_ids.len()))
        } else {
            Line::from(Span::styled(
                format!("{} selected", state.selection().len()),
                theme::secondary_text(),
            ))
        };

        frame.render_widget(
            wrapped_paragraph(line).block(theme::chrome("Status")),
            self.hits.areas.status,
        );
    }

    fn render_menu(&self, frame: &mut Frame<'_>) {
        let Some(menu) = &self.hits.menu else {
            return;
        };
        frame.render_widget(Clear, menu.area);
        frame.render_widget(theme::chrome("Actions"), menu.area);

        let mut action_index = 0;
        for (row, action) in &menu.rows {
            let line = match action {
                Some(action) => {
                    let style = if action_index == self.menu_cursor {
                        theme::row_highlight()
                    } else {
                        Style::default()
                    };
                    action_index += 1;
                    Line::from(Span::styled(format!(" {}", action.label()), style))
                }
                None => Line::from(Span::styled(
                    "─".repeat(usize::from(row.width)),
                    theme::secondary_text(),
                )),
            };
            frame.render_widget(Paragraph::new(line), *row);
        }
    }

    fn render_warning(&self, frame: &mut Frame<'_>, now: Instant) {
        let state = &self.workspace.state;
        let Some(warning) = state.warning().current() else {
            return;
        };
        let seconds = state
            .warning()
            .timer()
            .map(|timer| timer.remaining(now).as_secs_f64().ceil() as u64)
            .unwrap_or_default();
        let footer = format!("Enter/Esc: dismiss    Closes in {seconds}s");

        match warning.kind {
            WarningKind::Duplicate => warning_dialog(
                frame,
                "Name already taken",
                &format!("{}\nPick a different name.", warning.message),
                &footer,
            ),
            WarningKind::Error => {
                error_dialog(frame, "Operation failed", &warning.message, &footer);
            }
        }
    }
}

fn list_title(listed: Option<NodeType>, count: usize, selected: usize) -> String {
    let noun = match listed {
        Some(NodeType::Department) => "Departments",
        Some(NodeType::Semester) => "Semesters",
        Some(NodeType::Subject) => "Subjects",
        Some(NodeType::Module) => "Modules",
        Some(NodeType::Note) | None => "Notes",
    };
    if selected == 0 {
        format!("{noun} ({count})")
    } else {
        format!("{noun} ({count}, {selected} selected)")
    }
}

fn empty_message(listed: Option<NodeType>) -> String {
    match listed {
        Some(node_type) => format!("No {node_type}s yet."),
        None => "Nothing here.".to_string(),
    }
}

/// Right-hand column: the processing status for notes, the note count for modules, the last
/// update date otherwise.
fn row_detail(node: &Node) -> (String, Style) {
    match node.node_type {
        NodeType::Note => (node.status().to_string(), theme::status(node.status())),
        NodeType::Module => {
            let count = node.meta.note_count.unwrap_or(0);
            let noun = if count == 1 { "note" } else { "notes" };
            (format!("{count} {noun}"), theme::secondary_text())
        }
        _ => (display_date(&node.meta.updated_at), theme::secondary_text()),
    }
}
