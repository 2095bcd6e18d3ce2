use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Clear;

use crate::theme;
use crate::ui::text::{wrapped_line_count, wrapped_paragraph};

const MIN_WIDTH: u16 = 36;
const MAX_WIDTH: u16 = 72;
/// Borders plus the blank line above the footer.
const CHROME_ROWS: u16 = 3;

/// A modal sized to its message, with its key hint as the last inner row.
pub(crate) struct Dialog<'a> {
    pub(crate) title: &'a str,
    pub(crate) title_style: Style,
    pub(crate) message: &'a str,
    pub(crate) footer: &'a str,
}

pub(crate) fn render_dialog(frame: &mut Frame<'_>, dialog: Dialog<'_>) {
    let message = dialog.message.trim_end();
    let area = dialog_area(frame.area(), message, dialog.footer);

    let mut lines: Vec<Line<'_>> = message.lines().map(Line::from).collect();
    if lines.is_empty() {
        lines.push(Line::from(""));
    }
    let inner_width = area.width.saturating_sub(2).max(1) as usize;
    let body_rows = wrapped_line_count(message, inner_width);
    let spare = area
        .height
        .saturating_sub(CHROME_ROWS + body_rows + wrapped_line_count(dialog.footer, inner_width));
    lines.extend(std::iter::repeat_n(Line::from(""), usize::from(spare) + 1));
    lines.push(Line::from(Span::styled(dialog.footer, theme::secondary_text())));

    let title = Line::from(Span::styled(dialog.title, dialog.title_style));
    frame.render_widget(Clear, area);
    frame.render_widget(
        wrapped_paragraph(Text::from(lines)).block(theme::chrome(title)),
        area,
    );
}

pub(crate) fn warning_dialog(frame: &mut Frame<'_>, title: &str, message: &str, footer: &str) {
    render_dialog(
        frame,
        Dialog {
            title,
            title_style: theme::warning_prompt(),
            message,
            footer,
        },
    );
}

pub(crate) fn error_dialog(frame: &mut Frame<'_>, title: &str, message: &str, footer: &str) {
    render_dialog(
        frame,
        Dialog {
            title,
            title_style: theme::error_prompt(),
            message,
            footer,
        },
    );
}

/// Centres a box wide enough for the longest line (within bounds) and tall
/// enough for the wrapped message and footer, clamped to `screen`.
fn dialog_area(screen: Rect, message: &str, footer: &str) -> Rect {
    let longest = message
        .lines()
        .chain(std::iter::once(footer))
        .map(|line| line.chars().count())
        .max()
        .unwrap_or_default();
    let wanted = u16::try_from(longest)
        .unwrap_or(u16::MAX)
        .saturating_add(4)
        .clamp(MIN_WIDTH, MAX_WIDTH);
    let width = wanted.min(screen.width);

    let inner_width = width.saturating_sub(2).max(1) as usize;
    let rows = wrapped_line_count(message, inner_width)
        .saturating_add(wrapped_line_count(footer, inner_width))
        .saturating_add(CHROME_ROWS);
    let height = rows.min(screen.height);

    Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + (screen.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;

    use super::{dialog_area, warning_dialog};

    #[test]
    fn short_messages_get_the_minimum_width() {
        let area = dialog_area(Rect::new(0, 0, 100, 30), "Saved.", "Enter: ok");
        assert_eq!(area.width, 36);
        assert_eq!(area.height, 5);
        assert_eq!(area.x, 32);
    }

    #[test]
    fn long_lines_wrap_inside_the_maximum_width() {
        let message = "x".repeat(140);
        let area = dialog_area(Rect::new(0, 0, 100, 30), &message, "Enter: ok");
        assert_eq!(area.width, 72);
        assert_eq!(area.height, 3 + 2 + 1);
    }

    #[test]
    fn small_screens_clamp_the_dialog() {
        let screen = Rect::new(2, 1, 20, 4);
        let area = dialog_area(screen, "An item named 'Week 1' already exists here.", "Esc");
        assert_eq!(area, screen);
    }

    #[test]
    fn footer_sits_on_the_last_inner_row() {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).expect("terminal");
        terminal
            .draw(|frame| {
                warning_dialog(frame, "Heads up", "One line.", "Closes in 5s");
            })
            .expect("draw");

        let rendered = format!("{}", terminal.backend());
        let rows: Vec<&str> = rendered.lines().collect();
        let footer_row = rows
            .iter()
            .position(|row| row.contains("Closes in 5s"))
            .expect("footer row");
        assert!(rows[footer_row + 1].contains('└'));
        assert!(rows.iter().any(|row| row.contains("Heads up")));
    }
}
