mod browser;
mod keymap;
mod theme;
mod ui;
mod worker;

use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use notedeck_app::App;
use notedeck_core::explorer::ExplorerSettings;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, info};

use crate::browser::BrowserScreen;
use crate::ui::modal::error_dialog;
use crate::worker::{CommitDispatcher, ScopedWorker};

const TICK_RATE: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiExit {
    Completed,
    Canceled,
}

/// Terminal mode changes made on entry, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetupStep {
    RawMode,
    AltScreen,
    MouseCapture,
}

const SETUP_ORDER: [SetupStep; 3] = [
    SetupStep::RawMode,
    SetupStep::AltScreen,
    SetupStep::MouseCapture,
];

impl SetupStep {
    fn undo_label(self) -> &'static str {
        match self {
            Self::RawMode => "disable raw mode",
            Self::AltScreen => "restore the main screen",
            Self::MouseCapture => "disable mouse capture",
        }
    }
}

trait TerminalOps {
    type Terminal;

    fn apply(&mut self, step: SetupStep) -> Result<()>;
    fn undo(&mut self, step: SetupStep) -> Result<()>;
    fn create_terminal(&mut self) -> Result<Self::Terminal>;
}

struct CrosstermOps;

impl TerminalOps for CrosstermOps {
    type Terminal = Terminal<CrosstermBackend<Stdout>>;

    fn apply(&mut self, step: SetupStep) -> Result<()> {
        let mut out = stdout();
        match step {
            SetupStep::RawMode => enable_raw_mode().context("failed to enable raw mode"),
            SetupStep::AltScreen => execute!(out, EnterAlternateScreen, Hide)
                .context("failed to enter alternate screen"),
            SetupStep::MouseCapture => {
                execute!(out, EnableMouseCapture).context("failed to enable mouse capture")
            }
        }
    }

    fn undo(&mut self, step: SetupStep) -> Result<()> {
        let mut out = stdout();
        match step {
            SetupStep::RawMode => disable_raw_mode().context("failed to disable raw mode"),
            SetupStep::AltScreen => execute!(out, Show, LeaveAlternateScreen)
                .context("failed to leave alternate screen"),
            SetupStep::MouseCapture => {
                execute!(out, DisableMouseCapture).context("failed to disable mouse capture")
            }
        }
    }

    fn create_terminal(&mut self) -> Result<Self::Terminal> {
        Terminal::new(CrosstermBackend::new(stdout()))
            .context("failed to create terminal backend")
    }
}

pub(crate) struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    pub(crate) fn enter() -> Result<Self> {
        let terminal = enter_with_ops(&mut CrosstermOps)?;
        Ok(Self { terminal })
    }

    pub(crate) fn draw<F>(&mut self, draw_fn: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame<'_>),
    {
        self.terminal
            .draw(draw_fn)
            .context("failed to render terminal")?;
        Ok(())
    }

    pub(crate) fn autoresize(&mut self) -> Result<()> {
        self.terminal
            .autoresize()
            .context("failed to autoresize terminal")?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        leave_with_ops(&mut CrosstermOps);
    }
}

/// Applies every setup step, then creates the terminal. A failure undoes the steps that
/// already took effect, newest first.
fn enter_with_ops<O: TerminalOps>(ops: &mut O) -> Result<O::Terminal> {
    let mut applied = Vec::with_capacity(SETUP_ORDER.len());
    for step in SETUP_ORDER {
        if let Err(error) = ops.apply(step) {
            return Err(failure_with_rollback(ops, &applied, error));
        }
        applied.push(step);
    }

    match ops.create_terminal() {
        Ok(terminal) => Ok(terminal),
        Err(error) => Err(failure_with_rollback(ops, &applied, error)),
    }
}

fn failure_with_rollback<O: TerminalOps>(
    ops: &mut O,
    applied: &[SetupStep],
    setup_error: anyhow::Error,
) -> anyhow::Error {
    let failures: Vec<String> = applied
        .iter()
        .rev()
        .filter_map(|step| {
            ops.undo(*step).err().map(|error| {
                format!(
                    "failed to {} during rollback: {error:#}",
                    step.undo_label()
                )
            })
        })
        .collect();

    if failures.is_empty() {
        setup_error
    } else {
        anyhow!(
            "{setup_error:#}\nterminal rollback cleanup failed: {}",
            failures.join("\n")
        )
    }
}

/// Best-effort teardown of every setup step, newest first.
fn leave_with_ops<O: TerminalOps>(ops: &mut O) {
    for step in SETUP_ORDER.iter().rev() {
        let _ = ops.undo(*step);
    }
}

pub(crate) fn is_ctrl_c(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Runs the explorer until the user quits. Commits run on scoped worker threads so the
/// collaborators can stay borrowed.
pub fn run_browser(app: &App<'_>, settings: ExplorerSettings) -> Result<UiExit> {
    let workspace = app.open_workspace(settings)?;
    let mut screen = BrowserScreen::new(workspace);
    let mut session = TerminalSession::enter()?;
    info!(role = %app.role(), "explorer opened");

    let exit = std::thread::scope(|scope| {
        let worker = ScopedWorker::new(scope, app.mutations);
        run_loop(&mut session, &mut screen, app, &worker)
    })?;
    info!(?exit, "explorer closed");
    Ok(exit)
}

fn run_loop(
    session: &mut TerminalSession,
    screen: &mut BrowserScreen,
    app: &App<'_>,
    dispatcher: &dyn CommitDispatcher,
) -> Result<UiExit> {
    let mut global_error: Option<String> = None;

    loop {
        let now = Instant::now();
        session.draw(|frame| {
            screen.render(frame, app.role(), now);
            if let Some(message) = global_error.as_deref() {
                render_global_error(frame, message);
            }
        })?;

        let has_event = event::poll(TICK_RATE).context("failed to poll terminal event")?;
        if !has_event {
            if let Err(error) = screen.on_tick(app, Instant::now()) {
                global_error = Some(format!("{error:#}"));
            }
            continue;
        }

        let event = event::read().context("failed to read terminal event")?;
        let key = match event {
            Event::Resize(_, _) => {
                session.autoresize()?;
                continue;
            }
            Event::Mouse(mouse) => {
                if global_error.is_none()
                    && let Err(error) = screen.on_mouse(mouse, app, Instant::now())
                {
                    global_error = Some(format!("{error:#}"));
                }
                continue;
            }
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press) => key,
            _ => continue,
        };

        if is_ctrl_c(key) {
            debug!("explorer interrupted");
            return Ok(UiExit::Canceled);
        }

        if global_error.is_some() {
            if keymap::is_confirm(key) || keymap::is_back(key) {
                global_error = None;
            }
            continue;
        }

        match screen.on_key(key, app, dispatcher, Instant::now()) {
            Ok(Some(exit)) => return Ok(exit),
            Ok(None) => {}
            Err(error) => global_error = Some(format!("{error:#}")),
        }

        if global_error.is_none()
            && let Err(error) = screen.on_tick(app, Instant::now())
        {
            global_error = Some(format!("{error:#}"));
        }
    }
}

fn render_global_error(frame: &mut ratatui::Frame<'_>, message: &str) {
    error_dialog(frame, "Error", message, "Enter/Esc: continue");
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, anyhow};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::{SetupStep, TerminalOps, enter_with_ops, is_ctrl_c, leave_with_ops};

    /// Records every call and fails the steps it is told to.
    #[derive(Default)]
    struct RecordingOps {
        calls: Vec<String>,
        failing_apply: Option<SetupStep>,
        failing_undo: Vec<SetupStep>,
        fail_create: bool,
    }

    impl TerminalOps for RecordingOps {
        type Terminal = &'static str;

        fn apply(&mut self, step: SetupStep) -> Result<()> {
            self.calls.push(format!("apply {step:?}"));
            if self.failing_apply == Some(step) {
                return Err(anyhow!("{step:?} failed"));
            }
            Ok(())
        }

        fn undo(&mut self, step: SetupStep) -> Result<()> {
            self.calls.push(format!("undo {step:?}"));
            if self.failing_undo.contains(&step) {
                return Err(anyhow!("undo {step:?} failed"));
            }
            Ok(())
        }

        fn create_terminal(&mut self) -> Result<Self::Terminal> {
            self.calls.push("create".to_string());
            if self.fail_create {
                return Err(anyhow!("create terminal failed"));
            }
            Ok("terminal")
        }
    }

    #[test]
    fn ctrl_c_needs_the_modifier() {
        assert!(is_ctrl_c(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!is_ctrl_c(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn enter_applies_steps_in_order_then_creates_terminal() {
        let mut ops = RecordingOps::default();
        let terminal = enter_with_ops(&mut ops).expect("enter");

        assert_eq!(terminal, "terminal");
        assert_eq!(
            ops.calls,
            vec![
                "apply RawMode",
                "apply AltScreen",
                "apply MouseCapture",
                "create"
            ]
        );
    }

    #[test]
    fn failed_alt_screen_only_undoes_raw_mode() {
        let mut ops = RecordingOps {
            failing_apply: Some(SetupStep::AltScreen),
            ..RecordingOps::default()
        };
        let error = enter_with_ops(&mut ops).expect_err("enter should fail");

        assert_eq!(
            ops.calls,
            vec!["apply RawMode", "apply AltScreen", "undo RawMode"]
        );
        assert!(format!("{error:#}").contains("AltScreen failed"));
    }

    #[test]
    fn failed_terminal_creation_undoes_everything_newest_first() {
        let mut ops = RecordingOps {
            fail_create: true,
            ..RecordingOps::default()
        };
        enter_with_ops(&mut ops).expect_err("enter should fail");

        assert_eq!(
            &ops.calls[4..],
            ["undo MouseCapture", "undo AltScreen", "undo RawMode"]
        );
    }

    #[test]
    fn rollback_keeps_going_and_reports_every_cleanup_failure() {
        let mut ops = RecordingOps {
            fail_create: true,
            failing_undo: vec![SetupStep::MouseCapture, SetupStep::RawMode],
            ..RecordingOps::default()
        };
        let error = enter_with_ops(&mut ops).expect_err("enter should fail");

        let message = format!("{error:#}");
        assert!(message.contains("create terminal failed"));
        assert!(message.contains("failed to disable mouse capture during rollback"));
        assert!(message.contains("failed to disable raw mode during rollback"));
        assert!(!message.contains("restore the main screen"));
        assert_eq!(ops.calls.len(), 7);
    }

    #[test]
    fn leave_undoes_mouse_before_screen_and_raw_mode() {
        let mut ops = RecordingOps {
            failing_undo: vec![SetupStep::AltScreen],
            ..RecordingOps::default()
        };
        leave_with_ops(&mut ops);

        assert_eq!(
            ops.calls,
            vec!["undo MouseCapture", "undo AltScreen", "undo RawMode"]
        );
    }
}
