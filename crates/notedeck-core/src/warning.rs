use std::time::{Duration, Instant};

pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    Duplicate,
    Error,
}

/// Auto-dismiss deadline. Owned by exactly one open warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissTimer {
    deadline: Instant,
}

impl DismissTimer {
    fn start(now: Instant, after: Duration) -> Self {
        Self {
            deadline: now + after,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    pub subject_name: Option<String>,
}

/// Self-dismissing warning dialog. Opening a warning replaces the previous one and its timer.
#[derive(Debug, Clone)]
pub struct WarningDialog {
    dismiss_after: Duration,
    warning: Option<Warning>,
    timer: Option<DismissTimer>,
}

impl Default for WarningDialog {
    fn default() -> Self {
        Self::new(DEFAULT_DISMISS_AFTER)
    }
}

impl WarningDialog {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            dismiss_after,
            warning: None,
            timer: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.warning.is_some()
    }

    pub fn current(&self) -> Option<&Warning> {
        self.warning.as_ref()
    }

    pub fn timer(&self) -> Option<&DismissTimer> {
        self.timer.as_ref()
    }

    pub fn dismiss_after(&self) -> Duration {
        self.dismiss_after
    }

    pub fn open_duplicate(&mut self, name: &str, now: Instant) {
        self.open(
            Warning {
                kind: WarningKind::Duplicate,
                message: format!("An item named '{name}' already exists here."),
                subject_name: Some(name.to_string()),
            },
            now,
        );
    }

    pub fn open_error(&mut self, message: &str, now: Instant) {
        self.open(
            Warning {
                kind: WarningKind::Error,
                message: message.to_string(),
                subject_name: None,
            },
            now,
        );
    }

    /// Closes the dialog once its deadline passed. Returns true only on the tick that closed it.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.timer {
            Some(timer) if now >= timer.deadline => {
                self.release();
                true
            }
            _ => false,
        }
    }

    /// Manual close; also used after a successful retry.
    pub fn dismiss(&mut self) -> bool {
        let was_open = self.is_open();
        self.release();
        was_open
    }

    fn open(&mut self, warning: Warning, now: Instant) {
        self.timer = Some(DismissTimer::start(now, self.dismiss_after));
        self.warning = Some(warning);
    }

    fn release(&mut self) {
        self.timer = None;
        self.warning = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_warning_names_subject() {
        let now = Instant::now();
        let mut dialog = WarningDialog::default();
        dialog.open_duplicate("Week 2", now);

        let warning = dialog.current().expect("open");
        assert_eq!(warning.kind, WarningKind::Duplicate);
        assert_eq!(warning.subject_name.as_deref(), Some("Week 2"));
        assert!(warning.message.contains("Week 2"));
        assert_eq!(
            dialog.timer().map(DismissTimer::deadline),
            Some(now + DEFAULT_DISMISS_AFTER)
        );
    }

    #[test]
    fn tick_closes_after_deadline_once() {
        let now = Instant::now();
        let mut dialog = WarningDialog::default();
        dialog.open_error("rename failed", now);

        assert!(!dialog.tick(now + Duration::from_secs(4)));
        assert!(dialog.is_open());
        assert!(dialog.tick(now + Duration::from_secs(5)));
        assert!(!dialog.is_open());
        assert!(!dialog.tick(now + Duration::from_secs(6)));
    }

    #[test]
    fn reopening_replaces_the_running_timer() {
        let now = Instant::now();
        let mut dialog = WarningDialog::default();
        dialog.open_duplicate("A", now);
        dialog.open_duplicate("B", now + Duration::from_secs(3));

        assert!(!dialog.tick(now + Duration::from_secs(5)));
        assert_eq!(
            dialog.current().and_then(|warning| warning.subject_name.as_deref()),
            Some("B")
        );
        assert!(dialog.tick(now + Duration::from_secs(8)));
    }

    #[test]
    fn dismiss_releases_timer() {
        let now = Instant::now();
        let mut dialog = WarningDialog::new(Duration::from_secs(2));
        dialog.open_error("boom", now);
        assert!(dialog.dismiss());
        assert!(dialog.timer().is_none());
        assert!(!dialog.tick(now + Duration::from_secs(10)));
        assert!(!dialog.dismiss());
    }

    #[test]
    fn remaining_saturates_at_zero() {
        let now = Instant::now();
        let mut dialog = WarningDialog::default();
        dialog.open_error("boom", now);
        let timer = dialog.timer().copied().expect("timer");
        assert_eq!(timer.remaining(now + Duration::from_secs(9)), Duration::ZERO);
    }
}
