use std::fmt;
use std::path::Path;

use crate::config::{load_config, resolve_config_path};
use crate::library::LibraryStore;
use crate::tree::TreeIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Pass,
    Fail,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorCheck {
    pub name: String,
    pub state: CheckState,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    pub fn has_failures(&self) -> bool {
        self.checks
            .iter()
            .any(|check| check.state == CheckState::Fail)
    }

    pub fn summary(&self) -> String {
        let passed = self
            .checks
            .iter()
            .filter(|check| check.state == CheckState::Pass)
            .count();
        let failed = self.checks.len().saturating_sub(passed);
        format!("{passed} passed, {failed} failed")
    }
}

const CONFIG_EXISTS: &str = "config file exists";
const CONFIG_VALID: &str = "config parses and validates";
const LIBRARY_READABLE: &str = "library is readable";

pub fn run_doctor() -> DoctorReport {
    match resolve_config_path() {
        Ok(config_path) => run_doctor_at(&config_path),
        Err(error) => {
            let mut checks = vec![fail_check("config path resolves", error.to_string())];
            push_skipped_checks(
                &mut checks,
                &[CONFIG_EXISTS, CONFIG_VALID, LIBRARY_READABLE],
                "config path could not be resolved",
            );
            DoctorReport { checks }
        }
    }
}

pub fn run_doctor_at(config_path: &Path) -> DoctorReport {
    let mut checks = Vec::new();

    if !config_path.exists() {
        checks.push(fail_check(
            CONFIG_EXISTS,
            format!("expected at {}", config_path.display()),
        ));
        push_skipped_checks(
            &mut checks,
            &[CONFIG_VALID, LIBRARY_READABLE],
            "config file is missing",
        );
        return DoctorReport { checks };
    }

    checks.push(pass_check(
        CONFIG_EXISTS,
        format!("found at {}", config_path.display()),
    ));

    match load_config(config_path) {
        Ok(config) => {
            checks.push(pass_check(
                CONFIG_VALID,
                format!("role {}", config.session.role),
            ));
            checks.push(check_library(&config.library_path(config_path)));
        }
        Err(error) => {
            checks.push(fail_check(CONFIG_VALID, error.to_string()));
            checks.push(skipped_check(LIBRARY_READABLE, "config is invalid"));
        }
    }

    DoctorReport { checks }
}

fn check_library(path: &Path) -> DoctorCheck {
    let store = LibraryStore::new(path);
    match store.load_nodes() {
        Ok(_) if !path.exists() => pass_check(
            LIBRARY_READABLE,
            format!("no library at {} yet; starts empty", path.display()),
        ),
        Ok(nodes) => {
            let tree = TreeIndex::new(nodes);
            pass_check(
                LIBRARY_READABLE,
                format!("{} nodes in {}", tree.len(), path.display()),
            )
        }
        Err(error) => fail_check(LIBRARY_READABLE, error.to_string()),
    }
}

fn pass_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Pass,
        details: details.into(),
    }
}

fn fail_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Fail,
        details: details.into(),
    }
}

fn skipped_check(name: &str, reason: &str) -> DoctorCheck {
    fail_check(name, format!("skipped because {reason}"))
}

fn push_skipped_checks(checks: &mut Vec<DoctorCheck>, names: &[&str], reason: &str) {
    checks.extend(
        names
            .iter()
            .copied()
            .map(|name| skipped_check(name, reason)),
    );
}
