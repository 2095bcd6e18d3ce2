use std::backtrace::Backtrace;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static HOOK_ONCE: Once = Once::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Filter used when RUST_LOG is unset.
const DIAGNOSTICS_FILTER: &str = "debug";
const CONSOLE_FILTER: &str = "warn";

/// Process-wide logging. With diagnostics on, every event goes to a fresh
/// `<config dir>/diagnostics/<epoch ms>.log`; otherwise warnings go to stderr, except while the
/// explorer owns the terminal.
pub struct DiagnosticsSession {
    path: Option<PathBuf>,
}

impl DiagnosticsSession {
    pub fn initialize(enabled: bool, interactive: bool) -> Result<Self> {
        install_panic_hook();

        if !enabled {
            if !interactive {
                let _ = tracing_subscriber::registry()
                    .with(env_filter(CONSOLE_FILTER))
                    .with(
                        fmt::layer()
                            .with_writer(std::io::stderr)
                            .with_target(false)
                            .without_time(),
                    )
                    .try_init();
            }
            return Ok(Self { path: None });
        }

        let path = create_diagnostics_log_path()?;
        let file = open_log(&path)?;
        tracing_subscriber::registry()
            .with(env_filter(DIAGNOSTICS_FILTER))
            .with(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_thread_names(true),
            )
            .try_init()
            .context("failed to install diagnostics logger")?;

        let _ = LOG_PATH.set(path.clone());
        info!(
            version = env!("CARGO_PKG_VERSION"),
            pid = std::process::id(),
            argv = ?std::env::args().collect::<Vec<String>>(),
            "notedeck diagnostics start"
        );

        Ok(Self { path: Some(path) })
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn open_log(path: &Path) -> Result<File> {
    let mut file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)
        .with_context(|| format!("failed to create diagnostics log at {}", path.display()))?;
    writeln!(file, "notedeck diagnostics, started at epoch ms {}", epoch_millis())
        .with_context(|| format!("failed to write diagnostics header to {}", path.display()))?;
    Ok(file)
}

fn install_panic_hook() {
    HOOK_ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|panic_info| {
            let payload = panic_payload(panic_info);
            let location = panic_info
                .location()
                .map(|value| format!("{}:{}:{}", value.file(), value.line(), value.column()))
                .unwrap_or_else(|| "unknown".to_string());
            let backtrace = Backtrace::force_capture();

            error!(
                message = %payload,
                location = %location,
                backtrace = %backtrace,
                "panic captured"
            );

            eprintln!("Fatal internal error in notedeck.");
            match LOG_PATH.get() {
                Some(path) => eprintln!("Diagnostics written to {}", path.display()),
                None => eprintln!("Run `notedeck --diagnostics` to capture a diagnostics log."),
            }
        }));
    });
}

fn panic_payload(panic_info: &std::panic::PanicHookInfo<'_>) -> String {
    if let Some(payload) = panic_info.payload().downcast_ref::<&str>() {
        return (*payload).to_string();
    }
    if let Some(payload) = panic_info.payload().downcast_ref::<String>() {
        return payload.clone();
    }
    "unknown panic payload".to_string()
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

fn create_diagnostics_log_path() -> Result<PathBuf> {
    let config_path = notedeck_core::config::resolve_config_path()
        .context("failed to resolve notedeck config path for diagnostics")?;
    let config_dir = config_path.parent().ok_or_else(|| {
        anyhow!(
            "failed to resolve diagnostics directory from config path {}",
            config_path.display()
        )
    })?;

    let diagnostics_dir = config_dir.join("diagnostics");
    fs::create_dir_all(&diagnostics_dir).with_context(|| {
        format!(
            "failed to create diagnostics directory {}",
            diagnostics_dir.display()
        )
    })?;

    Ok(diagnostics_dir.join(format!("{}.log", epoch_millis())))
}
