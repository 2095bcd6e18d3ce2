use anyhow::{Context, Result};
use comfy_table::{Cell, ContentArrangement, Table};
use notedeck_app::{App, InitRequest, ReadyConfig, TreeRow, ensure_config_ready, initialize};
use notedeck_core::collab::StaticSession;
use notedeck_core::config::resolve_config_path;
use notedeck_core::doctor::DoctorReport;
use notedeck_core::library::LibraryStore;
use notedeck_core::policy::Role;
use notedeck_tui::UiExit;
use tracing::info;

use crate::cli::{Cli, Command};

pub fn run_with_deps(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Doctor) => run_doctor_command(),
        Some(Command::Init { force, sample }) => run_init_command(force, sample, cli.role),
        Some(Command::Tree) => run_tree_command(cli.role),
        None => run_browse_command(cli.role),
    }
}

fn run_browse_command(role: Option<Role>) -> Result<()> {
    let ready = ensure_config_ready()?;
    let store = LibraryStore::new(ready.library_path());
    let session = session_for(&ready, role);
    let app = App::new(&store, &store, &store, &session);

    let exit = notedeck_tui::run_browser(&app, ready.config.explorer_settings())?;
    if exit == UiExit::Canceled {
        info!("explorer canceled with ctrl-c");
    }
    Ok(())
}

fn run_tree_command(role: Option<Role>) -> Result<()> {
    let ready = ensure_config_ready()?;
    let store = LibraryStore::new(ready.library_path());
    let session = session_for(&ready, role);
    let app = App::new(&store, &store, &store, &session);

    let rows = app.tree_rows()?;
    if rows.is_empty() {
        println!("The library is empty.");
        return Ok(());
    }
    println!("{}", tree_table(&rows));
    Ok(())
}

fn run_init_command(force: bool, sample: bool, role: Option<Role>) -> Result<()> {
    let config_path = resolve_config_path().context("failed to resolve config path")?;
    let result = initialize(&InitRequest {
        config_path,
        force,
        sample,
        role,
    })?;

    println!("Wrote config to {}", result.config_path.display());
    println!(
        "Library at {} ({} nodes)",
        result.library_path.display(),
        result.seeded_nodes
    );
    Ok(())
}

fn run_doctor_command() -> Result<()> {
    let report = notedeck_app::doctor();
    print_doctor_report(&report);
    Ok(())
}

fn session_for(ready: &ReadyConfig, role: Option<Role>) -> StaticSession {
    StaticSession::new(role.unwrap_or(ready.config.session.role))
}

fn tree_table(rows: &[TreeRow]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Type", "Status", "Updated", "Id"]);

    for row in rows {
        let status = row.status.map(|status| status.to_string()).unwrap_or_default();
        table.add_row(vec![
            Cell::new(row.indented_label()),
            Cell::new(row.node_type),
            Cell::new(status),
            Cell::new(row.updated.as_str()),
            Cell::new(row.id.as_str()),
        ]);
    }
    table
}

fn print_doctor_report(report: &DoctorReport) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Check", "Status", "Details"]);

    for check in &report.checks {
        table.add_row(vec![
            Cell::new(check.name.as_str()),
            Cell::new(check.state),
            Cell::new(check.details.as_str()),
        ]);
    }

    println!("{table}");
    println!("{}", report.summary());
}
