use std::sync::Arc;

use anyhow::Context;

use req_workbench::diagnostics::tracing_sink;
use req_workbench::logging::initialize_tracing;
use req_workbench::messaging::ConnectionStatus;
use req_workbench::navigation::ObservableVec;
use req_workbench::persistence::{MemoryStore, SharedSettingsStore};
use req_workbench::shell::open_settings_store;
use req_workbench::{AppResult, Shell, ShellConfig, StaticUnit, StepDescriptor, UnitHandle};

const LOG_TARGET_STARTUP: &str = "req_workbench::startup";

fn step(id: &'static str, name: &'static str) -> StepDescriptor {
    StepDescriptor::new(id, name, move || UnitHandle::new(StaticUnit::new(id, name)))
}

fn register_sections(shell: &mut Shell) -> AppResult<()> {
    let sections = [
        (
            "Primary Workflow",
            vec![
                step("requirements", "Requirements"),
                step("clarifying", "Clarifying Questions"),
                step("review", "Review"),
            ],
        ),
        ("Repair", vec![step("repair", "Requirement Repair")]),
        ("Test Cases", vec![step("test-cases", "Test Case Generation")]),
        ("Reports", vec![step("reports", "Reports & Exports")]),
        ("General", vec![step("overview", "Overview")]),
        ("Quick Links", vec![step("links", "Links")]),
    ];

    for (name, steps) in sections {
        shell
            .register_section(name, steps)
            .with_context(|| format!("registering section {name}"))?;
    }
    Ok(())
}

fn main() -> AppResult<()> {
    let config = ShellConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: {e}, using default shell config");
        ShellConfig::default()
    });
    initialize_tracing(&config);
    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "Starting req-workbench v{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::ARCH
    );

    let store: SharedSettingsStore = match open_settings_store(&config) {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!("Settings unavailable, selection will not persist: {}", e);
            Arc::new(MemoryStore::new())
        }
    };

    let mut shell = Shell::new(&config, store, tracing_sink());
    register_sections(&mut shell)?;

    let questions: ObservableVec<&str> = ObservableVec::new();
    shell
        .registry()
        .bind_badge("clarifying", &questions)
        .context("binding clarifying badge")?;
    questions.extend(["Which users need export?", "Is offline mode required?"]);

    let status = shell.status_reporter();
    status.report(ConnectionStatus::Connecting, None);

    match shell.restore() {
        Some(id) => tracing::info!("Restored step: {}", id),
        None => tracing::info!("No step to restore"),
    }
    status.report(ConnectionStatus::Connected, None);
    shell.pump();

    tracing::info!(
        "Header shows {:?} under '{}'",
        shell.header().displayed_unit().map(|unit| unit.display_name().to_string()),
        shell.header().context_label()
    );
    tracing::info!(
        "Clarifying questions badge: {}",
        shell.registry().badge("clarifying").unwrap_or_default()
    );
    Ok(())
}
