//! Surveyor TUI - terminal client for insurance vehicle surveys
//!
//! A Ratatui-based TUI that walks a surveyor through an assigned survey
//! and submits the result to the insurance portal.

mod app;
mod config;
mod platform;
mod portal;
mod session;
mod state;
mod ui;
mod workflow;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use config::{CliOverrides, EnvOverrides, TuiConfig};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use portal::PortalClient;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "surveyor-tui", version, about = "Complete insurance surveys from the terminal")]
struct Args {
    /// Portal base URL (overrides config file and SURVEYOR_PORTAL_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Tenant identifier (overrides config file and SURVEYOR_TENANT)
    #[arg(long)]
    tenant: Option<String>,

    /// Open this survey directly instead of the list
    #[arg(long)]
    survey: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TuiConfig::load().context("Failed to read configuration")?;

    init_tracing(config.log_file.as_deref())?;

    let settings = config.resolve(
        &EnvOverrides::from_env(),
        &CliOverrides {
            base_url: args.base_url,
            tenant: args.tenant,
        },
    );
    let client = PortalClient::new(&settings)?;
    let portal_label = client.base_url().to_string();
    tracing::info!(portal = %portal_label, tenant = ?settings.tenant, "Starting surveyor TUI");

    let mut app = App::new(Arc::new(client), portal_label).await?;
    if let Some(survey_id) = args.survey {
        app.open_survey(survey_id).await;
        if !app.in_wizard() {
            tracing::warn!(survey_id, "Requested survey could not be opened");
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }

    Ok(())
}

/// Logs go to the configured file, or stderr when none is set
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "surveyor_tui=info".into());

    let file = log_file
        .map(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))
        })
        .transpose()?;

    let stderr_layer = file
        .is_none()
        .then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));
    let file_layer = file.map(|file: File| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    let poll_duration = Duration::from_millis(100);

    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(poll_duration)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key).await?;
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
