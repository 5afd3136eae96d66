//! copilens - Copilot usage and adoption dashboard
//!
//! Terminal UI for exploring seat allocation, daily activity and feature
//! engagement, with drill-down panels for every card, chart point, feature
//! and seat.

mod app;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use copilens_core::{build_provider, Config};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::App;

/// Redraw interval; also how often the pending load is polled.
const TICK: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "copilens")]
#[command(about = "Copilot usage and adoption dashboard")]
#[command(version)]
struct Args {
    /// Use seeded demo data instead of the GitHub API
    #[arg(long)]
    mock: bool,

    /// Seed for demo data (implies --mock)
    #[arg(long)]
    seed: Option<u64>,

    /// Config file (default: ~/.config/copilens/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config =
        Config::load_or_default(args.config.as_deref()).context("failed to load configuration")?;
    if args.mock || args.seed.is_some() {
        config.use_mock(args.seed);
    }
    config.validate().context("invalid configuration")?;

    // Initialize logging (to file, not stdout since we have a TUI)
    let _log_guard =
        copilens_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!(provider = ?config.provider.kind, "copilens TUI starting up");

    let provider = build_provider(&config).context("failed to create provider")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    // Run the main loop
    let result = runtime.block_on(async {
        let mut app = App::new(provider, config.dashboard);
        run_app(&mut terminal, &mut app).await
    });

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    tracing::info!("copilens TUI shutting down");

    result
}

/// Run the main application loop.
///
/// Terminal events are polled without blocking and the loop yields to the
/// runtime between ticks, so the load task makes progress on this thread.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.poll_load();

        // Render
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }

        tokio::time::sleep(TICK).await;
    }

    Ok(())
}
