use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pcf_tester::{ModeStore, SystemClock};
use pcf_tester_app::config::{Args, Settings, ViewKind};
use pcf_tester_app::control::Control;
use pcf_tester_app::run::{run_plain, run_tui, spawn_stdin_reader};
use pcf_tester_app::session::Session;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

type AppSession = Session<Box<dyn ModeStore>, SystemClock>;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load(Args::parse())?;
    init_tracing(&settings.log_file)?;

    let host = settings.host()?;
    let modes = settings.mode_store();
    let control = match settings.seed {
        Some(seed) => Control::seeded(modes, SystemClock::new(), seed),
        None => Control::new(modes, SystemClock::new()),
    };
    let mut session = Session::new(control, host);
    tracing::info!(mode = %session.control().mode(), view = ?settings.view, "starting");

    match settings.view {
        ViewKind::Tui => run_terminal(&mut session).await?,
        ViewKind::Plain => run_plain(&mut session, spawn_stdin_reader(), io::stdout()).await?,
    }
    Ok(())
}

/// Tracing goes to a file; the terminal belongs to the view.
fn init_tracing(path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run_terminal(session: &mut AppSession) -> io::Result<()> {
    // ===== Terminal setup =====
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_tui(&mut terminal, session).await;

    // ===== Cleanup =====
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}
