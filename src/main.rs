use std::io;
use std::sync::Mutex;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, widgets::TableState, Terminal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use election_explorer::app::AppState;
use election_explorer::config::{Config, EVENT_POLL_MS};
use election_explorer::dataset;
use election_explorer::error::Result;
use election_explorer::ui;

fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    // The terminal belongs to the UI, so logs go to a file.
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.log_path)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}", cfg.log_path);
            std::process::exit(1);
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    if let Err(e) = run(cfg) {
        error!("Fatal error: {e}");
        eprintln!("Fatal error: {e}");
        std::process::exit(1);
    }
}

fn run(cfg: Config) -> Result<()> {
    // --- Dataset + derived statistics, computed once ---
    let dataset = dataset::load(cfg.data_path.as_deref())?;
    let mut app = AppState::new(dataset, &cfg.sort_field, cfg.sort_direction);

    // --- Terminal setup ---
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("Explorer started");
    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    info!("Explorer exited");
    Ok(())
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> io::Result<()> {
    let poll_interval = Duration::from_millis(EVENT_POLL_MS);
    let mut table_state = TableState::default();

    while !app.should_quit {
        terminal.draw(|f| ui::render(f, app, &mut table_state))?;

        if event::poll(poll_interval)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }
    Ok(())
}
