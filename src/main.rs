use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wrapsnake::config::GameConfig;
use wrapsnake::game::Session;
use wrapsnake::grid::GridSize;
use wrapsnake::input::{poll_input, GameInput};
use wrapsnake::renderer::{self, CellCanvas};
use wrapsnake::terminal_runtime::{install_panic_hook, TerminalSession};
use wrapsnake::ui::hud::HudState;

/// Upper bound on how long one frame waits for input.
const FRAME_INTERVAL: Duration = Duration::from_millis(8);

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON file overriding the block size and food catalog.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible game.
    #[arg(long)]
    seed: Option<u64>,

    /// Write tracing output to this file (filter with RUST_LOG).
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Grid width in cells; derived from the terminal size when omitted.
    #[arg(long, requires = "height")]
    width: Option<u16>,

    /// Grid height in cells; derived from the terminal size when omitted.
    #[arg(long, requires = "width")]
    height: Option<u16>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GameConfig::load(path).map_err(io::Error::other)?,
        None => GameConfig::default(),
    };
    init_tracing(cli.log_file.as_deref())?;

    install_panic_hook();
    run(&cli, &config)
}

fn run(cli: &Cli, config: &GameConfig) -> io::Result<()> {
    let mut terminal = TerminalSession::enter()?;

    let grid = match (cli.width, cli.height) {
        (Some(width), Some(height)) => GridSize::new(width, height),
        _ => terminal.grid_for_block(config.block)?,
    };
    info!(width = grid.width, height = grid.height, "grid derived");

    let canvas = CellCanvas::new(grid);
    let hud = HudState::default();
    let mut session = match cli.seed {
        Some(seed) => Session::new_with_seed(grid, config, seed, canvas, hud),
        None => Session::new(grid, config, canvas, hud),
    };

    let clock_origin = Instant::now();
    loop {
        terminal
            .terminal_mut()
            .draw(|frame| renderer::render(frame, &session, config.block))?;

        if let Some(input) = poll_input(FRAME_INTERVAL)? {
            if input == GameInput::Quit {
                break;
            }
            session.apply_input(input);
        }

        let simulated = Duration::from_millis(session.scheduler().now_ms());
        session.advance(clock_origin.elapsed().saturating_sub(simulated));
    }

    info!(score = session.score(), "quit");
    Ok(())
}

/// Installs a file-backed subscriber; without a log file tracing stays off,
/// since the terminal is in raw mode.
fn init_tracing(log_file: Option<&Path>) -> io::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = File::create(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
