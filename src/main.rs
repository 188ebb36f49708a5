//! Pokequiz - Terminal Trivia
//!
//! A timed multiple-choice Pokémon quiz for the terminal. Each question
//! runs a countdown; finished runs land on an in-memory leaderboard that
//! lasts as long as the process.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::info;

use pokequiz::application::App;
use pokequiz::domain::{Leaderboard, QuestionBank, QuizConfig, QuizController};
use pokequiz::infrastructure::init_logging;
use pokequiz::presentation::{render_ui, InputHandler};

/// Longest the loop blocks on input when no timer is armed.
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Parser)]
#[command(name = "pokequiz", version, about = "Timed Pokémon trivia in the terminal")]
struct Cli {
    /// Seconds allowed per question
    #[arg(long, default_value_t = 30)]
    seconds: u32,

    /// Seed for the question shuffle, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (nothing is logged otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref(), cli.verbose).context("failed to open log file")?;

    let config = QuizConfig::default().with_question_seconds(cli.seconds)?;
    let bank = QuestionBank::builtin()?;
    let leaderboard = Leaderboard::new();
    let controller = match cli.seed {
        Some(seed) => QuizController::with_seed(bank, leaderboard, config, seed),
        None => QuizController::new(bank, leaderboard, config),
    };
    let mut app = App::new(controller);
    info!(seconds = config.question_seconds, "starting pokequiz");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("terminal error")
}

/// Main event loop.
///
/// Waits for key presses no longer than the next timer deadline, then
/// services due timers so the countdown keeps running without input.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        let timeout = app
            .next_timeout(Instant::now())
            .map_or(IDLE_POLL, |t| t.min(IDLE_POLL));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    InputHandler::handle_key_event(app, key.code, key.modifiers);
                }
            }
        }

        app.process_timers(Instant::now());
        if app.should_quit {
            info!("quitting");
            return Ok(());
        }
    }
}
