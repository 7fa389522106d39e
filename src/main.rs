use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use klavye::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{Runner, SessionEvent, TerminalEvents},
    App, AppAction, WordPool, TICK_RATE_MS,
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, File, OpenOptions},
    io::{self, stdin},
    path::Path,
    sync::Arc,
    time::{Duration, SystemTime},
};

/// minimal word-based typing speed test
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A word-based typing speed test. Type the words shown, press space to submit each one, and get your words per minute when time runs out."
)]
pub struct Cli {
    /// number of words shown per batch
    #[clap(short = 'w', long)]
    sequence_length: Option<usize>,

    /// number of seconds to run test
    #[clap(short = 's', long)]
    session_secs: Option<u64>,

    /// seconds between checks for an exhausted word batch
    #[clap(long)]
    refill_poll_secs: Option<u64>,

    /// print the final summary as json
    #[clap(long)]
    json: bool,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layer the command line flags over the stored configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(n) = self.sequence_length {
            config.sequence_length = n;
        }
        if let Some(secs) = self.session_secs {
            config.session_duration_secs = secs;
        }
        if let Some(secs) = self.refill_poll_secs {
            config.refill_poll_interval_secs = secs;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    let session_config = match config.session_config() {
        Ok(c) => c,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    if cli.save_config {
        store.save(&config)?;
        info!("saved settings to {}", store.path().display());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let pool = Arc::new(WordPool::builtin()?);
    let mut app = App::new(session_config, pool)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    outcome?;
    app.teardown();

    if let Some(summary) = app.session.summary() {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!("{summary}");
        }
    }

    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(TerminalEvents::spawn(), Duration::from_millis(TICK_RATE_MS));

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.next_event() {
            SessionEvent::Tick | SessionEvent::Resize => {}
            SessionEvent::Key(key) => match app.handle_key(key, SystemTime::now()) {
                AppAction::Continue => {}
                AppAction::Restart => app.reset()?,
                AppAction::Quit => break,
            },
        }

        // steady typing can starve Tick, so timers are checked after every event
        app.on_tick(SystemTime::now());
    }

    Ok(())
}

/// Logs go to a file; the terminal is owned by the alternate screen.
fn init_logging() {
    let Some(file) = AppDirs::log_path().and_then(|path| open_log_file(&path).ok()) else {
        return;
    };

    let env = env_logger::Env::new().filter_or("KLAVYE_LOG", "info");
    let _ = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
