//! feedcount: keep a feed's subscriber count fresh and print it.
//!
//! ## Usage
//!
//! ```bash
//! feedcount activate                      # seed default settings
//! feedcount configure --uri myfeed        # first-time setup, fetches once
//! feedcount configure --average "7 days" --fallback "N/A"
//! feedcount show                          # refresh if due, print the count
//! feedcount refresh --force               # "update now"
//! feedcount info                          # count, last check, API URI
//! feedcount watch                         # live status view
//! feedcount deactivate                    # remove every setting
//! ```
//!
//! Settings and state live in a JSON store (`--store`, `$FEEDCOUNT_STORE`,
//! or the platform data directory).

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use feedcount::admin::{self, OptionsForm, Unavailable};
use feedcount::app::App;
use feedcount::cache::DEFAULT_REFRESH_INTERVAL;
use feedcount::fetch::HttpFetcher;
use feedcount::store::FileStore;
use feedcount::{input, lifecycle, poll, ui, CountCache};

type Cache = CountCache<FileStore, HttpFetcher>;

/// Fetch a feed's subscriber count from the awareness API and cache it
#[derive(Parser, Debug)]
#[command(name = "feedcount")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about, long_about = None)]
struct Cli {
    /// Settings and state store
    #[arg(long, env = "FEEDCOUNT_STORE", value_name = "FILE", global = true)]
    store: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "feedcount=trace")
    #[arg(long, env = "FEEDCOUNT_LOG", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed default settings (existing values are kept)
    Activate {
        /// Take the feed identifier from a legacy feed URL
        #[arg(long, value_name = "URL")]
        from_url: Option<String>,
    },

    /// Remove every setting and cached value
    Deactivate,

    /// Validate and save settings; the first setup fetches immediately
    Configure {
        /// Feed identifier in the awareness API
        #[arg(long, value_name = "ID")]
        uri: Option<String>,

        /// Check frequency: seconds or a phrase like "3 hours"
        #[arg(long, value_name = "INTERVAL")]
        every: Option<String>,

        /// Average the daily counts over this much history, e.g. "7 days"
        #[arg(long, value_name = "WINDOW", conflicts_with = "no_average")]
        average: Option<String>,

        /// Stop averaging
        #[arg(long)]
        no_average: bool,

        /// Show this text whenever no count is available
        #[arg(long, value_name = "TEXT", conflicts_with = "keep_last")]
        fallback: Option<String>,

        /// Keep the last count whenever none is available
        #[arg(long)]
        keep_last: bool,
    },

    /// Refresh the count if the interval has elapsed
    Refresh {
        /// Refresh even if not due
        #[arg(long)]
        force: bool,
    },

    /// Refresh if due, then print the display value
    Show,

    /// Print the current count, last check time and generated API URI
    Info,

    /// Live status view, refreshing in the background
    Watch,
}

// ---------------------------------------------------------------------------
// RAII terminal guard: idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the default panic message is printed.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn default_store_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "feedcount")
        .context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("store.json"))
}

/// Install the global subscriber.  `RUST_LOG` wins over `level`; with a
/// `log_file` everything goes there instead of stderr.
fn init_logging(level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log filter: {level}"))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn open_cache(store: FileStore) -> Result<Cache> {
    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;
    Ok(CountCache::new(store, fetcher))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn configure(
    cache: &mut Cache,
    uri: Option<String>,
    every: Option<String>,
    average: Option<String>,
    no_average: bool,
    fallback: Option<String>,
    keep_last: bool,
) -> Result<()> {
    // Start from what is saved so unspecified fields keep their values.
    let mut form = OptionsForm::from_config(cache.config());
    if form.refresh_interval.is_empty() {
        form.refresh_interval = DEFAULT_REFRESH_INTERVAL.to_string();
    }
    if let Some(uri) = uri {
        form.feed_uri = lifecycle::feed_identifier_from_url(&uri).to_string();
    }
    if let Some(every) = every {
        form.refresh_interval = every;
    }
    if average.is_some() {
        form.average_window = average;
    } else if no_average {
        form.average_window = None;
    }
    if let Some(text) = fallback {
        form.when_unavailable = Unavailable::Text(text);
    } else if keep_last {
        form.when_unavailable = Unavailable::KeepLast;
    }

    match admin::submit(cache, &form).context("Settings not saved")? {
        Some(outcome) => println!("Settings saved; first fetch: {outcome}"),
        None => println!("Settings saved"),
    }
    Ok(())
}

fn info(cache: &Cache) {
    println!("Count              {}", cache.current_display_value());
    println!(
        "Last checked       {}",
        ui::format_last_checked(cache.state().last_checked_at)
    );
    if cache.is_configured() {
        println!("Generated API URI  {}", cache.build_request_uri(cache.now()));
    }
}

fn watch(cache: Cache) -> Result<()> {
    install_panic_hook();

    // -- start background refreshing -----------------------------------------
    let poller = poll::spawn(cache);

    // -- terminal setup (RAII: Drop restores on exit or panic) ---------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();

    // -- main event loop -----------------------------------------------------
    // ~10 fps.  Each iteration drains worker reports, forwards an "update
    // now" request, renders, then polls the keyboard for up to one tick.
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(snapshot) = poller.snapshots.try_recv() {
            app.apply(snapshot);
        }

        if app.take_refresh_request() {
            poller.force_refresh();
        }

        guard.terminal.draw(|f| ui::draw(&app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    // `guard` is dropped here, restoring the terminal.
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    let store_path = match cli.store {
        Some(path) => path,
        None => default_store_path()?,
    };

    // The status view owns the terminal, so its logs go to a file.
    let log_file = matches!(cli.command, Command::Watch)
        .then(|| store_path.with_file_name("watch.log"));
    init_logging(&cli.log_level, log_file.as_deref())?;

    let mut store = FileStore::open(&store_path)?;

    match cli.command {
        Command::Activate { from_url } => {
            lifecycle::activate(&mut store, from_url.as_deref())?;
            println!("Activated ({})", store.path().display());
        }
        Command::Deactivate => {
            lifecycle::deactivate(&mut store)?;
            println!("Deactivated");
        }
        Command::Configure {
            uri,
            every,
            average,
            no_average,
            fallback,
            keep_last,
        } => {
            let mut cache = open_cache(store)?;
            configure(&mut cache, uri, every, average, no_average, fallback, keep_last)?;
        }
        Command::Refresh { force } => {
            let mut cache = open_cache(store)?;
            println!("{}", cache.refresh(force));
        }
        Command::Show => {
            let mut cache = open_cache(store)?;
            cache.refresh_if_due();
            println!("{}", cache.current_display_value());
        }
        Command::Info => {
            let cache = open_cache(store)?;
            info(&cache);
        }
        Command::Watch => watch(open_cache(store)?)?,
    }

    Ok(())
}
