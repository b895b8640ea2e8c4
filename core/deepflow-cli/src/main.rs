//! deepflow: focus timer, session log and notes from the terminal.
//!
//! State lives under `$DEEPFLOW_HOME` (default `~/.deepflow`). With a remote
//! endpoint configured and `DEEPFLOW_USER_ID` set, sessions and notes go to
//! the signed-in account instead of the local store.
//!
//! ## Subcommands
//!
//! - `start` / `pause` / `stop` / `reset` / `status`: drive the persisted timer
//! - `run`: foreground countdown until the target is reached
//! - `target`: show or set the target length
//! - `sessions`, `stats`: history
//! - `notes`: list, add, edit and delete notes
//! - `theme`: show, set or toggle the display theme

mod app;
mod commands;
mod identity;
mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use deepflow_core::{StorageConfig, Theme};

use crate::app::App;
use crate::commands::ThemeChange;

#[derive(Parser)]
#[command(name = "deepflow")]
#[command(about = "Focus timer with session history and notes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start or resume the timer
    Start,

    /// Pause the running timer
    Pause,

    /// Stop the timer and record the session
    Stop,

    /// Reset the timer to idle without recording
    Reset,

    /// Show timer state
    Status,

    /// Run the timer in the foreground until the target is reached
    Run,

    /// Show or set the target length in minutes (1-240)
    Target {
        #[arg(value_name = "MINUTES")]
        minutes: Option<u32>,
    },

    /// List recorded sessions, newest first
    Sessions {
        #[arg(long, short = 'n', default_value_t = 20)]
        limit: usize,
    },

    /// Focus totals and streaks
    Stats,

    /// Manage notes
    Notes {
        #[command(subcommand)]
        command: NotesCommand,
    },

    /// Show, set or toggle the theme
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeArg>,
    },
}

#[derive(Subcommand)]
enum NotesCommand {
    /// List notes, most recently edited first
    List,

    /// Add a note
    Add {
        #[arg(long, short)]
        title: Option<String>,

        #[arg(value_name = "CONTENT", default_value = "")]
        content: String,
    },

    /// Edit a note by id or unique id prefix
    Edit {
        #[arg(value_name = "ID")]
        id: String,

        #[arg(long, short)]
        title: Option<String>,

        #[arg(long, short)]
        content: Option<String>,
    },

    /// Delete a note by id or unique id prefix
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Dark,
    Light,
    Toggle,
}

impl From<ThemeArg> for ThemeChange {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Dark => ThemeChange::Set(Theme::Dark),
            ThemeArg::Light => ThemeChange::Set(Theme::Light),
            ThemeArg::Toggle => ThemeChange::Toggle,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let storage = StorageConfig::from_env();
    let _logging_guard = logging::init(storage.as_ref().ok());

    let storage = match storage {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!(error = %e, "Cannot resolve storage root");
            eprintln!("deepflow: {}", e);
            std::process::exit(1);
        }
    };
    let mut app = App::open(storage);

    let result = match cli.command {
        Commands::Start => commands::start(&app).await,
        Commands::Pause => commands::pause(&app).await,
        Commands::Stop => commands::stop(&app).await,
        Commands::Reset => commands::reset(&app).await,
        Commands::Status => commands::status(&app).await,
        Commands::Run => commands::run(&app).await,
        Commands::Target { minutes } => commands::target(&mut app, minutes),
        Commands::Sessions { limit } => commands::sessions(&app, limit).await,
        Commands::Stats => commands::stats(&app).await,
        Commands::Notes { command } => match command {
            NotesCommand::List => commands::notes_list(&app).await,
            NotesCommand::Add { title, content } => commands::notes_add(&app, title, content).await,
            NotesCommand::Edit { id, title, content } => {
                commands::notes_edit(&app, &id, title, content).await
            }
            NotesCommand::Delete { id } => commands::notes_delete(&app, &id).await,
        },
        Commands::Theme { mode } => {
            commands::theme(&app, mode.map(ThemeChange::from).unwrap_or(ThemeChange::Show))
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "deepflow command failed");
        eprintln!("deepflow: {}", e);
        drop(_logging_guard);
        std::process::exit(1);
    }
}
