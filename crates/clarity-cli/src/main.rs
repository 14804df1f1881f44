mod app;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "clarity")]
#[command(about = "Voice memos with cloud transcription, translation, and re-voicing")]
#[command(version)]
struct Cli {
    /// Log level (RUST_LOG overrides this)
    #[arg(long, value_enum, default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a new voice memo (press Enter to stop)
    Record(commands::record::RecordArgs),
    /// List the memo library
    List,
    /// Show one memo: metadata, latest transcript, enhanced audio
    Show {
        /// Recording id or filename
        id: String,
    },
    /// Transcribe a memo; non-English speech is also translated to English
    Transcribe {
        /// Recording id or filename
        id: String,
    },
    /// Re-voice a memo's transcript with a synthesized voice
    Speak(commands::speak::SpeakArgs),
    /// Star or unstar a memo
    Star {
        /// Recording id or filename
        id: String,
        /// Remove the star instead of adding it
        #[arg(long)]
        remove: bool,
    },
    /// Rename a memo (file and metadata move together)
    Rename {
        /// Recording id or filename
        id: String,
        new_name: String,
    },
    /// Delete a memo, its transcripts, and its enhanced audio
    Delete {
        /// Recording id or filename
        id: String,
    },
    /// List available synthesis voices
    Voices,
    /// List audio input devices
    Devices,
    /// Show or update configuration
    Config(commands::config::ConfigArgs),
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

fn init_tracing(level: LogLevel) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let config = clarity_core::Config::load();

    match cli.command {
        Command::Record(args) => commands::record::run(&config, args).await,
        Command::List => commands::library::list(&config),
        Command::Show { id } => commands::library::show(&config, &id),
        Command::Transcribe { id } => commands::transcribe::run(&config, &id).await,
        Command::Speak(args) => commands::speak::run(&config, args).await,
        Command::Star { id, remove } => commands::library::star(&config, &id, !remove),
        Command::Rename { id, new_name } => commands::library::rename(&config, &id, &new_name),
        Command::Delete { id } => commands::library::delete(&config, &id),
        Command::Voices => commands::speak::voices(&config).await,
        Command::Devices => commands::record::devices(),
        Command::Config(args) => commands::config::run(args),
    }
}
