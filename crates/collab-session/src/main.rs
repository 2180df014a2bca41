use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use collab_history::History;
use collab_logging::LogFormat;

mod commands;
mod config;

use commands::{handle_command, Command};
use config::ViewerConfig;

#[derive(Parser, Debug)]
#[command(
    name = "collab_session",
    about = "View the collaboration history between Claude Code and clawbot",
    version,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Collaboration log to read (default: ~/.openclaw/collab/collaboration.jsonl)
    #[arg(long, env = "COLLAB_FILE", global = true)]
    file: Option<PathBuf>,

    /// Output the result as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Diagnostic log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Diagnostic log format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatChoice,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    collab_logging::init_tracing(&cli.log_level, cli.log_format.into());

    if let Err(e) = run(cli) {
        // A reader that stops early (`| head`) is not a failure.
        if is_broken_pipe(&e) {
            return;
        }
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<std::io::Error>())
        .any(|io| io.kind() == ErrorKind::BrokenPipe)
}

fn run(cli: Cli) -> Result<()> {
    let config = ViewerConfig::load_default()?;

    if cli.no_color || config.as_ref().is_some_and(|c| !c.color()) {
        colored::control::set_override(false);
    }

    let log_path = config::resolve_log_path(cli.file, config.as_ref())?;
    tracing::debug!("Reading collaboration log {:?}", log_path);

    let history = History::load(&log_path)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    handle_command(
        &mut out,
        cli.command.unwrap_or_else(Command::list),
        &history,
        cli.json,
    )?;
    out.flush()?;
    Ok(())
}
