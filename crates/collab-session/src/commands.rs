use std::io::Write;
use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use colored::{ColoredString, Colorize};

use collab_history::{
    display_timestamp, highlight, History, HistoryStats, Record, SearchHit, SessionListing,
    TailEntry, DEFAULT_TAIL,
};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all collaboration sessions
    List {
        #[arg(hide = true, trailing_var_arg = true)]
        rest: Vec<String>,
    },

    /// Show full session transcript
    Show {
        /// Session ID
        session_id: Option<String>,

        #[arg(hide = true, trailing_var_arg = true)]
        rest: Vec<String>,
    },

    /// Show the last n events (default 20)
    Tail {
        /// Number of events
        count: Option<usize>,

        #[arg(hide = true, trailing_var_arg = true)]
        rest: Vec<String>,
    },

    /// Show usage statistics
    Stats {
        #[arg(hide = true, trailing_var_arg = true)]
        rest: Vec<String>,
    },

    /// Search across all messages
    Search {
        /// Keyword; multiple words are joined with spaces
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        keyword: Vec<String>,
    },

    /// Export session to a text file next to the log
    Export {
        /// Session ID
        session_id: Option<String>,

        #[arg(hide = true, trailing_var_arg = true)]
        rest: Vec<String>,
    },

    #[command(external_subcommand)]
    Other(Vec<String>),
}

impl Command {
    /// `list` with no extra arguments, the command run when none is given.
    pub fn list() -> Self {
        Command::List { rest: Vec::new() }
    }
}

/// Extra operands after a recognized command are accepted and ignored.
fn ignore_extra(command: &str, rest: &[String]) {
    if !rest.is_empty() {
        tracing::debug!("Ignoring extra arguments to {}: {:?}", command, rest);
    }
}

pub fn handle_command<W: Write>(
    out: &mut W,
    command: Command,
    history: &History,
    json: bool,
) -> Result<()> {
    match command {
        Command::List { rest } => {
            ignore_extra("list", &rest);
            let listing = history.list();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&listing)?)?;
            } else if let Some(listing) = listing {
                print_sessions_table(out, &listing, history.log_path())?;
            } else {
                print_no_history(out)?;
            }
        }
        Command::Show {
            session_id: Some(id),
            rest,
        } => {
            ignore_extra("show", &rest);
            let records = history.show(&id);
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
            } else if let Some(records) = records {
                print_transcript(out, &id, &records)?;
            } else {
                writeln!(out, "Session '{}' not found.", id)?;
            }
        }
        Command::Tail { count, rest } => {
            ignore_extra("tail", &rest);
            let tail = history.tail(count.unwrap_or(DEFAULT_TAIL));
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&tail)?)?;
            } else if history.is_empty() {
                print_no_history(out)?;
            } else {
                print_tail(out, &tail)?;
            }
        }
        Command::Stats { rest } => {
            ignore_extra("stats", &rest);
            let stats = history.stats();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
            } else if let Some(stats) = stats {
                print_stats(out, &stats)?;
            } else {
                print_no_history(out)?;
            }
        }
        Command::Search { keyword } if !keyword.is_empty() => {
            let keyword = keyword.join(" ");
            let hits = history.search(&keyword);
            // Matching ignores case, so echo the keyword the way it was matched.
            let searched = keyword.to_lowercase();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&hits)?)?;
            } else if hits.is_empty() {
                writeln!(out, "No results for '{}'", searched)?;
            } else {
                print_search_results(out, &keyword, &searched, &hits)?;
            }
        }
        Command::Export {
            session_id: Some(id),
            rest,
        } => {
            ignore_extra("export", &rest);
            match history.export(&id)? {
                Some(exported) if json => {
                    writeln!(out, "{}", serde_json::to_string_pretty(&exported)?)?;
                }
                Some(exported) => {
                    writeln!(out, "{}", exported.text)?;
                    writeln!(out, "\nExported to: {}", exported.path.display())?;
                }
                None if json => writeln!(out, "null")?,
                None => writeln!(out, "Session '{}' not found.", id)?,
            }
        }
        Command::Other(args) => {
            tracing::debug!("Unknown command {:?}, printing usage", args);
            print_usage(out, history.log_path())?;
        }
        other => {
            tracing::debug!("Missing operand for {:?}, printing usage", other);
            print_usage(out, history.log_path())?;
        }
    }

    Ok(())
}

fn agent_label(agent: &str) -> ColoredString {
    match agent {
        "claude_code" => "Claude Code".bright_cyan(),
        "clawbot" => "Clawbot".bright_green(),
        other => other.bright_yellow(),
    }
}

fn print_no_history<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "No collaboration history yet.")?;
    Ok(())
}

fn print_sessions_table<W: Write>(
    out: &mut W,
    listing: &SessionListing,
    log_path: &Path,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "Collaboration Sessions".bold())?;
    writeln!(out, "{}", "═".repeat(80))?;
    writeln!(
        out,
        "{:<35} {:<8} {:<22} {}",
        "SESSION ID", "EVENTS", "STARTED", "LAST ACTIVITY"
    )?;
    writeln!(out, "{}", "─".repeat(80))?;

    for s in &listing.sessions {
        let first = s
            .first_timestamp
            .as_deref()
            .map(display_timestamp)
            .unwrap_or_else(|| "?".to_string());
        let last = s
            .last_timestamp
            .as_deref()
            .map(display_timestamp)
            .unwrap_or_else(|| "?".to_string());
        writeln!(
            out,
            "{} {:<8} {:<22} {}",
            format!("{:<35}", s.session_id).dimmed(),
            s.count,
            first,
            last
        )?;
    }

    writeln!(
        out,
        "\n{} session(s) total, {} events",
        listing.total_sessions, listing.total_events
    )?;
    writeln!(out, "Memory file: {}\n", log_path.display())?;
    Ok(())
}

fn print_transcript<W: Write>(out: &mut W, session_id: &str, records: &[&Record]) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", format!("Session: {}", session_id).bold())?;
    writeln!(out, "{}", "═".repeat(80))?;

    for r in records {
        writeln!(out)?;
        writeln!(
            out,
            "{} {} {} {}",
            format!("[{}]", display_timestamp(r.timestamp())).dimmed(),
            agent_label(r.from()),
            "→".dimmed(),
            agent_label(r.to())
        )?;
        if !r.task_id().is_empty() {
            writeln!(out, "{}", format!("Task: {}", r.task_id()).dimmed())?;
        }
        writeln!(out, "{}", r.message())?;
        writeln!(out, "{}", "─".repeat(40))?;
    }
    Ok(())
}

fn print_tail<W: Write>(out: &mut W, tail: &[TailEntry<'_>]) -> Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        format!("Last {} collaboration events", tail.len()).bold()
    )?;
    writeln!(out, "{}", "═".repeat(80))?;

    for entry in tail {
        let r = entry.record;
        writeln!(out)?;
        writeln!(
            out,
            "{} {} → {}",
            format!("[{}]", display_timestamp(r.timestamp())).dimmed(),
            agent_label(r.from()),
            agent_label(r.to())
        )?;
        writeln!(out, "  {}", entry.preview)?;
    }
    Ok(())
}

fn print_stats<W: Write>(out: &mut W, stats: &HistoryStats) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "Collaboration Statistics".bold())?;
    writeln!(out, "{}", "═".repeat(40))?;
    writeln!(out, "  Total events:      {}", stats.total_events)?;
    writeln!(out, "  Sessions:          {}", stats.sessions)?;
    writeln!(out, "  Avg message len:   {:.0} chars", stats.avg_message_len)?;

    writeln!(out, "\n  Events by direction:")?;
    for (direction, count) in &stats.by_direction {
        writeln!(out, "    {}: {}", direction, count)?;
    }

    if let (Some(first), Some(last)) = (&stats.first_event, &stats.last_event) {
        writeln!(out, "\n  First event:  {}", display_timestamp(first))?;
        writeln!(out, "  Last event:   {}", display_timestamp(last))?;
    }
    writeln!(out)?;
    Ok(())
}

fn print_search_results<W: Write>(
    out: &mut W,
    keyword: &str,
    searched: &str,
    hits: &[SearchHit<'_>],
) -> Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        format!("Search results for '{}' ({} found)", searched, hits.len()).bold()
    )?;
    writeln!(out, "{}", "═".repeat(80))?;

    for hit in hits {
        let r = hit.record;
        let preview = highlight(&hit.preview, keyword, |m| m.bright_yellow().to_string());
        writeln!(out)?;
        writeln!(
            out,
            "{} {} → {}",
            format!("[{}]", display_timestamp(r.timestamp())).dimmed(),
            agent_label(r.from()),
            agent_label(r.to())
        )?;
        writeln!(out, "  Session: {}", r.session_id())?;
        writeln!(out, "  {}", preview)?;
    }
    Ok(())
}

pub fn print_usage<W: Write>(out: &mut W, log_path: &Path) -> Result<()> {
    writeln!(
        out,
        "
{}

Usage:
  collab_session list                   List all collaboration sessions
  collab_session show <session_id>      Show full session transcript
  collab_session tail [n]               Show last n events (default 20)
  collab_session stats                  Show usage statistics
  collab_session search <keyword>       Search across all messages
  collab_session export <session_id>    Export session to text file

Memory file: {}
",
        "collab_session — ClaudeXClaw Memory Viewer".bold(),
        log_path.display()
    )?;
    Ok(())
}
