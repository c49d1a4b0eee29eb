//! IdleTally - activity timer with idle-time reconciliation
//!
//! Main entry point: reads commands from stdin, one per line, and prints a
//! status line after each.

mod commands;
mod context;

use std::io::Write;

use anyhow::Context as _;
use idletally_common::observability::{init_tracing, LogFormat};
use idletally_domain::Config;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::commands::{status_line, Command, Flow};
use crate::context::AppContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the config loader reads the environment
    let dotenv = dotenvy::dotenv();
    let loaded = idletally_infra::config::load_if_present().context("loading configuration")?;
    let defaulted = loaded.is_none();
    let config = loaded.unwrap_or_default();

    init_tracing(&config.logging.filter, LogFormat::from_json_flag(config.logging.json))?;
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) => debug!(error = %e, "No .env file loaded"),
    }
    if defaulted {
        warn!("No configuration source found, using defaults");
    }

    run(config).await
}

async fn run(config: Config) -> anyhow::Result<()> {
    let ctx = AppContext::new(config)?;
    let poller = ctx.spawn_idle_poller();
    info!("IdleTally ready, type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(stdout, "error: {e}")?;
                continue;
            }
        };

        let mut session = ctx.session.lock().await;
        let mut out = stdout.lock();
        let flow = match command.execute(&mut session, &ctx.inbox, &mut out) {
            Ok(flow) => flow,
            Err(e) => {
                writeln!(out, "error: {e:#}")?;
                Flow::Continue
            }
        };
        for event in session.drain_events() {
            debug!(?event, "Session event");
        }
        writeln!(out, "{}", status_line(&session))?;
        out.flush()?;

        if flow == Flow::Quit {
            break;
        }
    }

    poller.abort();
    info!(db_path = ?ctx.db.path(), "IdleTally shutting down");
    Ok(())
}
