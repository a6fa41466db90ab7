mod config;

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use argbind::{Outcome, Parser};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{AddArgs, Cli, RemoveArgs};

/// What the demo prints after a successful bind.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct Report<'a> {
    command: &'a str,
    debug: bool,
    level: i64,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    headers: &'a [String],
    #[serde(skip_serializing_if = "str::is_empty")]
    config: &'a str,
    timeout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    add: Option<&'a AddArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remove: Option<&'a RemoveArgs>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    rest: &'a [String],
}

fn main() -> Result<()> {
    init_tracing();
    // A missing .env file is fine; env fallbacks then read the real environment only.
    dotenvy::dotenv().ok();

    let mut cli = Cli::default();
    let mut parser = Parser::from_env()
        .version(concat!("v", env!("CARGO_PKG_VERSION")))
        .about("Bind arguments, environment and positionals onto a typed config");

    match parser.bind(&mut cli).context("failed to bind arguments")? {
        Outcome::Bound => {}
        Outcome::Help | Outcome::Version => return Ok(()),
    }

    let command = parser.chosen().first().map_or("none", String::as_str);
    debug!(command, rest = parser.rest().len(), "arguments bound");

    if cli.quiet {
        return Ok(());
    }

    let report = Report {
        command,
        debug: cli.debug,
        level: cli.level,
        headers: &cli.headers,
        config: &cli.config,
        timeout: humantime::format_duration(cli.timeout).to_string(),
        add: parser.is_subcommand_set("add").then_some(&cli.add),
        remove: parser.is_subcommand_set("rm").then_some(&cli.remove),
        rest: parser.rest(),
    };

    let mut out = io::stdout().lock();
    match cli.format.as_str() {
        "json" => {
            serde_json::to_writer_pretty(&mut out, &report).context("failed to write report")?;
            writeln!(out)?;
        }
        "text" => write_text(&mut out, &report)?,
        other => bail!("unsupported format: {other}"),
    }
    Ok(())
}

fn write_text(out: &mut impl Write, report: &Report<'_>) -> Result<()> {
    writeln!(out, "command: {}", report.command)?;
    writeln!(out, "debug: {}", report.debug)?;
    writeln!(out, "level: {}", report.level)?;
    writeln!(out, "timeout: {}", report.timeout)?;
    if !report.headers.is_empty() {
        writeln!(out, "headers: {}", report.headers.join(", "))?;
    }
    if !report.config.is_empty() {
        writeln!(out, "config: {}", report.config)?;
    }
    if let Some(add) = report.add {
        writeln!(out, "items: {} ({})", add.items.join(", "), add.priority)?;
    }
    if let Some(remove) = report.remove {
        writeln!(out, "remove: {} (force: {})", remove.id, remove.force)?;
    }
    if !report.rest.is_empty() {
        writeln!(out, "rest: {}", report.rest.join(" "))?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}
