// chat_viewport - List virtualization engine for chat transcripts
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use chat_viewport::Cli;
use chat_viewport::config::EngineConfig;
use chat_viewport::error::ViewportError;
use chat_viewport::replay::{self, Scenario};
use clap::Parser;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::time::Instant;

#[allow(clippy::exit)]
fn main() {
    if let Err(err) = run() {
        if let Some(viewport_error) = extract_viewport_error(&err) {
            eprintln!("{}", viewport_error.user_message());
            std::process::exit(viewport_error.exit_code());
        }
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    #[cfg(not(feature = "perf"))]
    if cli.perf_log.is_some() {
        return Err(anyhow::anyhow!("`--perf-log` requires a binary built with `--features perf`"));
    }
    let _perf = cli
        .perf_log
        .as_deref()
        .and_then(|path| chat_viewport::perf::PerfLogger::open(path, false));

    let scenario = Scenario::load(&cli.scenario)?;
    let config = resolve_config(&cli, &scenario)?;

    let started = Instant::now();
    if cli.realtime {
        let rt = tokio::runtime::Runtime::new()?;
        let local_set = tokio::task::LocalSet::new();
        let events = rt.block_on(local_set.run_until(replay::replay_realtime(&scenario, config)))?;
        write_json_lines(&events)?;
    } else {
        let records = replay::replay(&scenario, config)?;
        write_json_lines(&records)?;
    }
    tracing::info!(elapsed = ?started.elapsed(), realtime = cli.realtime, "replay finished");

    Ok(())
}

/// Config precedence: `--config` file, then the scenario's embedded config,
/// then defaults. Flag overrides apply last.
fn resolve_config(cli: &Cli, scenario: &Scenario) -> Result<EngineConfig, ViewportError> {
    let mut config = match cli.config.as_deref() {
        Some(path) => EngineConfig::load(path)?,
        None => scenario.config.clone().unwrap_or_default(),
    };
    if let Some(overscan) = cli.overscan {
        config.overscan = overscan;
    }
    if let Some(threshold) = cli.threshold {
        config.end_reached_threshold = threshold;
    }
    config.validate()?;
    Ok(config)
}

fn write_json_lines<T: Serialize>(rows: &[T]) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for row in rows {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

fn extract_viewport_error(err: &anyhow::Error) -> Option<ViewportError> {
    err.chain().find_map(|cause| cause.downcast_ref::<ViewportError>().cloned())
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let Some(path) = cli.log_file.as_ref() else {
        if std::env::var_os("RUST_LOG").is_some() {
            eprintln!(
                "RUST_LOG is set, but tracing is disabled without --log-file <PATH>. \
Use --log-file to enable diagnostics."
            );
        }
        return Ok(());
    };

    let directives = cli
        .log_filter
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_owned());
    let filter = tracing_subscriber::EnvFilter::try_new(directives.as_str())
        .map_err(|e| anyhow::anyhow!("invalid tracing filter `{directives}`: {e}"))?;

    let mut options = OpenOptions::new();
    options.create(true).write(true);
    if cli.log_append {
        options.append(true);
    } else {
        options.truncate(true);
    }
    let file = options
        .open(path)
        .map_err(|e| anyhow::anyhow!("failed to open log file {}: {e}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))?;

    tracing::info!(
        target: "diagnostics",
        version = env!("CARGO_PKG_VERSION"),
        log_file = %path.display(),
        log_filter = %directives,
        log_append = cli.log_append,
        "tracing enabled"
    );

    Ok(())
}
