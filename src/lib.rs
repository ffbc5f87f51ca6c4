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

pub mod config;
pub mod error;
pub mod perf;
pub mod replay;
pub mod viewport;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "viewport-replay",
    about = "Replay scripted scroll sessions through the chat viewport engine"
)]
pub struct Cli {
    /// Scenario file (JSON) to replay
    pub scenario: PathBuf,

    /// Engine config file (JSON); scenario-embedded config is used otherwise
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Override the overscan item count
    #[arg(long)]
    pub overscan: Option<usize>,

    /// Override the end-reached threshold (0.0 - 1.0)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Replay on real timers instead of a synthetic clock
    #[arg(long)]
    pub realtime: bool,

    /// Write tracing output to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Tracing filter directives (defaults to RUST_LOG, then `info`)
    #[arg(long)]
    pub log_filter: Option<String>,

    /// Append to the log file instead of truncating it
    #[arg(long)]
    pub log_append: bool,

    /// Write per-tick timing lines here (requires `--features perf`)
    #[arg(long)]
    pub perf_log: Option<PathBuf>,
}
