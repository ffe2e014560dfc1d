// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "methane-dashboard")]
#[command(about = "Oil and gas methane emissions: build the views once, then query them")]
#[command(version)]
pub struct Args {
    #[arg(
        long,
        global = true,
        default_value = "config",
        help = "Directory holding methane.toml"
    )]
    pub config_dir: PathBuf,

    #[arg(
        long,
        global = true,
        help = "Read {table}.csv snapshots from this directory instead of the web service"
    )]
    pub snapshot_dir: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// View sizes and the startup build report.
    Summary,
    /// Years, basins and the categories available for a year.
    Options {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Emissions per year, segment and basin over a year range.
    TimeSeries {
        #[arg(long)]
        start: Option<i32>,
        #[arg(long)]
        end: Option<i32>,
        #[arg(long = "basin")]
        basins: Vec<String>,
    },
    /// Largest emitting companies for one year.
    TopCompanies {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long = "basin")]
        basins: Vec<String>,
    },
    /// Emissions per state and category for one year.
    StateRollup {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long = "category")]
        categories: Vec<String>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
