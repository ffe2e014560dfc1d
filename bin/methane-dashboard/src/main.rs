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

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Commands, OutputFormat};
use methane::export::{to_json, write_csv};
use methane::{
    BuildReport, CompanyFilter, ConfigLoader, EmissionsDashboard, MethaneError, StateFilter,
    TimeSeriesFilter,
};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct Summary<'a> {
    year_groups: usize,
    company_groups: usize,
    report: &'a BuildReport,
}

#[derive(Serialize)]
struct ControlOptions {
    years: Vec<i32>,
    company_years: Vec<i32>,
    basins: Vec<String>,
    default_year_range: Option<(i32, i32)>,
    category_year: Option<i32>,
    categories: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},reqwest=warn,hyper=warn", args.log_level.as_str()))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ConfigLoader::new(&args.config_dir)
        .load()
        .with_context(|| format!("loading configuration from {}", args.config_dir.display()))?;
    if let Some(dir) = &args.snapshot_dir {
        config.source.snapshot_dir = Some(dir.clone());
    }

    let dashboard = match EmissionsDashboard::from_config(&config).await {
        Ok(dashboard) => dashboard,
        Err(e) => {
            error!("{} failure during startup: {e}", e.category());
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    };
    info!("Views built at {}", dashboard.report().built_at);

    match run(&dashboard, args.command, args.format) {
        Ok(()) => Ok(()),
        Err(MethaneError::Selection(e)) if e.is_awaiting_input() => {
            println!("Awaiting selection: {e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn run(
    dashboard: &EmissionsDashboard,
    command: Commands,
    format: OutputFormat,
) -> methane::Result<()> {
    match command {
        Commands::Summary => {
            let summary = Summary {
                year_groups: dashboard.views().by_year().len(),
                company_groups: dashboard.views().by_company().len(),
                report: dashboard.report(),
            };
            println!("{}", to_json(&summary, true)?);
        }
        Commands::Options { year } => {
            let category_year = year.or_else(|| dashboard.default_company_year());
            let categories = match category_year {
                Some(_) => dashboard.category_options(category_year)?,
                None => Vec::new(),
            };
            let options = ControlOptions {
                years: dashboard.year_options(),
                company_years: dashboard.company_year_options(),
                basins: dashboard.basin_options(),
                default_year_range: dashboard.default_year_range(),
                category_year,
                categories,
            };
            println!("{}", to_json(&options, true)?);
        }
        Commands::TimeSeries { start, end, basins } => {
            let rows = dashboard.time_series(&TimeSeriesFilter {
                start_year: start,
                end_year: end,
                basins,
            })?;
            emit(&rows, format)?;
        }
        Commands::TopCompanies { year, basins } => {
            let rows = dashboard.top_companies(&CompanyFilter { year, basins })?;
            emit(&rows, format)?;
        }
        Commands::StateRollup { year, categories } => {
            let rollup = dashboard.state_rollup(&StateFilter { year, categories })?;
            match format {
                OutputFormat::Json => println!("{}", to_json(&rollup, true)?),
                OutputFormat::Csv => {
                    info!("Colour scale runs from 0 to {}", rollup.color_scale_max);
                    emit(&rollup.rows, format)?;
                }
            }
        }
    }
    Ok(())
}

/// Summary and option listings are always JSON; tables follow `--format`.
fn emit<T: Serialize>(rows: &[T], format: OutputFormat) -> methane::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(rows, true)?),
        OutputFormat::Csv => write_csv(rows, std::io::stdout().lock())?,
    }
    Ok(())
}
