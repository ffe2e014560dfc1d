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

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://data.epa.gov/efservice/";
pub const EMISSIONS_TABLE: &str = "EF_W_EMISSIONS_SOURCE_GHG";
pub const FACILITIES_TABLE: &str = "rlps_ghg_emitter_facilities";
pub const DEFAULT_TOP_N: usize = 15;
pub const DEFAULT_COLOR_SCALE_STEP: f64 = 1000.0;
const CONFIG_FILE_NAME: &str = "methane.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub source: SourceConfig,
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub emissions_table: String,
    pub facilities_table: String,
    pub output_format: String,
    pub timeout_secs: u64,
    /// Row window in the service's `first:last` form, e.g. `0:999`.
    pub rows: Option<String>,
    /// Directory of `{table}.csv` files used instead of the web service.
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            emissions_table: EMISSIONS_TABLE.to_string(),
            facilities_table: FACILITIES_TABLE.to_string(),
            output_format: "CSV".to_string(),
            timeout_secs: 120,
            rows: None,
            snapshot_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueryConfig {
    pub top_n: usize,
    pub color_scale_step: f64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            color_scale_step: DEFAULT_COLOR_SCALE_STEP,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        let source = &self.source;
        url::Url::parse(&source.base_url)
            .map_err(|_| invalid("source.base_url", &source.base_url))?;
        if !source.base_url.ends_with('/') {
            return Err(invalid("source.base_url", &source.base_url));
        }
        if source.emissions_table.trim().is_empty() {
            return Err(invalid("source.emissions_table", &source.emissions_table));
        }
        if source.facilities_table.trim().is_empty() {
            return Err(invalid("source.facilities_table", &source.facilities_table));
        }
        if let Some(rows) = &source.rows {
            if !is_row_window(rows) {
                return Err(invalid("source.rows", rows));
            }
        }
        if source.timeout_secs == 0 {
            return Err(invalid("source.timeout_secs", "0"));
        }
        if self.query.top_n == 0 {
            return Err(invalid("query.top_n", "0"));
        }
        if !(self.query.color_scale_step.is_finite() && self.query.color_scale_step > 0.0) {
            return Err(invalid(
                "query.color_scale_step",
                &self.query.color_scale_step.to_string(),
            ));
        }
        Ok(())
    }
}

fn is_row_window(rows: &str) -> bool {
    match rows.split_once(':') {
        Some((first, last)) => match (first.parse::<u64>(), last.parse::<u64>()) {
            (Ok(first), Ok(last)) => first <= last,
            _ => false,
        },
        None => false,
    }
}

fn invalid(field: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new<P: AsRef<Path>>(config_dir: P) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
        }
    }

    /// Reads `methane.toml` when present, then applies `METHANE_*` environment overrides.
    pub fn load(&self) -> ConfigResult<PipelineConfig> {
        let path = self.config_dir.join(CONFIG_FILE_NAME);
        let mut config = if path.exists() {
            let content =
                std::fs::read_to_string(&path).map_err(|source| ConfigError::ConfigFileError {
                    path: path.display().to_string(),
                    source,
                })?;
            toml::from_str(&content)?
        } else {
            tracing::debug!(
                "No {} in {}, using defaults",
                CONFIG_FILE_NAME,
                self.config_dir.display()
            );
            PipelineConfig::default()
        };
        apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }
}

fn apply_env_overrides<F>(config: &mut PipelineConfig, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("METHANE_BASE_URL") {
        config.source.base_url = url;
    }
    if let Some(raw) = lookup("METHANE_FETCH_TIMEOUT_SECS") {
        config.source.timeout_secs = raw
            .trim()
            .parse()
            .map_err(|_| invalid("METHANE_FETCH_TIMEOUT_SECS", &raw))?;
    }
    if let Some(raw) = lookup("METHANE_ROWS") {
        config.source.rows = Some(raw.trim().to_string());
    }
    if let Some(dir) = lookup("METHANE_SNAPSHOT_DIR") {
        config.source.snapshot_dir = Some(PathBuf::from(dir));
    }
    Ok(())
}
