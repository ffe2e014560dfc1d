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

use thiserror::Error;
#[derive(Error, Debug)]
pub enum MethaneError {
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("Cleaning error: {0}")]
    Clean(#[from] CleanError),
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}
/// Failures while pulling a raw table. All of them are fatal to startup.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("HTTP request for table '{table}' failed: {source}")]
    Http {
        table: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Table '{table}' returned HTTP status {status}")]
    Status { table: String, status: u16 },
    #[error("Fetching source tables exceeded {seconds}s")]
    Timeout { seconds: u64 },
    #[error("Response for table '{table}' is not tabular: {reason}")]
    NotTabular { table: String, reason: String },
    #[error("Failed to read snapshot for table '{table}' at '{path}': {source}")]
    Snapshot {
        table: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
}
/// Hard input-contract violations found while typing raw rows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CleanError {
    #[error("Table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },
    #[error("Row {row} of '{table}': '{value}' is not a four digit year")]
    MalformedYear {
        table: String,
        row: usize,
        value: String,
    },
    #[error("Row {row} of '{table}': required column '{column}' is blank")]
    MissingRequired {
        table: String,
        row: usize,
        column: String,
    },
}
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Query '{query}' needs a year selection")]
    MissingYear { query: &'static str },
}
impl SelectionError {
    /// A missing selection means the user has not picked anything yet.
    pub fn is_awaiting_input(&self) -> bool {
        matches!(self, SelectionError::MissingYear { .. })
    }
}
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    ConfigFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML configuration: {source}")]
    TomlParseError {
        #[from]
        source: toml::de::Error,
    },
    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },
}
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV export failed: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
    #[error("JSON export failed: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("Export buffer is not valid UTF-8")]
    Encoding,
}
pub type Result<T> = std::result::Result<T, MethaneError>;
pub type RetrievalResult<T> = std::result::Result<T, RetrievalError>;
pub type CleanResult<T> = std::result::Result<T, CleanError>;
pub type SelectionResult<T> = std::result::Result<T, SelectionError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type ExportResult<T> = std::result::Result<T, ExportError>;
impl MethaneError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MethaneError::Selection(_))
    }
    pub fn category(&self) -> &'static str {
        match self {
            MethaneError::Retrieval(_) => "Retrieval",
            MethaneError::Clean(_) => "Cleaning",
            MethaneError::Selection(_) => "Selection",
            MethaneError::Config(_) => "Configuration",
            MethaneError::Export(_) => "Export",
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            MethaneError::Selection(e) if e.is_awaiting_input() => {
                "Select a reporting year to see this view.".to_string()
            }
            MethaneError::Retrieval(RetrievalError::Timeout { seconds }) => format!(
                "The emissions service did not answer within {seconds}s. Try again later or use a local snapshot."
            ),
            MethaneError::Retrieval(_) => {
                "Unable to download the emissions tables. Check the network or the service URL.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
