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

use crate::error::{CleanError, CleanResult, RetrievalError, RetrievalResult};
use std::collections::HashMap;

/// Untyped rows exactly as the service returned them, in service order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub table: String,
    pub headers: Vec<String>,
    /// Every row has `headers.len()` cells; short records are padded with "".
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(table: &str, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self {
            table: table.to_string(),
            headers,
            rows,
        }
    }

    /// Parses a CSV body. Column names are trimmed and lower-cased.
    pub fn from_csv(table: &str, body: &[u8]) -> RetrievalResult<Self> {
        let not_tabular = |reason: String| RetrievalError::NotTabular {
            table: table.to_string(),
            reason,
        };
        if body.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'<') {
            return Err(not_tabular("markup instead of CSV".to_string()));
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(body);
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| not_tabular(e.to_string()))?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(not_tabular("missing header row".to_string()));
        }
        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| not_tabular(format!("record {}: {e}", index + 1)))?;
            if record.len() > headers.len() {
                return Err(not_tabular(format!(
                    "record {} has {} fields, header has {}",
                    index + 1,
                    record.len(),
                    headers.len()
                )));
            }
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self::new(table, headers, rows))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Positions of the requested columns, failing on the first absent one.
    pub fn column_indices(&self, columns: &[&str]) -> CleanResult<HashMap<String, usize>> {
        columns
            .iter()
            .map(|column| {
                self.headers
                    .iter()
                    .position(|h| h == column)
                    .map(|idx| (column.to_string(), idx))
                    .ok_or_else(|| CleanError::MissingColumn {
                        table: self.table.clone(),
                        column: column.to_string(),
                    })
            })
            .collect()
    }
}
