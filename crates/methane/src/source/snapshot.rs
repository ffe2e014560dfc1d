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

use crate::error::{RetrievalError, RetrievalResult};
use crate::source::{RawTable, SourceFetcher, TableQuery};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Reads `{table}.csv` from a local directory. Positional filters are not
/// applied; a snapshot is whatever the file holds.
#[derive(Debug, Clone)]
pub struct SnapshotFetcher {
    dir: PathBuf,
}

impl SnapshotFetcher {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }
}

#[async_trait]
impl SourceFetcher for SnapshotFetcher {
    async fn fetch(&self, query: &TableQuery) -> RetrievalResult<RawTable> {
        let path = self.table_path(&query.table);
        if query.state.is_some()
            || query.county.is_some()
            || query.zip_code.is_some()
            || query.year.is_some()
        {
            warn!("Snapshot for {} ignores positional filters", query.table);
        }
        info!("Reading snapshot {}", path.display());
        let body = tokio::fs::read(&path)
            .await
            .map_err(|source| RetrievalError::Snapshot {
                table: query.table.clone(),
                path: path.display().to_string(),
                source,
            })?;
        RawTable::from_csv(&query.table, &body)
    }
}
