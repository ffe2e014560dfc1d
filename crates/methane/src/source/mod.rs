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

pub mod http;
pub mod query;
pub mod snapshot;
pub mod table;
pub use http::EfServiceFetcher;
pub use query::TableQuery;
pub use snapshot::SnapshotFetcher;
pub use table::RawTable;

use crate::config::SourceConfig;
use crate::error::RetrievalResult;
use async_trait::async_trait;

/// Anything that can hand back a raw table for a table identifier. No retries.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, query: &TableQuery) -> RetrievalResult<RawTable>;
}

/// Picks the snapshot reader when a snapshot directory is configured.
pub fn fetcher_for(config: &SourceConfig) -> RetrievalResult<Box<dyn SourceFetcher>> {
    match &config.snapshot_dir {
        Some(dir) => Ok(Box::new(SnapshotFetcher::new(dir))),
        None => Ok(Box::new(EfServiceFetcher::new(config)?)),
    }
}
