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

use crate::config::SourceConfig;
use crate::error::{RetrievalError, RetrievalResult};
use crate::source::{RawTable, SourceFetcher, TableQuery};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Fetches tables from the regulatory data service over HTTP.
#[derive(Debug, Clone)]
pub struct EfServiceFetcher {
    client: reqwest::Client,
    base_url: String,
    output_format: String,
}

impl EfServiceFetcher {
    pub fn new(config: &SourceConfig) -> RetrievalResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| RetrievalError::Http {
                table: String::new(),
                source,
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            output_format: config.output_format.clone(),
        })
    }
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SourceFetcher for EfServiceFetcher {
    async fn fetch(&self, query: &TableQuery) -> RetrievalResult<RawTable> {
        let url = query.url(&self.base_url, &self.output_format);
        info!("Fetching {} from {}", query.table, url);
        let http_error = |source: reqwest::Error| {
            if source.is_timeout() {
                debug!("Request for {} timed out", query.table);
            }
            RetrievalError::Http {
                table: query.table.clone(),
                source,
            }
        };
        let response = self.client.get(&url).send().await.map_err(http_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                table: query.table.clone(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(http_error)?;
        let table = RawTable::from_csv(&query.table, &body)?;
        info!("Fetched {} rows from {}", table.row_count(), query.table);
        Ok(table)
    }
}
