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

use crate::aggregate::{
    methane_by_company, methane_by_year, JoinReport, MethaneByCompany, MethaneByYear,
};
use crate::clean::{Cleaner, CleaningReport};
use crate::config::SourceConfig;
use crate::dedup::{build_facility_map, DedupReport};
use crate::error::{CleanResult, Result, RetrievalError};
use crate::source::{RawTable, SourceFetcher, TableQuery};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub built_at: DateTime<Utc>,
    pub emissions: CleaningReport,
    pub facilities: CleaningReport,
    pub dedup: DedupReport,
    pub join: JoinReport,
}

/// The two tables every query reads. Built once; never changed afterwards.
#[derive(Debug, Clone)]
pub struct CanonicalViews {
    by_year: MethaneByYear,
    by_company: MethaneByCompany,
    report: BuildReport,
}

impl CanonicalViews {
    /// Clean, deduplicate, join and group already fetched tables.
    pub fn from_tables(emissions: &RawTable, facilities: &RawTable) -> CleanResult<Self> {
        let cleaner = Cleaner::new();
        let (emission_records, emission_report) = cleaner.clean_emissions(emissions)?;
        let (facility_records, facility_report) = cleaner.clean_facilities(facilities)?;
        let (facility_map, dedup) = build_facility_map(&facility_records);
        let by_year = methane_by_year(&emission_records);
        let (by_company, join) = methane_by_company(&emission_records, &facility_map);
        Ok(Self {
            by_year,
            by_company,
            report: BuildReport {
                built_at: Utc::now(),
                emissions: emission_report,
                facilities: facility_report,
                dedup,
                join,
            },
        })
    }
    pub fn by_year(&self) -> &MethaneByYear {
        &self.by_year
    }
    pub fn by_company(&self) -> &MethaneByCompany {
        &self.by_company
    }
    pub fn report(&self) -> &BuildReport {
        &self.report
    }
}

/// Fetch both source tables under one deadline, then build the views.
/// Any fetch failure or an exceeded deadline aborts the build.
pub async fn build_canonical_views(
    fetcher: &dyn SourceFetcher,
    config: &SourceConfig,
) -> Result<CanonicalViews> {
    let emissions_query = source_query(&config.emissions_table, config);
    let facilities_query = source_query(&config.facilities_table, config);
    let fetch_both = futures::future::try_join(
        fetcher.fetch(&emissions_query),
        fetcher.fetch(&facilities_query),
    );
    let (emissions, facilities) =
        tokio::time::timeout(Duration::from_secs(config.timeout_secs), fetch_both)
            .await
            .map_err(|_| RetrievalError::Timeout {
                seconds: config.timeout_secs,
            })??;
    let views = CanonicalViews::from_tables(&emissions, &facilities)?;
    info!(
        "Canonical views ready: {} year groups, {} company groups",
        views.by_year.len(),
        views.by_company.len()
    );
    Ok(views)
}

fn source_query(table: &str, config: &SourceConfig) -> TableQuery {
    let query = TableQuery::new(table);
    match &config.rows {
        Some(rows) => query.with_rows(rows),
        None => query,
    }
}
