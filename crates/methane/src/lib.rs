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

pub mod aggregate;
pub mod clean;
pub mod config;
pub mod dedup;
pub mod error;
pub mod export;
pub mod query;
pub mod records;
pub mod source;
pub mod views;

pub use aggregate::{CompanyRow, JoinReport, MethaneByCompany, MethaneByYear, YearSegmentRow};
pub use clean::{Cleaner, CleaningReport, MalformedValue};
pub use config::{ConfigLoader, PipelineConfig, QueryConfig, SourceConfig};
pub use dedup::{build_facility_map, DedupReport, FacilityCompany, FacilityCompanyMap};
pub use error::{
    CleanError, ConfigError, ExportError, MethaneError, Result, RetrievalError, SelectionError,
};
pub use query::{CompanyFilter, StateCategoryRow, StateFilter, StateRollup, TimeSeriesFilter};
pub use records::{Emission, FacilityId, RawEmissionRecord, RawFacilityRecord, UNKNOWN};
pub use source::{
    fetcher_for, EfServiceFetcher, RawTable, SnapshotFetcher, SourceFetcher, TableQuery,
};
pub use views::{build_canonical_views, BuildReport, CanonicalViews};

use error::SelectionResult;
use std::sync::Arc;

/// Read-only handle over the canonical views. Clones share the same views,
/// so one build can serve any number of concurrent sessions.
#[derive(Debug, Clone)]
pub struct EmissionsDashboard {
    views: Arc<CanonicalViews>,
    config: QueryConfig,
}

impl EmissionsDashboard {
    pub fn new(views: CanonicalViews, config: QueryConfig) -> Self {
        Self {
            views: Arc::new(views),
            config,
        }
    }

    /// Startup: pick the fetcher the config asks for and build the views.
    pub async fn from_config(config: &PipelineConfig) -> Result<Self> {
        let fetcher = fetcher_for(&config.source)?;
        let views = build_canonical_views(fetcher.as_ref(), &config.source).await?;
        Ok(Self::new(views, config.query.clone()))
    }

    pub fn views(&self) -> &CanonicalViews {
        &self.views
    }
    pub fn report(&self) -> &BuildReport {
        self.views.report()
    }
    pub fn query_config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn time_series(&self, filter: &TimeSeriesFilter) -> SelectionResult<Vec<YearSegmentRow>> {
        query::time_series(self.views.by_year(), filter)
    }

    /// Top companies for the year, capped at the configured limit.
    pub fn top_companies(&self, filter: &CompanyFilter) -> SelectionResult<Vec<CompanyRow>> {
        query::top_companies(self.views.by_company(), filter, self.config.top_n)
    }

    pub fn state_rollup(&self, filter: &StateFilter) -> SelectionResult<StateRollup> {
        query::state_rollup(
            self.views.by_company(),
            filter,
            self.config.color_scale_step,
        )
    }

    pub fn category_options(&self, year: Option<i32>) -> SelectionResult<Vec<String>> {
        query::category_options(self.views.by_company(), year)
    }

    /// The "select all" control: whatever categories the year offers right now.
    pub fn select_all_categories(&self, year: Option<i32>) -> SelectionResult<Vec<String>> {
        self.category_options(year)
    }

    pub fn year_options(&self) -> Vec<i32> {
        query::year_options(self.views.by_year())
    }
    pub fn company_year_options(&self) -> Vec<i32> {
        query::company_year_options(self.views.by_company())
    }
    pub fn basin_options(&self) -> Vec<String> {
        query::basin_options(self.views.by_year())
    }
    pub fn company_basin_options(&self) -> Vec<String> {
        query::company_basin_options(self.views.by_company())
    }
    pub fn default_year_range(&self) -> Option<(i32, i32)> {
        query::default_year_range(self.views.by_year())
    }
    pub fn default_company_year(&self) -> Option<i32> {
        query::default_company_year(self.views.by_company())
    }
}
