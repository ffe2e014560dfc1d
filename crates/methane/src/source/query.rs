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

use serde::{Deserialize, Serialize};

/// A request for one table, with the optional positional filters the service understands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableQuery {
    pub table: String,
    pub state: Option<String>,
    pub county: Option<String>,
    pub zip_code: Option<String>,
    pub year: Option<String>,
    pub rows: Option<String>,
}

impl TableQuery {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Default::default()
        }
    }
    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_string());
        self
    }
    pub fn with_county(mut self, county: &str) -> Self {
        self.county = Some(county.to_string());
        self
    }
    pub fn with_zip_code(mut self, zip_code: &str) -> Self {
        self.zip_code = Some(zip_code.to_string());
        self
    }
    pub fn with_year(mut self, year: &str) -> Self {
        self.year = Some(year.to_string());
        self
    }
    pub fn with_rows(mut self, rows: &str) -> Self {
        self.rows = Some(rows.to_string());
        self
    }

    /// Filters go in a fixed order: state, county, zip code, year. Then the
    /// output format, then the row window.
    pub fn path(&self, output_format: &str) -> String {
        let mut path = format!("{}/", self.table);
        let segments = [
            ("state_abbr", &self.state),
            ("county_name", &self.county),
            ("zip_code", &self.zip_code),
            ("reporting_year", &self.year),
        ];
        for (name, value) in segments {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                path.push_str(name);
                path.push('/');
                path.push_str(value);
                path.push('/');
            }
        }
        path.push_str(output_format);
        if let Some(rows) = self.rows.as_deref().filter(|r| !r.is_empty()) {
            path.push_str("/rows/");
            path.push_str(rows);
        }
        path
    }

    pub fn url(&self, base_url: &str, output_format: &str) -> String {
        format!("{}{}", base_url, self.path(output_format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_table_url() {
        let query = TableQuery::new("EF_W_EMISSIONS_SOURCE_GHG");
        assert_eq!(
            query.url("https://data.epa.gov/efservice/", "CSV"),
            "https://data.epa.gov/efservice/EF_W_EMISSIONS_SOURCE_GHG/CSV"
        );
    }

    #[test]
    fn test_filters_keep_fixed_order() {
        let query = TableQuery::new("t")
            .with_rows("0:9")
            .with_year("2021")
            .with_zip_code("77001")
            .with_county("HARRIS")
            .with_state("TX");
        assert_eq!(
            query.path("CSV"),
            "t/state_abbr/TX/county_name/HARRIS/zip_code/77001/reporting_year/2021/CSV/rows/0:9"
        );
    }

    #[test]
    fn test_skips_absent_filters() {
        let query = TableQuery::new("t").with_year("2019");
        assert_eq!(query.path("CSV"), "t/reporting_year/2019/CSV");
    }
}
