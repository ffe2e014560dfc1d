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

use crate::dedup::FacilityCompanyMap;
use crate::records::{Emission, RawEmissionRecord};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Running total for one group. Missing values add 0 to `sum` and are
/// counted apart so rate metrics can leave them out of the denominator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct GroupTotal {
    sum: f64,
    reported: usize,
    missing: usize,
}

impl GroupTotal {
    fn add(&mut self, emission: Emission) {
        match emission {
            Emission::Reported(value) => {
                self.sum += value;
                self.reported += 1;
            }
            Emission::Missing => self.missing += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSegmentRow {
    pub reporting_year: i32,
    pub industry_segment: String,
    pub basin_associated_with_facility: String,
    pub total_reported_ch4_emissions: f64,
    pub reported_rows: usize,
    pub missing_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyRow {
    pub reporting_year: i32,
    pub basin_associated_with_facility: String,
    pub reporting_category: String,
    pub parent_company: String,
    pub state: String,
    pub total_reported_ch4_emissions: f64,
    pub reported_rows: usize,
    pub missing_rows: usize,
}

/// Emissions per (year, industry segment, basin), sorted by that key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethaneByYear {
    rows: Vec<YearSegmentRow>,
}

impl MethaneByYear {
    pub fn rows(&self) -> &[YearSegmentRow] {
        &self.rows
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Emissions per (year, basin, category, parent company, state), sorted by that key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethaneByCompany {
    rows: Vec<CompanyRow>,
}

impl MethaneByCompany {
    pub fn rows(&self) -> &[CompanyRow] {
        &self.rows
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Emission rows whose facility has no owner record are left out of the
/// company view. This counts them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub input_rows: usize,
    pub matched_rows: usize,
    pub unmatched_rows: usize,
    pub unmatched_facilities: usize,
}

pub fn methane_by_year(records: &[RawEmissionRecord]) -> MethaneByYear {
    let mut groups: BTreeMap<(i32, &str, &str), GroupTotal> = BTreeMap::new();
    for record in records {
        groups
            .entry((
                record.reporting_year,
                record.industry_segment.as_str(),
                record.basin_associated_with_facility.as_str(),
            ))
            .or_default()
            .add(record.total_reported_ch4_emissions);
    }
    let rows = groups
        .into_iter()
        .map(|((year, segment, basin), total)| YearSegmentRow {
            reporting_year: year,
            industry_segment: segment.to_string(),
            basin_associated_with_facility: basin.to_string(),
            total_reported_ch4_emissions: total.sum,
            reported_rows: total.reported,
            missing_rows: total.missing,
        })
        .collect::<Vec<_>>();
    info!("Built methane_x_year with {} groups", rows.len());
    MethaneByYear { rows }
}

type CompanyKey<'a> = (i32, &'a str, &'a str, &'a str, &'a str);

/// Inner join on facility id, then sum per company key.
pub fn methane_by_company(
    records: &[RawEmissionRecord],
    facilities: &FacilityCompanyMap,
) -> (MethaneByCompany, JoinReport) {
    let mut groups: BTreeMap<CompanyKey<'_>, GroupTotal> = BTreeMap::new();
    let mut unmatched = BTreeSet::new();
    let mut report = JoinReport {
        input_rows: records.len(),
        ..Default::default()
    };
    for record in records {
        let Some(owner) = facilities.get(&record.facility_id) else {
            report.unmatched_rows += 1;
            unmatched.insert(&record.facility_id);
            continue;
        };
        report.matched_rows += 1;
        groups
            .entry((
                record.reporting_year,
                record.basin_associated_with_facility.as_str(),
                record.reporting_category.as_str(),
                owner.parent_company.as_str(),
                owner.state.as_str(),
            ))
            .or_default()
            .add(record.total_reported_ch4_emissions);
    }
    report.unmatched_facilities = unmatched.len();
    if report.unmatched_rows > 0 {
        warn!(
            "{} emission rows from {} facilities have no owner record and were left out of methane_vs_company",
            report.unmatched_rows, report.unmatched_facilities
        );
    }
    let rows = groups
        .into_iter()
        .map(|((year, basin, category, company, state), total)| CompanyRow {
            reporting_year: year,
            basin_associated_with_facility: basin.to_string(),
            reporting_category: category.to_string(),
            parent_company: company.to_string(),
            state: state.to_string(),
            total_reported_ch4_emissions: total.sum,
            reported_rows: total.reported,
            missing_rows: total.missing,
        })
        .collect::<Vec<_>>();
    info!("Built methane_vs_company with {} groups", rows.len());
    (MethaneByCompany { rows }, report)
}
