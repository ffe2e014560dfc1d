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

//! Typing of raw rows. Bad numeric and blank categorical cells are repaired
//! in place and reported; only a broken `reporting_year`, a blank facility id
//! or a missing column stops the build. An unreadable facility `year` is kept
//! as unknown and ranks as the oldest observation.

use crate::error::{CleanError, CleanResult};
use crate::records::{Emission, FacilityId, RawEmissionRecord, RawFacilityRecord, UNKNOWN};
use crate::source::RawTable;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

pub const FACILITY_ID: &str = "facility_id";
pub const REPORTING_YEAR: &str = "reporting_year";
pub const INDUSTRY_SEGMENT: &str = "industry_segment";
pub const BASIN: &str = "basin_associated_with_facility";
pub const REPORTING_CATEGORY: &str = "reporting_category";
pub const CH4_EMISSIONS: &str = "total_reported_ch4_emissions";
pub const YEAR: &str = "year";
pub const PARENT_COMPANY: &str = "parent_company";
pub const STATE: &str = "state";

const EMISSION_COLUMNS: [&str; 6] = [
    FACILITY_ID,
    REPORTING_YEAR,
    INDUSTRY_SEGMENT,
    BASIN,
    REPORTING_CATEGORY,
    CH4_EMISSIONS,
];
const FACILITY_COLUMNS: [&str; 4] = [FACILITY_ID, YEAR, PARENT_COMPANY, STATE];
const DEFAULT_SAMPLE_LIMIT: usize = 50;

/// A cell that could not be coerced and was replaced by a sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedValue {
    pub row: usize,
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    pub table: String,
    pub rows: usize,
    /// Blank categorical cells replaced with "Unknown", per column.
    pub unknown_categories: BTreeMap<String, usize>,
    /// Emission cells that became `Missing`, blanks included.
    pub missing_emissions: usize,
    /// Facility `year` cells that could not be read; those rows rank oldest.
    pub missing_years: usize,
    /// First few non-blank cells that failed to parse.
    pub malformed_samples: Vec<MalformedValue>,
    pub malformed_total: usize,
}

impl CleaningReport {
    fn new(table: &str, rows: usize) -> Self {
        Self {
            table: table.to_string(),
            rows,
            ..Default::default()
        }
    }
    pub fn unknown_total(&self) -> usize {
        self.unknown_categories.values().sum()
    }
}

/// Column lookup over one raw row.
struct Cells<'a> {
    values: &'a [String],
    idx: &'a HashMap<String, usize>,
}

impl<'a> Cells<'a> {
    fn get(&self, column: &str) -> &'a str {
        self.values[self.idx[column]].as_str()
    }
}

#[derive(Debug, Default)]
struct RowIssues {
    unknown: Vec<&'static str>,
    missing_emission: bool,
    missing_year: bool,
    malformed: Option<MalformedValue>,
}

#[derive(Debug, Clone)]
pub struct Cleaner {
    sample_limit: usize,
}

impl Cleaner {
    pub fn new() -> Self {
        Self {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
    pub fn with_sample_limit(mut self, sample_limit: usize) -> Self {
        self.sample_limit = sample_limit;
        self
    }

    pub fn clean_emissions(
        &self,
        table: &RawTable,
    ) -> CleanResult<(Vec<RawEmissionRecord>, CleaningReport)> {
        let idx = table.column_indices(&EMISSION_COLUMNS)?;
        let typed: Vec<CleanResult<(RawEmissionRecord, RowIssues)>> = table
            .rows
            .par_iter()
            .enumerate()
            .map(|(row, cells)| emission_row(&table.table, row, cells, &idx))
            .collect();
        let mut report = CleaningReport::new(&table.table, table.row_count());
        let mut records = Vec::with_capacity(typed.len());
        for result in typed {
            let (record, issues) = result?;
            self.absorb(&mut report, issues);
            records.push(record);
        }
        self.log_report(&report);
        Ok((records, report))
    }

    pub fn clean_facilities(
        &self,
        table: &RawTable,
    ) -> CleanResult<(Vec<RawFacilityRecord>, CleaningReport)> {
        let idx = table.column_indices(&FACILITY_COLUMNS)?;
        let typed: Vec<CleanResult<(RawFacilityRecord, RowIssues)>> = table
            .rows
            .par_iter()
            .enumerate()
            .map(|(row, cells)| facility_row(&table.table, row, cells, &idx))
            .collect();
        let mut report = CleaningReport::new(&table.table, table.row_count());
        let mut records = Vec::with_capacity(typed.len());
        for result in typed {
            let (record, issues) = result?;
            self.absorb(&mut report, issues);
            records.push(record);
        }
        self.log_report(&report);
        Ok((records, report))
    }

    fn absorb(&self, report: &mut CleaningReport, issues: RowIssues) {
        for column in issues.unknown {
            *report.unknown_categories.entry(column.to_string()).or_default() += 1;
        }
        if issues.missing_emission {
            report.missing_emissions += 1;
        }
        if issues.missing_year {
            report.missing_years += 1;
        }
        if let Some(malformed) = issues.malformed {
            report.malformed_total += 1;
            if report.malformed_samples.len() < self.sample_limit {
                debug!(
                    "{} row {}: '{}' in {} is not a number",
                    report.table, malformed.row, malformed.value, malformed.column
                );
                report.malformed_samples.push(malformed);
            }
        }
    }

    fn log_report(&self, report: &CleaningReport) {
        info!("Cleaned {} rows of {}", report.rows, report.table);
        if report.unknown_total() > 0 {
            info!(
                "{}: {} blank categorical cells set to {}",
                report.table,
                report.unknown_total(),
                UNKNOWN
            );
        }
        if report.malformed_total > 0 {
            warn!(
                "{}: {} unreadable numeric cells treated as missing",
                report.table, report.malformed_total
            );
        }
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

fn emission_row(
    table: &str,
    row: usize,
    cells: &[String],
    idx: &HashMap<String, usize>,
) -> CleanResult<(RawEmissionRecord, RowIssues)> {
    let cells = Cells { values: cells, idx };
    let mut issues = RowIssues::default();
    let facility_id = required_id(table, row, cells.get(FACILITY_ID))?;
    let reporting_year = parse_year(table, row, cells.get(REPORTING_YEAR))?;
    let raw_emission = cells.get(CH4_EMISSIONS);
    let emission = Emission::parse(raw_emission);
    if emission.is_missing() {
        issues.missing_emission = true;
        if !raw_emission.trim().is_empty() {
            issues.malformed = Some(MalformedValue {
                row,
                column: CH4_EMISSIONS.to_string(),
                value: raw_emission.to_string(),
            });
        }
    }
    let record = RawEmissionRecord {
        facility_id,
        reporting_year,
        industry_segment: category(cells.get(INDUSTRY_SEGMENT), INDUSTRY_SEGMENT, &mut issues),
        basin_associated_with_facility: category(cells.get(BASIN), BASIN, &mut issues),
        reporting_category: category(
            cells.get(REPORTING_CATEGORY),
            REPORTING_CATEGORY,
            &mut issues,
        ),
        total_reported_ch4_emissions: emission,
    };
    Ok((record, issues))
}

fn facility_row(
    table: &str,
    row: usize,
    cells: &[String],
    idx: &HashMap<String, usize>,
) -> CleanResult<(RawFacilityRecord, RowIssues)> {
    let cells = Cells { values: cells, idx };
    let mut issues = RowIssues::default();
    let raw_year = cells.get(YEAR);
    let year = parse_year(table, row, raw_year).ok();
    if year.is_none() {
        issues.missing_year = true;
        if !raw_year.trim().is_empty() {
            issues.malformed = Some(MalformedValue {
                row,
                column: YEAR.to_string(),
                value: raw_year.to_string(),
            });
        }
    }
    let record = RawFacilityRecord {
        facility_id: required_id(table, row, cells.get(FACILITY_ID))?,
        year,
        parent_company: category(cells.get(PARENT_COMPANY), PARENT_COMPANY, &mut issues),
        state: category(cells.get(STATE), STATE, &mut issues),
    };
    Ok((record, issues))
}

fn required_id(table: &str, row: usize, raw: &str) -> CleanResult<FacilityId> {
    if raw.trim().is_empty() {
        return Err(CleanError::MissingRequired {
            table: table.to_string(),
            row,
            column: FACILITY_ID.to_string(),
        });
    }
    Ok(FacilityId::new(raw))
}

/// Exactly four ASCII digits, surrounding whitespace allowed.
pub fn parse_year(table: &str, row: usize, raw: &str) -> CleanResult<i32> {
    let trimmed = raw.trim();
    if trimmed.len() == 4 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(year) = trimmed.parse() {
            return Ok(year);
        }
    }
    Err(CleanError::MalformedYear {
        table: table.to_string(),
        row,
        value: raw.to_string(),
    })
}

fn category(raw: &str, column: &'static str, issues: &mut RowIssues) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        issues.unknown.push(column);
        UNKNOWN.to_string()
    } else {
        trimmed.to_string()
    }
}
