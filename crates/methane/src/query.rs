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

//! Per-interaction queries over the canonical views. Every function here is
//! pure: same views and filter in, same table out. An empty basin or
//! category list means no filter on that column.

use crate::aggregate::{CompanyRow, MethaneByCompany, MethaneByYear, YearSegmentRow};
use crate::error::{SelectionError, SelectionResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSeriesFilter {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub basins: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyFilter {
    pub year: Option<i32>,
    pub basins: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateFilter {
    pub year: Option<i32>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateCategoryRow {
    pub state: String,
    pub reporting_category: String,
    pub total_reported_ch4_emissions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRollup {
    pub rows: Vec<StateCategoryRow>,
    /// Top of the colour scale: the largest total rounded up to the scale step.
    pub color_scale_max: f64,
}

fn selected(selection: &[String], value: &str) -> bool {
    selection.is_empty() || selection.iter().any(|s| s == value)
}

fn require_year(year: Option<i32>, query: &'static str) -> SelectionResult<i32> {
    year.ok_or(SelectionError::MissingYear { query })
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Rows of `methane_x_year` within the inclusive year range and basin
/// selection. Rows are not regrouped; the chart stacks by industry segment.
pub fn time_series(
    view: &MethaneByYear,
    filter: &TimeSeriesFilter,
) -> SelectionResult<Vec<YearSegmentRow>> {
    let start = require_year(filter.start_year, "time_series")?;
    let end = require_year(filter.end_year, "time_series")?;
    Ok(view
        .rows()
        .iter()
        .filter(|row| row.reporting_year >= start && row.reporting_year <= end)
        .filter(|row| selected(&filter.basins, &row.basin_associated_with_facility))
        .cloned()
        .collect())
}

/// Largest company rows for one year, at most `limit`, largest first.
/// Rows with a total of zero or less are dropped. Equal totals keep their
/// canonical order.
pub fn top_companies(
    view: &MethaneByCompany,
    filter: &CompanyFilter,
    limit: usize,
) -> SelectionResult<Vec<CompanyRow>> {
    let year = require_year(filter.year, "top_companies")?;
    let mut rows: Vec<CompanyRow> = view
        .rows()
        .iter()
        .filter(|row| row.reporting_year == year)
        .filter(|row| selected(&filter.basins, &row.basin_associated_with_facility))
        .filter(|row| is_positive(row.total_reported_ch4_emissions))
        .cloned()
        .collect();
    rows.sort_by(|a, b| {
        b.total_reported_ch4_emissions
            .total_cmp(&a.total_reported_ch4_emissions)
    });
    rows.truncate(limit);
    Ok(rows)
}

fn category_totals(view: &MethaneByCompany, year: i32) -> BTreeMap<&str, f64> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for row in view.rows().iter().filter(|row| row.reporting_year == year) {
        *totals.entry(row.reporting_category.as_str()).or_default() +=
            row.total_reported_ch4_emissions;
    }
    totals
}

/// Emission categories with a positive total in the given year, sorted.
/// Recomputed on every call; an empty list is a valid answer.
pub fn category_options(
    view: &MethaneByCompany,
    year: Option<i32>,
) -> SelectionResult<Vec<String>> {
    let year = require_year(year, "category_options")?;
    Ok(category_totals(view, year)
        .into_iter()
        .filter(|(_, total)| is_positive(*total))
        .map(|(category, _)| category.to_string())
        .collect())
}

/// Emissions per (state, category) for one year, positive totals only, plus
/// the colour-scale bound.
pub fn state_rollup(
    view: &MethaneByCompany,
    filter: &StateFilter,
    color_scale_step: f64,
) -> SelectionResult<StateRollup> {
    let year = require_year(filter.year, "state_rollup")?;
    let categories: BTreeSet<String> = if filter.categories.is_empty() {
        category_options(view, Some(year))?.into_iter().collect()
    } else {
        filter.categories.iter().cloned().collect()
    };
    let mut groups: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for row in view
        .rows()
        .iter()
        .filter(|row| row.reporting_year == year)
        .filter(|row| categories.contains(&row.reporting_category))
    {
        *groups
            .entry((row.state.as_str(), row.reporting_category.as_str()))
            .or_default() += row.total_reported_ch4_emissions;
    }
    let rows: Vec<StateCategoryRow> = groups
        .into_iter()
        .filter(|(_, total)| is_positive(*total))
        .map(|((state, category), total)| StateCategoryRow {
            state: state.to_string(),
            reporting_category: category.to_string(),
            total_reported_ch4_emissions: total,
        })
        .collect();
    let max = rows
        .iter()
        .map(|row| row.total_reported_ch4_emissions)
        .fold(0.0_f64, f64::max);
    Ok(StateRollup {
        color_scale_max: round_up_to_step(max, color_scale_step),
        rows,
    })
}

/// Smallest multiple of `step` that is at least `value`. Zero stays zero.
pub fn round_up_to_step(value: f64, step: f64) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    let bound = (value / step).ceil() * step;
    if bound < value {
        bound + step
    } else {
        bound
    }
}

/// Distinct reporting years, ascending.
pub fn year_options(view: &MethaneByYear) -> Vec<i32> {
    view.rows()
        .iter()
        .map(|row| row.reporting_year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn company_year_options(view: &MethaneByCompany) -> Vec<i32> {
    view.rows()
        .iter()
        .map(|row| row.reporting_year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct basins, sorted.
pub fn basin_options(view: &MethaneByYear) -> Vec<String> {
    view.rows()
        .iter()
        .map(|row| row.basin_associated_with_facility.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn company_basin_options(view: &MethaneByCompany) -> Vec<String> {
    view.rows()
        .iter()
        .map(|row| row.basin_associated_with_facility.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Earliest and latest year, the initial time-series range.
pub fn default_year_range(view: &MethaneByYear) -> Option<(i32, i32)> {
    let years = year_options(view);
    Some((*years.first()?, *years.last()?))
}

/// Earliest company-view year, the initial year for the ranking and map.
pub fn default_company_year(view: &MethaneByCompany) -> Option<i32> {
    company_year_options(view).first().copied()
}
