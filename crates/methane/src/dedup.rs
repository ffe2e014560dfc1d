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

use crate::records::{FacilityId, RawFacilityRecord};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use tracing::info;

/// Owner and location of a facility as of its latest observed year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacilityCompany {
    pub parent_company: String,
    pub state: String,
    /// `None` when no observation of the facility had a readable year.
    pub year: Option<i32>,
}

/// Exactly one entry per facility id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilityCompanyMap {
    entries: BTreeMap<FacilityId, FacilityCompany>,
}

impl FacilityCompanyMap {
    pub fn get(&self, facility_id: &FacilityId) -> Option<&FacilityCompany> {
        self.entries.get(facility_id)
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&FacilityId, &FacilityCompany)> {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupReport {
    pub input_rows: usize,
    pub exact_duplicates: usize,
    /// Older observations dropped in favour of a facility's latest one.
    pub superseded_rows: usize,
    pub facilities: usize,
}

/// Collapses the facility history to the most recent observation per facility.
///
/// Exact duplicates go first. The rest are ordered by facility id ascending,
/// year descending (unreadable years last), then company and state
/// ascending, and the first row per
/// facility is kept. The extra company/state keys make the pick independent
/// of input order when one facility reports two owners in the same year.
pub fn build_facility_map(records: &[RawFacilityRecord]) -> (FacilityCompanyMap, DedupReport) {
    let mut seen = HashSet::with_capacity(records.len());
    let mut unique: Vec<&RawFacilityRecord> = records.iter().filter(|r| seen.insert(*r)).collect();
    let exact_duplicates = records.len() - unique.len();
    unique.sort_by(|a, b| {
        a.facility_id
            .cmp(&b.facility_id)
            .then_with(|| b.year.cmp(&a.year))
            .then_with(|| a.parent_company.cmp(&b.parent_company))
            .then_with(|| a.state.cmp(&b.state))
    });
    let mut entries = BTreeMap::new();
    let mut superseded_rows = 0;
    for record in unique {
        match entries.entry(record.facility_id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(FacilityCompany {
                    parent_company: record.parent_company.clone(),
                    state: record.state.clone(),
                    year: record.year,
                });
            }
            Entry::Occupied(_) => superseded_rows += 1,
        }
    }
    let report = DedupReport {
        input_rows: records.len(),
        exact_duplicates,
        superseded_rows,
        facilities: entries.len(),
    };
    info!(
        "Facility map: {} facilities from {} rows ({} exact duplicates, {} superseded)",
        report.facilities, report.input_rows, report.exact_duplicates, report.superseded_rows
    );
    (FacilityCompanyMap { entries }, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facility(id: &str, year: i32, company: &str, state: &str) -> RawFacilityRecord {
        RawFacilityRecord {
            facility_id: FacilityId::new(id),
            year: Some(year),
            parent_company: company.to_string(),
            state: state.to_string(),
        }
    }

    #[test]
    fn test_most_recent_year_wins() {
        let records = vec![
            facility("1", 2019, "CompanyA", "TX"),
            facility("1", 2021, "CompanyB", "CA"),
        ];
        let (map, report) = build_facility_map(&records);
        assert_eq!(map.len(), 1);
        let entry = map.get(&FacilityId::new("1")).unwrap();
        assert_eq!(entry.parent_company, "CompanyB");
        assert_eq!(entry.state, "CA");
        assert_eq!(report.superseded_rows, 1);
    }

    #[test]
    fn test_exact_duplicates_counted() {
        let records = vec![
            facility("7", 2020, "A", "NM"),
            facility("7", 2020, "A", "NM"),
            facility("8", 2020, "B", "ND"),
        ];
        let (map, report) = build_facility_map(&records);
        assert_eq!(map.len(), 2);
        assert_eq!(report.exact_duplicates, 1);
        assert_eq!(report.superseded_rows, 0);
    }

    #[test]
    fn test_same_year_tie_is_order_independent() {
        let forward = vec![facility("5", 2020, "Zeta", "TX"), facility("5", 2020, "Alpha", "OK")];
        let backward: Vec<_> = forward.iter().rev().cloned().collect();
        let (a, _) = build_facility_map(&forward);
        let (b, _) = build_facility_map(&backward);
        assert_eq!(a, b);
        assert_eq!(a.get(&FacilityId::new("5")).unwrap().parent_company, "Alpha");
    }

    #[test]
    fn test_unknown_year_ranks_oldest() {
        let records = vec![
            facility("4", 2018, "Older", "ND"),
            RawFacilityRecord {
                year: None,
                ..facility("4", 0, "Undated", "WY")
            },
        ];
        let (map, _) = build_facility_map(&records);
        assert_eq!(map.get(&FacilityId::new("4")).unwrap().parent_company, "Older");

        let undated = vec![RawFacilityRecord {
            year: None,
            ..facility("5", 0, "Undated", "WY")
        }];
        let (map, _) = build_facility_map(&undated);
        assert_eq!(map.get(&FacilityId::new("5")).unwrap().year, None);
    }

    #[test]
    fn test_empty_input() {
        let (map, report) = build_facility_map(&[]);
        assert!(map.is_empty());
        assert_eq!(report, DedupReport::default());
    }
}
