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

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Stand-in for blank categorical cells.
pub const UNKNOWN: &str = "Unknown";

/// A reported CH4 amount, or `Missing` when the source cell could not be read
/// as a finite number. `Missing` adds nothing to sums.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Emission {
    Reported(f64),
    #[default]
    Missing,
}

impl Emission {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Emission::Reported(value),
            _ => Emission::Missing,
        }
    }
    pub fn value(&self) -> Option<f64> {
        match self {
            Emission::Reported(value) => Some(*value),
            Emission::Missing => None,
        }
    }
    pub fn contribution(&self) -> f64 {
        self.value().unwrap_or(0.0)
    }
    pub fn is_missing(&self) -> bool {
        matches!(self, Emission::Missing)
    }
}

impl Serialize for Emission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

/// Facility identifiers sort numerically when both sides are numeric.
/// Leading zeros are dropped from all-digit ids, so `"007"` and `"7"` are
/// the same facility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FacilityId(String);

impl FacilityId {
    pub fn new(id: &str) -> Self {
        let id = id.trim();
        if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
            let digits = id.trim_start_matches('0');
            return Self(if digits.is_empty() { "0" } else { digits }.to_string());
        }
        Self(id.to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for FacilityId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<u64>(), other.0.parse::<u64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for FacilityId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FacilityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One emission source for a facility, year and industry segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawEmissionRecord {
    pub facility_id: FacilityId,
    pub reporting_year: i32,
    pub industry_segment: String,
    pub basin_associated_with_facility: String,
    pub reporting_category: String,
    pub total_reported_ch4_emissions: Emission,
}

/// One observation of a facility's owner; facilities repeat across years.
/// `year` is `None` when the cell could not be read; such rows rank oldest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RawFacilityRecord {
    pub facility_id: FacilityId,
    pub year: Option<i32>,
    pub parent_company: String,
    pub state: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emission_parse() {
        assert_eq!(Emission::parse(" 12.5 "), Emission::Reported(12.5));
        assert_eq!(Emission::parse("-3"), Emission::Reported(-3.0));
        assert_eq!(Emission::parse("N/A"), Emission::Missing);
        assert_eq!(Emission::parse(""), Emission::Missing);
        assert_eq!(Emission::parse("NaN"), Emission::Missing);
        assert_eq!(Emission::parse("inf"), Emission::Missing);
        assert_eq!(Emission::Missing.contribution(), 0.0);
    }

    #[test]
    fn test_emission_serializes_as_nullable_number() {
        let json = serde_json::to_string(&[Emission::Reported(1.5), Emission::Missing]).unwrap();
        assert_eq!(json, "[1.5,null]");
    }

    #[test]
    fn test_facility_id_numeric_order() {
        let mut ids: Vec<FacilityId> = ["100", "20", "abc", "3"]
            .into_iter()
            .map(FacilityId::from)
            .collect();
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(FacilityId::as_str).collect();
        assert_eq!(sorted, vec!["3", "20", "100", "abc"]);
    }

    #[test]
    fn test_zero_padded_ids_are_equal() {
        assert_eq!(FacilityId::new("007"), FacilityId::new(" 7"));
        assert_eq!(FacilityId::new("000").as_str(), "0");
        assert_eq!(FacilityId::new("0A7").as_str(), "0A7");
    }
}
