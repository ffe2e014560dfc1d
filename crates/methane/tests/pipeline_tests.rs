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

use methane::{
    build_canonical_views, CleanError, CompanyFilter, ConfigLoader, EmissionsDashboard,
    MethaneError, PipelineConfig, RetrievalError, SnapshotFetcher, SourceConfig, StateFilter,
    TimeSeriesFilter, UNKNOWN,
};
use std::fs;
use std::path::Path;
use std::thread;
use tempfile::TempDir;

const EMISSIONS_HEADER: &str = "facility_id,reporting_year,industry_segment,basin_associated_with_facility,reporting_category,total_reported_ch4_emissions";
const FACILITIES_HEADER: &str = "facility_id,year,parent_company,state";

fn write_snapshot(dir: &Path, emissions: &[&str], facilities: &[&str]) {
    let mut body = vec![EMISSIONS_HEADER];
    body.extend_from_slice(emissions);
    fs::write(dir.join("EF_W_EMISSIONS_SOURCE_GHG.csv"), body.join("\n")).unwrap();
    let mut body = vec![FACILITIES_HEADER];
    body.extend_from_slice(facilities);
    fs::write(dir.join("rlps_ghg_emitter_facilities.csv"), body.join("\n")).unwrap();
}

fn snapshot_config(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        source: SourceConfig {
            snapshot_dir: Some(dir.to_path_buf()),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn sample_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_snapshot(
        dir.path(),
        &[
            "1,2019,Onshore,Permian,Venting,100",
            "1,2021,Onshore,Permian,Venting,500",
            "2,2021,Gathering,Anadarko,Flaring,1200.5",
            "3,2021,Gathering,,Pneumatic Devices,N/A",
            "4,2020,Onshore,Permian,Venting,40",
            "9,2021,Onshore,Permian,Venting,75",
        ],
        &[
            "1,2019,CompanyA,TX",
            "1,2021,CompanyB,CA",
            "2,2021,CompanyC,OK",
            "2,2021,CompanyC,OK",
            "3,2021,CompanyD,NM",
            "4,2020,,TX",
        ],
    );
    dir
}

#[tokio::test]
async fn test_snapshot_dashboard_end_to_end() {
    let dir = sample_dir();
    let dashboard = EmissionsDashboard::from_config(&snapshot_config(dir.path()))
        .await
        .unwrap();

    assert_eq!(dashboard.year_options(), vec![2019, 2020, 2021]);
    assert_eq!(dashboard.default_year_range(), Some((2019, 2021)));
    assert_eq!(
        dashboard.basin_options(),
        vec!["Anadarko".to_string(), "Permian".to_string(), UNKNOWN.to_string()]
    );

    let top = dashboard
        .top_companies(&CompanyFilter {
            year: Some(2021),
            basins: Vec::new(),
        })
        .unwrap();
    let names: Vec<&str> = top.iter().map(|r| r.parent_company.as_str()).collect();
    assert_eq!(names, vec!["CompanyC", "CompanyB"]);

    let rollup = dashboard
        .state_rollup(&StateFilter {
            year: Some(2021),
            categories: Vec::new(),
        })
        .unwrap();
    let states: Vec<&str> = rollup.rows.iter().map(|r| r.state.as_str()).collect();
    assert_eq!(states, vec!["CA", "OK"]);
    assert_eq!(rollup.color_scale_max, 2000.0);

    let report = dashboard.report();
    assert_eq!(report.dedup.exact_duplicates, 1);
    assert_eq!(report.dedup.superseded_rows, 1);
    assert_eq!(report.join.unmatched_rows, 1);
    assert_eq!(report.emissions.missing_emissions, 1);
}

#[tokio::test]
async fn test_missing_emission_group_keeps_zero_total() {
    let dir = sample_dir();
    let dashboard = EmissionsDashboard::from_config(&snapshot_config(dir.path()))
        .await
        .unwrap();

    let unknown_basin = dashboard
        .views()
        .by_company()
        .rows()
        .iter()
        .find(|r| r.basin_associated_with_facility == UNKNOWN)
        .unwrap();
    assert_eq!(unknown_basin.total_reported_ch4_emissions, 0.0);
    assert_eq!(unknown_basin.missing_rows, 1);

    let categories = dashboard.category_options(Some(2021)).unwrap();
    assert!(!categories.contains(&"Pneumatic Devices".to_string()));
}

#[tokio::test]
async fn test_blank_company_becomes_unknown() {
    let dir = sample_dir();
    let dashboard = EmissionsDashboard::from_config(&snapshot_config(dir.path()))
        .await
        .unwrap();
    let top = dashboard
        .top_companies(&CompanyFilter {
            year: Some(2020),
            basins: vec!["Permian".to_string()],
        })
        .unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].parent_company, UNKNOWN);
    assert_eq!(top[0].state, "TX");
}

#[tokio::test]
async fn test_time_series_needs_both_years() {
    let dir = sample_dir();
    let dashboard = EmissionsDashboard::from_config(&snapshot_config(dir.path()))
        .await
        .unwrap();
    let err = dashboard
        .time_series(&TimeSeriesFilter {
            start_year: Some(2019),
            end_year: None,
            basins: Vec::new(),
        })
        .unwrap_err();
    assert!(err.is_awaiting_input());
    assert!(MethaneError::from(err).is_recoverable());

    let rows = dashboard
        .time_series(&TimeSeriesFilter {
            start_year: Some(2020),
            end_year: Some(2021),
            basins: vec!["Permian".to_string()],
        })
        .unwrap();
    let totals: Vec<(i32, f64)> = rows
        .iter()
        .map(|r| (r.reporting_year, r.total_reported_ch4_emissions))
        .collect();
    assert_eq!(totals, vec![(2020, 40.0), (2021, 575.0)]);
}

#[tokio::test]
async fn test_missing_snapshot_file_fails_startup() {
    let dir = TempDir::new().unwrap();
    let err = EmissionsDashboard::from_config(&snapshot_config(dir.path()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MethaneError::Retrieval(RetrievalError::Snapshot { .. })
    ));
}

#[tokio::test]
async fn test_malformed_year_fails_startup() {
    let dir = TempDir::new().unwrap();
    write_snapshot(
        dir.path(),
        &["1,20x1,Onshore,Permian,Venting,5"],
        &["1,2021,CompanyA,TX"],
    );
    let config = snapshot_config(dir.path());
    let fetcher = SnapshotFetcher::new(dir.path());
    let err = build_canonical_views(&fetcher, &config.source)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MethaneError::Clean(CleanError::MalformedYear { row: 0, .. })
    ));
}

#[tokio::test]
async fn test_missing_column_fails_startup() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("EF_W_EMISSIONS_SOURCE_GHG.csv"),
        "facility_id,reporting_year\n1,2021\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("rlps_ghg_emitter_facilities.csv"),
        format!("{FACILITIES_HEADER}\n1,2021,CompanyA,TX\n"),
    )
    .unwrap();
    let err = EmissionsDashboard::from_config(&snapshot_config(dir.path()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MethaneError::Clean(CleanError::MissingColumn { .. })
    ));
}

#[test]
fn test_loader_picks_up_snapshot_dir_from_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("methane.toml"),
        "[source]\nsnapshot_dir = \"/tmp/methane-snapshot\"\n\n[query]\ntop_n = 5\n",
    )
    .unwrap();
    let config = ConfigLoader::new(dir.path()).load().unwrap();
    assert_eq!(
        config.source.snapshot_dir.as_deref(),
        Some(Path::new("/tmp/methane-snapshot"))
    );
    assert_eq!(config.query.top_n, 5);
}

#[tokio::test]
async fn test_concurrent_sessions_see_identical_results() {
    let dir = sample_dir();
    let dashboard = EmissionsDashboard::from_config(&snapshot_config(dir.path()))
        .await
        .unwrap();
    let filter = StateFilter {
        year: Some(2021),
        categories: Vec::new(),
    };
    let expected = dashboard.state_rollup(&filter).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let session = dashboard.clone();
            let filter = filter.clone();
            thread::spawn(move || session.state_rollup(&filter).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
