use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use ffa_terminal::config::{DEFAULT_ENDPOINT, DashConfig};
use ffa_terminal::export::{CellValue, build_sheets, export_workbook};
use ffa_terminal::payload::{LeagueAnalytics, parse_league_analytics_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture() -> LeagueAnalytics {
    parse_league_analytics_json(&read_fixture("league_analytics.json")).expect("fixture should parse")
}

fn config_from(pairs: &[(&str, &str)]) -> DashConfig {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    DashConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn config_defaults_without_env() {
    let config = config_from(&[]);
    assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(config.request_timeout, Some(Duration::from_secs(120)));
    assert!(!config.demo);
    assert!(config.initial_league_id.is_none());
    assert!(config.log_file.is_none());
    assert_eq!(config.log_filter, "info");
}

#[test]
fn config_reads_overrides() {
    let config = config_from(&[
        ("FFA_ENDPOINT", "https://example.test/analyze"),
        ("FFA_REQUEST_TIMEOUT_SECS", "30"),
        ("FFA_DEMO", "TRUE"),
        ("FFA_EXPORT_DIR", "/tmp/ffa"),
        ("FFA_LEAGUE_ID", " 12345 "),
        ("FFA_LOG_FILE", "ffa.log"),
        ("FFA_LOG", "debug"),
    ]);
    assert_eq!(config.endpoint, "https://example.test/analyze");
    assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    assert!(config.demo);
    assert_eq!(config.export_dir, PathBuf::from("/tmp/ffa"));
    assert_eq!(config.initial_league_id.as_deref(), Some("12345"));
    assert_eq!(config.log_file, Some(PathBuf::from("ffa.log")));
    assert_eq!(config.log_filter, "debug");
}

#[test]
fn config_zero_timeout_disables_it_and_junk_is_ignored() {
    assert_eq!(
        config_from(&[("FFA_REQUEST_TIMEOUT_SECS", "0")]).request_timeout,
        None
    );
    let config = config_from(&[
        ("FFA_REQUEST_TIMEOUT_SECS", "soon"),
        ("FFA_ENDPOINT", "   "),
        ("FFA_DEMO", "nope"),
    ]);
    assert_eq!(config.request_timeout, Some(Duration::from_secs(120)));
    assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    assert!(!config.demo);
}

#[test]
fn sheets_have_headers_and_one_row_per_record() {
    let sheets = build_sheets(&fixture());
    assert_eq!(sheets.managers.len(), 1 + 2);
    assert_eq!(sheets.weekly.len(), 1 + 6);
    assert_eq!(sheets.improvements.len(), 1 + 2);

    assert_eq!(sheets.managers[0][0], CellValue::from("User ID"));
    assert_eq!(sheets.managers[1][1], CellValue::from("alice"));
    assert_eq!(sheets.weekly[1][3], CellValue::from("W"));
    assert_eq!(sheets.weekly[2][6], CellValue::Number(40.0));
    assert_eq!(sheets.improvements[1][3], CellValue::from("Player 222"));
}

#[test]
fn workbook_is_written_to_nested_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("league.xlsx");

    let report = export_workbook(&path, &fixture()).expect("export should succeed");
    assert_eq!(report.managers, 2);
    assert_eq!(report.weeks, 6);
    assert_eq!(report.improvements, 2);
    assert!(fs::metadata(&path).unwrap().len() > 0);
}
