use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use ffa_terminal::demo_feed::DemoSource;
use ffa_terminal::error::{ANALYZE_FAILED_MESSAGE, FetchError};
use ffa_terminal::fetch::LeagueSource;
use ffa_terminal::payload::{LeagueAnalytics, parse_league_analytics_json};
use ffa_terminal::provider::{run_analysis, spawn_provider};
use ffa_terminal::state::{AppState, Delta, ProviderCommand, RequestPhase, apply_delta};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

struct FixtureSource {
    calls: Arc<AtomicUsize>,
}

impl LeagueSource for FixtureSource {
    fn analyze(&mut self, league_id: &str) -> Result<LeagueAnalytics, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if league_id == "bad" {
            return Err(FetchError::Decode("invalid analytics json".to_string()));
        }
        parse_league_analytics_json(&read_fixture("league_analytics.json"))
            .map_err(|err| FetchError::Decode(err.to_string()))
    }

    fn label(&self) -> &'static str {
        "fixture"
    }
}

#[test]
fn run_analysis_wraps_payload() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut source = FixtureSource {
        calls: calls.clone(),
    };
    match run_analysis(&mut source, 7, "123") {
        Delta::AnalysisLoaded { request_id, data } => {
            assert_eq!(request_id, 7);
            assert_eq!(data.manager_analytics.len(), 2);
        }
        other => panic!("unexpected delta {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn run_analysis_maps_errors_to_banner_text() {
    let mut source = FixtureSource {
        calls: Arc::new(AtomicUsize::new(0)),
    };
    match run_analysis(&mut source, 3, "bad") {
        Delta::AnalysisFailed {
            request_id,
            message,
            error,
        } => {
            assert_eq!(request_id, 3);
            assert_eq!(message, ANALYZE_FAILED_MESSAGE);
            assert!(error.contains("malformed analytics payload"));
        }
        other => panic!("unexpected delta {other:?}"),
    }
}

#[test]
fn provider_round_trip_drives_state_to_ready() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let handle = spawn_provider(
        tx,
        cmd_rx,
        Box::new(FixtureSource {
            calls: calls.clone(),
        }),
    );

    let mut state = AppState::new();
    state.input = "123".to_string();
    let cmd = state.begin_analysis().expect("request should start");
    cmd_tx.send(cmd).unwrap();

    let delta = rx.recv_timeout(Duration::from_secs(5)).expect("provider should reply");
    apply_delta(&mut state, delta);
    assert_eq!(state.phase, RequestPhase::Ready);
    assert_eq!(state.cards.len(), 2);

    drop(cmd_tx);
    handle.join().expect("provider thread should exit cleanly");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn provider_writes_exports_off_thread() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exports").join("league.xlsx");
    let data = parse_league_analytics_json(&read_fixture("league_analytics.json")).unwrap();

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let _handle = spawn_provider(tx, cmd_rx, Box::new(DemoSource));
    cmd_tx
        .send(ProviderCommand::Export {
            path: path.clone(),
            data: Box::new(data),
        })
        .unwrap();

    match rx.recv_timeout(Duration::from_secs(10)).expect("export should report") {
        Delta::ExportFinished {
            managers,
            weeks,
            improvements,
            ..
        } => {
            assert_eq!((managers, weeks, improvements), (2, 6, 2));
            assert!(path.exists());
        }
        other => panic!("unexpected delta {other:?}"),
    }
}

#[test]
fn demo_source_feeds_the_dashboard() {
    let mut source = DemoSource;
    assert_eq!(source.label(), "demo");
    let Delta::AnalysisLoaded { data, .. } = run_analysis(&mut source, 1, " 8675309 ") else {
        panic!("demo league should load");
    };
    assert_eq!(data.league.league_id.as_deref(), Some("8675309"));
    assert!(data.analyzed_users().iter().any(|(_, user, _)| user.display_name.is_none()));

    let Delta::AnalysisFailed { message, .. } = run_analysis(&mut source, 2, "404") else {
        panic!("404 ids should fail");
    };
    assert_eq!(message, ANALYZE_FAILED_MESSAGE);
}

#[test]
fn export_still_completes_after_dashboard_closes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("late.xlsx");
    let data = parse_league_analytics_json(&read_fixture("league_analytics.json")).unwrap();

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let handle = spawn_provider(tx, cmd_rx, Box::new(DemoSource));
    drop(rx);
    cmd_tx
        .send(ProviderCommand::Export {
            path: path.clone(),
            data: Box::new(data),
        })
        .unwrap();
    drop(cmd_tx);
    handle.join().expect("provider thread should exit cleanly");

    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while !path.exists() && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(path.exists());
}
