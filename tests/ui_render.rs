use std::fs;
use std::path::PathBuf;

use ratatui::Terminal;
use ratatui::backend::TestBackend;

use ffa_terminal::payload::parse_league_analytics_json;
use ffa_terminal::state::{AppState, Delta, Tab, apply_delta};
use ffa_terminal::ui;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn load(state: &mut AppState, raw: &str) {
    state.input = "123".to_string();
    state.begin_analysis().expect("request should start");
    let request_id = match &state.phase {
        ffa_terminal::state::RequestPhase::Loading { request_id, .. } => *request_id,
        _ => unreachable!(),
    };
    apply_delta(
        state,
        Delta::AnalysisLoaded {
            request_id,
            data: Box::new(parse_league_analytics_json(raw).unwrap()),
        },
    );
}

fn render(state: &AppState) -> String {
    let backend = TestBackend::new(120, 40);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|f| ui::draw(f, state)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    let width = buffer.area.width as usize;
    buffer
        .content
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn idle_screen_prompts_for_league_id() {
    let screen = render(&AppState::new());
    assert!(screen.contains("FANTASY FOOTBALL ANALYTICS"));
    assert!(screen.contains("No league loaded"));
    assert!(screen.contains("Press / to enter a League ID"));
}

#[test]
fn loading_screen_shows_indicator() {
    let mut state = AppState::new();
    state.input = "555".to_string();
    state.begin_analysis().unwrap();
    let screen = render(&state);
    assert!(screen.contains("Analyzing 555..."));
    assert!(screen.contains("Loading league analytics..."));
}

#[test]
fn every_tab_renders_loaded_league() {
    let mut state = AppState::new();
    load(&mut state, &read_fixture("league_analytics.json"));

    let cards = render(&state);
    assert!(cards.contains("Test League"));
    assert!(cards.contains("Half PPR"));
    assert!(cards.contains("alice"));
    assert!(cards.contains("Bench Mob"));
    assert!(!cards.contains("carol"));

    state.tab = Tab::Charts;
    let charts = render(&state);
    assert!(charts.contains("Win Percentage (%)"));
    assert!(charts.contains("Points Lost to Suboptimal Lineups"));

    state.tab = Tab::Trends;
    let trends = render(&state);
    assert!(trends.contains("Weekly Points Trend"));
    assert!(trends.contains("Cumulative Wins"));

    state.tab = Tab::Managers;
    let managers = render(&state);
    assert!(managers.contains("alice - Season Trends"));
    assert!(managers.contains("Weekly Points Performance"));
}

#[test]
fn failed_chart_shows_its_error() {
    let mut state = AppState::new();
    load(
        &mut state,
        r#"{"users": [{"user_id": "a", "display_name": "Ann"}], "manager_analytics": {"a": {"season_analysis": {}}}}"#,
    );
    state.tab = Tab::Trends;
    let screen = render(&state);
    assert!(screen.contains("No weekly data found"));
}

#[test]
fn modal_and_help_overlays_render() {
    let mut state = AppState::new();
    load(&mut state, &read_fixture("league_analytics.json"));
    state.open_detail("u1");
    let screen = render(&state);
    assert!(screen.contains("alice - Detailed Analysis"));
    assert!(screen.contains("Season Summary"));
    assert!(screen.contains("Week 1  [W]"));

    state.close_modal();
    state.help_overlay = true;
    let screen = render(&state);
    assert!(screen.contains("Fantasy Analytics - Help"));
}

#[test]
fn error_banner_replaces_status() {
    let mut state = AppState::new();
    state.input = "   ".to_string();
    assert!(state.begin_analysis().is_none());
    let screen = render(&state);
    assert!(screen.contains("Please enter a valid League ID"));
}
