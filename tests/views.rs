use std::fs;
use std::path::PathBuf;

use ffa_terminal::cards::{CardTier, StatTone, build_manager_cards};
use ffa_terminal::detail::ManagerDetail;
use ffa_terminal::overview::{LeagueOverview, ScoringType};
use ffa_terminal::payload::{LeagueAnalytics, LeagueSettings, parse_league_analytics_json};

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

#[test]
fn overview_reads_league_fields() {
    let overview = LeagueOverview::from_payload(&fixture());
    assert_eq!(overview.league_name, "Test League");
    assert_eq!(overview.total_teams, 3);
    assert_eq!(overview.current_week, 3);
    assert_eq!(overview.season, "2024");
    assert_eq!(overview.scoring, ScoringType::HalfPpr);
}

#[test]
fn overview_falls_back_when_fields_missing() {
    let data = parse_league_analytics_json(r#"{"current_week": 0}"#).unwrap();
    let overview = LeagueOverview::from_payload(&data);
    assert_eq!(overview.league_name, "League Overview");
    assert_eq!(overview.total_teams, 0);
    assert_eq!(overview.current_week, 1);
    assert_eq!(overview.season, "2023");
    assert_eq!(overview.scoring, ScoringType::Standard);
}

#[test]
fn scoring_type_prefers_half_ppr() {
    let mut settings = LeagueSettings {
        ppr: true,
        half_ppr: false,
        leg: None,
    };
    assert_eq!(ScoringType::from_settings(&settings), ScoringType::Ppr);
    settings.half_ppr = true;
    assert_eq!(ScoringType::from_settings(&settings), ScoringType::HalfPpr);
    assert_eq!(ScoringType::HalfPpr.label(), "Half PPR");
}

#[test]
fn card_tiers_use_inclusive_thresholds() {
    assert_eq!(CardTier::classify(0.7), CardTier::Winning);
    assert_eq!(CardTier::classify(0.6), CardTier::Winning);
    assert_eq!(CardTier::classify(0.5), CardTier::Average);
    assert_eq!(CardTier::classify(0.4), CardTier::Losing);
    assert_eq!(CardTier::classify(0.0), CardTier::Losing);
}

#[test]
fn cards_follow_user_order_and_skip_missing() {
    let cards = build_manager_cards(&fixture());
    assert_eq!(cards.len(), 2);

    assert_eq!(cards[0].title, "alice");
    assert_eq!(cards[0].tier, CardTier::Winning);
    assert_eq!(cards[0].win_rate.value, "66.7%");
    assert_eq!(cards[0].points_lost.value, "60.0");
    assert_eq!(cards[0].points_lost.tone, StatTone::Negative);
    assert_eq!(cards[0].record.value, "2-1");

    assert_eq!(cards[1].title, "Bench Mob");
    assert_eq!(cards[1].tier, CardTier::Losing);
    assert_eq!(cards[1].points_lost.tone, StatTone::Positive);
    assert_eq!(cards[1].win_rate.tone, StatTone::Negative);
}

#[test]
fn detail_summarizes_season_and_flags_heavy_losses() {
    let detail = ManagerDetail::for_manager(&fixture(), "u1").expect("u1 has analytics");
    assert_eq!(detail.title, "alice - Detailed Analysis");

    let labels: Vec<&str> = detail.summary.iter().map(|line| line.label).collect();
    assert_eq!(
        labels,
        vec![
            "Record",
            "Win Percentage",
            "Total Points",
            "Average Points/Week",
            "Points Lost to Suboptimal Lineups",
        ]
    );
    let lost = detail.summary.last().unwrap();
    assert_eq!(lost.value, "60.0");
    assert!(lost.flagged);

    assert_eq!(detail.weeks.len(), 3);
    assert_eq!(detail.weeks[1].lost, 40.0);
}

#[test]
fn detail_lists_improvements_per_week() {
    let detail = ManagerDetail::for_manager(&fixture(), "u1").unwrap();
    let lines = detail.week_lines();

    assert_eq!(lines[0], "Week 1  [W]");
    assert!(lines.iter().any(|line| line == "  Lineup Improvements:"));
    assert!(lines.iter().any(|line| {
        line == "    + Could have gained +17.5 points by starting Player 222 (22.0 pts) instead of Slow Starter (4.5 pts)"
    }));
}

#[test]
fn detail_is_absent_without_analytics() {
    let data = fixture();
    assert!(ManagerDetail::for_manager(&data, "u3").is_none());
    assert!(ManagerDetail::for_manager(&data, "nobody").is_none());
}

#[test]
fn detail_name_uses_team_name_when_display_name_blank() {
    let detail = ManagerDetail::for_manager(&fixture(), "u2").unwrap();
    assert_eq!(detail.title, "Bench Mob - Detailed Analysis");
    assert!(!detail.summary.last().unwrap().flagged);
}

#[test]
fn detail_marks_unknown_week_numbers() {
    let data = parse_league_analytics_json(
        r#"{"users": [{"user_id": "a", "display_name": "Ann"}],
            "manager_analytics": {"a": {"season_analysis": {"weekly_data": [{"actual_points": 80, "result": "W"}]}}}}"#,
    )
    .unwrap();
    let detail = ManagerDetail::for_manager(&data, "a").unwrap();
    assert_eq!(detail.weeks[0].week, None);
    assert_eq!(detail.week_lines()[0], "Week ?  [W]");
}
