use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::FetchError;
use crate::fetch::{LeagueSource, validate_league_id};
use crate::payload::{
    GameResult, Improvement, League, LeagueAnalytics, LeagueSettings, ManagerAnalytics,
    ManagerTable, PlayerLine, SeasonAnalysis, User, UserMetadata, WeeklyResult,
};

const DEMO_WEEKS: u32 = 12;
const MANAGERS: [(&str, Option<&str>); 10] = [
    ("gridiron_greg", Some("Greg's Gladiators")),
    ("waiverwire_wendy", None),
    ("", Some("The Benchwarmers")),
    ("taco_tuesday", Some("Taco Corp")),
    ("kickoff_kim", None),
    ("redzone_rob", Some("Red Zone Rebels")),
    ("fourth_and_fran", None),
    ("blitz_bailey", Some("Blitz Brigade")),
    ("pylon_pat", None),
    ("hail_mary_hugo", Some("Hail Marys")),
];
const PLAYERS: [(&str, &str); 16] = [
    ("J. Carter", "WR"),
    ("M. Ellis", "RB"),
    ("D. Okafor", "WR"),
    ("T. Brandt", "TE"),
    ("L. Moreno", "RB"),
    ("A. Whitfield", "QB"),
    ("R. Kessler", "WR"),
    ("S. Duval", "RB"),
    ("B. Nakamura", "TE"),
    ("C. Pruitt", "WR"),
    ("K. Abara", "RB"),
    ("G. Lindqvist", "K"),
    ("H. Osei", "WR"),
    ("P. Varga", "RB"),
    ("N. Castillo", "QB"),
    ("E. Brennan", "TE"),
];

/// Offline stand-in for the analytics backend. The payload is a pure
/// function of the league id.
#[derive(Debug, Default)]
pub struct DemoSource;

impl LeagueSource for DemoSource {
    fn analyze(&mut self, league_id: &str) -> Result<LeagueAnalytics, FetchError> {
        let league_id = validate_league_id(league_id)?;
        if league_id.starts_with("404") {
            return Err(FetchError::Status(404));
        }
        Ok(demo_league(league_id))
    }

    fn label(&self) -> &'static str {
        "demo"
    }
}

pub fn demo_league(league_id: &str) -> LeagueAnalytics {
    let mut hasher = DefaultHasher::new();
    league_id.hash(&mut hasher);
    let mut rng = StdRng::seed_from_u64(hasher.finish());

    let users: Vec<User> = MANAGERS
        .iter()
        .enumerate()
        .map(|(idx, (name, team))| User {
            user_id: format!("{}", 700_000 + idx * 37),
            display_name: (!name.is_empty()).then(|| name.to_string()),
            metadata: team.map(|t| UserMetadata {
                team_name: Some(t.to_string()),
            }),
        })
        .collect();

    let n = users.len();
    let mut weekly: Vec<Vec<WeeklyResult>> = vec![Vec::new(); n];
    for week in 1..=DEMO_WEEKS {
        let scores: Vec<(f64, f64, Vec<Improvement>)> =
            (0..n).map(|_| seed_week(&mut rng)).collect();
        for (slot, opponent) in round_robin_pairs(n, week) {
            let (actual, optimal, improvements) = &scores[slot];
            let result = if *actual > scores[opponent].0 {
                GameResult::Win
            } else {
                GameResult::Loss
            };
            weekly[slot].push(WeeklyResult {
                week: Some(week),
                actual_points: *actual,
                optimal_points: *optimal,
                result,
                improvements: improvements.clone(),
            });
        }
    }

    let mut manager_analytics = ManagerTable::new();
    for (user, weeks) in users.iter().zip(weekly) {
        manager_analytics.insert(
            user.user_id.clone(),
            ManagerAnalytics {
                user_info: Some(user.clone()),
                season_analysis: summarize(weeks),
            },
        );
    }

    let half_ppr = rng.gen_bool(0.5);
    LeagueAnalytics {
        league: League {
            league_id: Some(league_id.to_string()),
            name: Some(format!("Demo League {league_id}")),
            season: Some("2024".to_string()),
            settings: LeagueSettings {
                ppr: !half_ppr,
                half_ppr,
                leg: Some(DEMO_WEEKS),
            },
            roster_positions: ["QB", "RB", "RB", "WR", "WR", "TE", "FLEX", "K", "DEF"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
        },
        users,
        manager_analytics,
        current_week: Some(DEMO_WEEKS),
        season: Some("2024".to_string()),
    }
}

fn seed_week(rng: &mut StdRng) -> (f64, f64, Vec<Improvement>) {
    let actual = round1(rng.gen_range(72.0..148.0));
    let swaps = rng.gen_range(0..=3);
    let mut improvements = Vec::with_capacity(swaps);
    for _ in 0..swaps {
        let (benched, bench_pos) = PLAYERS[rng.gen_range(0..PLAYERS.len())];
        let (started, start_pos) = PLAYERS[rng.gen_range(0..PLAYERS.len())];
        let started_pts = round1(rng.gen_range(0.0..12.0));
        let gain = round1(rng.gen_range(0.5..18.0));
        improvements.push(Improvement {
            replaced: PlayerLine {
                player_id: format!("{}", rng.gen_range(1000..9999)),
                name: Some(started.to_string()),
                points: started_pts,
                position: Some(start_pos.to_string()),
            },
            with: PlayerLine {
                player_id: format!("{}", rng.gen_range(1000..9999)),
                name: Some(benched.to_string()),
                points: round1(started_pts + gain),
                position: Some(bench_pos.to_string()),
            },
            point_gain: gain,
        });
    }
    let lost: f64 = improvements.iter().map(|i| i.point_gain).sum();
    (actual, round1(actual + lost), improvements)
}

/// Circle-method pairing for `week`; with an odd count one slot faces itself
/// and records a loss.
fn round_robin_pairs(n: usize, week: u32) -> Vec<(usize, usize)> {
    if n < 2 {
        return (0..n).map(|i| (i, i)).collect();
    }
    let m = if n % 2 == 0 { n } else { n + 1 };
    let rotation = (week as usize - 1) % (m - 1);
    let mut order: Vec<usize> = (1..m).collect();
    order.rotate_left(rotation);
    order.insert(0, 0);

    let mut pairs = Vec::with_capacity(n);
    for i in 0..m / 2 {
        let (a, b) = (order[i], order[m - 1 - i]);
        match (a < n, b < n) {
            (true, true) => {
                pairs.push((a, b));
                pairs.push((b, a));
            }
            (true, false) => pairs.push((a, a)),
            (false, true) => pairs.push((b, b)),
            (false, false) => {}
        }
    }
    pairs.sort_unstable();
    pairs
}

fn summarize(weekly_data: Vec<WeeklyResult>) -> SeasonAnalysis {
    let wins = weekly_data
        .iter()
        .filter(|w| w.result == GameResult::Win)
        .count() as u32;
    let losses = weekly_data.len() as u32 - wins;
    let total_actual: f64 = weekly_data.iter().map(|w| w.actual_points).sum();
    let total_optimal: f64 = weekly_data.iter().map(|w| w.optimal_points).sum();
    let weeks = weekly_data.len() as u32;
    let per_week = |total: f64| if weeks > 0 { total / weeks as f64 } else { 0.0 };
    SeasonAnalysis {
        wins,
        losses,
        win_percentage: if wins + losses > 0 {
            wins as f64 / (wins + losses) as f64
        } else {
            0.0
        },
        total_actual_points: round1(total_actual),
        total_optimal_points: round1(total_optimal),
        average_actual_points: per_week(total_actual),
        average_optimal_points: per_week(total_optimal),
        points_lost_to_suboptimal_lineups: round1(total_optimal - total_actual),
        total_weeks: weeks,
        weekly_data,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
