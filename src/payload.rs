use std::collections::HashMap;
use std::fmt;

use anyhow::{Context, Result, bail};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const UNKNOWN_MANAGER: &str = "Unknown Manager";
pub const UNKNOWN_LABEL: &str = "Unknown";

/// The analytics document returned by the backend for one league.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeagueAnalytics {
    #[serde(default, deserialize_with = "or_default")]
    pub league: League,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub users: Vec<User>,
    #[serde(default)]
    pub manager_analytics: ManagerTable,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub current_week: Option<u32>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub season: Option<String>,
}

impl LeagueAnalytics {
    pub fn analytics_for(&self, user_id: &str) -> Option<&ManagerAnalytics> {
        self.manager_analytics.get(user_id)
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    /// Users that have an analytics entry, in user-list order, with their list index.
    pub fn analyzed_users(&self) -> Vec<(usize, &User, &ManagerAnalytics)> {
        self.users
            .iter()
            .enumerate()
            .filter_map(|(idx, user)| self.analytics_for(&user.user_id).map(|a| (idx, user, a)))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct League {
    #[serde(default, deserialize_with = "lenient_string")]
    pub league_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub season: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub settings: LeagueSettings,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub roster_positions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeagueSettings {
    #[serde(default, deserialize_with = "truthy")]
    pub ppr: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub half_ppr: bool,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub leg: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "id_string")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub metadata: Option<UserMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetadata {
    #[serde(default, deserialize_with = "lenient_string")]
    pub team_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManagerAnalytics {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub user_info: Option<User>,
    #[serde(default, deserialize_with = "or_default")]
    pub season_analysis: SeasonAnalysis,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonAnalysis {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub wins: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub losses: u32,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub win_percentage: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_actual_points: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_optimal_points: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_actual_points: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_optimal_points: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub points_lost_to_suboptimal_lineups: f64,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub total_weeks: u32,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub weekly_data: Vec<WeeklyResult>,
}

impl SeasonAnalysis {
    pub fn record(&self) -> String {
        format!("{}-{}", self.wins, self.losses)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeeklyResult {
    /// `None` when the backend omitted or mangled the week number.
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub week: Option<u32>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub actual_points: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub optimal_points: f64,
    #[serde(default)]
    pub result: GameResult,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub improvements: Vec<Improvement>,
}

impl WeeklyResult {
    pub fn points_lost(&self) -> f64 {
        self.optimal_points - self.actual_points
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameResult {
    Win,
    #[default]
    Loss,
}

impl GameResult {
    pub fn code(self) -> &'static str {
        match self {
            GameResult::Win => "W",
            GameResult::Loss => "L",
        }
    }
}

impl<'de> Deserialize<'de> for GameResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // "W" or "w" is a win; any other value, including none, is a loss.
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw.as_ref().and_then(Value::as_str).map(str::trim) {
            Some("W") | Some("w") => GameResult::Win,
            _ => GameResult::Loss,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Improvement {
    #[serde(default, deserialize_with = "or_default")]
    pub replaced: PlayerLine,
    #[serde(default, deserialize_with = "or_default")]
    pub with: PlayerLine,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub point_gain: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerLine {
    #[serde(default, deserialize_with = "id_string")]
    pub player_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub points: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub position: Option<String>,
}

impl PlayerLine {
    pub fn label(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Player {}", self.player_id),
        }
    }
}

/// Manager analytics keyed by user id, in the order the document listed them.
#[derive(Debug, Clone, Default)]
pub struct ManagerTable {
    entries: Vec<(String, ManagerAnalytics)>,
    index: HashMap<String, usize>,
}

impl ManagerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces an existing entry in place; new ids are appended.
    pub fn insert(&mut self, user_id: impl Into<String>, analytics: ManagerAnalytics) {
        let user_id = user_id.into();
        if let Some(&pos) = self.index.get(&user_id) {
            self.entries[pos].1 = analytics;
            return;
        }
        self.index.insert(user_id.clone(), self.entries.len());
        self.entries.push((user_id, analytics));
    }

    pub fn get(&self, user_id: &str) -> Option<&ManagerAnalytics> {
        self.index.get(user_id).map(|&pos| &self.entries[pos].1)
    }

    pub fn first(&self) -> Option<(&str, &ManagerAnalytics)> {
        self.entries.first().map(|(id, a)| (id.as_str(), a))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManagerAnalytics)> {
        self.entries.iter().map(|(id, a)| (id.as_str(), a))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for ManagerTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = ManagerTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of user id to manager analytics")
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<ManagerTable, E> {
                Ok(ManagerTable::new())
            }

            fn visit_none<E: de::Error>(self) -> std::result::Result<ManagerTable, E> {
                Ok(ManagerTable::new())
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<ManagerTable, A::Error> {
                let mut table = ManagerTable::new();
                while let Some((id, raw)) = access.next_entry::<String, Value>()? {
                    // An entry that is not an object is skipped, not fatal.
                    if let Ok(analytics) = serde_json::from_value::<ManagerAnalytics>(raw) {
                        table.insert(id, analytics);
                    }
                }
                Ok(table)
            }
        }

        deserializer.deserialize_any(TableVisitor)
    }
}

pub fn parse_league_analytics_json(raw: &str) -> Result<LeagueAnalytics> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        bail!("empty analytics payload");
    }
    serde_json::from_str(trimmed).context("invalid analytics json")
}

/// Display name, then team nickname, then `fallback`.
pub fn display_name(user: &User, fallback: &str) -> String {
    let team_name = user.metadata.as_ref().and_then(|m| m.team_name.as_deref());
    [user.display_name.as_deref(), team_name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        _ => false,
    })
}

/// Nested objects that are null or the wrong shape fall back to their default.
fn or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient_opt(deserializer)?.unwrap_or_default())
}

fn lenient_opt<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Null gives an empty list; elements that fail to decode are dropped.
fn lenient_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn number(value: Option<Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    Ok(number(Option::<Value>::deserialize(deserializer)?).unwrap_or(0.0))
}

fn lenient_opt_u32<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u32>, D::Error> {
    Ok(number(Option::<Value>::deserialize(deserializer)?)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= u32::MAX as f64)
        .map(|v| v as u32))
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    Ok(lenient_opt_u32(deserializer)?.unwrap_or(0))
}

fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}
