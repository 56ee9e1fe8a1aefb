use crate::payload::{LeagueAnalytics, LeagueSettings};

const FALLBACK_LEAGUE_NAME: &str = "League Overview";
const FALLBACK_SEASON: &str = "2023";
const FALLBACK_WEEK: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringType {
    Standard,
    Ppr,
    HalfPpr,
}

impl ScoringType {
    /// Half-PPR takes precedence over full PPR.
    pub fn from_settings(settings: &LeagueSettings) -> Self {
        if settings.half_ppr {
            ScoringType::HalfPpr
        } else if settings.ppr {
            ScoringType::Ppr
        } else {
            ScoringType::Standard
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoringType::Standard => "Standard",
            ScoringType::Ppr => "PPR",
            ScoringType::HalfPpr => "Half PPR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueOverview {
    pub league_name: String,
    pub total_teams: usize,
    pub current_week: u32,
    pub season: String,
    pub scoring: ScoringType,
}

impl LeagueOverview {
    pub fn from_payload(data: &LeagueAnalytics) -> Self {
        let league_name = data
            .league
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_LEAGUE_NAME)
            .to_string();
        let current_week = data
            .current_week
            .filter(|week| *week > 0)
            .unwrap_or(FALLBACK_WEEK);
        let season = data
            .season
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(FALLBACK_SEASON)
            .to_string();

        Self {
            league_name,
            total_teams: data.users.len(),
            current_week,
            season,
            scoring: ScoringType::from_settings(&data.league.settings),
        }
    }
}
