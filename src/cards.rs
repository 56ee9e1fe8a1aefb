use crate::payload::{LeagueAnalytics, SeasonAnalysis, UNKNOWN_MANAGER, display_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTier {
    Winning,
    Average,
    Losing,
}

impl CardTier {
    pub fn classify(win_percentage: f64) -> Self {
        if win_percentage >= 0.6 {
            CardTier::Winning
        } else if win_percentage <= 0.4 {
            CardTier::Losing
        } else {
            CardTier::Average
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CardTier::Winning => "winning",
            CardTier::Average => "average",
            CardTier::Losing => "losing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatTone {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatTile {
    pub label: &'static str,
    pub value: String,
    pub tone: StatTone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManagerCard {
    pub user_id: String,
    pub title: String,
    pub tier: CardTier,
    pub win_rate: StatTile,
    pub avg_points: StatTile,
    pub points_lost: StatTile,
    pub record: StatTile,
}

impl ManagerCard {
    pub fn new(user_id: &str, title: String, season: &SeasonAnalysis) -> Self {
        let win_pct = season.win_percentage;
        Self {
            user_id: user_id.to_string(),
            title,
            tier: CardTier::classify(win_pct),
            win_rate: StatTile {
                label: "Win Rate",
                value: format!("{:.1}%", win_pct * 100.0),
                tone: if win_pct >= 0.5 {
                    StatTone::Positive
                } else {
                    StatTone::Negative
                },
            },
            avg_points: StatTile {
                label: "Avg Points",
                value: format!("{:.1}", season.average_actual_points),
                tone: if season.average_actual_points >= 100.0 {
                    StatTone::Positive
                } else {
                    StatTone::Neutral
                },
            },
            points_lost: points_lost_tile(season.points_lost_to_suboptimal_lineups),
            record: StatTile {
                label: "Record",
                value: season.record(),
                tone: StatTone::Neutral,
            },
        }
    }

    pub fn tiles(&self) -> [&StatTile; 4] {
        [&self.win_rate, &self.avg_points, &self.points_lost, &self.record]
    }
}

pub fn points_lost_tile(points_lost: f64) -> StatTile {
    StatTile {
        label: "Points Lost",
        value: format!("{points_lost:.1}"),
        tone: if points_lost <= 50.0 {
            StatTone::Positive
        } else {
            StatTone::Negative
        },
    }
}

/// One card per user with analytics, in user-list order. Users without an
/// analytics entry are skipped.
pub fn build_manager_cards(data: &LeagueAnalytics) -> Vec<ManagerCard> {
    data.analyzed_users()
        .into_iter()
        .map(|(_, user, analytics)| {
            ManagerCard::new(
                &user.user_id,
                display_name(user, UNKNOWN_MANAGER),
                &analytics.season_analysis,
            )
        })
        .collect()
}
