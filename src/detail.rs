use crate::payload::{
    GameResult, Improvement, LeagueAnalytics, UNKNOWN_MANAGER, WeeklyResult, display_name,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    pub label: &'static str,
    pub value: String,
    /// Rendered as a warning (red) rather than plain.
    pub flagged: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekEntry {
    pub week: Option<u32>,
    pub result: GameResult,
    pub actual: f64,
    pub optimal: f64,
    pub lost: f64,
    pub improvements: Vec<String>,
}

impl WeekEntry {
    pub fn from_week(week: &WeeklyResult) -> Self {
        Self {
            week: week.week,
            result: week.result,
            actual: week.actual_points,
            optimal: week.optimal_points,
            lost: week.points_lost(),
            improvements: week.improvements.iter().map(improvement_text).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManagerDetail {
    pub user_id: String,
    pub title: String,
    pub summary: Vec<SummaryLine>,
    pub weeks: Vec<WeekEntry>,
}

impl ManagerDetail {
    /// `None` when the manager has no analytics entry; opening the modal is
    /// then a no-op.
    pub fn for_manager(data: &LeagueAnalytics, user_id: &str) -> Option<Self> {
        let analytics = data.analytics_for(user_id)?;
        let season = &analytics.season_analysis;

        let name = analytics
            .user_info
            .as_ref()
            .or_else(|| data.user(user_id))
            .map(|user| display_name(user, UNKNOWN_MANAGER))
            .unwrap_or_else(|| UNKNOWN_MANAGER.to_string());

        let lost = season.points_lost_to_suboptimal_lineups;
        let summary = vec![
            SummaryLine {
                label: "Record",
                value: season.record(),
                flagged: false,
            },
            SummaryLine {
                label: "Win Percentage",
                value: format!("{:.1}%", season.win_percentage * 100.0),
                flagged: false,
            },
            SummaryLine {
                label: "Total Points",
                value: format!("{:.1}", season.total_actual_points),
                flagged: false,
            },
            SummaryLine {
                label: "Average Points/Week",
                value: format!("{:.1}", season.average_actual_points),
                flagged: false,
            },
            SummaryLine {
                label: "Points Lost to Suboptimal Lineups",
                value: format!("{lost:.1}"),
                flagged: lost > 50.0,
            },
        ];

        Some(Self {
            user_id: user_id.to_string(),
            title: format!("{name} - Detailed Analysis"),
            summary,
            weeks: season.weekly_data.iter().map(WeekEntry::from_week).collect(),
        })
    }

    /// Lines of the scrollable weekly breakdown, as shown in the modal.
    pub fn week_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for entry in &self.weeks {
            let week = entry.week.map_or_else(|| "?".to_string(), |n| n.to_string());
            lines.push(format!("Week {week}  [{}]", entry.result.code()));
            lines.push(format!(
                "  Actual {:.1} | Optimal {:.1} | Lost {:.1}",
                entry.actual, entry.optimal, entry.lost
            ));
            if !entry.improvements.is_empty() {
                lines.push("  Lineup Improvements:".to_string());
                lines.extend(entry.improvements.iter().map(|text| format!("    + {text}")));
            }
            lines.push(String::new());
        }
        lines
    }
}

pub fn improvement_text(improvement: &Improvement) -> String {
    format!(
        "Could have gained +{:.1} points by starting {} ({:.1} pts) instead of {} ({:.1} pts)",
        improvement.point_gain,
        improvement.with.label(),
        improvement.with.points,
        improvement.replaced.label(),
        improvement.replaced.points,
    )
}
