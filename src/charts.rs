//! Chart construction from the analytics payload, plus the registry that owns
//! one chart instance per named chart region.
//!
//! Builders are pure: they shape payload data into a [`ChartSpec`]. The
//! [`ChartRegistry`] is the only place instances live, and installing a chart
//! on a canvas always disposes of whatever was bound there first.

use std::collections::HashMap;

use ratatui::style::Color;
use thiserror::Error;

use crate::payload::{GameResult, LeagueAnalytics, UNKNOWN_LABEL, WeeklyResult, display_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanvasId {
    WinPercentage,
    PointsLost,
    WeeklyPointsTrend,
    OptimalVsActual,
    PointsLostPerWeek,
    CumulativeRecord,
    /// Keyed by the manager's index in the user list.
    ManagerPoints(usize),
    ManagerLost(usize),
}

impl CanvasId {
    pub const AGGREGATE: [CanvasId; 2] = [CanvasId::WinPercentage, CanvasId::PointsLost];
    pub const TRENDS: [CanvasId; 4] = [
        CanvasId::WeeklyPointsTrend,
        CanvasId::OptimalVsActual,
        CanvasId::PointsLostPerWeek,
        CanvasId::CumulativeRecord,
    ];

    pub fn is_manager_section(self) -> bool {
        matches!(self, CanvasId::ManagerPoints(_) | CanvasId::ManagerLost(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierColor {
    Green,
    Amber,
    Red,
}

impl TierColor {
    pub fn color(self) -> Color {
        match self {
            TierColor::Green => Color::Rgb(40, 167, 69),
            TierColor::Amber => Color::Rgb(255, 193, 7),
            TierColor::Red => Color::Rgb(220, 53, 69),
        }
    }

    /// Higher is better: green at or above `good`, amber at or above `fair`.
    pub fn at_least(value: f64, good: f64, fair: f64) -> Self {
        if value >= good {
            TierColor::Green
        } else if value >= fair {
            TierColor::Amber
        } else {
            TierColor::Red
        }
    }

    /// Lower is better: green at or below `good`, amber at or below `fair`.
    pub fn at_most(value: f64, good: f64, fair: f64) -> Self {
        if value <= good {
            TierColor::Green
        } else if value <= fair {
            TierColor::Amber
        } else {
            TierColor::Red
        }
    }
}

const PALETTE: [Color; 12] = [
    Color::Rgb(54, 162, 235),
    Color::Rgb(255, 99, 132),
    Color::Rgb(75, 192, 192),
    Color::Rgb(255, 205, 86),
    Color::Rgb(153, 102, 255),
    Color::Rgb(255, 159, 64),
    Color::Rgb(199, 199, 199),
    Color::Rgb(83, 102, 255),
    Color::Rgb(78, 252, 3),
    Color::Rgb(252, 3, 244),
    Color::Rgb(3, 252, 198),
    Color::Rgb(252, 186, 3),
];

/// Stable per-manager color, by position in the user list.
pub fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarDatum {
    pub label: String,
    pub value: f64,
    pub tier: TierColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartSpec {
    pub title: String,
    pub bars: Vec<BarDatum>,
    /// Fixed axis ceiling; `None` scales to the data.
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: Color,
    pub style: LineStyle,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, y)| *y).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChartSpec {
    pub title: String,
    pub y_label: &'static str,
    pub weeks: Vec<u32>,
    pub series: Vec<Series>,
}

impl LineChartSpec {
    pub fn x_bounds(&self) -> [f64; 2] {
        let lo = self.weeks.iter().copied().min().unwrap_or(1) as f64;
        let hi = self.weeks.iter().copied().max().unwrap_or(1) as f64;
        if hi > lo { [lo, hi] } else { [lo, lo + 1.0] }
    }

    /// Always includes zero.
    pub fn y_bounds(&self) -> [f64; 2] {
        let ys = self.series.iter().flat_map(|s| s.points.iter().map(|(_, y)| *y));
        let (lo, hi) = ys.fold((0.0_f64, 0.0_f64), |(lo, hi), y| (lo.min(y), hi.max(y)));
        let hi = if hi <= lo { lo + 1.0 } else { hi * 1.05 };
        [lo, hi]
    }

    pub fn series_named(&self, label: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.label == label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    Bar(BarChartSpec),
    Line(LineChartSpec),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Bar(spec) => &spec.title,
            ChartSpec::Line(spec) => &spec.title,
        }
    }

    pub fn as_line(&self) -> Option<&LineChartSpec> {
        match self {
            ChartSpec::Line(spec) => Some(spec),
            ChartSpec::Bar(_) => None,
        }
    }

    pub fn as_bar(&self) -> Option<&BarChartSpec> {
        match self {
            ChartSpec::Bar(spec) => Some(spec),
            ChartSpec::Line(_) => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    #[error("No users data found")]
    NoUsers,
    #[error("No manager analytics data found")]
    NoManagers,
    #[error("No weekly data found")]
    NoWeeklyData,
    #[error("Weekly data is missing a week number")]
    MissingWeekNumber,
    #[error("No analytics for manager #{0}")]
    MissingManager(usize),
}

pub type ChartResult = Result<ChartSpec, ChartError>;

pub fn win_percentage_chart(data: &LeagueAnalytics) -> ChartResult {
    if data.users.is_empty() {
        return Err(ChartError::NoUsers);
    }
    let bars = data
        .users
        .iter()
        .map(|user| {
            let pct = data
                .analytics_for(&user.user_id)
                .map(|a| a.season_analysis.win_percentage * 100.0)
                .unwrap_or(0.0);
            BarDatum {
                label: display_name(user, UNKNOWN_LABEL),
                value: pct,
                tier: TierColor::at_least(pct, 60.0, 40.0),
            }
        })
        .collect();
    Ok(ChartSpec::Bar(BarChartSpec {
        title: "Win Percentage (%)".to_string(),
        bars,
        max: Some(100.0),
    }))
}

pub fn points_lost_chart(data: &LeagueAnalytics) -> ChartResult {
    if data.users.is_empty() {
        return Err(ChartError::NoUsers);
    }
    let bars = data
        .users
        .iter()
        .map(|user| {
            let lost = data
                .analytics_for(&user.user_id)
                .map(|a| a.season_analysis.points_lost_to_suboptimal_lineups)
                .unwrap_or(0.0);
            BarDatum {
                label: display_name(user, UNKNOWN_LABEL),
                value: lost,
                tier: TierColor::at_most(lost, 50.0, 100.0),
            }
        })
        .collect();
    Ok(ChartSpec::Bar(BarChartSpec {
        title: "Points Lost to Suboptimal Lineups".to_string(),
        bars,
        max: None,
    }))
}

/// The x-axis shared by every trend chart: the week list of the first
/// manager in document order.
pub fn shared_weeks(data: &LeagueAnalytics) -> Result<Vec<u32>, ChartError> {
    if data.users.is_empty() {
        return Err(ChartError::NoUsers);
    }
    let (_, first) = data.manager_analytics.first().ok_or(ChartError::NoManagers)?;
    let weekly = &first.season_analysis.weekly_data;
    if weekly.is_empty() {
        return Err(ChartError::NoWeeklyData);
    }
    week_numbers(weekly)
}

fn week_numbers(weekly: &[WeeklyResult]) -> Result<Vec<u32>, ChartError> {
    weekly
        .iter()
        .map(|w| w.week)
        .collect::<Option<Vec<u32>>>()
        .ok_or(ChartError::MissingWeekNumber)
}

fn pair_with_axis(weeks: &[u32], values: impl IntoIterator<Item = f64>) -> Vec<(f64, f64)> {
    weeks
        .iter()
        .zip(values)
        .map(|(week, value)| (*week as f64, value))
        .collect()
}

fn trend_chart(
    data: &LeagueAnalytics,
    title: &str,
    y_label: &'static str,
    values: impl Fn(&crate::payload::SeasonAnalysis) -> Vec<f64>,
) -> ChartResult {
    let weeks = shared_weeks(data)?;
    let series = data
        .analyzed_users()
        .into_iter()
        .map(|(idx, user, analytics)| Series {
            label: display_name(user, UNKNOWN_LABEL),
            color: palette_color(idx),
            style: LineStyle::Solid,
            points: pair_with_axis(&weeks, values(&analytics.season_analysis)),
        })
        .collect();
    Ok(ChartSpec::Line(LineChartSpec {
        title: title.to_string(),
        y_label,
        weeks,
        series,
    }))
}

pub fn weekly_points_trend(data: &LeagueAnalytics) -> ChartResult {
    trend_chart(data, "Weekly Points Trend", "Points", |season| {
        season.weekly_data.iter().map(|w| w.actual_points).collect()
    })
}

pub fn points_lost_per_week(data: &LeagueAnalytics) -> ChartResult {
    trend_chart(data, "Points Lost Per Week", "Points Lost", |season| {
        season.weekly_data.iter().map(|w| w.points_lost()).collect()
    })
}

pub fn cumulative_record(data: &LeagueAnalytics) -> ChartResult {
    trend_chart(data, "Cumulative Wins", "Cumulative Wins", |season| {
        season
            .weekly_data
            .iter()
            .scan(0u32, |wins, w| {
                if w.result == GameResult::Win {
                    *wins += 1;
                }
                Some(*wins as f64)
            })
            .collect()
    })
}

pub fn optimal_vs_actual(data: &LeagueAnalytics) -> ChartResult {
    let weeks = shared_weeks(data)?;
    let mut series = Vec::new();
    for (idx, user, analytics) in data.analyzed_users() {
        let name = display_name(user, UNKNOWN_LABEL);
        let weekly = &analytics.season_analysis.weekly_data;
        series.push(Series {
            label: format!("{name} - Actual"),
            color: palette_color(idx),
            style: LineStyle::Solid,
            points: pair_with_axis(&weeks, weekly.iter().map(|w| w.actual_points)),
        });
        series.push(Series {
            label: format!("{name} - Optimal"),
            color: palette_color(idx),
            style: LineStyle::Dashed,
            points: pair_with_axis(&weeks, weekly.iter().map(|w| w.optimal_points)),
        });
    }
    Ok(ChartSpec::Line(LineChartSpec {
        title: "Optimal vs Actual Points".to_string(),
        y_label: "Points",
        weeks,
        series,
    }))
}

/// Actual vs optimal for one manager, on that manager's own weeks.
pub fn manager_points_chart(data: &LeagueAnalytics, index: usize) -> ChartResult {
    let (user, analytics) = manager_at(data, index)?;
    let weekly = &analytics.season_analysis.weekly_data;
    let weeks = week_numbers(weekly)?;
    let color = palette_color(index);
    Ok(ChartSpec::Line(LineChartSpec {
        title: format!(
            "{} - Weekly Points Performance",
            display_name(user, UNKNOWN_LABEL)
        ),
        y_label: "Points",
        series: vec![
            Series {
                label: "Actual Points".to_string(),
                color,
                style: LineStyle::Solid,
                points: pair_with_axis(&weeks, weekly.iter().map(|w| w.actual_points)),
            },
            Series {
                label: "Optimal Points".to_string(),
                color,
                style: LineStyle::Dashed,
                points: pair_with_axis(&weeks, weekly.iter().map(|w| w.optimal_points)),
            },
        ],
        weeks,
    }))
}

pub fn manager_lost_chart(data: &LeagueAnalytics, index: usize) -> ChartResult {
    let (_, analytics) = manager_at(data, index)?;
    let bars = analytics
        .season_analysis
        .weekly_data
        .iter()
        .map(|w| {
            let lost = w.points_lost();
            BarDatum {
                label: w.week.map_or_else(|| "W?".to_string(), |n| format!("W{n}")),
                value: lost,
                tier: TierColor::at_most(lost, 5.0, 15.0),
            }
        })
        .collect();
    Ok(ChartSpec::Bar(BarChartSpec {
        title: "Points Lost Per Week".to_string(),
        bars,
        max: None,
    }))
}

fn manager_at(
    data: &LeagueAnalytics,
    index: usize,
) -> Result<(&crate::payload::User, &crate::payload::ManagerAnalytics), ChartError> {
    let user = data.users.get(index).ok_or(ChartError::MissingManager(index))?;
    let analytics = data
        .analytics_for(&user.user_id)
        .ok_or(ChartError::MissingManager(index))?;
    Ok((user, analytics))
}

#[derive(Debug, Clone)]
pub struct ChartInstance {
    pub instance_id: u64,
    pub chart: ChartResult,
}

/// Owns every live chart, keyed by canvas. At most one instance per canvas.
#[derive(Debug, Default)]
pub struct ChartRegistry {
    slots: HashMap<CanvasId, ChartInstance>,
    next_instance: u64,
    created: u64,
    disposed: u64,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disposes the instance bound to `canvas` (if any), then binds a new one.
    pub fn install(&mut self, canvas: CanvasId, chart: ChartResult) -> u64 {
        self.dispose(canvas);
        self.next_instance += 1;
        self.created += 1;
        let instance_id = self.next_instance;
        self.slots.insert(canvas, ChartInstance { instance_id, chart });
        instance_id
    }

    pub fn dispose(&mut self, canvas: CanvasId) -> bool {
        if self.slots.remove(&canvas).is_some() {
            self.disposed += 1;
            true
        } else {
            false
        }
    }

    pub fn dispose_where(&mut self, pred: impl Fn(CanvasId) -> bool) {
        let doomed: Vec<CanvasId> = self.slots.keys().copied().filter(|c| pred(*c)).collect();
        for canvas in doomed {
            self.dispose(canvas);
        }
    }

    pub fn clear(&mut self) {
        self.dispose_where(|_| true);
    }

    pub fn get(&self, canvas: CanvasId) -> Option<&ChartInstance> {
        self.slots.get(&canvas)
    }

    pub fn chart(&self, canvas: CanvasId) -> Option<&ChartResult> {
        self.slots.get(&canvas).map(|slot| &slot.chart)
    }

    pub fn live_count(&self) -> usize {
        self.slots.len()
    }

    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn disposed(&self) -> u64 {
        self.disposed
    }

    pub fn failures(&self) -> Vec<(CanvasId, &ChartError)> {
        let mut out: Vec<(CanvasId, &ChartError)> = self
            .slots
            .iter()
            .filter_map(|(canvas, slot)| slot.chart.as_ref().err().map(|err| (*canvas, err)))
            .collect();
        out.sort_by_key(|(canvas, _)| *canvas);
        out
    }
}

pub fn render_aggregate_charts(registry: &mut ChartRegistry, data: &LeagueAnalytics) {
    registry.install(CanvasId::WinPercentage, win_percentage_chart(data));
    registry.install(CanvasId::PointsLost, points_lost_chart(data));
}

pub fn render_trend_charts(registry: &mut ChartRegistry, data: &LeagueAnalytics) {
    registry.install(CanvasId::WeeklyPointsTrend, weekly_points_trend(data));
    registry.install(CanvasId::OptimalVsActual, optimal_vs_actual(data));
    registry.install(CanvasId::PointsLostPerWeek, points_lost_per_week(data));
    registry.install(CanvasId::CumulativeRecord, cumulative_record(data));
}

/// Rebuilds every per-manager section chart. Sections left over from a
/// previous, larger league are disposed first.
pub fn render_manager_sections(registry: &mut ChartRegistry, data: &LeagueAnalytics) {
    registry.dispose_where(CanvasId::is_manager_section);
    for (idx, _, _) in data.analyzed_users() {
        registry.install(CanvasId::ManagerPoints(idx), manager_points_chart(data, idx));
        registry.install(CanvasId::ManagerLost(idx), manager_lost_chart(data, idx));
    }
}

pub fn render_all(registry: &mut ChartRegistry, data: &LeagueAnalytics) {
    render_aggregate_charts(registry, data);
    render_trend_charts(registry, data);
    render_manager_sections(registry, data);
}
