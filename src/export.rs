use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::payload::{LeagueAnalytics, UNKNOWN_MANAGER, display_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    pub managers: usize,
    pub weeks: usize,
    pub improvements: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Number(value as f64)
    }
}

pub struct ExportSheets {
    pub managers: Vec<Vec<CellValue>>,
    pub weekly: Vec<Vec<CellValue>>,
    pub improvements: Vec<Vec<CellValue>>,
}

/// Builds the sheet rows without touching the filesystem. Each sheet starts
/// with a header row.
pub fn build_sheets(data: &LeagueAnalytics) -> ExportSheets {
    let mut managers = vec![header(&[
        "User ID",
        "Manager",
        "Wins",
        "Losses",
        "Win %",
        "Total Points",
        "Avg Points",
        "Total Optimal",
        "Points Lost",
        "Weeks",
    ])];
    let mut weekly = vec![header(&[
        "User ID", "Manager", "Week", "Result", "Actual", "Optimal", "Lost",
    ])];
    let mut improvements = vec![header(&[
        "User ID",
        "Manager",
        "Week",
        "Benched",
        "Benched Pts",
        "Started",
        "Started Pts",
        "Gain",
    ])];

    for (_, user, analytics) in data.analyzed_users() {
        let name = display_name(user, UNKNOWN_MANAGER);
        let season = &analytics.season_analysis;
        managers.push(vec![
            user.user_id.as_str().into(),
            name.clone().into(),
            season.wins.into(),
            season.losses.into(),
            (season.win_percentage * 100.0).into(),
            season.total_actual_points.into(),
            season.average_actual_points.into(),
            season.total_optimal_points.into(),
            season.points_lost_to_suboptimal_lineups.into(),
            season.total_weeks.into(),
        ]);

        for week in &season.weekly_data {
            weekly.push(vec![
                user.user_id.as_str().into(),
                name.clone().into(),
                week_cell(week.week),
                week.result.code().into(),
                week.actual_points.into(),
                week.optimal_points.into(),
                week.points_lost().into(),
            ]);
            for improvement in &week.improvements {
                improvements.push(vec![
                    user.user_id.as_str().into(),
                    name.clone().into(),
                    week_cell(week.week),
                    improvement.with.label().into(),
                    improvement.with.points.into(),
                    improvement.replaced.label().into(),
                    improvement.replaced.points.into(),
                    improvement.point_gain.into(),
                ]);
            }
        }
    }

    ExportSheets {
        managers,
        weekly,
        improvements,
    }
}

pub fn export_workbook(path: &Path, data: &LeagueAnalytics) -> Result<ExportReport> {
    let sheets = build_sheets(data);
    let report = ExportReport {
        managers: sheets.managers.len() - 1,
        weeks: sheets.weekly.len() - 1,
        improvements: sheets.improvements.len() - 1,
    };

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Managers")?;
        write_rows(sheet, &sheets.managers)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Weekly")?;
        write_rows(sheet, &sheets.weekly)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Improvements")?;
        write_rows(sheet, &sheets.improvements)?;
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create export dir {}", dir.display()))?;
    }
    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;
    Ok(report)
}

fn week_cell(week: Option<u32>) -> CellValue {
    week.map_or_else(|| CellValue::Text(String::new()), CellValue::from)
}

fn header(titles: &[&str]) -> Vec<CellValue> {
    titles.iter().map(|t| CellValue::from(*t)).collect()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<CellValue>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            let written = match value {
                CellValue::Text(text) => worksheet.write_string(r, c, text),
                CellValue::Number(num) => worksheet.write_number(r, c, *num),
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
