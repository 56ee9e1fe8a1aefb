use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph,
    Tabs, Wrap,
};

use crate::cards::{CardTier, ManagerCard, StatTile, StatTone, points_lost_tile};
use crate::charts::{BarChartSpec, CanvasId, ChartResult, ChartSpec, LineChartSpec, LineStyle};
use crate::detail::ManagerDetail;
use crate::payload::{UNKNOWN_MANAGER, display_name};
use crate::state::{AppState, InputMode, ModalState, RequestPhase, Tab};

const CARD_HEIGHT: u16 = 6;
const CARD_MIN_WIDTH: u16 = 34;

pub fn draw(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_input_bar(frame, chunks[1], state);

    if state.results_visible {
        render_results(frame, chunks[2], state);
    } else {
        render_placeholder(frame, chunks[2], state);
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[3]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[4]);

    if let Some(modal) = state.modal.as_ref() {
        render_modal(frame, frame.size(), modal);
    }
    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

pub fn header_text(state: &AppState) -> String {
    let line1 = "  FANTASY FOOTBALL ANALYTICS".to_string();
    let line2 = match state.overview.as_ref() {
        Some(o) => format!(
            "  {} | Teams: {} | Week: {} | Season: {} | Scoring: {}",
            o.league_name,
            o.total_teams,
            o.current_week,
            o.season,
            o.scoring.label()
        ),
        None => "  No league loaded".to_string(),
    };
    format!("{line1}\n{line2}")
}

fn render_input_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(44)])
        .split(area);

    let editing = state.input_mode == InputMode::Editing;
    let cursor = if editing { "_" } else { "" };
    let input_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let input = Paragraph::new(format!("{}{cursor}", state.input))
        .style(input_style)
        .block(Block::default().title("League ID").borders(Borders::ALL));
    frame.render_widget(input, cols[0]);

    let (status, style) = status_line(state);
    let status = Paragraph::new(status)
        .style(style)
        .block(Block::default().title("Status").borders(Borders::ALL));
    frame.render_widget(status, cols[1]);
}

/// Loading indicator and error banner share one region; loading wins.
pub fn status_line(state: &AppState) -> (String, Style) {
    if let RequestPhase::Loading {
        league_id, started, ..
    } = &state.phase
    {
        const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
        let tick = (started.elapsed().as_millis() / 250) as usize % SPINNER.len();
        return (
            format!("{} Analyzing {league_id}...", SPINNER[tick]),
            Style::default().fg(Color::Cyan),
        );
    }
    if let Some(err) = state.error.as_ref() {
        return (err.clone(), Style::default().fg(Color::Red));
    }
    match (&state.updated_at, state.last_request_duration) {
        (Some(at), Some(took)) => (
            format!("Updated {at} ({:.1}s, {})", took.as_secs_f32(), state.source_label),
            Style::default().fg(Color::Green),
        ),
        (Some(at), None) => (format!("Updated {at}"), Style::default().fg(Color::Green)),
        _ => ("Idle".to_string(), Style::default().fg(Color::DarkGray)),
    }
}

fn render_placeholder(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = match state.phase {
        RequestPhase::Loading { .. } => "Loading league analytics...",
        RequestPhase::Failed => "No results. Fix the League ID and press Enter to retry.",
        _ => "Press / to enter a League ID, then Enter to analyze.",
    };
    let placeholder = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(placeholder, area);
}

fn render_results(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let titles: Vec<String> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| format!("{} {}", i + 1, tab.label()))
        .collect();
    let selected = Tab::ALL.iter().position(|t| *t == state.tab).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
    frame.render_widget(tabs, rows[0]);

    match state.tab {
        Tab::Cards => render_cards(frame, rows[1], state),
        Tab::Charts => render_aggregate(frame, rows[1], state),
        Tab::Trends => render_trends(frame, rows[1], state),
        Tab::Managers => render_manager_section(frame, rows[1], state),
    }
}

fn render_cards(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.cards.is_empty() {
        let empty = Paragraph::new("No manager analytics in this league")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }
    if area.height < CARD_HEIGHT {
        let empty = Paragraph::new("Card grid needs more height")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let per_row = (area.width / CARD_MIN_WIDTH).clamp(1, 3) as usize;
    let total_rows = state.cards.len().div_ceil(per_row);
    let visible = (area.height / CARD_HEIGHT) as usize;
    let (start, end) = visible_range(state.selected_card / per_row, total_rows, visible);

    for (i, row) in (start..end).enumerate() {
        let row_area = Rect {
            x: area.x,
            y: area.y + (i as u16) * CARD_HEIGHT,
            width: area.width,
            height: CARD_HEIGHT,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, per_row as u32); per_row])
            .split(row_area);
        for (col, cell) in cols.iter().enumerate() {
            let idx = row * per_row + col;
            if let Some(card) = state.cards.get(idx) {
                render_card(frame, *cell, card, idx == state.selected_card);
            }
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, card: &ManagerCard, selected: bool) {
    let mut title_style = Style::default()
        .fg(tier_color(card.tier))
        .add_modifier(Modifier::BOLD);
    if selected {
        title_style = title_style.add_modifier(Modifier::REVERSED);
    }
    let block = Block::default()
        .title(Span::styled(format!(" {} ", card.title), title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tier_color(card.tier)));

    let [win_rate, avg_points, points_lost, record] = card.tiles();
    let lines = vec![
        Line::from(tile_spans(&[win_rate, avg_points])),
        Line::from(tile_spans(&[points_lost, record])),
        Line::from(Span::styled(
            "Enter for detailed analysis",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn tile_spans(tiles: &[&StatTile]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, tile) in tiles.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::raw(format!("{}: ", tile.label)));
        spans.push(Span::styled(
            tile.value.clone(),
            Style::default()
                .fg(tone_color(tile.tone))
                .add_modifier(Modifier::BOLD),
        ));
    }
    spans
}

fn render_aggregate(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    for (canvas, slot) in CanvasId::AGGREGATE.iter().zip(rows.iter()) {
        render_chart_slot(frame, *slot, state.charts.chart(*canvas));
    }
}

fn render_trends(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let mut cells = Vec::with_capacity(4);
    for row in rows.iter() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(*row);
        cells.extend(cols.iter().copied());
    }
    for (canvas, cell) in CanvasId::TRENDS.iter().zip(cells) {
        render_chart_slot(frame, cell, state.charts.chart(*canvas));
    }
}

fn render_manager_section(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(data) = state.data.as_ref() else {
        return;
    };
    let analyzed = data.analyzed_users();
    if analyzed.is_empty() {
        let empty = Paragraph::new("No manager analytics in this league")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(30)])
        .split(area);

    let list: Vec<Line> = analyzed
        .iter()
        .enumerate()
        .map(|(pos, (_, user, _))| {
            let name = display_name(user, UNKNOWN_MANAGER);
            if pos == state.selected_section {
                Line::from(Span::styled(
                    format!("> {name}"),
                    Style::default().add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!("  {name}"))
            }
        })
        .collect();
    let scroll = state
        .selected_section
        .saturating_sub(cols[0].height.saturating_sub(3) as usize) as u16;
    frame.render_widget(
        Paragraph::new(list)
            .scroll((scroll, 0))
            .block(Block::default().title("Managers").borders(Borders::ALL)),
        cols[0],
    );

    let Some((idx, user, analytics)) = analyzed.get(state.selected_section) else {
        return;
    };
    let season = &analytics.season_analysis;
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)])
        .split(cols[1]);

    let tiles = [
        StatTile {
            label: "Total Points",
            value: format!("{:.1}", season.total_actual_points),
            tone: StatTone::Positive,
        },
        points_lost_tile(season.points_lost_to_suboptimal_lineups),
        StatTile {
            label: "Avg Points/Week",
            value: format!("{:.1}", season.average_actual_points),
            tone: StatTone::Neutral,
        },
        StatTile {
            label: "Record",
            value: season.record(),
            tone: StatTone::Neutral,
        },
    ];
    let tile_refs: Vec<&StatTile> = tiles.iter().collect();
    let title = format!("{} - Season Trends", display_name(user, UNKNOWN_MANAGER));
    frame.render_widget(
        Paragraph::new(Line::from(tile_spans(&tile_refs)))
            .block(Block::default().title(title).borders(Borders::ALL)),
        right[0],
    );

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(right[1]);
    render_chart_slot(frame, charts[0], state.charts.chart(CanvasId::ManagerPoints(*idx)));
    render_chart_slot(frame, charts[1], state.charts.chart(CanvasId::ManagerLost(*idx)));
}

fn render_chart_slot(frame: &mut Frame, area: Rect, chart: Option<&ChartResult>) {
    match chart {
        None => {
            let empty = Paragraph::new("No chart")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, area);
        }
        Some(Err(err)) => {
            let failed = Paragraph::new(err.to_string())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(Block::default().title("Chart unavailable").borders(Borders::ALL));
            frame.render_widget(failed, area);
        }
        Some(Ok(ChartSpec::Bar(spec))) => {
            frame.render_widget(bar_chart_widget(spec, area.width), area);
        }
        Some(Ok(ChartSpec::Line(spec))) => {
            frame.render_widget(line_chart_widget(spec), area);
        }
    }
}

pub fn bar_chart_widget(spec: &BarChartSpec, width: u16) -> BarChart<'static> {
    let count = spec.bars.len().max(1) as u16;
    let bar_width = (width.saturating_sub(2) / count).saturating_sub(1).clamp(1, 12);
    let bars: Vec<Bar> = spec
        .bars
        .iter()
        .map(|datum| {
            let color = datum.tier.color();
            Bar::default()
                .value(datum.value.max(0.0).round() as u64)
                .text_value(format!("{:.0}", datum.value))
                .label(Line::from(truncate(&datum.label, bar_width as usize)))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let mut chart = BarChart::default()
        .block(Block::default().title(spec.title.clone()).borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1);
    if let Some(max) = spec.max {
        chart = chart.max(max.round() as u64);
    }
    chart
}

pub fn line_chart_widget(spec: &LineChartSpec) -> Chart<'_> {
    let datasets: Vec<Dataset> = spec
        .series
        .iter()
        .map(|series| {
            let marker = match series.style {
                LineStyle::Solid => Marker::Braille,
                LineStyle::Dashed => Marker::Dot,
            };
            Dataset::default()
                .name(series.label.clone())
                .marker(marker)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series.color))
                .data(&series.points)
        })
        .collect();

    let [x0, x1] = spec.x_bounds();
    let [y0, y1] = spec.y_bounds();
    Chart::new(datasets)
        .block(Block::default().title(spec.title.clone()).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .title("Week")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([x0, x1])
                .labels(vec![
                    Span::raw(format!("{x0:.0}")),
                    Span::raw(format!("{x1:.0}")),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(spec.y_label)
                .style(Style::default().fg(Color::DarkGray))
                .bounds([y0, y1])
                .labels(vec![
                    Span::raw(format!("{y0:.0}")),
                    Span::raw(format!("{:.0}", (y0 + y1) / 2.0)),
                    Span::raw(format!("{y1:.0}")),
                ]),
        )
}

fn render_modal(frame: &mut Frame, area: Rect, modal: &ModalState) {
    let popup = centered_rect(80, 80, area);
    frame.render_widget(Clear, popup);

    let detail = &modal.detail;
    let block = Block::default()
        .title(format!(" {} ", detail.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(inner);

    frame.render_widget(
        Paragraph::new(summary_lines(detail))
            .block(Block::default().title("Season Summary").borders(Borders::ALL)),
        cols[0],
    );

    let weeks: Vec<Line> = detail
        .week_lines()
        .into_iter()
        .map(|line| {
            if line.starts_with("Week ") {
                let style = if line.ends_with("[W]") {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::Red)
                };
                Line::from(Span::styled(line, style.add_modifier(Modifier::BOLD)))
            } else if line.starts_with("    + ") {
                Line::from(Span::styled(line, Style::default().fg(Color::Green)))
            } else {
                Line::from(line)
            }
        })
        .collect();
    frame.render_widget(
        Paragraph::new(weeks)
            .wrap(Wrap { trim: false })
            .scroll((modal.scroll, 0))
            .block(Block::default().title("Weekly Performance").borders(Borders::ALL)),
        cols[1],
    );
}

fn summary_lines(detail: &ManagerDetail) -> Vec<Line<'static>> {
    detail
        .summary
        .iter()
        .map(|line| {
            let value_style = if line.flagged {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            Line::from(vec![
                Span::raw(format!("{}: ", line.label)),
                Span::styled(line.value.clone(), value_style),
            ])
        })
        .collect()
}

/// Largest useful scroll offset for the modal's weekly list.
pub fn modal_max_scroll(modal: &ModalState) -> u16 {
    modal.detail.week_lines().len().saturating_sub(1) as u16
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn footer_text(state: &AppState) -> String {
    if state.input_mode == InputMode::Editing {
        return "Type League ID | Enter Analyze | Esc Cancel".to_string();
    }
    if state.modal.is_some() {
        return "j/k/↑/↓ Scroll | Esc Close | q Quit".to_string();
    }
    "/ Edit ID | Enter Details | Tab/1-4 View | j/k/↑/↓ Move | e Export | ? Help | q Quit"
        .to_string()
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Fantasy Analytics - Help",
        "",
        "Global:",
        "  / or i       Edit League ID",
        "  Enter        Analyze (while editing) / open details",
        "  Esc          Close details / cancel editing",
        "  Tab, 1-4     Switch view",
        "  e            Export workbook",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Lists:",
        "  j/k or ↑/↓   Move selection / scroll details",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn tier_color(tier: CardTier) -> Color {
    match tier {
        CardTier::Winning => Color::Green,
        CardTier::Average => Color::Yellow,
        CardTier::Losing => Color::Red,
    }
}

fn tone_color(tone: StatTone) -> Color {
    match tone {
        StatTone::Positive => Color::Green,
        StatTone::Neutral => Color::Gray,
        StatTone::Negative => Color::Red,
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    text.chars().take(max).collect()
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
