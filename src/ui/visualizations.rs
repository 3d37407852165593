use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::AppState;
use crate::config::HORIZONS;
use crate::format::{format_bias, format_percent, format_prob, format_volume, truncate};
use crate::stats::aggregator::{ConfusionMatrix, FailedPrediction};
use crate::ui::{header_style, panel, party_color, DEM_COLOR, HIT_COLOR, MISS_COLOR, REP_COLOR};

/// Characters per side of the bias axis; one character per percentage point.
const BIAS_HALF_WIDTH: usize = 10;

pub fn render(f: &mut Frame, app: &AppState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),  // confusion matrices + summary
            Constraint::Length(12), // charts
            Constraint::Min(5),     // failed predictions
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(36),
            Constraint::Percentage(36),
            Constraint::Percentage(28),
        ])
        .split(rows[0]);
    render_confusion(f, app, 7, top[0]);
    render_confusion(f, app, app.compare_day, top[1]);
    render_summary(f, app, top[2]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(44),
            Constraint::Percentage(30),
            Constraint::Percentage(26),
        ])
        .split(rows[1]);
    render_accuracy_chart(f, app, middle[0]);
    render_win_rates(f, app, middle[1]);
    render_bias(f, app, middle[2]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    render_failed(f, app, 7, bottom[0]);
    render_failed(f, app, app.compare_day, bottom[1]);
}

fn day_label(day: u8) -> String {
    if day == 1 {
        "1 DAY BEFORE".to_string()
    } else {
        format!("{day} DAYS BEFORE")
    }
}

// ---------------------------------------------------------------------------
// Confusion matrices
// ---------------------------------------------------------------------------

fn render_confusion(f: &mut Frame, app: &AppState, day: u8, area: Rect) {
    let accuracy = app.stats.accuracy(day).and_then(|p| p.accuracy);
    let title = format!(" {} · {} accuracy ", day_label(day), format_percent(accuracy));

    let Some(breakdown) = app.stats.breakdown(day) else {
        f.render_widget(Paragraph::new(" no data").block(panel(title)), area);
        return;
    };
    let m = &breakdown.confusion;

    let cell = |count: usize, correct: bool| {
        let color = if correct { HIT_COLOR } else { MISS_COLOR };
        Cell::from(format!("{count:>3}  {:>6}", format_percent(m.share(count))))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
    };
    let label = |text: &'static str, color: Color| Cell::from(text).style(Style::default().fg(color));

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("Predicted R").style(header_style()),
        Cell::from("Predicted D").style(header_style()),
    ]);
    let rows = vec![
        Row::new(vec![
            label("R actually won", REP_COLOR),
            cell(m.predicted_r_actual_r, true),
            cell(m.predicted_d_actual_r, false),
        ])
        .height(2),
        Row::new(vec![
            label("D actually won", DEM_COLOR),
            cell(m.predicted_r_actual_d, false),
            cell(m.predicted_d_actual_d, true),
        ])
        .height(2),
    ];

    let table = Table::new(
        rows,
        [Constraint::Length(15), Constraint::Length(13), Constraint::Length(13)],
    )
    .header(header)
    .block(panel(title));
    f.render_widget(table, area);
}

fn covered_line(m: &ConfusionMatrix, total: usize) -> String {
    format!("{} of {} markets priced", m.total(), total)
}

fn render_summary(f: &mut Frame, app: &AppState, area: Rect) {
    let stats = &app.stats;
    let stat = |label: &'static str, value: String, color: Color| {
        Line::from(vec![
            Span::styled(format!(" {label:<16}"), Style::default().fg(Color::Gray)),
            Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ])
    };
    let mut lines = vec![
        stat("Total Markets", stats.total_markets.to_string(), Color::White),
        stat("Democrat Wins", stats.actual_democrat_wins.to_string(), DEM_COLOR),
        stat("Republican Wins", stats.republican_wins().to_string(), REP_COLOR),
    ];
    for day in [7, app.compare_day] {
        if let Some(b) = stats.breakdown(day) {
            lines.push(Line::from(Span::styled(
                format!(" {}d: {}", day, covered_line(&b.confusion, stats.total_markets)),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    f.render_widget(
        Paragraph::new(lines).block(panel(" DATASET SUMMARY ".to_string())),
        area,
    );
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn horizon_color(day: u8, compare_day: u8) -> Color {
    match day {
        7 => DEM_COLOR,
        d if d == compare_day => REP_COLOR,
        _ => Color::Gray,
    }
}

/// Percentages are charted in tenths so one decimal survives the u64 bars.
fn bar_value(pct: Option<f64>) -> u64 {
    pct.map_or(0, |p| (p * 10.0).round().max(0.0) as u64)
}

fn render_accuracy_chart(f: &mut Frame, app: &AppState, area: Rect) {
    let bars: Vec<Bar> = app
        .stats
        .accuracy_by_horizon
        .iter()
        .map(|p| {
            let color = horizon_color(p.day, app.compare_day);
            Bar::default()
                .value(bar_value(p.accuracy))
                .text_value(format_percent(p.accuracy))
                .label(Line::from(format!("{}d", p.day)))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(panel(" ACCURACY OVER TIME ".to_string()))
        .bar_width(6)
        .bar_gap(2)
        .max(1000)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

fn render_win_rates(f: &mut Frame, app: &AppState, area: Rect) {
    let mut bars = Vec::with_capacity(4);
    for day in [7, app.compare_day] {
        let Some(point) = app.stats.win_rate(day) else {
            continue;
        };
        for (suffix, pct, color) in [("P", point.predicted, DEM_COLOR), ("A", point.actual, HIT_COLOR)] {
            bars.push(
                Bar::default()
                    .value(bar_value(pct))
                    .text_value(format_percent(pct))
                    .label(Line::from(format!("{day}d {suffix}")))
                    .style(Style::default().fg(color))
                    .value_style(Style::default().fg(Color::Black).bg(color)),
            );
        }
    }

    let chart = BarChart::default()
        .block(panel(" D WIN RATE: PREDICTED vs ACTUAL ".to_string()))
        .bar_width(6)
        .bar_gap(2)
        .max(1000)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

/// One bias row: pro-Republican bars grow left of the axis, pro-Democrat right.
fn bias_line(day: u8, bias_pp: Option<f64>) -> Line<'static> {
    let len = bias_pp.map_or(0, |v| (v.abs().round() as usize).min(BIAS_HALF_WIDTH));
    let (left, right) = match bias_pp {
        Some(v) if v < 0.0 => (len, 0),
        Some(_) => (0, len),
        None => (0, 0),
    };
    Line::from(vec![
        Span::styled(format!(" {day}d "), Style::default().fg(Color::Gray)),
        Span::raw(" ".repeat(BIAS_HALF_WIDTH - left)),
        Span::styled("█".repeat(left), Style::default().fg(REP_COLOR)),
        Span::raw("│"),
        Span::styled("█".repeat(right), Style::default().fg(DEM_COLOR)),
        Span::raw(" ".repeat(BIAS_HALF_WIDTH - right)),
        Span::styled(
            format!(" {}", format_bias(bias_pp)),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])
}

fn render_bias(f: &mut Frame, app: &AppState, area: Rect) {
    let mut lines: Vec<Line> = HORIZONS
        .iter()
        .map(|&day| bias_line(day, app.stats.breakdown(day).and_then(|b| b.bias_pp)))
        .collect();
    lines.push(Line::from(Span::styled(
        format!("     {:<w$}{}", "← pro-R", "pro-D →", w = BIAS_HALF_WIDTH + 1),
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(
        Paragraph::new(lines).block(panel(" DIRECTIONAL BIAS ".to_string())),
        area,
    );
}

// ---------------------------------------------------------------------------
// Failed predictions
// ---------------------------------------------------------------------------

fn failed_row(fp: &FailedPrediction, name_width: usize) -> Row<'static> {
    Row::new(vec![
        Cell::from(truncate(&fp.name, name_width)),
        Cell::from(format_prob(Some(fp.d_prob))),
        Cell::from(fp.actual.letter()).style(
            Style::default()
                .fg(party_color(fp.actual))
                .add_modifier(Modifier::BOLD),
        ),
        Cell::from(fp.error_label()),
        Cell::from(format_volume(fp.combined_volume)),
    ])
}

fn render_failed(f: &mut Frame, app: &AppState, day: u8, area: Rect) {
    let failed: &[FailedPrediction] = app
        .stats
        .breakdown(day)
        .map(|b| b.failed.as_slice())
        .unwrap_or(&[]);
    let title = format!(" FAILED PREDICTIONS · {} ({}) ", day_label(day), failed.len());

    let header = Row::new(
        ["Market", "D Prob", "Won", "Error", "Volume"]
            .iter()
            .map(|h| Cell::from(*h).style(header_style())),
    );
    // Borders, spacing and the fixed columns take roughly 48 cells.
    let name_width = usize::from(area.width.saturating_sub(48)).max(10);
    let rows: Vec<Row> = failed.iter().map(|fp| failed_row(fp, name_width)).collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(10),
            Constraint::Length(7),
            Constraint::Length(4),
            Constraint::Length(18),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(panel(title));
    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn positive_bias_grows_right_of_axis() {
        let line = text(&bias_line(7, Some(3.6)));
        let axis = line.find('│').unwrap();
        assert!(line[axis..].contains("████"));
        assert!(!line[..axis].contains('█'));
        assert!(line.ends_with("+3.6pp"));
    }

    #[test]
    fn negative_bias_grows_left_and_caps() {
        let line = text(&bias_line(1, Some(-42.0)));
        let axis = line.find('│').unwrap();
        assert_eq!(line[..axis].matches('█').count(), BIAS_HALF_WIDTH);
        assert!(line.ends_with("-42.0pp"));
    }

    #[test]
    fn missing_bias_draws_no_bar() {
        let line = text(&bias_line(3, None));
        assert!(!line.contains('█'));
        assert!(line.ends_with('—'));
    }

    #[test]
    fn bar_values_keep_one_decimal() {
        assert_eq!(bar_value(Some(96.25)), 963);
        assert_eq!(bar_value(None), 0);
    }
}
