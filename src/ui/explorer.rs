use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{AppState, InputMode};
use crate::config::HORIZONS;
use crate::format::{format_date, format_prob, format_volume, market_url, truncate, UNAVAILABLE};
use crate::types::{MarketRecord, Party, SortField};
use crate::ui::{header_style, panel, party_color, DEM_COLOR, HIT_COLOR, MISS_COLOR, REP_COLOR};

/// Horizons whose cells are tinted by whether the call was right.
const HIGHLIGHT_DAYS: [u8; 2] = [7, 1];
const HIT_BG: Color = Color::Rgb(16, 48, 24);
const MISS_BG: Color = Color::Rgb(64, 20, 20);

pub fn render(f: &mut Frame, app: &AppState, state: &mut TableState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search
            Constraint::Min(5),    // table
            Constraint::Length(4), // links for selected row
            Constraint::Length(1), // legend
        ])
        .split(area);

    render_search(f, app, chunks[0]);
    render_table(f, app, state, chunks[1]);
    render_links(f, app, chunks[2]);
    render_legend(f, chunks[3]);
}

fn render_search(f: &mut Frame, app: &AppState, area: Rect) {
    let editing = app.mode == InputMode::Search;
    let query = if app.search.is_empty() && !editing {
        Span::styled("press / to search markets…", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(app.search.clone(), Style::default().fg(Color::White))
    };
    let mut spans = vec![Span::raw(" "), query];
    if editing {
        spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
    }

    let title = format!(" SEARCH · {} markets shown ", app.rows().len());
    let mut block = panel(title);
    if editing {
        block = block.border_style(Style::default().fg(Color::Yellow));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn sort_indicator(app: &AppState, field: SortField) -> Span<'static> {
    match app.sort {
        Some(s) if s.field == field => Span::styled(s.direction.arrow(), header_style()),
        _ => Span::styled("↕", Style::default().fg(Color::DarkGray)),
    }
}

fn render_table(f: &mut Frame, app: &AppState, state: &mut TableState, area: Rect) {
    let mut header_cells: Vec<Cell> = SortField::ALL
        .iter()
        .map(|&field| {
            Cell::from(Line::from(vec![
                Span::styled(format!("{} ", field.label()), header_style()),
                sort_indicator(app, field),
            ]))
        })
        .collect();
    header_cells.push(Cell::from("Links").style(header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .rows()
        .iter()
        .map(|&i| record_row(&app.records[i]))
        .collect();

    let mut widths = vec![Constraint::Min(24)];
    widths.extend([Constraint::Length(7); 7]);
    widths.extend([
        Constraint::Length(6),  // won
        Constraint::Length(13), // resolved
        Constraint::Length(9),  // volume
        Constraint::Length(5),  // links
    ]);

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(" MARKETS ".to_string()))
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

    if app.rows().is_empty() {
        state.select(None);
    } else {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(table, area, state);
}

fn record_row(r: &MarketRecord) -> Row<'static> {
    let actual = r.outcome();
    let mut cells = vec![Cell::from(r.name.clone())];

    for day in HORIZONS {
        let prob = r.prob(day);
        let mut style = match prob.map(Party::predicted_by) {
            Some(p) => Style::default().fg(party_color(p)),
            None => Style::default().fg(Color::DarkGray),
        };
        if HIGHLIGHT_DAYS.contains(&day) {
            if let Some(p) = r.prediction(day) {
                let tint = if p == actual { HIT_BG } else { MISS_BG };
                style = style.bg(tint).add_modifier(Modifier::BOLD);
            }
        }
        cells.push(Cell::from(format_prob(prob)).style(style));
    }

    cells.push(
        Cell::from(actual.letter()).style(
            Style::default()
                .fg(party_color(actual))
                .add_modifier(Modifier::BOLD),
        ),
    );
    cells.push(
        Cell::from(format_date(r.resolution_date.as_deref()))
            .style(Style::default().fg(Color::Gray)),
    );
    cells.push(Cell::from(format_volume(r.combined_volume)).style(Style::default().fg(Color::Gray)));

    let links = Line::from(vec![
        match r.d_market_slug {
            Some(_) => Span::styled("D", Style::default().fg(DEM_COLOR).add_modifier(Modifier::BOLD)),
            None => Span::raw(" "),
        },
        Span::raw(" "),
        match r.r_market_slug {
            Some(_) => Span::styled("R", Style::default().fg(REP_COLOR).add_modifier(Modifier::BOLD)),
            None => Span::raw(" "),
        },
    ]);
    cells.push(Cell::from(links));

    Row::new(cells)
}

fn render_links(f: &mut Frame, app: &AppState, area: Rect) {
    let width = usize::from(area.width.saturating_sub(8));
    let link_line = |label: &'static str, color: Color, slug: Option<&str>| {
        Line::from(vec![
            Span::styled(format!(" {label} "), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::raw(slug.map_or(UNAVAILABLE.to_string(), |s| truncate(&market_url(s), width))),
        ])
    };

    let (title, lines) = match app.selected_record() {
        Some(r) => (
            format!(" {} ", truncate(&r.name, 60)),
            vec![
                link_line("D", DEM_COLOR, r.d_market_slug.as_deref()),
                link_line("R", REP_COLOR, r.r_market_slug.as_deref()),
            ],
        ),
        None => (" LINKS ".to_string(), vec![Line::from(" no market selected")]),
    };
    f.render_widget(Paragraph::new(lines).block(panel(title)), area);
}

fn render_legend(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" Legend: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("probabilities show Democrat win chance. "),
        Span::styled("Blue = >50% D", Style::default().fg(DEM_COLOR)),
        Span::raw(", "),
        Span::styled("Red = ≤50% D", Style::default().fg(REP_COLOR)),
        Span::raw(". 7d/1d background: "),
        Span::styled("green = correct", Style::default().fg(HIT_COLOR)),
        Span::raw(", "),
        Span::styled("red = incorrect", Style::default().fg(MISS_COLOR)),
        Span::raw("."),
    ]);
    f.render_widget(Paragraph::new(line).style(Style::default().fg(Color::Gray)), area);
}
