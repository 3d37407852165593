mod explorer;
mod visualizations;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, TableState, Tabs},
    Frame,
};

use crate::app::{AppState, InputMode, Tab};
use crate::types::Party;

pub const DEM_COLOR: Color = Color::LightBlue;
pub const REP_COLOR: Color = Color::LightRed;
pub const HIT_COLOR: Color = Color::Green;
pub const MISS_COLOR: Color = Color::Red;

pub fn party_color(party: Party) -> Color {
    match party {
        Party::Democrat => DEM_COLOR,
        Party::Republican => REP_COLOR,
    }
}

pub(crate) fn title_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

pub(crate) fn header_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

pub(crate) fn panel(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(title, title_style()))
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render(f: &mut Frame, app: &AppState, table_state: &mut TableState) {
    let area = f.area();

    // Outer vertical split: header | tabs | body | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(1), // tabs
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_tabs(f, app, chunks[1]);
    match app.tab {
        Tab::Explorer => explorer::render(f, app, table_state, chunks[2]),
        Tab::Visualizations => visualizations::render(f, app, chunks[2]),
    }
    render_footer(f, app, chunks[3]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = vec![
        Span::styled(" Polymarket Election Data  ", title_style()),
        Span::styled(
            format!("{} markets", app.stats.total_markets),
            Style::default().fg(Color::White),
        ),
        Span::raw("  │  "),
        Span::styled(
            format!("{} D", app.stats.actual_democrat_wins),
            Style::default().fg(DEM_COLOR),
        ),
        Span::raw(" / "),
        Span::styled(
            format!("{} R", app.stats.republican_wins()),
            Style::default().fg(REP_COLOR),
        ),
        Span::raw("  │  "),
        Span::styled(
            format!("source: {}", app.source),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if app.skipped > 0 {
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled(
            format!("{} rows skipped", app.skipped),
            Style::default().fg(Color::Yellow),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

fn render_tabs(f: &mut Frame, app: &AppState, area: Rect) {
    let tabs = Tabs::new(vec![" Data Explorer ", " Visualizations "])
        .select(app.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider("│");
    f.render_widget(tabs, area);
}

fn render_footer(f: &mut Frame, app: &AppState, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let spans = match (app.tab, app.mode) {
        (_, InputMode::Search) => vec![
            key(" [enter] "),
            Span::raw("keep search  "),
            key("[esc] "),
            Span::raw("clear search  "),
            Span::styled("typing filters markets by name", Style::default().fg(Color::DarkGray)),
        ],
        (Tab::Explorer, InputMode::Normal) => vec![
            key(" [q] "),
            Span::raw("quit  "),
            key("[tab] "),
            Span::raw("visualizations  "),
            key("[/] "),
            Span::raw("search  "),
            key("[↑↓ / j k] "),
            Span::raw("scroll  "),
            key("[n 7-1 w d v] "),
            Span::raw("sort name/horizon/won/date/volume"),
        ],
        (Tab::Visualizations, InputMode::Normal) => vec![
            key(" [q] "),
            Span::raw("quit  "),
            key("[tab] "),
            Span::raw("explorer  "),
            key("[ [ ] ] "),
            Span::raw("change comparison horizon"),
        ],
    };
    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
