//! UI layout and rendering logic for the explorer.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame,
};

use super::app::{App, Tab};

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(3),    // Entries + detail
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_tabs(frame, app, main_layout[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_layout[1]);
    render_entries(frame, app, body[0]);
    render_detail(frame, app, body[1]);

    render_status_bar(frame, app, main_layout[2]);

    if app.show_help {
        render_help_overlay(frame);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<&str> = Tab::ALL.iter().map(|t| t.title()).collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Circuit results"))
        .select(app.tab.index())
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

fn render_entries(frame: &mut Frame, app: &App, area: Rect) {
    let unit = app.tab.unit();
    let rows: Vec<Row> = app
        .entries()
        .iter()
        .map(|e| Row::new(vec![Cell::from(e.id.clone()), Cell::from(format!("{} {}", e.value, unit))]))
        .collect();

    let header = Row::new(vec!["Id", "Value"]).style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(rows, [Constraint::Percentage(50), Constraint::Percentage(50)])
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(app.tab.title()))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = TableState::default();
    if !app.entries().is_empty() {
        state.select(Some(app.selected()));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let text = match app.selected_entry() {
        Some(e) => Text::from(vec![
            Line::from(format!("Id:     {}", e.id)),
            Line::from(format!("Value:  {} {}", e.value, app.tab.unit())),
            Line::from(format!("Max |x|: {} {}", app.max_magnitude(), app.tab.unit())),
        ]),
        None => Text::from("No entries"),
    };
    let detail = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Selected"))
        .wrap(Wrap { trim: true });
    frame.render_widget(detail, chunks[0]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Relative magnitude"))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(app.ratio());
    frame.render_widget(gauge, chunks[1]);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status_paragraph = Paragraph::new(app.status_message.as_str())
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status_paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let popup_area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, popup_area);

    let help_lines = vec![
        Line::from("Explorer Help"),
        Line::from(""),
        Line::from("  Tab / ←/→ / h/l  - Switch mapping"),
        Line::from("  ↑/↓ / k/j        - Select entry"),
        Line::from("  g / G            - First / last entry"),
        Line::from("  ?                - Toggle this help"),
        Line::from("  q / Esc / Ctrl+C - Quit"),
    ];

    let help_paragraph = Paragraph::new(Text::from(help_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help_paragraph, popup_area);
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
