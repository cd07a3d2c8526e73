//! Dashboard rendering.
//!
//! Layout: a one-line header with connection status, an optional banner
//! line, five current-value cards, the chart grid (elevation and
//! temperature on top, the conductivity bundle below), and a key-hint
//! footer. Gap values split each chart line into separate segments so a
//! missing stretch renders as a visible break.

use ratatui::prelude::*;
use ratatui::symbols;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};

use tidewatch_core::ConnectionState;

use crate::app::{App, BannerKind};
use crate::charts::{line_segments, ChartId};

/// Draw the whole dashboard.
pub fn draw(frame: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(1), // banner
            Constraint::Length(3), // current-value cards
            Constraint::Min(8),    // charts
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    draw_header(frame, outer[0], app);
    draw_banner(frame, outer[1], app);
    draw_cards(frame, outer[2], app);
    draw_charts(frame, outer[3], app);
    draw_footer(frame, outer[4], app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.connection_state();
    let color = match state {
        ConnectionState::Connected => Color::Green,
        ConnectionState::Connecting => Color::Yellow,
        ConnectionState::Disconnected => Color::Red,
    };

    let mut spans = vec![
        Span::styled(
            " tidewatch ",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled("water quality monitor", Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(format!("● {}", state.label()), Style::default().fg(color)),
    ];

    if app.driver.is_loading() {
        spans.push(Span::styled(
            format!("  {} loading", app.spinner_char()),
            Style::default().fg(Color::Yellow),
        ));
    }
    if app.paused {
        spans.push(Span::styled("  [paused]", Style::default().fg(Color::Yellow)));
    }
    if let Some(ts) = app.last_update() {
        spans.push(Span::styled(
            format!("  updated {ts}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_banner(frame: &mut Frame, area: Rect, app: &App) {
    let Some(banner) = app.banner() else {
        return;
    };

    let (prefix, color) = match banner.kind {
        BannerKind::Error => ("(!)", Color::Red),
        BannerKind::Success => ("(+)", Color::Green),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {prefix} {}", banner.message),
            Style::default().fg(color),
        ),
        Span::styled("  [d] dismiss", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_cards(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(area);

    for (column, id) in columns.iter().zip(ChartId::ALL) {
        draw_card(frame, *column, app, id);
    }
}

fn draw_card(frame: &mut Frame, area: Rect, app: &App, id: ChartId) {
    let value = app.current_value(id);
    let text = if value == "-" {
        value.to_string()
    } else {
        format!("{} {}", value, id.unit())
    };

    let card = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(id.color()).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(id.color()))
            .title(format!(" {} ", id.title())),
    );

    frame.render_widget(card, area);
}

fn draw_charts(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 2); 2])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2); 2])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(rows[1]);

    draw_chart(frame, top[0], app, ChartId::Elevation);
    draw_chart(frame, top[1], app, ChartId::Temperature);
    draw_chart(frame, bottom[0], app, ChartId::Salinity);
    draw_chart(frame, bottom[1], app, ChartId::Tds);
    draw_chart(frame, bottom[2], app, ChartId::Conductivity);
}

fn draw_chart(frame: &mut Frame, area: Rect, app: &App, id: ChartId) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(id.color()))
        .title(format!(" {} ({}) ", id.title(), id.unit()));

    let Some(series) = app.charts.series(id) else {
        draw_empty_chart(frame, area, block);
        return;
    };
    let segments = line_segments(series);
    if segments.is_empty() {
        draw_empty_chart(frame, area, block);
        return;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in series.values.iter().flatten() {
        min = min.min(*value);
        max = max.max(*value);
    }
    let margin = ((max - min) * 0.1).max(0.1);
    let y_bounds = [min - margin, max + margin];
    let x_max = series.len().saturating_sub(1).max(1) as f64;

    let datasets: Vec<Dataset> = segments
        .iter()
        .map(|segment| {
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(id.color()))
                .data(segment)
        })
        .collect();

    let precision = id.precision();
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::raw(series.labels.first().cloned().unwrap_or_default()),
                    Span::raw(series.labels.last().cloned().unwrap_or_default()),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds(y_bounds)
                .labels(vec![
                    Span::raw(format!("{:.precision$}", y_bounds[0])),
                    Span::raw(format!("{:.precision$}", y_bounds[1])),
                ]),
        );

    frame.render_widget(chart, area);
}

fn draw_empty_chart(frame: &mut Frame, area: Rect, block: Block) {
    let msg = Paragraph::new("No data")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(msg, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    // The refresh hint doubles as the manual-refresh control; it is
    // dimmed while a fetch is in flight and restored afterwards.
    let refresh_style = if app.driver.is_loading() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let line = Line::from(vec![
        Span::styled(" [q] quit", Style::default().fg(Color::Cyan)),
        Span::styled("  [r] refresh", refresh_style),
        Span::styled("  [e] export csv", Style::default().fg(Color::Cyan)),
        Span::styled("  [p] pause", Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("  [t] range({})", app.results),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled("  [h] health", Style::default().fg(Color::Cyan)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
