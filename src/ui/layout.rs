use {
    crate::{aggregator_core::Snapshot, ui::renderer::format_rate},
    ratatui::{
        layout::{Constraint, Direction, Layout, Rect},
        style::{Color, Modifier, Style},
        symbols,
        text::{Line, Span},
        widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
        Frame,
    },
};

const MALE_COLOR: Color = Color::Rgb(70, 130, 180);
const FEMALE_COLOR: Color = Color::Rgb(255, 105, 180);
const REGION_COLORS: [Color; 3] = [
    Color::Rgb(31, 119, 180),
    Color::Rgb(255, 127, 14),
    Color::Rgb(44, 160, 44),
];

/// Render the dashboard for one focus cause
pub fn render_dashboard(f: &mut Frame, area: Rect, snapshot: &Snapshot, focus_cause: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Header
            Constraint::Percentage(40), // Gender bar chart
            Constraint::Min(8),         // Region trends
            Constraint::Length(3),      // High mortality counter
        ])
        .split(area);

    render_header(f, chunks[0], focus_cause);
    render_gender_bars(f, chunks[1], snapshot, focus_cause);
    render_region_trends(f, chunks[2], snapshot, focus_cause);
    render_footer(f, chunks[3], snapshot);
}

fn render_header(f: &mut Frame, area: Rect, focus_cause: &str) {
    let text = vec![Line::from(vec![
        Span::styled(
            "Real-time Mortality Analytics",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" ({})", focus_cause)),
        Span::raw("  Press 'q' or Esc to quit"),
    ])];

    let header = Block::default().borders(Borders::ALL).title("mortflow");
    f.render_widget(Paragraph::new(text).block(header), area);
}

fn render_gender_bars(f: &mut Frame, area: Rect, snapshot: &Snapshot, focus_cause: &str) {
    let means = snapshot.gender_means_for(focus_cause);

    let bars: Vec<Bar> = means
        .iter()
        .map(|(gender, mean)| {
            Bar::default()
                .value(mean.max(0.0).round() as u64)
                .label(Line::from(gender.to_string()))
                .text_value(format_rate(*mean))
                .style(Style::default().fg(gender_color(gender)))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Average {} Mortality Rate by Gender", focus_cause));

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(12)
        .bar_gap(4)
        .value_style(Style::default().add_modifier(Modifier::BOLD));

    f.render_widget(chart, area);
}

fn gender_color(gender: &str) -> Color {
    match gender.trim().to_ascii_lowercase().as_str() {
        "male" => MALE_COLOR,
        "female" => FEMALE_COLOR,
        _ => Color::Gray,
    }
}

fn render_region_trends(f: &mut Frame, area: Rect, snapshot: &Snapshot, focus_cause: &str) {
    let series = snapshot.region_series_for(focus_cause);

    let points: Vec<(String, Vec<(f64, f64)>)> = series
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(region, values)| {
            let data: Vec<(f64, f64)> = values
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, *v))
                .collect();
            (region.to_string(), data)
        })
        .collect();

    let y_max = points
        .iter()
        .flat_map(|(_, data)| data.iter().map(|(_, y)| *y))
        .fold(0.0_f64, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.2 } else { 100.0 };
    let x_max = snapshot.window_capacity.saturating_sub(1).max(1) as f64;

    let datasets: Vec<Dataset> = points
        .iter()
        .enumerate()
        .map(|(i, (region, data))| {
            Dataset::default()
                .name(region.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(REGION_COLORS[i % REGION_COLORS.len()]))
                .data(data)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} Mortality Rate Trends by Region", focus_cause)),
        )
        .x_axis(
            Axis::default()
                .title("Recent readings")
                .bounds([0.0, x_max])
                .labels(vec![Span::raw("0"), Span::raw(format!("{}", x_max as u64))]),
        )
        .y_axis(
            Axis::default()
                .title("Rate per 100,000")
                .bounds([0.0, y_max])
                .labels(vec![Span::raw("0"), Span::raw(format_rate(y_max))]),
        );

    f.render_widget(chart, area);
}

fn render_footer(f: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let text = vec![Line::from(vec![
        Span::styled(
            format!("High Mortality Events (Rate ≥ {}): ", snapshot.threshold),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(snapshot.high_mortality_count.to_string()),
    ])];

    let footer = Block::default().borders(Borders::ALL).title("Alerts");
    f.render_widget(Paragraph::new(text).block(footer), area);
}
