//! UI rendering functions
//!
//! Single-screen layout:
//! - Header: title, host, clock and sensor counts
//! - Sensors: grouped by category, one row per channel with a gauge
//!   against the critical threshold and the linked fan
//! - Statistics panel and history graph, both optional
//! - Footer: key help, status legend and transient messages

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Block, Borders, LineGauge, Paragraph, Sparkline},
    Frame,
};

use super::app::App;
use crate::hwmon::{Sensor, SensorCategory, SensorStatus};

/// Status and chrome colors
mod colors {
    use ratatui::style::Color;

    pub const OK: Color = Color::Green;
    pub const WARN: Color = Color::Yellow;
    pub const CRITICAL: Color = Color::Red;
    pub const ERROR: Color = Color::DarkGray;
    /// Title/header color
    pub const TITLE: Color = Color::Cyan;
    /// Separator/border color
    pub const SEPARATOR: Color = Color::DarkGray;
    /// Inactive sensors
    pub const INACTIVE: Color = Color::DarkGray;
}

pub fn status_color(status: SensorStatus) -> Color {
    match status {
        SensorStatus::Ok => colors::OK,
        SensorStatus::Warn => colors::WARN,
        SensorStatus::Critical => colors::CRITICAL,
        SensorStatus::Error => colors::ERROR,
    }
}

/// Color band for a temperature in °C
pub fn temp_color(celsius: f64) -> Color {
    match celsius {
        t if t < 40.0 => Color::Cyan,
        t if t < 50.0 => Color::Green,
        t if t < 60.0 => Color::LightGreen,
        t if t < 70.0 => Color::Yellow,
        t if t < 80.0 => Color::LightYellow,
        t if t < 90.0 => Color::LightRed,
        _ => Color::Red,
    }
}

/// Color band for a fan duty percentage
pub fn fan_color(percent: u8) -> Color {
    match percent {
        p if p < 30 => Color::Green,
        p if p < 60 => Color::Yellow,
        p if p < 80 => Color::LightYellow,
        _ => Color::Red,
    }
}

/// Fraction of the critical threshold reached, for the gauge
fn critical_ratio(sensor: &Sensor) -> f64 {
    match sensor.current() {
        Some(v) if sensor.critical_temp() > 0.0 => (v / sensor.critical_temp()).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

fn separator() -> Span<'static> {
    Span::styled(" │ ", Style::default().fg(colors::SEPARATOR))
}

/// Main drawing function
pub fn draw(f: &mut Frame, app: &App) {
    let mut constraints = vec![Constraint::Length(3), Constraint::Min(3)];
    if app.show_stats {
        constraints.push(Constraint::Length(4));
    }
    if app.show_graph {
        constraints.push(Constraint::Length(8));
    }
    constraints.push(Constraint::Length(3));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    let mut chunk_idx = 0;
    draw_header(f, app, chunks[chunk_idx]);
    chunk_idx += 1;

    draw_sensors(f, app, chunks[chunk_idx]);
    chunk_idx += 1;

    if app.show_stats {
        draw_stats(f, app, chunks[chunk_idx]);
        chunk_idx += 1;
    }

    if app.show_graph {
        draw_graph(f, app, chunks[chunk_idx]);
        chunk_idx += 1;
    }

    draw_footer(f, app, chunks[chunk_idx]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let clock = chrono::Local::now().format("%H:%M:%S").to_string();
    let white = Style::default().fg(Color::White);

    let mut header_text = vec![
        Span::styled(
            "Temp Monitor",
            Style::default()
                .fg(colors::TITLE)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" v{}", crate::VERSION), Style::default().fg(colors::SEPARATOR)),
        separator(),
        Span::raw(app.hostname.clone()),
        separator(),
        Span::styled("⏱", white),
        Span::raw(format!(" {} ", clock)),
        separator(),
        Span::styled("Sensors:", white),
        Span::styled(
            format!("{}/{}", app.stats.active_sensors, app.sensors.len()),
            Style::default().fg(colors::TITLE),
        ),
        separator(),
        Span::raw(format!("every {}s", app.refresh_interval.as_secs())),
    ];

    if app.stats.criticals > 0 {
        header_text.push(separator());
        header_text.push(Span::styled(
            format!("{} CRITICAL", app.stats.criticals),
            Style::default()
                .fg(colors::CRITICAL)
                .add_modifier(Modifier::BOLD),
        ));
    } else if app.stats.warnings > 0 {
        header_text.push(separator());
        header_text.push(Span::styled(
            format!("{} WARN", app.stats.warnings),
            Style::default().fg(colors::WARN).add_modifier(Modifier::BOLD),
        ));
    }

    let header = Paragraph::new(Line::from(header_text))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    f.render_widget(header, area);
}

/// One visual line of the sensor list
enum Row {
    Group(SensorCategory, usize),
    Sensor(usize),
}

fn build_rows(app: &App) -> Vec<Row> {
    let mut rows = Vec::new();
    for category in SensorCategory::ALL {
        let members: Vec<usize> = app.group(category).map(|(i, _)| i).collect();
        if members.is_empty() {
            continue;
        }
        rows.push(Row::Group(category, members.len()));
        rows.extend(members.into_iter().map(Row::Sensor));
    }
    rows
}

fn draw_sensors(f: &mut Frame, app: &App, area: Rect) {
    let title = if app.compact_mode { " Sensors (compact) " } else { " Sensors " };
    let block = Block::default().borders(Borders::ALL).title(Span::styled(
        title,
        Style::default()
            .fg(colors::TITLE)
            .add_modifier(Modifier::BOLD),
    ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.sensors.is_empty() {
        let waiting = Paragraph::new("Waiting for first reading...").alignment(Alignment::Center);
        f.render_widget(waiting, inner);
        return;
    }

    let rows = build_rows(app);
    let height = inner.height as usize;
    let selected = app.selected_index();
    let selected_row = rows
        .iter()
        .position(|r| matches!(r, Row::Sensor(i) if Some(*i) == selected))
        .unwrap_or(0);
    let offset = if selected_row >= height {
        selected_row + 1 - height
    } else {
        0
    };

    for (line, row) in rows.iter().skip(offset).take(height).enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + line as u16,
            width: inner.width,
            height: 1,
        };

        match row {
            Row::Group(category, count) => draw_group_title(f, *category, *count, row_area),
            Row::Sensor(i) => {
                let sensor = &app.sensors[*i];
                let is_selected = Some(*i) == selected;
                if app.compact_mode {
                    draw_compact_row(f, app, sensor, is_selected, row_area);
                } else {
                    draw_sensor_row(f, app, sensor, is_selected, row_area);
                }
            }
        }
    }
}

fn draw_group_title(f: &mut Frame, category: SensorCategory, count: usize, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            format!("{} {}", category.glyph(), category.name()),
            Style::default()
                .fg(colors::TITLE)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" ({})", count), Style::default().fg(colors::SEPARATOR)),
    ]);
    f.render_widget(Paragraph::new(title), area);
}

fn label_style(is_selected: bool) -> Style {
    let style = Style::default().fg(Color::White);
    if is_selected {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

fn value_span(app: &App, sensor: &Sensor, width: usize) -> Span<'static> {
    match sensor.current().filter(|_| sensor.is_active()) {
        Some(c) => Span::styled(
            format!("{:>width$}", app.format_temp(Some(c)), width = width),
            Style::default().fg(temp_color(c)).add_modifier(Modifier::BOLD),
        ),
        None => Span::styled(
            format!("{:>width$}", "N/A", width = width),
            Style::default().fg(colors::INACTIVE),
        ),
    }
}

fn draw_sensor_row(f: &mut Frame, app: &App, sensor: &Sensor, is_selected: bool, area: Rect) {
    let fan_width = if app.show_fans { 18 } else { 0 };
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(72),
            Constraint::Min(8),
            Constraint::Length(fan_width),
        ])
        .split(area);

    let dim = Style::default().fg(colors::SEPARATOR);
    let text = Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<20.20}", sensor.label()), label_style(is_selected)),
        Span::styled(format!(" {:<10.10}", sensor.name()), dim),
        value_span(app, sensor, 9),
        Span::raw(format!(" {:>9}", app.format_temp(sensor.min()))),
        Span::raw(format!(" {:>9}", app.format_temp(sensor.average()))),
        Span::raw(format!(" {:>9}", app.format_temp(sensor.max()))),
        Span::styled(format!(" {:>9}", app.format_temp(Some(sensor.critical_temp()))), dim),
    ]);
    f.render_widget(Paragraph::new(text), cols[0]);

    let gauge_color = if sensor.is_active() {
        status_color(sensor.status())
    } else {
        colors::INACTIVE
    };
    let gauge = LineGauge::default()
        .filled_style(Style::default().fg(gauge_color))
        .unfilled_style(Style::default().fg(colors::SEPARATOR))
        .line_set(symbols::line::THICK)
        .label(Span::styled(
            format!("{:>4}", sensor.status()),
            Style::default().fg(gauge_color),
        ))
        .ratio(critical_ratio(sensor));
    f.render_widget(gauge, cols[1]);

    if app.show_fans {
        f.render_widget(Paragraph::new(fan_line(sensor)), cols[2]);
    }
}

/// Linked fan column. A sensor that failed its last read has a stale fan
/// reading, so it shows `N/A` like the temperature.
fn fan_line(sensor: &Sensor) -> Line<'static> {
    match sensor.fan() {
        Some(fan) if sensor.is_active() && fan.current_rpm >= 0 => Line::from(vec![
            Span::raw(" "),
            Span::styled(
                format!("{:>5} RPM", fan.current_rpm),
                Style::default().fg(fan_color(fan.percent)),
            ),
            Span::styled(format!(" {:>3}%", fan.percent), Style::default().fg(colors::SEPARATOR)),
        ]),
        Some(_) => Line::from(Span::styled("   fan N/A", Style::default().fg(colors::INACTIVE))),
        None => Line::from(""),
    }
}

fn draw_compact_row(f: &mut Frame, app: &App, sensor: &Sensor, is_selected: bool, area: Rect) {
    let status_style = if sensor.is_active() {
        Style::default().fg(status_color(sensor.status()))
    } else {
        Style::default().fg(colors::INACTIVE)
    };

    let mut spans = vec![
        Span::raw("  "),
        Span::styled(format!("{:<24.24}", sensor.label()), label_style(is_selected)),
        value_span(app, sensor, 9),
        Span::styled(format!(" {:<8}", sensor.status()), status_style),
    ];

    if app.show_fans {
        spans.extend(fan_line(sensor).spans);
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let stats = &app.stats;
    let label = Style::default().fg(Color::White);
    let temp = |c: f64| {
        Span::styled(
            app.format_temp(Some(c)),
            Style::default().fg(temp_color(c)).add_modifier(Modifier::BOLD),
        )
    };

    let mut first = Vec::new();
    if stats.cpu.count > 0 {
        first.extend([
            Span::styled("CPU avg ", label),
            temp(stats.cpu.average),
            Span::styled(" max ", label),
            temp(stats.cpu.peak),
            Span::styled(" min ", label),
            temp(stats.cpu.floor),
        ]);
    }
    if stats.gpu.count > 0 {
        if !first.is_empty() {
            first.push(separator());
        }
        first.extend([
            Span::styled("GPU avg ", label),
            temp(stats.gpu.average),
            Span::styled(" max ", label),
            temp(stats.gpu.peak),
        ]);
    }
    if stats.nvme.count > 0 {
        if !first.is_empty() {
            first.push(separator());
        }
        first.extend([Span::styled("NVMe avg ", label), temp(stats.nvme.average)]);
    }
    if stats.chipset_count > 0 {
        if !first.is_empty() {
            first.push(separator());
        }
        first.push(Span::styled(format!("Chipset sensors {}", stats.chipset_count), label));
    }

    let count = |n: usize, color: Color| {
        let style = if n > 0 {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors::SEPARATOR)
        };
        Span::styled(n.to_string(), style)
    };

    let second = vec![
        Span::styled("Active ", label),
        Span::raw(stats.active_sensors.to_string()),
        separator(),
        Span::styled("Fans spinning ", label),
        Span::raw(stats.active_fans.to_string()),
        separator(),
        Span::styled("Warnings ", label),
        count(stats.warnings, colors::WARN),
        separator(),
        Span::styled("Critical ", label),
        count(stats.criticals, colors::CRITICAL),
        separator(),
        Span::styled(format!("Samples {}", app.ticks), Style::default().fg(colors::SEPARATOR)),
    ];

    let panel = Paragraph::new(vec![Line::from(first), Line::from(second)])
        .block(Block::default().borders(Borders::ALL).title(" Statistics "));
    f.render_widget(panel, area);
}

fn draw_graph(f: &mut Frame, app: &App, area: Rect) {
    let (Some(sensor), Some(history)) = (app.selected_sensor(), app.selected_history()) else {
        let empty = Paragraph::new("No sensor selected")
            .block(Block::default().borders(Borders::ALL).title(" History "))
            .alignment(Alignment::Center);
        f.render_widget(empty, area);
        return;
    };

    let window_min = history.iter().copied().fold(f64::INFINITY, f64::min);
    let window_max = history.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = if history.is_empty() {
        String::new()
    } else {
        format!(
            " {} - {} ",
            app.format_temp(Some(window_min)),
            app.format_temp(Some(window_max))
        )
    };

    let data: Vec<u64> = history
        .iter()
        .map(|&c| app.display_temp(c).round().max(0.0) as u64)
        .collect();

    let color = sensor.current().map(temp_color).unwrap_or(colors::INACTIVE);
    let sparkline = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(Span::styled(
            format!(" History: {} ({}){}", sensor.label(), sensor.name(), range),
            Style::default().fg(colors::TITLE),
        )))
        .data(&data)
        .style(Style::default().fg(color));
    f.render_widget(sparkline, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(colors::TITLE)
                .add_modifier(Modifier::BOLD),
        )
    };

    let mut help_text = vec![
        key("q"),
        Span::raw(" Quit  "),
        key("f/c"),
        Span::raw(format!(" {}  ", if app.use_fahrenheit { "°C" } else { "°F" })),
        key("s"),
        Span::raw(" Stats  "),
        key("n"),
        Span::raw(" Fans  "),
        key("g"),
        Span::raw(" Graph  "),
        key("r"),
        Span::raw(" Reset  "),
        key("↑↓"),
        Span::raw(" Select  "),
        Span::styled("│", Style::default().fg(colors::SEPARATOR)),
        Span::raw(" "),
        Span::styled("OK", Style::default().fg(colors::OK)),
        Span::raw(" "),
        Span::styled("WARN", Style::default().fg(colors::WARN)),
        Span::raw(":85%+ "),
        Span::styled("CRITICAL", Style::default().fg(colors::CRITICAL)),
        Span::raw(" "),
        Span::styled("ERROR", Style::default().fg(colors::ERROR)),
    ];

    if let Some(message) = app.get_status_message() {
        help_text.push(separator());
        help_text.push(Span::styled(message.to_string(), Style::default().fg(Color::White)));
    }

    let help = Paragraph::new(Line::from(help_text))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);

    f.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneralConfig;
    use crate::hwmon::FanLink;
    use crate::stats::{record_reading, summarize};
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;

    fn render(app: &App) -> String {
        let backend = TestBackend::new(140, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn populated_app() -> App {
        let mut sensors = vec![
            Sensor::new("coretemp", "Package id 0", "/x/temp1_input", SensorCategory::Cpu, 100.0),
            Sensor::new("nvme", "Composite", "/y/temp1_input", SensorCategory::Nvme, 84.0),
        ];
        record_reading(&mut sensors[0], Some(55.0));
        let stats = summarize(&sensors);
        let mut app = App::new(&GeneralConfig::default(), Duration::from_secs(2));
        app.update(&sensors, &stats);
        app
    }

    #[test]
    fn test_temp_color_bands() {
        assert_eq!(temp_color(35.0), Color::Cyan);
        assert_eq!(temp_color(45.0), Color::Green);
        assert_eq!(temp_color(65.0), Color::Yellow);
        assert_eq!(temp_color(95.0), Color::Red);
    }

    #[test]
    fn test_status_and_fan_colors() {
        assert_eq!(status_color(SensorStatus::Ok), Color::Green);
        assert_eq!(status_color(SensorStatus::Critical), Color::Red);
        assert_eq!(status_color(SensorStatus::Error), Color::DarkGray);
        assert_eq!(fan_color(10), Color::Green);
        assert_eq!(fan_color(90), Color::Red);
    }

    #[test]
    fn test_draw_shows_groups_and_na() {
        let screen = render(&populated_app());
        assert!(screen.contains("Temp Monitor"));
        assert!(screen.contains("CPU"));
        assert!(screen.contains("NVMe"));
        assert!(screen.contains("Package id 0"));
        assert!(screen.contains("55.0°C"));
        assert!(screen.contains("N/A"));
    }

    #[test]
    fn test_draw_optional_panels() {
        let mut app = populated_app();
        app.show_stats = true;
        app.show_graph = true;
        app.compact_mode = true;
        let screen = render(&app);
        assert!(screen.contains("Statistics"));
        assert!(screen.contains("History"));
    }

    #[test]
    fn test_fan_of_inactive_sensor_is_na() {
        let mut fan = FanLink::new("/x/fan1_input".into(), 5000);
        fan.current_rpm = 1234;
        fan.percent = 24;
        let mut sensor =
            Sensor::new("nct6798", "SYSTIN", "/x/temp1_input", SensorCategory::Chipset, 90.0);
        sensor.fan = Some(fan);
        record_reading(&mut sensor, Some(40.0));

        let mut app = App::new(&GeneralConfig::default(), Duration::from_secs(2));
        app.update(std::slice::from_ref(&sensor), &summarize(std::slice::from_ref(&sensor)));
        assert!(render(&app).contains("1234 RPM"));

        record_reading(&mut sensor, None);
        app.update(std::slice::from_ref(&sensor), &summarize(std::slice::from_ref(&sensor)));
        let screen = render(&app);
        assert!(!screen.contains("1234"));
        assert!(screen.contains("fan N/A"));

        app.compact_mode = true;
        assert!(!render(&app).contains("1234"));
    }

    #[test]
    fn test_draw_before_first_poll() {
        let app = App::new(&GeneralConfig::default(), Duration::from_secs(2));
        assert!(render(&app).contains("Waiting for first reading"));
    }
}
