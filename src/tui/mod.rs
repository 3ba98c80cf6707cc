//! Ratatui-based terminal dashboard.
//!
//! A filter sidebar drives four tabs of charts. Every filter change rebuilds
//! the whole `DashboardSnapshot` from the shared dataset; nothing is updated
//! incrementally.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::debug;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Gauge, List, ListItem, Paragraph, Row, Table, Tabs},
};

use crate::aggregate::AggregateTable;
use crate::app::pipeline::DashboardSnapshot;
use crate::domain::{Dataset, FilterSpec, Measure};
use crate::error::{AppError, EXIT_RUNTIME};
use crate::report::fmt_count;

mod filters;
mod plotters_chart;

use filters::{EditOutcome, FilterField, FilterPanel};
use plotters_chart::{CASUAL_COLOR, CNT_COLOR, DashChart, LineSpec, REGISTERED_COLOR, TREND_COLOR, chart_bounds};

/// Start the dashboard on an already loaded dataset.
pub fn run(dataset: Arc<Dataset>, initial: FilterSpec, source: String) -> Result<(), AppError> {
    let mut app = App::new(dataset, &initial, source);

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_RUNTIME, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Temporal,
    Weather,
    Users,
    Correlation,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::Temporal, Tab::Weather, Tab::Users, Tab::Correlation];

    fn title(self) -> &'static str {
        match self {
            Tab::Temporal => "1 Temporal",
            Tab::Weather => "2 Weather",
            Tab::Users => "3 Users",
            Tab::Correlation => "4 Correlation",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn step(self, delta: isize) -> Tab {
        let n = Tab::ALL.len() as isize;
        Tab::ALL[(self.index() as isize + delta).rem_euclid(n) as usize]
    }
}

struct App {
    dataset: Arc<Dataset>,
    source: String,
    panel: FilterPanel,
    tab: Tab,
    snapshot: DashboardSnapshot,
    recomputes: usize,
    status: String,
}

impl App {
    fn new(dataset: Arc<Dataset>, initial: &FilterSpec, source: String) -> Self {
        let panel = FilterPanel::new(&dataset, initial);
        let snapshot = DashboardSnapshot::compute(&dataset, &panel.spec());
        let status = format!("Loaded {} records.", fmt_count(dataset.len() as u64));
        Self {
            dataset,
            source,
            panel,
            tab: Tab::Temporal,
            snapshot,
            recomputes: 0,
            status,
        }
    }

    fn recompute(&mut self) {
        let spec = self.panel.spec();
        self.snapshot = DashboardSnapshot::compute(&self.dataset, &spec);
        self.recomputes += 1;
        self.status = format!("{} record(s) match.", fmt_count(self.snapshot.totals.records as u64));
        debug!("recomputed snapshot #{} for [{}]", self.recomputes, spec.describe());
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.panel.is_editing() {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.tab = self.tab.step(1),
            KeyCode::BackTab => self.tab = self.tab.step(-1),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.tab = Tab::ALL[idx];
            }
            KeyCode::Up => self.panel.select_prev(),
            KeyCode::Down => self.panel.select_next(),
            KeyCode::Left | KeyCode::Right => {
                let delta = if code == KeyCode::Left { -1 } else { 1 };
                if self.panel.cycle(delta) {
                    self.recompute();
                }
            }
            KeyCode::Enter => {
                if self.panel.begin_edit() {
                    self.status = "Editing date (YYYY-MM-DD, empty clears). Enter to apply, Esc to cancel.".to_string();
                }
            }
            KeyCode::Char('c') => {
                self.panel.clear();
                self.recompute();
                self.status = "Filters cleared.".to_string();
            }
            _ => {}
        }
        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.panel.cancel_edit();
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => match self.panel.commit_edit() {
                EditOutcome::Applied => self.recompute(),
                EditOutcome::Invalid(msg) => self.status = msg,
                EditOutcome::Pending | EditOutcome::Canceled => {}
            },
            KeyCode::Backspace => self.panel.pop_char(),
            KeyCode::Char(c) => self.panel.push_char(c),
            _ => {}
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_tabs(frame, chunks[1]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(0)])
            .split(chunks[2]);
        self.draw_filters(frame, body[0]);
        match self.tab {
            Tab::Temporal => self.draw_temporal(frame, body[1]),
            Tab::Weather => self.draw_weather(frame, body[1]),
            Tab::Users => self.draw_users(frame, body[1]),
            Tab::Correlation => self.draw_correlation(frame, body[1]),
        }

        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let t = &self.snapshot.totals;
        let lines = vec![
            Line::from(vec![
                Span::styled("bike-dash", Style::default().fg(Color::Cyan)),
                Span::raw(format!(" | {}", self.source)),
            ]),
            Line::from(vec![
                Span::styled(
                    format!("Total {}", fmt_count(t.cnt)),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(
                    "  Casual {}  Registered {}  Records {}",
                    fmt_count(t.casual),
                    fmt_count(t.registered),
                    fmt_count(t.records as u64)
                )),
                Span::styled(
                    format!("  [{}]", self.snapshot.filter.describe()),
                    Style::default().fg(Color::Gray),
                ),
            ]),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
            .select(self.tab.index())
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan));
        frame.render_widget(tabs, area);
    }

    fn draw_filters(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = FilterField::ALL
            .iter()
            .map(|&field| {
                let value = match self.panel.edit_buffer() {
                    Some(buf) if field == self.panel.selected() => format!("{buf}_"),
                    _ => self.panel.value(field),
                };
                ListItem::new(format!("{}: {value}", field.label()))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Filters").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.panel.selected_index()));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_temporal(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let start = self.snapshot.daily.keys().next().copied();
        let day_x = |d: &NaiveDate| start.map_or(0.0, |s| d.signed_duration_since(s).num_days() as f64);
        let daily = measure_lines(&self.snapshot.daily, day_x);
        let fmt_day = |v: f64| day_label(start, v);
        draw_line_chart(
            frame,
            rows[0],
            "Daily rentals",
            &daily,
            &[],
            ("date", "rides"),
            (&fmt_day, &fmt_int),
        );

        let hourly = measure_lines(&self.snapshot.hourly, |h| f64::from(*h));
        draw_line_chart(
            frame,
            rows[1],
            "Mean rentals by hour",
            &hourly,
            &[],
            ("hour", "rides/h"),
            (&fmt_int, &fmt_int),
        );
    }

    fn draw_weather(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .split(area);
        draw_bars(frame, cols[0], "Weather (mean cnt)", &bar_items(&self.snapshot.weather, |k| k.clone()));
        draw_bars(frame, cols[1], "Season (mean cnt)", &bar_items(&self.snapshot.season, |k| k.clone()));
        draw_bars(
            frame,
            cols[2],
            "Temperature (mean cnt)",
            &bar_items(&self.snapshot.temperature, |k| k.clone()),
        );
    }

    fn draw_users(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Percentage(45), Constraint::Min(0)])
            .split(area);

        let block = Block::default().title("User share").borders(Borders::ALL);
        match self.snapshot.user_share {
            Some(share) => {
                let gauge = Gauge::default()
                    .block(block)
                    .gauge_style(Style::default().fg(Color::Yellow).bg(Color::Green))
                    .ratio(share.casual.clamp(0.0, 1.0))
                    .label(format!(
                        "casual {:.1}% | registered {:.1}%",
                        share.casual * 100.0,
                        share.registered * 100.0
                    ));
                frame.render_widget(gauge, rows[0]);
            }
            None => frame.render_widget(Paragraph::new("No rentals in view.").block(block), rows[0]),
        }

        let bars = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);
        draw_bars(
            frame,
            bars[0],
            "Day type (mean cnt)",
            &bar_items(&self.snapshot.workingday, |k| k.clone()),
        );
        draw_bars(
            frame,
            bars[1],
            "Rush hour (mean cnt)",
            &bar_items(&self.snapshot.rush_hour, |w| w.label().to_string()),
        );

        let lines = day_type_lines(&self.snapshot.hourly_workingday);
        draw_line_chart(
            frame,
            rows[2],
            "Hourly casual/registered by day type",
            &lines,
            &[],
            ("hour", "rides/h"),
            (&fmt_int, &fmt_int),
        );
    }

    fn draw_correlation(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Min(0)])
            .split(area);

        let block = Block::default().title("Correlation (Pearson r)").borders(Borders::ALL);
        match &self.snapshot.correlation {
            Ok(m) => {
                let header = Row::new(
                    std::iter::once(Cell::from(""))
                        .chain(m.columns().iter().map(|c| Cell::from(short_name(c)))),
                )
                .style(Style::default().fg(Color::Gray));
                let rows: Vec<Row> = m
                    .columns()
                    .iter()
                    .zip(m.values())
                    .map(|(name, values)| {
                        let cells = std::iter::once(Cell::from(name.clone())).chain(values.iter().map(|&r| {
                            Cell::from(crate::report::fmt_r(r)).style(Style::default().fg(Color::White).bg(heat_color(r)))
                        }));
                        Row::new(cells)
                    })
                    .collect();
                let widths = std::iter::once(Constraint::Length(16))
                    .chain(m.columns().iter().map(|_| Constraint::Length(6)));
                let table = Table::new(rows, widths).header(header).block(block);
                frame.render_widget(table, cols[0]);
            }
            Err(e) => {
                let p = Paragraph::new(e.to_string())
                    .style(Style::default().fg(Color::Yellow))
                    .block(block);
                frame.render_widget(p, cols[0]);
            }
        }

        let Some(trend) = self.snapshot.trend("temp_actual", "cnt") else {
            return;
        };
        let (title, lines) = match &trend.fit {
            Ok(fit) => {
                let (x, _) = chart_bounds(&[], &trend.points);
                let title = format!(
                    "cnt = {:.1} + {:.2}·temp  (R² {})",
                    fit.intercept,
                    fit.slope,
                    crate::report::fmt_r(fit.r_squared)
                );
                let line = LineSpec {
                    data: fit.segment(x[0], x[1]).to_vec(),
                    color: TREND_COLOR,
                };
                (title, vec![line])
            }
            Err(e) => (format!("Temperature vs rentals ({e})"), Vec::new()),
        };
        draw_line_chart(
            frame,
            cols[1],
            &title,
            &lines,
            &trend.points,
            ("temp (°C)", "cnt"),
            (&fmt_one, &fmt_int),
        );
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ change  Enter edit date  c clear  Tab/1-4 view  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// One line per measure of `table`, x taken from the key.
fn measure_lines<K: PartialEq>(table: &AggregateTable<K>, x: impl Fn(&K) -> f64) -> Vec<LineSpec> {
    table
        .measures()
        .iter()
        .map(|&m| LineSpec {
            data: table.series(m).into_iter().map(|(k, v)| (x(k), v)).collect(),
            color: measure_color(m),
        })
        .collect()
}

/// Casual and registered lines for every day type.
fn day_type_lines(table: &AggregateTable<(u8, String)>) -> Vec<LineSpec> {
    let mut day_types: Vec<&String> = Vec::new();
    for (_, d) in table.keys() {
        if !day_types.contains(&d) {
            day_types.push(d);
        }
    }

    let mut lines = Vec::new();
    for (i, day_type) in day_types.iter().enumerate() {
        for measure in [Measure::Casual, Measure::Registered] {
            let data = table
                .series(measure)
                .into_iter()
                .filter(|((_, d), _)| d == *day_type)
                .map(|((h, _), v)| (f64::from(*h), v))
                .collect();
            let base = measure_color(measure);
            // Later day types are drawn dimmer.
            let dim = |c: u8| (f64::from(c) / (1.0 + i as f64)) as u8;
            lines.push(LineSpec {
                data,
                color: plotters::style::RGBColor(dim(base.0), dim(base.1), dim(base.2)),
            });
        }
    }
    lines
}

fn measure_color(m: Measure) -> plotters::style::RGBColor {
    match m {
        Measure::Casual => CASUAL_COLOR,
        Measure::Registered => REGISTERED_COLOR,
        Measure::Cnt => CNT_COLOR,
    }
}

/// `(label, mean cnt)` pairs for a bar chart.
fn bar_items<K: PartialEq>(table: &AggregateTable<K>, label: impl Fn(&K) -> String) -> Vec<(String, f64)> {
    table.series(Measure::Cnt).into_iter().map(|(k, v)| (label(k), v)).collect()
}

fn draw_bars(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, items: &[(String, f64)]) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    if items.is_empty() {
        frame.render_widget(Paragraph::new("(no records)").block(block), area);
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let bar_width = (inner_width / items.len()).saturating_sub(1).clamp(3, 16) as u16;
    let bars: Vec<Bar> = items
        .iter()
        .map(|(label, v)| {
            Bar::default()
                .value(v.round().max(0.0) as u64)
                .text_value(format!("{v:.0}"))
                .label(Line::from(truncate_label(label, bar_width as usize)))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    frame.render_widget(chart, area);
}

fn draw_line_chart(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    lines: &[LineSpec],
    points: &[(f64, f64)],
    (x_label, y_label): (&str, &str),
    (fmt_x, fmt_y): (&dyn Fn(f64) -> String, &dyn Fn(f64) -> String),
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    if lines.iter().all(|l| l.data.is_empty()) && points.is_empty() {
        let msg = Paragraph::new("(no records)").style(Style::default().fg(Color::Yellow));
        frame.render_widget(msg, inner);
        return;
    }

    let (x_bounds, y_bounds) = chart_bounds(lines, points);
    let (chart_rect, insets) = chart_layout(inner);
    let widget = DashChart {
        lines,
        points,
        x_bounds,
        y_bounds,
        x_label,
        y_label,
        fmt_x,
        fmt_y,
    };
    frame.render_widget(widget, chart_rect);

    if let Some(insets) = insets {
        let axes = Axes {
            x_bounds,
            y_bounds,
            x_label,
            y_label,
            fmt_x,
            fmt_y,
        };
        draw_axis_ticks(frame, inner, chart_rect, insets, &axes);
    }
}

fn fmt_int(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_one(v: f64) -> String {
    format!("{v:.1}")
}

/// Date label for a day offset from `start`.
fn day_label(start: Option<NaiveDate>, offset: f64) -> String {
    start
        .and_then(|s| s.checked_add_signed(chrono::Duration::days(offset.round() as i64)))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Cell background for a coefficient: red for positive, blue for negative.
fn heat_color(r: f64) -> Color {
    if r.is_nan() {
        return Color::DarkGray;
    }
    let level = (r.abs().clamp(0.0, 1.0) * 200.0) as u8;
    if r >= 0.0 {
        Color::Rgb(40 + level, 30, 30)
    } else {
        Color::Rgb(30, 30, 40 + level)
    }
}

/// Column header for the heatmap: `temp_actual` -> `temp`.
fn short_name(name: &str) -> String {
    let head = name.strip_suffix("_actual").unwrap_or(name);
    truncate_label(head, 6)
}

fn truncate_label(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

struct Axes<'a> {
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    x_label: &'a str,
    y_label: &'a str,
    fmt_x: &'a dyn Fn(f64) -> String,
    fmt_y: &'a dyn Fn(f64) -> String,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(frame: &mut ratatui::Frame<'_>, inner: Rect, chart: Rect, insets: AxisInsets, axes: &Axes<'_>) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = axes.x_bounds[0] + u * (axes.x_bounds[1] - axes.x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = (axes.fmt_x)(x_val);
        let label_len = label.chars().count() as u16;
        let start = x.saturating_sub(label_len / 2).max(inner.x);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len.min(inner.x + inner.width - start),
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = axes.y_bounds[0] + u * (axes.y_bounds[1] - axes.y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = (axes.fmt_y)(y_val);
        let label_len = label.chars().count() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new(axes.x_label.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(axes.y_label.to_string())
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Choice;
    use crate::testing::{dataset, record};

    fn app() -> App {
        let mut rows = vec![
            record("2011-01-01 08:00:00", "Winter", 1, 9),
            record("2011-07-01 18:00:00", "Summer", 30, 70),
        ];
        rows[1].is_rush_hour_morning = false;
        rows[1].is_rush_hour_evening = true;
        App::new(Arc::new(dataset(rows)), &FilterSpec::default(), "fixture".to_string())
    }

    #[test]
    fn filter_change_recomputes_snapshot() {
        let mut app = app();
        assert_eq!(app.snapshot.totals.cnt, 110);

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Right);
        assert_eq!(app.snapshot.filter.season, Choice::Only("Summer".to_string()));
        assert_eq!(app.snapshot.totals.cnt, 100);
        assert_eq!(app.recomputes, 1);

        app.handle_key(KeyCode::Char('c'));
        assert_eq!(app.snapshot.totals.cnt, 110);
        assert_eq!(app.recomputes, 2);
    }

    #[test]
    fn navigation_keys_do_not_recompute() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.tab, Tab::Weather);
        app.handle_key(KeyCode::Char('4'));
        assert_eq!(app.tab, Tab::Correlation);
        app.handle_key(KeyCode::BackTab);
        assert_eq!(app.tab, Tab::Users);
        app.handle_key(KeyCode::Down);
        assert_eq!(app.recomputes, 0);
    }

    #[test]
    fn date_edit_applies_on_enter() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        for c in "2011-06-01".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        // While editing, 'q' is text, not quit.
        assert!(!app.handle_key(KeyCode::Char('q')));
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);
        for c in "2011-12-31".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.snapshot.totals.records, 1);
        assert_eq!(app.snapshot.totals.cnt, 100);
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Esc));
    }

    #[test]
    fn day_type_lines_pair_measures_per_label() {
        let mut rows = vec![
            record("2011-01-03 08:00:00", "Winter", 1, 9),
            record("2011-01-08 08:00:00", "Winter", 5, 5),
        ];
        rows[1].workingday_label = "Weekend/Holiday".to_string();
        let ds = dataset(rows);
        let snap = DashboardSnapshot::compute(&ds, &FilterSpec::default());
        let lines = day_type_lines(&snap.hourly_workingday);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].data, vec![(8.0, 1.0)]);
        assert_eq!(lines[3].data, vec![(8.0, 5.0)]);
    }

    #[test]
    fn heat_colors_and_labels() {
        assert_eq!(heat_color(f64::NAN), Color::DarkGray);
        assert_eq!(heat_color(1.0), Color::Rgb(240, 30, 30));
        assert_eq!(heat_color(-1.0), Color::Rgb(30, 30, 240));
        assert_eq!(short_name("windspeed_actual"), "windsp");
        assert_eq!(short_name("cnt"), "cnt");
        let start = NaiveDate::from_ymd_opt(2011, 1, 1);
        assert_eq!(day_label(start, 31.0), "2011-02-01");
    }
}
