//! Ratatui-based terminal dashboard.
//!
//! The TUI provides a settings panel for the date range, the quarterly
//! resample toggle and per-series selection, then renders KPI cards, the
//! combined line chart and the correlation heatmap from one pipeline run.

use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::{self, Dashboard, RunOutput};
use crate::data::FredClient;
use crate::domain::{DashConfig, SERIES_REGISTRY};
use crate::error::AppError;

mod heatmap;
mod plotters_chart;

use heatmap::CorrelationHeatmap;
use plotters_chart::{ChartSeries, DashPlottersChart, series_color};

/// Settings rows before the per-series toggles.
const FIXED_FIELDS: usize = 3;

/// Start the TUI with an initial configuration.
pub fn run(config: DashConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    app.recompute();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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
enum BodyView {
    Chart,
    Heatmap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateField {
    Start,
    End,
}

struct App {
    config: DashConfig,
    client: Option<FredClient>,
    dashboard: Dashboard,
    selected_field: usize,
    editing: Option<DateField>,
    date_input: String,
    view: BodyView,
    status: String,
}

impl App {
    fn new(config: DashConfig) -> Self {
        let client = FredClient::from_env();
        let status = if client.is_some() {
            "Fetching FRED data...".to_string()
        } else {
            "No FRED API key. Set FRED_API_KEY in .env, then press r.".to_string()
        };
        Self {
            config,
            client,
            dashboard: Dashboard::AwaitingKey,
            selected_field: 0,
            editing: None,
            date_input: String::new(),
            view: BodyView::Chart,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing.is_some() {
            self.handle_date_edit(code);
            return false;
        }

        let field_count = FIXED_FIELDS + SERIES_REGISTRY.len();
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field + 1 < field_count {
                    self.selected_field += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => match self.selected_field {
                0 => self.begin_date_edit(DateField::Start),
                1 => self.begin_date_edit(DateField::End),
                2 => {
                    self.config.resample_quarterly = !self.config.resample_quarterly;
                    self.recompute();
                }
                i => {
                    self.toggle_series(i - FIXED_FIELDS);
                    self.recompute();
                }
            },
            KeyCode::Char('h') => {
                self.view = match self.view {
                    BodyView::Chart => BodyView::Heatmap,
                    BodyView::Heatmap => BodyView::Chart,
                };
            }
            KeyCode::Char('r') => {
                if self.client.is_none() {
                    self.client = FredClient::from_env();
                }
                self.recompute();
            }
            KeyCode::Char('e') => self.export_csv(Path::new("pulse_table.csv")),
            _ => {}
        }

        false
    }

    fn begin_date_edit(&mut self, field: DateField) {
        let current = match field {
            DateField::Start => self.config.start,
            DateField::End => self.config.end,
        };
        self.editing = Some(field);
        self.date_input = current.to_string();
        self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => self.apply_date_input(),
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn apply_date_input(&mut self) {
        let Some(field) = self.editing else {
            return;
        };
        let trimmed = self.date_input.trim();
        let date = match chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                self.status = format!("Invalid date '{trimmed}': {e}");
                return;
            }
        };

        match field {
            DateField::Start => self.config.start = date,
            DateField::End => self.config.end = date,
        }
        self.editing = None;

        if self.config.start > self.config.end {
            // Allowed, but everything downstream degrades to empty output.
            self.status = "Start is after end; showing an empty range.".to_string();
        }
        self.recompute();
    }

    fn toggle_series(&mut self, index: usize) {
        let Some(def) = SERIES_REGISTRY.get(index) else {
            return;
        };
        if self.config.selected.iter().any(|l| l == def.label) {
            self.config.selected.retain(|l| l != def.label);
        } else {
            // Rebuild in registry order so column order stays stable.
            let mut selected: Vec<String> = Vec::new();
            for d in SERIES_REGISTRY {
                if d.label == def.label || self.config.selected.iter().any(|l| l == d.label) {
                    selected.push(d.label.to_string());
                }
            }
            self.config.selected = selected;
        }
    }

    /// One full recomputation pass. Fetches are memoized inside the client,
    /// so an unchanged (code, start, end) triple never re-hits the network.
    fn recompute(&mut self) {
        self.dashboard = pipeline::run_dashboard(self.client.as_mut(), &self.config);
        self.status = match &self.dashboard {
            Dashboard::AwaitingKey => {
                "No FRED API key. Set FRED_API_KEY in .env, then press r.".to_string()
            }
            Dashboard::NoData { failures } if failures.is_empty() => {
                "No data loaded. Select at least one series.".to_string()
            }
            Dashboard::NoData { failures } => {
                format!("No data loaded ({} fetch failures).", failures.len())
            }
            Dashboard::Ready(run) => {
                if run.failures.is_empty() {
                    format!(
                        "{} days x {} series.",
                        run.table.n_rows(),
                        run.table.n_cols()
                    )
                } else {
                    format!(
                        "{} days x {} series; {} series failed to load.",
                        run.table.n_rows(),
                        run.table.n_cols(),
                        run.failures.len()
                    )
                }
            }
        };
    }

    fn export_csv(&mut self, path: &Path) {
        let Dashboard::Ready(run) = &self.dashboard else {
            self.status = "Nothing to export yet.".to_string();
            return;
        };
        match crate::io::export::write_table_csv(path, &run.filled) {
            Ok(()) => self.status = format!("Wrote aligned table: {}", path.display()),
            Err(err) => self.status = format!("Export failed: {err}"),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let settings_height = (FIXED_FIELDS + SERIES_REGISTRY.len()) as u16 + 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(settings_height),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_kpis(frame, chunks[1]);
        self.draw_body(frame, chunks[2]);
        self.draw_settings(frame, chunks[3]);
        self.draw_footer(frame, chunks[4]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("pulse", Style::default().fg(Color::Cyan)),
            Span::raw(" — Retail Market Dashboard (FRED)"),
        ]));
        lines.push(Line::from(Span::styled(
            format!(
                "range: {} → {} | resample: {} | selected: {}/{}",
                self.config.start,
                self.config.end,
                if self.config.resample_quarterly { "on" } else { "off" },
                self.config.selected.len(),
                SERIES_REGISTRY.len(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_kpis(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Dashboard::Ready(run) = &self.dashboard else {
            let p = Paragraph::new("").block(Block::default().title("KPIs").borders(Borders::ALL));
            frame.render_widget(p, area);
            return;
        };
        if run.kpis.is_empty() {
            return;
        }

        let constraints: Vec<Constraint> = run
            .kpis
            .iter()
            .map(|_| Constraint::Ratio(1, run.kpis.len() as u32))
            .collect();
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (kpi, cell) in run.kpis.iter().zip(cells.iter()) {
            let latest = kpi
                .record
                .latest
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "N/A".to_string());
            let (delta, delta_style) = match kpi.record.delta_pct {
                Some(d) if d >= 0.0 => (
                    format!("{d:+.2}% vs first"),
                    Style::default().fg(Color::Green),
                ),
                Some(d) => (format!("{d:+.2}% vs first"), Style::default().fg(Color::Red)),
                None => ("N/A".to_string(), Style::default().fg(Color::DarkGray)),
            };

            let width = cell.width.saturating_sub(2) as usize;
            let lines = vec![
                Line::from(Span::styled(
                    truncate(&kpi.label, width.max(1)),
                    Style::default().fg(Color::Cyan),
                )),
                Line::from(Span::styled(
                    latest,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(delta, delta_style)),
            ];
            let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
            frame.render_widget(p, *cell);
        }
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.view {
            BodyView::Chart => "Combined Time Series (h: heatmap)",
            BodyView::Heatmap => "Correlation — Pct Change (h: chart)",
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        match &self.dashboard {
            Dashboard::AwaitingKey => {
                let msg = Paragraph::new("Enter your FRED API key (FRED_API_KEY) to begin.")
                    .style(Style::default().fg(Color::Yellow));
                frame.render_widget(msg, inner);
            }
            Dashboard::NoData { failures } => {
                let mut lines =
                    vec![Line::from("No data loaded. Check API key or series selection.")];
                for f in failures {
                    lines.push(Line::from(Span::styled(
                        format!("failed: {} ({})", f.label, f.cause),
                        Style::default().fg(Color::Red),
                    )));
                }
                let msg = Paragraph::new(Text::from(lines)).style(Style::default().fg(Color::Yellow));
                frame.render_widget(msg, inner);
            }
            Dashboard::Ready(run) => match self.view {
                BodyView::Chart => self.draw_chart(frame, inner, run),
                BodyView::Heatmap => {
                    frame.render_widget(
                        CorrelationHeatmap {
                            matrix: &run.correlations,
                        },
                        inner,
                    );
                }
            },
        }
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, inner: Rect, run: &RunOutput) {
        if inner.height < 3 {
            return;
        }

        let (series, x_bounds, y_bounds) = chart_series(run);
        if series.is_empty() {
            let msg = Paragraph::new("No valid data series to plot.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        // Legend line on top, chart below.
        let mut spans: Vec<Span> = Vec::new();
        for (i, s) in series.iter().enumerate() {
            let (r, g, b) = series_color(i);
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(
                format!("── {}", truncate(&s.label, 24)),
                Style::default().fg(Color::Rgb(r, g, b)),
            ));
        }
        let legend_rect = Rect {
            height: 1,
            ..inner
        };
        frame.render_widget(Paragraph::new(Line::from(spans)), legend_rect);

        let chart_rect = Rect {
            y: inner.y + 1,
            height: inner.height - 1,
            ..inner
        };
        frame.render_widget(
            DashPlottersChart {
                series: &series,
                x_bounds,
                y_bounds,
                start: self.config.start,
            },
            chart_rect,
        );
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = Vec::new();

        let start_label = if self.editing == Some(DateField::Start) {
            format!("Start date: {}_", self.date_input)
        } else {
            format!("Start date: {}", self.config.start)
        };
        let end_label = if self.editing == Some(DateField::End) {
            format!("End date: {}_", self.date_input)
        } else {
            format!("End date: {}", self.config.end)
        };
        items.push(ListItem::new(start_label));
        items.push(ListItem::new(end_label));
        items.push(ListItem::new(format!(
            "[{}] Resample quarterly to monthly",
            if self.config.resample_quarterly { "x" } else { " " },
        )));

        for def in SERIES_REGISTRY {
            let on = self.config.selected.iter().any(|l| l == def.label);
            items.push(ListItem::new(format!(
                "[{}] {}",
                if on { "x" } else { " " },
                def.label,
            )));
        }

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  Enter/Space toggle/edit  h chart/heatmap  r refresh  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Build chart series from the exact-date table.
///
/// The unfilled table is used so lines connect real observations instead of
/// drawing long flat runs of filled values; the chart column set already
/// excludes a quarterly original when its month-end variant is present.
fn chart_series(run: &RunOutput) -> (Vec<ChartSeries>, [f64; 2], [f64; 2]) {
    let n_rows = run.table.n_rows();
    let mut series = Vec::new();

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for column in run.table.chart_columns() {
        let mut points = Vec::new();
        for (row, value) in column.values.iter().enumerate() {
            if let Some(v) = value {
                points.push((row as f64, *v));
                y_min = y_min.min(*v);
                y_max = y_max.max(*v);
            }
        }
        if !points.is_empty() {
            series.push(ChartSeries {
                label: column.label.clone(),
                points,
            });
        }
    }

    let x_bounds = [0.0, (n_rows.saturating_sub(1)).max(1) as f64];
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let y_bounds = [y_min - pad, y_max + pad];

    (series, x_bounds, y_bounds)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_with_series;
    use crate::domain::Series;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn chart_series_skips_missing_points_and_bounds_pad() {
        let a = Series::from_observations(
            "A",
            "A",
            vec![(d(2020, 1, 1), 10.0), (d(2020, 1, 3), 12.0)],
        );
        let config = DashConfig {
            start: d(2020, 1, 1),
            end: d(2020, 1, 3),
            selected: vec!["A".to_string()],
            resample_quarterly: true,
        };
        let run = match run_with_series(vec![a], Vec::new(), &config) {
            Dashboard::Ready(run) => run,
            other => panic!("expected Ready, got {other:?}"),
        };

        let (series, x_bounds, y_bounds) = chart_series(&run);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points, vec![(0.0, 10.0), (2.0, 12.0)]);
        assert_eq!(x_bounds, [0.0, 2.0]);
        assert!(y_bounds[0] < 10.0 && y_bounds[1] > 12.0);
    }

    #[test]
    fn chart_series_degrades_on_empty_run() {
        let a = Series::new("A", "A");
        let config = DashConfig {
            start: d(2020, 1, 2),
            end: d(2020, 1, 1),
            selected: vec!["A".to_string()],
            resample_quarterly: true,
        };
        let run = match run_with_series(vec![a], Vec::new(), &config) {
            Dashboard::Ready(run) => run,
            other => panic!("expected Ready, got {other:?}"),
        };
        let (series, _, y_bounds) = chart_series(&run);
        assert!(series.is_empty());
        // Fallback bounds: [0, 1] with a 5% pad.
        assert!((y_bounds[0] + 0.05).abs() < 1e-12);
        assert!((y_bounds[1] - 1.05).abs() < 1e-12);
    }
}
