//! Plotters-powered combined time-series chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//! - easy to extend later (legend, annotations, exportable PNG/SVG backends, etc.)
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use chrono::{Days, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// One plottable series: display label plus (day-offset, value) points.
///
/// Day offsets are relative to the chart's `start` date; missing observations
/// are simply absent, so lines bridge gaps the way the source data reads.
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: all series and bounds are computed
/// outside the render call. This keeps `render()` focused on drawing and makes
/// it easy to test/benchmark the data prep separately.
pub struct DashPlottersChart<'a> {
    pub series: &'a [ChartSeries],
    /// X bounds in day offsets from `start`.
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Calendar date of day offset 0, used for tick labels.
    pub start: NaiveDate,
}

/// Terminal-friendly palette shared by the chart lines and the legend.
pub const SERIES_PALETTE: &[(u8, u8, u8)] = &[
    (0, 255, 255),  // cyan
    (255, 215, 0),  // gold
    (0, 255, 0),    // green
    (255, 105, 180),// pink
    (255, 140, 0),  // orange
    (135, 206, 250),// light blue
    (255, 0, 0),    // red
    (255, 255, 255),// white
];

pub fn series_color(index: usize) -> (u8, u8, u8) {
    SERIES_PALETTE[index % SERIES_PALETTE.len()]
}

impl<'a> Widget for DashPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        let start = self.start;

        // `plotters-ratatui-backend` draws Plotters primitives via Ratatui's
        // `Canvas` widget, which ultimately writes to the terminal buffer.
        //
        // We delegate rendering to the crate-provided widget helper to avoid
        // coupling our code to its internal backend types.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                // Small margins keep the chart readable without wasting space.
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 9)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Axes + tick labels.
            //
            // We disable the mesh lines to reduce visual clutter in low-resolution
            // terminal rendering; the axes + labels are usually enough here.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_date_offset(start, *v))
                .y_label_formatter(&|v| fmt_value(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for (i, series) in self.series.iter().enumerate() {
                let (r, g, b) = series_color(i);
                let color = RGBColor(r, g, b);
                chart.draw_series(LineSeries::new(series.points.iter().copied(), &color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

fn fmt_date_offset(start: NaiveDate, offset: f64) -> String {
    let days = offset.max(0.0).round() as u64;
    match start.checked_add_days(Days::new(days)) {
        Some(date) => date.format("%Y-%m").to_string(),
        None => String::new(),
    }
}

fn fmt_value(v: f64) -> String {
    if v.abs() >= 100_000.0 {
        format!("{:.0}k", v / 1_000.0)
    } else if v.abs() >= 1_000.0 {
        format!("{:.1}k", v / 1_000.0)
    } else {
        format!("{v:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_offset_labels_track_the_start_date() {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        assert_eq!(fmt_date_offset(start, 0.0), "2015-01");
        assert_eq!(fmt_date_offset(start, 365.0), "2016-01");
        assert_eq!(fmt_date_offset(start, -3.0), "2015-01");
    }

    #[test]
    fn axis_values_compact_large_magnitudes() {
        assert_eq!(fmt_value(523_462.0), "523k");
        assert_eq!(fmt_value(1_500.0), "1.5k");
        assert_eq!(fmt_value(85.3), "85.3");
    }

    #[test]
    fn palette_wraps_around() {
        assert_eq!(series_color(0), series_color(SERIES_PALETTE.len()));
    }
}
