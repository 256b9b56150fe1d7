//! Correlation heatmap widget.
//!
//! Plotters has no terminal-friendly heatmap primitive, so this draws the
//! matrix straight into the Ratatui buffer: one colored cell per pair, a
//! numbered axis, and a legend mapping numbers back to series labels.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::stats::CorrelationMatrix;

const CELL_WIDTH: u16 = 7;

pub struct CorrelationHeatmap<'a> {
    pub matrix: &'a CorrelationMatrix,
}

impl<'a> Widget for CorrelationHeatmap<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let n = self.matrix.len() as u16;
        if n == 0 {
            buf.set_string(
                area.x,
                area.y,
                "No correlations to display.",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let header_w = 4u16;
        let need_w = header_w + n * CELL_WIDTH;
        let need_h = 1 + n;
        if area.width < need_w || area.height < need_h {
            buf.set_string(
                area.x,
                area.y,
                "Heatmap area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let axis_style = Style::default().fg(Color::Gray);

        // Column headers.
        for j in 0..n {
            let label = format!("{:>width$}", format!("[{}]", j + 1), width = CELL_WIDTH as usize);
            buf.set_string(area.x + header_w + j * CELL_WIDTH, area.y, label, axis_style);
        }

        // One row per series: header + colored cells.
        for i in 0..n {
            let y = area.y + 1 + i;
            buf.set_string(area.x, y, format!("[{}]", i + 1), axis_style);

            for j in 0..n {
                let x = area.x + header_w + j * CELL_WIDTH;
                let (text, style) = match self.matrix.get(i as usize, j as usize) {
                    Some(r) => (
                        format!("{:>width$}", format!("{r:+.2}"), width = CELL_WIDTH as usize),
                        Style::default().fg(cell_fg(r)).bg(cell_bg(r)),
                    ),
                    None => (
                        format!("{:>width$}", ".", width = CELL_WIDTH as usize),
                        Style::default().fg(Color::DarkGray),
                    ),
                };
                buf.set_string(x, y, text, style);
            }
        }

        // Legend: numbered labels below the grid, as many as fit.
        let mut y = area.y + 1 + n + 1;
        for (i, label) in self.matrix.labels().iter().enumerate() {
            if y >= area.y + area.height {
                break;
            }
            buf.set_string(area.x, y, format!("[{}] {label}", i + 1), axis_style);
            y += 1;
        }
    }
}

/// Background gradient: red for negative, green for positive, darker near zero.
fn cell_bg(r: f64) -> Color {
    let magnitude = (r.abs().clamp(0.0, 1.0) * 180.0) as u8 + 40;
    if r < 0.0 {
        Color::Rgb(magnitude, 0, 0)
    } else {
        Color::Rgb(0, magnitude, 0)
    }
}

fn cell_fg(r: f64) -> Color {
    if r.abs() > 0.6 { Color::Black } else { Color::White }
}
