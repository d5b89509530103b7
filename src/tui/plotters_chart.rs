//! Plotters-powered rate chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - dashed reference lines for the floor and ceiling
//! - less manual work for ticks/labels
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Minimum area Plotters needs to build the chart.
pub const MIN_WIDTH: u16 = 20;
pub const MIN_HEIGHT: u16 = 8;

pub const RATE_COLOR: RGBColor = RGBColor(75, 192, 192);
pub const FLOOR_COLOR: RGBColor = RGBColor(255, 0, 0);
pub const CEILING_COLOR: RGBColor = RGBColor(0, 128, 255);

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call, so `render()`
/// only draws. X coordinates are schedule indices; `labels` maps them to dates.
pub struct RatePlottersChart<'a> {
    /// Primary rate line.
    pub rates: &'a [(f64, f64)],
    /// Constant floor reference line.
    pub floor: &'a [(f64, f64)],
    /// Constant ceiling reference line.
    pub ceiling: &'a [(f64, f64)],
    /// Date label per index.
    pub labels: &'a [String],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for RatePlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("date")
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| label_at(self.labels, *v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Reference lines first so the rate line stays on top.
            chart.draw_series(DashedLineSeries::new(
                self.floor.iter().copied(),
                2,
                2,
                FLOOR_COLOR.stroke_width(1),
            ))?;
            chart.draw_series(DashedLineSeries::new(
                self.ceiling.iter().copied(),
                2,
                2,
                CEILING_COLOR.stroke_width(1),
            ))?;
            chart.draw_series(LineSeries::new(self.rates.iter().copied(), &RATE_COLOR))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Date label for an x coordinate, blank between schedule points.
pub fn label_at(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}
