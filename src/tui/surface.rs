//! Off-screen chart surfaces for the terminal.
//!
//! A [`BufferSurface`] is an owned Ratatui buffer covering the chart area. The
//! chart is painted into it once per state change and blitted into every
//! frame until the next render. Dropping the surface frees the buffer.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::chart::{ChartFrame, RenderSurface, SurfaceProvider};
use crate::domain::DisplayMode;
use crate::error::RenderError;

use super::plotters_chart::{self, RatePlottersChart};

/// Hands out buffers sized to the chart area from the latest layout pass.
#[derive(Debug, Default)]
pub struct TerminalSurfaces {
    area: Option<Rect>,
}

impl TerminalSurfaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the chart area; returns true when it changed.
    pub fn set_area(&mut self, area: Option<Rect>) -> bool {
        let changed = self.area != area;
        self.area = area;
        changed
    }

    pub fn area(&self) -> Option<Rect> {
        self.area
    }
}

impl SurfaceProvider for TerminalSurfaces {
    type Surface = BufferSurface;

    fn acquire(&mut self) -> Result<BufferSurface, RenderError> {
        let area = self
            .area
            .ok_or_else(|| RenderError::SurfaceUnavailable("chart area is not on screen".to_string()))?;

        // One extra row for the legend.
        if area.width < plotters_chart::MIN_WIDTH || area.height < plotters_chart::MIN_HEIGHT + 1 {
            return Err(RenderError::SurfaceUnavailable(format!(
                "chart area {}x{} too small (resize terminal)",
                area.width, area.height
            )));
        }

        Ok(BufferSurface {
            buffer: Buffer::empty(area),
        })
    }
}

#[derive(Debug)]
pub struct BufferSurface {
    buffer: Buffer,
}

impl BufferSurface {
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }
}

impl RenderSurface for BufferSurface {
    fn draw(&mut self, frame: &ChartFrame) -> Result<(), RenderError> {
        let area = self.buffer.area;

        if frame.datasets.is_empty() {
            self.buffer.set_string(
                area.x,
                area.y,
                "No rate data returned for this loan.",
                Style::default().fg(Color::Yellow),
            );
            return Ok(());
        }

        let legend_rect = Rect { height: 1, ..area };
        legend(frame.mode).render(legend_rect, &mut self.buffer);

        let chart_rect = Rect {
            y: area.y + 1,
            height: area.height - 1,
            ..area
        };
        let lines = ChartLines::from_frame(frame);
        let widget = RatePlottersChart {
            rates: &lines.rates,
            floor: &lines.floor,
            ceiling: &lines.ceiling,
            labels: &frame.labels,
            x_bounds: lines.x_bounds,
            y_bounds: lines.y_bounds,
            y_label: frame.mode.unit_label(),
            fmt_y: match frame.mode {
                DisplayMode::Decimal => fmt_axis_decimal,
                DisplayMode::Percentage => fmt_axis_percent,
            },
        };
        widget.render(chart_rect, &mut self.buffer);
        Ok(())
    }
}

/// Indexed points and bounds for Plotters.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLines {
    pub rates: Vec<(f64, f64)>,
    pub floor: Vec<(f64, f64)>,
    pub ceiling: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ChartLines {
    pub fn from_frame(frame: &ChartFrame) -> Self {
        let indexed = |values: &[f64]| -> Vec<(f64, f64)> {
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| (i as f64, v))
                .collect()
        };

        let n = frame.datasets.len();
        let x_bounds = if n > 1 {
            [0.0, (n - 1) as f64]
        } else {
            [-0.5, 0.5]
        };

        let (y_min, y_max) = frame.datasets.value_range().unwrap_or((0.0, 1.0));
        let span = y_max - y_min;
        let pad = if span > 0.0 {
            span * 0.05
        } else {
            (y_max.abs() * 0.05).max(1e-6)
        };

        Self {
            rates: indexed(&frame.datasets.series),
            floor: indexed(&frame.datasets.floor_line),
            ceiling: indexed(&frame.datasets.ceiling_line),
            x_bounds,
            y_bounds: [y_min - pad, y_max + pad],
        }
    }
}

fn legend(mode: DisplayMode) -> Line<'static> {
    let rgb = |c: plotters::style::RGBColor| Color::Rgb(c.0, c.1, c.2);
    Line::from(vec![
        Span::styled("── rate", Style::default().fg(rgb(plotters_chart::RATE_COLOR))),
        Span::raw("  "),
        Span::styled("- - floor", Style::default().fg(rgb(plotters_chart::FLOOR_COLOR))),
        Span::raw("  "),
        Span::styled("- - ceiling", Style::default().fg(rgb(plotters_chart::CEILING_COLOR))),
        Span::styled(format!("  [{}]", mode.display_name()), Style::default().fg(Color::Gray)),
    ])
}

fn fmt_axis_decimal(v: f64) -> String {
    format!("{v:.4}")
}

fn fmt_axis_percent(v: f64) -> String {
    format!("{v:.2}%")
}
