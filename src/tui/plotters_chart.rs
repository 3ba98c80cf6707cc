//! Line and scatter charts drawn by Plotters into the Ratatui buffer
//! (via `plotters-ratatui-backend`).

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

pub const CNT_COLOR: RGBColor = RGBColor(0, 255, 255);
pub const CASUAL_COLOR: RGBColor = RGBColor(255, 200, 0);
pub const REGISTERED_COLOR: RGBColor = RGBColor(0, 255, 0);
pub const TREND_COLOR: RGBColor = RGBColor(255, 0, 0);

/// One polyline of a chart.
pub struct LineSpec {
    pub data: Vec<(f64, f64)>,
    pub color: RGBColor,
}

/// A render-only chart description; all series and bounds are computed
/// outside the render call.
pub struct DashChart<'a> {
    pub lines: &'a [LineSpec],
    /// Scatter series drawn as single pixels.
    pub points: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: &'a dyn Fn(f64) -> String,
    pub fmt_y: &'a dyn Fn(f64) -> String,
}

impl<'a> Widget for DashChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        if area.width < 20 || area.height < 8 {
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
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are noise at terminal resolution; axes + labels suffice.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Points first so lines stay visible on top.
            //
            // `Circle` markers are avoided: the backend maps their radii to
            // canvas units incorrectly and they come out huge.
            chart.draw_series(self.points.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            for line in self.lines {
                chart.draw_series(LineSeries::new(line.data.iter().copied(), &line.color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Bounds covering every line and point, padded by 5% on y.
///
/// Falls back to `[0, 1]` on an axis with no finite extent.
pub fn chart_bounds(lines: &[LineSpec], points: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let all = lines.iter().flat_map(|l| l.data.iter()).chain(points.iter());
    let (mut x_min, mut x_max, mut y_min, mut y_max) =
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in all {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
        let c = if x_min.is_finite() { x_min } else { 0.0 };
        (x_min, x_max) = (c - 0.5, c + 0.5);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        let c = if y_min.is_finite() { y_min } else { 0.0 };
        (y_min, y_max) = (c - 0.5, c + 0.5);
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    ([x_min, x_max], [y_min - pad, y_max + pad])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_lines_and_points() {
        let lines = [LineSpec {
            data: vec![(0.0, 10.0), (23.0, 30.0)],
            color: CNT_COLOR,
        }];
        let (x, y) = chart_bounds(&lines, &[(5.0, 50.0)]);
        assert_eq!(x, [0.0, 23.0]);
        assert!(y[0] < 10.0 && y[1] > 50.0);
    }

    #[test]
    fn degenerate_bounds_are_widened() {
        let (x, y) = chart_bounds(&[], &[(3.0, 7.0)]);
        assert_eq!(x, [2.5, 3.5]);
        assert!(y[0] < 7.0 && y[1] > 7.0);

        let (x, _) = chart_bounds(&[], &[]);
        assert_eq!(x, [-0.5, 0.5]);
    }
}
