use crate::quiver::{Arrow, Quiver};
use anyhow::{Context, Result};
use colorgrad::Gradient;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

/// Arrow heads are this fraction of the arrow length, capped in pixels.
const HEAD_FRACTION: f64 = 0.3;
const HEAD_MAX_PX: f64 = 12.0;
const HEAD_MIN_PX: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub title: Option<String>,
    pub axes: bool,
    /// Fixed data units per unit of displacement. `None` autoscales.
    pub scale: Option<f64>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 1000,
            title: None,
            axes: true,
            scale: None,
        }
    }
}

pub struct QuiverVisualiser {
    options: RenderOptions,
    gradient: Box<dyn Gradient>,
}

impl QuiverVisualiser {
    pub fn new(options: RenderOptions) -> Self {
        let gradient = Box::new(colorgrad::preset::viridis());
        Self { options, gradient }
    }

    /// Draw every finite arrow of `quiver` into a PNG at `path`.
    /// Returns the number of arrows drawn.
    pub fn render(&self, quiver: &Quiver, path: &Path) -> Result<usize> {
        anyhow::ensure!(!quiver.is_empty(), "Nothing to plot: the field has no cells");
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create '{}'", parent.display()))?;
        }

        let root = BitMapBackend::new(path, (self.options.width, self.options.height))
            .into_drawing_area();
        let drawn = self.draw(&root, quiver)?;
        root.present()
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        tracing::info!("Saved quiver plot: {} ({} arrows)", path.display(), drawn);
        Ok(drawn)
    }

    /// Draw into an in-memory RGB buffer (`width * height * 3` bytes).
    pub fn render_to_buffer(&self, quiver: &Quiver) -> Result<Vec<u8>> {
        anyhow::ensure!(!quiver.is_empty(), "Nothing to plot: the field has no cells");
        let (width, height) = (self.options.width, self.options.height);
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            self.draw(&root, quiver)?;
            root.present()?;
        }
        Ok(buffer)
    }

    fn draw(&self, root: &DrawingArea<BitMapBackend<'_>, Shift>, quiver: &Quiver) -> Result<usize> {
        root.fill(&WHITE)?;

        let scale = self.options.scale.unwrap_or_else(|| quiver.auto_scale());
        let flip = quiver.orientation().inverts_y_axis();
        // An inverted axis is drawn as the mirrored coordinate, labels are flipped back
        let screen_y = |y: f64| if flip { -y } else { y };

        let (x_min, x_max) = padded(quiver.x_bounds(), quiver.spacing());
        let (y_lo, y_hi) = padded(quiver.y_bounds(), quiver.spacing());
        let (y_min, y_max) = if flip { (-y_hi, -y_lo) } else { (y_lo, y_hi) };

        let mut builder = ChartBuilder::on(root);
        builder.margin(10);
        if let Some(title) = &self.options.title {
            builder.caption(title, ("sans-serif", 30));
        }
        if self.options.axes {
            builder.x_label_area_size(40).y_label_area_size(50);
        }
        let mut chart = builder.build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        if self.options.axes {
            let y_fmt = |v: &f64| format!("{:.0}", screen_y(*v));
            chart
                .configure_mesh()
                .disable_mesh()
                .x_desc("x")
                .y_desc("y")
                .y_label_formatter(&y_fmt)
                .draw()?;
        }

        // Arrows share one pixel scale on both axes so their direction survives a non-square plot
        let origin = to_f64(chart.backend_coord(&(x_min, y_min)));
        let x_end = to_f64(chart.backend_coord(&(x_max, y_min)));
        let y_end = to_f64(chart.backend_coord(&(x_min, y_max)));
        let px_per_unit = pixels_per_unit(
            (x_end.0 - origin.0) / (x_max - x_min),
            (origin.1 - y_end.1) / (y_max - y_min),
        );
        let canvas = (self.options.width as f64, self.options.height as f64);

        let max_mag = quiver.max_magnitude();
        let mut drawn = 0;
        for arrow in quiver.drawable() {
            let tail = to_f64(chart.backend_coord(&(arrow.x, screen_y(arrow.y))));
            let (off_x, off_y) = pixel_offset(arrow, scale * px_per_unit, flip);
            let Some(tip) = clip_to_canvas(tail, (tail.0 + off_x, tail.1 + off_y), canvas) else {
                tracing::debug!("Skipping arrow at ({}, {}): length overflows", arrow.x, arrow.y);
                continue;
            };
            let color = self.magnitude_to_color(arrow, max_mag);
            draw_arrow(root, tail, tip, color)?;
            drawn += 1;
        }

        Ok(drawn)
    }

    fn magnitude_to_color(&self, arrow: &Arrow, max_mag: f64) -> RGBColor {
        let normalized = if max_mag > 0.0 {
            arrow.magnitude() / max_mag
        } else {
            0.0
        };
        let normalized = normalized.clamp(0.0, 1.0);
        let color_rgba = self.gradient.at(normalized as f32).to_rgba8();
        RGBColor(color_rgba[0], color_rgba[1], color_rgba[2])
    }
}

fn padded((lo, hi): (f64, f64), spacing: f64) -> (f64, f64) {
    (lo - spacing, hi + spacing)
}

fn to_f64((x, y): (i32, i32)) -> (f64, f64) {
    (x as f64, y as f64)
}

fn pixels_per_unit(x_px: f64, y_px: f64) -> f64 {
    x_px.abs().min(y_px.abs())
}

/// Tail-to-tip offset in backend pixels. Pixel y grows downwards.
fn pixel_offset(arrow: &Arrow, px_scale: f64, flip: bool) -> (f64, f64) {
    let up = if flip { -arrow.v } else { arrow.v };
    (arrow.u * px_scale, -up * px_scale)
}

/// Shorten `tail -> tip` so the tip stays on the canvas. `None` if the
/// offset is not finite.
fn clip_to_canvas(tail: (f64, f64), tip: (f64, f64), (width, height): (f64, f64)) -> Option<(f64, f64)> {
    let (dx, dy) = (tip.0 - tail.0, tip.1 - tail.1);
    if !(dx.is_finite() && dy.is_finite()) {
        return None;
    }

    let limit = |start: f64, delta: f64, max: f64| -> f64 {
        if start + delta < 0.0 {
            (0.0 - start) / delta
        } else if start + delta > max {
            (max - start) / delta
        } else {
            1.0
        }
    };
    let t = limit(tail.0, dx, width - 1.0)
        .min(limit(tail.1, dy, height - 1.0))
        .clamp(0.0, 1.0);
    Some((tail.0 + dx * t, tail.1 + dy * t))
}

fn draw_arrow(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    tail: (f64, f64),
    tip: (f64, f64),
    color: RGBColor,
) -> Result<()> {
    let px = |(x, y): (f64, f64)| (x.round() as i32, y.round() as i32);
    let style = ShapeStyle::from(&color).stroke_width(1);
    area.draw(&PathElement::new(vec![px(tail), px(tip)], style))?;

    let dx = tip.0 - tail.0;
    let dy = tip.1 - tail.1;
    let len = dx.hypot(dy);
    if len < HEAD_MIN_PX {
        return Ok(());
    }

    // Head in pixel space so the plot aspect ratio does not skew it
    let (ux, uy) = (dx / len, dy / len);
    let head_len = (len * HEAD_FRACTION).min(HEAD_MAX_PX);
    let head_w = head_len * 0.4;
    let base_x = tip.0 - ux * head_len;
    let base_y = tip.1 - uy * head_len;
    let left = (base_x - uy * head_w, base_y + ux * head_w);
    let right = (base_x + uy * head_w, base_y - ux * head_w);
    area.draw(&Polygon::new(vec![px(tip), px(left), px(right)], color.filled()))?;
    Ok(())
}
