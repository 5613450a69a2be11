//! Noise strokes painted over the composed canvas
//!
//! All strokes are aliased and opaque. Coordinates name pixels, so paths are
//! shifted by half a pixel to land on pixel centres before tiny-skia fills
//! them.

use kurbo::{BezPath, Point, Shape, Vec2};
use tiny_skia::{LineCap, Paint, Pixmap, Stroke, Transform};

use captcha_core::error::{RenderError, Result};
use captcha_core::{Canvas, Color, RandomSource};

use crate::outline::to_skia_path;

/// Stroke width of the default dot segments
pub const DOT_WIDTH: f32 = 3.0;
/// Number of dot segments painted by default
pub const DOT_COUNT: usize = 30;

/// Stroke width of the bezier noise curve
pub const BEZIER_WIDTH: f32 = 4.0;
/// Number of segments the bezier curve's control polygon spans
pub const BEZIER_POINTS: usize = 6;
/// Steps the bezier curve is flattened into
const BEZIER_STEPS: usize = 20;

/// Short segments painted by [`paint_noise`] by default
pub const NOISE_COUNT: usize = 50;
/// Length and width of each [`paint_noise`] segment
pub const NOISE_LEVEL: u32 = 2;

/// One elliptical arc across the middle of the canvas
///
/// The bounding box spans from the left fifth to the right fifth of the
/// canvas and stays inside the vertical fifths. The arc starts at
/// `[0, 20]` degrees and ends at `[160, 200]`, measured clockwise from
/// 3 o'clock.
pub fn paint_curve(canvas: &mut Canvas, color: Color, rng: &mut dyn RandomSource) -> Result<()> {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);

    let x1 = rng.int_in(0, w / 5);
    let x2 = rng.int_in(w - w / 5, w);
    let y1 = rng.int_in(h / 5, h - h / 5);
    let y2 = rng.int_in(y1, h - h / 5);
    let end = rng.int_in(160, 200);
    let start = rng.int_in(0, 20);

    log::trace!(
        "curve: box=({}, {})-({}, {}) angles={}..{}",
        x1,
        y1,
        x2,
        y2,
        start,
        end
    );

    let arc = kurbo::Arc {
        center: Point::new((x1 + x2) as f64 / 2.0, (y1 + y2) as f64 / 2.0),
        radii: Vec2::new((x2 - x1) as f64 / 2.0, (y2 - y1) as f64 / 2.0),
        start_angle: (start as f64).to_radians(),
        sweep_angle: ((end - start) as f64).to_radians(),
        x_rotation: 0.0,
    };

    stroke(canvas, &arc.to_path(0.1), color, 1.0, LineCap::Butt)
}

/// `count` short diagonal strokes at random positions
///
/// Each one runs from `(x, y)` to `(x - 1, y - 1)` with `x ∈ [0, w]` and
/// `y ∈ [0, h]`, so strokes may cluster, overlap or hang off the edge.
pub fn paint_dots(
    canvas: &mut Canvas,
    color: Color,
    rng: &mut dyn RandomSource,
    line_width: f32,
    count: usize,
) -> Result<()> {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);

    let mut path = BezPath::new();
    for _ in 0..count {
        let x = rng.int_in(0, w) as f64;
        let y = rng.int_in(0, h) as f64;
        path.move_to((x, y));
        path.line_to((x - 1.0, y - 1.0));
    }

    stroke(canvas, &path, color, line_width, LineCap::Square)
}

/// A wavy polyline through random heights spread evenly across the width
///
/// `number - 1` control points sit at `x = i · w / number`, each at a random
/// height in `[0, h]`. The bezier curve through them is flattened into
/// twenty straight steps.
pub fn paint_bezier_curve(
    canvas: &mut Canvas,
    color: Color,
    rng: &mut dyn RandomSource,
    width: f32,
    number: usize,
) -> Result<()> {
    if number < 2 {
        return Ok(());
    }
    let step = canvas.width() as f64 / number as f64;
    let height = canvas.height() as i64;

    let controls: Vec<Point> = (1..number)
        .map(|i| Point::new(step * i as f64, rng.int_in(0, height) as f64))
        .collect();

    let mut path = BezPath::new();
    for (i, point) in bezier_polyline(&controls, BEZIER_STEPS).into_iter().enumerate() {
        if i == 0 {
            path.move_to(point);
        } else {
            path.line_to(point);
        }
    }

    stroke(canvas, &path, color, width, LineCap::Butt)
}

/// Evaluate the Bernstein form of `controls` at `steps + 1` evenly spaced `t`
pub fn bezier_polyline(controls: &[Point], steps: usize) -> Vec<Point> {
    let weights = pascal_row(controls.len().saturating_sub(1));
    let degree = weights.len() as i32 - 1;

    (0..=steps)
        .map(|k| {
            let t = k as f64 / steps as f64;
            let mut point = Point::ZERO;
            for (i, (&weight, control)) in weights.iter().zip(controls).enumerate() {
                let coef = weight * t.powi(i as i32) * (1.0 - t).powi(degree - i as i32);
                point.x += coef * control.x;
                point.y += coef * control.y;
            }
            point
        })
        .collect()
}

/// Row `n` of Pascal's triangle
fn pascal_row(n: usize) -> Vec<f64> {
    let mut row = vec![1.0];
    for k in 0..n {
        let next = row[k] * (n - k) as f64 / (k + 1) as f64;
        row.push(next);
    }
    row
}

/// Short horizontal dashes inside the inner 80% of the canvas
///
/// Each dash starts at `x ∈ [w/10, w − w/10)`, `y ∈ [h/10, h − h/10)` and
/// runs `level` pixels to the right with width `level`.
pub fn paint_noise(
    canvas: &mut Canvas,
    color: Color,
    rng: &mut dyn RandomSource,
    number: usize,
    level: u32,
) -> Result<()> {
    let (w, h) = (canvas.width() as f64, canvas.height() as f64);
    let (dx, dy) = (w / 10.0, h / 10.0);

    let mut path = BezPath::new();
    for _ in 0..number {
        let x = rng.uniform(dx, w - dx) as i64 as f64;
        let y = rng.uniform(dy, h - dy) as i64 as f64;
        path.move_to((x, y));
        path.line_to((x + level as f64, y));
    }

    stroke(canvas, &path, color, level as f32, LineCap::Butt)
}

/// Stroke `path` onto the canvas in opaque `color`
///
/// The canvas round-trips through a tiny-skia pixmap; the colour's alpha is
/// ignored.
fn stroke(
    canvas: &mut Canvas,
    path: &BezPath,
    color: Color,
    width: f32,
    cap: LineCap,
) -> Result<()> {
    let Some(path) = to_skia_path(path) else {
        return Ok(());
    };

    let mut pixmap =
        Pixmap::new(canvas.width(), canvas.height()).ok_or(RenderError::PixmapCreationFailed)?;
    for (dst, src) in pixmap.data_mut().chunks_exact_mut(4).zip(canvas.pixels()) {
        dst.copy_from_slice(&[src[0], src[1], src[2], 255]);
    }

    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    paint.anti_alias = false;

    let stroke = Stroke {
        width,
        line_cap: cap,
        ..Default::default()
    };

    pixmap.stroke_path(
        &path,
        &paint,
        &stroke,
        Transform::from_translate(0.5, 0.5),
        None,
    );

    for (dst, src) in canvas.pixels_mut().zip(pixmap.data().chunks_exact(4)) {
        dst.0 = [src[0], src[1], src[2]];
    }
    Ok(())
}
