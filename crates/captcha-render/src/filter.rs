//! Final smoothing pass

use image::imageops;

use captcha_core::Canvas;

/// 3x3 smoothing kernel, normalised by its sum (13)
pub const SMOOTH_KERNEL: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];

/// Soften the whole canvas with [`SMOOTH_KERNEL`]
///
/// Border pixels have no full neighbourhood and are copied through
/// unchanged.
pub fn smooth(canvas: &Canvas) -> Canvas {
    let mut out: Canvas = imageops::filter3x3(canvas, &SMOOTH_KERNEL);

    let (w, h) = canvas.dimensions();
    for (x, y, px) in canvas.enumerate_pixels() {
        if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
            out.put_pixel(x, y, *px);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn flat_images_stay_flat() {
        let canvas: Canvas = ImageBuffer::from_pixel(12, 8, Rgb([200, 120, 31]));
        assert_eq!(smooth(&canvas), canvas);
    }

    #[test]
    fn a_single_bright_pixel_spreads() {
        let mut canvas: Canvas = ImageBuffer::from_pixel(5, 5, Rgb([0, 0, 0]));
        canvas.put_pixel(2, 2, Rgb([130, 130, 130]));
        let out = smooth(&canvas);

        // Centre keeps 5/13 of itself, neighbours get 1/13
        assert_eq!(out.get_pixel(2, 2)[0], 50);
        assert_eq!(out.get_pixel(1, 1)[0], 10);
        assert_eq!(out.get_pixel(3, 2)[0], 10);
    }

    #[test]
    fn borders_are_copied() {
        let canvas: Canvas = ImageBuffer::from_fn(6, 4, |x, y| Rgb([(x * 40) as u8, (y * 60) as u8, 7]));
        let out = smooth(&canvas);
        for x in 0..6 {
            assert_eq!(out.get_pixel(x, 0), canvas.get_pixel(x, 0));
            assert_eq!(out.get_pixel(x, 3), canvas.get_pixel(x, 3));
        }
        for y in 0..4 {
            assert_eq!(out.get_pixel(0, y), canvas.get_pixel(0, y));
            assert_eq!(out.get_pixel(5, y), canvas.get_pixel(5, y));
        }
    }
}
