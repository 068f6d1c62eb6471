//! Draws a laid out caption: black outline first, white fill on top.

use image::{GrayImage, Pixel, Rgba, RgbaImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;

use super::font::CaptionFont;
use super::layout::CaptionLayout;

/// Caption fill colour
pub const FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Caption outline colour
pub const STROKE: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Draws every line of `layout` onto `canvas`, centred on `layout.center_x`.
/// Anything falling outside the canvas is clipped.
pub fn draw_layout(canvas: &mut RgbaImage, font: &CaptionFont, layout: &CaptionLayout) {
    for (index, line) in layout.lines.iter().enumerate() {
        let mask = font.line_mask(line, layout.font_size);
        let pen_x = (layout.center_x - mask.advance as f32 / 2.0).round() as i64;
        let left = pen_x + i64::from(mask.offset_x);
        let top = layout.line_top(index).round() as i64 + i64::from(mask.offset_y);
        draw_stroked(canvas, &mask.coverage, left, top, layout.stroke_width);
    }
}

fn draw_stroked(canvas: &mut RgbaImage, coverage: &GrayImage, left: i64, top: i64, stroke: u32) {
    let radius = stroke.clamp(1, u32::from(u8::MAX));
    let mut padded = GrayImage::new(
        coverage.width() + 2 * radius,
        coverage.height() + 2 * radius,
    );
    image::imageops::replace(&mut padded, coverage, i64::from(radius), i64::from(radius));
    let outline = dilate(&padded, Norm::L1, radius as u8);

    blend_mask(
        canvas,
        &outline,
        left - i64::from(radius),
        top - i64::from(radius),
        STROKE,
    );
    blend_mask(canvas, coverage, left, top, FILL);
}

/// Blends `color` into `canvas` using `mask` as per-pixel opacity.
fn blend_mask(canvas: &mut RgbaImage, mask: &GrayImage, left: i64, top: i64, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    for (x, y, value) in mask.enumerate_pixels() {
        let coverage = value.0[0];
        if coverage == 0 {
            continue;
        }
        let cx = left + i64::from(x);
        let cy = top + i64::from(y);
        if cx < 0 || cy < 0 || cx >= i64::from(width) || cy >= i64::from(height) {
            continue;
        }
        let mut source = color;
        source.0[3] = ((u16::from(color.0[3]) * u16::from(coverage)) / 255) as u8;
        canvas.get_pixel_mut(cx as u32, cy as u32).blend(&source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_clips_to_canvas() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let mask = GrayImage::from_pixel(4, 4, image::Luma([255]));
        blend_mask(&mut canvas, &mask, 2, -2, FILL);
        assert_eq!(canvas.get_pixel(3, 0), &FILL);
        assert_eq!(canvas.get_pixel(3, 1), &FILL);
        assert_eq!(canvas.get_pixel(1, 0), &Rgba([10, 20, 30, 255]));
        assert_eq!(canvas.get_pixel(3, 2), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn outline_surrounds_fill() {
        let mut canvas = RgbaImage::from_pixel(20, 20, Rgba([0, 128, 0, 255]));
        let mut coverage = GrayImage::new(4, 4);
        coverage.put_pixel(2, 2, image::Luma([255]));
        draw_stroked(&mut canvas, &coverage, 8, 8, 2);
        assert_eq!(canvas.get_pixel(10, 10), &FILL);
        assert_eq!(canvas.get_pixel(11, 10), &STROKE);
        assert_eq!(canvas.get_pixel(10, 12), &STROKE);
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([0, 128, 0, 255]));
    }
}
