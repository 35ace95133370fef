//! Pixel work: backgrounds, grain and shaped text.

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusttype::point;

use crate::compose::config::LayoutConfig;
use crate::compose::font::{FontFace, FontSet};
use crate::compose::layout::{wrap_lines, Align, FontRole, SlideKind, SlidePlan};
use crate::config::PaletteColors;

/// Vertical two-colour gradient, `top` on the first row and `bottom` on the last.
pub fn gradient(width: u32, height: u32, top: Rgb<u8>, bottom: Rgb<u8>) -> RgbImage {
    let span = height.saturating_sub(1).max(1) as f32;

    RgbImage::from_fn(width, height, |_, y| {
        let t = y as f32 / span;
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb([
            mix(top[0], bottom[0]),
            mix(top[1], bottom[1]),
            mix(top[2], bottom[2]),
        ])
    })
}

/// One sample of N(mean, sd) by Box-Muller.
fn gaussian(rng: &mut StdRng, mean: f32, sd: f32) -> f32 {
    let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
    let u2: f32 = rng.gen();
    mean + sd * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
}

/// Blend a mid-grey Gaussian noise layer over the image.
pub fn add_grain(img: &mut RgbImage, intensity: f32, noise: f32, seed: u64) {
    if intensity <= 0.0 {
        return;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    for pixel in img.pixels_mut() {
        let grain = gaussian(&mut rng, 128.0, noise).clamp(0.0, 255.0);
        for channel in pixel.0.iter_mut() {
            let value = *channel as f32 * (1.0 - intensity) + grain * intensity;
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }
    }
}

fn blend(dst: &mut Rgb<u8>, color: Rgb<u8>, coverage: f32) {
    let a = coverage.clamp(0.0, 1.0);
    for i in 0..3 {
        dst[i] = (color[i] as f32 * a + dst[i] as f32 * (1.0 - a)).round() as u8;
    }
}

/// Draw one line starting at `x` with its baseline at `baseline`.
pub fn draw_line(
    img: &mut RgbImage,
    face: &FontFace,
    text: &str,
    size: f32,
    x: f32,
    baseline: f32,
    color: Rgb<u8>,
) {
    let shaped = face.shape(text, size);
    let scale = face.scale(size);
    let (width, height) = img.dimensions();

    for glyph in &shaped.glyphs {
        let positioned = face
            .glyph(glyph.id)
            .scaled(scale)
            .positioned(point(x + glyph.x, baseline + glyph.y));

        let Some(bb) = positioned.pixel_bounding_box() else {
            continue;
        };
        positioned.draw(|gx, gy, v| {
            let px = gx as i32 + bb.min.x;
            let py = gy as i32 + bb.min.y;
            if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height || v <= 0.0 {
                return;
            }
            blend(img.get_pixel_mut(px as u32, py as u32), color, v);
        });
    }
}

fn line_width(face: &FontFace, text: &str, size: f32) -> f32 {
    face.shape(text, size).width
}

fn draw_centered(
    img: &mut RgbImage,
    face: &FontFace,
    text: &str,
    size: f32,
    baseline: f32,
    color: Rgb<u8>,
) {
    let x = (img.width() as f32 - line_width(face, text, size)) / 2.0;
    draw_line(img, face, text, size, x, baseline, color);
}

fn body_color(plan: &SlidePlan, colors: &PaletteColors) -> Rgb<u8> {
    match plan.kind {
        SlideKind::Arabic => colors.arabic,
        SlideKind::CallToAction => colors.heading,
        SlideKind::Translation | SlideKind::Commentary => colors.text,
    }
}

/// Wrapped body text, vertically centred in the text area.
fn draw_body(
    img: &mut RgbImage,
    fonts: &FontSet,
    layout: &LayoutConfig,
    plan: &SlidePlan,
    color: Rgb<u8>,
) {
    let face = fonts.face(plan.role);
    let style = &plan.style;
    let lines = wrap_lines(fonts, plan.role, &plan.body, style.size, style.max_width as f32);

    let advance = style.line_advance();
    let block = lines.len() as f32 * advance;
    let area = layout.text_bottom() - layout.text_top();
    let top = layout.text_top() + ((area - block) / 2.0).max(0.0);

    let canvas = layout.width as f32;
    let left = (canvas - style.max_width as f32) / 2.0;
    let right = (canvas + style.max_width as f32) / 2.0;
    // Centre the glyphs inside each line's band.
    let ascent = face.ascent(style.size);
    let lead = (advance - style.size) / 2.0;

    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let baseline = top + i as f32 * advance + lead + ascent;
        let x = match plan.align {
            Align::Left => left,
            Align::Right => right - line_width(face, line, style.size),
            Align::Center => (canvas - line_width(face, line, style.size)) / 2.0,
        };
        draw_line(img, face, line, style.size, x, baseline, color);
    }
}

/// Render one planned slide.
pub fn render_slide(
    fonts: &FontSet,
    layout: &LayoutConfig,
    plan: &SlidePlan,
    colors: &PaletteColors,
    seed: u64,
) -> RgbImage {
    let mut img = gradient(layout.width, layout.height, colors.bg_top, colors.bg_bottom);
    add_grain(&mut img, layout.grain_intensity, layout.grain_noise, seed);

    let bold = fonts.face(FontRole::LatinBold);
    let regular = fonts.face(FontRole::Latin);

    if let Some(heading) = &plan.heading {
        let baseline = layout.heading_y as f32 + bold.ascent(layout.heading_size);
        draw_centered(&mut img, bold, heading, layout.heading_size, baseline, colors.heading);
    }

    draw_body(&mut img, fonts, layout, plan, body_color(plan, colors));

    if let Some(footer) = &plan.footer {
        let baseline = layout.reference_y as f32 + regular.ascent(layout.reference_size);
        draw_centered(&mut img, regular, footer, layout.reference_size, baseline, colors.source);
    }

    if !layout.watermark.is_empty() {
        let baseline = layout.watermark_y as f32 + regular.ascent(layout.watermark_size);
        draw_centered(
            &mut img,
            regular,
            &layout.watermark,
            layout.watermark_size,
            baseline,
            colors.source,
        );
    }

    if plan.swipe_hint {
        let padding = 50.0;
        let width = line_width(bold, &layout.swipe_hint, layout.hint_size);
        let x = layout.width as f32 - width - padding;
        let baseline = layout.height as f32 - padding;
        draw_line(&mut img, bold, &layout.swipe_hint, layout.hint_size, x, baseline, colors.accent);
    }

    img
}

/// The first slide with an outlined label near the bottom, for story sharing.
pub fn render_story(fonts: &FontSet, layout: &LayoutConfig, first: &RgbImage) -> RgbImage {
    let mut img = first.clone();
    let face = fonts.face(FontRole::LatinBold);
    let size = layout.story_label_size;
    let text = &layout.story_label;

    let x = (img.width() as f32 - line_width(face, text, size)) / 2.0;
    let baseline = img.height() as f32 - 200.0;
    let outline = Rgb([0, 0, 0]);

    for (dx, dy) in [
        (-2.0, -2.0),
        (0.0, -2.0),
        (2.0, -2.0),
        (-2.0, 0.0),
        (2.0, 0.0),
        (-2.0, 2.0),
        (0.0, 2.0),
        (2.0, 2.0),
    ] {
        draw_line(&mut img, face, text, size, x + dx, baseline + dy, outline);
    }
    draw_line(&mut img, face, text, size, x, baseline, Rgb([255, 255, 255]));

    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        let img = gradient(4, 11, Rgb([0, 0, 0]), Rgb([200, 100, 50]));

        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(3, 10), &Rgb([200, 100, 50]));
        assert_eq!(img.get_pixel(2, 5), &Rgb([100, 50, 25]));
    }

    #[test]
    fn test_gradient_single_row() {
        let img = gradient(2, 1, Rgb([10, 20, 30]), Rgb([40, 50, 60]));
        assert_eq!(img.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_grain_disabled_is_noop() {
        let mut img = gradient(8, 8, Rgb([10, 20, 30]), Rgb([10, 20, 30]));
        let before = img.clone();
        add_grain(&mut img, 0.0, 40.0, 7);
        assert_eq!(img, before);
    }

    #[test]
    fn test_grain_is_seeded() {
        let base = gradient(16, 16, Rgb([0, 80, 90]), Rgb([20, 120, 140]));

        let mut a = base.clone();
        let mut b = base.clone();
        add_grain(&mut a, 0.3, 40.0, 42);
        add_grain(&mut b, 0.3, 40.0, 42);

        assert_eq!(a, b);
        assert_ne!(a, base);
    }

    #[test]
    fn test_blend_coverage() {
        let mut px = Rgb([0, 0, 0]);
        blend(&mut px, Rgb([255, 255, 255]), 1.0);
        assert_eq!(px, Rgb([255, 255, 255]));

        let mut px = Rgb([0, 100, 200]);
        blend(&mut px, Rgb([200, 100, 0]), 0.5);
        assert_eq!(px, Rgb([100, 100, 100]));
    }
}
