use crate::canvas::model::{Color, Point};
use crate::canvas::raster;
use ab_glyph::{point, Font, FontArc, FontRef, FontVec, GlyphId, ScaleFont};
use eframe::egui;
use image::RgbaImage;
use once_cell::sync::Lazy;
use std::borrow::Cow;

static DEFAULT_FONT: Lazy<Option<FontArc>> = Lazy::new(load_default_font);

/// The proportional font egui ships with, shared by every surface.
pub fn default_font() -> Option<&'static FontArc> {
    DEFAULT_FONT.as_ref()
}

fn load_default_font() -> Option<FontArc> {
    let definitions = egui::FontDefinitions::default();
    let family = definitions.families.get(&egui::FontFamily::Proportional)?;
    let name = family.first()?;
    let data = definitions.font_data.get(name)?;
    let font = match data.font.clone() {
        Cow::Borrowed(bytes) => FontRef::try_from_slice_and_index(bytes, data.index)
            .map(FontArc::from)
            .ok(),
        Cow::Owned(bytes) => FontVec::try_from_vec_and_index(bytes, data.index)
            .map(FontArc::from)
            .ok(),
    };
    if font.is_none() {
        tracing::error!(font = %name, "failed to parse bundled font");
    }
    font
}

/// Rasterizes a single line of text with its baseline starting at `baseline`.
pub fn draw_text(
    img: &mut RgbaImage,
    font: &FontArc,
    baseline: Point,
    text: &str,
    size: f32,
    color: Color,
) -> bool {
    if text.is_empty() || size <= 0.0 {
        return false;
    }
    let scaled = font.as_scaled(size);
    let mut caret = point(baseline.x, baseline.y);
    let mut previous: Option<GlyphId> = None;
    let mut drawn = false;

    for ch in text.chars() {
        let mut glyph = scaled.scaled_glyph(ch);
        if let Some(prev) = previous {
            caret.x += scaled.kern(prev, glyph.id);
        }
        glyph.position = caret;
        caret.x += scaled.h_advance(glyph.id);
        previous = Some(glyph.id);

        if let Some(outlined) = scaled.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|x, y, coverage| {
                let px = x as i32 + bounds.min.x as i32;
                let py = y as i32 + bounds.min.y as i32;
                raster::blend_coverage(img, px, py, color, coverage);
            });
            drawn = true;
        }
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_font_is_available() {
        assert!(default_font().is_some());
    }

    #[test]
    fn text_lands_above_the_baseline() {
        let font = default_font().expect("font");
        let mut img = RgbaImage::new(200, 80);
        let drawn = draw_text(
            &mut img,
            font,
            Point::new(10.0, 60.0),
            "Hello",
            32.0,
            Color::rgb(200, 0, 0),
        );
        assert!(drawn);

        let rows_with_ink: Vec<u32> = (0..img.height())
            .filter(|&y| (0..img.width()).any(|x| img.get_pixel(x, y).0[3] > 0))
            .collect();
        assert!(!rows_with_ink.is_empty());
        assert!(rows_with_ink.iter().all(|&y| y <= 62));
        assert!(rows_with_ink.iter().any(|&y| y < 50));
    }

    #[test]
    fn whitespace_draws_nothing() {
        let font = default_font().expect("font");
        let mut img = RgbaImage::new(50, 50);
        assert!(!draw_text(&mut img, font, Point::new(5.0, 40.0), "   ", 20.0, Color::BLACK));
        assert!(!draw_text(&mut img, font, Point::new(5.0, 40.0), "", 20.0, Color::BLACK));
        assert!(img.pixels().all(|p| p.0[3] == 0));
    }
}
