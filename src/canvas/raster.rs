use crate::canvas::model::{Color, Point, StrokeMode};
use image::{Rgba, RgbaImage};

/// Integer pixel rectangle used to bound a rasterization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Float coordinates are pinned to this range before becoming pixel indices.
const COORD_LIMIT: f32 = (i32::MAX / 4) as f32;

impl PixelBounds {
    pub fn from_points(a: Point, b: Point, pad: f32) -> Self {
        let to_px = |v: f32| v.clamp(-COORD_LIMIT, COORD_LIMIT) as i32;
        let min_x = to_px((a.x.min(b.x) - pad).floor());
        let max_x = to_px((a.x.max(b.x) + pad).ceil());
        let min_y = to_px((a.y.min(b.y) - pad).floor());
        let max_y = to_px((a.y.max(b.y) + pad).ceil());
        Self {
            x: min_x,
            y: min_y,
            width: max_x.saturating_sub(min_x).saturating_add(1).max(1),
            height: max_y.saturating_sub(min_y).saturating_add(1).max(1),
        }
    }

    /// Intersects with the `width`x`height` image, `None` when nothing is left.
    pub fn clamp(self, width: u32, height: u32) -> Option<PixelBounds> {
        let max_w = i32::try_from(width).unwrap_or(i32::MAX);
        let max_h = i32::try_from(height).unwrap_or(i32::MAX);
        let x0 = self.x.clamp(0, max_w);
        let y0 = self.y.clamp(0, max_h);
        let x1 = self.x.saturating_add(self.width).clamp(0, max_w);
        let y1 = self.y.saturating_add(self.height).clamp(0, max_h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelBounds {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    fn pixels(self) -> impl Iterator<Item = (u32, u32)> {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| (x as u32, y as u32)))
    }
}

/// Source-over blend of `top` onto `bottom`, both unpremultiplied.
pub fn blend_pixel(bottom: Color, top: Color) -> Color {
    if top.a == 255 {
        return top;
    }
    if top.a == 0 {
        return bottom;
    }

    let sa = top.a as f32 / 255.0;
    let da = bottom.a as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a <= f32::EPSILON {
        return Color::TRANSPARENT;
    }

    let blend = |s: u8, d: u8| -> u8 {
        (((s as f32 * sa) + (d as f32 * da * (1.0 - sa))) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    Color::rgba(
        blend(top.r, bottom.r),
        blend(top.g, bottom.g),
        blend(top.b, bottom.b),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}

pub fn get_pixel(img: &RgbaImage, x: u32, y: u32) -> Color {
    Color::from_rgba_array(img.get_pixel(x, y).0)
}

fn apply(img: &mut RgbaImage, x: u32, y: u32, color: Color, mode: StrokeMode) {
    let next = match mode {
        StrokeMode::Normal => blend_pixel(get_pixel(img, x, y), color),
        StrokeMode::Erase => Color::TRANSPARENT,
    };
    img.put_pixel(x, y, Rgba(next.to_rgba_array()));
}

/// Fills `img` entirely with `color`, replacing whatever was there.
pub fn fill(img: &mut RgbaImage, color: Color) {
    let px = color.to_rgba_array();
    for chunk in img.chunks_exact_mut(4) {
        chunk.copy_from_slice(&px);
    }
}

/// Source-over composition of `top` onto `base`. Both must share dimensions.
pub fn blend_image(base: &mut RgbaImage, top: &RgbaImage) {
    debug_assert_eq!(base.dimensions(), top.dimensions());
    for (dst, src) in base.chunks_exact_mut(4).zip(top.chunks_exact(4)) {
        if src[3] == 0 {
            continue;
        }
        let blended = blend_pixel(
            Color::rgba(dst[0], dst[1], dst[2], dst[3]),
            Color::rgba(src[0], src[1], src[2], src[3]),
        );
        dst.copy_from_slice(&blended.to_rgba_array());
    }
}

/// Every pixel within `width / 2` of the segment `from -> to` (round caps).
///
/// A zero-length segment produces a disc, which is how taps become dots.
pub fn stroke_segment(
    img: &mut RgbaImage,
    from: Point,
    to: Point,
    color: Color,
    width: f32,
    mode: StrokeMode,
) -> Option<PixelBounds> {
    let radius = (width * 0.5).max(0.5);
    let bounds = PixelBounds::from_points(from, to, radius + 1.0).clamp(img.width(), img.height())?;
    let radius_sq = radius * radius;
    for (x, y) in bounds.pixels() {
        if point_segment_distance_sq(Point::new(x as f32, y as f32), from, to) <= radius_sq {
            apply(img, x, y, color, mode);
        }
    }
    Some(bounds)
}

/// Outline of the axis-aligned rectangle spanned by two opposite corners.
pub fn stroke_rect(
    img: &mut RgbaImage,
    corner_a: Point,
    corner_b: Point,
    color: Color,
    width: f32,
) -> Option<PixelBounds> {
    let x0 = corner_a.x.min(corner_b.x);
    let x1 = corner_a.x.max(corner_b.x);
    let y0 = corner_a.y.min(corner_b.y);
    let y1 = corner_a.y.max(corner_b.y);
    let corners = [
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
    ];

    // Each pixel is painted once even where edges overlap at the corners, so a
    // translucent color does not double up.
    let radius = (width * 0.5).max(0.5);
    let radius_sq = radius * radius;
    let bounds = PixelBounds::from_points(corners[0], corners[2], radius + 1.0)
        .clamp(img.width(), img.height())?;
    for (x, y) in bounds.pixels() {
        let p = Point::new(x as f32, y as f32);
        let hit = (0..4).any(|i| {
            point_segment_distance_sq(p, corners[i], corners[(i + 1) % 4]) <= radius_sq
        });
        if hit {
            apply(img, x, y, color, StrokeMode::Normal);
        }
    }
    Some(bounds)
}

/// Circle outline: pixels whose distance to `center` is within `width / 2` of `radius`.
pub fn stroke_circle(
    img: &mut RgbaImage,
    center: Point,
    radius: f32,
    color: Color,
    width: f32,
) -> Option<PixelBounds> {
    let half = (width * 0.5).max(0.5);
    let reach = radius + half + 1.0;
    let bounds = PixelBounds::from_points(center, center, reach).clamp(img.width(), img.height())?;
    for (x, y) in bounds.pixels() {
        let d = Point::new(x as f32, y as f32).distance(center);
        if (d - radius).abs() <= half {
            apply(img, x, y, color, StrokeMode::Normal);
        }
    }
    Some(bounds)
}

/// Filled disc of the given diameter with no outline.
pub fn fill_disc(
    img: &mut RgbaImage,
    center: Point,
    diameter: f32,
    color: Color,
) -> Option<PixelBounds> {
    stroke_segment(img, center, center, color, diameter, StrokeMode::Normal)
}

/// Blends `color` at `coverage` (0..=1) into a single pixel, ignoring out-of-range coordinates.
pub fn blend_coverage(img: &mut RgbaImage, x: i32, y: i32, color: Color, coverage: f32) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let alpha = (color.a as f32 * coverage.clamp(0.0, 1.0))
        .round()
        .clamp(0.0, 255.0) as u8;
    if alpha == 0 {
        return;
    }
    let top = Color::rgba(color.r, color.g, color.b, alpha);
    apply(img, x as u32, y as u32, top, StrokeMode::Normal);
}

pub fn point_segment_distance_sq(point: Point, start: Point, end: Point) -> f32 {
    let vx = end.x - start.x;
    let vy = end.y - start.y;
    let wx = point.x - start.x;
    let wy = point.y - start.y;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        return wx * wx + wy * wy;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let dx = point.x - (start.x + vx * t);
    let dy = point.y - (start.y + vy * t);
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(width: u32, height: u32) -> RgbaImage {
        RgbaImage::new(width, height)
    }

    fn opaque_count(img: &RgbaImage) -> usize {
        img.pixels().filter(|p| p.0[3] > 0).count()
    }

    #[test]
    fn blend_half_transparent_red_over_grey() {
        let out = blend_pixel(Color::rgb(100, 100, 100), Color::rgba(200, 0, 0, 128));
        assert_eq!(out, Color::rgba(150, 50, 50, 255));
    }

    #[test]
    fn blend_onto_transparent_keeps_source_color() {
        let out = blend_pixel(Color::TRANSPARENT, Color::rgba(10, 20, 30, 128));
        assert_eq!(out, Color::rgba(10, 20, 30, 128));
    }

    #[test]
    fn zero_length_segment_draws_a_disc() {
        let mut img = blank(32, 32);
        stroke_segment(
            &mut img,
            Point::new(16.0, 16.0),
            Point::new(16.0, 16.0),
            Color::BLACK,
            10.0,
            StrokeMode::Normal,
        );
        assert_eq!(get_pixel(&img, 16, 16), Color::BLACK);
        assert_eq!(get_pixel(&img, 21, 16), Color::BLACK);
        assert_eq!(get_pixel(&img, 22, 16), Color::TRANSPARENT);
        assert_eq!(get_pixel(&img, 20, 20), Color::TRANSPARENT);
    }

    #[test]
    fn capsule_covers_the_whole_segment_without_gaps() {
        let mut img = blank(64, 16);
        stroke_segment(
            &mut img,
            Point::new(4.0, 8.0),
            Point::new(60.0, 8.0),
            Color::BLACK,
            3.0,
            StrokeMode::Normal,
        );
        for x in 4..=60 {
            assert_eq!(get_pixel(&img, x, 8), Color::BLACK, "gap at x={x}");
        }
    }

    #[test]
    fn erase_zeroes_alpha_inside_the_stroke_only() {
        let mut img = blank(20, 20);
        fill(&mut img, Color::rgb(9, 9, 9));
        stroke_segment(
            &mut img,
            Point::new(10.0, 10.0),
            Point::new(10.0, 10.0),
            Color::rgb(255, 0, 0),
            4.0,
            StrokeMode::Erase,
        );
        assert_eq!(get_pixel(&img, 10, 10), Color::TRANSPARENT);
        assert_eq!(get_pixel(&img, 0, 0), Color::rgb(9, 9, 9));
    }

    #[test]
    fn offscreen_strokes_are_clipped() {
        let mut img = blank(10, 10);
        let bounds = stroke_segment(
            &mut img,
            Point::new(-50.0, -50.0),
            Point::new(-40.0, -40.0),
            Color::BLACK,
            4.0,
            StrokeMode::Normal,
        );
        assert!(bounds.is_none());
        assert_eq!(opaque_count(&img), 0);

        stroke_segment(
            &mut img,
            Point::new(-5.0, 5.0),
            Point::new(15.0, 5.0),
            Color::BLACK,
            1.0,
            StrokeMode::Normal,
        );
        assert_eq!(opaque_count(&img), 10);
    }

    #[test]
    fn rect_outline_leaves_interior_empty() {
        let mut img = blank(40, 40);
        stroke_rect(
            &mut img,
            Point::new(5.0, 5.0),
            Point::new(30.0, 25.0),
            Color::BLACK,
            2.0,
        );
        assert_eq!(get_pixel(&img, 5, 5), Color::BLACK);
        assert_eq!(get_pixel(&img, 30, 25), Color::BLACK);
        assert_eq!(get_pixel(&img, 17, 5), Color::BLACK);
        assert_eq!(get_pixel(&img, 17, 15), Color::TRANSPARENT);
    }

    #[test]
    fn translucent_rect_corners_are_painted_once() {
        let mut img = blank(40, 40);
        let color = Color::rgba(0, 0, 255, 100);
        stroke_rect(&mut img, Point::new(5.0, 5.0), Point::new(30.0, 25.0), color, 2.0);
        assert_eq!(get_pixel(&img, 5, 5), color);
        assert_eq!(get_pixel(&img, 17, 5), color);
    }

    #[test]
    fn circle_outline_is_a_ring() {
        let mut img = blank(64, 64);
        stroke_circle(&mut img, Point::new(32.0, 32.0), 20.0, Color::BLACK, 2.0);
        assert_eq!(get_pixel(&img, 52, 32), Color::BLACK);
        assert_eq!(get_pixel(&img, 32, 12), Color::BLACK);
        assert_eq!(get_pixel(&img, 32, 32), Color::TRANSPARENT);
        assert_eq!(get_pixel(&img, 32, 56), Color::TRANSPARENT);
    }

    #[test]
    fn bounds_clamp_to_the_image() {
        let bounds = PixelBounds::from_points(Point::new(-1.0, -1.0), Point::new(9.0, 9.0), 1.0);
        assert_eq!((bounds.x, bounds.y), (-2, -2));
        assert_eq!((bounds.width, bounds.height), (13, 13));
        let clamped = bounds.clamp(5, 5).expect("overlaps");
        assert_eq!((clamped.x, clamped.y, clamped.width, clamped.height), (0, 0, 5, 5));
        assert!(bounds.clamp(0, 0).is_none());
    }

    #[test]
    fn extreme_coordinates_stay_in_range() {
        let far = PixelBounds::from_points(
            Point::new(f32::MIN, f32::MIN),
            Point::new(f32::MAX, f32::MAX),
            4.0,
        );
        assert!(far.width > 0 && far.height > 0);
        let clamped = far.clamp(8, 8).expect("spans the image");
        assert_eq!((clamped.width, clamped.height), (8, 8));

        let mut img = blank(16, 16);
        let painted = stroke_segment(
            &mut img,
            Point::new(f32::MAX, 8.0),
            Point::new(f32::MAX, 8.0),
            Color::BLACK,
            4.0,
            StrokeMode::Normal,
        );
        assert!(painted.is_none());
        assert!(img.pixels().all(|px| px.0[3] == 0));
    }
}
