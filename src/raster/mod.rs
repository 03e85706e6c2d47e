//! Software raster surface for overlay effects.
//!
//! [`Raster`] wraps a [`PixelBuffer`] and adds the drawing primitives the
//! pointer masks and the intro animation need: solid and soft-edged circles,
//! stroked and dashed polylines, and source-over pixel blending. Everything
//! is plain CPU pixel pushing over straight (non-premultiplied) alpha; the
//! host decides how to present the result.

pub mod font;

use crate::pixel::{PixelBuffer, Rgba};

/// Source-over blend of one channel against an opaque destination.
///
/// Uses the `(x + 1 + (x >> 8)) >> 8` approximation of `x / 255`.
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let mixed = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((mixed + 1 + (mixed >> 8)) >> 8) as u8
}

/// A CPU drawing surface backed by a [`PixelBuffer`].
///
/// Freshly created and cleared surfaces are fully transparent, so masks
/// composed here can be layered over arbitrary backgrounds by the host.
#[derive(Debug, Clone)]
pub struct Raster {
    buffer: PixelBuffer,
}

impl Raster {
    /// Create a transparent surface of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Raster {
            buffer: PixelBuffer::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    pub fn height(&self) -> u32 {
        self.buffer.height
    }

    /// Borrow the backing pixels.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Consume the surface, yielding the backing pixels.
    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.buffer.data.fill(0);
    }

    /// Flood the whole surface with one color.
    pub fn fill(&mut self, color: Rgba) {
        for px in self.buffer.data.chunks_exact_mut(4) {
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
            px[3] = color.a;
        }
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.buffer.width && (y as u32) < self.buffer.height
    }

    /// Overwrite one pixel; out-of-bounds writes are ignored.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, color: Rgba) {
        if self.in_bounds(x, y) {
            self.buffer.put(x as u32, y as u32, color);
        }
    }

    /// Read one pixel; out-of-bounds reads yield transparent black.
    #[inline]
    pub fn pixel_at(&self, x: i32, y: i32) -> Rgba {
        self.buffer.pixel_at(x as i64, y as i64)
    }

    /// Source-over blend one pixel onto the surface.
    ///
    /// Handles transparent destinations correctly, so semi-transparent
    /// strokes over a cleared surface keep their own alpha instead of
    /// darkening toward black.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if color.a == 0 || !self.in_bounds(x, y) {
            return;
        }
        let dst = self.buffer.pixel_at(x as i64, y as i64);
        if color.a == 255 || dst.a == 0 {
            self.buffer.put(x as u32, y as u32, color);
            return;
        }
        if dst.a == 255 {
            // Opaque destination: per-channel source-over, alpha stays 255
            let a = color.a as u16;
            let out = Rgba::new(
                blend_channel(color.r, dst.r, a),
                blend_channel(color.g, dst.g, a),
                blend_channel(color.b, dst.b, a),
                255,
            );
            self.buffer.put(x as u32, y as u32, out);
            return;
        }
        // General straight-alpha source-over
        let sa = color.a as u32;
        let da = dst.a as u32;
        let out_a = sa * 255 + da * (255 - sa); // scaled by 255
        let ch = |s: u8, d: u8| -> u8 {
            let num = s as u32 * sa * 255 + d as u32 * da * (255 - sa);
            (num / out_a) as u8
        };
        let out = Rgba::new(
            ch(color.r, dst.r),
            ch(color.g, dst.g),
            ch(color.b, dst.b),
            (out_a / 255) as u8,
        );
        self.buffer.put(x as u32, y as u32, out);
    }

    /// Horizontal span, clipped to the surface.
    fn hspan(&mut self, x1: i32, x2: i32, y: i32, color: Rgba) {
        if y < 0 || y as u32 >= self.buffer.height {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.buffer.width as i32 - 1);
        for x in start..=end {
            if color.a == 255 {
                self.buffer.put(x as u32, y as u32, color);
            } else {
                self.blend_pixel(x, y, color);
            }
        }
    }

    /// Fill a hard-edged circle using midpoint spans.
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgba) {
        if radius <= 0 {
            if radius == 0 {
                self.blend_pixel(cx, cy, color);
            }
            return;
        }
        let mut x = radius;
        let mut y = 0;
        let mut err = 1 - radius;
        while x >= y {
            self.hspan(cx - x, cx + x, cy + y, color);
            if y != 0 {
                self.hspan(cx - x, cx + x, cy - y, color);
            }
            if x != y {
                self.hspan(cx - y, cx + y, cy + x, color);
                if y != 0 {
                    self.hspan(cx - y, cx + y, cy - x, color);
                }
            }
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    /// Fill a soft-edged circle: solid out to `inner`, then a linear alpha
    /// fade reaching zero at `outer`.
    ///
    /// Subpixel centers are honored, which keeps slowly moving dots from
    /// snapping between pixel positions.
    pub fn fill_circle_soft(&mut self, cx: f32, cy: f32, inner: f32, outer: f32, color: Rgba) {
        if outer <= 0.0 {
            return;
        }
        let inner = inner.clamp(0.0, outer);
        let x0 = (cx - outer).floor() as i32;
        let x1 = (cx + outer).ceil() as i32;
        let y0 = (cy - outer).floor() as i32;
        let y1 = (cy + outer).ceil() as i32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                let coverage = if dist <= inner {
                    1.0
                } else if dist < outer {
                    (outer - dist) / (outer - inner).max(f32::EPSILON)
                } else {
                    continue;
                };
                let a = (color.a as f32 * coverage).round() as u8;
                self.blend_pixel(x, y, Rgba::new(color.r, color.g, color.b, a));
            }
        }
    }

    /// Stroke a polyline with round joints.
    pub fn stroke_polyline(&mut self, points: &[(f32, f32)], width: f32, color: Rgba) {
        self.stroke_path(points, width, None, color);
    }

    /// Stroke a dashed polyline.
    ///
    /// # Arguments
    /// * `dash` / `gap` - on/off run lengths in pixels along the path
    /// * `phase` - distance offset into the dash pattern; animating it
    ///   makes the dashes appear to travel along the line
    pub fn stroke_dashed(
        &mut self,
        points: &[(f32, f32)],
        width: f32,
        dash: f32,
        gap: f32,
        phase: f32,
        color: Rgba,
    ) {
        if dash <= 0.0 {
            return;
        }
        self.stroke_path(points, width, Some((dash, gap.max(0.0), phase)), color);
    }

    /// Walk the polyline at roughly one-pixel steps, stamping each sample.
    ///
    /// Distance accumulates across segments so dash patterns continue
    /// seamlessly through joints.
    fn stroke_path(
        &mut self,
        points: &[(f32, f32)],
        width: f32,
        dashing: Option<(f32, f32, f32)>,
        color: Rgba,
    ) {
        if points.len() < 2 {
            return;
        }
        let radius = (width / 2.0).max(0.5);
        let mut traveled = 0.0f32;
        for pair in points.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            let seg_len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
            if seg_len < f32::EPSILON {
                continue;
            }
            let steps = seg_len.ceil() as u32;
            for i in 0..=steps {
                let t = i as f32 / steps as f32;
                let dist = traveled + seg_len * t;
                if let Some((dash, gap, phase)) = dashing {
                    let period = dash + gap;
                    let pos = (dist + phase).rem_euclid(period);
                    if pos >= dash {
                        continue;
                    }
                }
                let px = x0 + (x1 - x0) * t;
                let py = y0 + (y1 - y0) * t;
                if radius <= 0.75 {
                    self.blend_pixel(px.round() as i32, py.round() as i32, color);
                } else {
                    self.fill_circle(
                        px.round() as i32,
                        py.round() as i32,
                        radius.round() as i32,
                        color,
                    );
                }
            }
            traveled += seg_len;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_is_transparent() {
        let raster = Raster::new(4, 4);
        assert_eq!(raster.pixel_at(0, 0), Rgba::TRANSPARENT);
        assert_eq!(raster.pixel_at(3, 3), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_clear_resets_after_fill() {
        let mut raster = Raster::new(2, 2);
        raster.fill(Rgba::WHITE);
        assert_eq!(raster.pixel_at(1, 1), Rgba::WHITE);
        raster.clear();
        assert_eq!(raster.pixel_at(1, 1), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_put_ignores_out_of_bounds() {
        let mut raster = Raster::new(2, 2);
        raster.put(-1, 0, Rgba::WHITE);
        raster.put(0, -1, Rgba::WHITE);
        raster.put(2, 0, Rgba::WHITE);
        raster.put(0, 2, Rgba::WHITE);
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(raster.pixel_at(x, y), Rgba::TRANSPARENT);
            }
        }
    }

    #[test]
    fn test_blend_opaque_overwrites() {
        let mut raster = Raster::new(1, 1);
        raster.put(0, 0, Rgba::rgb(10, 20, 30));
        raster.blend_pixel(0, 0, Rgba::WHITE);
        assert_eq!(raster.pixel_at(0, 0), Rgba::WHITE);
    }

    #[test]
    fn test_blend_half_over_opaque_black_is_mid_gray() {
        let mut raster = Raster::new(1, 1);
        raster.put(0, 0, Rgba::BLACK);
        raster.blend_pixel(0, 0, Rgba::new(255, 255, 255, 128));
        let out = raster.pixel_at(0, 0);
        assert_eq!(out.a, 255);
        assert!((out.r as i32 - 128).abs() <= 1, "got {}", out.r);
    }

    #[test]
    fn test_blend_onto_transparent_keeps_source_alpha() {
        let mut raster = Raster::new(1, 1);
        raster.blend_pixel(0, 0, Rgba::new(200, 100, 50, 80));
        assert_eq!(raster.pixel_at(0, 0), Rgba::new(200, 100, 50, 80));
    }

    #[test]
    fn test_blend_zero_alpha_is_noop() {
        let mut raster = Raster::new(1, 1);
        raster.put(0, 0, Rgba::rgb(1, 2, 3));
        raster.blend_pixel(0, 0, Rgba::new(255, 255, 255, 0));
        assert_eq!(raster.pixel_at(0, 0), Rgba::rgb(1, 2, 3));
    }

    #[test]
    fn test_fill_circle_covers_center_not_corners() {
        let mut raster = Raster::new(21, 21);
        raster.fill_circle(10, 10, 5, Rgba::WHITE);
        assert_eq!(raster.pixel_at(10, 10), Rgba::WHITE);
        assert_eq!(raster.pixel_at(15, 10), Rgba::WHITE);
        assert_eq!(raster.pixel_at(0, 0), Rgba::TRANSPARENT);
        assert_eq!(raster.pixel_at(17, 17), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_fill_circle_clips_at_edges() {
        let mut raster = Raster::new(4, 4);
        // Center far outside; the surface edge must survive untouched panic-free
        raster.fill_circle(-10, -10, 5, Rgba::WHITE);
        assert_eq!(raster.pixel_at(0, 0), Rgba::TRANSPARENT);
        raster.fill_circle(2, 2, 100, Rgba::WHITE);
        assert_eq!(raster.pixel_at(0, 0), Rgba::WHITE);
    }

    #[test]
    fn test_soft_circle_fades_toward_edge() {
        let mut raster = Raster::new(41, 41);
        raster.fill_circle_soft(20.5, 20.5, 5.0, 15.0, Rgba::WHITE);
        let center = raster.pixel_at(20, 20);
        let mid = raster.pixel_at(30, 20); // dist 10, inside the fade band
        let outside = raster.pixel_at(39, 20); // dist ~19, past outer
        assert_eq!(center.a, 255);
        assert!(mid.a > 0 && mid.a < 255, "fade band alpha {}", mid.a);
        assert_eq!(outside.a, 0);
    }

    #[test]
    fn test_polyline_draws_between_points() {
        let mut raster = Raster::new(20, 5);
        raster.stroke_polyline(&[(1.0, 2.0), (18.0, 2.0)], 1.0, Rgba::WHITE);
        assert_eq!(raster.pixel_at(10, 2), Rgba::WHITE);
        assert_eq!(raster.pixel_at(10, 0), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_dashed_stroke_leaves_gaps() {
        let mut raster = Raster::new(40, 3);
        raster.stroke_dashed(&[(0.0, 1.0), (39.0, 1.0)], 1.0, 4.0, 4.0, 0.0, Rgba::WHITE);
        let lit: usize = (0..40)
            .filter(|&x| raster.pixel_at(x, 1) != Rgba::TRANSPARENT)
            .count();
        assert!(lit > 5, "dashes should draw some pixels, got {lit}");
        assert!(lit < 38, "dashes should leave gaps, got {lit}");
    }

    #[test]
    fn test_dash_phase_shifts_pattern() {
        let mut a = Raster::new(40, 1);
        let mut b = Raster::new(40, 1);
        a.stroke_dashed(&[(0.0, 0.0), (39.0, 0.0)], 1.0, 4.0, 4.0, 0.0, Rgba::WHITE);
        b.stroke_dashed(&[(0.0, 0.0), (39.0, 0.0)], 1.0, 4.0, 4.0, 4.0, Rgba::WHITE);
        let row = |r: &Raster| -> Vec<bool> {
            (0..40).map(|x| r.pixel_at(x, 0) != Rgba::TRANSPARENT).collect()
        };
        assert_ne!(row(&a), row(&b));
    }

    #[test]
    fn test_degenerate_polyline_is_noop() {
        let mut raster = Raster::new(4, 4);
        raster.stroke_polyline(&[(1.0, 1.0)], 1.0, Rgba::WHITE);
        raster.stroke_polyline(&[], 1.0, Rgba::WHITE);
        assert_eq!(raster.pixel_at(1, 1), Rgba::TRANSPARENT);
    }
}
