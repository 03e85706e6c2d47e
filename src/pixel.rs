//! RGBA pixel buffers and Rec.709 luminance quantization.
//!
//! [`PixelBuffer`] is the frame currency of the crate: every pipeline stage
//! that produces pixels allocates a new buffer and hands it on, so stages
//! never mutate each other's data. Sampling outside the buffer is defined
//! (zero luminance, transparent black) rather than a panic.

/// A single RGBA color with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 255 }
    }

    /// Lowercase `#rrggbb` form, for inline HTML styling.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Compute Rec.709 luminance for an RGB triple, rounded to nearest.
///
/// The formula is: Y = 0.2126*R + 0.7152*G + 0.0722*B
///
/// Uses integer math in the hot path. Coefficients are scaled by 10000
/// (2126 + 7152 + 722 = 10000) and the +5000 bias rounds to nearest.
///
/// # Returns
/// Luminance in 0-255. Black maps to 0, white to 255.
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let y = 2126 * r as u32 + 7152 * g as u32 + 722 * b as u32;
    ((y + 5000) / 10000) as u8
}

/// An owned RGBA frame: row-major, top-left origin, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// RGBA bytes; `data.len() == width * height * 4`.
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a transparent-black buffer of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        PixelBuffer {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Wrap an existing RGBA byte vector.
    ///
    /// The caller guarantees `data.len() == width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width as usize) * (height as usize) * 4);
        PixelBuffer {
            width,
            height,
            data,
        }
    }

    /// Create a buffer by evaluating `f` at every pixel coordinate.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgba) -> Self {
        let mut buf = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                buf.put(x, y, f(x, y));
            }
        }
        buf
    }

    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }

    /// Read the pixel at `(x, y)`. Out-of-bounds reads yield transparent black.
    pub fn pixel_at(&self, x: i64, y: i64) -> Rgba {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return Rgba::TRANSPARENT;
        }
        let i = self.offset(x as u32, y as u32);
        Rgba::new(self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3])
    }

    /// Rec.709 luminance of the pixel at `(x, y)`.
    ///
    /// Coordinates outside the buffer read as zero luminance, so callers
    /// sampling past the edge (partial blocks, negative offsets) need no
    /// bounds checks of their own.
    pub fn luminance_at(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0;
        }
        let i = self.offset(x as u32, y as u32);
        luminance(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    /// Write the pixel at `(x, y)`; out-of-bounds writes are ignored.
    pub fn put(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        self.data[i] = color.r;
        self.data[i + 1] = color.g;
        self.data[i + 2] = color.b;
        self.data[i + 3] = color.a;
    }

    /// Compute the luminance plane into a reusable buffer.
    ///
    /// Avoids allocation when called repeatedly (e.g., each frame).
    ///
    /// # Returns
    /// The number of pixels written to the buffer.
    pub fn luminance_plane_into(&self, buffer: &mut Vec<u8>) -> usize {
        buffer.clear();
        buffer.reserve(self.pixel_count());
        for px in self.data.chunks_exact(4) {
            buffer.push(luminance(px[0], px[1], px[2]));
        }
        self.pixel_count()
    }

    /// Resample this buffer to new dimensions by area averaging.
    ///
    /// Each destination pixel averages all source pixels its cell covers
    /// (float cell bounds, widened to at least one source pixel), which
    /// doubles as the anti-aliasing step when shrinking video frames down
    /// to sampling resolution.
    pub fn resample(&self, width: u32, height: u32) -> PixelBuffer {
        if width == 0 || height == 0 || self.width == 0 || self.height == 0 {
            return PixelBuffer::new(width, height);
        }

        let cell_w = self.width as f32 / width as f32;
        let cell_h = self.height as f32 / height as f32;
        let mut out = PixelBuffer::new(width, height);

        for y in 0..height {
            for x in 0..width {
                let x0 = ((x as f32 * cell_w) as u32).min(self.width - 1);
                let y0 = ((y as f32 * cell_h) as u32).min(self.height - 1);
                // Cover at least one source pixel so upscaling never reads
                // an empty cell
                let x1 = (((x + 1) as f32 * cell_w) as u32).clamp(x0 + 1, self.width);
                let y1 = (((y + 1) as f32 * cell_h) as u32).clamp(y0 + 1, self.height);

                let mut sum = [0u64; 4];
                for py in y0..y1 {
                    let row = self.offset(x0, py);
                    for px in self.data[row..row + ((x1 - x0) as usize) * 4].chunks_exact(4) {
                        sum[0] += px[0] as u64;
                        sum[1] += px[1] as u64;
                        sum[2] += px[2] as u64;
                        sum[3] += px[3] as u64;
                    }
                }
                let count = ((x1 - x0) * (y1 - y0)) as u64;
                out.put(
                    x,
                    y,
                    Rgba::new(
                        (sum[0] / count) as u8,
                        (sum[1] / count) as u8,
                        (sum[2] / count) as u8,
                        (sum[3] / count) as u8,
                    ),
                );
            }
        }

        out
    }

    /// Average RGB color over a rectangular region, clipped to the buffer.
    ///
    /// Used for per-cell coloring of glyph output. An empty intersection
    /// yields opaque black.
    pub fn average_rgb(&self, x0: u32, y0: u32, w: u32, h: u32) -> Rgba {
        let x1 = (x0 + w).min(self.width);
        let y1 = (y0 + h).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return Rgba::BLACK;
        }
        let mut sum_r: u64 = 0;
        let mut sum_g: u64 = 0;
        let mut sum_b: u64 = 0;
        let mut count: u64 = 0;
        for y in y0..y1 {
            let row = self.offset(x0, y);
            for px in self.data[row..row + ((x1 - x0) as usize) * 4].chunks_exact(4) {
                sum_r += px[0] as u64;
                sum_g += px[1] as u64;
                sum_b += px[2] as u64;
                count += 1;
            }
        }
        Rgba::rgb(
            (sum_r / count) as u8,
            (sum_g / count) as u8,
            (sum_b / count) as u8,
        )
    }
}
