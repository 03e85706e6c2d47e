//! Grid geometry for aspect-ratio-correct character rendering.

/// Default terminal character aspect ratio.
/// Terminal characters are typically ~2x taller than wide.
/// This is used to correct the aspect ratio when choosing row counts.
pub const DEFAULT_CHAR_ASPECT_RATIO: f32 = 2.0;

/// The resolved layout for one frame of character output.
///
/// `sample_width`/`sample_height` are the pixel dimensions the media frame
/// must be resampled to so that every encoder block maps to exactly one
/// grid cell; they are always whole multiples of the block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    /// Output width in character cells.
    pub cols: u32,
    /// Output height in character cells.
    pub rows: u32,
    /// Pixel width to resample the source frame to.
    pub sample_width: u32,
    /// Pixel height to resample the source frame to.
    pub sample_height: u32,
}

/// Calculate the character grid for a media frame at a fixed column count,
/// using the default character aspect ratio.
///
/// # Arguments
/// * `media_width` / `media_height` - intrinsic media dimensions in pixels
/// * `columns` - requested output width in character cells
/// * `block` - encoder block size in pixels per cell (width, height)
pub fn grid_geometry(
    media_width: u32,
    media_height: u32,
    columns: u32,
    block: (u32, u32),
) -> GridGeometry {
    grid_geometry_with_aspect(
        media_width,
        media_height,
        columns,
        block,
        DEFAULT_CHAR_ASPECT_RATIO,
    )
}

/// Calculate the character grid with a custom character aspect ratio.
///
/// The row count compensates for glyphs being `char_aspect` times taller
/// than wide: a square frame at aspect 2.0 gets half as many rows as
/// columns so it still displays square.
///
/// # Arguments
/// * `char_aspect` - glyph cell aspect ratio (height/width, typically ~2.0)
///
/// # Returns
/// A geometry with at least one row and one column; zero-sized media
/// falls back to a single row.
pub fn grid_geometry_with_aspect(
    media_width: u32,
    media_height: u32,
    columns: u32,
    block: (u32, u32),
    char_aspect: f32,
) -> GridGeometry {
    let cols = columns.max(1);
    let rows = if media_width == 0 || media_height == 0 {
        1
    } else {
        let media_aspect = media_height as f32 / media_width as f32;
        let aspect = if char_aspect > 0.0 {
            char_aspect
        } else {
            DEFAULT_CHAR_ASPECT_RATIO
        };
        ((cols as f32 * media_aspect / aspect).round() as u32).max(1)
    };
    let (block_w, block_h) = (block.0.max(1), block.1.max(1));
    GridGeometry {
        cols,
        rows,
        sample_width: cols * block_w,
        sample_height: rows * block_h,
    }
}
