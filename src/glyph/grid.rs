//! Character grid output type.

use crate::pixel::Rgba;

/// A rectangular grid of glyphs, row-major with uniform row length.
///
/// The grid is the encoder's output currency: renderers turn it into
/// plain text, markup, or raster glyphs without re-touching pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharGrid {
    cols: usize,
    rows: usize,
    cells: Vec<char>,
}

impl CharGrid {
    /// Create an all-spaces grid.
    pub fn new(cols: usize, rows: usize) -> Self {
        CharGrid {
            cols,
            rows,
            cells: vec![' '; cols * rows],
        }
    }

    /// Wrap an existing cell vector.
    ///
    /// The caller guarantees `cells.len() == cols * rows`.
    pub fn from_cells(cols: usize, rows: usize, cells: Vec<char>) -> Self {
        debug_assert_eq!(cells.len(), cols * rows);
        CharGrid { cols, rows, cells }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cells(&self) -> &[char] {
        &self.cells
    }

    /// Read a cell; out-of-range coordinates yield a space.
    pub fn get(&self, col: usize, row: usize) -> char {
        if col >= self.cols || row >= self.rows {
            return ' ';
        }
        self.cells[row * self.cols + col]
    }

    pub fn set(&mut self, col: usize, row: usize, ch: char) {
        if col >= self.cols || row >= self.rows {
            return;
        }
        self.cells[row * self.cols + col] = ch;
    }

    /// Iterate rows as character slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[char]> {
        self.cells.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    /// Render as plain text, rows separated by `\n`.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.rows);
        for (i, row) in self.iter_rows().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.extend(row.iter());
        }
        out
    }

    /// Render as HTML-safe markup, rows separated by `\n`.
    ///
    /// `<`, `>` and `&` are escaped so ramps containing them stay inert
    /// inside a `<pre>` element. When `colors` holds one entry per cell,
    /// each glyph is wrapped in a `<span>` with an inline color style.
    pub fn to_html(&self, colors: Option<&[Rgba]>) -> String {
        let colors = colors.filter(|c| c.len() == self.cells.len());
        let mut out = String::with_capacity(self.cells.len() * 2);
        for row in 0..self.rows {
            if row > 0 {
                out.push('\n');
            }
            for col in 0..self.cols {
                let ch = self.cells[row * self.cols + col];
                match colors {
                    Some(colors) => {
                        let color = colors[row * self.cols + col];
                        out.push_str("<span style=\"color:");
                        out.push_str(&color.to_hex());
                        out.push_str("\">");
                        push_escaped(&mut out, ch);
                        out.push_str("</span>");
                    }
                    None => push_escaped(&mut out, ch),
                }
            }
        }
        out
    }
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '&' => out.push_str("&amp;"),
        _ => out.push(ch),
    }
}
