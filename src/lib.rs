//! lumafx library crate.
//!
//! Video-to-character-art conversion and pointer-driven video effects:
//! an ASCII/braille frame pipeline ([`engine::AsciiEngine`]), radial and
//! letterform video masks ([`mask`]), and a seeded procedural intro
//! animation ([`animator::PhaseAnimator`]), all rendering to plain RGBA
//! buffers the host can present however it likes.

pub mod animator;
pub mod config;
pub mod dither;
pub mod engine;
pub mod glyph;
pub mod mask;
pub mod media;
pub mod pixel;
pub mod raster;
