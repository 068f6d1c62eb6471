//! Font resolution and text measurement.
//!
//! Fonts are resolved through an ordered list of [FontSource]s; the first one
//! that loads wins. [FontSource::Builtin] always loads, so resolution can't fail.

use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use font8x8::legacy::BASIC_LEGACY;
use image::GrayImage;
use tracing::debug;

use super::layout::TextMeasure;
use crate::constants::SYSTEM_FONTS;
use crate::error::MemeError;

/// Glyph cells in the built-in bitmap face are 8x8.
const BITMAP_CELL: u32 = 8;

/// One way of getting hold of a caption font.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    /// A TrueType/OpenType file (or a face inside a collection)
    File {
        /// Path to the font file
        path: PathBuf,
        /// Face index inside a collection, `0` for plain font files
        index: u32,
    },
    /// The built-in 8x8 bitmap face
    Builtin,
}

impl FontSource {
    /// The default lookup order, with an optional user font first.
    pub fn cascade(user_font: Option<&Path>, user_index: u32) -> Vec<FontSource> {
        let mut sources = Vec::with_capacity(SYSTEM_FONTS.len() + 2);
        if let Some(path) = user_font {
            sources.push(FontSource::File {
                path: path.to_path_buf(),
                index: user_index,
            });
        }
        sources.extend(SYSTEM_FONTS.iter().map(|(path, index)| FontSource::File {
            path: PathBuf::from(path),
            index: *index,
        }));
        sources.push(FontSource::Builtin);
        sources
    }

    /// Tries to load this source.
    pub fn load(&self) -> Result<CaptionFont, MemeError> {
        match self {
            FontSource::File { path, index } => {
                let data = std::fs::read(path).map_err(|err| match err.kind() {
                    std::io::ErrorKind::NotFound => {
                        MemeError::MissingInput(format!("font {}", path.display()))
                    }
                    _ => MemeError::Io(err),
                })?;
                let font = FontVec::try_from_vec_and_index(data, *index).map_err(|err| {
                    MemeError::DecodeFailed(format!(
                        "font {} (face {index}): {err}",
                        path.display()
                    ))
                })?;
                Ok(CaptionFont::TrueType {
                    font,
                    path: path.clone(),
                })
            }
            FontSource::Builtin => Ok(CaptionFont::Builtin),
        }
    }
}

/// Returns the first source that loads, or the built-in face if none do.
pub fn resolve_font(sources: &[FontSource]) -> CaptionFont {
    for source in sources {
        match source.load() {
            Ok(font) => {
                debug!("Using caption font {}", font.name());
                return font;
            }
            Err(err) => debug!("Skipping font source {:?}: {}", source, err),
        }
    }
    debug!("No font source loaded, using the built-in face");
    CaptionFont::Builtin
}

/// A font captions can be measured and rasterised with.
pub enum CaptionFont {
    /// An outline font
    TrueType {
        /// Parsed font
        font: FontVec,
        /// Where it was loaded from
        path: PathBuf,
    },
    /// Monospaced 8x8 bitmap glyphs scaled to the font size. ASCII only,
    /// anything else draws as `?`.
    Builtin,
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CaptionFont({})", self.name())
    }
}

/// A rasterised line of text: coverage in `0..=255`.
///
/// The line box is `advance` pixels wide, starting at the pen origin. Ink can
/// spill outside it (negative side bearings, accents above the ascender), so
/// the mask's top-left corner sits at (`offset_x`, `offset_y`) relative to the
/// line box's top-left corner. Both offsets are zero or negative.
#[derive(Clone, Debug)]
pub struct LineMask {
    /// Glyph coverage
    pub coverage: GrayImage,
    /// Distance from the top row of the mask to the baseline
    pub ascent: u32,
    /// Sum of the glyph advances, which is what the line is centred on
    pub advance: u32,
    /// Horizontal position of the mask relative to the pen origin
    pub offset_x: i32,
    /// Vertical position of the mask relative to the top of the line box
    pub offset_y: i32,
}

impl CaptionFont {
    /// Human readable name for logs.
    pub fn name(&self) -> String {
        match self {
            CaptionFont::TrueType { path, .. } => path.display().to_string(),
            CaptionFont::Builtin => "built-in bitmap".to_string(),
        }
    }

    /// Rasterises a single line of text.
    pub fn line_mask(&self, text: &str, font_size: u32) -> LineMask {
        match self {
            CaptionFont::TrueType { font, .. } => truetype_mask(font, text, font_size),
            CaptionFont::Builtin => bitmap_mask(text, font_size),
        }
    }
}

impl TextMeasure for CaptionFont {
    fn text_width(&self, text: &str, font_size: u32) -> f32 {
        match self {
            CaptionFont::TrueType { font, .. } => truetype_width(font, text, font_size),
            CaptionFont::Builtin => {
                (text.chars().count() as u32 * bitmap_advance(font_size)) as f32
            }
        }
    }
}

fn px_scale(font_size: u32) -> PxScale {
    PxScale::from(font_size as f32)
}

fn truetype_width(font: &FontVec, text: &str, font_size: u32) -> f32 {
    let scaled = font.as_scaled(px_scale(font_size));
    let mut width = 0.0f32;
    let mut prev = None;
    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        if let Some(prev_id) = prev {
            width += scaled.kern(prev_id, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev = Some(glyph_id);
    }
    width
}

fn truetype_mask(font: &FontVec, text: &str, font_size: u32) -> LineMask {
    let scale = px_scale(font_size);
    let scaled = font.as_scaled(scale);
    let ascent = scaled.ascent().ceil().max(0.0);
    let line_height = (ascent - scaled.descent().floor()).max(1.0);
    let advance = truetype_width(font, text, font_size).ceil().max(1.0);

    let mut outlines = Vec::new();
    let mut caret = 0.0f32;
    let mut prev = None;
    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        if let Some(prev_id) = prev {
            caret += scaled.kern(prev_id, glyph_id);
        }
        let glyph = glyph_id.with_scale_and_position(scale, point(caret, ascent));
        if let Some(outlined) = font.outline_glyph(glyph) {
            outlines.push(outlined);
        }
        caret += scaled.h_advance(glyph_id);
        prev = Some(glyph_id);
    }

    // Union of the line box and every glyph's pixel bounds.
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (0.0f32, 0.0f32, advance, line_height);
    for outlined in &outlines {
        let bounds = outlined.px_bounds();
        min_x = min_x.min(bounds.min.x.floor());
        min_y = min_y.min(bounds.min.y.floor());
        max_x = max_x.max(bounds.max.x.ceil());
        max_y = max_y.max(bounds.max.y.ceil());
    }
    let width = (max_x - min_x).max(1.0) as u32;
    let height = (max_y - min_y).max(1.0) as u32;

    let mut coverage = GrayImage::new(width, height);
    for outlined in &outlines {
        let bounds = outlined.px_bounds();
        let left = (bounds.min.x.floor() - min_x) as i64;
        let top = (bounds.min.y.floor() - min_y) as i64;
        outlined.draw(|x, y, value| {
            let px = left + i64::from(x);
            let py = top + i64::from(y);
            if px < 0 || py < 0 || px >= i64::from(width) || py >= i64::from(height) {
                return;
            }
            let pixel = coverage.get_pixel_mut(px as u32, py as u32);
            pixel.0[0] = pixel.0[0].max(coverage_value(value));
        });
    }

    LineMask {
        coverage,
        ascent: (ascent - min_y) as u32,
        advance: advance as u32,
        offset_x: min_x as i32,
        offset_y: min_y as i32,
    }
}

fn coverage_value(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Bitmap glyphs are squeezed to three quarters of an em wide.
fn bitmap_advance(font_size: u32) -> u32 {
    (font_size * 3 / 4).max(1)
}

fn bitmap_mask(text: &str, font_size: u32) -> LineMask {
    let size = font_size.max(1);
    let advance = bitmap_advance(size);
    let glyphs: Vec<[u8; 8]> = text
        .chars()
        .map(|c| {
            let code = if c.is_ascii() { c as usize } else { '?' as usize };
            BASIC_LEGACY[code]
        })
        .collect();
    let width = (glyphs.len() as u32 * advance).max(1);

    let coverage = GrayImage::from_fn(width, size, |x, y| {
        let Some(rows) = glyphs.get((x / advance) as usize) else {
            return image::Luma([0]);
        };
        let gx = (x % advance) * BITMAP_CELL / advance;
        let gy = y * BITMAP_CELL / size;
        let row = rows[gy as usize];
        if (row >> gx) & 1 == 1 {
            image::Luma([255])
        } else {
            image::Luma([0])
        }
    });

    LineMask {
        coverage,
        ascent: size,
        advance: width,
        offset_x: 0,
        offset_y: 0,
    }
}
