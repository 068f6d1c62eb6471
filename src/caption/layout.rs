//! Fit-and-wrap: pick the largest font size at which the caption's word-wrapped
//! lines stay inside the horizontal margins, then place the block at the bottom
//! of the image.

use tracing::debug;

use crate::error::MemeError;

/// Anything that can tell how wide a run of text renders at a given pixel size.
pub trait TextMeasure {
    /// Rendered width of `text` in pixels at `font_size`.
    fn text_width(&self, text: &str, font_size: u32) -> f32;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn text_width(&self, text: &str, font_size: u32) -> f32 {
        (**self).text_width(text, font_size)
    }
}

/// Tunable geometry for the fitting loop and the placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitSettings {
    /// Initial font size is `width / width_divisor`
    pub width_divisor: u32,
    /// Smallest font size tried
    pub min_font_size: u32,
    /// How much the font shrinks per attempt
    pub font_step: u32,
    /// Fraction of the width reserved on each side
    pub margin_fraction: f32,
    /// Fraction of the height reserved below the text block
    pub bottom_margin_fraction: f32,
    /// Line height as a multiple of the font size
    pub line_height_factor: f32,
    /// Stroke width is `font_size / stroke_divisor`, at least 1
    pub stroke_divisor: u32,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            width_divisor: 12,
            min_font_size: 20,
            font_step: 2,
            margin_fraction: 0.05,
            bottom_margin_fraction: 0.05,
            line_height_factor: 1.2,
            stroke_divisor: 12,
        }
    }
}

impl FitSettings {
    /// `floor(width / width_divisor)`, never below the minimum font size.
    pub fn initial_font_size(&self, width: u32) -> u32 {
        (width / self.width_divisor.max(1)).max(self.min_font_size)
    }

    /// Width between the side margins.
    pub fn max_text_width(&self, width: u32) -> f32 {
        let margin = width as f32 * self.margin_fraction;
        width as f32 - 2.0 * margin
    }

    /// Outline width, scaling with the font and never zero.
    pub fn stroke_width(&self, font_size: u32) -> u32 {
        (font_size / self.stroke_divisor.max(1)).max(1)
    }

    /// Font sizes tried, largest first. The last one is always the minimum.
    pub fn font_sizes(&self, width: u32) -> Vec<u32> {
        let step = self.font_step.max(1);
        let mut size = self.initial_font_size(width);
        let mut sizes = vec![size];
        while size > self.min_font_size {
            size = size.saturating_sub(step).max(self.min_font_size);
            sizes.push(size);
        }
        sizes
    }
}

/// The result of one greedy wrap at a fixed font size.
#[derive(Clone, Debug, PartialEq)]
pub struct WrappedText {
    /// Lines in drawing order
    pub lines: Vec<String>,
    /// Whether every line fits inside the maximum width
    pub fits: bool,
    /// Measured width of the widest line
    pub widest_line: f32,
}

/// Greedily wraps `caption` at `font_size`.
///
/// Explicit line breaks start a new line. A word that is too wide on its own
/// still gets a line of its own, but marks the wrap as not fitting.
pub fn wrap_caption<M: TextMeasure + ?Sized>(
    measure: &M,
    caption: &str,
    font_size: u32,
    max_width: f32,
) -> WrappedText {
    let mut lines = Vec::new();
    let mut fits = true;
    let mut widest_line: f32 = 0.0;

    for paragraph in caption.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if measure.text_width(&candidate, font_size) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                widest_line = widest_line.max(measure.text_width(&current, font_size));
                lines.push(std::mem::take(&mut current));
            }
            let word_width = measure.text_width(word, font_size);
            if word_width > max_width {
                fits = false;
            }
            current = word.to_string();
        }
        if !current.is_empty() {
            widest_line = widest_line.max(measure.text_width(&current, font_size));
            lines.push(current);
        }
    }

    WrappedText {
        lines,
        fits,
        widest_line,
    }
}

/// Where and how big to draw a caption.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionLayout {
    /// Chosen font size in pixels
    pub font_size: u32,
    /// Wrapped lines, top to bottom
    pub lines: Vec<String>,
    /// Whether every line fits the margins
    pub fits: bool,
    /// Widest line at the chosen size
    pub widest_line: f32,
    /// Width available between the margins
    pub max_text_width: f32,
    /// Outline width in pixels
    pub stroke_width: u32,
    /// Distance between successive line tops
    pub line_height: f32,
    /// Top of the first line
    pub y_top: f32,
    /// Horizontal centre every line is aligned on
    pub center_x: f32,
    /// Number of font sizes tried
    pub attempts: usize,
}

impl CaptionLayout {
    /// Total height of the text block.
    pub fn block_height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }

    /// Top edge of line `index`.
    pub fn line_top(&self, index: usize) -> f32 {
        self.y_top + index as f32 * self.line_height
    }

    /// `LayoutInfeasible` when the fallback size still overflows the margins.
    pub fn overflow(&self) -> Option<MemeError> {
        if self.fits {
            return None;
        }
        Some(MemeError::LayoutInfeasible {
            font_size: self.font_size,
            widest_line: self.widest_line,
            max_width: self.max_text_width,
        })
    }
}

/// Runs fit-and-wrap for an image of `width` x `height` and places the block.
///
/// Never fails: when no size fits, the wrap at the minimum size is kept and
/// [CaptionLayout::overflow] reports it.
pub fn fit_caption<M: TextMeasure + ?Sized>(
    measure: &M,
    caption: &str,
    width: u32,
    height: u32,
    settings: &FitSettings,
) -> CaptionLayout {
    let max_text_width = settings.max_text_width(width);
    let sizes = settings.font_sizes(width);

    let mut attempts = 0;
    let mut chosen: Option<(u32, WrappedText)> = None;
    for &size in &sizes {
        attempts += 1;
        let wrapped = wrap_caption(measure, caption, size, max_text_width);
        let fits = wrapped.fits;
        debug!(
            "Wrapped caption at {}px into {} lines (fits: {})",
            size,
            wrapped.lines.len(),
            fits
        );
        chosen = Some((size, wrapped));
        if fits {
            break;
        }
    }

    let (font_size, wrapped) = chosen.unwrap_or_else(|| {
        let size = settings.min_font_size;
        (size, wrap_caption(measure, caption, size, max_text_width))
    });

    let line_height = font_size as f32 * settings.line_height_factor;
    let block_height = wrapped.lines.len() as f32 * line_height;
    let bottom_margin = height as f32 * settings.bottom_margin_fraction;
    let y_top = (height as f32 - block_height - bottom_margin).max(0.0);

    CaptionLayout {
        font_size,
        lines: wrapped.lines,
        fits: wrapped.fits,
        widest_line: wrapped.widest_line,
        max_text_width,
        stroke_width: settings.stroke_width(font_size),
        line_height,
        y_top,
        center_x: width as f32 / 2.0,
        attempts,
    }
}
