//! Caption compositor: stamps a meme caption onto the bottom of an image.
//!
//! The caption is word-wrapped at the largest font size that keeps every line
//! inside the side margins ([layout::fit_caption]), then drawn white with a
//! black outline, centred, just above the bottom margin ([render::draw_layout]).
//! The image keeps its dimensions; only pixels change.

pub mod font;
pub mod layout;
pub mod render;

use image::{ImageFormat, RgbaImage};
use tracing::{debug, warn};

use crate::codec;
use crate::error::MemeError;
use font::{CaptionFont, FontSource, resolve_font};
use layout::{CaptionLayout, FitSettings, fit_caption};

/// A resolved font plus fitting settings, reused across images in a batch.
#[derive(Debug)]
pub struct Compositor {
    font: CaptionFont,
    settings: FitSettings,
}

impl Compositor {
    /// Uses `font` with the default fitting settings.
    pub fn new(font: CaptionFont) -> Self {
        Self::with_settings(font, FitSettings::default())
    }

    /// Uses `font` with custom fitting settings.
    pub fn with_settings(font: CaptionFont, settings: FitSettings) -> Self {
        Self { font, settings }
    }

    /// Resolves the first loadable font out of `sources`.
    pub fn from_sources(sources: &[FontSource]) -> Self {
        Self::new(resolve_font(sources))
    }

    /// The font captions are drawn with.
    pub fn font(&self) -> &CaptionFont {
        &self.font
    }

    /// Lays out `caption` for `image` without drawing it.
    pub fn layout(&self, image: &RgbaImage, caption: &str) -> CaptionLayout {
        let (width, height) = image.dimensions();
        fit_caption(&self.font, caption, width, height, &self.settings)
    }

    /// Draws `caption` onto `image` in place and returns the layout used.
    ///
    /// An empty caption leaves the image untouched. A caption that can't fit
    /// the margins is drawn at the minimum size anyway and logged.
    pub fn compose(&self, image: &mut RgbaImage, caption: &str) -> CaptionLayout {
        let layout = self.layout(image, caption);
        if let Some(overflow) = layout.overflow() {
            warn!("{}", overflow);
        }
        if layout.lines.is_empty() {
            debug!("Empty caption, nothing to draw");
            return layout;
        }
        debug!(
            "Drawing {} caption lines at {}px, top at {:.1}",
            layout.lines.len(),
            layout.font_size,
            layout.y_top
        );
        render::draw_layout(image, &self.font, &layout);
        layout
    }

    /// Decodes `bytes`, draws `caption` and encodes the result as `format`.
    pub fn compose_bytes(
        &self,
        bytes: &[u8],
        caption: &str,
        format: ImageFormat,
    ) -> Result<Vec<u8>, MemeError> {
        let mut image = codec::decode(bytes)?;
        self.compose(&mut image, caption);
        codec::encode(&image, format)
    }
}
