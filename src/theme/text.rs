//! Title text rendering with outline fonts.

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use custom_debug_derive::Debug;
use tracing::{debug, trace, warn};

use super::{ThemeError, ThemeResult};
use crate::core::Color;
use crate::decoration::RasterImage;

/// Fonts tried in order when none is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
];

const ELLIPSIS: &str = "...";

/// An outline font at a fixed pixel size.
#[derive(Debug, Clone)]
pub struct TitleFont {
    #[debug(skip)]
    font: FontArc,
    size: f32,
}

impl TitleFont {
    pub fn new(font: FontArc, size: f32) -> Self {
        Self { font, size }
    }

    /// Loads a TrueType or OpenType font file.
    pub fn load<P: AsRef<Path>>(path: P, size: f32) -> ThemeResult<Self> {
        let path = path.as_ref();
        let data = fs::read(path)
            .map_err(|e| ThemeError::Font(format!("{}: {}", path.display(), e)))?;
        let font = FontArc::try_from_vec(data)
            .map_err(|e| ThemeError::Font(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(font, size))
    }

    /// Loads `path` if given, falling back to the first usable system font.
    ///
    /// Returns None if no font could be loaded at all.
    pub fn find(path: Option<&Path>, size: f32) -> Option<Self> {
        if let Some(path) = path {
            match Self::load(path, size) {
                Ok(font) => return Some(font),
                Err(e) => warn!("Could not load configured font, {}", e),
            }
        }

        for candidate in SYSTEM_FONTS.iter().map(PathBuf::from) {
            match Self::load(&candidate, size) {
                Ok(font) => {
                    debug!("Using font {}", candidate.display());
                    return Some(font);
                }
                Err(e) => trace!("Skipping font {}", e),
            }
        }

        warn!("No usable font found, titles will not be drawn");
        None
    }

    /// The pixel size of the font.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// The height of a line of text, from ascender to descender.
    pub fn line_height(&self) -> f32 {
        self.font.as_scaled(self.size).height()
    }

    /// The advance width of `text`, including kerning.
    pub fn measure(&self, text: &str) -> f32 {
        let scaled = self.font.as_scaled(self.size);
        let mut prev: Option<GlyphId> = None;
        let mut width = 0.0;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    /// Shortens `text` with an ellipsis until it fits in `max_width`.
    ///
    /// Returns an empty string if not even the ellipsis fits.
    pub fn fit(&self, text: &str, max_width: f32) -> String {
        if self.measure(text) <= max_width {
            return text.to_string();
        }
        for (end, _) in text.char_indices().rev() {
            let candidate = format!("{}{}", text[..end].trim_end(), ELLIPSIS);
            if self.measure(&candidate) <= max_width {
                return candidate;
            }
        }
        String::new()
    }

    /// Draws `text` with the top of its line at `(x, y)`, blending
    /// glyph coverage over what is already in the image.
    pub fn draw(&self, target: &mut RasterImage, x: f32, y: f32, text: &str, color: Color) {
        let scaled = self.font.as_scaled(self.size);
        let mut caret = point(x, y + scaled.ascent());
        let mut prev: Option<GlyphId> = None;

        for c in text.chars() {
            let mut glyph = scaled.scaled_glyph(c);
            if let Some(p) = prev {
                caret.x += scaled.kern(p, glyph.id);
            }
            glyph.position = caret;
            caret.x += scaled.h_advance(glyph.id);
            prev = Some(glyph.id);

            let Some(outlined) = scaled.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let alpha = (color.alpha() as f32 * coverage).round().clamp(0.0, 255.0) as u8;
                if alpha == 0 {
                    return;
                }
                target.blend_pixel(
                    bounds.min.x as i32 + gx as i32,
                    bounds.min.y as i32 + gy as i32,
                    color.with_alpha(alpha),
                );
            });
        }
    }
}
