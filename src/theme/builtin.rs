//! The theme engine shipped with toaru-deco.

use crate::core::{Color, Geometry, Size};
use crate::decoration::RasterImage;
use crate::manager::Config;
use crate::util;

use super::text::TitleFont;
use super::{ButtonKind, Component, Metrics, ThemeControlState, ThemeEngine, ThemeResult};

/// The colours used by [`DefaultTheme`].
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub focused: Color,
    pub unfocused: Color,
    pub disabled: Color,
    pub text_focused: Color,
    pub text_unfocused: Color,
    pub close: Color,
    pub minimize: Color,
    pub maximize: Color,
    pub glyph: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            focused: Color::from_rgb(util::FOCUSED_COL),
            unfocused: Color::from_rgb(util::UNFOCUSED_COL),
            disabled: Color::from_rgb(util::DISABLED_COL),
            text_focused: Color::from_rgb(0x202020),
            text_unfocused: Color::from_rgb(0xb0b0b0),
            close: Color::from_rgb(util::URGENT_COL),
            minimize: Color::from_rgb(0xe0b030),
            maximize: Color::from_rgb(0x40a040),
            glyph: Color::from_rgb(0x303030),
        }
    }
}

/// Spacing and sizes used by [`DefaultTheme`], in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeLayout {
    /// Space between the title bar edges and its contents.
    pub padding: i32,
    pub button_size: i32,
    pub button_spacing: i32,
    /// Corner radius for resizable windows.
    pub corner_radius: i32,
    /// Corner radius for fixed-size windows.
    pub fixed_corner_radius: i32,
}

impl Default for ThemeLayout {
    fn default() -> Self {
        ThemeLayout {
            padding: 6,
            button_size: 14,
            button_spacing: 6,
            corner_radius: 6,
            fixed_corner_radius: 2,
        }
    }
}

/// A flat, gradient-filled theme with round buttons.
///
/// Buttons are right-aligned in the order minimize, maximize, close,
/// and each keeps its slot whether or not the others are shown.
/// Titles are centered and drawn with an outline font. Without a
/// font the theme still draws everything but the title.
#[derive(Debug, Clone)]
pub struct DefaultTheme {
    name: String,
    palette: Palette,
    layout: ThemeLayout,
    font: Option<TitleFont>,
}

impl Default for DefaultTheme {
    fn default() -> Self {
        DefaultTheme::named("toaru")
    }
}

impl DefaultTheme {
    /// Creates the theme, using the first font found on the system.
    pub fn new<S: Into<String>>(name: S, palette: Palette, layout: ThemeLayout) -> Self {
        Self {
            name: name.into(),
            palette,
            layout,
            font: TitleFont::find(None, util::FONT_SIZE),
        }
    }

    /// Creates the theme with default colours and layout under a given name.
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self::new(name, Palette::default(), ThemeLayout::default())
    }

    /// Creates the theme using the colours and sizes in a [`Config`].
    pub fn from_config(config: &Config) -> Self {
        let palette = Palette {
            focused: config.focused,
            unfocused: config.unfocused,
            disabled: config.disabled,
            text_focused: config.text_focused,
            text_unfocused: config.text_unfocused,
            close: config.urgent,
            ..Palette::default()
        };
        let layout = ThemeLayout {
            button_size: config.button_size,
            button_spacing: config.button_spacing,
            corner_radius: config.corner_radius,
            fixed_corner_radius: config.fixed_corner_radius,
            ..ThemeLayout::default()
        };
        Self {
            name: "toaru".into(),
            palette,
            layout,
            font: TitleFont::find(config.font.as_deref(), config.font_size),
        }
    }

    /// Replaces the title font.
    pub fn with_font(mut self, font: Option<TitleFont>) -> Self {
        self.font = font;
        self
    }

    pub fn font(&self) -> Option<&TitleFont> {
        self.font.as_ref()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn layout(&self) -> &ThemeLayout {
        &self.layout
    }

    fn base_color(&self, state: ThemeControlState) -> Color {
        match state {
            ThemeControlState::KeyFocused => self.palette.focused,
            ThemeControlState::Inactive => self.palette.unfocused,
            ThemeControlState::Disabled => self.palette.disabled,
        }
    }

    fn text_color(&self, state: ThemeControlState) -> Color {
        match state {
            ThemeControlState::KeyFocused => self.palette.text_focused,
            ThemeControlState::Inactive => self.palette.text_unfocused,
            ThemeControlState::Disabled => self.palette.text_unfocused.darken(30),
        }
    }

    fn button_size(&self, size: Size) -> i32 {
        self.layout.button_size.min(size.height - 4)
    }

    fn button_slot(kind: ButtonKind) -> i32 {
        match kind {
            ButtonKind::Close => 0,
            ButtonKind::Maximize => 1,
            ButtonKind::Minimize => 2,
        }
    }
}

impl ThemeEngine for DefaultTheme {
    fn name(&self) -> &str {
        &self.name
    }

    fn metrics(
        &self,
        _state: ThemeControlState,
        component: Component,
        size: Size,
    ) -> ThemeResult<Metrics> {
        let l = &self.layout;
        Ok(match component {
            Component::Background => Metrics::new(Geometry::from_size(size), 0),
            Component::Corner { resizable } => {
                let radius = if resizable {
                    l.corner_radius
                } else {
                    l.fixed_corner_radius
                };
                Metrics::new(Geometry::from_size(size), radius)
            }
            Component::Button(kind) => {
                let bs = self.button_size(size);
                let slot = Self::button_slot(kind);
                let x = size.width - l.padding - (slot + 1) * bs - slot * l.button_spacing;
                let y = (size.height - bs) / 2;
                Metrics::new(Geometry::new(x, y, bs, bs), bs / 2)
            }
            Component::TitleText => {
                let bs = self.button_size(size).max(0);
                let buttons = 3 * bs + 2 * l.button_spacing;
                let left = l.padding;
                let right = size.width - 2 * l.padding - buttons;
                Metrics::new(Geometry::new(left, 0, size.height, right - left), 0)
            }
        })
    }

    fn draw_background(
        &self,
        target: &mut RasterImage,
        state: ThemeControlState,
        frame: Geometry,
    ) -> ThemeResult<()> {
        let base = self.base_color(state);

        if let ThemeControlState::Disabled = state {
            target.fill_rect(frame, base);
        } else {
            target.fill_vertical_gradient(frame, base.lighten(15), base.darken(10));
        }

        // separator between the title bar and the client
        let line = Geometry::new(frame.x, frame.y + frame.height - 1, 1, frame.width);
        target.fill_rect(line, base.darken(30));

        Ok(())
    }

    fn draw_title(
        &self,
        target: &mut RasterImage,
        state: ThemeControlState,
        frame: Geometry,
        title: &str,
    ) -> ThemeResult<()> {
        let Some(font) = &self.font else {
            return Ok(());
        };
        if frame.is_degenerate() || title.is_empty() {
            return Ok(());
        }

        let text = font.fit(title, frame.width as f32);
        if text.is_empty() {
            return Ok(());
        }
        let x = frame.x as f32 + (frame.width as f32 - font.measure(&text)) / 2.0;
        let y = frame.y as f32 + (frame.height as f32 - font.line_height()) / 2.0;
        font.draw(target, x.floor(), y.floor(), &text, self.text_color(state));

        Ok(())
    }

    fn draw_button(
        &self,
        target: &mut RasterImage,
        state: ThemeControlState,
        kind: ButtonKind,
        frame: Geometry,
    ) -> ThemeResult<()> {
        if frame.is_degenerate() {
            return Ok(());
        }

        let fill = match state {
            ThemeControlState::KeyFocused => match kind {
                ButtonKind::Close => self.palette.close,
                ButtonKind::Minimize => self.palette.minimize,
                ButtonKind::Maximize => self.palette.maximize,
            },
            ThemeControlState::Inactive => self.palette.unfocused.lighten(25),
            ThemeControlState::Disabled => self.palette.disabled.darken(10),
        };
        target.fill_circle(frame, fill);

        let glyph = match state {
            ThemeControlState::Disabled => self.palette.glyph.lighten(50),
            _ => self.palette.glyph,
        };
        let inner = frame.inset((frame.width / 4).max(1));
        if inner.is_degenerate() {
            return Ok(());
        }
        let thickness = if frame.width >= 16 { 2 } else { 1 };
        let (x1, y1) = (inner.x, inner.y);
        let (x2, y2) = (inner.x + inner.width - 1, inner.y + inner.height - 1);

        match kind {
            ButtonKind::Close => {
                target.draw_line((x1, y1), (x2, y2), thickness, glyph);
                target.draw_line((x2, y1), (x1, y2), thickness, glyph);
            }
            ButtonKind::Minimize => {
                let cy = inner.y + inner.height / 2;
                target.draw_line((x1, cy), (x2, cy), thickness, glyph);
            }
            ButtonKind::Maximize => target.stroke_rect(inner, thickness, glyph),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAR: Size = Size {
        width: 300,
        height: 24,
    };

    #[test]
    fn test_buttons_do_not_overlap() {
        let theme = DefaultTheme::default();
        let st = ThemeControlState::KeyFocused;

        let close = theme.metrics(st, Component::Button(ButtonKind::Close), BAR).unwrap();
        let max = theme.metrics(st, Component::Button(ButtonKind::Maximize), BAR).unwrap();
        let min = theme.metrics(st, Component::Button(ButtonKind::Minimize), BAR).unwrap();
        let title = theme.metrics(st, Component::TitleText, BAR).unwrap();

        assert!(close.frame.x > max.frame.x && max.frame.x > min.frame.x);
        assert!(close.frame.intersect(&max.frame).is_none());
        assert!(max.frame.intersect(&min.frame).is_none());
        assert!(title.frame.intersect(&min.frame).is_none());
        assert!(close.frame.x + close.frame.width <= BAR.width);
    }

    #[test]
    fn test_corner_radius_depends_on_resizable() {
        let theme = DefaultTheme::default();
        let st = ThemeControlState::Inactive;

        let resizable = theme.metrics(st, Component::Corner { resizable: true }, BAR).unwrap();
        let fixed = theme.metrics(st, Component::Corner { resizable: false }, BAR).unwrap();

        assert_eq!(resizable.radius, theme.layout().corner_radius);
        assert_eq!(fixed.radius, theme.layout().fixed_corner_radius);
        assert_ne!(resizable.radius, fixed.radius);
    }

    #[test]
    fn test_title_is_drawn_in_text_color() {
        let theme = DefaultTheme::default();
        if theme.font().is_none() {
            // no font installed, nothing to check
            return;
        }
        let st = ThemeControlState::KeyFocused;
        let mut image = RasterImage::new(BAR, Color::TRANSPARENT).unwrap();

        let frame = theme.metrics(st, Component::TitleText, BAR).unwrap().frame;
        theme.draw_title(&mut image, st, frame, "Terminal").unwrap();

        let text = theme.palette().text_focused;
        assert!(image.colors().any(|c| c.alpha() != 0 && c.with_alpha(0xff) == text));
        // nothing spills outside the title frame horizontally
        for y in 0..BAR.height {
            assert_eq!(image.pixel(frame.x + frame.width, y), Some(Color::TRANSPARENT));
        }
    }

    #[test]
    fn test_theme_without_font_skips_title() {
        let theme = DefaultTheme::default().with_font(None);
        let st = ThemeControlState::KeyFocused;
        let mut image = RasterImage::new(BAR, Color::TRANSPARENT).unwrap();

        let frame = theme.metrics(st, Component::TitleText, BAR).unwrap().frame;
        theme.draw_title(&mut image, st, frame, "Terminal").unwrap();

        assert!(image.colors().all(|c| c == Color::TRANSPARENT));
    }
}
