//! The theme-driven title bar renderer.

use strum::IntoEnumIterator;
use tracing::{debug, instrument, trace, warn};

use super::{Corner, DecorationState, Decorator, RasterImage, StyleFlags};
use crate::core::{Color, Geometry};
use crate::theme::{
    ButtonKind, Component, ThemeControlState, ThemeEngine, ThemeHandle, ThemeResult,
};
use crate::util;

/// Colours used when no theme can draw the title bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fallback {
    pub focused: Color,
    pub unfocused: Color,
    pub disabled: Color,
}

impl Default for Fallback {
    fn default() -> Self {
        Fallback {
            focused: Color::from_rgb(util::FOCUSED_COL),
            unfocused: Color::from_rgb(util::UNFOCUSED_COL),
            disabled: Color::from_rgb(util::DISABLED_COL),
        }
    }
}

impl Fallback {
    pub fn color(&self, state: ThemeControlState) -> Color {
        match state {
            ThemeControlState::KeyFocused => self.focused,
            ThemeControlState::Inactive => self.unfocused,
            ThemeControlState::Disabled => self.disabled,
        }
    }
}

#[derive(Debug)]
struct LastRender {
    state: DecorationState,
    generation: u64,
    image: RasterImage,
}

/// Renders title bars by delegating to the current theme engine.
///
/// The theme is fetched anew from the [`ThemeHandle`] on every call, so
/// a theme swap takes effect on the next render. If the theme is missing
/// or any of its queries fail, the title bar is drawn as a flat fill in
/// the [`Fallback`] colour for its state, with no glyphs.
///
/// The last image rendered is kept, and handed out again when the next
/// state is identical and the theme has not changed since.
#[derive(Debug)]
pub struct ThemeDecorationRenderer {
    theme: ThemeHandle,
    fallback: Fallback,
    last: Option<LastRender>,
    allocations: usize,
    cache_hits: usize,
}

impl ThemeDecorationRenderer {
    pub fn new(theme: ThemeHandle) -> Self {
        Self::with_fallback(theme, Fallback::default())
    }

    pub fn with_fallback(theme: ThemeHandle, fallback: Fallback) -> Self {
        Self {
            theme,
            fallback,
            last: None,
            allocations: 0,
            cache_hits: 0,
        }
    }

    /// The number of raster buffers this renderer has allocated.
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    /// The number of renders served from the last image.
    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }

    /// Renders `state` into a new image.
    ///
    /// Returns None without doing any work if the state's size is degenerate.
    #[cfg_attr(
        debug_assertions,
        instrument(target = "renderer", level = "trace", skip(self), fields(title = %state.title))
    )]
    pub fn render(&mut self, state: &DecorationState) -> Option<RasterImage> {
        if state.size.is_degenerate() {
            trace!("Skipping render of degenerate size {}", state.size);
            return None;
        }

        let control = ThemeControlState::for_state(state);
        let generation = self.theme.generation();

        if let Some(last) = &self.last {
            if last.generation == generation && last.state == *state {
                trace!("State unchanged since last render, reusing image");
                self.cache_hits += 1;
                self.allocations += 1;
                return Some(last.image.clone());
            }
        }

        let image = match self.theme.current() {
            Ok(theme) => match self.compose(&*theme, control, state) {
                Some(Ok(image)) => image,
                Some(Err(e)) => {
                    warn!("Theme {} failed, using fallback: {}", theme.name(), e);
                    self.flat(control, state)?
                }
                None => return None,
            },
            Err(e) => {
                debug!("{}, using fallback", e);
                self.flat(control, state)?
            }
        };

        self.last = Some(LastRender {
            state: state.clone(),
            generation,
            image: image.clone(),
        });

        Some(image)
    }

    fn allocate(&mut self, state: &DecorationState, fill: Color) -> Option<RasterImage> {
        let image = RasterImage::new(state.size, fill)?;
        self.allocations += 1;
        Some(image)
    }

    /// The minimal treatment used when the theme is unavailable.
    fn flat(&mut self, control: ThemeControlState, state: &DecorationState) -> Option<RasterImage> {
        let color = self.fallback.color(control);
        self.allocate(state, color)
    }

    fn compose(
        &mut self,
        theme: &dyn ThemeEngine,
        control: ThemeControlState,
        state: &DecorationState,
    ) -> Option<ThemeResult<RasterImage>> {
        let mut image = self.allocate(state, Color::TRANSPARENT)?;
        Some(compose_into(theme, control, state, &mut image).map(|_| image))
    }
}

/// Composes the title bar in two passes: background and corners,
/// then the title and the buttons the window's style allows.
fn compose_into(
    theme: &dyn ThemeEngine,
    control: ThemeControlState,
    state: &DecorationState,
    image: &mut RasterImage,
) -> ThemeResult<()> {
    let size = state.size;

    // first pass
    let bg = theme.metrics(control, Component::Background, size)?;
    theme.draw_background(image, control, bg.frame)?;

    let resizable = state.is_resizable();
    let corner = theme.metrics(control, Component::Corner { resizable }, size)?;
    image.clear_corner(Corner::TopLeft, corner.radius);
    image.clear_corner(Corner::TopRight, corner.radius);

    // second pass
    if state.flags.contains(StyleFlags::TITLED) {
        let text = theme.metrics(control, Component::TitleText, size)?;
        theme.draw_title(image, control, text.frame, &state.title)?;
    }

    for kind in ButtonKind::iter() {
        if !state.flags.contains(kind.required_flag()) {
            continue;
        }
        let button = theme.metrics(control, Component::Button(kind), size)?;
        if fits(&button.frame, image) {
            theme.draw_button(image, control, kind, button.frame)?;
        }
    }

    Ok(())
}

fn fits(frame: &Geometry, image: &RasterImage) -> bool {
    !frame.is_degenerate() && image.bounds().intersect(frame) == Some(*frame)
}

impl Decorator for ThemeDecorationRenderer {
    fn render(&mut self, state: &DecorationState) -> Option<RasterImage> {
        ThemeDecorationRenderer::render(self, state)
    }
}
