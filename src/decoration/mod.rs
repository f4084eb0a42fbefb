//! Title bar decoration: state, rendering and transfer to the screen.
//!
//! Drawing a title bar is split into two steps. A [`Decorator`] first
//! renders the [`DecorationState`] of a window into an off-screen
//! [`RasterImage`], then transfers that image onto the window's
//! [`Surface`]. The window's owner decides when to redraw; the
//! decorator only decides what the result looks like.
//!
//! [`ThemeDecorationRenderer`] is the decorator shipped with toaru-deco,
//! which delegates all of its drawing to the current
//! [theme engine](crate::theme::ThemeEngine).

pub mod raster;
pub mod renderer;
pub mod transfer;

#[doc(inline)]
pub use raster::{Corner, RasterImage};
#[doc(inline)]
pub use renderer::ThemeDecorationRenderer;
#[doc(inline)]
pub use transfer::{transfer, Surface};

use crate::core::{Result, Size};
use crate::x::XConn;

bitflags! {

/// The style of a decorated window.
///
/// Determines which parts of the title bar are drawn and how the
/// corners are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleFlags: u32 {
    /// The window has a title.
    const TITLED         = 1 << 0;
    /// The window can be closed.
    const CLOSABLE       = 1 << 1;
    /// The window can be minimized.
    const MINIATURIZABLE = 1 << 2;
    /// The window can be resized and maximized.
    const RESIZABLE      = 1 << 3;
}

}

impl Default for StyleFlags {
    fn default() -> Self {
        StyleFlags::TITLED | StyleFlags::CLOSABLE | StyleFlags::MINIATURIZABLE | StyleFlags::RESIZABLE
    }
}

/// The state of a window's decoration at the time of a render.
///
/// This is recomputed by the decoration's owner whenever something
/// changes and handed to the renderer as a whole. Two states that
/// compare equal are guaranteed to render to the same image under
/// the same theme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecorationState {
    /// Whether the window holds keyboard focus.
    pub active: bool,
    /// Whether the window is blocked from interaction.
    pub disabled: bool,
    pub flags: StyleFlags,
    pub title: String,
    /// The size of the title bar.
    pub size: Size,
}

impl DecorationState {
    pub fn new<S: Into<String>>(title: S, flags: StyleFlags, size: Size) -> Self {
        Self {
            active: false,
            disabled: false,
            flags,
            title: title.into(),
            size,
        }
    }

    /// Returns the same state with `active` set.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Returns the same state with `disabled` set.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Returns the same state with a different size.
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    #[inline]
    pub fn is_resizable(&self) -> bool {
        self.flags.contains(StyleFlags::RESIZABLE)
    }
}

/// A strategy for drawing a title bar.
///
/// Implementors are injected into a [`TitleBar`](crate::manager::TitleBar),
/// which owns everything else about the decoration: the surface,
/// window geometry, and when redraws happen.
pub trait Decorator {
    /// Renders the state into an image.
    ///
    /// Returns None if there is nothing to draw, such as when the
    /// state has a degenerate size. The caller should then leave
    /// the decoration as it was last drawn.
    fn render(&mut self, state: &DecorationState) -> Option<RasterImage>;

    /// Copies a rendered image onto the target surface.
    ///
    /// Fails with [`SizeMismatch`](crate::DecoError::SizeMismatch) if
    /// the image and the surface differ in size.
    fn transfer(&mut self, conn: &dyn XConn, image: RasterImage, target: &Surface) -> Result<()> {
        transfer::transfer(conn, image, target)
    }
}
