//! Pluggable theme engines for drawing decorations.
//!
//! A theme engine answers two kinds of questions: where things go
//! ([`metrics`](ThemeEngine::metrics)), and what they look like (the
//! `draw_*` methods, which paint into a [`RasterImage`]). The renderer
//! never draws anything itself besides clipping corners.
//!
//! The theme in use is held by a [`ThemeHandle`], a cheaply cloneable
//! handle to a single shared slot. Swapping the theme through any clone
//! of the handle changes it for everyone holding one, which is how a
//! theme change reaches every title bar at once.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use strum_macros::{AsRefStr, Display, EnumIter};
use thiserror::Error;
use tracing::debug;

use crate::core::{Geometry, Size};
use crate::decoration::{DecorationState, RasterImage, StyleFlags};

pub mod builtin;
pub mod text;

#[doc(inline)]
pub use builtin::DefaultTheme;

pub type ThemeResult<T> = ::core::result::Result<T, ThemeError>;

/// Errors returned by a theme engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThemeError {
    /// No theme is currently loaded.
    #[error("No theme is installed")]
    NotInstalled,
    /// The theme does not know how to handle a component.
    #[error("Theme {theme} does not support {component}")]
    Unsupported { theme: String, component: String },
    /// A font could not be loaded.
    #[error("Could not load font {0}")]
    Font(String),
    /// Any other failure inside the theme.
    #[error("Theme {theme} failed: {reason}")]
    Failed { theme: String, reason: String },
}

/// The visual state of a control, in the vocabulary theme engines
/// understand.
///
/// This is always derived from a [`DecorationState`] and never stored.
#[derive(Debug, Display, AsRefStr, EnumIter, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeControlState {
    /// The window has keyboard focus.
    KeyFocused,
    /// The window is not focused.
    Inactive,
    /// The window cannot be interacted with.
    Disabled,
}

impl ThemeControlState {
    /// Maps a decoration state to its control state.
    ///
    /// Disabled takes priority over focus.
    pub fn for_state(state: &DecorationState) -> Self {
        match (state.disabled, state.active) {
            (true, _) => Self::Disabled,
            (false, true) => Self::KeyFocused,
            (false, false) => Self::Inactive,
        }
    }
}

impl From<&DecorationState> for ThemeControlState {
    fn from(state: &DecorationState) -> Self {
        Self::for_state(state)
    }
}

/// The control buttons drawn on a title bar.
#[derive(Debug, Display, AsRefStr, EnumIter, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonKind {
    Close,
    Minimize,
    Maximize,
}

impl ButtonKind {
    /// The style flag a window needs for this button to be shown.
    pub fn required_flag(&self) -> StyleFlags {
        match self {
            ButtonKind::Close => StyleFlags::CLOSABLE,
            ButtonKind::Minimize => StyleFlags::MINIATURIZABLE,
            ButtonKind::Maximize => StyleFlags::RESIZABLE,
        }
    }
}

/// A part of a title bar the theme is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Background,
    TitleText,
    Button(ButtonKind),
    /// The top corners, which are treated differently
    /// for resizable and fixed-size windows.
    Corner { resizable: bool },
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Background => write!(f, "background"),
            Component::TitleText => write!(f, "title text"),
            Component::Button(kind) => write!(f, "{} button", kind),
            Component::Corner { resizable } => write!(
                f,
                "{} corner",
                if *resizable { "resizable" } else { "fixed" }
            ),
        }
    }
}

/// Placement information returned by a theme for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    /// Where the component is drawn, in title bar coordinates.
    pub frame: Geometry,
    /// The corner radius, if the component has one.
    pub radius: i32,
}

impl Metrics {
    pub fn new(frame: Geometry, radius: i32) -> Self {
        Self { frame, radius }
    }
}

/// A supplier of visual metrics and drawing primitives for decorations.
///
/// Implementations must be deterministic: the same arguments
/// must always produce the same pixels.
pub trait ThemeEngine {
    /// The name of the theme, for logging.
    fn name(&self) -> &str;

    /// Returns the placement of `component` on a title bar of `size`.
    fn metrics(
        &self,
        state: ThemeControlState,
        component: Component,
        size: Size,
    ) -> ThemeResult<Metrics>;

    /// Paints the title bar background into `frame`.
    fn draw_background(
        &self,
        target: &mut RasterImage,
        state: ThemeControlState,
        frame: Geometry,
    ) -> ThemeResult<()>;

    /// Paints the window title into `frame`.
    fn draw_title(
        &self,
        target: &mut RasterImage,
        state: ThemeControlState,
        frame: Geometry,
        title: &str,
    ) -> ThemeResult<()>;

    /// Paints a control button into `frame`.
    fn draw_button(
        &self,
        target: &mut RasterImage,
        state: ThemeControlState,
        kind: ButtonKind,
        frame: Geometry,
    ) -> ThemeResult<()>;
}

struct ThemeSlot {
    theme: Option<Rc<dyn ThemeEngine>>,
    generation: u64,
}

/// A shared, hot-swappable handle to the current theme engine.
///
/// Every clone refers to the same slot. Each swap bumps a generation
/// counter so that consumers can tell when anything they derived from
/// the old theme has gone stale.
#[derive(Clone)]
pub struct ThemeHandle {
    inner: Rc<RefCell<ThemeSlot>>,
}

impl ThemeHandle {
    /// Creates a handle with `theme` installed.
    pub fn new<T: ThemeEngine + 'static>(theme: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ThemeSlot {
                theme: Some(Rc::new(theme)),
                generation: 0,
            })),
        }
    }

    /// Creates a handle with no theme installed.
    pub fn empty() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ThemeSlot {
                theme: None,
                generation: 0,
            })),
        }
    }

    /// Fetches the current theme.
    pub fn current(&self) -> ThemeResult<Rc<dyn ThemeEngine>> {
        self.inner
            .borrow()
            .theme
            .clone()
            .ok_or(ThemeError::NotInstalled)
    }

    /// The number of times the theme has been changed.
    pub fn generation(&self) -> u64 {
        self.inner.borrow().generation
    }

    /// Installs a new theme, returning the old one.
    pub fn swap<T: ThemeEngine + 'static>(&self, theme: T) -> Option<Rc<dyn ThemeEngine>> {
        self.swap_rc(Rc::new(theme))
    }

    /// Installs an already shared theme, returning the old one.
    pub fn swap_rc(&self, theme: Rc<dyn ThemeEngine>) -> Option<Rc<dyn ThemeEngine>> {
        let mut slot = self.inner.borrow_mut();
        debug!("Swapping theme to {}", theme.name());
        slot.generation += 1;
        slot.theme.replace(theme)
    }

    /// Removes the current theme, returning it.
    pub fn unload(&self) -> Option<Rc<dyn ThemeEngine>> {
        let mut slot = self.inner.borrow_mut();
        slot.generation += 1;
        slot.theme.take()
    }
}

impl fmt::Debug for ThemeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.inner.borrow();
        f.debug_struct("ThemeHandle")
            .field("theme", &slot.theme.as_ref().map(|t| t.name().to_string()))
            .field("generation", &slot.generation)
            .finish()
    }
}
