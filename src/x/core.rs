use thiserror::Error;

use super::atom::Atom;
use super::event::XEvent;
use crate::core::{Color, Geometry, Size};
use crate::decoration::RasterImage;

pub type XWindowID = u32;
pub type XAtom = u32;

/// A window on the X server, along with its last known geometry.
#[derive(Debug, Clone, Copy)]
pub struct XWindow {
    pub id: XWindowID,
    pub geom: Geometry,
}

impl PartialEq for XWindow {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl From<XWindowID> for XWindow {
    fn from(from: XWindowID) -> Self {
        Self {
            id: from,
            geom: Geometry::zeroed(),
        }
    }
}

impl XWindow {
    /// Creates an XWindow with an all-zero id and geometry.
    pub fn zeroed() -> Self {
        XWindow::from(0)
    }

    pub fn with_data(id: XWindowID, geom: Geometry) -> Self {
        Self { id, geom }
    }
}

/// The kind of window to be created by [`XConn::create_window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowClass {
    /// A normal window that can be drawn to, parented under
    /// the given window.
    InputOutput(XWindowID),
    /// A click-through, override-redirect window that sits
    /// above everything else, using a visual with an alpha
    /// channel if the server offers one.
    Overlay,
}

/// X server properties that toaru-deco sets.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// a list of atoms.
    Atom(Vec<XAtom>),
    /// a cardinal number.
    Cardinal(u32),
    /// a UTF-8 encoded string.
    UTF8String(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum XError {
    #[error("Could not establish a connection to the X server: {0}")]
    Connection(String),
    #[error("X protocol error: {0}")]
    Protocol(String),
    #[error("Server error: {0}")]
    ServerError(String),
    #[error("Could not complete specified request: {0}")]
    RequestError(&'static str),
    #[error("Unknown atom {0}")]
    UnknownAtom(String),
    #[error("No screens were found.")]
    NoScreens,
    #[error("Invalid screen index.")]
    InvalidScreen,
    #[error("No such window {0}")]
    NoSuchWindow(XWindowID),
}

pub type Result<T> = ::core::result::Result<T, XError>;

/// The interface through which toaru-deco talks to the X server.
///
/// It covers exactly the primitives the decoration core consumes:
/// screen geometry, window and pixmap lifetime, image upload and
/// repaint scheduling. All methods take `&self`, since the core runs
/// on a single event thread and connections use interior mutability
/// where they need it.
///
/// The trait is object-safe, so renderers can take a `&dyn XConn`.
pub trait XConn {
    // General X server operations
    /// Blocks until the next event arrives, flushing pending requests first.
    fn poll_next_event(&self) -> Result<Option<XEvent>>;
    /// Sends any buffered requests to the server.
    fn flush(&self) -> Result<()>;
    fn get_root(&self) -> XWindow;
    /// Returns the geometry of every active output.
    fn all_outputs(&self) -> Result<Vec<Geometry>>;
    fn atom(&self, atom: Atom) -> Result<XAtom>;

    // Window-related operations
    fn create_window(&self, class: WindowClass, geom: Geometry) -> Result<XWindowID>;
    fn destroy_window(&self, window: XWindowID) -> Result<()>;
    fn map_window(&self, window: XWindowID) -> Result<()>;
    fn unmap_window(&self, window: XWindowID) -> Result<()>;
    /// Places the window on top of the stacking order.
    fn raise_window(&self, window: XWindowID) -> Result<()>;
    fn configure_window(&self, window: XWindowID, geom: Geometry) -> Result<()>;
    fn set_input_focus(&self, window: XWindowID) -> Result<()>;
    fn set_property(&self, window: XWindowID, prop: Atom, value: Property) -> Result<()>;
    /// Sets a solid background colour for the window.
    fn set_background_color(&self, window: XWindowID, color: Color) -> Result<()>;
    /// Makes the window transparent to pointer input.
    fn set_input_passthrough(&self, window: XWindowID) -> Result<()>;
    /// Restricts the visible part of the window to `region`,
    /// given relative to the window origin.
    fn set_shape(&self, window: XWindowID, region: &[Geometry]) -> Result<()>;

    // Drawable-related operations
    /// Allocates a pixmap of the given size on the root window's screen.
    fn create_pixmap(&self, size: Size) -> Result<XWindowID>;
    fn free_pixmap(&self, pixmap: XWindowID) -> Result<()>;
    /// Uses the pixmap as the window's background, so that
    /// exposures are repainted from it by the server.
    fn set_background_pixmap(&self, window: XWindowID, pixmap: XWindowID) -> Result<()>;
    /// Copies the image onto the drawable at (0, 0).
    fn put_image(&self, drawable: XWindowID, image: &RasterImage) -> Result<()>;
    /// Asks the server to repaint the given region of the window.
    ///
    /// This does not wait for a reply.
    fn schedule_repaint(&self, window: XWindowID, area: Geometry) -> Result<()>;
}
