use super::core::{XAtom, XWindowID};
use crate::core::{Geometry, Point};

/// Low-level wrapper around the X server events toaru-deco cares about.
#[derive(Debug, Clone)]
pub enum XEvent {
    /// A region of a window needs repainting.
    Expose(ExposeEvent),
    /// Notification that a window has changed its configuration.
    ConfigureNotify(ConfigureEvent),
    /// A window gained keyboard focus.
    FocusIn(XWindowID),
    /// A window lost keyboard focus.
    FocusOut(XWindowID),
    /// A mouse button was pressed.
    ButtonPress(PointerEvent, u8),
    /// A mouse button was released.
    ButtonRelease(PointerEvent, u8),
    /// The pointer moved with a button held.
    MotionNotify(PointerEvent),
    /// A key was pressed.
    KeyPress(XWindowID, u8),
    DestroyNotify(XWindowID),
    ClientMessage(ClientMessageEvent),
    /// The screen layout changed, so outputs should be queried again.
    ScreenChange,
    Unknown(String),
}

/// Data associated with an expose event.
#[derive(Debug, Clone, Copy)]
pub struct ExposeEvent {
    /// The window associated with the event.
    pub id: XWindowID,
    /// The region to be repainted.
    pub area: Geometry,
    /// How many more expose events follow for this window.
    pub count: u16,
}

/// Data associated with a configure event.
#[derive(Debug, Clone, Copy)]
pub struct ConfigureEvent {
    /// The window associated with the event.
    pub id: XWindowID,
    /// The new geometry of the window.
    pub geom: Geometry,
}

/// Data associated with a pointer event.
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    /// The window the event was reported on.
    pub id: XWindowID,
    /// The pointer position in root coordinates.
    pub abs: Point,
    /// The pointer position relative to the window.
    pub rel: Point,
}

/// A client message carrying 32-bit data.
#[derive(Debug, Clone, Copy)]
pub struct ClientMessageEvent {
    pub window: XWindowID,
    pub type_: XAtom,
    pub data: [u32; 5],
}
