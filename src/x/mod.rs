//! Types and traits providing a unified interface with the X server.
//!
//! This module provides toaru-deco's interface to the X server.
//! The core of this module is the `XConn` trait, which defines the
//! primitives the decoration renderer and the snap preview overlay
//! need from the display connection: window and pixmap handles,
//! screen geometry, image upload and repaint scheduling.
//!
//! A concrete implementation backed by the `x11rb` library lives
//! in the [`x11rb`](self::x11rb) submodule.
//!
//! ## Connection Object Initialization
//!
//! `X11RBConn` has two states: unitialized, and initialized, marked
//! in its type constructor. Uninitialized connections have only
//! established a connection to the server, and have not interned
//! atoms or looked up the visuals and graphics contexts needed to
//! safely call any of their methods. Thus, `XConn` is only implemented
//! for initialized connections, and users will have to call the
//! `init` method for a Connection object to be usable.

pub mod atom;
pub mod core;
pub mod event;

/// Implementation of `XConn` backed by the `x11rb` library.
pub mod x11rb;

#[doc(inline)]
pub use self::core::{Property, Result, WindowClass, XAtom, XConn, XError, XWindow, XWindowID};
#[doc(inline)]
pub use atom::{Atom, Atoms};
#[doc(inline)]
pub use event::XEvent;

#[doc(inline)]
pub use self::x11rb::X11RBConn;
#[doc(inline)]
pub use status::ConnStatus;
#[doc(inline)]
pub use status::{Initialized, Uninitialized};

/* since xconn implementations can only be tested
on a system with an X server running, disable this
unless we specifically enable the `protocol` cfg flag
which should only be be used if testing locally */
#[cfg(all(test, protocol))]
mod tests;

/* since the dummy connection is used for testing
higher-level code and does not actually interact with
an actual X server, keep this enabled for standard testing */
#[cfg(test)]
pub(crate) mod dummy;

pub mod status {
    //! Types for representing connection status.
    //!
    //! This module contains the [`ConnStatus`] sealed trait,
    //! as well as its two implementors, [`Initialized`] and
    //! [`Uninitialized`]. These are used to mark the state of
    //! the connection object, and act as guards to only
    //! expose [`XConn`](crate::x::XConn) methods when safe
    //! to do so.
    mod private {
        pub trait Sealed {}
    }

    /// A trait defining marker types `Unitialized` and `Initialized`.
    pub trait ConnStatus: private::Sealed {}

    /// A marker struct indicating a connection is uninitialized.
    ///
    /// Uninitialized connections do not expose any methods.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Uninitialized;

    impl ConnStatus for Uninitialized {}
    impl private::Sealed for Uninitialized {}

    /// A marker type indicating a connection is initialized and can be used.
    ///
    /// Initialized connections expose all available methods.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Initialized;

    impl ConnStatus for Initialized {}
    impl private::Sealed for Initialized {}
}
