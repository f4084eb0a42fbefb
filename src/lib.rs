//! Themed title bars and snap previews for X11 window managers.
//!
//! toaru-deco draws the title bars of decorated windows through a
//! swappable [theme engine](theme::ThemeEngine), and shows a
//! translucent [preview](overlay::SnapPreviewOverlay) of where a
//! dragged window will snap to. Both draw through the [`XConn`]
//! trait, so they can run on any connection to the X server.
//!
//! The easiest way in is the [`DecorationManager`], which owns the
//! connection and every decorated window.

#[macro_use]
extern crate bitflags;

pub mod core;
pub mod decoration;
pub mod log;
pub mod manager;
pub mod overlay;
pub mod theme;
pub mod x;

pub(crate) mod util;

pub use crate::core::types;
pub use crate::core::{DecoError, Result};
pub use crate::log::{DefaultErrorHandler, ErrorHandler};
pub use crate::manager::{Config, DecorationManager};
pub use crate::x::core::Result as XResult;
pub use crate::x::XConn;

use crate::manager::config::NO_CHECKS;
use crate::x::x11rb::X11RBConn;
use crate::x::Initialized;

/// Convenience function for creating a x11rb-backed DecorationManager.
///
/// The config is validated before connecting to the server.
pub fn x11rb_backed_manager(config: Config) -> Result<DecorationManager<X11RBConn<Initialized>>> {
    config.validate(NO_CHECKS)?;
    let conn = X11RBConn::connect()?.init()?;

    Ok(DecorationManager::new(conn, config))
}
