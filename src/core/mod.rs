//! This module contains the core types used within toaru-deco.
//! It contains the geometric and colour primitives shared by
//! the decoration renderer and the snap preview overlay.

/// Basic types used throughout toaru-deco.
pub mod types;

pub use types::{Color, DecoError, Geometry, Point, Result, Size};
