//! Basic types used throughout toaru-deco.

use std::fmt;

use thiserror::Error;

use crate::theme::ThemeError;
use crate::x::XError;

pub type Result<T> = ::core::result::Result<T, DecoError>;

/// Errors that can surface from the decoration core.
///
/// Degenerate geometry and redundant calls are expected races
/// in an interactive session and are absorbed where they occur,
/// so they never show up here.
#[derive(Debug, Error, Clone)]
pub enum DecoError {
    /// The image handed to a transfer is not the size of
    /// the surface it is being copied onto.
    ///
    /// The surface needs to be reallocated before retrying.
    #[error("Image of size {image} does not fit surface of size {surface}")]
    SizeMismatch { image: Size, surface: Size },
    /// A theme engine query failed.
    #[error("Theme error: {0}")]
    Theme(#[from] ThemeError),
    /// The display connection returned an error.
    #[error("X connection error: {0}")]
    X(#[from] XError),
    /// The given window is not decorated by us.
    #[error("Window {0} is not managed")]
    UnknownWindow(u32),
    /// A configuration value is out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl DecoError {
    /// Whether the error can be recovered from by reallocating
    /// the target surface and retrying.
    pub fn is_size_mismatch(&self) -> bool {
        matches!(self, Self::SizeMismatch { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The dimensions of a drawable region.
///
/// Sizes are signed so that the transient negative sizes
/// produced during resize races can be represented and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Returns true if either dimension is zero or negative.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// The number of pixels covered, or zero if degenerate.
    pub fn area(&self) -> usize {
        if self.is_degenerate() {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A rectangle in screen or drawable coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub height: i32,
    pub width: i32,
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry {
            x: 0,
            y: 0,
            height: 100,
            width: 160,
        }
    }
}

impl Geometry {
    pub fn new(x: i32, y: i32, height: i32, width: i32) -> Self {
        Self {
            x,
            y,
            height,
            width,
        }
    }

    pub fn zeroed() -> Self {
        Geometry {
            x: 0,
            y: 0,
            height: 0,
            width: 0,
        }
    }

    /// Creates a Geometry anchored at the origin covering `size`.
    pub fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.height, size.width)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.size().is_degenerate()
    }

    /// The exclusive right edge, widened so it cannot overflow.
    #[inline]
    fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    #[inline]
    fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// The point at the center of the Geometry, rounded towards the origin.
    pub fn center(&self) -> Point {
        let cx = self.x as i64 + self.width as i64 / 2;
        let cy = self.y as i64 + self.height as i64 / 2;
        Point::new(saturate(cx), saturate(cy))
    }

    pub fn contains_point(&self, pt: Point) -> bool {
        pt.x >= self.x
            && (pt.x as i64) < self.right()
            && pt.y >= self.y
            && (pt.y as i64) < self.bottom()
    }

    /// Returns the overlapping region of two Geometries,
    /// or None if they do not overlap.
    pub fn intersect(&self, other: &Geometry) -> Option<Geometry> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 <= x1 as i64 || y2 <= y1 as i64 {
            return None;
        }

        // bounded by the smaller extent, so these fit
        Some(Geometry::new(
            x1,
            y1,
            saturate(y2 - y1 as i64),
            saturate(x2 - x1 as i64),
        ))
    }

    /// Shrinks the Geometry by `px` on every side.
    pub fn inset(&self, px: i32) -> Geometry {
        Geometry::new(
            self.x.saturating_add(px),
            self.y.saturating_add(px),
            self.height.saturating_sub(px.saturating_mul(2)),
            self.width.saturating_sub(px.saturating_mul(2)),
        )
    }

    /// Splits the Geometry vertically, returning the left and right halves.
    ///
    /// If the width is odd, the extra pixel goes to the right half.
    pub fn split_vertical(&self) -> (Geometry, Geometry) {
        let left = self.width / 2;
        (
            Geometry::new(self.x, self.y, self.height, left),
            Geometry::new(self.x.saturating_add(left), self.y, self.height, self.width - left),
        )
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x, self.y
        )
    }
}

/// An ARGB colour, stored as `0xAARRGGBB`.
///
/// This is the pixel layout of a raster image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    pub const BLACK: Color = Color(0xff00_0000);
    pub const WHITE: Color = Color(0xffff_ffff);

    /// Creates the Color from a 32-bit ARGB integer.
    pub const fn from_hex(hex: u32) -> Self {
        Self(hex)
    }

    /// Creates a fully opaque Color from a 24-bit RGB integer.
    pub const fn from_rgb(rgb: u32) -> Self {
        Self(0xff00_0000 | (rgb & 0x00ff_ffff))
    }

    /// Expresses the Color as a hex string.
    pub fn as_string(&self) -> String {
        format!("{:#010x}", self.as_u32())
    }

    /// Returns the (R, G, B, A) values of the Color as bytes.
    pub fn rgba(&self) -> (u8, u8, u8, u8) {
        let [a, r, g, b] = u32::to_be_bytes(self.0);
        (r, g, b, a)
    }

    pub fn alpha(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Returns the same colour with its alpha replaced.
    pub fn with_alpha(&self, alpha: u8) -> Color {
        Color((self.0 & 0x00ff_ffff) | ((alpha as u32) << 24))
    }

    /// Linearly interpolates towards `other` by `num / den`.
    ///
    /// Integer-only so the result is identical on every run.
    pub fn mix(&self, other: Color, num: u32, den: u32) -> Color {
        if den == 0 {
            return *self;
        }
        let num = num.min(den);
        let a = u32::to_be_bytes(self.0);
        let b = u32::to_be_bytes(other.0);
        let mut out = [0u8; 4];
        for i in 0..4 {
            let (x, y) = (a[i] as u32, b[i] as u32);
            out[i] = ((x * (den - num) + y * num) / den) as u8;
        }
        Color(u32::from_be_bytes(out))
    }

    /// Mixes the colour towards white by `pct` percent.
    pub fn lighten(&self, pct: u32) -> Color {
        self.mix(Color::WHITE.with_alpha(self.alpha()), pct, 100)
    }

    /// Mixes the colour towards black by `pct` percent.
    pub fn darken(&self, pct: u32) -> Color {
        self.mix(Color::BLACK.with_alpha(self.alpha()), pct, 100)
    }

    /// Composites `self` over `dst` using straight alpha.
    pub fn over(&self, dst: Color) -> Color {
        match self.alpha() {
            0xff => *self,
            0 => dst,
            a => {
                let src = u32::to_be_bytes(self.0);
                let bg = u32::to_be_bytes(dst.0);
                let a = a as u32;
                let da = bg[0] as u32;
                let out_a = a + da * (255 - a) / 255;
                let mut out = [out_a as u8, 0, 0, 0];
                if out_a > 0 {
                    for i in 1..4 {
                        let c = (src[i] as u32 * a + bg[i] as u32 * da * (255 - a) / 255) / out_a;
                        out[i] = c.min(255) as u8;
                    }
                }
                Color(u32::from_be_bytes(out))
            }
        }
    }

    /// Scales the colour channels by alpha, as 32-bit visuals expect.
    pub fn premultiplied(&self) -> Color {
        let a = self.alpha() as u32;
        let [_, r, g, b] = u32::to_be_bytes(self.0);
        let scale = |c: u8| (c as u32 * a / 255) as u8;
        Color(u32::from_be_bytes([a as u8, scale(r), scale(g), scale(b)]))
    }

    /// Returns the color as a u32.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Color {
    fn from(from: u32) -> Self {
        Self::from_hex(from)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_intersect() {
        let screen = Geometry::new(0, 0, 1080, 1920);

        let partial = Geometry::new(-100, 50, 200, 300);
        assert_eq!(
            screen.intersect(&partial),
            Some(Geometry::new(0, 50, 200, 200))
        );

        let outside = Geometry::new(2000, 0, 100, 100);
        assert_eq!(screen.intersect(&outside), None);

        // touching edges do not overlap
        let touching = Geometry::new(1920, 0, 100, 100);
        assert_eq!(screen.intersect(&touching), None);
    }

    #[test]
    fn test_geometry_extremes_saturate() {
        let huge = Geometry::new(100, 0, 100, i32::MAX);
        assert_eq!(huge.center(), Point::new(100 + i32::MAX / 2, 50));
        assert!(huge.contains_point(Point::new(i32::MAX - 1, 99)));
        assert!(!huge.contains_point(Point::new(99, 0)));

        let corner = Geometry::new(i32::MAX, i32::MAX, i32::MAX, i32::MAX);
        assert_eq!(corner.center(), Point::new(i32::MAX, i32::MAX));
        assert_eq!(corner.intersect(&huge), None);

        let everything = Geometry::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(
            everything.intersect(&Geometry::new(-20, -20, 10, 10)),
            Some(Geometry::new(-20, -20, 10, 10))
        );

        assert_eq!(
            huge.inset(i32::MAX),
            Geometry::new(i32::MAX, i32::MAX, i32::MIN + 101, 0)
        );
    }

    #[test]
    fn test_geometry_split() {
        let screen = Geometry::new(0, 0, 1080, 1921);
        let (l, r) = screen.split_vertical();

        assert_eq!(l, Geometry::new(0, 0, 1080, 960));
        assert_eq!(r, Geometry::new(960, 0, 1080, 961));
    }

    #[test]
    fn test_size_degenerate() {
        assert!(Size::new(0, 24).is_degenerate());
        assert!(Size::new(100, -1).is_degenerate());
        assert!(!Size::new(1, 1).is_degenerate());
        assert_eq!(Size::new(-5, 10).area(), 0);
    }

    #[test]
    fn test_color_mix() {
        let black = Color::BLACK;
        let white = Color::WHITE;

        assert_eq!(black.mix(white, 0, 10), black);
        assert_eq!(black.mix(white, 10, 10), white);
        assert_eq!(black.mix(white, 1, 2), Color::from_hex(0xff7f7f7f));
    }

    #[test]
    fn test_color_over() {
        let red = Color::from_rgb(0xff0000);
        let blue = Color::from_rgb(0x0000ff);

        // opaque source replaces
        assert_eq!(red.over(blue), red);
        // transparent source is ignored
        assert_eq!(Color::TRANSPARENT.over(blue), blue);

        let (r, _, b, a) = red.with_alpha(0x80).over(blue).rgba();
        assert_eq!(a, 0xff);
        assert!(r > 0x70 && b > 0x70);
    }

    #[test]
    fn test_color_premultiplied() {
        assert_eq!(Color::from_rgb(0x3c7fd8).premultiplied(), Color::from_rgb(0x3c7fd8));
        assert_eq!(Color::from_hex(0x80ff0000).premultiplied(), Color::from_hex(0x80800000));
        assert_eq!(Color::from_hex(0x00ffffff).premultiplied(), Color::TRANSPARENT);
    }
}
