//! Copying rendered images onto on-screen surfaces.

use tracing::{trace, warn};

use super::RasterImage;
use crate::core::{DecoError, Geometry, Result, Size};
use crate::x::{XConn, XWindowID};

/// The on-screen drawable of a decorated window.
///
/// The drawable is a pixmap installed as the window's background, so
/// the server repaints the window from it on every exposure without
/// involving us. The surface is sized by its owner, never by a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    /// The window displaying the surface.
    pub window: XWindowID,
    /// The pixmap holding the surface's pixels.
    pub drawable: XWindowID,
    /// The allocated size of the pixmap.
    pub size: Size,
}

impl Surface {
    /// Allocates a pixmap of `size` and installs it as the background of `window`.
    ///
    /// Returns None if `size` is degenerate.
    pub fn allocate<X: XConn + ?Sized>(conn: &X, window: XWindowID, size: Size) -> Result<Option<Surface>> {
        if size.is_degenerate() {
            trace!("Not allocating degenerate surface {} for {}", size, window);
            return Ok(None);
        }

        let drawable = conn.create_pixmap(size)?;
        conn.set_background_pixmap(window, drawable)?;
        trace!("Allocated surface {} of size {} for {}", drawable, size, window);

        Ok(Some(Surface {
            window,
            drawable,
            size,
        }))
    }

    /// Replaces the surface's pixmap with one of a new size.
    ///
    /// Returns None, having released the old pixmap, if `size` is degenerate.
    pub fn reallocate<X: XConn + ?Sized>(self, conn: &X, size: Size) -> Result<Option<Surface>> {
        let window = self.window;
        let new = Surface::allocate(conn, window, size)?;
        self.release(conn)?;
        Ok(new)
    }

    /// Frees the surface's pixmap.
    pub fn release<X: XConn + ?Sized>(self, conn: &X) -> Result<()> {
        conn.free_pixmap(self.drawable)?;
        Ok(())
    }

    pub fn bounds(&self) -> Geometry {
        Geometry::from_size(self.size)
    }
}

/// Copies `image` onto `target` at its origin and schedules a repaint.
///
/// The image is consumed. If its size does not match the surface,
/// nothing is written and [`DecoError::SizeMismatch`] is returned.
pub fn transfer<X: XConn + ?Sized>(conn: &X, image: RasterImage, target: &Surface) -> Result<()> {
    if image.size() != target.size {
        return Err(DecoError::SizeMismatch {
            image: image.size(),
            surface: target.size,
        });
    }

    conn.put_image(target.drawable, &image)?;

    if let Err(e) = conn.schedule_repaint(target.window, target.bounds()) {
        warn!("Could not schedule repaint of {}: {}", target.window, e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;
    use crate::x::dummy::DummyConn;
    use crate::x::WindowClass;

    fn setup(conn: &DummyConn, size: Size) -> Surface {
        let win = conn
            .create_window(WindowClass::InputOutput(conn.get_root().id), Geometry::from_size(size))
            .unwrap();
        Surface::allocate(conn, win, size).unwrap().expect("surface")
    }

    #[test]
    fn test_transfer_copies_and_repaints() {
        let conn = DummyConn::new();
        let size = Size::new(40, 10);
        let surface = setup(&conn, size);

        let image = RasterImage::new(size, Color::from_rgb(0x123456)).unwrap();
        let expected: Vec<u32> = image.colors().map(|c| c.as_u32()).collect();

        transfer(&conn, image, &surface).expect("transfer");

        assert_eq!(conn.pixels(surface.drawable).as_deref(), Some(&expected[..]));
        assert_eq!(conn.repaints(), vec![(surface.window, surface.bounds())]);
    }

    #[test]
    fn test_transfer_size_mismatch_leaves_surface() {
        let conn = DummyConn::new();
        let surface = setup(&conn, Size::new(40, 10));
        let before = conn.pixels(surface.drawable);

        let image = RasterImage::new(Size::new(41, 10), Color::WHITE).unwrap();
        let err = transfer(&conn, image, &surface).unwrap_err();

        assert!(err.is_size_mismatch());
        assert_eq!(conn.pixels(surface.drawable), before);
        assert!(conn.repaints().is_empty());
        assert_eq!(conn.put_images(), 0);
    }

    #[test]
    fn test_degenerate_surface_is_not_allocated() {
        let conn = DummyConn::new();
        let root = conn.get_root().id;

        assert!(Surface::allocate(&conn, root, Size::new(0, 24)).unwrap().is_none());
        assert_eq!(conn.pixmap_count(), 0);
    }

    #[test]
    fn test_reallocate_frees_old_pixmap() {
        let conn = DummyConn::new();
        let surface = setup(&conn, Size::new(40, 10));
        let old = surface.drawable;

        let new = surface.reallocate(&conn, Size::new(80, 10)).unwrap().expect("surface");

        assert_ne!(new.drawable, old);
        assert!(conn.pixels(old).is_none());
        assert_eq!(conn.pixmap_count(), 1);
        assert_eq!(conn.background_pixmap(new.window), Some(new.drawable));
    }
}
