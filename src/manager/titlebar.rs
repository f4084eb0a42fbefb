//! The title bar of a single decorated window.

use custom_debug_derive::Debug;

use tracing::{debug, trace};

use crate::core::{Geometry, Result, Size};
use crate::decoration::{DecorationState, Decorator, Surface};
use crate::x::{XConn, XWindowID};

/// A title bar window together with its surface and decorator.
///
/// The title bar owns everything about the decoration except how it
/// looks, which is delegated to its [`Decorator`]. It keeps the
/// [`DecorationState`] up to date and decides when to redraw.
///
/// Transparent pixels of a render, such as rounded corners, are cut
/// out of the window with a bounding shape, so they show what is
/// underneath without needing a compositor.
#[derive(Debug)]
pub struct TitleBar {
    window: XWindowID,
    state: DecorationState,
    surface: Option<Surface>,
    #[debug(skip)]
    shape: Option<Vec<Geometry>>,
    #[debug(skip)]
    decorator: Box<dyn Decorator>,
}

impl TitleBar {
    /// Creates a title bar drawing into `window`, allocating its surface.
    ///
    /// Nothing is drawn until the first call to `redraw`.
    pub fn new(
        conn: &dyn XConn,
        window: XWindowID,
        state: DecorationState,
        decorator: Box<dyn Decorator>,
    ) -> Result<Self> {
        let surface = Surface::allocate(conn, window, state.size)?;
        Ok(Self {
            window,
            state,
            surface,
            shape: None,
            decorator,
        })
    }

    pub fn window(&self) -> XWindowID {
        self.window
    }

    pub fn state(&self) -> &DecorationState {
        &self.state
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Replaces the decoration state.
    ///
    /// Returns whether anything changed. The surface is left as is,
    /// and is brought up to size on the next redraw if needed.
    pub fn update_state(&mut self, state: DecorationState) -> bool {
        if self.state == state {
            return false;
        }
        self.state = state;
        true
    }

    pub fn set_active(&mut self, active: bool) -> bool {
        let state = self.state.clone().with_active(active);
        self.update_state(state)
    }

    pub fn set_disabled(&mut self, disabled: bool) -> bool {
        let state = self.state.clone().with_disabled(disabled);
        self.update_state(state)
    }

    pub fn set_title<S: Into<String>>(&mut self, title: S) -> bool {
        let mut state = self.state.clone();
        state.title = title.into();
        self.update_state(state)
    }

    /// Changes the size of the title bar, reallocating its surface.
    pub fn resize(&mut self, conn: &dyn XConn, size: Size) -> Result<bool> {
        if self.state.size == size && self.surface.map(|s| s.size) == Some(size) {
            return Ok(false);
        }
        self.state.size = size;
        self.reallocate(conn)?;
        Ok(true)
    }

    /// Renders the current state and puts it on screen.
    ///
    /// If the surface turns out to be the wrong size for the render,
    /// it is reallocated and the render and transfer are tried once more.
    pub fn redraw(&mut self, conn: &dyn XConn) -> Result<()> {
        let Some(image) = self.decorator.render(&self.state) else {
            trace!("Nothing to draw for {}", self.window);
            return Ok(());
        };

        let surface = match self.surface {
            Some(surface) => surface,
            None => match self.reallocate(conn)? {
                Some(surface) => surface,
                None => return Ok(()),
            },
        };

        let region = image.opaque_region();
        match self.decorator.transfer(conn, image, &surface) {
            Err(e) if e.is_size_mismatch() => {
                debug!("{}, reallocating surface of {}", e, self.window);
                let Some(surface) = self.reallocate(conn)? else {
                    return Ok(());
                };
                let Some(image) = self.decorator.render(&self.state) else {
                    return Ok(());
                };
                let region = image.opaque_region();
                self.decorator.transfer(conn, image, &surface)?;
                self.apply_shape(conn, region)
            }
            Err(e) => Err(e),
            Ok(()) => self.apply_shape(conn, region),
        }
    }

    /// The bounding shape last applied to the window.
    pub fn shape(&self) -> Option<&[Geometry]> {
        self.shape.as_deref()
    }

    fn apply_shape(&mut self, conn: &dyn XConn, region: Vec<Geometry>) -> Result<()> {
        if self.shape.as_ref() == Some(&region) {
            return Ok(());
        }
        trace!("Shaping {} to {} rects", self.window, region.len());
        conn.set_shape(self.window, &region)?;
        self.shape = Some(region);
        Ok(())
    }

    /// Frees the title bar's surface.
    pub fn release(&mut self, conn: &dyn XConn) -> Result<()> {
        if let Some(surface) = self.surface.take() {
            surface.release(conn)?;
        }
        Ok(())
    }

    fn reallocate(&mut self, conn: &dyn XConn) -> Result<Option<Surface>> {
        self.surface = match self.surface.take() {
            Some(surface) => surface.reallocate(conn, self.state.size)?,
            None => Surface::allocate(conn, self.window, self.state.size)?,
        };
        Ok(self.surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point;
    use crate::decoration::{StyleFlags, ThemeDecorationRenderer};
    use crate::theme::{DefaultTheme, ThemeHandle};
    use crate::x::dummy::DummyConn;
    use crate::x::WindowClass;

    fn titlebar(conn: &DummyConn, size: Size) -> TitleBar {
        let win = conn
            .create_window(WindowClass::InputOutput(conn.get_root().id), Geometry::from_size(size))
            .unwrap();
        let state = DecorationState::new("xterm", StyleFlags::default(), size);
        let renderer = ThemeDecorationRenderer::new(ThemeHandle::new(DefaultTheme::default()));
        TitleBar::new(conn, win, state, Box::new(renderer)).unwrap()
    }

    #[test]
    fn test_redraw_transfers_render() {
        let conn = DummyConn::new();
        let mut bar = titlebar(&conn, Size::new(200, 24));

        bar.redraw(&conn).unwrap();

        let surface = *bar.surface().expect("surface");
        assert_eq!(conn.put_images(), 1);
        assert_eq!(conn.repaints(), vec![(bar.window(), surface.bounds())]);
    }

    #[test_log::test]
    fn test_redraw_recovers_from_size_mismatch() {
        let conn = DummyConn::new();
        let mut bar = titlebar(&conn, Size::new(200, 24));
        let old = bar.surface().unwrap().drawable;

        // the window grew, but nobody reallocated the surface
        let state = bar.state().clone().with_size(Size::new(260, 24));
        assert!(bar.update_state(state));

        bar.redraw(&conn).unwrap();

        let surface = *bar.surface().unwrap();
        assert_eq!(surface.size, Size::new(260, 24));
        assert!(conn.pixels(old).is_none());
        assert_eq!(conn.pixmap_count(), 1);
        assert_eq!(conn.put_images(), 1);
    }

    #[test]
    fn test_degenerate_titlebar_draws_nothing() {
        let conn = DummyConn::new();
        let mut bar = titlebar(&conn, Size::new(0, 24));

        assert!(bar.surface().is_none());
        bar.redraw(&conn).unwrap();

        assert_eq!(conn.put_images(), 0);
        assert!(conn.repaints().is_empty());

        // once it has a size, it gets a surface
        bar.resize(&conn, Size::new(100, 24)).unwrap();
        bar.redraw(&conn).unwrap();
        assert_eq!(conn.put_images(), 1);
    }

    #[test]
    fn test_unchanged_state_is_not_an_update() {
        let conn = DummyConn::new();
        let mut bar = titlebar(&conn, Size::new(200, 24));

        assert!(!bar.set_active(false));
        assert!(bar.set_active(true));
        assert!(!bar.set_title("xterm"));
        assert!(!bar.resize(&conn, Size::new(200, 24)).unwrap());
    }

    #[test]
    fn test_release_frees_surface() {
        let conn = DummyConn::new();
        let mut bar = titlebar(&conn, Size::new(200, 24));

        bar.release(&conn).unwrap();
        assert_eq!(conn.pixmap_count(), 0);
        assert!(bar.surface().is_none());
    }

    #[test]
    fn test_rounded_corners_are_shaped_out() {
        let conn = DummyConn::new();
        let mut bar = titlebar(&conn, Size::new(200, 24));

        bar.redraw(&conn).unwrap();

        let shape = conn.shape(bar.window()).expect("shape");
        let covers = |x, y| shape.iter().any(|g| g.contains_point(Point::new(x, y)));
        assert!(!covers(0, 0));
        assert!(!covers(199, 0));
        assert!(covers(100, 0));
        assert!(covers(0, 23));
        assert!(covers(199, 23));

        // same outline, no new request
        assert!(bar.set_title("xterm - vim"));
        bar.redraw(&conn).unwrap();
        assert_eq!(conn.shapes(), 1);

        bar.resize(&conn, Size::new(300, 24)).unwrap();
        bar.redraw(&conn).unwrap();
        assert_eq!(conn.shapes(), 2);
        assert_eq!(bar.shape().map(|s| s.to_vec()), conn.shape(bar.window()));
    }
}
