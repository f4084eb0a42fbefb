//! The snap preview shown while a window is being dragged.
//!
//! While the user drags a window towards a screen edge, the drag
//! handling code computes where the window would land if released,
//! and hands that rectangle to the [`SnapPreviewOverlay`], which
//! shows it as a translucent rectangle above everything else.
//!
//! There is only ever one overlay, since only one drag can be in
//! flight at a time. It is owned by the [`DecorationManager`] and
//! shared through a [`SharedOverlay`] handle, and its window is only
//! created the first time a preview is shown.
//!
//! [`DecorationManager`]: crate::manager::DecorationManager

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, instrument, trace};

use crate::core::{Color, Geometry, Result};
use crate::util;
use crate::x::{Atom, Property, WindowClass, XConn, XWindowID};

/// A shared handle to the process' snap preview overlay.
pub type SharedOverlay = Rc<RefCell<SnapPreviewOverlay>>;

/// Whether the overlay is on screen, and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Hidden,
    Visible(Geometry),
}

/// How the overlay looks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// The fill colour of the preview.
    pub color: Color,
    /// The opacity of the whole window, from 0.0 to 1.0.
    pub opacity: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        OverlayStyle {
            color: Color::from_rgb(util::OVERLAY_COL),
            opacity: util::OVERLAY_OPACITY,
        }
    }
}

/// A translucent, click-through rectangle previewing where a
/// dragged window will snap to.
///
/// The overlay moves between two states: `Hidden` and `Visible(rect)`.
/// Showing a new rect while visible moves the window in place without
/// hiding it first, and showing the rect that is already up does
/// nothing at all, so it is fine to call [`show_preview`] on every
/// motion event.
///
/// Rects are clipped to the output they are on before use. The output
/// layout is queried once and cached until [`refresh_outputs`] is called.
///
/// [`refresh_outputs`]: SnapPreviewOverlay::refresh_outputs
/// [`show_preview`]: SnapPreviewOverlay::show_preview
#[derive(Debug)]
pub struct SnapPreviewOverlay {
    window: Option<XWindowID>,
    state: OverlayState,
    style: OverlayStyle,
    outputs: Vec<Geometry>,
    // the unclamped rect of the last request
    last_request: Option<Geometry>,
    reconfigurations: usize,
    hides: usize,
}

impl Default for SnapPreviewOverlay {
    fn default() -> Self {
        Self::new(OverlayStyle::default())
    }
}

impl SnapPreviewOverlay {
    pub fn new(style: OverlayStyle) -> Self {
        Self {
            window: None,
            state: OverlayState::Hidden,
            style,
            outputs: Vec::new(),
            last_request: None,
            reconfigurations: 0,
            hides: 0,
        }
    }

    /// Creates an overlay behind a shared handle.
    pub fn shared(style: OverlayStyle) -> SharedOverlay {
        Rc::new(RefCell::new(Self::new(style)))
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, OverlayState::Visible(_))
    }

    /// The overlay window, if it has been created yet.
    pub fn window(&self) -> Option<XWindowID> {
        self.window
    }

    pub fn style(&self) -> OverlayStyle {
        self.style
    }

    /// The cached output layout. Empty until first queried.
    pub fn outputs(&self) -> &[Geometry] {
        &self.outputs
    }

    /// Queries the output layout from the server again.
    ///
    /// Call this when a drag begins, and whenever the screen layout changes.
    pub fn refresh_outputs<X: XConn + ?Sized>(&mut self, conn: &X) -> Result<()> {
        self.outputs = conn.all_outputs()?;
        self.last_request = None;
        debug!("Got {} outputs", self.outputs.len());
        Ok(())
    }

    /// The number of times the overlay window has been moved or resized.
    pub fn reconfigurations(&self) -> usize {
        self.reconfigurations
    }

    /// The number of times a visible overlay has been hidden.
    pub fn hides(&self) -> usize {
        self.hides
    }

    /// Shows the preview at `rect`, or moves it there if already shown.
    ///
    /// A rect that lies entirely off screen hides the overlay instead.
    #[cfg_attr(
        debug_assertions,
        instrument(target = "overlay", level = "trace", skip(self, conn))
    )]
    pub fn show_preview<X: XConn + ?Sized>(&mut self, conn: &X, rect: Geometry) -> Result<()> {
        if self.last_request == Some(rect) {
            trace!("Preview already requested at {}", rect);
            return Ok(());
        }
        if self.outputs.is_empty() {
            self.refresh_outputs(conn)?;
        }

        let Some(clamped) = clamp_to_outputs(&self.outputs, rect) else {
            trace!("Preview {} is not on any output, hiding", rect);
            self.hide(conn)?;
            self.last_request = Some(rect);
            return Ok(());
        };
        self.place(conn, clamped)?;
        self.last_request = Some(rect);
        Ok(())
    }

    fn place<X: XConn + ?Sized>(&mut self, conn: &X, rect: Geometry) -> Result<()> {
        match (self.state, self.window) {
            (OverlayState::Visible(current), _) if current == rect => {
                trace!("Preview already at {}", rect);
                return Ok(());
            }
            (OverlayState::Visible(_), Some(window)) => {
                conn.configure_window(window, rect)?;
            }
            _ => {
                let window = self.ensure_window(conn, rect)?;
                conn.configure_window(window, rect)?;
                conn.raise_window(window)?;
                conn.map_window(window)?;
            }
        }

        self.reconfigurations += 1;
        self.state = OverlayState::Visible(rect);
        Ok(())
    }

    /// Hides the preview. Does nothing if it is not shown.
    pub fn hide<X: XConn + ?Sized>(&mut self, conn: &X) -> Result<()> {
        self.last_request = None;
        let OverlayState::Visible(_) = self.state else {
            trace!("Overlay already hidden");
            return Ok(());
        };

        if let Some(window) = self.window {
            conn.unmap_window(window)?;
        }
        self.hides += 1;
        self.state = OverlayState::Hidden;
        Ok(())
    }

    /// Destroys the overlay window.
    ///
    /// The overlay can still be used afterwards, and will create a new
    /// window the next time it is shown.
    pub fn destroy<X: XConn + ?Sized>(&mut self, conn: &X) -> Result<()> {
        self.state = OverlayState::Hidden;
        self.last_request = None;
        if let Some(window) = self.window.take() {
            debug!("Destroying overlay window {}", window);
            conn.destroy_window(window)?;
        }
        Ok(())
    }

    fn ensure_window<X: XConn + ?Sized>(&mut self, conn: &X, geom: Geometry) -> Result<XWindowID> {
        if let Some(window) = self.window {
            return Ok(window);
        }

        let window = conn.create_window(WindowClass::Overlay, geom)?;
        debug!("Created overlay window {}", window);

        let alpha = (self.style.opacity.clamp(0.0, 1.0) * 255.0) as u8;
        conn.set_background_color(window, self.style.color.with_alpha(alpha))?;
        conn.set_property(
            window,
            Atom::NetWmWindowOpacity,
            Property::Cardinal(util::opacity_cardinal(self.style.opacity)),
        )?;
        let dnd = conn.atom(Atom::NetWindowTypeDnd)?;
        conn.set_property(window, Atom::NetWmWindowType, Property::Atom(vec![dnd]))?;
        let above = conn.atom(Atom::NetWmStateAbove)?;
        conn.set_property(window, Atom::NetWmState, Property::Atom(vec![above]))?;
        conn.set_input_passthrough(window)?;

        self.window = Some(window);
        Ok(window)
    }
}

/// Clips `rect` to the output it is on.
///
/// The output containing the center of the rect wins, then the output
/// it overlaps the most. Returns None if the rect is degenerate or does
/// not touch any output.
pub fn clamp_to_outputs(outputs: &[Geometry], rect: Geometry) -> Option<Geometry> {
    if rect.is_degenerate() {
        return None;
    }

    let center = rect.center();
    let output = outputs.iter().find(|o| o.contains_point(center)).or_else(|| {
        outputs
            .iter()
            .filter_map(|o| o.intersect(&rect).map(|i| (o, i.size().area())))
            .max_by_key(|(_, area)| *area)
            .map(|(o, _)| o)
    })?;

    output.intersect(&rect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x::dummy::DummyConn;

    const SCREEN: Geometry = Geometry {
        x: 0,
        y: 0,
        height: 1080,
        width: 1920,
    };

    #[test_log::test]
    fn test_show_same_rect_is_reconfigured_once() {
        let conn = DummyConn::new();
        let mut overlay = SnapPreviewOverlay::default();
        let rect = Geometry::new(0, 0, 1080, 960);

        overlay.show_preview(&conn, rect).unwrap();
        overlay.show_preview(&conn, rect).unwrap();

        assert_eq!(overlay.reconfigurations(), 1);
        assert_eq!(conn.configures(), 1);
        assert_eq!(overlay.state(), OverlayState::Visible(rect));
    }

    #[test]
    fn test_hide_is_idempotent() {
        let conn = DummyConn::new();
        let mut overlay = SnapPreviewOverlay::default();

        overlay.hide(&conn).unwrap();
        overlay.hide(&conn).unwrap();
        assert_eq!(overlay.state(), OverlayState::Hidden);
        assert_eq!(overlay.hides(), 0);
        assert!(overlay.window().is_none());

        for rect in [SCREEN, Geometry::new(960, 0, 1080, 960)] {
            overlay.show_preview(&conn, rect).unwrap();
            overlay.hide(&conn).unwrap();
            overlay.hide(&conn).unwrap();
            assert_eq!(overlay.state(), OverlayState::Hidden);
        }
        assert_eq!(overlay.hides(), 2);
    }

    #[test_log::test]
    fn test_maximize_then_left_half_then_release() {
        let conn = DummyConn::new();
        let overlay = SnapPreviewOverlay::shared(OverlayStyle::default());
        let (left, _) = SCREEN.split_vertical();

        let mut states = vec![overlay.borrow().state()];

        overlay.borrow_mut().show_preview(&conn, SCREEN).unwrap();
        states.push(overlay.borrow().state());
        overlay.borrow_mut().show_preview(&conn, left).unwrap();
        states.push(overlay.borrow().state());
        overlay.borrow_mut().hide(&conn).unwrap();
        states.push(overlay.borrow().state());

        assert_eq!(
            states,
            vec![
                OverlayState::Hidden,
                OverlayState::Visible(SCREEN),
                OverlayState::Visible(left),
                OverlayState::Hidden,
            ]
        );
        assert_eq!(overlay.borrow().reconfigurations(), 2);
        assert_eq!(overlay.borrow().hides(), 1);
    }

    #[test]
    fn test_overlay_window_properties() {
        let conn = DummyConn::new();
        let mut overlay = SnapPreviewOverlay::default();

        overlay.show_preview(&conn, SCREEN).unwrap();

        let id = overlay.window().expect("overlay window");
        let window = conn.window(id).expect("window on server");
        assert_eq!(window.class, WindowClass::Overlay);
        assert!(window.mapped);
        assert!(window.passthrough);
        assert_eq!(window.geom, SCREEN);
        assert_eq!(
            window.props.get(&Atom::NetWmWindowOpacity),
            Some(&Property::Cardinal(util::opacity_cardinal(util::OVERLAY_OPACITY)))
        );
        assert_eq!(conn.raises(), 1);

        overlay.hide(&conn).unwrap();
        assert!(!conn.window(id).unwrap().mapped);
    }

    #[test]
    fn test_one_window_across_gestures() {
        let conn = DummyConn::new();
        let overlay = SnapPreviewOverlay::shared(OverlayStyle::default());
        let (left, right) = SCREEN.split_vertical();

        for _ in 0..5 {
            let mut overlay = overlay.borrow_mut();
            overlay.show_preview(&conn, left).unwrap();
            overlay.show_preview(&conn, right).unwrap();
            overlay.hide(&conn).unwrap();
        }

        assert_eq!(conn.windows_of(WindowClass::Overlay).len(), 1);
        assert_eq!(overlay.borrow().hides(), 5);
    }

    #[test]
    fn test_preview_is_clamped_to_screen() {
        let conn = DummyConn::new();
        let mut overlay = SnapPreviewOverlay::default();

        overlay
            .show_preview(&conn, Geometry::new(-100, 980, 200, 400))
            .unwrap();
        assert_eq!(
            overlay.state(),
            OverlayState::Visible(Geometry::new(0, 980, 100, 300))
        );

        // entirely off screen
        overlay
            .show_preview(&conn, Geometry::new(4000, 0, 100, 100))
            .unwrap();
        assert_eq!(overlay.state(), OverlayState::Hidden);
        assert_eq!(overlay.hides(), 1);
    }

    #[test]
    fn test_degenerate_preview_from_hidden_creates_nothing() {
        let conn = DummyConn::new();
        let mut overlay = SnapPreviewOverlay::default();

        overlay
            .show_preview(&conn, Geometry::new(10, 10, 0, 300))
            .unwrap();

        assert_eq!(overlay.state(), OverlayState::Hidden);
        assert!(overlay.window().is_none());
        assert_eq!(overlay.reconfigurations(), 0);
    }

    #[test]
    fn test_clamp_picks_output_under_center() {
        let outputs = [
            Geometry::new(0, 0, 1080, 1920),
            Geometry::new(1920, 0, 1440, 2560),
        ];

        // mostly on the second output
        let rect = Geometry::new(1800, 100, 400, 600);
        assert_eq!(
            clamp_to_outputs(&outputs, rect),
            Some(Geometry::new(1920, 100, 400, 480))
        );

        // center below the first output, but overlapping it
        let rect = Geometry::new(100, 1000, 200, 200);
        assert_eq!(
            clamp_to_outputs(&outputs, rect),
            Some(Geometry::new(100, 1000, 80, 200))
        );
    }

    #[test]
    fn test_outputs_are_queried_once_per_drag() {
        let conn = DummyConn::new();
        let mut overlay = SnapPreviewOverlay::default();

        for x in 0..50 {
            overlay
                .show_preview(&conn, Geometry::new(x, 0, 1080, 960))
                .unwrap();
        }
        assert_eq!(conn.output_queries(), 1);

        // a repeated request is dropped before any clamping
        let configures = conn.configures();
        overlay
            .show_preview(&conn, Geometry::new(49, 0, 1080, 960))
            .unwrap();
        assert_eq!(conn.configures(), configures);
        assert_eq!(conn.output_queries(), 1);
    }

    #[test]
    fn test_refresh_picks_up_new_outputs() {
        let conn = DummyConn::new();
        let mut overlay = SnapPreviewOverlay::default();
        let rect = Geometry::new(1800, 0, 1080, 600);

        overlay.show_preview(&conn, rect).unwrap();
        assert_eq!(
            overlay.state(),
            OverlayState::Visible(Geometry::new(1800, 0, 1080, 120))
        );

        conn.set_outputs(vec![
            Geometry::new(0, 0, 1080, 1920),
            Geometry::new(1920, 0, 1080, 1920),
        ]);
        overlay.refresh_outputs(&conn).unwrap();
        overlay.show_preview(&conn, rect).unwrap();

        assert_eq!(overlay.outputs().len(), 2);
        assert_eq!(
            overlay.state(),
            OverlayState::Visible(Geometry::new(1920, 0, 1080, 480))
        );
    }

    #[test]
    fn test_extreme_rects_do_not_overflow() {
        let conn = DummyConn::new();
        let mut overlay = SnapPreviewOverlay::default();

        overlay
            .show_preview(&conn, Geometry::new(100, 0, 100, i32::MAX))
            .unwrap();
        assert_eq!(
            overlay.state(),
            OverlayState::Visible(Geometry::new(100, 0, 100, 1820))
        );

        overlay
            .show_preview(&conn, Geometry::new(i32::MAX, i32::MAX, i32::MAX, i32::MAX))
            .unwrap();
        assert_eq!(overlay.state(), OverlayState::Hidden);

        overlay
            .show_preview(&conn, Geometry::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX))
            .unwrap();
        assert_eq!(overlay.state(), OverlayState::Hidden);

        overlay
            .show_preview(&conn, Geometry::new(-10, -10, i32::MAX, i32::MAX))
            .unwrap();
        assert_eq!(overlay.state(), OverlayState::Visible(SCREEN));
    }

    #[test]
    fn test_destroy_releases_window() {
        let conn = DummyConn::new();
        let mut overlay = SnapPreviewOverlay::default();

        overlay.show_preview(&conn, SCREEN).unwrap();
        let id = overlay.window().unwrap();
        overlay.destroy(&conn).unwrap();

        assert!(conn.window(id).is_none());
        assert_eq!(overlay.state(), OverlayState::Hidden);

        overlay.show_preview(&conn, SCREEN).unwrap();
        assert_ne!(overlay.window(), Some(id));
    }
}
