//! The top-level decoration context.
//!
//! The [`DecorationManager`] owns the connection to the X server and
//! all the process-wide pieces of toaru-deco: the theme handle, the
//! snap preview overlay and the title bars of every decorated window.
//! Events are fed into it in the order they are delivered, and it
//! routes them to the title bars and the overlay.

use std::collections::HashMap;

use tracing::{debug, instrument, trace, warn};

pub mod config;
pub mod titlebar;

#[doc(inline)]
pub use config::Config;
#[doc(inline)]
pub use titlebar::TitleBar;

use crate::core::{DecoError, Geometry, Result, Size};
use crate::decoration::{renderer::Fallback, DecorationState, StyleFlags, ThemeDecorationRenderer};
use crate::log::{DefaultErrorHandler, ErrorHandler};
use crate::overlay::{OverlayState, SharedOverlay, SnapPreviewOverlay};
use crate::theme::{DefaultTheme, ThemeEngine, ThemeHandle};
use crate::x::{event::ConfigureEvent, WindowClass, XConn, XEvent, XWindowID};

/// The main decoration object that receives and responds to events.
///
/// Title bars are keyed by the client window they decorate. Each one is
/// a child window of its client, spanning its width at the top.
pub struct DecorationManager<X: XConn> {
    conn: X,
    config: Config,
    theme: ThemeHandle,
    overlay: SharedOverlay,
    titlebars: HashMap<XWindowID, TitleBar>,
    focused: Option<XWindowID>,
    dragging: bool,
    ehandler: Box<dyn ErrorHandler>,
}

impl<X: XConn> DecorationManager<X> {
    /// Creates a new manager with the built-in theme configured from `config`.
    pub fn new(conn: X, config: Config) -> Self {
        let theme = ThemeHandle::new(DefaultTheme::from_config(&config));
        let overlay = SnapPreviewOverlay::shared(config.overlay_style());
        Self::with_shared(conn, config, theme, overlay)
    }

    /// Creates a new manager around an existing theme and overlay.
    pub fn with_shared(conn: X, config: Config, theme: ThemeHandle, overlay: SharedOverlay) -> Self {
        Self {
            conn,
            config,
            theme,
            overlay,
            titlebars: HashMap::new(),
            focused: None,
            dragging: false,
            ehandler: Box::new(DefaultErrorHandler),
        }
    }

    /// Sets the handler for errors raised while handling events.
    pub fn set_error_handler<E: ErrorHandler + 'static>(&mut self, handler: E) {
        self.ehandler = Box::new(handler);
    }

    pub fn conn(&self) -> &X {
        &self.conn
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A handle to the current theme.
    pub fn theme(&self) -> ThemeHandle {
        self.theme.clone()
    }

    /// A handle to the snap preview overlay.
    pub fn overlay(&self) -> SharedOverlay {
        self.overlay.clone()
    }

    pub fn titlebar(&self, client: XWindowID) -> Option<&TitleBar> {
        self.titlebars.get(&client)
    }

    pub fn focused(&self) -> Option<XWindowID> {
        self.focused
    }

    pub fn is_managed(&self, client: XWindowID) -> bool {
        self.titlebars.contains_key(&client)
    }

    /// Decorates `client`, returning the id of its new title bar window.
    #[cfg_attr(
        debug_assertions,
        instrument(target = "manager", level = "debug", skip(self, title))
    )]
    pub fn manage(
        &mut self,
        client: XWindowID,
        title: &str,
        flags: StyleFlags,
        width: i32,
    ) -> Result<XWindowID> {
        if let Some(bar) = self.titlebars.get(&client) {
            trace!("{} is already decorated", client);
            return Ok(bar.window());
        }

        let size = Size::new(width, self.config.titlebar_height);
        let window = self.conn.create_window(
            WindowClass::InputOutput(client),
            Geometry::new(0, 0, size.height.max(1), size.width.max(1)),
        )?;

        let bar = match self.build_titlebar(window, title, flags, size) {
            Ok(bar) => bar,
            Err(e) => {
                if let Err(err) = self.conn.destroy_window(window) {
                    warn!("Could not destroy title bar {}: {}", window, err);
                }
                return Err(e);
            }
        };

        debug!("Decorated {} with title bar {}", client, window);
        self.titlebars.insert(client, bar);
        Ok(window)
    }

    /// Creates, draws and maps the title bar in `window`.
    ///
    /// The surface is released again if anything after allocating it fails.
    fn build_titlebar(
        &self,
        window: XWindowID,
        title: &str,
        flags: StyleFlags,
        size: Size,
    ) -> Result<TitleBar> {
        let fallback = Fallback {
            focused: self.config.focused,
            unfocused: self.config.unfocused,
            disabled: self.config.disabled,
        };
        let renderer = ThemeDecorationRenderer::with_fallback(self.theme.clone(), fallback);
        let state = DecorationState::new(title, flags, size);
        let mut bar = TitleBar::new(&self.conn, window, state, Box::new(renderer))?;

        let shown = bar
            .redraw(&self.conn)
            .and_then(|()| self.conn.map_window(window).map_err(DecoError::from));
        if let Err(e) = shown {
            if let Err(err) = bar.release(&self.conn) {
                warn!("Could not free surface of {}: {}", window, err);
            }
            return Err(e);
        }
        Ok(bar)
    }

    /// Removes the decoration of `client`, destroying its title bar.
    ///
    /// The surface and the window are both released even if one fails,
    /// and the first error is returned.
    pub fn unmanage(&mut self, client: XWindowID) -> Result<()> {
        let mut bar = self
            .titlebars
            .remove(&client)
            .ok_or(DecoError::UnknownWindow(client))?;

        if self.focused == Some(client) {
            self.focused = None;
        }
        let released = bar.release(&self.conn);
        let destroyed = self.conn.destroy_window(bar.window()).map_err(DecoError::from);
        released.and(destroyed)
    }

    /// Gives `client` the active title bar, deactivating the previous one.
    pub fn focus(&mut self, client: XWindowID) -> Result<()> {
        if self.focused == Some(client) {
            trace!("{} is already focused", client);
            return Ok(());
        }
        if !self.is_managed(client) {
            return Err(DecoError::UnknownWindow(client));
        }

        if let Some(prev) = self.focused.take() {
            self.update(prev, |bar| bar.set_active(false))?;
        }
        self.update(client, |bar| bar.set_active(true))?;
        self.focused = Some(client);
        Ok(())
    }

    /// Marks `client` as having lost focus.
    pub fn unfocus(&mut self, client: XWindowID) -> Result<()> {
        if self.focused == Some(client) {
            self.focused = None;
        }
        self.update(client, |bar| bar.set_active(false))
    }

    pub fn set_title(&mut self, client: XWindowID, title: &str) -> Result<()> {
        self.update(client, |bar| bar.set_title(title))
    }

    /// Marks `client` as blocked from interaction, or not.
    pub fn set_disabled(&mut self, client: XWindowID, disabled: bool) -> Result<()> {
        self.update(client, |bar| bar.set_disabled(disabled))
    }

    /// Resizes the title bar of `client` to a new width.
    pub fn resize(&mut self, client: XWindowID, width: i32) -> Result<()> {
        let height = self.config.titlebar_height;
        let bar = self
            .titlebars
            .get_mut(&client)
            .ok_or(DecoError::UnknownWindow(client))?;

        if bar.resize(&self.conn, Size::new(width, height))? {
            if width > 0 {
                self.conn
                    .configure_window(bar.window(), Geometry::new(0, 0, height, width))?;
            }
            bar.redraw(&self.conn)?;
        }
        Ok(())
    }

    /// Installs a new theme and redraws every title bar with it.
    pub fn set_theme<T: ThemeEngine + 'static>(&mut self, theme: T) -> Result<()> {
        self.theme.swap(theme);
        self.redraw_all()
    }

    /// Removes the current theme, so title bars are drawn with flat colours.
    pub fn unload_theme(&mut self) -> Result<()> {
        self.theme.unload();
        self.redraw_all()
    }

    pub fn redraw(&mut self, client: XWindowID) -> Result<()> {
        self.titlebars
            .get_mut(&client)
            .ok_or(DecoError::UnknownWindow(client))?
            .redraw(&self.conn)
    }

    /// Redraws every title bar.
    ///
    /// All title bars are attempted, and the first error is returned.
    pub fn redraw_all(&mut self) -> Result<()> {
        let mut res = Ok(());
        for bar in self.titlebars.values_mut() {
            if let Err(e) = bar.redraw(&self.conn) {
                if res.is_ok() {
                    res = Err(e);
                }
            }
        }
        res
    }

    /// Notes the start of a drag gesture, reading the output layout.
    pub fn begin_drag(&mut self) -> Result<()> {
        let mut overlay = self.overlay.borrow_mut();
        if overlay.is_visible() {
            warn!("Drag started with the previous snap preview still visible");
        }
        overlay.refresh_outputs(&self.conn)?;
        self.dragging = true;
        Ok(())
    }

    /// The output layout as of the last drag or screen change.
    pub fn outputs(&self) -> Vec<Geometry> {
        self.overlay.borrow().outputs().to_vec()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Updates the snap preview for a drag motion.
    ///
    /// `candidate` is where the window would snap to if released now,
    /// or None if it would not snap.
    pub fn drag_motion(&mut self, candidate: Option<Geometry>) -> Result<()> {
        if !self.dragging {
            trace!("Ignoring drag motion outside of a drag");
            return Ok(());
        }
        let mut overlay = self.overlay.borrow_mut();
        match candidate {
            Some(rect) => overlay.show_preview(&self.conn, rect),
            None => overlay.hide(&self.conn),
        }
    }

    /// Ends the drag, returning the geometry the window should snap to.
    pub fn end_drag(&mut self) -> Result<Option<Geometry>> {
        self.dragging = false;
        let mut overlay = self.overlay.borrow_mut();
        let target = match overlay.state() {
            OverlayState::Visible(rect) => Some(rect),
            OverlayState::Hidden => None,
        };
        overlay.hide(&self.conn)?;
        Ok(target)
    }

    /// Abandons the drag without snapping.
    pub fn cancel_drag(&mut self) -> Result<()> {
        self.dragging = false;
        self.overlay.borrow_mut().hide(&self.conn)
    }

    /// Responds to an event from the X server.
    ///
    /// Errors are passed to the error handler.
    pub fn handle_event(&mut self, event: XEvent) {
        let res = match event {
            XEvent::FocusIn(id) if self.is_managed(id) => self.focus(id),
            XEvent::FocusOut(id) if self.is_managed(id) => {
                let cancelled = if self.dragging {
                    self.cancel_drag()
                } else {
                    Ok(())
                };
                cancelled.and(self.unfocus(id))
            }
            XEvent::ConfigureNotify(ConfigureEvent { id, geom }) if self.is_managed(id) => {
                self.resize(id, geom.width)
            }
            XEvent::DestroyNotify(id) if self.is_managed(id) => self.unmanage(id),
            XEvent::FocusOut(_) if self.dragging => self.cancel_drag(),
            XEvent::ScreenChange => {
                debug!("Screen layout changed");
                self.overlay.borrow_mut().refresh_outputs(&self.conn)
            }
            XEvent::Expose(ev) => {
                // title bars repaint from their background pixmap
                trace!("Expose on {} ({} more)", ev.id, ev.count);
                Ok(())
            }
            other => {
                trace!("Unhandled event {:?}", other);
                Ok(())
            }
        };

        if let Err(e) = res {
            self.ehandler.call(e);
        }
    }

    /// Releases all title bars and the overlay.
    ///
    /// Everything is attempted, and the first error is returned.
    pub fn shutdown(&mut self) -> Result<()> {
        let mut res = Ok(());
        let clients: Vec<XWindowID> = self.titlebars.keys().copied().collect();
        for client in clients {
            if let Err(e) = self.unmanage(client) {
                warn!("Could not release title bar of {}: {}", client, e);
                if res.is_ok() {
                    res = Err(e);
                }
            }
        }
        let destroyed = self.overlay.borrow_mut().destroy(&self.conn);
        let flushed = self.conn.flush().map_err(DecoError::from);
        res.and(destroyed).and(flushed)
    }

    /// Applies `f` to the title bar of `client`, redrawing it if it changed.
    fn update<F>(&mut self, client: XWindowID, f: F) -> Result<()>
    where
        F: FnOnce(&mut TitleBar) -> bool,
    {
        let bar = self
            .titlebars
            .get_mut(&client)
            .ok_or(DecoError::UnknownWindow(client))?;

        if f(bar) {
            bar.redraw(&self.conn)
        } else {
            trace!("Title bar of {} unchanged", client);
            Ok(())
        }
    }
}
