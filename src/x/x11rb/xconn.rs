//! Implementation of the XConn trait for X11RBConn.

use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::{
    randr::ConnectionExt as RConnectionExt,
    shape::{self, ConnectionExt as ShapeConnectionExt},
    xfixes::ConnectionExt as XFixesConnectionExt,
    xproto::{
        self, ChangeWindowAttributesAux, ConfigureWindowAux, ConnectionExt as XConnectionExt,
        CreateWindowAux, EventMask, PropMode,
    },
};
use x11rb::wrapper::ConnectionExt as WrapperConnectionExt;

use tracing::instrument;
use tracing::{trace, warn};

use super::convert::wire_geometry;
use super::{Initialized, X11RBConn};
use crate::core::{Color, Geometry, Size};
use crate::decoration::RasterImage;
use crate::x::{
    atom::Atom,
    core::{Property, Result, WindowClass, XAtom, XConn, XError, XWindow, XWindowID},
    event::XEvent,
};

// size of a PutImage request header in bytes
const PUT_IMAGE_HEADER: usize = 24;

impl XConn for X11RBConn<Initialized> {
    // General X server operations
    #[cfg_attr(debug_assertions, instrument(target = "xconn", level = "trace", skip(self)))]
    fn poll_next_event(&self) -> Result<Option<XEvent>> {
        self.conn.flush()?;

        let event = self.conn.wait_for_event()?;
        Ok(Some(self.process_raw_event(event)?))
    }

    fn flush(&self) -> Result<()> {
        self.conn.flush()?;
        Ok(())
    }

    fn get_root(&self) -> XWindow {
        self.root
    }

    #[cfg_attr(debug_assertions, instrument(target = "xconn", level = "trace", skip(self)))]
    fn all_outputs(&self) -> Result<Vec<Geometry>> {
        if !self.randr {
            return Ok(vec![self.root.geom]);
        }

        let res = match self
            .conn
            .randr_get_screen_resources_current(self.root.id)
            .map_err(XError::from)
            .and_then(|cookie| Ok(cookie.reply()?))
        {
            Ok(res) => res,
            Err(e) => {
                warn!("Could not query screen resources: {}, using root geometry", e);
                return Ok(vec![self.root.geom]);
            }
        };

        let outputs: Vec<Geometry> = res
            .crtcs
            .iter()
            // for each crtc, get its info
            .map(|c| {
                self.conn
                    .randr_get_crtc_info(*c, res.config_timestamp)
                    .map_err(XError::from)
                    .and_then(|cookie| Ok(cookie.reply()?))
            })
            .filter_map(|r| match r {
                Ok(info) => Some(info),
                Err(e) => {
                    warn!("Could not query crtc: {}", e);
                    None
                }
            })
            .map(|r| Geometry::new(r.x as i32, r.y as i32, r.height as i32, r.width as i32))
            // disabled crtcs have no size
            .filter(|g| !g.is_degenerate())
            .collect();

        if outputs.is_empty() {
            trace!("No active crtcs, using root geometry");
            Ok(vec![self.root.geom])
        } else {
            Ok(outputs)
        }
    }

    fn atom(&self, atom: Atom) -> Result<XAtom> {
        if let Some(known) = self.atoms.borrow().known(atom) {
            return Ok(known);
        }
        trace!("Interning atom {}", atom);
        let x = self
            .conn
            .intern_atom(false, atom.as_ref().as_bytes())?
            .reply()?
            .atom;
        self.atoms.borrow_mut().insert(atom.as_ref(), x);
        Ok(x)
    }

    // Window-related operations
    #[cfg_attr(debug_assertions, instrument(target = "xconn", level = "trace", skip(self)))]
    fn create_window(&self, ty: WindowClass, geom: Geometry) -> Result<XWindowID> {
        let (parent, class, depth, visual, aux) = match ty {
            WindowClass::InputOutput(parent) => (
                parent,
                xproto::WindowClass::INPUT_OUTPUT,
                x11rb::COPY_FROM_PARENT as u8,
                x11rb::COPY_FROM_PARENT,
                CreateWindowAux::new().event_mask(
                    EventMask::EXPOSURE
                        | EventMask::STRUCTURE_NOTIFY
                        | EventMask::FOCUS_CHANGE
                        | EventMask::BUTTON_PRESS
                        | EventMask::BUTTON_RELEASE
                        | EventMask::BUTTON_MOTION
                        | EventMask::KEY_PRESS,
                ),
            ),
            WindowClass::Overlay => {
                let aux = CreateWindowAux::new()
                    .override_redirect(1)
                    .border_pixel(0)
                    .background_pixel(0);
                match self.argb {
                    Some(argb) => (
                        self.root.id,
                        xproto::WindowClass::INPUT_OUTPUT,
                        32,
                        argb.visual,
                        aux.colormap(argb.colormap),
                    ),
                    None => (
                        self.root.id,
                        xproto::WindowClass::INPUT_OUTPUT,
                        x11rb::COPY_FROM_PARENT as u8,
                        x11rb::COPY_FROM_PARENT,
                        aux,
                    ),
                }
            }
        };

        let (x, y, width, height) = wire_geometry(geom);
        let wid = self.conn.generate_id()?;
        self.conn
            .create_window(depth, wid, parent, x, y, width, height, 0, class, visual, &aux)?
            .check()?;

        Ok(wid)
    }

    fn destroy_window(&self, window: XWindowID) -> Result<()> {
        self.conn.destroy_window(window)?;
        Ok(())
    }

    fn map_window(&self, window: XWindowID) -> Result<()> {
        self.conn.map_window(window)?;
        Ok(())
    }

    fn unmap_window(&self, window: XWindowID) -> Result<()> {
        self.conn.unmap_window(window)?;
        Ok(())
    }

    fn raise_window(&self, window: XWindowID) -> Result<()> {
        self.conn.configure_window(
            window,
            &ConfigureWindowAux::new().stack_mode(xproto::StackMode::ABOVE),
        )?;
        Ok(())
    }

    fn configure_window(&self, window: XWindowID, geom: Geometry) -> Result<()> {
        let (x, y, width, height) = wire_geometry(geom);
        self.conn.configure_window(
            window,
            &ConfigureWindowAux::new()
                .x(x as i32)
                .y(y as i32)
                .width(width as u32)
                .height(height as u32),
        )?;
        Ok(())
    }

    fn set_input_focus(&self, window: XWindowID) -> Result<()> {
        self.conn
            .set_input_focus(xproto::InputFocus::PARENT, window, x11rb::CURRENT_TIME)?;
        Ok(())
    }

    fn set_property(&self, window: XWindowID, prop: Atom, value: Property) -> Result<()> {
        let prop = self.atom(prop)?;
        match value {
            Property::Atom(atoms) => {
                self.conn.change_property32(
                    PropMode::REPLACE,
                    window,
                    prop,
                    xproto::AtomEnum::ATOM,
                    &atoms,
                )?;
            }
            Property::Cardinal(n) => {
                self.conn.change_property32(
                    PropMode::REPLACE,
                    window,
                    prop,
                    xproto::AtomEnum::CARDINAL,
                    &[n],
                )?;
            }
            Property::UTF8String(s) => {
                let ty = self.atom(Atom::UTF8String)?;
                self.conn
                    .change_property8(PropMode::REPLACE, window, prop, ty, s.as_bytes())?;
            }
        }
        Ok(())
    }

    fn set_background_color(&self, window: XWindowID, color: Color) -> Result<()> {
        let pixel = match self.argb {
            Some(_) => color.premultiplied().as_u32(),
            None => color.as_u32() & 0x00ffffff,
        };
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().background_pixel(pixel),
        )?;
        Ok(())
    }

    fn set_input_passthrough(&self, window: XWindowID) -> Result<()> {
        let region = self.conn.generate_id()?;
        self.conn.xfixes_create_region(region, &[])?;
        self.conn
            .xfixes_set_window_shape_region(window, shape::SK::INPUT, 0, 0, region)?;
        self.conn.xfixes_destroy_region(region)?;
        Ok(())
    }

    fn set_shape(&self, window: XWindowID, region: &[Geometry]) -> Result<()> {
        if !self.shape {
            trace!("No SHAPE extension, ignoring shape for {}", window);
            return Ok(());
        }
        let rects: Vec<xproto::Rectangle> = region
            .iter()
            .filter(|g| !g.is_degenerate())
            .map(|g| {
                let (x, y, width, height) = wire_geometry(*g);
                xproto::Rectangle { x, y, width, height }
            })
            .collect();
        self.conn.shape_rectangles(
            shape::SO::SET,
            shape::SK::BOUNDING,
            xproto::ClipOrdering::UNSORTED,
            window,
            0,
            0,
            &rects,
        )?;
        Ok(())
    }

    // Drawable-related operations
    fn create_pixmap(&self, size: Size) -> Result<XWindowID> {
        if size.is_degenerate() || size.width > u16::MAX as i32 || size.height > u16::MAX as i32 {
            return Err(XError::RequestError("pixmap size out of range"));
        }
        let pid = self.conn.generate_id()?;
        self.conn
            .create_pixmap(
                self.root_depth,
                pid,
                self.root.id,
                size.width as u16,
                size.height as u16,
            )?
            .check()?;
        Ok(pid)
    }

    fn free_pixmap(&self, pixmap: XWindowID) -> Result<()> {
        self.conn.free_pixmap(pixmap)?;
        Ok(())
    }

    fn set_background_pixmap(&self, window: XWindowID, pixmap: XWindowID) -> Result<()> {
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().background_pixmap(pixmap),
        )?;
        Ok(())
    }

    /// Uploads the image in horizontal strips that each fit in a single request.
    #[cfg_attr(
        debug_assertions,
        instrument(target = "xconn", level = "trace", skip(self, image), fields(size = %image.size()))
    )]
    fn put_image(&self, drawable: XWindowID, image: &RasterImage) -> Result<()> {
        let stride = image.width() as usize * 4;
        let max = self.conn.maximum_request_bytes();
        let rows = (max.saturating_sub(PUT_IMAGE_HEADER) / stride).max(1) as i32;

        let mut first = 0;
        while first < image.height() {
            let count = rows.min(image.height() - first);
            let data = image.rows_to_le_bytes(first, count);
            self.conn.put_image(
                xproto::ImageFormat::Z_PIXMAP,
                drawable,
                self.gc,
                image.width() as u16,
                count as u16,
                0,
                first as i16,
                0,
                self.root_depth,
                &data,
            )?;
            first += count;
        }

        Ok(())
    }

    fn schedule_repaint(&self, window: XWindowID, area: Geometry) -> Result<()> {
        let (x, y, width, height) = wire_geometry(area);
        // exposures are generated for the cleared area, and errors
        // from a window that vanished in the meantime are dropped
        self.conn
            .clear_area(true, window, x, y, width, height)?
            .ignore_error();
        Ok(())
    }
}
