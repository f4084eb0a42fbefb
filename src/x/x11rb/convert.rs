//! Conversions between toaru-deco and x11rb types.

use x11rb::protocol::{xproto, Event};

use super::Initialized;
use crate::core::{Geometry, Point};
use crate::x::{
    core::Result,
    event::{ClientMessageEvent, ConfigureEvent, ExposeEvent, PointerEvent, XEvent},
    x11rb::X11RBConn,
};

impl X11RBConn<Initialized> {
    pub(in crate::x::x11rb) fn process_raw_event(&self, event: Event) -> Result<XEvent> {
        match event {
            Event::Expose(event) => Ok(XEvent::Expose(ExposeEvent {
                id: event.window,
                area: Geometry {
                    x: event.x as i32,
                    y: event.y as i32,
                    height: event.height as i32,
                    width: event.width as i32,
                },
                count: event.count,
            })),
            Event::ConfigureNotify(event) => Ok(XEvent::ConfigureNotify(ConfigureEvent {
                id: event.window,
                geom: Geometry {
                    x: event.x as i32,
                    y: event.y as i32,
                    height: event.height as i32,
                    width: event.width as i32,
                },
            })),
            Event::FocusIn(event) => Ok(XEvent::FocusIn(event.event)),
            Event::FocusOut(event) => Ok(XEvent::FocusOut(event.event)),
            Event::ButtonPress(event) => Ok(XEvent::ButtonPress(pointer(&event), event.detail)),
            Event::ButtonRelease(event) => {
                Ok(XEvent::ButtonRelease(pointer(&event), event.detail))
            }
            Event::MotionNotify(event) => Ok(XEvent::MotionNotify(PointerEvent {
                id: event.event,
                abs: Point::new(event.root_x as i32, event.root_y as i32),
                rel: Point::new(event.event_x as i32, event.event_y as i32),
            })),
            Event::KeyPress(event) => Ok(XEvent::KeyPress(event.event, event.detail)),
            Event::DestroyNotify(event) => Ok(XEvent::DestroyNotify(event.window)),
            Event::ClientMessage(event) => Ok(XEvent::ClientMessage(ClientMessageEvent {
                window: event.window,
                type_: event.type_,
                data: event.data.as_data32(),
            })),
            Event::RandrScreenChangeNotify(_) => Ok(XEvent::ScreenChange),
            unk => Ok(XEvent::Unknown(format!("{:?}", unk))),
        }
    }
}

// ButtonPress and ButtonRelease share a layout
fn pointer(ev: &xproto::ButtonPressEvent) -> PointerEvent {
    PointerEvent {
        id: ev.event,
        abs: Point::new(ev.root_x as i32, ev.root_y as i32),
        rel: Point::new(ev.event_x as i32, ev.event_y as i32),
    }
}

/// Clamps a geometry into the ranges the core protocol can carry.
pub(super) fn wire_geometry(geom: Geometry) -> (i16, i16, u16, u16) {
    (
        geom.x.clamp(i16::MIN as i32, i16::MAX as i32) as i16,
        geom.y.clamp(i16::MIN as i32, i16::MAX as i32) as i16,
        geom.width.clamp(1, u16::MAX as i32) as u16,
        geom.height.clamp(1, u16::MAX as i32) as u16,
    )
}
