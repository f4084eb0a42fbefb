//! A small demo of toaru-deco.
//!
//! This opens a window with a toaru-deco title bar. Dragging the title
//! bar moves the window, and dragging it to the top, left or right edge
//! of a screen shows where it will snap to when released.
//!
//! - Middle click on the title bar switches between a light and a dark theme.
//! - Right click on the title bar toggles the disabled state.
//! - Escape cancels a drag.
//!
//! The edge detection lives here, not in the library: toaru-deco only
//! shows the candidates it is given.

use std::error::Error;

use tracing::{debug, info, Level};
use tracing_subscriber::{fmt as logger, fmt::format::FmtSpan};

use toarudeco::core::{Color, Geometry, Point};
use toarudeco::decoration::StyleFlags;
use toarudeco::theme::{builtin::Palette, DefaultTheme};
use toarudeco::x::{event::PointerEvent, Atom, Property, WindowClass, XConn, XEvent};
use toarudeco::Config;

const ESCAPE: u8 = 9;
const SNAP_THRESHOLD: i32 = 8;

/// Where a window dragged with the pointer at `ptr` would snap to.
fn snap_candidate(outputs: &[Geometry], ptr: Point) -> Option<Geometry> {
    let output = outputs.iter().find(|o| o.contains_point(ptr))?;
    let (left, right) = output.split_vertical();

    if ptr.y - output.y < SNAP_THRESHOLD {
        Some(*output)
    } else if ptr.x - output.x < SNAP_THRESHOLD {
        Some(left)
    } else if output.x + output.width - 1 - ptr.x < SNAP_THRESHOLD {
        Some(right)
    } else {
        None
    }
}

fn dark_theme() -> DefaultTheme {
    let palette = Palette {
        focused: Color::from_rgb(0x2b2b2b),
        unfocused: Color::from_rgb(0x1a1a1a),
        text_focused: Color::from_rgb(0xeeeeee),
        text_unfocused: Color::from_rgb(0x808080),
        glyph: Color::from_rgb(0x101010),
        ..Palette::default()
    };
    DefaultTheme::new("toaru-dark", palette, Default::default())
}

pub fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config::new().with_log_level(Level::TRACE);

    // set up the logger
    logger::fmt()
        // only log enter and exit
        .with_span_events(FmtSpan::ACTIVE)
        // log all events up to the configured level
        .with_max_level(config.log_level())
        // don't use timestamps
        .without_time()
        // don't show source filename
        .with_file(false)
        // don't show source code line
        .with_line_number(false)
        // register as global
        .try_init()?;

    //* 1: Setup X Connection and allocate new manager object
    let mut manager = toarudeco::x11rb_backed_manager(config)?;

    //* 2: Create a window to decorate
    let conn = manager.conn();
    let root = conn.get_root().id;
    let mut frame = Geometry::new(100, 100, 300, 480);
    let client = conn.create_window(WindowClass::InputOutput(root), frame)?;

    let title = "toaru-deco demo";
    conn.set_property(client, Atom::WmName, Property::UTF8String(title.into()))?;
    conn.set_property(client, Atom::NetWmName, Property::UTF8String(title.into()))?;
    let delete = conn.atom(Atom::WmDeleteWindow)?;
    conn.set_property(client, Atom::WmProtocols, Property::Atom(vec![delete]))?;
    conn.set_background_color(client, Color::WHITE)?;
    conn.map_window(client)?;

    let titlebar = manager.manage(client, title, StyleFlags::default(), frame.width)?;
    manager.conn().set_input_focus(client)?;

    //* 3: Run the event loop
    let mut grab: Option<Point> = None;
    let mut dark = false;
    let mut disabled = false;

    loop {
        let Some(event) = manager.conn().poll_next_event()? else {
            continue;
        };

        match event {
            XEvent::ButtonPress(PointerEvent { id, rel, .. }, 1) if id == titlebar => {
                grab = Some(rel);
                manager.begin_drag()?;
            }
            XEvent::MotionNotify(PointerEvent { abs, .. }) => {
                let Some(offset) = grab else { continue };
                frame.x = abs.x - offset.x;
                frame.y = abs.y - offset.y;
                manager.conn().configure_window(client, frame)?;

                let candidate = snap_candidate(&manager.outputs(), abs);
                manager.drag_motion(candidate)?;
            }
            XEvent::ButtonRelease(_, 1) if grab.is_some() => {
                grab = None;
                if let Some(target) = manager.end_drag()? {
                    info!("Snapping to {}", target);
                    frame = target;
                    manager.conn().configure_window(client, frame)?;
                    manager.resize(client, frame.width)?;
                }
            }
            XEvent::ButtonPress(PointerEvent { id, .. }, 2) if id == titlebar => {
                dark = !dark;
                if dark {
                    manager.set_theme(dark_theme())?;
                } else {
                    manager.set_theme(DefaultTheme::from_config(manager.config()))?;
                }
            }
            XEvent::ButtonPress(PointerEvent { id, .. }, 3) if id == titlebar => {
                disabled = !disabled;
                manager.set_disabled(client, disabled)?;
            }
            XEvent::KeyPress(_, ESCAPE) if grab.is_some() => {
                debug!("Drag cancelled");
                grab = None;
                manager.cancel_drag()?;
            }
            XEvent::ClientMessage(msg) if msg.data[0] == delete => {
                info!("Window closed, exiting");
                break;
            }
            other => manager.handle_event(other),
        }
    }

    //* 4: Clean up
    manager.shutdown()?;
    manager.conn().destroy_window(client)?;
    manager.conn().flush()?;

    Ok(())
}
