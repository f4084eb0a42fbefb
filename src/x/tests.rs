use super::{x11rb::X11RBConn, WindowClass, XConn};
use crate::core::{Color, Geometry, Size};
use crate::decoration::{transfer, RasterImage, Surface};
use crate::overlay::SnapPreviewOverlay;

fn connect() -> X11RBConn<super::Initialized> {
    X11RBConn::connect()
        .and_then(|conn| conn.init())
        .expect("could not connect to X server")
}

fn test_transfer_generic<X: XConn>(conn: &X) {
    let root = conn.get_root().id;
    let size = Size::new(300, 24);
    let win = conn
        .create_window(WindowClass::InputOutput(root), Geometry::from_size(size))
        .unwrap();
    let surface = Surface::allocate(conn, win, size).unwrap().unwrap();

    let image = RasterImage::new(size, Color::from_rgb(0x3c7fd8)).unwrap();
    transfer(conn, image, &surface).unwrap();

    let wrong = RasterImage::new(Size::new(200, 24), Color::WHITE).unwrap();
    assert!(transfer(conn, wrong, &surface).unwrap_err().is_size_mismatch());

    surface.release(conn).unwrap();
    conn.destroy_window(win).unwrap();
    conn.flush().unwrap();
}

#[test]
fn test_transfer_x11rb() {
    let conn = connect();
    test_transfer_generic(&conn);
}

#[test]
fn test_large_image_upload_x11rb() {
    let conn = connect();
    let root = conn.get_root().id;

    // big enough to need several requests
    let size = Size::new(2000, 1000);
    let win = conn
        .create_window(WindowClass::InputOutput(root), Geometry::from_size(size))
        .unwrap();
    let surface = Surface::allocate(&conn, win, size).unwrap().unwrap();
    let image = RasterImage::new(size, Color::BLACK).unwrap();

    transfer(&conn, image, &surface).unwrap();
    surface.release(&conn).unwrap();
    conn.destroy_window(win).unwrap();
    conn.flush().unwrap();
}

#[test]
fn test_outputs_x11rb() {
    let conn = connect();
    let outputs = conn.all_outputs().unwrap();

    assert!(!outputs.is_empty());
    assert!(outputs.iter().all(|o| !o.is_degenerate()));
}

#[test]
fn test_overlay_x11rb() {
    let conn = connect();
    let mut overlay = SnapPreviewOverlay::default();
    let screen = conn.all_outputs().unwrap()[0];

    overlay.show_preview(&conn, screen).unwrap();
    overlay.show_preview(&conn, screen.split_vertical().0).unwrap();
    overlay.hide(&conn).unwrap();
    overlay.destroy(&conn).unwrap();
    conn.flush().unwrap();

    assert_eq!(overlay.reconfigurations(), 2);
}

#[test]
fn test_shape_x11rb() {
    let conn = connect();
    let root = conn.get_root().id;
    let win = conn
        .create_window(WindowClass::InputOutput(root), Geometry::new(0, 0, 24, 200))
        .unwrap();

    let region = [Geometry::new(2, 0, 2, 196), Geometry::new(0, 2, 22, 200)];
    conn.set_shape(win, &region).unwrap();
    conn.destroy_window(win).unwrap();
    conn.flush().unwrap();
}
