#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use strum::IntoEnumIterator;

use crate::core::{Color, Geometry, Size};
use crate::decoration::RasterImage;
use crate::x::{
    atom::Atom,
    core::{Property, Result, WindowClass, XAtom, XConn, XError, XWindow, XWindowID},
    event::XEvent,
};

/// What the dummy server knows about a window.
#[derive(Debug, Clone)]
pub struct DummyWindow {
    pub class: WindowClass,
    pub geom: Geometry,
    pub mapped: bool,
    pub background: Option<XWindowID>,
    pub color: Option<Color>,
    pub passthrough: bool,
    /// The bounding region set with `set_shape`, if any.
    pub shape: Option<Vec<Geometry>>,
    pub props: HashMap<Atom, Property>,
}

#[derive(Debug, Default)]
struct DummyState {
    next_id: XWindowID,
    windows: HashMap<XWindowID, DummyWindow>,
    pixmaps: HashMap<XWindowID, (Size, Vec<u32>)>,
    events: VecDeque<XEvent>,
    repaints: Vec<(XWindowID, Geometry)>,
    put_images: usize,
    configures: usize,
    raises: usize,
    focused: Option<XWindowID>,
    outputs: Vec<Geometry>,
    output_queries: usize,
    shapes: usize,
    fail_put_image: bool,
}

/// A dummy connection implementing XConn but actually
/// does not interface with the X server at all, and
/// should mainly be used for testing.
///
/// `DummyConn` contains an internal queue that takes
/// XEvents and dequeues them when `poll_next_event` is
/// called, as well as an internal store of windows and
/// pixmaps. Pixmaps hold real pixel data, so the effects
/// of `put_image` can be inspected, and every request that
/// changes what is on screen is counted.
#[derive(Debug)]
pub struct DummyConn {
    root: XWindow,
    state: RefCell<DummyState>,
}

impl DummyConn {
    /// Creates a new DummyConn with a single 1920x1080 output.
    pub fn new() -> Self {
        Self::with_outputs(vec![Geometry::new(0, 0, 1080, 1920)])
    }

    /// Creates a new DummyConn with the given outputs.
    ///
    /// The root window spans the bounding box of all outputs.
    pub fn with_outputs(outputs: Vec<Geometry>) -> Self {
        let width = outputs.iter().map(|o| o.x.saturating_add(o.width)).max().unwrap_or(0);
        let height = outputs.iter().map(|o| o.y.saturating_add(o.height)).max().unwrap_or(0);
        Self {
            root: XWindow::with_data(1, Geometry::new(0, 0, height, width)),
            state: RefCell::new(DummyState {
                next_id: 0x200000,
                outputs,
                ..DummyState::default()
            }),
        }
    }

    /// Replaces the outputs, as if the screen layout had changed.
    pub fn set_outputs(&self, outputs: Vec<Geometry>) {
        self.state.borrow_mut().outputs = outputs;
    }

    /// How many times `all_outputs` has been called.
    pub fn output_queries(&self) -> usize {
        self.state.borrow().output_queries
    }

    /// Makes every following `put_image` fail.
    pub fn fail_put_image(&self, fail: bool) {
        self.state.borrow_mut().fail_put_image = fail;
    }

    pub fn shape(&self, window: XWindowID) -> Option<Vec<Geometry>> {
        self.window(window).and_then(|w| w.shape)
    }

    /// How many times a shape has been set on any window.
    pub fn shapes(&self) -> usize {
        self.state.borrow().shapes
    }

    /// Adds a single event to the internal queue to be sent out by
    /// `XConn::poll_next_event`.
    pub fn add_event(&self, event: XEvent) {
        self.state.borrow_mut().events.push_back(event);
    }

    /// Adds multiple events to the internal queue.
    pub fn add_events<I>(&self, events: I)
    where
        I: IntoIterator<Item = XEvent>,
    {
        self.state.borrow_mut().events.extend(events);
    }

    pub fn window(&self, id: XWindowID) -> Option<DummyWindow> {
        self.state.borrow().windows.get(&id).cloned()
    }

    /// All windows of the given class.
    pub fn windows_of(&self, class: WindowClass) -> Vec<XWindowID> {
        self.state
            .borrow()
            .windows
            .iter()
            .filter(|(_, w)| w.class == class)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn pixels(&self, pixmap: XWindowID) -> Option<Vec<u32>> {
        self.state.borrow().pixmaps.get(&pixmap).map(|(_, px)| px.clone())
    }

    pub fn pixmap_count(&self) -> usize {
        self.state.borrow().pixmaps.len()
    }

    pub fn background_pixmap(&self, window: XWindowID) -> Option<XWindowID> {
        self.window(window).and_then(|w| w.background)
    }

    pub fn repaints(&self) -> Vec<(XWindowID, Geometry)> {
        self.state.borrow().repaints.clone()
    }

    pub fn clear_repaints(&self) {
        self.state.borrow_mut().repaints.clear();
    }

    pub fn put_images(&self) -> usize {
        self.state.borrow().put_images
    }

    pub fn configures(&self) -> usize {
        self.state.borrow().configures
    }

    pub fn raises(&self) -> usize {
        self.state.borrow().raises
    }

    pub fn focused(&self) -> Option<XWindowID> {
        self.state.borrow().focused
    }

    fn with_window<F, T>(&self, id: XWindowID, f: F) -> Result<T>
    where
        F: FnOnce(&mut DummyWindow) -> T,
    {
        let mut state = self.state.borrow_mut();
        state
            .windows
            .get_mut(&id)
            .map(f)
            .ok_or(XError::NoSuchWindow(id))
    }

    fn next_id(&self) -> XWindowID {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.next_id
    }
}

impl XConn for DummyConn {
    fn poll_next_event(&self) -> Result<Option<XEvent>> {
        Ok(self.state.borrow_mut().events.pop_front())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn get_root(&self) -> XWindow {
        self.root
    }

    fn all_outputs(&self) -> Result<Vec<Geometry>> {
        let mut state = self.state.borrow_mut();
        state.output_queries += 1;
        if state.outputs.is_empty() {
            Err(XError::NoScreens)
        } else {
            Ok(state.outputs.clone())
        }
    }

    fn atom(&self, atom: Atom) -> Result<XAtom> {
        Atom::iter()
            .position(|a| a == atom)
            .map(|i| 100 + i as XAtom)
            .ok_or_else(|| XError::UnknownAtom(atom.to_string()))
    }

    fn create_window(&self, class: WindowClass, geom: Geometry) -> Result<XWindowID> {
        let id = self.next_id();
        self.state.borrow_mut().windows.insert(
            id,
            DummyWindow {
                class,
                geom,
                mapped: false,
                background: None,
                color: None,
                passthrough: false,
                shape: None,
                props: HashMap::new(),
            },
        );
        Ok(id)
    }

    fn destroy_window(&self, window: XWindowID) -> Result<()> {
        self.state
            .borrow_mut()
            .windows
            .remove(&window)
            .map(|_| ())
            .ok_or(XError::NoSuchWindow(window))
    }

    fn map_window(&self, window: XWindowID) -> Result<()> {
        self.with_window(window, |w| w.mapped = true)
    }

    fn unmap_window(&self, window: XWindowID) -> Result<()> {
        self.with_window(window, |w| w.mapped = false)
    }

    fn raise_window(&self, window: XWindowID) -> Result<()> {
        self.with_window(window, |_| ())?;
        self.state.borrow_mut().raises += 1;
        Ok(())
    }

    fn configure_window(&self, window: XWindowID, geom: Geometry) -> Result<()> {
        self.with_window(window, |w| w.geom = geom)?;
        self.state.borrow_mut().configures += 1;
        Ok(())
    }

    fn set_input_focus(&self, window: XWindowID) -> Result<()> {
        self.state.borrow_mut().focused = Some(window);
        Ok(())
    }

    fn set_property(&self, window: XWindowID, prop: Atom, value: Property) -> Result<()> {
        self.with_window(window, |w| {
            w.props.insert(prop, value);
        })
    }

    fn set_background_color(&self, window: XWindowID, color: Color) -> Result<()> {
        self.with_window(window, |w| w.color = Some(color))
    }

    fn set_input_passthrough(&self, window: XWindowID) -> Result<()> {
        self.with_window(window, |w| w.passthrough = true)
    }

    fn set_shape(&self, window: XWindowID, region: &[Geometry]) -> Result<()> {
        self.with_window(window, |w| w.shape = Some(region.to_vec()))?;
        self.state.borrow_mut().shapes += 1;
        Ok(())
    }

    fn create_pixmap(&self, size: Size) -> Result<XWindowID> {
        if size.is_degenerate() {
            return Err(XError::RequestError("pixmap size must be positive"));
        }
        let id = self.next_id();
        self.state
            .borrow_mut()
            .pixmaps
            .insert(id, (size, vec![0; size.area()]));
        Ok(id)
    }

    fn free_pixmap(&self, pixmap: XWindowID) -> Result<()> {
        self.state
            .borrow_mut()
            .pixmaps
            .remove(&pixmap)
            .map(|_| ())
            .ok_or(XError::NoSuchWindow(pixmap))
    }

    fn set_background_pixmap(&self, window: XWindowID, pixmap: XWindowID) -> Result<()> {
        self.with_window(window, |w| w.background = Some(pixmap))
    }

    fn put_image(&self, drawable: XWindowID, image: &RasterImage) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_put_image {
            return Err(XError::RequestError("put_image failed"));
        }
        let (size, pixels) = state
            .pixmaps
            .get_mut(&drawable)
            .ok_or(XError::NoSuchWindow(drawable))?;
        if *size != image.size() {
            return Err(XError::RequestError("image does not match pixmap"));
        }
        for (dst, c) in pixels.iter_mut().zip(image.colors()) {
            *dst = c.as_u32();
        }
        state.put_images += 1;
        Ok(())
    }

    fn schedule_repaint(&self, window: XWindowID, area: Geometry) -> Result<()> {
        self.state.borrow_mut().repaints.push((window, area));
        Ok(())
    }
}
