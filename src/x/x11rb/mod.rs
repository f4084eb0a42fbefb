use core::marker::PhantomData;

use std::cell::RefCell;
use std::fmt;

use x11rb::connection::Connection;
use x11rb::protocol::{
    randr::{self, ConnectionExt as RConnectionExt},
    shape,
    xfixes::ConnectionExt as XFixesConnectionExt,
    xproto::{self, ConnectionExt as XConnectionExt, CreateGCAux},
};
use x11rb::rust_connection::RustConnection;

use tracing::{debug, trace, warn};

use strum::*;

use super::{
    atom::Atom,
    core::{Result, XAtom, XError, XWindow, XWindowID},
    Atoms, ConnStatus, Initialized, Uninitialized,
};
use crate::core::Geometry;

mod convert;
mod xconn;

const RANDR_MAJ: u32 = 1;
const RANDR_MIN: u32 = 4;

const XFIXES_MAJ: u32 = 5;
const XFIXES_MIN: u32 = 0;

/// A visual with an alpha channel, and the colormap created for it.
#[derive(Debug, Clone, Copy)]
struct ArgbVisual {
    visual: xproto::Visualid,
    colormap: xproto::Colormap,
}

/// A connection to an X server, backed by the x11rb library.
///
/// This is a very simple connection to the X server
/// and is completely synchronous, despite the async capabilities
/// of the underlying library.
///
/// It implements [XConn][1] and thus can be used with a
/// [DecorationManager][2].
///
/// # Usage
///
/// ```no_run
/// use toarudeco::x::x11rb::X11RBConn;
///
/// let conn = X11RBConn::connect().expect("Connection error");
/// let conn = conn.init().expect("Could not initialize");
///
/// /* or: */
/// let conn = X11RBConn::new().expect("Connection error");
/// ```
///
/// [1]: crate::x::core::XConn
/// [2]: crate::manager::DecorationManager
pub struct X11RBConn<S: ConnStatus> {
    conn: RustConnection,
    root: XWindow,
    idx: usize,
    atoms: RefCell<Atoms>, // wrap in RefCell for interior mutability
    gc: xproto::Gcontext,
    root_depth: u8,
    argb: Option<ArgbVisual>,
    randr: bool,
    shape: bool,
    _marker: PhantomData<S>,
}

impl X11RBConn<Uninitialized> {
    /// Connect to the X server and allocate a new Connection.
    pub fn connect() -> Result<Self> {
        let (conn, idx) = x11rb::connect(None)?;
        trace!("Connected to x server, got preferred screen {}", idx);

        let atoms = RefCell::new(Atoms::new());

        Ok(Self {
            conn,
            root: XWindow::zeroed(),
            idx,
            atoms,
            gc: 0,
            root_depth: 0,
            argb: None,
            randr: false,
            shape: false,
            _marker: PhantomData,
        })
    }

    /// Initializes the connection.
    ///
    /// It does the following:
    ///
    /// - Initializes the root window and its dimensions.
    /// - Interns all known [atoms][1].
    /// - Creates the graphics context used for image uploads.
    /// - Verifies the XFixes version supports input regions.
    /// - Checks for RandR and SHAPE, and selects screen change events.
    /// - Looks up a 32-bit visual for translucent windows.
    ///
    /// A missing or outdated RandR is not fatal: the root window is
    /// then treated as the only output.
    ///
    /// [1]: crate::x::atom::Atom
    pub fn init(mut self) -> Result<X11RBConn<Initialized>> {
        let (root, root_depth) = match self.conn.setup().roots.get(self.idx) {
            Some(screen) => {
                let id = screen.root;
                let depth = screen.root_depth;
                let geom = self.get_geometry_inner(id)?;
                (XWindow::with_data(id, geom), depth)
            }
            None => return Err(XError::NoScreens),
        };
        trace!("Got root: {:?}", root);

        let atomcount = Atom::iter().count();
        let mut atomvec = Vec::with_capacity(atomcount);

        // intern all known atoms

        // get cookies for all first
        for atom in Atom::iter() {
            atomvec.push((
                atom.to_string(),
                self.conn.intern_atom(false, atom.as_ref().as_bytes())?,
            ));
        }

        let atoms = self.atoms.get_mut();

        // then get replies
        for (name, cookie) in atomvec {
            atoms.insert(&name, cookie.reply()?.atom);
        }

        let gc = self.conn.generate_id()?;
        self.conn
            .create_gc(gc, root.id, &CreateGCAux::new().graphics_exposures(0))?
            .check()?;

        let res = self
            .conn
            .xfixes_query_version(XFIXES_MAJ, XFIXES_MIN)?
            .reply()?;
        trace!("Got xfixes version {}.{}", res.major_version, res.minor_version);

        if res.major_version < 2 {
            return Err(XError::Connection(format!(
                "Received xfixes version {}.{}, requires v2.0 or higher",
                res.major_version, res.minor_version
            )));
        }

        let randr = self.query_randr()?;
        if randr {
            self.conn
                .randr_select_input(root.id, randr::NotifyMask::SCREEN_CHANGE)?;
        }

        let shape = self
            .conn
            .query_extension(shape::X11_EXTENSION_NAME.as_bytes())?
            .reply()?
            .present;
        if !shape {
            warn!("SHAPE extension not present, title bar corners will be square");
        }

        let argb = self.find_argb_visual(root.id)?;
        if argb.is_none() {
            debug!("No 32-bit visual available, overlays will be opaque");
        }

        Ok(X11RBConn {
            conn: self.conn,
            root,
            idx: self.idx,
            atoms: self.atoms,
            gc,
            root_depth,
            argb,
            randr,
            shape,
            _marker: PhantomData,
        })
    }

    /// Returns whether a usable RandR version is present.
    fn query_randr(&self) -> Result<bool> {
        let present = self
            .conn
            .query_extension(randr::X11_EXTENSION_NAME.as_bytes())?
            .reply()?
            .present;
        if !present {
            warn!("RandR not present, using the root window as the only output");
            return Ok(false);
        }

        let res = self
            .conn
            .randr_query_version(RANDR_MAJ, RANDR_MIN)?
            .reply()?;
        let (maj, min) = (res.major_version, res.minor_version);
        debug!("Got randr version {}.{}", maj, min);

        if maj != RANDR_MAJ || min < RANDR_MIN {
            warn!(
                "Received randr version {}.{}, requires v{}.{} or higher, using the root window",
                maj, min, RANDR_MAJ, RANDR_MIN
            );
            return Ok(false);
        }
        Ok(true)
    }

    fn find_argb_visual(&self, root: XWindowID) -> Result<Option<ArgbVisual>> {
        let screen = match self.conn.setup().roots.get(self.idx) {
            Some(screen) => screen,
            None => return Err(XError::InvalidScreen),
        };

        let visual = screen
            .allowed_depths
            .iter()
            .filter(|d| d.depth == 32)
            .flat_map(|d| d.visuals.iter())
            .find(|v| v.class == xproto::VisualClass::TRUE_COLOR)
            .map(|v| v.visual_id);

        let Some(visual) = visual else {
            return Ok(None);
        };

        let colormap = self.conn.generate_id()?;
        self.conn
            .create_colormap(xproto::ColormapAlloc::NONE, colormap, root, visual)?
            .check()?;

        Ok(Some(ArgbVisual { visual, colormap }))
    }
}

impl<S: ConnStatus> X11RBConn<S> {
    #[inline]
    pub(crate) fn get_geometry_inner(&self, window: XWindowID) -> Result<Geometry> {
        trace!("Getting geometry for window {}", window);

        // send the request and grab its reply
        Ok(self.conn.get_geometry(window)?.reply().map(|ok| Geometry {
            // map the ok result into a Geometry
            x: ok.x as i32,
            y: ok.y as i32,
            height: ok.height as i32,
            width: ok.width as i32,
        })?)
    }
}

impl X11RBConn<Initialized> {
    /// Shortcut static method for directly creating
    /// an initialized connection.
    pub fn new() -> Result<Self> {
        X11RBConn::connect()?.init()
    }

    /// Adds an atom to internal atom storage.
    pub fn add_atom<S: AsRef<str>>(&mut self, name: S, atom: XAtom) {
        self.atoms.get_mut().insert(name.as_ref(), atom);
    }

    /// Looks up the name of an interned atom.
    pub fn atom_name(&self, atom: XAtom) -> Option<String> {
        self.atoms.borrow().retrieve_by_value(atom)
    }

    /// Exposes `X11RBConn`'s internal connection.
    pub fn conn(&self) -> &RustConnection {
        &self.conn
    }

    /// Whether translucent windows can be created on this screen.
    pub fn has_argb_visual(&self) -> bool {
        self.argb.is_some()
    }

    /// Whether outputs are read from RandR rather than the root window.
    pub fn has_randr(&self) -> bool {
        self.randr
    }
}

impl<S: ConnStatus + fmt::Debug> fmt::Debug for X11RBConn<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("X11RBConn")
            .field("root", &self.root)
            .field("idx", &self.idx)
            .field("gc", &self.gc)
            .field("root_depth", &self.root_depth)
            .field("argb", &self.argb)
            .field("randr", &self.randr)
            .field("shape", &self.shape)
            .finish()
    }
}

use x11rb::errors;

impl From<errors::ConnectionError> for XError {
    fn from(e: errors::ConnectionError) -> XError {
        use errors::ConnectionError::*;
        match e {
            UnknownError | InsufficientMemory | FdPassingFailed => {
                XError::Connection(e.to_string())
            }
            IoError(e) => XError::Connection(e.to_string()),
            other => XError::Protocol(other.to_string()),
        }
    }
}

impl From<errors::ConnectError> for XError {
    fn from(e: errors::ConnectError) -> XError {
        XError::Connection(e.to_string())
    }
}

impl From<errors::ReplyError> for XError {
    fn from(e: errors::ReplyError) -> XError {
        XError::Protocol(e.to_string())
    }
}

impl From<errors::ReplyOrIdError> for XError {
    fn from(e: errors::ReplyOrIdError) -> XError {
        if let errors::ReplyOrIdError::ConnectionError(e) = e {
            e.into()
        } else {
            XError::ServerError(e.to_string())
        }
    }
}
