use std::collections::HashMap;
use std::str::FromStr;

use strum::*;
use strum_macros::EnumIter;

use super::core::XAtom;

/// Internal representations of the X atoms toaru-deco uses.
///
/// This allows for some measure of type safety around dealing with atoms.
/// Every variant is interned when a connection is initialized.
#[derive(AsRefStr, Display, EnumString, EnumIter, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Atom {
    /// CARDINAL
    #[strum(serialize = "CARDINAL")]
    Cardinal,
    /// UTF8_STRING
    #[strum(serialize = "UTF8_STRING")]
    UTF8String,
    /// WM_NAME
    #[strum(serialize = "WM_NAME")]
    WmName,
    /// WM_PROTOCOLS
    #[strum(serialize = "WM_PROTOCOLS")]
    WmProtocols,
    /// WM_DELETE_WINDOW
    #[strum(serialize = "WM_DELETE_WINDOW")]
    WmDeleteWindow,
    /// _NET_WM_NAME
    #[strum(serialize = "_NET_WM_NAME")]
    NetWmName,
    /// _NET_WM_STATE
    #[strum(serialize = "_NET_WM_STATE")]
    NetWmState,
    /// _NET_WM_STATE_ABOVE
    #[strum(serialize = "_NET_WM_STATE_ABOVE")]
    NetWmStateAbove,
    /// _NET_WM_WINDOW_TYPE
    #[strum(serialize = "_NET_WM_WINDOW_TYPE")]
    NetWmWindowType,
    /// _NET_WM_WINDOW_TYPE_DND
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DND")]
    NetWindowTypeDnd,
    /// _NET_WM_WINDOW_OPACITY
    #[strum(serialize = "_NET_WM_WINDOW_OPACITY")]
    NetWmWindowOpacity,
}

/// A type that associates either an Atom or a String with
/// an X-defined atom.
///
/// This allows the user to manage known atoms conveniently.
#[derive(Debug, Default, Clone)]
pub struct Atoms {
    /// Known atoms that can be managed as their enum variants.
    known: HashMap<Atom, XAtom>,
    /// Unknown atoms that have to be managed as strings.
    interned: HashMap<String, XAtom>,
}

impl Atoms {
    pub fn new() -> Self {
        Self {
            known: HashMap::new(),
            interned: HashMap::new(),
        }
    }

    pub fn insert(&mut self, atom: &str, val: XAtom) {
        if let Ok(known) = Atom::from_str(atom) {
            self.known.insert(known, val);
        } else {
            self.interned.insert(atom.into(), val);
        }
    }

    pub fn retrieve(&self, atom: &str) -> Option<XAtom> {
        if let Ok(known) = Atom::from_str(atom) {
            self.known.get(&known).copied()
        } else {
            self.interned.get(atom).copied()
        }
    }

    /// Retrieves a known atom directly by its variant.
    pub fn known(&self, atom: Atom) -> Option<XAtom> {
        self.known.get(&atom).copied()
    }

    pub fn retrieve_by_value(&self, atom: XAtom) -> Option<String> {
        if let Some((known, _)) = self.known.iter().find(|(_, v)| **v == atom) {
            Some(known.to_string())
        } else {
            self.interned
                .iter()
                .find(|(_, v)| **v == atom)
                .map(|(k, _)| k.clone())
        }
    }

    /// Whether every known atom has been interned.
    pub fn is_complete(&self) -> bool {
        Atom::iter().all(|a| self.known.contains_key(&a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atoms_known_and_interned() {
        let mut atoms = Atoms::new();

        atoms.insert("_NET_WM_WINDOW_OPACITY", 300);
        atoms.insert("_SOME_OTHER_ATOM", 301);

        assert_eq!(atoms.known(Atom::NetWmWindowOpacity), Some(300));
        assert_eq!(atoms.retrieve("_SOME_OTHER_ATOM"), Some(301));
        assert_eq!(atoms.retrieve_by_value(300).as_deref(), Some("_NET_WM_WINDOW_OPACITY"));
        assert!(!atoms.is_complete());

        for (i, atom) in Atom::iter().enumerate() {
            atoms.insert(atom.as_ref(), 400 + i as u32);
        }
        assert!(atoms.is_complete());
    }
}
