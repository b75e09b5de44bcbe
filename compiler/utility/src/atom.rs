//! Interned strings.
//!
//! Identifiers, directive names and the images of tokens are stored as atoms. Two atoms are
//! equal if and only if the underlying strings are equal which makes comparisons and hashing
//! as cheap as for an integer.

use crate::HashMap;
use std::{
    fmt,
    sync::{LazyLock, Mutex},
};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom(u32);

impl Atom {
    pub fn to_str(self) -> &'static str {
        Interner::the().lock().unwrap().get(self)
    }
}

impl From<&str> for Atom {
    fn from(value: &str) -> Self {
        Interner::the().lock().unwrap().intern_borrowed(value)
    }
}

impl From<String> for Atom {
    fn from(value: String) -> Self {
        Interner::the().lock().unwrap().intern_owned(value)
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_str())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

// Atoms deliberately do not implement `PartialOrd` and `Ord`: Ordering by index is
// unintuitive and ordering by string should be opted into via `Atom::to_str`.

struct Interner {
    atoms: HashMap<&'static str, Atom>,
    strings: Vec<&'static str>,
}

impl Interner {
    fn the() -> &'static Mutex<Self> {
        static SELF: LazyLock<Mutex<Interner>> = LazyLock::new(|| Mutex::new(Interner::new()));

        &SELF
    }

    fn with(strings: Vec<&'static str>) -> Self {
        Self {
            atoms: strings
                .iter()
                .zip(0..)
                .map(|(&string, index)| (string, Atom(index)))
                .collect(),
            strings,
        }
    }

    fn intern_borrowed(&mut self, value: &str) -> Atom {
        if let Some(&atom) = self.atoms.get(value) {
            return atom;
        }

        self.insert(Box::leak(Box::from(value)))
    }

    fn intern_owned(&mut self, value: String) -> Atom {
        if let Some(&atom) = self.atoms.get(&*value) {
            return atom;
        }

        self.insert(String::leak(value))
    }

    fn insert(&mut self, value: &'static str) -> Atom {
        let atom = Atom(self.strings.len().try_into().unwrap());
        self.strings.push(value);
        self.atoms.insert(value, atom);
        atom
    }

    fn get(&self, atom: Atom) -> &'static str {
        self.strings[atom.0 as usize]
    }
}

macro_rules! atoms {
    ($( $atom:ident => $string:literal ),* $(,)?) => {
        #[allow(non_camel_case_types, clippy::upper_case_acronyms)]
        #[repr(u32)]
        enum Predefined { $( $atom ),* }

        impl Atom {
            $( pub const $atom: Self = Self(Predefined::$atom as u32); )*
        }

        impl Interner {
            fn new() -> Self {
                Self::with(vec![$( $string ),*])
            }
        }
    };
}

atoms! {
    CHAR => "char",
    EMPTY => "",
    LOAD => "load",
    MAIN => "main",
    UNDERSCORE => "_",
}

#[cfg(test)]
mod test {
    use super::Atom;

    #[test]
    fn predefined_atoms_are_interned() {
        assert_eq!(Atom::from("main"), Atom::MAIN);
        assert_eq!(Atom::from(String::from("_")), Atom::UNDERSCORE);
        assert_eq!(Atom::LOAD.to_str(), "load");
    }

    #[test]
    fn equal_strings_yield_equal_atoms() {
        let first = Atom::from("velocity");
        let second = Atom::from(String::from("velocity"));

        assert_eq!(first, second);
        assert_ne!(first, Atom::from("acceleration"));
        assert_eq!(first.to_str(), "velocity");
    }
}
