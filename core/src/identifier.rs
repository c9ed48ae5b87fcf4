//! Define the type of an identifier.
//!
//! Identifiers name record fields, tagged types, declared units, and type or unit variables. They
//! are interned in a global table, so an [Ident] is a cheap `Copy` handle which can be compared
//! and hashed in constant time.
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::parser::lexer::KEYWORDS;

static INTERNER: Lazy<interner::Interner> = Lazy::new(interner::Interner::new);

static IDENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[_a-zA-Z][_a-zA-Z0-9]*$").unwrap());

/// An interned identifier.
//
// Implementation-wise, this is just a wrapper around interner::Symbol that uses a hard-coded,
// static `Interner`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident(interner::Symbol);

/// The error returned when trying to build an identifier from a string which isn't one.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a valid identifier")]
pub struct InvalidIdentError(pub String);

impl Ident {
    /// Intern a string as an identifier, without checking that it's a valid one. Use
    /// [Ident::try_new] for user-provided names.
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(INTERNER.intern(s.as_ref()))
    }

    /// Intern a string as an identifier, after checking it is made of letters, digits and
    /// underscores and doesn't start with a digit.
    pub fn try_new(s: impl AsRef<str>) -> Result<Self, InvalidIdentError> {
        let s = s.as_ref();

        if Self::is_valid(s) {
            Ok(Self::new(s))
        } else {
            Err(InvalidIdentError(s.to_owned()))
        }
    }

    pub fn is_valid(s: &str) -> bool {
        IDENT_REGEX.is_match(s)
    }

    /// Return the string representation of this identifier.
    pub fn label(&self) -> &'static str {
        INTERNER.lookup(self.0)
    }

    pub fn into_label(self) -> String {
        self.label().to_owned()
    }

    /// Whether this identifier is spelled like one of the builtin type keywords (`Number`,
    /// `Text`, etc.). Such identifiers are fine as record field names, but can't name a tagged
    /// type or a type variable.
    pub fn is_keyword(&self) -> bool {
        KEYWORDS.contains(&self.label())
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.label())
    }
}

impl PartialOrd for Ident {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ident {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.label().cmp(other.label())
    }
}

impl From<&str> for Ident {
    fn from(val: &str) -> Self {
        Self::new(val)
    }
}

impl From<String> for Ident {
    fn from(val: String) -> Self {
        Self::new(val)
    }
}

impl From<Ident> for String {
    fn from(id: Ident) -> Self {
        id.into_label()
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        self.label()
    }
}

mod interner {
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// A symbol is a correspondence between an [Ident](super::Ident) and its string
    /// representation stored in the [Interner].
    #[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
    pub struct Symbol(u32);

    /// The interner, which serves a double purpose: it pre-allocates space so that
    /// [Ident](super::Ident) labels are created faster and it makes it so that labels are stored
    /// only once, saving space.
    pub(crate) struct Interner(RwLock<InnerInterner>);

    impl Interner {
        pub(crate) fn new() -> Self {
            Self(RwLock::new(InnerInterner::default()))
        }

        /// Stores a string inside the [Interner] if it does not exists, and returns the
        /// corresponding [Symbol].
        pub(crate) fn intern(&self, string: impl AsRef<str>) -> Symbol {
            if let Some(sym) = self.0.read().unwrap().get(string.as_ref()) {
                return sym;
            }

            self.0.write().unwrap().intern(string.as_ref())
        }

        /// Looks up for the stored string corresponding to the [Symbol].
        ///
        /// This operation cannot fail since the only way to have a [Symbol] is to have
        /// [interned](Interner::intern) the corresponding string first.
        pub(crate) fn lookup(&self, sym: Symbol) -> &'static str {
            self.0.read().unwrap().lookup(sym)
        }
    }

    /// Interned strings are leaked: identifiers live for the whole program, and there are only
    /// as many of them as there are distinct names in the type and unit registries.
    #[derive(Default)]
    struct InnerInterner {
        map: HashMap<&'static str, Symbol>,
        vec: Vec<&'static str>,
    }

    impl InnerInterner {
        fn get(&self, string: &str) -> Option<Symbol> {
            self.map.get(string).copied()
        }

        fn intern(&mut self, string: &str) -> Symbol {
            // Another writer might have won the race between our read and write locks.
            if let Some(sym) = self.get(string) {
                return sym;
            }

            let leaked: &'static str = Box::leak(string.to_owned().into_boxed_str());
            let sym = Symbol(self.vec.len() as u32);
            self.vec.push(leaked);
            self.map.insert(leaked, sym);
            sym
        }

        fn lookup(&self, sym: Symbol) -> &'static str {
            self.vec[sym.0 as usize]
        }
    }

}
