//! Error types.
//!
//! There are two families of errors at this level:
//!
//! - [InternalError] signals a contract violation by the caller, such as a binding of the wrong
//!   kind. It is a bug in the calling code and should be reported as a generic failure, not shown
//!   to the end user as is.
//! - [UnknownTypeError], [UnknownUnitError] and [TaggedInstantiationError] are user-facing and
//!   recoverable. The first two carry suggested replacements that a user interface can offer as
//!   one-click fixes.
//!
//! Lowering to the unification IR never produces unknown-name errors: an unresolved name might
//! still be inferred from the context. Only materialization (and parsing, for unit names) does.
use crate::{
    identifier::{Ident, InvalidIdentError},
    jelly::{JellyType, JellyUnit},
    typ::TypeVarKind,
};

pub mod suggest;

pub use crate::config::ConfigError;
pub use crate::parser::error::ParseError;
pub use crate::typecheck::error::UnifError;

/// A contract violation detected by this crate: for example a variable bound to a type where a
/// unit was expected, or a variable that static checking should have bound.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    message: String,
}

impl InternalError {
    /// Create a new internal error. Internal errors are always logged, since they indicate a bug
    /// and are usually reported upstream as a generic failure.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        log::error!("{message}");
        InternalError { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A type name couldn't be resolved against the type registry while making a concrete type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct UnknownTypeError {
    /// A human-readable description of the error.
    pub message: String,
    /// The node of the type tree which failed to resolve, e.g. to be highlighted.
    pub node: JellyType,
    /// Replacements for [Self::node], most plausible first. May be empty.
    pub suggestions: Vec<JellyType>,
}

/// A unit name isn't declared in the unit registry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown unit `{name}`")]
pub struct UnknownUnitError {
    pub name: String,
    /// Replacements for the unknown unit, most plausible first. May be empty.
    pub suggestions: Vec<JellyUnit>,
}

/// A tagged type was found, but the provided arguments don't match its declaration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("cannot instantiate tagged type `{type_name}`: {kind}")]
pub struct TaggedInstantiationError {
    pub type_name: Ident,
    pub kind: InstantiationErrorKind,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InstantiationErrorKind {
    #[error("expected {expected} argument(s), found {found}")]
    Arity { expected: usize, found: usize },
    /// `position` is the zero-based index of the offending argument.
    #[error("the argument at index {position} should be a {expected}, found a {found}")]
    Kind {
        position: usize,
        expected: TypeVarKind,
        found: TypeVarKind,
    },
}

/// Errors which can occur when making a concrete type out of a jelly type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MaterializeError {
    #[error(transparent)]
    Internal(#[from] InternalError),
    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),
    #[error(transparent)]
    TaggedInstantiation(#[from] TaggedInstantiationError),
}

/// Errors raised when declaring a unit or a tagged type in a registry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentError),
    #[error("`{0}` is a builtin type keyword and can't be declared")]
    Keyword(Ident),
    #[error("a unit named `{0}` is already declared")]
    DuplicateUnit(Ident),
    #[error("a tagged type named `{0}` is already declared")]
    DuplicateType(Ident),
    #[error("type variable `{var}` is declared twice in `{type_name}`")]
    DuplicateTypeVariable { type_name: Ident, var: Ident },
    #[error("tag `{tag}` is declared twice in `{type_name}`")]
    DuplicateTag { type_name: Ident, tag: Ident },
}
