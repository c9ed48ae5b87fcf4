//! Errors raised by unification and by reading back the unification table.
use crate::{
    error::TaggedInstantiationError,
    identifier::Ident,
    typ::TypeVarKind,
};

use super::{TypeExp, UnitExp, VarId};

/// An error occurring during unification.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UnifError {
    /// The two types have different shapes.
    #[error("type mismatch: expected `{expected:?}`, found `{found:?}`")]
    TypeMismatch { expected: TypeExp, found: TypeExp },
    /// The two units have different dimensions, and no unit variable can make them equal.
    #[error("unit mismatch: expected `{expected:?}`, found `{found:?}`")]
    UnitMismatch { expected: UnitExp, found: UnitExp },
    /// The same tagged type is applied to a different number of arguments.
    #[error("tagged type `{name}` applied to {expected} and {found} argument(s)")]
    TaggedArity {
        name: Ident,
        expected: usize,
        found: usize,
    },
    /// A unit argument is matched against a type argument.
    #[error("argument {position} of `{name}` is a {expected} on one side and a {found} on the other")]
    ArgKindMismatch {
        name: Ident,
        position: usize,
        expected: TypeVarKind,
        found: TypeVarKind,
    },
    #[error("function arity mismatch: expected {expected} parameter(s), found {found}")]
    FunctionArity { expected: usize, found: usize },
    /// A field of the expected record is missing from a complete record.
    #[error("missing field `{0}`")]
    MissingField(Ident),
    /// A complete record is expected, but the other record has an additional field.
    #[error("extra field `{0}`")]
    ExtraField(Ident),
    /// A field is required on one side and optional on the other.
    #[error("field `{0}` is required on one side and optional on the other")]
    FieldOptionality(Ident),
    #[error("mismatch in field `{field}`: {cause}")]
    RecordFieldMismatch { field: Ident, cause: Box<UnifError> },
    /// Unifying would create a cyclic type.
    #[error("cannot construct the infinite type `?{var} = {typ:?}`")]
    OccursCheck { var: VarId, typ: TypeExp },
    /// A unification variable has no value yet.
    #[error("unification variable ?{var} ({kind}) is unsolved")]
    UnsolvedVar { var: VarId, kind: TypeVarKind },
    /// A named variable couldn't be determined by inference.
    #[error("cannot determine the {kind} `{name}`")]
    Unsolved { name: Ident, kind: TypeVarKind },
    /// An open record can't be read back as a concrete type.
    #[error("an open record type cannot be made concrete")]
    OpenRecord,
    /// A tagged type reference doesn't match any known tagged type.
    #[error("unknown type `{0}`")]
    UnknownType(Ident),
    #[error(transparent)]
    Instantiation(#[from] TaggedInstantiationError),
}
