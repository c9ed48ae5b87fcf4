use std::ops::Range;

use crate::error::UnknownUnitError;

/// A byte range in the parsed source.
pub type Span = Range<usize>;

/// An error occurring while parsing a type or a unit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The source contains a character which can't start any token.
    #[error("unexpected character at {span:?}")]
    Lexical { span: Span },
    #[error("unexpected `{found}` at {span:?}, expected {expected}")]
    UnexpectedToken {
        span: Span,
        found: String,
        expected: String,
    },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
    /// A unit power which doesn't fit, or a number other than `1` used as a unit.
    #[error("invalid exponent at {span:?}")]
    InvalidExponent { span: Span },
    /// Unit divisions can't be chained without brackets, as in `m/s/s`.
    #[error("chained unit division at {span:?}: use brackets, as in `m/(s*s)`")]
    ChainedDivision { span: Span },
    /// A record type lists the same field twice.
    #[error("field `{name}` is repeated at {span:?}")]
    DuplicateField { span: Span, name: String },
    #[error(transparent)]
    UnknownUnit(#[from] UnknownUnitError),
}
