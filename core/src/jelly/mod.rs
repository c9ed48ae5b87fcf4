//! Jelly types: data types which may still contain named type and unit variables.
//!
//! A jelly type is what users write in a column declaration or a function signature, for example
//! `Number{m/s}`, `[Optional(Text)]` or `((Number{@unitvar u}, a) -> [a])`. It is turned into:
//!
//! - a [crate::typecheck::TypeExp] for inference, by [JellyType::make_type_exp], where the
//!   variables are replaced by unification variables;
//! - a concrete [crate::typ::DataType], by [JellyType::make_data_type], once every variable has a
//!   value. This is where names are checked against the registry, and where suggestions are
//!   computed for unknown names.
//!
//! Both conversions are implemented as visitors (see [JellyTypeVisitor]).
use std::collections::BTreeMap;

use crate::{
    error::{InternalError, MaterializeError, ParseError},
    identifier::{Ident, InvalidIdentError},
    typ::{DataType, DateTimeKind, PrimitiveType, TypeArgF, TypeRegistry},
    typecheck::TypeExp,
    unit::UnitManager,
};

pub mod bindings;
mod lower;
pub mod materialize;
pub mod unit;

pub use unit::{JellyUnit, UnitAtom};

use bindings::{ExpBindings, Substitution};

/// A tagged type argument which may contain variables.
pub type JellyTypeArg = TypeArgF<JellyUnit, JellyType>;

/// A record field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub typ: JellyType,
    /// A non-required field is materialized as a field of type `Optional(typ)`.
    pub required: bool,
}

impl Field {
    pub fn required(typ: JellyType) -> Self {
        Field {
            typ,
            required: true,
        }
    }

    pub fn optional(typ: JellyType) -> Self {
        Field {
            typ,
            required: false,
        }
    }
}

/// A data type which may contain type and unit variables.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum JellyType {
    Primitive(PrimitiveType),
    Number(JellyUnit),
    /// Either a tagged type without arguments or a type variable. Which one is only decided when
    /// the type is resolved against bindings and a registry.
    Ident(Ident),
    /// A tagged type applied to arguments.
    Apply {
        name: Ident,
        args: Vec<JellyTypeArg>,
    },
    /// A record type. An incomplete record accepts fields which aren't listed.
    Record {
        fields: BTreeMap<Ident, Field>,
        complete: bool,
    },
    Array(Box<JellyType>),
    Function {
        params: Vec<JellyType>,
        result: Box<JellyType>,
    },
}

/// A visitor over the variants of [JellyType]. [JellyType::apply] calls exactly one of the
/// methods, depending on the variant. Visitors recurse into sub-types by calling
/// [JellyType::apply] on them.
pub trait JellyTypeVisitor {
    type Output;
    type Error;

    fn visit_primitive(&mut self, prim: PrimitiveType) -> Result<Self::Output, Self::Error>;

    fn visit_number(&mut self, unit: &JellyUnit) -> Result<Self::Output, Self::Error>;

    fn visit_ident(&mut self, name: Ident) -> Result<Self::Output, Self::Error>;

    fn visit_apply(
        &mut self,
        name: Ident,
        args: &[JellyTypeArg],
    ) -> Result<Self::Output, Self::Error>;

    fn visit_record(
        &mut self,
        fields: &BTreeMap<Ident, Field>,
        complete: bool,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_array(&mut self, elem: &JellyType) -> Result<Self::Output, Self::Error>;

    fn visit_function(
        &mut self,
        params: &[JellyType],
        result: &JellyType,
    ) -> Result<Self::Output, Self::Error>;
}

impl JellyType {
    pub fn number(unit: JellyUnit) -> Self {
        JellyType::Number(unit)
    }

    pub fn scalar_number() -> Self {
        JellyType::Number(JellyUnit::scalar())
    }

    pub fn text() -> Self {
        JellyType::Primitive(PrimitiveType::Text)
    }

    pub fn boolean() -> Self {
        JellyType::Primitive(PrimitiveType::Bool)
    }

    pub fn date(kind: DateTimeKind) -> Self {
        JellyType::Primitive(PrimitiveType::Date(kind))
    }

    pub fn ident(name: impl Into<Ident>) -> Self {
        JellyType::Ident(name.into())
    }

    /// A reference to a tagged type. Without arguments, this is a [JellyType::Ident].
    pub fn tagged(name: impl Into<Ident>, args: Vec<JellyTypeArg>) -> Self {
        let name = name.into();

        if args.is_empty() {
            JellyType::Ident(name)
        } else {
            JellyType::Apply { name, args }
        }
    }

    /// A record type. Field names aren't checked: a name which isn't a valid identifier can't be
    /// parsed back after [JellyType::save]. Use [JellyType::try_record] for user-provided names.
    pub fn record<I, S>(fields: I, complete: bool) -> Self
    where
        I: IntoIterator<Item = (S, Field)>,
        S: Into<Ident>,
    {
        JellyType::Record {
            fields: fields
                .into_iter()
                .map(|(name, field)| (name.into(), field))
                .collect(),
            complete,
        }
    }

    /// Like [JellyType::record], but fail on the first field name which isn't a valid identifier.
    pub fn try_record<I, S>(fields: I, complete: bool) -> Result<Self, InvalidIdentError>
    where
        I: IntoIterator<Item = (S, Field)>,
        S: AsRef<str>,
    {
        let fields: BTreeMap<_, _> = fields
            .into_iter()
            .map(|(name, field)| Ok((Ident::try_new(name)?, field)))
            .collect::<Result<_, InvalidIdentError>>()?;

        Ok(JellyType::Record { fields, complete })
    }

    pub fn array(elem: JellyType) -> Self {
        JellyType::Array(Box::new(elem))
    }

    pub fn function(params: Vec<JellyType>, result: JellyType) -> Self {
        JellyType::Function {
            params,
            result: Box::new(result),
        }
    }

    /// Dispatch on the variant of this type.
    pub fn apply<V: JellyTypeVisitor>(&self, visitor: &mut V) -> Result<V::Output, V::Error> {
        match self {
            JellyType::Primitive(prim) => visitor.visit_primitive(*prim),
            JellyType::Number(unit) => visitor.visit_number(unit),
            JellyType::Ident(name) => visitor.visit_ident(*name),
            JellyType::Apply { name, args } => visitor.visit_apply(*name, args),
            JellyType::Record { fields, complete } => visitor.visit_record(fields, *complete),
            JellyType::Array(elem) => visitor.visit_array(elem),
            JellyType::Function { params, result } => visitor.visit_function(params, result),
        }
    }

    /// Lift a concrete type. Tagged types without arguments are lifted as [JellyType::Ident].
    pub fn from_concrete(typ: &DataType) -> Self {
        match typ {
            DataType::Number(unit) => JellyType::Number(JellyUnit::from_concrete(unit)),
            DataType::Primitive(prim) => JellyType::Primitive(*prim),
            DataType::Tagged { name, args } => JellyType::tagged(
                *name,
                args.iter()
                    .map(|arg| {
                        arg.clone()
                            .map(|unit| JellyUnit::from_concrete(&unit), |typ| {
                                JellyType::from_concrete(&typ)
                            })
                    })
                    .collect(),
            ),
            DataType::Record { fields } => JellyType::Record {
                fields: fields
                    .iter()
                    .map(|(name, typ)| (*name, Field::required(JellyType::from_concrete(typ))))
                    .collect(),
                complete: true,
            },
            DataType::Array(elem) => JellyType::array(JellyType::from_concrete(elem)),
            DataType::Function { params, result } => JellyType::function(
                params.iter().map(JellyType::from_concrete).collect(),
                JellyType::from_concrete(result),
            ),
        }
    }

    /// Lower this type to the inference IR. Type and unit variables are looked up in `bindings`.
    ///
    /// A name which isn't bound is kept as a reference to a tagged type without arguments: this
    /// never fails on unknown names.
    pub fn make_type_exp(&self, bindings: &ExpBindings) -> Result<TypeExp, InternalError> {
        log::debug!("lowering `{self}`");
        self.apply(&mut lower::Lowering::new(bindings))
    }

    /// Make a concrete type, using `substitution` for type and unit variables and `registry` to
    /// resolve tagged types.
    pub fn make_data_type(
        &self,
        substitution: &Substitution,
        registry: &dyn TypeRegistry,
    ) -> Result<DataType, MaterializeError> {
        log::debug!("materializing `{self}`");
        self.apply(&mut materialize::Materializer::new(substitution, registry))
    }

    /// Call `f` with the name of each tagged type application in this type, in a depth-first
    /// order. Bare identifiers aren't reported, since they may be type variables.
    pub fn for_nested_tagged(&self, f: &mut impl FnMut(Ident)) {
        match self {
            JellyType::Primitive(_) | JellyType::Number(_) | JellyType::Ident(_) => (),
            JellyType::Apply { name, args } => {
                f(*name);

                for arg in args {
                    if let TypeArgF::Type(typ) = arg {
                        typ.for_nested_tagged(f);
                    }
                }
            }
            JellyType::Record { fields, .. } => {
                for field in fields.values() {
                    field.typ.for_nested_tagged(f);
                }
            }
            JellyType::Array(elem) => elem.for_nested_tagged(f),
            JellyType::Function { params, result } => {
                for param in params {
                    param.for_nested_tagged(f);
                }
                result.for_nested_tagged(f);
            }
        }
    }

    /// Replace each sub-type equal to `target` with `replacement`. This is how a suggestion
    /// attached to a [crate::error::UnknownTypeError] is applied to the type which failed.
    pub fn replace(&self, target: &JellyType, replacement: &JellyType) -> JellyType {
        if self == target {
            return replacement.clone();
        }

        let replace = |typ: &JellyType| typ.replace(target, replacement);

        match self {
            JellyType::Primitive(_) | JellyType::Number(_) | JellyType::Ident(_) => self.clone(),
            JellyType::Apply { name, args } => JellyType::Apply {
                name: *name,
                args: args
                    .iter()
                    .map(|arg| match arg {
                        TypeArgF::Unit(unit) => TypeArgF::Unit(unit.clone()),
                        TypeArgF::Type(typ) => TypeArgF::Type(replace(typ)),
                    })
                    .collect(),
            },
            JellyType::Record { fields, complete } => JellyType::Record {
                fields: fields
                    .iter()
                    .map(|(name, field)| {
                        (
                            *name,
                            Field {
                                typ: replace(&field.typ),
                                required: field.required,
                            },
                        )
                    })
                    .collect(),
                complete: *complete,
            },
            JellyType::Array(elem) => JellyType::array(replace(elem)),
            JellyType::Function { params, result } => {
                JellyType::function(params.iter().map(replace).collect(), replace(result))
            }
        }
    }

    /// Parse a type, resolving unit names against `units`.
    pub fn parse(src: &str, units: &UnitManager) -> Result<Self, ParseError> {
        crate::parser::parse_type(src, units)
    }

    /// The textual representation of this type, which [Self::parse] reads back.
    pub fn save(&self) -> String {
        self.to_string()
    }
}
