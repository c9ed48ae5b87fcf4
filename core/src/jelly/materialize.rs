//! Materialization of jelly types into concrete data types, and suggestions for unknown names.
use std::collections::BTreeMap;

use crate::{
    error::{
        suggest::{self, Candidate},
        MaterializeError, UnknownTypeError,
    },
    identifier::Ident,
    typ::{DataType, DateTimeKind, PrimitiveType, TypeArgF, TypeRegistry},
};

use super::{bindings::Substitution, Field, JellyType, JellyTypeArg, JellyTypeVisitor, JellyUnit};

/// Names commonly used for builtin types in other languages, and the type they correspond to.
const BUILTIN_ALIASES: &[(&str, BuiltinType)] = &[
    ("int", BuiltinType::Number),
    ("integer", BuiltinType::Number),
    ("float", BuiltinType::Number),
    ("double", BuiltinType::Number),
    ("num", BuiltinType::Number),
    ("number", BuiltinType::Number),
    ("bool", BuiltinType::Primitive(PrimitiveType::Bool)),
    ("boolean", BuiltinType::Primitive(PrimitiveType::Bool)),
    ("string", BuiltinType::Primitive(PrimitiveType::Text)),
    ("str", BuiltinType::Primitive(PrimitiveType::Text)),
    ("text", BuiltinType::Primitive(PrimitiveType::Text)),
    (
        "date",
        BuiltinType::Primitive(PrimitiveType::Date(DateTimeKind::YearMonthDay)),
    ),
    (
        "datetime",
        BuiltinType::Primitive(PrimitiveType::Date(DateTimeKind::DateTime)),
    ),
    (
        "time",
        BuiltinType::Primitive(PrimitiveType::Date(DateTimeKind::TimeOfDay)),
    ),
];

#[derive(Clone, Copy)]
enum BuiltinType {
    Number,
    Primitive(PrimitiveType),
}

impl BuiltinType {
    fn keyword(self) -> &'static str {
        match self {
            BuiltinType::Number => "Number",
            BuiltinType::Primitive(prim) => prim.keyword(),
        }
    }

    fn to_jelly(self) -> JellyType {
        match self {
            BuiltinType::Number => JellyType::scalar_number(),
            BuiltinType::Primitive(prim) => JellyType::Primitive(prim),
        }
    }
}

fn builtin_types() -> impl Iterator<Item = BuiltinType> {
    [
        BuiltinType::Number,
        BuiltinType::Primitive(PrimitiveType::Bool),
        BuiltinType::Primitive(PrimitiveType::Text),
    ]
    .into_iter()
    .chain(
        DateTimeKind::ALL
            .into_iter()
            .map(|kind| BuiltinType::Primitive(PrimitiveType::Date(kind))),
    )
}

/// Suggest replacements for an unknown identifier: builtin types, either by keyword or by a
/// common alias, and known tagged types.
pub fn suggest_for_ident(name: Ident, registry: &dyn TypeRegistry) -> Vec<JellyType> {
    let config = &registry.config().suggestions;

    let builtins = builtin_types().map(|builtin| Candidate::new(builtin.keyword(), builtin));
    let aliases = if config.builtin_aliases {
        BUILTIN_ALIASES
    } else {
        &[]
    };
    let aliases = aliases
        .iter()
        .map(|(alias, builtin)| Candidate::new(*alias, *builtin));

    let pool = builtins
        .chain(aliases)
        .map(|candidate| Candidate::new(candidate.name, candidate.replacement.to_jelly()))
        .chain(
            registry
                .known_tagged_types()
                .keys()
                .map(|tagged| Candidate::new(tagged.label(), JellyType::Ident(*tagged))),
        );

    suggest::ranked_matches(pool, name.label(), config).collect()
}

/// Suggest replacements for an unknown tagged type applied to `args`: known tagged types applied
/// to the same arguments.
pub fn suggest_for_apply(
    name: Ident,
    args: &[JellyTypeArg],
    registry: &dyn TypeRegistry,
) -> Vec<JellyType> {
    let pool = registry.known_tagged_types().keys().map(|tagged| {
        Candidate::new(
            tagged.label(),
            JellyType::Apply {
                name: *tagged,
                args: args.to_vec(),
            },
        )
    });

    suggest::ranked_matches(pool, name.label(), &registry.config().suggestions).collect()
}

pub(super) struct Materializer<'a> {
    substitution: &'a Substitution,
    registry: &'a dyn TypeRegistry,
}

impl<'a> Materializer<'a> {
    pub(super) fn new(substitution: &'a Substitution, registry: &'a dyn TypeRegistry) -> Self {
        Materializer {
            substitution,
            registry,
        }
    }
}

impl JellyTypeVisitor for Materializer<'_> {
    type Output = DataType;
    type Error = MaterializeError;

    fn visit_primitive(&mut self, prim: PrimitiveType) -> Result<DataType, MaterializeError> {
        Ok(DataType::Primitive(prim))
    }

    fn visit_number(&mut self, unit: &JellyUnit) -> Result<DataType, MaterializeError> {
        Ok(DataType::Number(unit.make_unit(self.substitution)?))
    }

    fn visit_ident(&mut self, name: Ident) -> Result<DataType, MaterializeError> {
        if let Some(typ) = self.substitution.type_var(name)? {
            return Ok(typ.clone());
        }

        match self.registry.lookup_type(name, vec![])? {
            Some(typ) => Ok(typ),
            None => Err(UnknownTypeError {
                message: format!("unknown type `{name}`"),
                node: JellyType::Ident(name),
                suggestions: suggest_for_ident(name, self.registry),
            }
            .into()),
        }
    }

    fn visit_apply(
        &mut self,
        name: Ident,
        args: &[JellyTypeArg],
    ) -> Result<DataType, MaterializeError> {
        let concrete_args = args
            .iter()
            .map(|arg| match arg {
                TypeArgF::Unit(unit) => Ok(TypeArgF::Unit(unit.make_unit(self.substitution)?)),
                TypeArgF::Type(typ) => Ok(TypeArgF::Type(typ.apply(self)?)),
            })
            .collect::<Result<_, MaterializeError>>()?;

        match self.registry.lookup_type(name, concrete_args)? {
            Some(typ) => Ok(typ),
            None => Err(UnknownTypeError {
                message: format!("unknown tagged type `{name}`"),
                node: JellyType::Apply {
                    name,
                    args: args.to_vec(),
                },
                suggestions: suggest_for_apply(name, args, self.registry),
            }
            .into()),
        }
    }

    fn visit_record(
        &mut self,
        fields: &BTreeMap<Ident, Field>,
        complete: bool,
    ) -> Result<DataType, MaterializeError> {
        if !complete {
            let node = JellyType::Record {
                fields: fields.clone(),
                complete,
            };
            let closed = JellyType::Record {
                fields: fields.clone(),
                complete: true,
            };

            return Err(UnknownTypeError {
                message: "an open record type can't be used as a concrete type".to_owned(),
                node,
                suggestions: vec![closed],
            }
            .into());
        }

        let fields = fields
            .iter()
            .map(|(name, field)| {
                let typ = field.typ.apply(self)?;
                let typ = if field.required {
                    typ
                } else {
                    self.registry.make_maybe(typ)?
                };

                Ok((*name, typ))
            })
            .collect::<Result<_, MaterializeError>>()?;

        Ok(DataType::Record { fields })
    }

    fn visit_array(&mut self, elem: &JellyType) -> Result<DataType, MaterializeError> {
        Ok(DataType::array(elem.apply(self)?))
    }

    fn visit_function(
        &mut self,
        params: &[JellyType],
        result: &JellyType,
    ) -> Result<DataType, MaterializeError> {
        let params = params
            .iter()
            .map(|param| param.apply(self))
            .collect::<Result<_, _>>()?;

        Ok(DataType::function(params, result.apply(self)?))
    }
}
