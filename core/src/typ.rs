//! Concrete data types and the registry of tagged types.
//!
//! A [DataType] is fully resolved: it doesn't contain any type or unit variable. Concrete types
//! are produced by [crate::jelly::JellyType::make_data_type] and can be lifted back with
//! [crate::jelly::JellyType::from_concrete].
//!
//! # Tagged types
//!
//! A tagged type is a declared sum type: a name, a list of type or unit parameters and a list of
//! tags, each of which optionally carries an inner type mentioning the parameters. The builtin
//! `Optional(a)` type, with tags `None` and `Is(a)`, is an example.
//!
//! Tagged types are nominal. A concrete [DataType::Tagged] only records the name of the type and
//! its arguments. The tags are expanded on demand through the registry (see
//! [TaggedTypeDefinition::instantiate_tags]), which is how a tagged type can mention itself
//! without being inlined.
use indexmap::IndexMap;
use std::{collections::BTreeMap, fmt};

use crate::{
    config::Config,
    error::{
        DeclarationError, InstantiationErrorKind, MaterializeError, TaggedInstantiationError,
    },
    identifier::Ident,
    jelly::{bindings::Substitution, JellyType},
    unit::{Unit, UnitManager},
};

/// The different flavours of dates and times.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DateTimeKind {
    /// A calendar date (`Date`).
    YearMonthDay,
    /// A month of a given year (`DateYM`).
    YearMonth,
    /// A time of the day (`Time`).
    TimeOfDay,
    /// A date and a time of the day (`DateTime`).
    DateTime,
    /// A date and a time of the day in a given time zone (`DateTimeZoned`).
    DateTimeZoned,
}

impl DateTimeKind {
    pub const ALL: [DateTimeKind; 5] = [
        DateTimeKind::YearMonthDay,
        DateTimeKind::YearMonth,
        DateTimeKind::TimeOfDay,
        DateTimeKind::DateTime,
        DateTimeKind::DateTimeZoned,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            DateTimeKind::YearMonthDay => "Date",
            DateTimeKind::YearMonth => "DateYM",
            DateTimeKind::TimeOfDay => "Time",
            DateTimeKind::DateTime => "DateTime",
            DateTimeKind::DateTimeZoned => "DateTimeZoned",
        }
    }
}

/// Types without any parameter, apart from numbers which have a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Bool,
    Text,
    Date(DateTimeKind),
}

impl PrimitiveType {
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "Boolean",
            PrimitiveType::Text => "Text",
            PrimitiveType::Date(kind) => kind.keyword(),
        }
    }
}

/// The kind of a tagged type parameter or of a variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeVarKind {
    Unit,
    Type,
}

impl fmt::Display for TypeVarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeVarKind::Unit => write!(f, "unit"),
            TypeVarKind::Type => write!(f, "type"),
        }
    }
}

/// An argument of a tagged type, or the value of a variable: either a unit or a type.
///
/// This is a generic definition, shared by the jelly, inference and concrete layers, which
/// instantiate `U` and `T` with their own unit and type representations. The two cases are never
/// merged: a unit parameter can't be filled with a type, and conversely.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeArgF<U, T> {
    Unit(U),
    Type(T),
}

impl<U, T> TypeArgF<U, T> {
    pub fn kind(&self) -> TypeVarKind {
        match self {
            TypeArgF::Unit(_) => TypeVarKind::Unit,
            TypeArgF::Type(_) => TypeVarKind::Type,
        }
    }

    pub fn map<U2, T2>(
        self,
        f_unit: impl FnOnce(U) -> U2,
        f_type: impl FnOnce(T) -> T2,
    ) -> TypeArgF<U2, T2> {
        match self {
            TypeArgF::Unit(u) => TypeArgF::Unit(f_unit(u)),
            TypeArgF::Type(t) => TypeArgF::Type(f_type(t)),
        }
    }
}

/// A concrete tagged type argument.
pub type DataTypeArg = TypeArgF<Unit, DataType>;

/// A concrete, fully resolved data type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Number(Unit),
    Primitive(PrimitiveType),
    Tagged {
        name: Ident,
        args: Vec<DataTypeArg>,
    },
    /// Concrete records are always complete and all their fields are required. Optional fields
    /// of jelly record types are materialized as fields of type `Optional(_)`.
    Record {
        fields: BTreeMap<Ident, DataType>,
    },
    Array(Box<DataType>),
    Function {
        params: Vec<DataType>,
        result: Box<DataType>,
    },
}

impl DataType {
    pub fn number(unit: Unit) -> Self {
        DataType::Number(unit)
    }

    pub fn scalar_number() -> Self {
        DataType::Number(Unit::scalar())
    }

    pub fn text() -> Self {
        DataType::Primitive(PrimitiveType::Text)
    }

    pub fn boolean() -> Self {
        DataType::Primitive(PrimitiveType::Bool)
    }

    pub fn date(kind: DateTimeKind) -> Self {
        DataType::Primitive(PrimitiveType::Date(kind))
    }

    pub fn tagged(name: impl Into<Ident>, args: Vec<DataTypeArg>) -> Self {
        DataType::Tagged {
            name: name.into(),
            args,
        }
    }

    pub fn record<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, DataType)>,
        S: Into<Ident>,
    {
        DataType::Record {
            fields: fields
                .into_iter()
                .map(|(name, typ)| (name.into(), typ))
                .collect(),
        }
    }

    pub fn array(elem: DataType) -> Self {
        DataType::Array(Box::new(elem))
    }

    pub fn function(params: Vec<DataType>, result: DataType) -> Self {
        DataType::Function {
            params,
            result: Box::new(result),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        JellyType::from_concrete(self).fmt(f)
    }
}

/// A tag of a tagged type, optionally carrying an inner value of type `T`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TagType<T> {
    pub name: Ident,
    pub inner: Option<T>,
}

impl<T> TagType<T> {
    pub fn new(name: impl Into<Ident>, inner: Option<T>) -> Self {
        TagType {
            name: name.into(),
            inner,
        }
    }
}

/// The declaration of a tagged type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaggedTypeDefinition {
    name: Ident,
    type_vars: Vec<(TypeVarKind, Ident)>,
    tags: Vec<TagType<JellyType>>,
}

impl TaggedTypeDefinition {
    /// Create a new definition. The inner types of the tags may mention the type variables by
    /// name (as [JellyType::Ident] for type variables, or unit variables inside units).
    pub fn new(
        name: impl Into<Ident>,
        type_vars: Vec<(TypeVarKind, Ident)>,
        tags: Vec<TagType<JellyType>>,
    ) -> Self {
        TaggedTypeDefinition {
            name: name.into(),
            type_vars,
            tags,
        }
    }

    pub fn name(&self) -> Ident {
        self.name
    }

    pub fn type_vars(&self) -> &[(TypeVarKind, Ident)] {
        &self.type_vars
    }

    pub fn tags(&self) -> &[TagType<JellyType>] {
        &self.tags
    }

    /// Check that `args` matches the declared parameters, in number and in kind.
    pub fn check_args(&self, args: &[DataTypeArg]) -> Result<(), TaggedInstantiationError> {
        if args.len() != self.type_vars.len() {
            return Err(TaggedInstantiationError {
                type_name: self.name,
                kind: InstantiationErrorKind::Arity {
                    expected: self.type_vars.len(),
                    found: args.len(),
                },
            });
        }

        for (position, ((expected, _), arg)) in self.type_vars.iter().zip(args).enumerate() {
            if *expected != arg.kind() {
                return Err(TaggedInstantiationError {
                    type_name: self.name,
                    kind: InstantiationErrorKind::Kind {
                        position,
                        expected: *expected,
                        found: arg.kind(),
                    },
                });
            }
        }

        Ok(())
    }

    /// Instantiate this tagged type with concrete arguments.
    pub fn instantiate(&self, args: Vec<DataTypeArg>) -> Result<DataType, TaggedInstantiationError> {
        self.check_args(&args)?;

        Ok(DataType::Tagged {
            name: self.name,
            args,
        })
    }

    /// Bind each declared parameter to the corresponding argument.
    pub fn substitution(
        &self,
        args: &[DataTypeArg],
    ) -> Result<Substitution, TaggedInstantiationError> {
        self.check_args(args)?;

        Ok(self
            .type_vars
            .iter()
            .zip(args)
            .map(|((_, var), arg)| (*var, arg.clone()))
            .collect())
    }

    /// Expand the tags of this type for the given arguments, making their inner types concrete.
    pub fn instantiate_tags(
        &self,
        args: &[DataTypeArg],
        registry: &dyn TypeRegistry,
    ) -> Result<Vec<TagType<DataType>>, MaterializeError> {
        let substitution = self.substitution(args)?;

        self.tags
            .iter()
            .map(|tag| {
                let inner = tag
                    .inner
                    .as_ref()
                    .map(|inner| inner.make_data_type(&substitution, registry))
                    .transpose()?;

                Ok(TagType::new(tag.name, inner))
            })
            .collect()
    }
}

/// The registry of known types and units against which jelly types are resolved.
pub trait TypeRegistry {
    /// All the known tagged types, builtin ones included.
    fn known_tagged_types(&self) -> &IndexMap<Ident, TaggedTypeDefinition>;

    /// The tagged type used to represent optional values, such as optional record fields.
    fn maybe_type(&self) -> &TaggedTypeDefinition;

    fn units(&self) -> &UnitManager;

    fn config(&self) -> &Config;

    /// Look up a tagged type by name and instantiate it with `args`. Return `Ok(None)` if the
    /// name is unknown.
    fn lookup_type(
        &self,
        name: Ident,
        args: Vec<DataTypeArg>,
    ) -> Result<Option<DataType>, TaggedInstantiationError> {
        self.known_tagged_types()
            .get(&name)
            .map(|def| def.instantiate(args))
            .transpose()
    }

    /// Wrap a type in the maybe type.
    fn make_maybe(&self, inner: DataType) -> Result<DataType, TaggedInstantiationError> {
        self.maybe_type().instantiate(vec![TypeArgF::Type(inner)])
    }
}

/// The standard implementation of [TypeRegistry].
#[derive(Clone, Debug)]
pub struct TypeManager {
    tagged: IndexMap<Ident, TaggedTypeDefinition>,
    maybe: TaggedTypeDefinition,
    units: UnitManager,
    config: Config,
}

impl TypeManager {
    /// The name of the builtin maybe type.
    pub const MAYBE_TYPE_NAME: &'static str = "Optional";

    /// Create a registry containing the builtin `Optional` type and no declared unit.
    pub fn new() -> Self {
        let var = Ident::new("a");
        let maybe = TaggedTypeDefinition::new(
            Self::MAYBE_TYPE_NAME,
            vec![(TypeVarKind::Type, var)],
            vec![
                TagType::new("None", None),
                TagType::new("Is", Some(JellyType::Ident(var))),
            ],
        );

        let mut tagged = IndexMap::new();
        tagged.insert(maybe.name(), maybe.clone());

        TypeManager {
            tagged,
            maybe,
            units: UnitManager::new(),
            config: Config::default(),
        }
    }

    pub fn with_units(mut self, mut units: UnitManager) -> Self {
        units.set_suggest_config(self.config.suggestions.clone());
        self.units = units;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.units.set_suggest_config(config.suggestions.clone());
        self.config = config;
        self
    }

    pub fn units_mut(&mut self) -> &mut UnitManager {
        &mut self.units
    }

    /// Declare a new tagged type.
    pub fn declare(&mut self, def: TaggedTypeDefinition) -> Result<(), DeclarationError> {
        let name = Ident::try_new(def.name.label())?;

        if name.is_keyword() {
            return Err(DeclarationError::Keyword(name));
        }

        if self.tagged.contains_key(&name) {
            return Err(DeclarationError::DuplicateType(name));
        }

        for (i, (_, var)) in def.type_vars.iter().enumerate() {
            Ident::try_new(var.label())?;

            if var.is_keyword() {
                return Err(DeclarationError::Keyword(*var));
            }

            if def.type_vars[..i].iter().any(|(_, other)| other == var) {
                return Err(DeclarationError::DuplicateTypeVariable {
                    type_name: name,
                    var: *var,
                });
            }
        }

        for (i, tag) in def.tags.iter().enumerate() {
            if def.tags[..i].iter().any(|other| other.name == tag.name) {
                return Err(DeclarationError::DuplicateTag {
                    type_name: name,
                    tag: tag.name,
                });
            }
        }

        log::debug!("declaring tagged type `{name}`");
        self.tagged.insert(name, def);
        Ok(())
    }
}

impl Default for TypeManager {
    fn default() -> Self {
        TypeManager::new()
    }
}

impl TypeRegistry for TypeManager {
    fn known_tagged_types(&self) -> &IndexMap<Ident, TaggedTypeDefinition> {
        &self.tagged
    }

    fn maybe_type(&self) -> &TaggedTypeDefinition {
        &self.maybe
    }

    fn units(&self) -> &UnitManager {
        &self.units
    }

    fn config(&self) -> &Config {
        &self.config
    }
}
