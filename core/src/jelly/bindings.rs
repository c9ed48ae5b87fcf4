//! Bindings of named type and unit variables.
//!
//! Each entry records whether the variable stands for a unit or for a type. Looking a variable up
//! with the wrong kind is an [InternalError]: it means the caller built the bindings for a
//! different declaration than the one being resolved.
use std::collections::{btree_map, BTreeMap};

use crate::{
    error::InternalError,
    identifier::Ident,
    typ::{DataType, TypeArgF, TypeVarKind},
    typecheck::{TypeExp, UnifTable, UnitExp},
    unit::Unit,
};

/// A map from variable names to units of type `U` or types of type `T`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bindings<U, T> {
    entries: BTreeMap<Ident, TypeArgF<U, T>>,
}

/// Bindings used to lower jelly types to the inference IR.
pub type ExpBindings = Bindings<UnitExp, TypeExp>;

/// Bindings used to make concrete types out of jelly types.
pub type Substitution = Bindings<Unit, DataType>;

impl<U, T> Default for Bindings<U, T> {
    fn default() -> Self {
        Bindings {
            entries: BTreeMap::new(),
        }
    }
}

impl<U, T> Bindings<U, T> {
    pub fn new() -> Self {
        Bindings::default()
    }

    /// Bind `name`, returning the previous binding if any.
    pub fn insert(&mut self, name: Ident, value: TypeArgF<U, T>) -> Option<TypeArgF<U, T>> {
        self.entries.insert(name, value)
    }

    pub fn insert_unit(&mut self, name: impl Into<Ident>, unit: U) -> Option<TypeArgF<U, T>> {
        self.insert(name.into(), TypeArgF::Unit(unit))
    }

    pub fn insert_type(&mut self, name: impl Into<Ident>, typ: T) -> Option<TypeArgF<U, T>> {
        self.insert(name.into(), TypeArgF::Type(typ))
    }

    pub fn get(&self, name: Ident) -> Option<&TypeArgF<U, T>> {
        self.entries.get(&name)
    }

    /// Look up a unit variable. The variable must be bound, and bound to a unit.
    pub fn unit(&self, name: Ident) -> Result<&U, InternalError> {
        match self.entries.get(&name) {
            Some(TypeArgF::Unit(unit)) => Ok(unit),
            Some(TypeArgF::Type(_)) => Err(kind_mismatch(name, TypeVarKind::Unit)),
            None => Err(InternalError::new(format!(
                "unit variable `{name}` is not bound"
            ))),
        }
    }

    /// Look up a type variable. Unlike units, an absent name isn't an error, since it can refer
    /// to a tagged type instead: `Ok(None)` is returned in that case.
    pub fn type_var(&self, name: Ident) -> Result<Option<&T>, InternalError> {
        match self.entries.get(&name) {
            Some(TypeArgF::Type(typ)) => Ok(Some(typ)),
            Some(TypeArgF::Unit(_)) => Err(kind_mismatch(name, TypeVarKind::Type)),
            None => Ok(None),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ident, &TypeArgF<U, T>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn kind_mismatch(name: Ident, expected: TypeVarKind) -> InternalError {
    let found = match expected {
        TypeVarKind::Unit => TypeVarKind::Type,
        TypeVarKind::Type => TypeVarKind::Unit,
    };

    InternalError::new(format!(
        "variable `{name}` is bound to a {found}, but it's used as a {expected}"
    ))
}

impl ExpBindings {
    /// Bind each variable to a fresh unification variable of the corresponding kind.
    pub fn fresh_for(vars: &[(TypeVarKind, Ident)], table: &mut UnifTable) -> Self {
        vars.iter()
            .map(|(kind, name)| {
                let value = match kind {
                    TypeVarKind::Unit => TypeArgF::Unit(table.fresh_unit_uvar()),
                    TypeVarKind::Type => TypeArgF::Type(table.fresh_type_uvar()),
                };

                (*name, value)
            })
            .collect()
    }
}

impl<U, T> FromIterator<(Ident, TypeArgF<U, T>)> for Bindings<U, T> {
    fn from_iter<I: IntoIterator<Item = (Ident, TypeArgF<U, T>)>>(iter: I) -> Self {
        Bindings {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<U, T> IntoIterator for Bindings<U, T> {
    type Item = (Ident, TypeArgF<U, T>);
    type IntoIter = btree_map::IntoIter<Ident, TypeArgF<U, T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
