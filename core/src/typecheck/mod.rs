//! The intermediate representation of types used during inference.
//!
//! Jelly types are lowered to [TypeExp]s (see [crate::jelly::JellyType::make_type_exp]), where
//! named variables have been replaced by unification variables allocated in a [unif::UnifTable].
//! Inference then unifies type expressions together, and the table is finally read back as a
//! concrete [crate::jelly::bindings::Substitution] (see [unif::UnifTable::solve]).
//!
//! Unresolved names are kept as zero-argument [TypeExp::Tagged] nodes: they are only checked
//! against the type registry when they are read back, so that lowering never fails on an unknown
//! name.
use std::collections::BTreeMap;

use crate::{
    identifier::Ident,
    typ::{PrimitiveType, TypeArgF},
    unit::{SingleUnit, Unit},
};

pub mod error;
pub mod unif;

pub use unif::{UnifTable, VarId};

/// An atom of a unit expression.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitAtomExp {
    UnifVar(VarId),
    Unit(SingleUnit),
}

/// A unit expression: a product of unit unification variables and concrete units raised to
/// non-zero powers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct UnitExp {
    atoms: BTreeMap<UnitAtomExp, i32>,
}

impl UnitExp {
    pub fn scalar() -> Self {
        UnitExp::default()
    }

    pub fn unif_var(id: VarId) -> Self {
        UnitExp::from_atoms([(UnitAtomExp::UnifVar(id), 1)])
    }

    pub fn single(unit: SingleUnit) -> Self {
        UnitExp::from_atoms([(UnitAtomExp::Unit(unit), 1)])
    }

    pub fn from_concrete(unit: &Unit) -> Self {
        UnitExp::from_atoms(
            unit.powers()
                .map(|(unit, power)| (UnitAtomExp::Unit(unit.clone()), power)),
        )
    }

    pub fn from_atoms(atoms: impl IntoIterator<Item = (UnitAtomExp, i32)>) -> Self {
        let mut result = UnitExp::scalar();

        for (atom, power) in atoms {
            result.add_power(atom, power);
        }

        result
    }

    fn add_power(&mut self, atom: UnitAtomExp, power: i32) {
        let power = self.atoms.get(&atom).copied().unwrap_or(0).saturating_add(power);

        if power == 0 {
            self.atoms.remove(&atom);
        } else {
            self.atoms.insert(atom, power);
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn atoms(&self) -> impl Iterator<Item = (&UnitAtomExp, i32)> {
        self.atoms.iter().map(|(atom, power)| (atom, *power))
    }

    /// The unification variables occurring in this unit expression, with their powers.
    pub fn unif_vars(&self) -> impl Iterator<Item = (VarId, i32)> + '_ {
        self.atoms().filter_map(|(atom, power)| match atom {
            UnitAtomExp::UnifVar(id) => Some((*id, power)),
            UnitAtomExp::Unit(_) => None,
        })
    }

    pub fn times(&self, other: &UnitExp) -> UnitExp {
        let mut result = self.clone();

        for (atom, power) in other.atoms() {
            result.add_power(atom.clone(), power);
        }

        result
    }

    pub fn divide_by(&self, other: &UnitExp) -> UnitExp {
        self.times(&other.raise_by(-1))
    }

    /// Raise every atom to `power`. Exponents saturate at the bounds of `i32`, like in
    /// [Self::times].
    pub fn raise_by(&self, power: i32) -> UnitExp {
        UnitExp::from_atoms(
            self.atoms()
                .map(|(atom, atom_power)| (atom.clone(), atom_power.saturating_mul(power))),
        )
    }

    /// Divide two unit expressions, or return `None` if an exponent overflows.
    pub fn checked_divide_by(&self, other: &UnitExp) -> Option<UnitExp> {
        let mut result = self.clone();

        for (atom, power) in other.atoms() {
            let power = result
                .atoms
                .get(atom)
                .copied()
                .unwrap_or(0)
                .checked_sub(power)?;

            if power == 0 {
                result.atoms.remove(atom);
            } else {
                result.atoms.insert(atom.clone(), power);
            }
        }

        Some(result)
    }

    /// Return the concrete unit denoted by this expression, or `None` if it contains a
    /// unification variable.
    pub fn as_concrete(&self) -> Option<Unit> {
        self.atoms()
            .map(|(atom, power)| match atom {
                UnitAtomExp::Unit(unit) => Some((unit.clone(), power)),
                UnitAtomExp::UnifVar(_) => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Unit::from_powers)
    }
}

/// A tagged type argument in the inference IR.
pub type TypeExpArg = TypeArgF<UnitExp, TypeExp>;

/// A record field in the inference IR.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldExp {
    pub typ: TypeExp,
    pub required: bool,
}

/// A type expression, as manipulated by inference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeExp {
    UnifVar(VarId),
    Number(UnitExp),
    Primitive(PrimitiveType),
    Tagged {
        name: Ident,
        args: Vec<TypeExpArg>,
    },
    Record {
        fields: BTreeMap<Ident, FieldExp>,
        complete: bool,
    },
    Array(Box<TypeExp>),
    Function {
        params: Vec<TypeExp>,
        result: Box<TypeExp>,
    },
}
