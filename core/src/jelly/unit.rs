//! Units of measure which may contain unit variables.
use std::collections::BTreeMap;

use crate::{
    error::{InternalError, ParseError},
    identifier::Ident,
    typecheck::UnitExp,
    unit::{SingleUnit, Unit, UnitManager},
};

use super::bindings::{ExpBindings, Substitution};

/// An atom of a jelly unit. The derived ordering puts unit variables before concrete units, each
/// group being ordered by name: this is the order in which atoms are printed.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitAtom {
    Var(Ident),
    Unit(SingleUnit),
}

/// A unit of measure, written for example `m*s^-2` or `@unitvar u/s`: a product of unit
/// variables and declared units raised to non-zero powers. The empty product is the scalar unit,
/// written `1`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct JellyUnit {
    atoms: BTreeMap<UnitAtom, i32>,
}

impl JellyUnit {
    pub fn scalar() -> Self {
        JellyUnit::default()
    }

    pub fn unit_variable(name: impl Into<Ident>) -> Self {
        JellyUnit::from_atoms([(UnitAtom::Var(name.into()), 1)])
    }

    pub fn single(unit: SingleUnit) -> Self {
        JellyUnit::from_atoms([(UnitAtom::Unit(unit), 1)])
    }

    pub fn from_concrete(unit: &Unit) -> Self {
        JellyUnit::from_atoms(
            unit.powers()
                .map(|(unit, power)| (UnitAtom::Unit(unit.clone()), power)),
        )
    }

    /// Build a unit from atoms and their powers. Powers of the same atom are added together, and
    /// atoms with a null power are dropped.
    pub fn from_atoms(atoms: impl IntoIterator<Item = (UnitAtom, i32)>) -> Self {
        let mut result = JellyUnit::scalar();

        for (atom, power) in atoms {
            result.add_power(atom, power);
        }

        result
    }

    fn power_of(&self, atom: &UnitAtom) -> i32 {
        self.atoms.get(atom).copied().unwrap_or(0)
    }

    fn set_power(&mut self, atom: UnitAtom, power: i32) {
        if power == 0 {
            self.atoms.remove(&atom);
        } else {
            self.atoms.insert(atom, power);
        }
    }

    fn add_power(&mut self, atom: UnitAtom, power: i32) {
        let power = self.power_of(&atom).saturating_add(power);
        self.set_power(atom, power);
    }

    fn checked_add_power(&mut self, atom: UnitAtom, power: i32) -> Option<()> {
        let power = self.power_of(&atom).checked_add(power)?;
        self.set_power(atom, power);
        Some(())
    }

    pub fn is_scalar(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn atoms(&self) -> impl Iterator<Item = (&UnitAtom, i32)> {
        self.atoms.iter().map(|(atom, power)| (atom, *power))
    }

    // Exponents saturate at the bounds of `i32` in `times`, `divide_by` and `raise_by`. The
    // `checked_` variants report an overflow instead.

    pub fn times(&self, other: &JellyUnit) -> JellyUnit {
        let mut result = self.clone();

        for (atom, power) in other.atoms() {
            result.add_power(atom.clone(), power);
        }

        result
    }

    pub fn divide_by(&self, other: &JellyUnit) -> JellyUnit {
        self.times(&other.raise_by(-1))
    }

    pub fn raise_by(&self, power: i32) -> JellyUnit {
        JellyUnit::from_atoms(
            self.atoms()
                .map(|(atom, atom_power)| (atom.clone(), atom_power.saturating_mul(power))),
        )
    }

    /// Multiply two units, or return `None` if an exponent overflows.
    pub fn checked_times(&self, other: &JellyUnit) -> Option<JellyUnit> {
        let mut result = self.clone();

        for (atom, power) in other.atoms() {
            result.checked_add_power(atom.clone(), power)?;
        }

        Some(result)
    }

    pub fn checked_divide_by(&self, other: &JellyUnit) -> Option<JellyUnit> {
        self.checked_times(&other.checked_raise_by(-1)?)
    }

    pub fn checked_raise_by(&self, power: i32) -> Option<JellyUnit> {
        self.atoms()
            .try_fold(JellyUnit::scalar(), |mut acc, (atom, atom_power)| {
                acc.checked_add_power(atom.clone(), atom_power.checked_mul(power)?)?;
                Some(acc)
            })
    }

    /// Lower this unit to the inference IR. Every unit variable must be bound to a unit in
    /// `bindings`.
    pub fn make_unit_exp(&self, bindings: &ExpBindings) -> Result<UnitExp, InternalError> {
        self.atoms().try_fold(UnitExp::scalar(), |acc, (atom, power)| {
            let atom = match atom {
                UnitAtom::Var(name) => bindings.unit(*name)?.clone(),
                UnitAtom::Unit(unit) => UnitExp::single(unit.clone()),
            };

            Ok(acc.times(&atom.raise_by(power)))
        })
    }

    /// Substitute the unit variables of this unit to get a concrete unit. Every unit variable
    /// must be bound to a unit in `substitution`.
    pub fn make_unit(&self, substitution: &Substitution) -> Result<Unit, InternalError> {
        self.atoms().try_fold(Unit::scalar(), |acc, (atom, power)| {
            let atom = match atom {
                UnitAtom::Var(name) => substitution.unit(*name)?.clone(),
                UnitAtom::Unit(unit) => Unit::single(unit.clone()),
            };

            Ok(acc.times(&atom.raise_by(power)))
        })
    }

    /// Parse a unit, resolving unit names against `units`.
    pub fn parse(src: &str, units: &UnitManager) -> Result<Self, ParseError> {
        crate::parser::parse_unit(src, units)
    }

    /// The textual representation of this unit, which [Self::parse] reads back.
    pub fn save(&self) -> String {
        self.to_string()
    }
}
