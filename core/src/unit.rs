//! Concrete units of measure and the registry of declared units.
//!
//! A concrete [Unit] is a product of declared [SingleUnit]s raised to non-zero integer powers,
//! such as `m*s^-2`. It never contains variables: see [crate::jelly::JellyUnit] for units which
//! may.
use indexmap::IndexMap;
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
};

use crate::{
    config::SuggestConfig,
    error::{
        suggest::{self, Candidate},
        DeclarationError, UnknownUnitError,
    },
    identifier::Ident,
    jelly::JellyUnit,
};

/// An atomic declared unit, such as `m` or `USD`.
///
/// Single units are identified by their name: the description is informative only and is
/// ignored by comparisons and hashing.
#[derive(Clone, Debug)]
pub struct SingleUnit {
    name: Ident,
    description: String,
}

impl SingleUnit {
    pub fn new(name: impl Into<Ident>, description: impl Into<String>) -> Self {
        SingleUnit {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn name(&self) -> Ident {
        self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl PartialEq for SingleUnit {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for SingleUnit {}

impl Hash for SingleUnit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

impl PartialOrd for SingleUnit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SingleUnit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

/// A concrete unit. The empty product is the scalar unit, written `1`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Unit {
    powers: BTreeMap<SingleUnit, i32>,
}

impl Unit {
    pub fn scalar() -> Self {
        Unit::default()
    }

    pub fn single(unit: SingleUnit) -> Self {
        Unit::from_powers([(unit, 1)])
    }

    /// Build a unit from a list of single units and their powers. Powers of the same unit are
    /// added together, and units with a null power are dropped.
    pub fn from_powers(powers: impl IntoIterator<Item = (SingleUnit, i32)>) -> Self {
        let mut result = Unit::scalar();

        for (unit, power) in powers {
            result.add_power(unit, power);
        }

        result
    }

    fn add_power(&mut self, unit: SingleUnit, power: i32) {
        let power = self.powers.get(&unit).copied().unwrap_or(0).saturating_add(power);

        if power == 0 {
            self.powers.remove(&unit);
        } else {
            self.powers.insert(unit, power);
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.powers.is_empty()
    }

    /// Iterate over the single units of this unit and their powers, ordered by unit name.
    pub fn powers(&self) -> impl Iterator<Item = (&SingleUnit, i32)> {
        self.powers.iter().map(|(unit, power)| (unit, *power))
    }

    pub fn times(&self, other: &Unit) -> Unit {
        let mut result = self.clone();

        for (unit, power) in other.powers() {
            result.add_power(unit.clone(), power);
        }

        result
    }

    pub fn divide_by(&self, other: &Unit) -> Unit {
        self.times(&other.raise_by(-1))
    }

    /// Raise every single unit to `power`. Like in [Self::times], exponents saturate at the
    /// bounds of `i32`: parsed units are checked for overflow before they get here.
    pub fn raise_by(&self, power: i32) -> Unit {
        Unit::from_powers(
            self.powers()
                .map(|(unit, unit_power)| (unit.clone(), unit_power.saturating_mul(power))),
        )
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        JellyUnit::from_concrete(self).fmt(f)
    }
}

/// The registry of declared units.
#[derive(Clone, Debug, Default)]
pub struct UnitManager {
    declared: IndexMap<Ident, SingleUnit>,
    suggest_config: SuggestConfig,
}

impl UnitManager {
    /// Create an empty unit registry.
    pub fn new() -> Self {
        UnitManager::default()
    }

    /// Create a unit registry populated with the SI base units and a few common units.
    pub fn with_builtin_units() -> Self {
        const BUILTIN: &[(&str, &str)] = &[
            ("m", "metre"),
            ("s", "second"),
            ("kg", "kilogram"),
            ("A", "ampere"),
            ("K", "kelvin"),
            ("mol", "mole"),
            ("cd", "candela"),
            ("g", "gram"),
            ("km", "kilometre"),
            ("min", "minute"),
            ("h", "hour"),
            ("USD", "United States dollar"),
            ("EUR", "euro"),
        ];

        let mut manager = UnitManager::new();

        for (name, description) in BUILTIN {
            manager.declared.insert(
                Ident::new(name),
                SingleUnit::new(Ident::new(name), *description),
            );
        }

        manager
    }

    /// Set how suggestions are computed when [Self::get_declared] fails.
    pub fn set_suggest_config(&mut self, config: SuggestConfig) {
        self.suggest_config = config;
    }

    /// Declare a new unit.
    pub fn declare(
        &mut self,
        name: &str,
        description: impl Into<String>,
    ) -> Result<SingleUnit, DeclarationError> {
        let name = Ident::try_new(name)?;

        if self.declared.contains_key(&name) {
            return Err(DeclarationError::DuplicateUnit(name));
        }

        let unit = SingleUnit::new(name, description);
        self.declared.insert(name, unit.clone());
        Ok(unit)
    }

    /// Retrieve a declared unit by name. If there's none, the error carries the declared units
    /// with the closest names.
    pub fn get_declared(&self, name: &str) -> Result<SingleUnit, UnknownUnitError> {
        if let Some(unit) = Ident::try_new(name)
            .ok()
            .and_then(|id| self.declared.get(&id))
        {
            return Ok(unit.clone());
        }

        let suggestions = suggest::ranked_matches(
            self.declared.values().map(|unit| {
                Candidate::new(unit.name().label(), JellyUnit::single(unit.clone()))
            }),
            name,
            &self.suggest_config,
        )
        .collect();

        Err(UnknownUnitError {
            name: name.to_owned(),
            suggestions,
        })
    }

    /// The declared units, in declaration order.
    pub fn declared(&self) -> impl Iterator<Item = &SingleUnit> {
        self.declared.values()
    }
}
