//! Types and unit unification.
use std::collections::BTreeMap;

use crate::{
    identifier::Ident,
    jelly::bindings::{ExpBindings, Substitution},
    typ::{DataType, TypeArgF, TypeRegistry, TypeVarKind},
    unit::Unit,
};

use super::{error::UnifError, FieldExp, TypeExp, UnitAtomExp, UnitExp};

/// Unification variable or type constants unique identifier.
pub type VarId = usize;

/// An element of the unification table.
#[derive(Clone, Debug)]
struct UnifSlot<T> {
    value: Option<T>,
}

impl<T> UnifSlot<T> {
    fn new() -> Self {
        UnifSlot { value: None }
    }
}

/// The unification table.
///
/// Map each unification variable to either another type variable or a concrete type it has been
/// unified with. Each binding `(ty, var)` in this map should be thought of an edge in a
/// unification graph.
///
/// The unification table is really two separate tables, one for type variables and one for unit
/// variables. Unit variables are always assigned a unit expression in which the assigned
/// variables have already been substituted, so resolving a unit never loops.
#[derive(Clone, Debug, Default)]
pub struct UnifTable {
    types: Vec<UnifSlot<TypeExp>>,
    units: Vec<UnifSlot<UnitExp>>,
}

impl UnifTable {
    pub fn new() -> Self {
        UnifTable::default()
    }

    /// Create a fresh type unification variable and allocate a corresponding slot in the table.
    pub fn fresh_type_uvar(&mut self) -> TypeExp {
        let id = self.types.len();
        self.types.push(UnifSlot::new());
        TypeExp::UnifVar(id)
    }

    /// Create a fresh unit unification variable and allocate a corresponding slot in the table.
    pub fn fresh_unit_uvar(&mut self) -> UnitExp {
        let id = self.units.len();
        self.units.push(UnifSlot::new());
        UnitExp::unif_var(id)
    }

    /// Retrieve the current assignment of a type unification variable.
    pub fn get_type(&self, var: VarId) -> Option<&TypeExp> {
        self.types[var].value.as_ref()
    }

    /// Retrieve the current assignment of a unit unification variable.
    pub fn get_unit(&self, var: VarId) -> Option<&UnitExp> {
        self.units[var].value.as_ref()
    }

    /// Assign a type to a type unification variable.
    ///
    /// # Preconditions
    ///
    /// `var` must be unassigned, and `typ` must not contain `var`: this is the responsibility of
    /// the caller.
    pub fn assign_type(&mut self, var: VarId, typ: TypeExp) {
        // Unifying a free variable with itself is a no-op.
        if matches!(typ, TypeExp::UnifVar(id) if id == var) {
            return;
        }

        debug_assert!(self.types[var].value.is_none());
        log::trace!("?{var} := {typ:?}");
        self.types[var].value = Some(typ);
    }

    /// Assign a unit to a unit unification variable.
    ///
    /// # Preconditions
    ///
    /// `var` must be unassigned, and `unit` must be resolved (see [Self::resolve_unit]) and must
    /// not contain `var`.
    pub fn assign_unit(&mut self, var: VarId, unit: UnitExp) {
        debug_assert!(self.units[var].value.is_none());
        log::trace!("?{var} := {unit:?} (unit)");
        self.units[var].value = Some(unit);
    }

    /// Follow the links in the unification table to find the representative of the equivalence
    /// class of the type unification variable `var`.
    ///
    /// This corresponds to the find in union-find.
    pub fn root_type(&self, var: VarId) -> TypeExp {
        match self.types[var].value.as_ref() {
            None => TypeExp::UnifVar(var),
            Some(TypeExp::UnifVar(id)) => self.root_type(*id),
            Some(typ) => typ.clone(),
        }
    }

    fn into_root(&self, typ: TypeExp) -> TypeExp {
        match typ {
            TypeExp::UnifVar(id) => self.root_type(id),
            typ => typ,
        }
    }

    /// Substitute the assigned unit variables of `unit` with their value.
    pub fn resolve_unit(&self, unit: &UnitExp) -> UnitExp {
        unit.atoms()
            .fold(UnitExp::scalar(), |acc, (atom, power)| {
                let resolved = match atom {
                    UnitAtomExp::UnifVar(id) => match self.get_unit(*id) {
                        Some(value) => self.resolve_unit(value),
                        None => UnitExp::unif_var(*id),
                    },
                    UnitAtomExp::Unit(unit) => UnitExp::single(unit.clone()),
                };

                acc.times(&resolved.raise_by(power))
            })
    }

    /// Check if the type unification variable `var` occurs in `typ`, following assignments.
    fn occurs(&self, var: VarId, typ: &TypeExp) -> bool {
        match typ {
            TypeExp::UnifVar(id) => {
                *id == var
                    || self
                        .get_type(*id)
                        .is_some_and(|assigned| self.occurs(var, assigned))
            }
            TypeExp::Number(_) | TypeExp::Primitive(_) => false,
            TypeExp::Tagged { args, .. } => args.iter().any(|arg| match arg {
                TypeArgF::Unit(_) => false,
                TypeArgF::Type(typ) => self.occurs(var, typ),
            }),
            TypeExp::Record { fields, .. } => {
                fields.values().any(|field| self.occurs(var, &field.typ))
            }
            TypeExp::Array(elem) => self.occurs(var, elem),
            TypeExp::Function { params, result } => {
                params.iter().any(|param| self.occurs(var, param)) || self.occurs(var, result)
            }
        }
    }

    /// Try to unify two types. `expected` and `found` only differ in how errors are reported.
    pub fn unify(&mut self, expected: TypeExp, found: TypeExp) -> Result<(), UnifError> {
        let expected = self.into_root(expected);
        let found = self.into_root(found);

        log::trace!("unify {expected:?} ~ {found:?}");

        // expected and found are roots of the type
        match (expected, found) {
            (TypeExp::UnifVar(id1), TypeExp::UnifVar(id2)) if id1 == id2 => Ok(()),
            (TypeExp::UnifVar(id), typ) | (typ, TypeExp::UnifVar(id)) => {
                if self.occurs(id, &typ) {
                    return Err(UnifError::OccursCheck { var: id, typ });
                }

                self.assign_type(id, typ);
                Ok(())
            }
            (TypeExp::Number(u1), TypeExp::Number(u2)) => self.unify_units(u1, u2),
            (TypeExp::Primitive(p1), TypeExp::Primitive(p2)) if p1 == p2 => Ok(()),
            (
                TypeExp::Tagged {
                    name: name1,
                    args: args1,
                },
                TypeExp::Tagged {
                    name: name2,
                    args: args2,
                },
            ) if name1 == name2 => {
                if args1.len() != args2.len() {
                    return Err(UnifError::TaggedArity {
                        name: name1,
                        expected: args1.len(),
                        found: args2.len(),
                    });
                }

                for (position, (arg1, arg2)) in args1.into_iter().zip(args2).enumerate() {
                    match (arg1, arg2) {
                        (TypeArgF::Unit(u1), TypeArgF::Unit(u2)) => self.unify_units(u1, u2)?,
                        (TypeArgF::Type(t1), TypeArgF::Type(t2)) => self.unify(t1, t2)?,
                        (arg1, arg2) => {
                            return Err(UnifError::ArgKindMismatch {
                                name: name1,
                                position,
                                expected: arg1.kind(),
                                found: arg2.kind(),
                            })
                        }
                    }
                }

                Ok(())
            }
            (
                TypeExp::Record {
                    fields: fields1,
                    complete: complete1,
                },
                TypeExp::Record {
                    fields: fields2,
                    complete: complete2,
                },
            ) => self.unify_records((fields1, complete1), (fields2, complete2)),
            (TypeExp::Array(elem1), TypeExp::Array(elem2)) => self.unify(*elem1, *elem2),
            (
                TypeExp::Function {
                    params: params1,
                    result: result1,
                },
                TypeExp::Function {
                    params: params2,
                    result: result2,
                },
            ) => {
                if params1.len() != params2.len() {
                    return Err(UnifError::FunctionArity {
                        expected: params1.len(),
                        found: params2.len(),
                    });
                }

                for (param1, param2) in params1.into_iter().zip(params2) {
                    self.unify(param1, param2)?;
                }

                self.unify(*result1, *result2)
            }
            (expected, found) => Err(UnifError::TypeMismatch { expected, found }),
        }
    }

    fn unify_records(
        &mut self,
        (mut fields1, complete1): (BTreeMap<Ident, FieldExp>, bool),
        (fields2, complete2): (BTreeMap<Ident, FieldExp>, bool),
    ) -> Result<(), UnifError> {
        for (name, field2) in fields2 {
            match fields1.remove(&name) {
                Some(field1) => {
                    if field1.required != field2.required {
                        return Err(UnifError::FieldOptionality(name));
                    }

                    self.unify(field1.typ, field2.typ)
                        .map_err(|cause| UnifError::RecordFieldMismatch {
                            field: name,
                            cause: Box::new(cause),
                        })?;
                }
                None if complete1 => return Err(UnifError::ExtraField(name)),
                None => (),
            }
        }

        // The fields left are the ones which are absent from the second record
        match fields1.into_keys().next() {
            Some(name) if complete2 => Err(UnifError::MissingField(name)),
            _ => Ok(()),
        }
    }

    /// Try to unify two units, by solving `expected / found = 1` for one of the unit variables.
    ///
    /// The variable chosen is the one with the smallest power in absolute value which divides the
    /// powers of all the other atoms, if any. Otherwise, the units can't be made equal.
    pub fn unify_units(&mut self, expected: UnitExp, found: UnitExp) -> Result<(), UnifError> {
        let expected = self.resolve_unit(&expected);
        let found = self.resolve_unit(&found);
        log::trace!("unify units {expected:?} ~ {found:?}");

        let Some(diff) = expected.checked_divide_by(&found) else {
            return Err(UnifError::UnitMismatch { expected, found });
        };

        if diff.is_scalar() {
            return Ok(());
        }

        let pivot = diff
            .unif_vars()
            .filter(|(_, power)| {
                diff.atoms()
                    .all(|(_, other)| i64::from(other) % i64::from(*power) == 0)
            })
            .min_by_key(|(id, power)| (power.unsigned_abs(), *id));

        // diff = var^power * rest = 1, hence var = rest^(-1/power)
        let value = pivot.and_then(|(var, power)| {
            diff.atoms()
                .filter(|(atom, _)| **atom != UnitAtomExp::UnifVar(var))
                .map(|(atom, other)| {
                    let other = i32::try_from(-i64::from(other) / i64::from(power)).ok()?;
                    Some((atom.clone(), other))
                })
                .collect::<Option<Vec<_>>>()
                .map(|atoms| (var, UnitExp::from_atoms(atoms)))
        });

        match value {
            Some((var, value)) => {
                self.assign_unit(var, value);
                Ok(())
            }
            None => Err(UnifError::UnitMismatch { expected, found }),
        }
    }

    /// Read a unit expression back as a concrete unit.
    pub fn unit_of(&self, unit: &UnitExp) -> Result<Unit, UnifError> {
        let resolved = self.resolve_unit(unit);

        resolved.as_concrete().ok_or_else(|| {
            let var = resolved.unif_vars().map(|(id, _)| id).next().unwrap_or_default();
            UnifError::UnsolvedVar {
                var,
                kind: TypeVarKind::Unit,
            }
        })
    }

    /// Read a type expression back as a concrete data type. Optional record fields are wrapped
    /// in the maybe type of the registry.
    pub fn data_type_of(
        &self,
        typ: &TypeExp,
        registry: &dyn TypeRegistry,
    ) -> Result<DataType, UnifError> {
        match typ {
            TypeExp::UnifVar(id) => match self.root_type(*id) {
                TypeExp::UnifVar(var) => Err(UnifError::UnsolvedVar {
                    var,
                    kind: TypeVarKind::Type,
                }),
                typ => self.data_type_of(&typ, registry),
            },
            TypeExp::Number(unit) => Ok(DataType::Number(self.unit_of(unit)?)),
            TypeExp::Primitive(prim) => Ok(DataType::Primitive(*prim)),
            TypeExp::Tagged { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| match arg {
                        TypeArgF::Unit(unit) => self.unit_of(unit).map(TypeArgF::Unit),
                        TypeArgF::Type(typ) => {
                            self.data_type_of(typ, registry).map(TypeArgF::Type)
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                registry
                    .lookup_type(*name, args)?
                    .ok_or(UnifError::UnknownType(*name))
            }
            TypeExp::Record { fields, complete } => {
                if !complete {
                    return Err(UnifError::OpenRecord);
                }

                let fields = fields
                    .iter()
                    .map(|(name, field)| {
                        let typ = self.data_type_of(&field.typ, registry)?;
                        let typ = if field.required {
                            typ
                        } else {
                            registry.make_maybe(typ)?
                        };

                        Ok((*name, typ))
                    })
                    .collect::<Result<_, UnifError>>()?;

                Ok(DataType::Record { fields })
            }
            TypeExp::Array(elem) => Ok(DataType::array(self.data_type_of(elem, registry)?)),
            TypeExp::Function { params, result } => Ok(DataType::function(
                params
                    .iter()
                    .map(|param| self.data_type_of(param, registry))
                    .collect::<Result<_, _>>()?,
                self.data_type_of(result, registry)?,
            )),
        }
    }

    /// Read back the values of the variables of `bindings` as a concrete substitution.
    pub fn solve(
        &self,
        bindings: &ExpBindings,
        registry: &dyn TypeRegistry,
    ) -> Result<Substitution, UnifError> {
        let unsolved = |name: Ident, kind: TypeVarKind| {
            move |err: UnifError| match err {
                UnifError::UnsolvedVar { .. } => UnifError::Unsolved { name, kind },
                err => err,
            }
        };

        bindings
            .iter()
            .map(|(name, arg)| {
                let value = match arg {
                    TypeArgF::Unit(unit) => TypeArgF::Unit(
                        self.unit_of(unit)
                            .map_err(unsolved(*name, TypeVarKind::Unit))?,
                    ),
                    TypeArgF::Type(typ) => TypeArgF::Type(
                        self.data_type_of(typ, registry)
                            .map_err(unsolved(*name, TypeVarKind::Type))?,
                    ),
                };

                Ok((*name, value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        typ::{PrimitiveType, TypeManager},
        unit::{SingleUnit, UnitManager},
    };
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn unit(name: &str) -> UnitExp {
        UnitExp::single(SingleUnit::new(name, ""))
    }

    fn concrete(name: &str) -> Unit {
        Unit::single(SingleUnit::new(name, ""))
    }

    fn text() -> TypeExp {
        TypeExp::Primitive(PrimitiveType::Text)
    }

    fn record(fields: &[(&str, TypeExp, bool)], complete: bool) -> TypeExp {
        TypeExp::Record {
            fields: fields
                .iter()
                .map(|(name, typ, required)| {
                    (
                        Ident::new(name),
                        FieldExp {
                            typ: typ.clone(),
                            required: *required,
                        },
                    )
                })
                .collect(),
            complete,
        }
    }

    #[test]
    fn unify_vars() {
        let mut table = UnifTable::new();
        let a = table.fresh_type_uvar();
        let b = table.fresh_type_uvar();

        table.unify(a.clone(), b.clone()).unwrap();
        table.unify(TypeExp::Array(Box::new(text())), b).unwrap();

        let registry = TypeManager::new();
        assert_eq!(
            table.data_type_of(&a, &registry),
            Ok(DataType::array(DataType::text()))
        );
    }

    #[test]
    fn occurs_check() {
        let mut table = UnifTable::new();
        let a = table.fresh_type_uvar();

        assert_matches!(
            table.unify(a.clone(), TypeExp::Array(Box::new(a))),
            Err(UnifError::OccursCheck { var: 0, .. })
        );
    }

    #[test]
    fn mismatches() {
        let mut table = UnifTable::new();

        assert_matches!(
            table.unify(text(), TypeExp::Number(UnitExp::scalar())),
            Err(UnifError::TypeMismatch { .. })
        );
        assert_matches!(
            table.unify(TypeExp::Number(unit("m")), TypeExp::Number(unit("s"))),
            Err(UnifError::UnitMismatch { .. })
        );
        assert_matches!(
            table.unify(
                TypeExp::Function {
                    params: vec![],
                    result: Box::new(text())
                },
                TypeExp::Function {
                    params: vec![text()],
                    result: Box::new(text())
                },
            ),
            Err(UnifError::FunctionArity {
                expected: 0,
                found: 1
            })
        );
    }

    #[test]
    fn unit_solving() {
        let mut table = UnifTable::new();
        let u = table.fresh_unit_uvar();
        let v = table.fresh_unit_uvar();

        // m/s ~ u
        table
            .unify_units(unit("m").divide_by(&unit("s")), u.clone())
            .unwrap();
        assert_eq!(
            table.unit_of(&u),
            Ok(concrete("m").divide_by(&concrete("s")))
        );

        // v^2 ~ m^2*s^-4
        table
            .unify_units(v.raise_by(2), unit("m").raise_by(2).times(&unit("s").raise_by(-4)))
            .unwrap();
        assert_eq!(
            table.unit_of(&v),
            Ok(concrete("m").times(&concrete("s").raise_by(-2)))
        );

        // u*s ~ m holds now
        table.unify_units(u.times(&unit("s")), unit("m")).unwrap();
    }

    #[test]
    fn unit_without_integer_solution() {
        let mut table = UnifTable::new();
        let u = table.fresh_unit_uvar();

        assert_matches!(
            table.unify_units(u.raise_by(2), unit("m")),
            Err(UnifError::UnitMismatch { .. })
        );
    }

    #[test]
    fn unit_exponent_overflow() {
        let mut table = UnifTable::new();
        let u = table.fresh_unit_uvar();
        let tiny = unit("m").raise_by(i32::MIN);

        assert_matches!(
            table.unify_units(tiny.clone(), unit("m")),
            Err(UnifError::UnitMismatch { .. })
        );
        // u = m^(2^31) doesn't fit.
        assert_matches!(
            table.unify_units(u.times(&tiny), UnitExp::scalar()),
            Err(UnifError::UnitMismatch { .. })
        );

        table.unify_units(u.raise_by(-1).times(&tiny), UnitExp::scalar()).unwrap();
        assert_eq!(
            table.unit_of(&u),
            Ok(concrete("m").raise_by(i32::MIN))
        );
    }

    #[test]
    fn records() {
        let mut table = UnifTable::new();
        let a = table.fresh_type_uvar();

        table
            .unify(
                record(&[("x", a.clone(), true)], false),
                record(&[("x", text(), true), ("y", text(), false)], true),
            )
            .unwrap();
        assert_eq!(table.root_type(0), text());

        assert_eq!(
            table.unify(
                record(&[("x", text(), true)], true),
                record(&[("x", text(), true), ("y", text(), true)], true),
            ),
            Err(UnifError::ExtraField(Ident::new("y")))
        );
        assert_eq!(
            table.unify(
                record(&[("x", text(), true), ("y", text(), true)], true),
                record(&[("x", text(), true)], true),
            ),
            Err(UnifError::MissingField(Ident::new("y")))
        );
        assert_eq!(
            table.unify(
                record(&[("x", text(), true)], true),
                record(&[("x", text(), false)], true),
            ),
            Err(UnifError::FieldOptionality(Ident::new("x")))
        );
        assert_matches!(
            table.unify(
                record(&[("x", text(), true)], true),
                record(&[("x", TypeExp::Number(UnitExp::scalar()), true)], true),
            ),
            Err(UnifError::RecordFieldMismatch { .. })
        );
    }

    #[test]
    fn solve() {
        let registry = TypeManager::new().with_units(UnitManager::with_builtin_units());
        let mut table = UnifTable::new();
        let bindings = ExpBindings::fresh_for(
            &[
                (TypeVarKind::Unit, Ident::new("u")),
                (TypeVarKind::Type, Ident::new("a")),
                (TypeVarKind::Type, Ident::new("b")),
            ],
            &mut table,
        );

        let u = bindings.unit(Ident::new("u")).unwrap().clone();
        let a = bindings.type_var(Ident::new("a")).unwrap().unwrap().clone();

        table.unify_units(u, unit("kg")).unwrap();
        table
            .unify(a, record(&[("note", text(), false)], true))
            .unwrap();

        assert_eq!(
            table.solve(&bindings, &registry),
            Err(UnifError::Unsolved {
                name: Ident::new("b"),
                kind: TypeVarKind::Type
            })
        );

        let b = bindings.type_var(Ident::new("b")).unwrap().unwrap().clone();
        table.unify(b, text()).unwrap();

        let solution = table.solve(&bindings, &registry).unwrap();
        assert_eq!(solution.unit(Ident::new("u")), Ok(&concrete("kg")));
        assert_eq!(
            solution.type_var(Ident::new("a")),
            Ok(Some(&DataType::record([(
                "note",
                registry.make_maybe(DataType::text()).unwrap()
            )])))
        );
    }

    #[test]
    fn read_back_errors() {
        let registry = TypeManager::new();
        let table = UnifTable::new();

        assert_eq!(
            table.data_type_of(&record(&[], false), &registry),
            Err(UnifError::OpenRecord)
        );
        assert_eq!(
            table.data_type_of(
                &TypeExp::Tagged {
                    name: Ident::new("Missing"),
                    args: vec![]
                },
                &registry
            ),
            Err(UnifError::UnknownType(Ident::new("Missing")))
        );
        assert_matches!(
            table.data_type_of(
                &TypeExp::Tagged {
                    name: Ident::new("Optional"),
                    args: vec![]
                },
                &registry
            ),
            Err(UnifError::Instantiation(_))
        );
    }
}
