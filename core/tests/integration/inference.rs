use jelly_core::{
    identifier::Ident,
    jelly::{
        bindings::{ExpBindings, Substitution},
        JellyType,
    },
    typ::TypeVarKind,
    typecheck::{error::UnifError, UnifTable},
};
use jelly_utils::{init_logging, parse_type, sample_registry};

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

/// Infer the variables of a generic type from a concrete type it should be equal to.
fn infer(
    generic: &str,
    vars: &[(TypeVarKind, &str)],
    concrete: &str,
) -> Result<Substitution, UnifError> {
    let registry = sample_registry();
    let vars: Vec<_> = vars
        .iter()
        .map(|(kind, name)| (*kind, Ident::new(name)))
        .collect();

    let mut table = UnifTable::new();
    let bindings = ExpBindings::fresh_for(&vars, &mut table);

    let expected = parse_type(generic).make_type_exp(&bindings).unwrap();
    let found = parse_type(concrete)
        .make_type_exp(&ExpBindings::new())
        .unwrap();

    table.unify(expected, found)?;
    table.solve(&bindings, &registry)
}

/// Check that materializing `generic` with the inferred substitution gives the same type as
/// materializing `concrete` directly.
#[track_caller]
fn check_inference(generic: &str, vars: &[(TypeVarKind, &str)], concrete: &str) -> Substitution {
    let registry = sample_registry();
    let substitution = infer(generic, vars, concrete)
        .unwrap_or_else(|err| panic!("failed to infer `{generic}` ~ `{concrete}`: {err}"));

    let direct = parse_type(concrete)
        .make_data_type(&Substitution::new(), &registry)
        .unwrap();
    let inferred = parse_type(generic)
        .make_data_type(&substitution, &registry)
        .unwrap();

    assert_eq!(inferred, direct);
    substitution
}

fn solved_type(substitution: &Substitution, name: &str) -> String {
    substitution
        .type_var(Ident::new(name))
        .unwrap()
        .map(|typ| typ.to_string())
        .unwrap_or_default()
}

fn solved_unit(substitution: &Substitution, name: &str) -> String {
    substitution.unit(Ident::new(name)).unwrap().to_string()
}

#[test]
fn type_variables() {
    init_logging();

    let substitution = check_inference(
        "((a, [b]) -> Either(a)(b))",
        &[(TypeVarKind::Type, "a"), (TypeVarKind::Type, "b")],
        "((Text, [Number{kg}]) -> Either(Text)(Number{kg}))",
    );

    assert_eq!(solved_type(&substitution, "a"), "Text");
    assert_eq!(solved_type(&substitution, "b"), "Number{kg}");
}

#[test]
fn unit_variables() {
    init_logging();

    let substitution = check_inference(
        "((Number{@unitvar u^2}, Number{@unitvar v*@unitvar u}) -> Measured({@unitvar v}))",
        &[(TypeVarKind::Unit, "u"), (TypeVarKind::Unit, "v")],
        "((Number{m^2*s^-2}, Number{kg*m*s^-1}) -> Measured({kg}))",
    );

    assert_eq!(solved_unit(&substitution, "u"), "m*s^-1");
    assert_eq!(solved_unit(&substitution, "v"), "kg");

    let substitution = check_inference(
        "[Number{@unitvar u}]",
        &[(TypeVarKind::Unit, "u")],
        "[Number]",
    );
    assert_eq!(solved_unit(&substitution, "u"), "1");
}

#[test]
fn records() {
    init_logging();

    let substitution = check_inference(
        "(distance:Number{@unitvar d}, paint:a, list:List(a))",
        &[(TypeVarKind::Unit, "d"), (TypeVarKind::Type, "a")],
        "(distance:Number{km}, list:List(Colour), paint:Colour)",
    );

    assert_eq!(solved_unit(&substitution, "d"), "km");
    assert_eq!(solved_type(&substitution, "a"), "Colour");

    // An open record only constrains the fields it lists.
    let substitution = infer(
        "(name:a, ...)",
        &[(TypeVarKind::Type, "a")],
        "(name:Text, age:Number{h})",
    )
    .unwrap();
    assert_eq!(solved_type(&substitution, "a"), "Text");
}

#[test]
fn failures() {
    init_logging();

    assert_matches!(
        infer("Number{@unitvar u^2}", &[(TypeVarKind::Unit, "u")], "Number{m}"),
        Err(UnifError::UnitMismatch { .. })
    );

    assert_matches!(
        infer("(a:Text)", &[], "(a:Text, b:Text)"),
        Err(UnifError::ExtraField(field)) if field == Ident::new("b")
    );

    assert_matches!(
        infer("(a:Text, b:Text)", &[], "(a:Text)"),
        Err(UnifError::MissingField(field)) if field == Ident::new("b")
    );

    assert_matches!(
        infer("(a?:Text)", &[], "(a:Text)"),
        Err(UnifError::FieldOptionality(_))
    );

    assert_matches!(
        infer("((a) -> a)", &[(TypeVarKind::Type, "a")], "((Text) -> Boolean)"),
        Err(UnifError::TypeMismatch { .. })
    );

    assert_matches!(
        infer("Either(a)(b)", &[(TypeVarKind::Type, "a"), (TypeVarKind::Type, "b")], "Either(Text)"),
        Err(UnifError::TaggedArity { expected: 2, found: 1, .. })
    );

    // `b` isn't constrained at all.
    assert_eq!(
        infer(
            "((a) -> a)",
            &[(TypeVarKind::Type, "a"), (TypeVarKind::Type, "b")],
            "((Text) -> Text)"
        ),
        Err(UnifError::Unsolved {
            name: Ident::new("b"),
            kind: TypeVarKind::Type
        })
    );
}

#[test]
fn concrete_types_unify_with_themselves() {
    init_logging();

    for s in [
        "(a:Number{m*s^-1}, b:Optional(Text))",
        "((List(Number)) -> [Either(Colour)(DateTime)])",
        "Measured({EUR*h^-1})",
    ] {
        let data = parse_type(s)
            .make_data_type(&Substitution::new(), &sample_registry())
            .unwrap();
        let lifted = JellyType::from_concrete(&data);

        let substitution = check_inference(&lifted.save(), &[], s);
        assert!(substitution.is_empty());
    }
}
