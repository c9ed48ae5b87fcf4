use jelly_core::{
    error::{InstantiationErrorKind, MaterializeError},
    identifier::Ident,
    jelly::{bindings::Substitution, JellyType},
    typ::{DataType, DateTimeKind, TagType, TypeArgF, TypeRegistry},
    unit::Unit,
};
use jelly_utils::{init_logging, parse_type, sample_registry};

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

fn unit(name: &str) -> Unit {
    Unit::single(sample_registry().units().get_declared(name).unwrap())
}

#[track_caller]
fn materialize(s: &str, substitution: &Substitution) -> Result<DataType, MaterializeError> {
    parse_type(s).make_data_type(substitution, &sample_registry())
}

#[track_caller]
fn materialize_closed(s: &str) -> DataType {
    materialize(s, &Substitution::new())
        .unwrap_or_else(|err| panic!("failed to materialize `{s}`: {err}"))
}

#[test]
fn lift_then_materialize() {
    init_logging();

    let registry = sample_registry();
    let speed = unit("km").divide_by(&unit("h"));
    let either = registry
        .lookup_type(
            "Either".into(),
            vec![
                TypeArgF::Type(DataType::text()),
                TypeArgF::Type(DataType::number(speed.clone())),
            ],
        )
        .unwrap()
        .unwrap();
    let colour = registry.lookup_type("Colour".into(), vec![]).unwrap().unwrap();

    let types = [
        DataType::boolean(),
        DataType::number(speed.clone()),
        DataType::date(DateTimeKind::TimeOfDay),
        DataType::record([
            ("distance", DataType::number(unit("km"))),
            ("paint", colour.clone()),
            ("note", registry.make_maybe(DataType::text()).unwrap()),
        ]),
        DataType::record(Vec::<(&str, DataType)>::new()),
        DataType::function(vec![either.clone(), colour], DataType::array(DataType::number(speed))),
        either,
    ];

    for typ in types {
        let lifted = JellyType::from_concrete(&typ);
        assert_eq!(
            lifted.make_data_type(&Substitution::new(), &registry),
            Ok(typ)
        );
    }
}

#[test]
fn units_divide() {
    init_logging();

    assert_eq!(
        materialize_closed("Number{m/s}"),
        DataType::number(unit("m").divide_by(&unit("s")))
    );
    assert_eq!(
        materialize_closed("Measured({km/h})").to_string(),
        "Measured({h^-1*km})"
    );
}

#[test]
fn substitution() {
    init_logging();

    let mut substitution = Substitution::new();
    substitution.insert_type("a", DataType::text());
    substitution.insert_unit("u", unit("m").divide_by(&unit("s")));

    assert_eq!(
        materialize("(x:a, y:Number{@unitvar u*s})", &substitution),
        Ok(DataType::record([
            ("x", DataType::text()),
            ("y", DataType::number(unit("m"))),
        ]))
    );

    assert_eq!(
        materialize("Measured({@unitvar u^2})", &substitution).unwrap().to_string(),
        "Measured({m^2*s^-2})"
    );

    // `b` is neither bound nor a known tagged type.
    assert_matches!(
        materialize("((a) -> b)", &substitution),
        Err(MaterializeError::UnknownType(err)) if err.node == JellyType::ident("b")
    );

    // `a` is bound to a type, not a unit.
    assert_matches!(
        materialize("Number{@unitvar a}", &substitution),
        Err(MaterializeError::Internal(_))
    );
}

#[test]
fn optional_fields_are_wrapped_once() {
    init_logging();

    let registry = sample_registry();
    let maybe_text = registry.make_maybe(DataType::text()).unwrap();

    assert_eq!(
        materialize_closed("(a?:Text, b:Optional(Text))"),
        DataType::record([("a", maybe_text.clone()), ("b", maybe_text.clone())])
    );

    assert_eq!(
        materialize_closed("(a?:Optional(Text))"),
        DataType::record([("a", registry.make_maybe(maybe_text).unwrap())])
    );
}

#[test]
fn instantiation_errors() {
    init_logging();

    assert_matches!(
        materialize("Either(Text)", &Substitution::new()),
        Err(MaterializeError::TaggedInstantiation(err))
            if err.kind == InstantiationErrorKind::Arity { expected: 2, found: 1 }
    );

    assert_matches!(
        materialize("Measured(Text)", &Substitution::new()),
        Err(MaterializeError::TaggedInstantiation(err))
            if matches!(err.kind, InstantiationErrorKind::Kind { position: 0, .. })
    );

    assert_matches!(
        materialize("(a:Text, ...)", &Substitution::new()),
        Err(MaterializeError::UnknownType(_))
    );
}

#[test]
fn recursive_tags() {
    init_logging();

    let registry = sample_registry();
    let list = registry.known_tagged_types().get(&Ident::new("List")).unwrap();
    let args = [TypeArgF::Type(DataType::number(unit("kg")))];
    let list_of_kg = list.instantiate(args.to_vec()).unwrap();

    assert_eq!(
        list.instantiate_tags(&args, &registry),
        Ok(vec![
            TagType::new("Nil", None),
            TagType::new(
                "Cons",
                Some(DataType::record([
                    ("head", DataType::number(unit("kg"))),
                    ("tail", list_of_kg),
                ]))
            ),
        ])
    );
}
