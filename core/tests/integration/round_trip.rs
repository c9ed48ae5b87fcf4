use jelly_core::{
    error::ParseError,
    jelly::{Field, JellyType, JellyUnit},
    typ::{DateTimeKind, TypeArgF, TypeRegistry},
};
use jelly_utils::{init_logging, parse_type, parse_unit, sample_registry};

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

#[track_caller]
fn check_type_round_trip(typ: &JellyType) {
    let saved = typ.save();
    let reparsed = JellyType::parse(&saved, sample_registry().units())
        .unwrap_or_else(|err| panic!("failed to parse back `{saved}`: {err}"));

    assert_eq!(&reparsed, typ);
    assert_eq!(reparsed.save(), saved);
}

#[track_caller]
fn check_text_round_trip(s: &str) {
    assert_eq!(parse_type(s).save(), s);
}

fn unit(name: &str) -> JellyUnit {
    JellyUnit::single(sample_registry().units().get_declared(name).unwrap())
}

#[test]
fn canonical_texts() {
    init_logging();

    for s in [
        "Boolean",
        "Text",
        "Number",
        "Number{m*s^-1}",
        "Number{@unitvar u^2*kg*m^-3}",
        "Date",
        "DateYM",
        "Time",
        "DateTime",
        "DateTimeZoned",
        "()",
        "(...)",
        "(a:Number, b?:Text)",
        "(Number:Text, x:[Boolean], ...)",
        "[[Text]]",
        "(() -> Boolean)",
        "((a, List(a)) -> List(a))",
        "Measured({EUR*h^-1})",
        "Either(Pair(Text)(Number))((x:Number{m}))",
        "((((Text) -> Text)) -> Number)",
        "Optional(((Number) -> Text))",
        "Colour",
    ] {
        check_text_round_trip(s);
    }
}

#[test]
fn non_canonical_texts_are_normalized() {
    init_logging();

    assert_eq!(parse_type("Number{m/s}").save(), "Number{m*s^-1}");
    assert_eq!(parse_type("Number{1}").save(), "Number");
    assert_eq!(parse_type("DateYMD").save(), "Date");
    assert_eq!(parse_type("(b:Text,a:Text)").save(), "(a:Text, b:Text)");
    assert_eq!(parse_type(" [ Text ] ").save(), "[Text]");
    assert_eq!(parse_unit("kg*(m/s)").save(), "kg*m*s^-1");
    assert_eq!(parse_unit("m/(s*s)").save(), "m*s^-2");
}

#[test]
fn built_types() {
    init_logging();

    let speed = unit("m").divide_by(&unit("s"));
    let types = [
        JellyType::number(speed.clone()),
        JellyType::number(speed.times(&JellyUnit::unit_variable("v")).raise_by(-2)),
        JellyType::record(
            [
                ("a", Field::required(JellyType::scalar_number())),
                ("b", Field::optional(JellyType::text())),
                ("when", Field::optional(JellyType::date(DateTimeKind::DateTime))),
            ],
            false,
        ),
        JellyType::function(
            vec![JellyType::ident("a"), JellyType::array(JellyType::ident("b"))],
            JellyType::tagged(
                "Measured",
                vec![TypeArgF::Unit(JellyUnit::unit_variable("u").times(&speed))],
            ),
        ),
        JellyType::tagged(
            "Either",
            vec![
                TypeArgF::Type(JellyType::record(
                    [("Text", Field::required(JellyType::text()))],
                    true,
                )),
                TypeArgF::Type(JellyType::function(vec![], JellyType::boolean())),
            ],
        ),
    ];

    for typ in &types {
        check_type_round_trip(typ);
    }
}

#[test]
fn units() {
    init_logging();

    for s in ["1", "m", "m*s^-1", "@unitvar u", "@unitvar u^-1*@unitvar v*kg^2"] {
        assert_eq!(parse_unit(s).save(), s);
    }

    assert_eq!(parse_unit("m/s").save(), "m*s^-1");
    assert_eq!(parse_unit("s*m").save(), "m*s");
    assert_eq!(parse_unit("m/m").save(), "1");
    assert_eq!(
        JellyUnit::parse("m/s/kg", sample_registry().units()),
        Err(ParseError::ChainedDivision { span: 3..4 })
    );
}

#[test]
fn unknown_unit_suggests_declared_units() {
    init_logging();

    let err = JellyType::parse("Number{kmh}", sample_registry().units()).unwrap_err();
    assert_matches!(err, ParseError::UnknownUnit(ref err) if err.name == "kmh");

    if let ParseError::UnknownUnit(err) = err {
        assert_eq!(err.suggestions.first(), Some(&unit("km")));
    }
}
