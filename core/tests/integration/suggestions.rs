use jelly_core::{
    config::Config,
    error::MaterializeError,
    jelly::{bindings::Substitution, materialize::suggest_for_ident, JellyType},
    typ::TypeManager,
    unit::UnitManager,
};
use jelly_utils::{init_logging, parse_type, sample_registry};

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

#[track_caller]
fn suggestions_for(s: &str, registry: &TypeManager) -> Vec<String> {
    match parse_type(s).make_data_type(&Substitution::new(), registry) {
        Err(MaterializeError::UnknownType(err)) => {
            err.suggestions.iter().map(JellyType::save).collect()
        }
        result => panic!("expected an unknown type error for `{s}`, got {result:?}"),
    }
}

#[test]
fn misspelled_builtins() {
    init_logging();

    let registry = sample_registry();

    assert_eq!(suggestions_for("Nubmer", &registry)[0], "Number");
    assert_eq!(suggestions_for("Boolen", &registry)[0], "Boolean");
    assert_eq!(suggestions_for("Colur", &registry)[0], "Colour");
    // Containing a keyword beats being close to a longer one.
    assert_eq!(suggestions_for("DateTimeZ", &registry)[0], "DateTime");
}

#[test]
fn aliases() {
    init_logging();

    let registry = sample_registry();

    assert_eq!(suggestions_for("string", &registry)[0], "Text");
    assert_eq!(suggestions_for("int", &registry)[0], "Number");
    assert!(suggestions_for("qqqqqqqq", &registry).is_empty());
}

#[test]
fn misspelled_tagged_types_keep_their_arguments() {
    init_logging();

    let registry = sample_registry();

    assert_eq!(
        suggestions_for("Optionl(Number{m})", &registry)[0],
        "Optional(Number{m})"
    );
    assert_eq!(
        suggestions_for("Messured({m*s^-1})", &registry)[0],
        "Measured({m*s^-1})"
    );
}

#[test]
fn suggestions_nested_in_records() {
    init_logging();

    let err = parse_type("(a:Text, b:[Nubmer])")
        .make_data_type(&Substitution::new(), &sample_registry())
        .unwrap_err();

    assert_matches!(
        err,
        MaterializeError::UnknownType(ref err)
            if err.node == JellyType::ident("Nubmer")
                && err.suggestions.first() == Some(&JellyType::scalar_number())
    );
}

#[test]
fn configuration() {
    init_logging();

    let config = Config::from_toml_str(
        r#"
        [suggestions]
        max_suggestions = 1
        builtin_aliases = false
        "#,
    )
    .unwrap();

    let registry = TypeManager::new()
        .with_units(UnitManager::with_builtin_units())
        .with_config(config);

    assert!(suggestions_for("string", &registry).is_empty());
    assert_eq!(suggestions_for("Date_", &registry), ["Date"]);
    assert_eq!(
        suggest_for_ident("Optinal".into(), &registry),
        [JellyType::Ident("Optional".into())]
    );

    let strict = Config::from_toml_str("[suggestions]\nmin_similarity = 1.0").unwrap();
    let registry = TypeManager::new().with_config(strict);
    assert_eq!(
        suggest_for_ident("Optinal".into(), &registry),
        Vec::<JellyType>::new()
    );

    assert!(Config::from_toml_str("[suggestions]\nmin_similarity = 2.0").is_err());
    assert!(Config::from_toml_str("[suggestions]\nunknown_key = 1").is_err());
}
