pub use jelly_core;
use jelly_core::{
    identifier::Ident,
    jelly::{Field, JellyType, JellyUnit},
    typ::{TagType, TaggedTypeDefinition, TypeArgF, TypeManager, TypeRegistry, TypeVarKind},
    unit::UnitManager,
};

/// Initialize logging for a test. Logs are captured by the test harness, and only shown for
/// failing tests. Calling this more than once is fine.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A registry with the builtin units and a few tagged types:
///
/// - `Either(a)(b)`, with tags `Left(a)` and `Right(b)`;
/// - `Pair(a)(b)`, with the single tag `Pair((first:a, second:b))`;
/// - `Measured({u})`, with the single tag `Value(Number{@unitvar u})`;
/// - `Colour`, with tags `Red`, `Green` and `Blue`;
/// - `List(a)`, with tags `Nil` and `Cons((head:a, tail:List(a)))`.
pub fn sample_registry() -> TypeManager {
    let (a, b, u) = (Ident::new("a"), Ident::new("b"), Ident::new("u"));
    let var = JellyType::Ident;

    let definitions = [
        TaggedTypeDefinition::new(
            "Either",
            vec![(TypeVarKind::Type, a), (TypeVarKind::Type, b)],
            vec![
                TagType::new("Left", Some(var(a))),
                TagType::new("Right", Some(var(b))),
            ],
        ),
        TaggedTypeDefinition::new(
            "Pair",
            vec![(TypeVarKind::Type, a), (TypeVarKind::Type, b)],
            vec![TagType::new(
                "Pair",
                Some(JellyType::record(
                    [("first", Field::required(var(a))), ("second", Field::required(var(b)))],
                    true,
                )),
            )],
        ),
        TaggedTypeDefinition::new(
            "Measured",
            vec![(TypeVarKind::Unit, u)],
            vec![TagType::new(
                "Value",
                Some(JellyType::number(JellyUnit::unit_variable(u))),
            )],
        ),
        TaggedTypeDefinition::new(
            "Colour",
            vec![],
            vec![
                TagType::new("Red", None),
                TagType::new("Green", None),
                TagType::new("Blue", None),
            ],
        ),
        TaggedTypeDefinition::new(
            "List",
            vec![(TypeVarKind::Type, a)],
            vec![
                TagType::new("Nil", None),
                TagType::new(
                    "Cons",
                    Some(JellyType::record(
                        [
                            ("head", Field::required(var(a))),
                            (
                                "tail",
                                Field::required(JellyType::tagged(
                                    "List",
                                    vec![TypeArgF::Type(var(a))],
                                )),
                            ),
                        ],
                        true,
                    )),
                ),
            ],
        ),
    ];

    let mut registry = TypeManager::new().with_units(UnitManager::with_builtin_units());

    for def in definitions {
        registry.declare(def).unwrap();
    }

    registry
}

/// Parse a type against the units of the sample registry, panicking on error.
pub fn parse_type(s: &str) -> JellyType {
    JellyType::parse(s, sample_registry().units())
        .unwrap_or_else(|err| panic!("failed to parse `{s}`: {err}"))
}

/// Parse a unit against the units of the sample registry, panicking on error.
pub fn parse_unit(s: &str) -> JellyUnit {
    JellyUnit::parse(s, sample_registry().units())
        .unwrap_or_else(|err| panic!("failed to parse `{s}`: {err}"))
}
