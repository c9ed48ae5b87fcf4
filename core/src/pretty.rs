//! Printing of jelly types and units.
//!
//! The output is the textual syntax read by [crate::parser], and is always printed on a single
//! line: saving then parsing a type gives back the same type.
use std::fmt;

use pretty::docs;
pub use pretty::{BoxAllocator, DocAllocator, DocBuilder, Pretty};

use crate::{
    jelly::{JellyType, JellyUnit, UnitAtom},
    typ::TypeArgF,
};

pub type Allocator = BoxAllocator;

/// The maximum width of a line when rendering. No line break is ever emitted, so this only
/// matters for documents built by callers around our types.
const WIDTH: usize = 80;

pub fn fmt_pretty<T>(value: &T, f: &mut fmt::Formatter) -> fmt::Result
where
    T: for<'a> Pretty<'a, Allocator, ()> + Clone,
{
    let allocator = BoxAllocator;
    let doc: DocBuilder<_, ()> = value.clone().pretty(&allocator);
    doc.render_fmt(WIDTH, f)
}

impl<'a> Pretty<'a, Allocator> for &UnitAtom {
    fn pretty(self, allocator: &'a Allocator) -> DocBuilder<'a, Allocator> {
        match self {
            UnitAtom::Var(name) => docs![allocator, "@unitvar ", name.label()],
            UnitAtom::Unit(unit) => allocator.text(unit.name().label()),
        }
    }
}

impl<'a> Pretty<'a, Allocator> for &JellyUnit {
    fn pretty(self, allocator: &'a Allocator) -> DocBuilder<'a, Allocator> {
        if self.is_scalar() {
            return allocator.text("1");
        }

        allocator.intersperse(
            self.atoms().map(|(atom, power)| {
                if power == 1 {
                    atom.pretty(allocator)
                } else {
                    docs![allocator, atom, "^", power.to_string()]
                }
            }),
            "*",
        )
    }
}

impl<'a> Pretty<'a, Allocator> for &JellyType {
    fn pretty(self, allocator: &'a Allocator) -> DocBuilder<'a, Allocator> {
        match self {
            JellyType::Primitive(prim) => allocator.text(prim.keyword()),
            JellyType::Number(unit) if unit.is_scalar() => allocator.text("Number"),
            JellyType::Number(unit) => docs![allocator, "Number", unit.pretty(allocator).braces()],
            JellyType::Ident(name) => allocator.text(name.label()),
            JellyType::Apply { name, args } => docs![
                allocator,
                name.label(),
                allocator.concat(args.iter().map(|arg| match arg {
                    TypeArgF::Unit(unit) => unit.pretty(allocator).braces().parens(),
                    TypeArgF::Type(typ) => typ.pretty(allocator).parens(),
                })),
            ],
            JellyType::Record { fields, complete } => {
                let fields = fields.iter().map(|(name, field)| {
                    docs![
                        allocator,
                        name.label(),
                        if field.required { ":" } else { "?:" },
                        &field.typ,
                    ]
                });
                let tail = (!complete).then(|| allocator.text("..."));

                allocator
                    .intersperse(fields.chain(tail), ", ")
                    .parens()
            }
            JellyType::Array(elem) => elem.pretty(allocator).brackets(),
            JellyType::Function { params, result } => docs![
                allocator,
                allocator
                    .intersperse(params.iter().map(|param| param.pretty(allocator)), ", ")
                    .parens(),
                " -> ",
                &**result,
            ]
            .parens(),
        }
    }
}

crate::impl_display_from_pretty!(JellyUnit);
crate::impl_display_from_pretty!(JellyType);

/// Generate an implementation of `fmt::Display` for types that implement `Pretty`.
#[macro_export]
macro_rules! impl_display_from_pretty {
    ($ty:ty) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                $crate::pretty::fmt_pretty(&self, f)
            }
        }
    };
}
