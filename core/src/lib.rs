//! The jelly type system: data types and units of measure for spreadsheet-like tables.
//!
//! - [jelly] defines the types written by users, which may contain type and unit variables;
//! - [typ] and [unit] define concrete types and units, and the registries of declared tagged
//!   types and units;
//! - [typecheck] is the intermediate representation used by inference, with a unifier;
//! - [parser] and [pretty] read and write the textual syntax of types and units.
pub mod config;
pub mod error;
pub mod identifier;
pub mod jelly;
pub mod parser;
pub mod pretty;
pub mod typ;
pub mod typecheck;
pub mod unit;
