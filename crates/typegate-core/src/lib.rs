//! # typegate-core — Runtime Type-Validation Engine
//!
//! Decides whether a runtime value conforms to a declared type descriptor:
//! a plain type, a union of types, or a parameterized container such as
//! `list[int]` or `map[str, int]`. On failure it produces a structured
//! diagnostic naming the validation site, the narrowed set of expected
//! types, and the actual runtime type.
//!
//! ## Pipeline
//!
//! A declared annotation ([`TypeExpr`]) is normalized once into a
//! [`TypeSet`] (one [`TypeDescriptor`] per non-union member, grouped by
//! base type). Each check passes the set, a [`Value`], and a [`Location`]
//! to the [`Matcher`]; a failure surfaces as a [`TypeMismatch`].
//!
//! ## Limits, by design
//!
//! - One level of container nesting: a parameterized container argument is
//!   rejected at declaration time, never silently mis-checked.
//! - A value whose runtime type is a strict subtype of a declared base is
//!   accepted without shape checking.
//! - Validation only verifies; it never coerces.
//!
//! ## Crate Policy
//!
//! - No dependencies on other typegate crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Public data-model types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod descriptor;
pub mod diagnostics;
pub mod matcher;
pub mod registry;
pub mod typeset;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use descriptor::{ArgumentTypes, DeclarationError, Shape, TypeDescriptor, TypeExpr};
pub use diagnostics::{
    CheckContext, ExpectedTypes, Location, LocationKind, MismatchKind, TypeMismatch, RETURN_FIELD,
};
pub use matcher::Matcher;
pub use registry::{ClassRegistry, RegistryError};
pub use typeset::TypeSet;
pub use value::{ClassName, Instance, TypeName, Value};
