//! # Diagnostics — Structured Mismatch Reports
//!
//! A failed check produces a [`TypeMismatch`] carrying everything a caller
//! needs to render an actionable message: where the value came from
//! ([`Location`]), the narrowed set of acceptable types ([`ExpectedTypes`]),
//! and the actual runtime type. The four mismatch kinds form the complete
//! error taxonomy of the engine; all of them are fatal to the check that
//! raised them.
//!
//! The expected set is narrowed to the shape that was being evaluated when
//! the check failed: a coarse failure reports the declared base types, an
//! element failure reports only the resolved element types of the shape
//! that was tried.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::typeset::TypeSet;
use crate::value::{TypeName, Value};

/// Where a checked value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// A positional or keyword argument of a free function.
    FunctionParameter,
    /// A parameter of a method.
    MethodParameter,
    /// The result of a call, checked after the callable returns.
    ReturnValue,
    /// A value being assigned to a declared attribute.
    Attribute,
}

/// The field name used for return-value locations.
pub const RETURN_FIELD: &str = "return";

/// A concrete validation site: kind, owner, and field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// What kind of site this is.
    pub kind: LocationKind,
    /// The function/method name, or the object name for attributes.
    pub owner: String,
    /// Parameter name, [`RETURN_FIELD`], or attribute name.
    pub field: String,
}

impl Location {
    /// A free function's parameter.
    pub fn function_parameter(owner: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            kind: LocationKind::FunctionParameter,
            owner: owner.into(),
            field: field.into(),
        }
    }

    /// A method's parameter.
    pub fn method_parameter(owner: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            kind: LocationKind::MethodParameter,
            owner: owner.into(),
            field: field.into(),
        }
    }

    /// A callable's return value.
    pub fn return_value(owner: impl Into<String>) -> Self {
        Self {
            kind: LocationKind::ReturnValue,
            owner: owner.into(),
            field: RETURN_FIELD.to_string(),
        }
    }

    /// An attribute of a named object.
    pub fn attribute(owner: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            kind: LocationKind::Attribute,
            owner: owner.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LocationKind::FunctionParameter => {
                write!(f, "function '{}' parameter '{}'", self.owner, self.field)
            }
            LocationKind::MethodParameter => {
                write!(f, "method '{}' parameter '{}'", self.owner, self.field)
            }
            LocationKind::ReturnValue => {
                write!(f, "return value of '{}'", self.owner)
            }
            LocationKind::Attribute => {
                write!(f, "attribute '{}' of object '{}'", self.field, self.owner)
            }
        }
    }
}

/// One validation request: a value, the declared types it must conform to,
/// and the site it came from. Built fresh per check and discarded.
#[derive(Debug)]
pub struct CheckContext<'a> {
    /// The validation site, used verbatim in diagnostics.
    pub location: Location,
    /// The declared type set for this site.
    pub expected: &'a TypeSet,
    /// The value under validation.
    pub actual: &'a Value,
}

impl<'a> CheckContext<'a> {
    /// Assemble a check context.
    pub fn new(location: Location, expected: &'a TypeSet, actual: &'a Value) -> Self {
        Self {
            location,
            expected,
            actual,
        }
    }
}

/// The kind of a mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// The value's type is not among the declared base types.
    TypeMismatch,
    /// A container element's type is outside the resolved element set.
    ContainerElementMismatch,
    /// A mapping key's type is outside the resolved key set.
    MappingKeyMismatch,
    /// A mapping value's type is outside the resolved value set.
    MappingValueMismatch,
}

impl MismatchKind {
    /// Stable string label for the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeMismatch => "type_mismatch",
            Self::ContainerElementMismatch => "container_element_mismatch",
            Self::MappingKeyMismatch => "mapping_key_mismatch",
            Self::MappingValueMismatch => "mapping_value_mismatch",
        }
    }
}

/// Ordered set of acceptable type names, narrowed to the failing shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedTypes(Vec<TypeName>);

impl ExpectedTypes {
    /// The type names, in declaration order.
    pub fn names(&self) -> &[TypeName] {
        &self.0
    }
}

impl From<Vec<TypeName>> for ExpectedTypes {
    fn from(names: Vec<TypeName>) -> Self {
        Self(names)
    }
}

impl fmt::Display for ExpectedTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}")?;
        }
        f.write_str("]")
    }
}

/// A failed check. One variant per mismatch kind; every variant carries the
/// location, the narrowed expected set, and the actual runtime type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeMismatch {
    /// Coarse failure: the value's type is not an allowed base type or a
    /// subtype of one.
    #[error("{location} is not the expected type: got {actual}, expected one of {expected}")]
    Type {
        /// The validation site.
        location: Location,
        /// All declared base types.
        expected: ExpectedTypes,
        /// The value's runtime type.
        actual: TypeName,
    },

    /// An element of a one-argument container has a disallowed type.
    #[error("{location}: {actual} container elements are not all of the expected type(s) {expected}")]
    ContainerElement {
        /// The validation site.
        location: Location,
        /// The resolved element types of the shape that was evaluated.
        expected: ExpectedTypes,
        /// The container's runtime type.
        actual: TypeName,
    },

    /// A mapping key has a disallowed type.
    #[error("{location}: map keys are not all of the expected type(s) {expected}")]
    MappingKey {
        /// The validation site.
        location: Location,
        /// The resolved key types.
        expected: ExpectedTypes,
        /// The mapping's runtime type.
        actual: TypeName,
    },

    /// A mapping value has a disallowed type.
    #[error("{location}: map values are not all of the expected type(s) {expected}")]
    MappingValue {
        /// The validation site.
        location: Location,
        /// The resolved value types.
        expected: ExpectedTypes,
        /// The mapping's runtime type.
        actual: TypeName,
    },
}

impl TypeMismatch {
    /// Coarse base-type mismatch for the given context.
    pub(crate) fn base_mismatch(ctx: &CheckContext<'_>, expected: Vec<TypeName>) -> Self {
        Self::Type {
            location: ctx.location.clone(),
            expected: expected.into(),
            actual: ctx.actual.runtime_type(),
        }
    }

    /// Container-element mismatch for the given context.
    pub(crate) fn element_mismatch(ctx: &CheckContext<'_>, expected: Vec<TypeName>) -> Self {
        Self::ContainerElement {
            location: ctx.location.clone(),
            expected: expected.into(),
            actual: ctx.actual.runtime_type(),
        }
    }

    /// Mapping-key mismatch for the given context.
    pub(crate) fn key_mismatch(ctx: &CheckContext<'_>, expected: Vec<TypeName>) -> Self {
        Self::MappingKey {
            location: ctx.location.clone(),
            expected: expected.into(),
            actual: ctx.actual.runtime_type(),
        }
    }

    /// Mapping-value mismatch for the given context.
    pub(crate) fn value_mismatch(ctx: &CheckContext<'_>, expected: Vec<TypeName>) -> Self {
        Self::MappingValue {
            location: ctx.location.clone(),
            expected: expected.into(),
            actual: ctx.actual.runtime_type(),
        }
    }

    /// The mismatch kind.
    pub fn kind(&self) -> MismatchKind {
        match self {
            Self::Type { .. } => MismatchKind::TypeMismatch,
            Self::ContainerElement { .. } => MismatchKind::ContainerElementMismatch,
            Self::MappingKey { .. } => MismatchKind::MappingKeyMismatch,
            Self::MappingValue { .. } => MismatchKind::MappingValueMismatch,
        }
    }

    /// The validation site.
    pub fn location(&self) -> &Location {
        match self {
            Self::Type { location, .. }
            | Self::ContainerElement { location, .. }
            | Self::MappingKey { location, .. }
            | Self::MappingValue { location, .. } => location,
        }
    }

    /// The narrowed set of acceptable types for the failing check.
    pub fn expected(&self) -> &ExpectedTypes {
        match self {
            Self::Type { expected, .. }
            | Self::ContainerElement { expected, .. }
            | Self::MappingKey { expected, .. }
            | Self::MappingValue { expected, .. } => expected,
        }
    }

    /// The runtime type of the value that failed.
    pub fn actual(&self) -> &TypeName {
        match self {
            Self::Type { actual, .. }
            | Self::ContainerElement { actual, .. }
            | Self::MappingKey { actual, .. }
            | Self::MappingValue { actual, .. } => actual,
        }
    }
}
