//! # Type Descriptors — Declared-Type Normalization
//!
//! A declared annotation arrives as a [`TypeExpr`]: a plain type name, a
//! union, or a container with type arguments. This module normalizes one
//! non-union member of an annotation into a [`TypeDescriptor`]: the base
//! type plus its argument shape, ready for the matcher.
//!
//! ## One Level Only
//!
//! Only one level of container nesting is checked. A container argument
//! that is itself parameterized (`list[list[int]]`, `map[str, list[int]]`)
//! is rejected at declaration time with
//! [`DeclarationError::UnsupportedNesting`] rather than accepted with
//! unspecified behavior. This is a deliberate limit, not a gap.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::TypeName;

/// Error while normalizing a declared type expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    /// Type arguments were given for a type that takes none.
    #[error("type '{0}' does not take type arguments")]
    NotParameterizable(TypeName),

    /// Wrong number of type arguments for a container base.
    #[error("container '{base}' takes {expected} type argument(s), got {got}")]
    WrongArity {
        /// The container base type.
        base: TypeName,
        /// Arguments the base accepts.
        expected: usize,
        /// Arguments that were declared.
        got: usize,
    },

    /// A container argument was itself parameterized. Only one level of
    /// container nesting is supported.
    #[error("nested parameterized type arguments are not supported: only one level of container nesting is checked")]
    UnsupportedNesting,

    /// A union reached a single-member descriptor. Unions are split by the
    /// type set one level up.
    #[error("a union cannot be described by a single type descriptor")]
    UnexpectedUnion,

    /// A union with no members.
    #[error("a union must have at least one member")]
    EmptyUnion,
}

/// A declared type expression: the explicit replacement for source-language
/// annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeExpr {
    /// A plain type name.
    Name(TypeName),
    /// Any one of the member expressions.
    Union(Vec<TypeExpr>),
    /// A container base with type arguments.
    Parameterized {
        /// The container base type.
        base: TypeName,
        /// Ordered type arguments.
        args: Vec<TypeExpr>,
    },
}

impl TypeExpr {
    /// `list[element]`.
    pub fn list_of(element: impl Into<TypeExpr>) -> Self {
        Self::Parameterized {
            base: TypeName::List,
            args: vec![element.into()],
        }
    }

    /// `set[element]`.
    pub fn set_of(element: impl Into<TypeExpr>) -> Self {
        Self::Parameterized {
            base: TypeName::Set,
            args: vec![element.into()],
        }
    }

    /// `map[key, value]`.
    pub fn map_of(key: impl Into<TypeExpr>, value: impl Into<TypeExpr>) -> Self {
        Self::Parameterized {
            base: TypeName::Map,
            args: vec![key.into(), value.into()],
        }
    }

    /// A union of member expressions.
    pub fn union<I, E>(members: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<TypeExpr>,
    {
        Self::Union(members.into_iter().map(Into::into).collect())
    }
}

impl From<TypeName> for TypeExpr {
    fn from(name: TypeName) -> Self {
        Self::Name(name)
    }
}

/// The acceptable types for one argument position of a container, resolved
/// one level deep: a plain argument contributes its own name, a union
/// argument contributes its members directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentTypes {
    /// A single acceptable type.
    Single(TypeName),
    /// Any of several acceptable types (a union argument, flattened).
    OneOf(Vec<TypeName>),
}

impl ArgumentTypes {
    /// Normalize one container argument.
    ///
    /// # Errors
    ///
    /// `UnsupportedNesting` if the argument (or a union member of it) is
    /// itself parameterized; `EmptyUnion` for a memberless union.
    fn from_expr(expr: &TypeExpr) -> Result<Self, DeclarationError> {
        match expr {
            TypeExpr::Name(name) => Ok(Self::Single(name.clone())),
            TypeExpr::Union(members) => {
                let mut names = Vec::new();
                flatten_union_names(members, &mut names)?;
                if names.is_empty() {
                    return Err(DeclarationError::EmptyUnion);
                }
                Ok(Self::OneOf(names))
            }
            TypeExpr::Parameterized { .. } => Err(DeclarationError::UnsupportedNesting),
        }
    }

    /// The resolved set of acceptable type names, in declaration order.
    pub fn resolved(&self) -> &[TypeName] {
        match self {
            Self::Single(name) => std::slice::from_ref(name),
            Self::OneOf(names) => names,
        }
    }
}

/// Collect the plain names of a union's members, flattening nested unions.
fn flatten_union_names(
    members: &[TypeExpr],
    out: &mut Vec<TypeName>,
) -> Result<(), DeclarationError> {
    for member in members {
        match member {
            TypeExpr::Name(name) => out.push(name.clone()),
            TypeExpr::Union(inner) => flatten_union_names(inner, out)?,
            TypeExpr::Parameterized { .. } => {
                return Err(DeclarationError::UnsupportedNesting)
            }
        }
    }
    Ok(())
}

/// The argument shape of a normalized descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// No type arguments. Matches any value of the base type, container
    /// contents included.
    Plain,
    /// One-argument container: the acceptable element types.
    Element(ArgumentTypes),
    /// Two-argument mapping: acceptable key and value types.
    Entries {
        /// Acceptable key types.
        key: ArgumentTypes,
        /// Acceptable value types.
        value: ArgumentTypes,
    },
}

/// One non-union member of a declared annotation, normalized: a base type
/// plus its argument shape.
///
/// Built once per declared type by [`TypeSet`](crate::typeset::TypeSet) and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    base: TypeName,
    shape: Shape,
}

impl TypeDescriptor {
    /// A descriptor for a plain, unparameterized type.
    pub fn plain(base: TypeName) -> Self {
        Self {
            base,
            shape: Shape::Plain,
        }
    }

    /// Normalize one non-union type expression.
    ///
    /// # Errors
    ///
    /// - `UnexpectedUnion` if the expression is a union (split those with
    ///   [`TypeSet`](crate::typeset::TypeSet)).
    /// - `NotParameterizable` / `WrongArity` for bad parameterizations.
    /// - `UnsupportedNesting` for parameterized container arguments.
    pub fn from_expr(expr: &TypeExpr) -> Result<Self, DeclarationError> {
        match expr {
            TypeExpr::Name(name) => Ok(Self {
                base: name.clone(),
                shape: Shape::Plain,
            }),
            TypeExpr::Union(_) => Err(DeclarationError::UnexpectedUnion),
            TypeExpr::Parameterized { base, args } => {
                let expected = base
                    .arity()
                    .ok_or_else(|| DeclarationError::NotParameterizable(base.clone()))?;
                if args.len() != expected {
                    return Err(DeclarationError::WrongArity {
                        base: base.clone(),
                        expected,
                        got: args.len(),
                    });
                }
                let shape = match expected {
                    1 => Shape::Element(ArgumentTypes::from_expr(&args[0])?),
                    _ => Shape::Entries {
                        key: ArgumentTypes::from_expr(&args[0])?,
                        value: ArgumentTypes::from_expr(&args[1])?,
                    },
                };
                Ok(Self {
                    base: base.clone(),
                    shape,
                })
            }
        }
    }

    /// The unparameterized base type.
    pub fn base(&self) -> &TypeName {
        &self.base
    }

    /// The argument shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// True when the descriptor carries no type arguments.
    pub fn is_plain(&self) -> bool {
        matches!(self.shape, Shape::Plain)
    }
}
