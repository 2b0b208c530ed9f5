//! # Type Sets — Declared Annotations, Grouped by Base Type
//!
//! A full annotation may be a union; a [`TypeSet`] splits it into non-union
//! members, normalizes each into a [`TypeDescriptor`], and groups the
//! descriptors by base type. A union may declare the same base more than
//! once with different container shapes (`list[int] | list[str]`), so each
//! base maps to an ordered group of descriptors.
//!
//! ## Ordering
//!
//! Groups and the descriptors within them keep declaration order. The order
//! is semantic: when no shape under a base matches, the matcher reports the
//! mismatch of the first-declared shape.
//!
//! ## Sharing
//!
//! A `TypeSet` is built once per declared annotation and never mutated, so
//! it can be shared by reference (or `Arc`) across repeated checks and
//! across threads without synchronization.

use serde::{Deserialize, Serialize};

use crate::descriptor::{DeclarationError, TypeDescriptor, TypeExpr};
use crate::value::TypeName;

/// Descriptors sharing one base type, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Group {
    base: TypeName,
    descriptors: Vec<TypeDescriptor>,
}

/// A declared annotation, normalized: one descriptor group per distinct
/// base type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSet {
    /// The raw annotation, retained for diagnostic rendering.
    original: TypeExpr,
    /// Groups in first-declaration order. Every group is non-empty.
    groups: Vec<Group>,
}

impl TypeSet {
    /// Normalize a declared annotation.
    ///
    /// Top-level unions are split into members (nested unions flatten);
    /// each member becomes one descriptor, grouped by base type.
    ///
    /// # Errors
    ///
    /// Propagates [`DeclarationError`] from member normalization, and
    /// returns `EmptyUnion` for a union with no members.
    pub fn new(expr: TypeExpr) -> Result<Self, DeclarationError> {
        let mut members = Vec::new();
        collect_members(&expr, &mut members);
        if members.is_empty() {
            return Err(DeclarationError::EmptyUnion);
        }

        let mut groups: Vec<Group> = Vec::new();
        for member in members {
            let descriptor = TypeDescriptor::from_expr(member)?;
            match groups.iter_mut().find(|g| g.base == *descriptor.base()) {
                Some(group) => group.descriptors.push(descriptor),
                None => groups.push(Group {
                    base: descriptor.base().clone(),
                    descriptors: vec![descriptor],
                }),
            }
        }

        Ok(Self {
            original: expr,
            groups,
        })
    }

    /// The universal set used for unannotated locations: every value passes
    /// the coarse check and no fine-grained check ever runs.
    pub fn any() -> Self {
        Self {
            original: TypeExpr::Name(TypeName::Any),
            groups: vec![Group {
                base: TypeName::Any,
                descriptors: vec![TypeDescriptor::plain(TypeName::Any)],
            }],
        }
    }

    /// True when the set accepts every value without shape checks.
    pub fn is_any(&self) -> bool {
        self.groups.iter().any(|g| g.base == TypeName::Any)
    }

    /// The raw annotation this set was built from.
    pub fn original(&self) -> &TypeExpr {
        &self.original
    }

    /// Declared base types, in first-declaration order.
    pub fn base_types(&self) -> impl Iterator<Item = &TypeName> {
        self.groups.iter().map(|g| &g.base)
    }

    /// The descriptors declared for a base type, if any. Never empty.
    pub fn descriptors_for(&self, base: &TypeName) -> Option<&[TypeDescriptor]> {
        self.groups
            .iter()
            .find(|g| g.base == *base)
            .map(|g| g.descriptors.as_slice())
    }
}

/// Flatten an annotation into its non-union member expressions.
fn collect_members<'a>(expr: &'a TypeExpr, out: &mut Vec<&'a TypeExpr>) {
    match expr {
        TypeExpr::Union(members) => {
            for member in members {
                collect_members(member, out);
            }
        }
        other => out.push(other),
    }
}
