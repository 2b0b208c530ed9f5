//! # Matcher — Conformance Checking
//!
//! Decides whether a runtime value conforms to a declared [`TypeSet`], in
//! two passes:
//!
//! 1. **Coarse check**: the value's runtime type must be a declared base
//!    type, or a subtype of one per the [`ClassRegistry`]. Failure is a
//!    base-type mismatch reporting all declared bases.
//! 2. **Fine-grained check**: runs only when the runtime type is an *exact*
//!    declared base. Each container shape declared for that base is tried
//!    in declaration order; the first full match wins. If none matches, the
//!    mismatch of the first-declared shape is reported. For mappings, every
//!    key is checked before any value, and a key failure short-circuits.
//!
//! A value accepted through the subtype relation (not an exact base match)
//! skips the fine-grained check entirely: container-shape constraints are
//! not enforced on subtypes. That is a deliberate extensibility choice, not
//! an oversight, and tests pin it down.
//!
//! Checking is a pure function of `(registry, type set, value)`: no state,
//! no I/O, identical inputs give identical results and identical
//! diagnostics.

use crate::descriptor::{Shape, TypeDescriptor};
use crate::diagnostics::{CheckContext, Location, TypeMismatch};
use crate::registry::ClassRegistry;
use crate::typeset::TypeSet;
use crate::value::Value;

/// Conformance checker over a class registry.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'r> {
    registry: &'r ClassRegistry,
}

impl<'r> Matcher<'r> {
    /// Create a matcher borrowing the registry.
    pub fn new(registry: &'r ClassRegistry) -> Self {
        Self { registry }
    }

    /// Check one context; `Ok(())` on conformance.
    ///
    /// # Errors
    ///
    /// Returns the [`TypeMismatch`] describing the first failing check.
    pub fn check(&self, ctx: &CheckContext<'_>) -> Result<(), TypeMismatch> {
        let actual_type = ctx.actual.runtime_type();

        let group = ctx.expected.descriptors_for(&actual_type);
        let exact = group.is_some();
        let allowed = exact
            || ctx
                .expected
                .base_types()
                .any(|base| self.registry.is_subtype(&actual_type, base));
        if !allowed {
            let declared = ctx.expected.base_types().cloned().collect();
            return Err(TypeMismatch::base_mismatch(ctx, declared));
        }

        let Some(descriptors) = group else {
            // Accepted as a strict subtype of a declared base: shape
            // constraints are not enforced on subtypes.
            return Ok(());
        };

        let mut first_failure = None;
        for descriptor in descriptors {
            match self.check_shape(ctx, descriptor) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    first_failure.get_or_insert(err);
                }
            }
        }
        match first_failure {
            Some(err) => Err(err),
            // Groups are never empty; no failure means no descriptor ran,
            // which cannot happen.
            None => Ok(()),
        }
    }

    /// Convenience wrapper assembling the context inline.
    ///
    /// # Errors
    ///
    /// Same as [`Matcher::check`].
    pub fn check_value(
        &self,
        location: Location,
        expected: &TypeSet,
        actual: &Value,
    ) -> Result<(), TypeMismatch> {
        self.check(&CheckContext::new(location, expected, actual))
    }

    /// Evaluate one declared shape against the context's value.
    fn check_shape(
        &self,
        ctx: &CheckContext<'_>,
        descriptor: &TypeDescriptor,
    ) -> Result<(), TypeMismatch> {
        match descriptor.shape() {
            // Unparameterized shape: a full match regardless of contents.
            Shape::Plain => Ok(()),

            Shape::Element(arg) => {
                let items = match ctx.actual {
                    Value::List(items) | Value::Set(items) => items.as_slice(),
                    // Element shapes exist only for list/set bases, and the
                    // fine-grained check runs only on exact type matches.
                    _ => return Ok(()),
                };
                let allowed = arg.resolved();
                if items
                    .iter()
                    .any(|item| !allowed.contains(&item.runtime_type()))
                {
                    return Err(TypeMismatch::element_mismatch(ctx, allowed.to_vec()));
                }
                Ok(())
            }

            Shape::Entries { key, value } => {
                let entries = match ctx.actual {
                    Value::Map(entries) => entries.as_slice(),
                    _ => return Ok(()),
                };
                // All keys are checked before any value; a key failure
                // short-circuits the value check.
                let keys_allowed = key.resolved();
                if entries
                    .iter()
                    .any(|(k, _)| !keys_allowed.contains(&k.runtime_type()))
                {
                    return Err(TypeMismatch::key_mismatch(ctx, keys_allowed.to_vec()));
                }
                let values_allowed = value.resolved();
                if entries
                    .iter()
                    .any(|(_, v)| !values_allowed.contains(&v.runtime_type()))
                {
                    return Err(TypeMismatch::value_mismatch(ctx, values_allowed.to_vec()));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeExpr;
    use crate::diagnostics::MismatchKind;
    use crate::value::{Instance, TypeName};

    fn check_one(
        registry: &ClassRegistry,
        expr: TypeExpr,
        value: Value,
    ) -> Result<(), TypeMismatch> {
        let set = TypeSet::new(expr).unwrap();
        Matcher::new(registry).check_value(
            Location::function_parameter("f", "x"),
            &set,
            &value,
        )
    }

    #[test]
    fn coarse_pass_on_exact_type() {
        let registry = ClassRegistry::new();
        check_one(&registry, TypeExpr::Name(TypeName::Int), Value::from(5i64)).unwrap();
    }

    #[test]
    fn coarse_failure_reports_all_declared_bases() {
        let registry = ClassRegistry::new();
        let err = check_one(
            &registry,
            TypeExpr::union([TypeName::Int, TypeName::Str]),
            Value::from(1.5f64),
        )
        .unwrap_err();
        assert_eq!(err.kind(), MismatchKind::TypeMismatch);
        assert_eq!(err.expected().names(), [TypeName::Int, TypeName::Str]);
        assert_eq!(*err.actual(), TypeName::Float);
    }

    #[test]
    fn subtype_of_declared_base_passes_coarse_check() {
        let mut registry = ClassRegistry::new();
        let savings = registry.register("Savings", Some(TypeName::List)).unwrap();
        check_one(
            &registry,
            TypeExpr::Name(TypeName::List),
            Value::from(Instance::new(savings)),
        )
        .unwrap();
    }

    #[test]
    fn subtype_bypasses_shape_checking() {
        // A subclass of list declared as list[int] is accepted without
        // looking at elements at all.
        let mut registry = ClassRegistry::new();
        registry.register("MyList", Some(TypeName::List)).unwrap();
        check_one(
            &registry,
            TypeExpr::list_of(TypeName::Int),
            Value::from(Instance::new("MyList").with_field("ignored", "not an int")),
        )
        .unwrap();
    }

    #[test]
    fn exact_container_match_checks_elements() {
        let registry = ClassRegistry::new();
        check_one(
            &registry,
            TypeExpr::list_of(TypeName::Int),
            Value::list([1i64, 2, 3]),
        )
        .unwrap();

        let err = check_one(
            &registry,
            TypeExpr::list_of(TypeName::Int),
            Value::List(vec![Value::from(1i64), Value::from(2i64), Value::from("3")]),
        )
        .unwrap_err();
        assert_eq!(err.kind(), MismatchKind::ContainerElementMismatch);
        assert_eq!(err.expected().names(), [TypeName::Int]);
    }

    #[test]
    fn set_elements_are_checked_like_list_elements() {
        let registry = ClassRegistry::new();
        let err = check_one(
            &registry,
            TypeExpr::set_of(TypeName::Str),
            Value::Set(vec![Value::from("a"), Value::from(1i64)]),
        )
        .unwrap_err();
        assert_eq!(err.kind(), MismatchKind::ContainerElementMismatch);
    }

    #[test]
    fn unparameterized_shape_accepts_any_contents() {
        let registry = ClassRegistry::new();
        check_one(
            &registry,
            TypeExpr::Name(TypeName::List),
            Value::List(vec![Value::from(1i64), Value::from("mixed")]),
        )
        .unwrap();
    }

    #[test]
    fn first_matching_shape_short_circuits() {
        // list[int] | list[str]: a homogeneous str list matches the second
        // shape after the first one misses.
        let registry = ClassRegistry::new();
        check_one(
            &registry,
            TypeExpr::union([
                TypeExpr::list_of(TypeName::Int),
                TypeExpr::list_of(TypeName::Str),
            ]),
            Value::list(["a", "b"]),
        )
        .unwrap();
    }

    #[test]
    fn plain_shape_under_same_base_rescues_mixed_contents() {
        // list[int] | list: the unparameterized shape is a full match.
        let registry = ClassRegistry::new();
        check_one(
            &registry,
            TypeExpr::union([
                TypeExpr::list_of(TypeName::Int),
                TypeExpr::Name(TypeName::List),
            ]),
            Value::List(vec![Value::from(1i64), Value::from("x")]),
        )
        .unwrap();
    }

    #[test]
    fn no_matching_shape_reports_the_first_declared_one() {
        let registry = ClassRegistry::new();
        let err = check_one(
            &registry,
            TypeExpr::union([
                TypeExpr::list_of(TypeName::Int),
                TypeExpr::list_of(TypeName::Str),
            ]),
            Value::List(vec![Value::from(true)]),
        )
        .unwrap_err();
        assert_eq!(err.kind(), MismatchKind::ContainerElementMismatch);
        // Narrowed to the first-declared shape's element set.
        assert_eq!(err.expected().names(), [TypeName::Int]);
    }

    #[test]
    fn map_keys_are_checked_before_values() {
        let registry = ClassRegistry::new();
        // Both a bad key and a bad value are present; the key wins.
        let err = check_one(
            &registry,
            TypeExpr::map_of(TypeName::Str, TypeName::Int),
            Value::Map(vec![
                (Value::from("a"), Value::from("not an int")),
                (Value::from(2i64), Value::from(3i64)),
            ]),
        )
        .unwrap_err();
        assert_eq!(err.kind(), MismatchKind::MappingKeyMismatch);
        assert_eq!(err.expected().names(), [TypeName::Str]);
    }

    #[test]
    fn map_value_mismatch_after_keys_pass() {
        let registry = ClassRegistry::new();
        let err = check_one(
            &registry,
            TypeExpr::map_of(TypeName::Str, TypeName::Int),
            Value::Map(vec![
                (Value::from("a"), Value::from(1i64)),
                (Value::from("b"), Value::from("x")),
            ]),
        )
        .unwrap_err();
        assert_eq!(err.kind(), MismatchKind::MappingValueMismatch);
        assert_eq!(err.expected().names(), [TypeName::Int]);
    }

    #[test]
    fn map_with_union_key_types() {
        let registry = ClassRegistry::new();
        check_one(
            &registry,
            TypeExpr::map_of(
                TypeExpr::union([TypeName::Str, TypeName::Int]),
                TypeName::Bool,
            ),
            Value::Map(vec![
                (Value::from("a"), Value::from(true)),
                (Value::from(1i64), Value::from(false)),
            ]),
        )
        .unwrap();
    }

    #[test]
    fn empty_containers_conform() {
        let registry = ClassRegistry::new();
        check_one(&registry, TypeExpr::list_of(TypeName::Int), Value::List(Vec::new())).unwrap();
        check_one(
            &registry,
            TypeExpr::map_of(TypeName::Str, TypeName::Int),
            Value::Map(Vec::new()),
        )
        .unwrap();
    }

    #[test]
    fn any_set_accepts_everything() {
        let registry = ClassRegistry::new();
        let set = TypeSet::any();
        let matcher = Matcher::new(&registry);
        for value in [
            Value::from(1i64),
            Value::from("x"),
            Value::list([1i64]),
            Value::from(Instance::new("Unregistered")),
        ] {
            matcher
                .check_value(Location::function_parameter("f", "x"), &set, &value)
                .unwrap();
        }
    }

    #[test]
    fn repeated_checks_are_idempotent() {
        let registry = ClassRegistry::new();
        let set = TypeSet::new(TypeExpr::list_of(TypeName::Int)).unwrap();
        let value = Value::List(vec![Value::from("oops")]);
        let matcher = Matcher::new(&registry);
        let first = matcher
            .check_value(Location::function_parameter("f", "x"), &set, &value)
            .unwrap_err();
        let second = matcher
            .check_value(Location::function_parameter("f", "x"), &set, &value)
            .unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }
}
