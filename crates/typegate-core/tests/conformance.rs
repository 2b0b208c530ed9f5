//! # End-to-End Conformance Scenarios
//!
//! Exercises the full declaration -> normalization -> matching pipeline the
//! way a host would drive it: build a `TypeSet` once per annotation, then
//! check values against it repeatedly. Each scenario pins down one
//! externally observable behavior of the engine, including the exact
//! mismatch kind and the narrowed expected set.

use typegate_core::{
    ClassRegistry, Instance, Location, Matcher, MismatchKind, TypeExpr, TypeMismatch, TypeName,
    TypeSet, Value,
};

fn check(
    registry: &ClassRegistry,
    set: &TypeSet,
    value: &Value,
) -> Result<(), TypeMismatch> {
    Matcher::new(registry).check_value(
        Location::function_parameter("example", "arg"),
        set,
        value,
    )
}

#[test]
fn declared_int_accepts_an_int() {
    let registry = ClassRegistry::new();
    let set = TypeSet::new(TypeExpr::Name(TypeName::Int)).unwrap();
    check(&registry, &set, &Value::from(5i64)).unwrap();
}

#[test]
fn declared_union_accepts_either_member() {
    let registry = ClassRegistry::new();
    let set = TypeSet::new(TypeExpr::union([TypeName::Int, TypeName::Str])).unwrap();
    check(&registry, &set, &Value::from("x")).unwrap();
    check(&registry, &set, &Value::from(7i64)).unwrap();
}

#[test]
fn mixed_list_fails_with_element_mismatch() {
    let registry = ClassRegistry::new();
    let set = TypeSet::new(TypeExpr::list_of(TypeName::Int)).unwrap();
    let value = Value::List(vec![
        Value::from(1i64),
        Value::from(2i64),
        Value::from("3"),
    ]);
    let err = check(&registry, &set, &value).unwrap_err();
    assert_eq!(err.kind(), MismatchKind::ContainerElementMismatch);
    assert_eq!(err.expected().names(), [TypeName::Int]);
    assert_eq!(*err.actual(), TypeName::List);
}

#[test]
fn bad_key_is_reported_before_the_bad_value_is_seen() {
    // {"a": 1, 2: 3} against map[str, int]: the int key fails first even
    // though every value on the int-keyed entry is fine, and even though a
    // value check would also have passed here. The value side must never
    // be evaluated once a key has failed.
    let registry = ClassRegistry::new();
    let set = TypeSet::new(TypeExpr::map_of(TypeName::Str, TypeName::Int)).unwrap();
    let value = Value::Map(vec![
        (Value::from("a"), Value::from(1i64)),
        (Value::from(2i64), Value::from(3i64)),
    ]);
    let err = check(&registry, &set, &value).unwrap_err();
    assert_eq!(err.kind(), MismatchKind::MappingKeyMismatch);
    assert_eq!(err.expected().names(), [TypeName::Str]);
}

#[test]
fn bad_value_is_reported_once_all_keys_pass() {
    let registry = ClassRegistry::new();
    let set = TypeSet::new(TypeExpr::map_of(TypeName::Str, TypeName::Int)).unwrap();
    let value = Value::Map(vec![
        (Value::from("a"), Value::from(1i64)),
        (Value::from("b"), Value::from("x")),
    ]);
    let err = check(&registry, &set, &value).unwrap_err();
    assert_eq!(err.kind(), MismatchKind::MappingValueMismatch);
    assert_eq!(err.expected().names(), [TypeName::Int]);
}

#[test]
fn unannotated_location_accepts_any_value() {
    let registry = ClassRegistry::new();
    let set = TypeSet::any();
    for value in [
        Value::from(1i64),
        Value::from("x"),
        Value::map([("k", 1i64)]),
        Value::from(Instance::new("Whatever")),
    ] {
        check(&registry, &set, &value).unwrap();
    }
}

#[test]
fn subclass_of_container_base_skips_shape_checks() {
    // Documented limitation, preserved on purpose: a user subtype of a
    // declared container base is accepted without element checks.
    let mut registry = ClassRegistry::new();
    let my_list = registry.register("MyList", Some(TypeName::List)).unwrap();
    let set = TypeSet::new(TypeExpr::list_of(TypeName::Int)).unwrap();
    let value = Value::from(Instance::new(my_list).with_field("note", "no ints here"));
    check(&registry, &set, &value).unwrap();
}

#[test]
fn unrelated_class_fails_the_coarse_check() {
    let mut registry = ClassRegistry::new();
    let account = registry.register("Account", None).unwrap();
    let set = TypeSet::new(TypeExpr::Name(TypeName::List)).unwrap();
    let err = check(&registry, &set, &Value::from(Instance::new(account))).unwrap_err();
    assert_eq!(err.kind(), MismatchKind::TypeMismatch);
    assert_eq!(*err.actual(), TypeName::Class("Account".into()));
}

#[test]
fn declared_class_accepts_its_subclasses() {
    let mut registry = ClassRegistry::new();
    let animal = registry.register("Animal", None).unwrap();
    let dog = registry
        .register("Dog", Some(TypeName::Class(animal.clone())))
        .unwrap();
    let set = TypeSet::new(TypeExpr::Name(TypeName::Class(animal))).unwrap();
    check(&registry, &set, &Value::from(Instance::new(dog))).unwrap();
}

#[test]
fn diagnostics_are_identical_across_repeated_checks() {
    let registry = ClassRegistry::new();
    let set = TypeSet::new(TypeExpr::map_of(TypeName::Str, TypeName::Int)).unwrap();
    let value = Value::Map(vec![(Value::from(1i64), Value::from(1i64))]);
    let first = check(&registry, &set, &value).unwrap_err();
    let second = check(&registry, &set, &value).unwrap_err();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn mismatch_message_shape() {
    let registry = ClassRegistry::new();
    let set = TypeSet::new(TypeExpr::union([TypeName::Int, TypeName::Float])).unwrap();
    let err = Matcher::new(&registry)
        .check_value(
            Location::attribute("account", "balance"),
            &set,
            &Value::from("ten"),
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "attribute 'balance' of object 'account' is not the expected type: \
         got str, expected one of [int, float]"
    );
}

#[test]
fn type_set_is_shareable_across_threads() {
    use std::sync::Arc;

    let registry = Arc::new(ClassRegistry::new());
    let set = Arc::new(TypeSet::new(TypeExpr::list_of(TypeName::Int)).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let set = Arc::clone(&set);
            std::thread::spawn(move || {
                let value = Value::list([i as i64, i as i64 + 1]);
                check(&registry, &set, &value).is_ok()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn diagnostic_fields_serialize_for_host_rendering() {
    let registry = ClassRegistry::new();
    let set = TypeSet::new(TypeExpr::list_of(TypeName::Int)).unwrap();
    let value = Value::List(vec![Value::from("x")]);
    let err = check(&registry, &set, &value).unwrap_err();

    // Hosts that surface diagnostics over process boundaries serialize the
    // structured fields rather than the rendered message.
    let location = serde_json::to_value(err.location()).unwrap();
    assert_eq!(location["kind"], "function_parameter");
    assert_eq!(location["owner"], "example");
    let expected = serde_json::to_value(err.expected()).unwrap();
    assert_eq!(expected[0], "int");
    let kind = serde_json::to_value(err.kind()).unwrap();
    assert_eq!(kind, "container_element_mismatch");
}
