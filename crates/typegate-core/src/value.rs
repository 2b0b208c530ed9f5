//! # Dynamic Value Model
//!
//! Defines [`Value`], the runtime values the validation engine inspects, and
//! [`TypeName`], the names of runtime and declared types.
//!
//! The engine validates values it does not own and never mutates: a check is
//! a pure read over a `&Value`. Containers hold their contents inline so the
//! matcher can iterate elements and entries without any host cooperation.
//!
//! ## Invariant
//!
//! `Value::runtime_type()` is total and never returns [`TypeName::Any`].
//! `Any` exists only on the declaration side, where it stands for an
//! unannotated location that accepts every value.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a user-declared class registered in a
/// [`ClassRegistry`](crate::registry::ClassRegistry).
///
/// A newtype rather than a bare string so a class name cannot be confused
/// with a field or owner name in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassName(pub String);

impl ClassName {
    /// Construct a class name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Access the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// The name of a runtime or declared type.
///
/// Declared annotations and runtime values share this namespace: the coarse
/// check compares a value's runtime type name against the declared base
/// types directly. `Any` is the universal type used for unannotated
/// locations; it is never the runtime type of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeName {
    /// The universal type. Every type is a subtype of `Any`.
    Any,
    /// Boolean.
    Bool,
    /// Signed integer.
    Int,
    /// Floating-point number.
    Float,
    /// String.
    Str,
    /// Ordered sequence container (one type argument when parameterized).
    List,
    /// Distinct-element container (one type argument when parameterized).
    Set,
    /// Key/value mapping container (two type arguments when parameterized).
    Map,
    /// A user-declared class.
    Class(ClassName),
}

impl TypeName {
    /// True for the container types that accept type arguments.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::List | Self::Set | Self::Map)
    }

    /// Number of type arguments the base accepts when parameterized,
    /// or `None` for non-container types.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::List | Self::Set => Some(1),
            Self::Map => Some(2),
            _ => None,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::List => f.write_str("list"),
            Self::Set => f.write_str("set"),
            Self::Map => f.write_str("map"),
            Self::Class(name) => write!(f, "{name}"),
        }
    }
}

impl From<ClassName> for TypeName {
    fn from(name: ClassName) -> Self {
        Self::Class(name)
    }
}

/// An instance of a user-declared class, with named fields.
///
/// Its runtime type is its class name; whether it conforms to a declared
/// base depends on the subtype chain recorded in the class registry, not on
/// its fields (no structural typing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// The class this value is an instance of.
    pub class: ClassName,
    /// Named fields, ordered by name.
    pub fields: BTreeMap<String, Value>,
}

impl Instance {
    /// Create an instance with no fields.
    pub fn new(class: impl Into<ClassName>) -> Self {
        Self {
            class: class.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field, builder style.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// A runtime value under validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Float scalar.
    Float(f64),
    /// String scalar.
    Str(String),
    /// Ordered sequence of values.
    List(Vec<Value>),
    /// Distinct-element sequence. Uniqueness is the host's concern; the
    /// matcher only iterates.
    Set(Vec<Value>),
    /// Insertion-ordered key/value entries. The matcher checks all keys
    /// before any value, in entry order.
    Map(Vec<(Value, Value)>),
    /// Instance of a user-declared class.
    Instance(Instance),
}

impl Value {
    /// The runtime type of this value. Never [`TypeName::Any`].
    pub fn runtime_type(&self) -> TypeName {
        match self {
            Self::Bool(_) => TypeName::Bool,
            Self::Int(_) => TypeName::Int,
            Self::Float(_) => TypeName::Float,
            Self::Str(_) => TypeName::Str,
            Self::List(_) => TypeName::List,
            Self::Set(_) => TypeName::Set,
            Self::Map(_) => TypeName::Map,
            Self::Instance(inst) => TypeName::Class(inst.class.clone()),
        }
    }

    /// Build a list value from anything convertible to values.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a set value from anything convertible to values.
    pub fn set<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    /// Build a map value from key/value pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Instance> for Value {
    fn from(v: Instance) -> Self {
        Self::Instance(v)
    }
}
