//! # Typed Records — Validating Attribute Assignment
//!
//! The explicit replacement for intercepting attribute assignment on a
//! class: the host declares attribute types once in an [`AttributeSchema`],
//! then every [`TypedRecord`] built from it validates a value on `set`
//! before the assignment takes effect. A failed assignment leaves the
//! record untouched.
//!
//! Attributes not named in the schema are stored unchecked: only declared
//! attributes are guarded, matching the engine's opt-in declaration model.
//! Validation happens only at assignment; a stored container mutated
//! through other means is not re-checked.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;
use typegate_core::{
    ClassRegistry, DeclarationError, Location, Matcher, TypeExpr, TypeMismatch, TypeSet, Value,
};

/// Declared attribute types for one kind of record, built once and shared
/// across every instance via `Arc` (the declarations play the role the
/// class's annotations played in the source design).
#[derive(Debug)]
pub struct AttributeSchema {
    attributes: Vec<(String, Arc<TypeSet>)>,
}

impl AttributeSchema {
    /// Start declaring a schema.
    pub fn builder() -> AttributeSchemaBuilder {
        AttributeSchemaBuilder {
            attributes: Vec::new(),
        }
    }

    /// Declared attribute names, in declaration order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(name, _)| name.as_str())
    }

    fn type_of(&self, name: &str) -> Option<&Arc<TypeSet>> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, set)| set)
    }
}

/// Builder for [`AttributeSchema`]. Re-declaring an attribute replaces the
/// earlier declaration.
#[derive(Debug, Default)]
pub struct AttributeSchemaBuilder {
    attributes: Vec<(String, TypeExpr)>,
}

impl AttributeSchemaBuilder {
    /// Declare a typed attribute.
    pub fn attribute(mut self, name: impl Into<String>, expected: impl Into<TypeExpr>) -> Self {
        let name = name.into();
        self.attributes.retain(|(attr, _)| *attr != name);
        self.attributes.push((name, expected.into()));
        self
    }

    /// Normalize all declarations and build the schema.
    ///
    /// # Errors
    ///
    /// Propagates [`DeclarationError`] from any malformed declared type.
    pub fn build(self) -> Result<AttributeSchema, DeclarationError> {
        let mut attributes = Vec::with_capacity(self.attributes.len());
        for (name, expr) in self.attributes {
            attributes.push((name, Arc::new(TypeSet::new(expr)?)));
        }
        Ok(AttributeSchema { attributes })
    }
}

/// A named bag of attributes whose assignments are validated against a
/// shared [`AttributeSchema`].
#[derive(Debug)]
pub struct TypedRecord {
    object_name: String,
    schema: Arc<AttributeSchema>,
    values: BTreeMap<String, Value>,
}

impl TypedRecord {
    /// Create an empty record. The object name appears in diagnostics.
    pub fn new(object_name: impl Into<String>, schema: Arc<AttributeSchema>) -> Self {
        Self {
            object_name: object_name.into(),
            schema,
            values: BTreeMap::new(),
        }
    }

    /// The name used as the diagnostic owner.
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// Validate and store an attribute value.
    ///
    /// Declared attributes are checked before the assignment takes effect;
    /// a mismatch leaves any previous value in place. Undeclared attributes
    /// are stored unchecked.
    ///
    /// # Errors
    ///
    /// The [`TypeMismatch`] for a non-conforming value.
    pub fn set(
        &mut self,
        registry: &ClassRegistry,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), TypeMismatch> {
        let name = name.into();
        let value = value.into();
        if let Some(expected) = self.schema.type_of(&name) {
            trace!(object = %self.object_name, attribute = %name, "checking assignment");
            Matcher::new(registry).check_value(
                Location::attribute(&self.object_name, &name),
                expected,
                &value,
            )?;
        }
        self.values.insert(name, value);
        Ok(())
    }

    /// Read an attribute, if assigned.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}
