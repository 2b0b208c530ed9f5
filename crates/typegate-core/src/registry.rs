//! # Class Registry — Explicit Subtype Declarations
//!
//! The engine accepts a value whose runtime type is a subtype of a declared
//! base type. In the absence of host-language reflection, the subtype
//! relation is declared explicitly: the host registers each class once,
//! naming an optional parent (a builtin base or another registered class),
//! before any checks run.
//!
//! ## Invariant
//!
//! A registry is mutated only during host setup. The matcher borrows it
//! immutably, so a finished registry can be shared across threads without
//! locking.

use std::collections::HashMap;

use thiserror::Error;

use crate::value::{ClassName, TypeName};

/// Error while declaring a class.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A class with this name is already registered.
    #[error("class '{0}' is already registered")]
    DuplicateClass(ClassName),

    /// The named parent class has not been registered.
    #[error("parent class '{0}' is not registered")]
    UnknownParent(ClassName),
}

/// A registered class: its name and optional parent type.
#[derive(Debug, Clone)]
struct ClassDef {
    parent: Option<TypeName>,
}

/// Registry of user-declared classes and their parent links.
///
/// The subtype relation it induces is: reflexive on all type names; every
/// type is a subtype of `Any`; a class is a subtype of whatever its parent
/// chain reaches. Builtin types have no subtype relation among themselves.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<ClassName, ClassDef>,
}

impl ClassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a class, optionally extending a builtin base or another
    /// registered class.
    ///
    /// Returns the class name for use in values and declared types.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateClass` if the name is taken, and
    /// `RegistryError::UnknownParent` if the parent is a class that has not
    /// been registered. Parents must be registered before their children,
    /// which also rules out cycles.
    pub fn register(
        &mut self,
        name: impl Into<ClassName>,
        parent: Option<TypeName>,
    ) -> Result<ClassName, RegistryError> {
        let name = name.into();
        if self.classes.contains_key(&name) {
            return Err(RegistryError::DuplicateClass(name));
        }
        if let Some(TypeName::Class(parent_name)) = &parent {
            if !self.classes.contains_key(parent_name) {
                return Err(RegistryError::UnknownParent(parent_name.clone()));
            }
        }
        self.classes.insert(name.clone(), ClassDef { parent });
        Ok(name)
    }

    /// True if the class name is registered.
    pub fn contains(&self, name: &ClassName) -> bool {
        self.classes.contains_key(name)
    }

    /// Whether `sub` is a subtype of `sup` (reflexive).
    ///
    /// Unregistered class names have no parent chain; they are subtypes
    /// only of themselves and `Any`.
    pub fn is_subtype(&self, sub: &TypeName, sup: &TypeName) -> bool {
        if sub == sup || *sup == TypeName::Any {
            return true;
        }
        // Walk the parent chain of class types.
        let mut current = sub.clone();
        while let TypeName::Class(name) = &current {
            let parent = self.classes.get(name).and_then(|def| def.parent.clone());
            match parent {
                Some(p) if p == *sup => return true,
                Some(p) => current = p,
                None => return false,
            }
        }
        false
    }
}
