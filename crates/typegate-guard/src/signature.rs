//! # Function Signatures — Argument and Return Validation
//!
//! The explicit replacement for annotation introspection: a host declares a
//! callable's parameter and return types once on a [`SignatureBuilder`],
//! and the built [`FunctionSignature`] validates argument lists before the
//! call and the result after it. [`GuardedFn`] composes the two around a
//! closure as a validate-then-invoke wrapper.
//!
//! Type sets are normalized once at `build()` and shared in `Arc`s, so
//! repeated calls never re-parse the declarations.
//!
//! Validation is fail-fast: parameters are checked in declaration order and
//! the first mismatch is returned alone, with no aggregation across
//! parameters.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};
use typegate_core::{
    ClassRegistry, DeclarationError, Location, Matcher, TypeExpr, TypeMismatch, TypeSet, Value,
};

/// Error raised by a guarded call.
#[derive(Error, Debug)]
pub enum GuardError {
    /// A value failed validation.
    #[error(transparent)]
    Mismatch(#[from] TypeMismatch),

    /// The argument list does not match the declared parameter count.
    #[error("'{function}' takes {expected} argument(s), got {got}")]
    Arity {
        /// The callable's name.
        function: String,
        /// Declared parameter count.
        expected: usize,
        /// Arguments supplied.
        got: usize,
    },
}

/// Whether a signature describes a free function or a method. Only the
/// diagnostic location kind differs; a method's receiver is simply not
/// declared as a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
    /// A free function.
    Function,
    /// A method on some object.
    Method,
}

#[derive(Debug, Clone)]
struct Parameter {
    name: String,
    expected: Arc<TypeSet>,
}

/// A callable's declared parameter and return types, normalized once.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    name: String,
    kind: CallableKind,
    params: Vec<Parameter>,
    /// `None` means the return value is unchecked.
    ret: Option<Arc<TypeSet>>,
}

impl FunctionSignature {
    /// Start declaring a signature for the named callable.
    pub fn builder(name: impl Into<String>) -> SignatureBuilder {
        SignatureBuilder {
            name: name.into(),
            kind: CallableKind::Function,
            params: Vec::new(),
            ret: None,
        }
    }

    /// The callable's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Function or method.
    pub fn kind(&self) -> CallableKind {
        self.kind
    }

    /// Declared parameter count.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    fn param_location(&self, field: &str) -> Location {
        match self.kind {
            CallableKind::Function => Location::function_parameter(&self.name, field),
            CallableKind::Method => Location::method_parameter(&self.name, field),
        }
    }

    /// Validate a positional argument list against the declared parameters.
    ///
    /// Parameters are checked in declaration order; the first mismatch
    /// aborts the rest.
    ///
    /// # Errors
    ///
    /// `GuardError::Arity` when the argument count is wrong, otherwise the
    /// first [`TypeMismatch`].
    pub fn check_args(
        &self,
        registry: &ClassRegistry,
        args: &[Value],
    ) -> Result<(), GuardError> {
        if args.len() != self.params.len() {
            return Err(GuardError::Arity {
                function: self.name.clone(),
                expected: self.params.len(),
                got: args.len(),
            });
        }
        let matcher = Matcher::new(registry);
        for (param, arg) in self.params.iter().zip(args) {
            trace!(function = %self.name, parameter = %param.name, "checking argument");
            matcher.check_value(self.param_location(&param.name), &param.expected, arg)?;
        }
        Ok(())
    }

    /// Validate a call result against the declared return type, if any.
    ///
    /// # Errors
    ///
    /// The [`TypeMismatch`] for a non-conforming result.
    pub fn check_return(
        &self,
        registry: &ClassRegistry,
        value: &Value,
    ) -> Result<(), GuardError> {
        let Some(expected) = &self.ret else {
            return Ok(());
        };
        trace!(function = %self.name, "checking return value");
        Matcher::new(registry)
            .check_value(Location::return_value(&self.name), expected, value)?;
        Ok(())
    }
}

/// Builder for [`FunctionSignature`]. Declarations are normalized into
/// type sets at [`build`](SignatureBuilder::build).
#[derive(Debug)]
pub struct SignatureBuilder {
    name: String,
    kind: CallableKind,
    params: Vec<(String, Option<TypeExpr>)>,
    ret: Option<TypeExpr>,
}

impl SignatureBuilder {
    /// Declare a typed parameter.
    pub fn param(mut self, name: impl Into<String>, expected: impl Into<TypeExpr>) -> Self {
        self.params.push((name.into(), Some(expected.into())));
        self
    }

    /// Declare an unannotated parameter: any value passes.
    pub fn untyped_param(mut self, name: impl Into<String>) -> Self {
        self.params.push((name.into(), None));
        self
    }

    /// Declare the return type. Without this, results are unchecked.
    pub fn returns(mut self, expected: impl Into<TypeExpr>) -> Self {
        self.ret = Some(expected.into());
        self
    }

    /// Mark the callable as a method, switching parameter diagnostics to
    /// the method location kind. The receiver is not a parameter.
    pub fn method(mut self) -> Self {
        self.kind = CallableKind::Method;
        self
    }

    /// Normalize all declarations and build the signature.
    ///
    /// # Errors
    ///
    /// Propagates [`DeclarationError`] from any malformed declared type.
    pub fn build(self) -> Result<FunctionSignature, DeclarationError> {
        let mut params = Vec::with_capacity(self.params.len());
        for (name, expr) in self.params {
            let expected = match expr {
                Some(expr) => Arc::new(TypeSet::new(expr)?),
                None => Arc::new(TypeSet::any()),
            };
            params.push(Parameter { name, expected });
        }
        let ret = match self.ret {
            Some(expr) => Some(Arc::new(TypeSet::new(expr)?)),
            None => None,
        };
        Ok(FunctionSignature {
            name: self.name,
            kind: self.kind,
            params,
            ret,
        })
    }
}

/// A validate-then-invoke wrapper: arguments are validated against the
/// signature, the inner closure runs, and the result is validated before it
/// is handed back.
pub struct GuardedFn<F> {
    signature: FunctionSignature,
    inner: F,
}

impl<F> GuardedFn<F>
where
    F: Fn(&[Value]) -> Value,
{
    /// Wrap a closure with a signature.
    pub fn new(signature: FunctionSignature, inner: F) -> Self {
        Self { signature, inner }
    }

    /// The declared signature.
    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    /// Validate, invoke, validate the result.
    ///
    /// The inner closure does not run unless every argument conforms; a
    /// non-conforming result is reported instead of returned.
    ///
    /// # Errors
    ///
    /// Any [`GuardError`] from argument or return validation.
    pub fn call(&self, registry: &ClassRegistry, args: &[Value]) -> Result<Value, GuardError> {
        if let Err(err) = self.signature.check_args(registry, args) {
            debug!(function = %self.signature.name(), error = %err, "argument validation failed");
            return Err(err);
        }
        let result = (self.inner)(args);
        if let Err(err) = self.signature.check_return(registry, &result) {
            debug!(function = %self.signature.name(), error = %err, "return validation failed");
            return Err(err);
        }
        Ok(result)
    }
}
