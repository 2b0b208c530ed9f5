//! # typegate-guard — Validation Entry Points
//!
//! Thin orchestration over `typegate-core`: the two places values enter the
//! engine in practice.
//!
//! - [`FunctionSignature`] / [`GuardedFn`] validate a callable's arguments
//!   before it runs and its result after (the validate-then-invoke
//!   composition).
//! - [`AttributeSchema`] / [`TypedRecord`] validate values assigned to
//!   declared attributes before the assignment takes effect.
//!
//! Both layers declare types explicitly at registration time; there is no
//! implicit interception and no global side effect on anything resembling
//! class construction. The core neither knows nor cares how arguments were
//! bound or how assignment was intercepted.
//!
//! ## Crate Policy
//!
//! - Depends only on `typegate-core` internally.
//! - Fail-fast: the first mismatching parameter aborts a call check; no
//!   aggregation of simultaneous failures.
//! - Events are emitted through `tracing` at `trace`/`debug` level;
//!   subscriber setup is the host's business.

pub mod record;
pub mod signature;

pub use record::{AttributeSchema, AttributeSchemaBuilder, TypedRecord};
pub use signature::{CallableKind, FunctionSignature, GuardError, GuardedFn, SignatureBuilder};
