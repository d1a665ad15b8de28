//! Runtime Structural Type Engine
//!
//! Descriptor trees are built once per declaration and interned into a
//! `TypeContext`. A `Validator` borrows the context and answers, for one
//! attempt at a time:
//!
//! - whether a runtime value satisfies a descriptor (silently, with
//!   structured diagnostics, or as an assertion)
//! - how two descriptors rank by specificity (`compare`)
//! - which types flowed into generic slots during the attempt
//!
//! Key properties:
//! - O(1) descriptor equality via interning (`TypeId` comparison)
//! - Per-attempt binding state, reset before every attempt
//! - Coinductive handling of comparison cycles
mod binder;
mod compare;
pub mod dispatch;
mod format;
mod intern;
pub mod path;
pub mod recursion;
pub mod signature;
mod type_of;
pub mod types;
mod validate;
pub mod validation;
pub mod value;

pub use binder::{AttemptId, Bindings};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use format::TypeFormatter;
pub use intern::TypeContext;
pub use path::{IdentifierPath, PathSegment};
pub use signature::{AssertParamsError, CallResult, arg_count_bounds};
pub use types::*;
pub use validate::Validator;
pub use validation::{
    FastTracer, SignatureError, TypeMismatch, Validation, ValidationError, ValidationTracer,
};
pub use value::{FunctionRef, ObjectRef, Value};
