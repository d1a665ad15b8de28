//! Validation sessions and the error types of the engine.
//!
//! ## Tracer pattern
//!
//! One validation walk serves both silent checks and diagnostic collection.
//! The walk reports every failure to a [`ValidationTracer`]; the failure
//! record is built lazily through a closure, so the silent tracer never
//! allocates and stops at the first failure while a [`Validation`] session
//! records every failure and lets the walk continue.

use crate::intern::TypeContext;
use crate::path::IdentifierPath;
use crate::types::TypeId;
use flowguard_common::diagnostics::{MessageKey, format_message};
use serde::Serialize;
use std::fmt;

/// One structured failure: where, against what, and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub path: IdentifierPath,
    pub expected: TypeId,
    pub key: MessageKey,
}

/// Receives validation failures.
pub trait ValidationTracer {
    /// Whether a walk should keep going after a failure to find more.
    const COLLECTS_ALL: bool;

    /// Called when a value fails a descriptor. The record is only built if
    /// the tracer keeps it.
    fn on_failure(&mut self, failure: impl FnOnce() -> ValidationError);
}

/// Stops at the first failure without building a record.
pub struct FastTracer;

impl ValidationTracer for FastTracer {
    const COLLECTS_ALL: bool = false;

    #[inline(always)]
    fn on_failure(&mut self, _failure: impl FnOnce() -> ValidationError) {}
}

/// A transient accumulator of diagnostic records, in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    errors: Vec<ValidationError>,
}

impl Validation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn first(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl ValidationTracer for Validation {
    const COLLECTS_ALL: bool = true;

    #[inline]
    fn on_failure(&mut self, failure: impl FnOnce() -> ValidationError) {
        self.errors.push(failure());
    }
}

/// The error raised by `assert`: the first recorded failure, rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeMismatch {
    pub path: String,
    pub expected: String,
    pub key: MessageKey,
}

impl TypeMismatch {
    pub fn from_error(ctx: &TypeContext, error: &ValidationError) -> Self {
        TypeMismatch {
            path: error.path.render(ctx),
            expected: ctx.format_type(error.expected),
            key: error.key,
        }
    }

    /// The message without the path prefix.
    pub fn message(&self) -> String {
        format_message(self.key.template(), &[&self.expected])
    }
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.message())
    }
}

impl std::error::Error for TypeMismatch {}

/// Errors raised when assembling signatures or dispatchers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignatureError {
    /// A candidate handle does not name a function descriptor.
    NotAFunction(TypeId),
    /// The overload set exceeds the dispatcher limit.
    TooManyCandidates { count: usize, limit: usize },
    /// The context already declares the maximum number of generic slots.
    TooManySlots { limit: usize },
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureError::NotAFunction(type_id) => {
                write!(f, "type {} is not a function signature", type_id.0)
            }
            SignatureError::TooManyCandidates { count, limit } => {
                write!(f, "{count} candidate signatures exceed the limit of {limit}")
            }
            SignatureError::TooManySlots { limit } => {
                write!(f, "cannot declare more than {limit} generic slots")
            }
        }
    }
}

impl std::error::Error for SignatureError {}
