//! flowguard: runtime structural type validation and overload dispatch.
//!
//! The engine lives in `flowguard-solver`; this crate adds the binary's
//! document loader, report rendering and tracing setup.

pub use flowguard_common as common;
pub use flowguard_solver as solver;

pub use flowguard_solver::{
    DispatchOutcome, Dispatcher, IdentifierPath, TypeContext, TypeId, TypeMismatch, Validation,
    Validator, Value,
};

pub mod cli;
pub mod tracing_config;

#[cfg(test)]
#[path = "tests/tracing_config_tests.rs"]
mod tracing_config_tests;
