//! Common types and utilities for the flowguard runtime type engine.
//!
//! This crate provides foundational types used across all flowguard crates:
//! - String interning (`Atom`, `Interner`)
//! - Validation message keys and their templates
//! - Engine limits and thresholds

// String interning for property names, parameter names and string literals
pub mod interner;
pub use interner::{Atom, Interner};

// Message keys recorded by validation sessions
pub mod diagnostics;
pub use diagnostics::{MessageKey, format_message};

// Centralized limits and thresholds
pub mod limits;
