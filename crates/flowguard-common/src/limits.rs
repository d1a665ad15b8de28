//! Centralized limits and thresholds for the runtime type engine.
//!
//! Recursion limits for descriptor traversal (comparison, validation,
//! substitution) live in `flowguard_solver::recursion::RecursionProfile`.
//! This module holds the remaining caps shared by the solver and the CLI.

/// Maximum number of candidate signatures a single dispatcher may rank.
///
/// Ranking is quadratic in the number of candidates; an overload set larger
/// than this is almost certainly generated by mistake.
pub const MAX_DISPATCH_CANDIDATES: usize = 256;

/// Maximum number of generic slots a context may declare.
///
/// Slot ids index directly into per-attempt binding tables, so the cap bounds
/// the size of every `Bindings` allocation.
pub const MAX_BINDER_SLOTS: usize = 1 << 16;

/// Maximum number of union members produced by generic widening before the
/// binder gives up and records the universal type instead.
pub const MAX_WIDENED_UNION_MEMBERS: usize = 64;
