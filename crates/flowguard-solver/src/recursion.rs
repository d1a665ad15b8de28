//! Guards for the engine's recursive walks.
//!
//! Descriptor trees are acyclic, but slots chain into each other and
//! recorded types are substituted back into trees, so comparison and
//! resolution run under a keyed [`RecursionGuard`] that also spots cycles.
//! Validation and formatting only need a [`DepthCounter`]: the same
//! descriptor is legitimately visited many times while walking one value.

use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Depth and step budget of one walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecursionLimits {
    pub max_depth: u32,
    pub max_iterations: u32,
}

/// Named budgets, one per kind of walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// `compare`, keyed by the `(a, b)` pair.
    Comparison,
    /// Values against descriptors; depth only.
    Validation,
    /// Substituting recorded bindings, keyed by descriptor.
    Resolution,
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn limits(self) -> RecursionLimits {
        let (max_depth, max_iterations) = match self {
            Self::Comparison => (100, 100_000),
            Self::Validation => (50, u32::MAX),
            Self::Resolution => (50, 100_000),
            Self::Custom {
                max_depth,
                max_iterations,
            } => (max_depth, max_iterations),
        };
        RecursionLimits {
            max_depth,
            max_iterations,
        }
    }

    pub const fn max_depth(self) -> u32 {
        self.limits().max_depth
    }

    pub const fn max_iterations(self) -> u32 {
        self.limits().max_iterations
    }
}

/// Outcome of [`RecursionGuard::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already on the stack.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        self == Self::Entered
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        self == Self::Cycle
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

/// Keyed stack of in-progress computations.
///
/// Every `Entered` must be matched by a `leave` of the same key. Debug
/// builds panic if a guard is dropped with keys still on the stack.
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    stack: FxHashSet<K>,
    depth: u32,
    steps: u32,
    limits: RecursionLimits,
    exceeded: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self::with_limits(RecursionLimits {
            max_depth,
            max_iterations,
        })
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::with_limits(profile.limits())
    }

    fn with_limits(limits: RecursionLimits) -> Self {
        RecursionGuard {
            stack: FxHashSet::default(),
            depth: 0,
            steps: 0,
            limits,
            exceeded: false,
        }
    }

    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.steps = self.steps.saturating_add(1);
        let result = if self.steps > self.limits.max_iterations {
            RecursionResult::IterationExceeded
        } else if self.depth >= self.limits.max_depth {
            RecursionResult::DepthExceeded
        } else if !self.stack.insert(key) {
            RecursionResult::Cycle
        } else {
            self.depth += 1;
            RecursionResult::Entered
        };
        self.exceeded |= result.is_exceeded();
        result
    }

    pub fn leave(&mut self, key: K) {
        let removed = self.stack.remove(&key);
        debug_assert!(removed, "left a key that was never entered");
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.stack.contains(key)
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn iterations(&self) -> u32 {
        self.steps
    }

    /// Whether any limit was hit since the last reset.
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    /// Start a fresh walk with the same limits.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.depth = 0;
        self.steps = 0;
        self.exceeded = false;
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.stack.is_empty() {
            panic!("recursion guard dropped with {} unbalanced entries", self.stack.len());
        }
    }
}

/// Depth-only guard.
#[derive(Debug)]
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        DepthCounter {
            depth: 0,
            max_depth,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth())
    }

    /// `false` at the limit; otherwise the caller must `leave`.
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "left a depth counter at depth 0");
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    pub fn reset(&mut self) {
        self.depth = 0;
        self.exceeded = false;
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod tests;
