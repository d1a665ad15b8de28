//! Overload dispatch over an ordered set of candidate signatures.
//!
//! Candidates are ranked once, most specific first, so a broader signature
//! never shadows a narrower one. Ranking is a stable insertion: each
//! candidate, in declaration order, is placed before the first already
//! ranked candidate it is strictly narrower than. Candidates of equal rank
//! keep their declaration order.
//!
//! Every call resets the generic bindings before each candidate is tried.

use crate::intern::TypeContext;
use crate::signature::CallResult;
use crate::types::TypeId;
use crate::validate::Validator;
use crate::validation::{SignatureError, Validation};
use crate::value::Value;
use flowguard_common::limits::MAX_DISPATCH_CANDIDATES;
use tracing::debug;

/// Result of selecting a candidate for one call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Matched {
        /// Index of the candidate in declaration order.
        candidate: usize,
        /// The candidate's return type with this call's bindings applied.
        return_type: TypeId,
    },
    NoMatch,
}

pub struct Dispatcher<'a> {
    validator: Validator<'a>,
    candidates: Vec<TypeId>,
    /// Declaration indices, most specific first.
    ranked: Vec<usize>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(ctx: &'a TypeContext, candidates: Vec<TypeId>) -> Result<Self, SignatureError> {
        if candidates.len() > MAX_DISPATCH_CANDIDATES {
            return Err(SignatureError::TooManyCandidates {
                count: candidates.len(),
                limit: MAX_DISPATCH_CANDIDATES,
            });
        }
        let mut validator = Validator::new(ctx);
        for &candidate in &candidates {
            validator.signature_shape(candidate)?;
        }

        let mut ranked: Vec<usize> = Vec::with_capacity(candidates.len());
        for (index, &candidate) in candidates.iter().enumerate() {
            let position = ranked
                .iter()
                .position(|&other| is_narrower(&mut validator, candidate, candidates[other]))
                .unwrap_or(ranked.len());
            ranked.insert(position, index);
        }
        debug!(?ranked, "ranked dispatch candidates");

        Ok(Dispatcher {
            validator,
            candidates,
            ranked,
        })
    }

    pub fn candidates(&self) -> &[TypeId] {
        &self.candidates
    }

    /// Declaration indices in the order candidates are tried.
    pub fn ranked(&self) -> &[usize] {
        &self.ranked
    }

    pub fn validator(&self) -> &Validator<'a> {
        &self.validator
    }

    /// Select the first candidate, in ranked order, accepting `args`.
    pub fn select(&mut self, args: &[Value]) -> DispatchOutcome {
        for position in 0..self.ranked.len() {
            let index = self.ranked[position];
            let candidate = self.candidates[index];
            self.validator.begin_attempt();
            // Every candidate was checked to be a function in `new`.
            if let Ok(true) = self.validator.accepts_params(candidate, args) {
                let Ok(shape) = self.validator.signature_shape(candidate) else {
                    continue;
                };
                let return_type = self.validator.resolve(shape.return_type);
                debug!(candidate = index, "dispatch matched");
                return DispatchOutcome::Matched {
                    candidate: index,
                    return_type,
                };
            }
            debug!(candidate = index, "dispatch candidate rejected");
        }
        DispatchOutcome::NoMatch
    }

    /// Type-level counterpart of [`select`](Self::select).
    pub fn select_types(&mut self, arg_types: &[TypeId]) -> DispatchOutcome {
        for position in 0..self.ranked.len() {
            let index = self.ranked[position];
            let candidate = self.candidates[index];
            self.validator.begin_attempt();
            if let Ok(CallResult::Success(return_type)) = self.validator.invoke(candidate, arg_types) {
                debug!(candidate = index, "dispatch matched");
                return DispatchOutcome::Matched {
                    candidate: index,
                    return_type,
                };
            }
            debug!(candidate = index, "dispatch candidate rejected");
        }
        DispatchOutcome::NoMatch
    }

    /// Per-candidate diagnostics for `args`, in ranked order.
    pub fn diagnose(&mut self, args: &[Value]) -> Vec<(usize, Validation)> {
        let mut report = Vec::with_capacity(self.ranked.len());
        for position in 0..self.ranked.len() {
            let index = self.ranked[position];
            self.validator.begin_attempt();
            let mut session = Validation::new();
            if self
                .validator
                .collect_params_errors(&mut session, self.candidates[index], args)
                .is_ok()
            {
                report.push((index, session));
            }
        }
        report
    }
}

/// `candidate` is strictly narrower than `other`: it rejects something
/// `other` accepts while `other` does not reject anything it accepts.
fn is_narrower(validator: &mut Validator<'_>, candidate: TypeId, other: TypeId) -> bool {
    validator.begin_attempt();
    let forward = validator.compare(candidate, other);
    validator.begin_attempt();
    let backward = validator.compare(other, candidate);
    forward == -1 && backward != -1
}

#[cfg(test)]
#[path = "../tests/dispatch_tests.rs"]
mod tests;
