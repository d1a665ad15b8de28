//! Generic slot binding.
//!
//! A generic slot is declared once in the context (name and optional bound)
//! and observed many times during one attempt. What an attempt has learned
//! about each slot lives in [`Bindings`], indexed by `SlotId`. Values and
//! types reaching a slot follow one algorithm whichever protocol operation
//! carries them:
//!
//! 1. A slot whose bound is itself a slot delegates to that slot.
//! 2. With a recorded type, the input must satisfy the bound. Read directly
//!    through its `TypeParameter`, the slot then only accepts what the record
//!    accepts. Reached through a `FlowProxy`, an input that does not fit the
//!    record widens it to the union of both.
//! 3. Without a record, a universal bound is satisfied without recording; any
//!    other bound must accept the input.
//! 4. The input's (literal-widened) type is recorded.
//!
//! Records only ever grow within an attempt. `Bindings::reset` starts the
//! next attempt.

use crate::intern::TypeContext;
use crate::path::IdentifierPath;
use crate::types::{SlotId, TypeData, TypeId};
use crate::validate::Validator;
use crate::validation::{FastTracer, ValidationTracer};
use crate::value::Value;
use fixedbitset::FixedBitSet;
use flowguard_common::limits::MAX_WIDENED_UNION_MEMBERS;
use tracing::trace;

/// Identifies one matching attempt.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(pub u32);

/// Per-attempt recorded types, one entry per declared slot.
#[derive(Clone, Debug)]
pub struct Bindings {
    attempt: AttemptId,
    recorded: Vec<Option<TypeId>>,
}

impl Default for Bindings {
    fn default() -> Self {
        Self::new()
    }
}

impl Bindings {
    pub fn new() -> Self {
        Bindings {
            attempt: AttemptId(0),
            recorded: Vec::new(),
        }
    }

    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// Clear every record and advance to the next attempt.
    pub fn reset(&mut self) {
        self.recorded.clear();
        self.attempt = AttemptId(self.attempt.0.wrapping_add(1));
    }

    pub fn recorded(&self, slot: SlotId) -> Option<TypeId> {
        self.recorded.get(slot.index()).copied().flatten()
    }

    pub fn record(&mut self, slot: SlotId, type_id: TypeId) {
        let index = slot.index();
        if index >= self.recorded.len() {
            self.recorded.resize(index + 1, None);
        }
        self.recorded[index] = Some(type_id);
    }

    /// Number of slots with a record in this attempt.
    pub fn recorded_count(&self) -> usize {
        self.recorded.iter().filter(|r| r.is_some()).count()
    }
}

/// How a slot is reached.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum SlotUse {
    /// Through its `TypeParameter`: a record is a constraint.
    Direct,
    /// Through a `FlowProxy`: a record widens to admit the input.
    Flow,
}

impl SlotUse {
    pub(crate) fn of(data: &TypeData) -> Option<(SlotId, SlotUse)> {
        match *data {
            TypeData::TypeParameter(slot) => Some((slot, SlotUse::Direct)),
            TypeData::FlowProxy(slot) => Some((slot, SlotUse::Flow)),
            _ => None,
        }
    }
}

/// A slot after following its chain of slot-valued bounds.
#[derive(Copy, Clone, Debug)]
pub(crate) struct SlotState {
    pub slot: SlotId,
    pub bound: Option<TypeId>,
    pub recorded: Option<TypeId>,
}

impl<'a> Validator<'a> {
    /// Follow slot-valued bounds to the slot that owns the state.
    ///
    /// A chain that loops back on itself stops at the last unvisited slot,
    /// which is then treated as unbounded.
    pub(crate) fn slot_state(&self, slot: SlotId) -> SlotState {
        let ctx = self.ctx;
        let mut visited = FixedBitSet::with_capacity(ctx.slot_count());
        let mut current = slot;
        loop {
            visited.insert(current.index());
            let bound = ctx.slot_info(current).and_then(|info| info.bound);
            let next = bound.and_then(|b| ctx.lookup(b)).and_then(|data| data.slot());
            match next {
                Some(next) if !visited.contains(next.index()) => current = next,
                Some(_) => {
                    trace!(slot = slot.0, "slot chain cycles, treating as unbounded");
                    return SlotState {
                        slot: current,
                        bound: None,
                        recorded: self.bindings.recorded(current),
                    };
                }
                None => {
                    return SlotState {
                        slot: current,
                        bound,
                        recorded: self.bindings.recorded(current),
                    };
                }
            }
        }
    }

    /// Value mode of the binder algorithm.
    pub(crate) fn check_slot<T: ValidationTracer>(
        &mut self,
        tracer: &mut T,
        path: &mut IdentifierPath,
        slot: SlotId,
        usage: SlotUse,
        value: &Value,
    ) -> bool {
        let state = self.slot_state(slot);
        let observed = self.ctx.widen_literal(self.ctx.type_of(value));

        match (state.recorded, state.bound) {
            (Some(recorded), bound) => {
                if let Some(bound) = bound.filter(|b| !b.is_universal())
                    && !self.check(tracer, path, bound, value)
                {
                    return false;
                }
                match usage {
                    SlotUse::Direct => self.check(tracer, path, recorded, value),
                    SlotUse::Flow => {
                        if !self.check(&mut FastTracer, path, recorded, value) {
                            self.widen(state.slot, recorded, observed);
                        }
                        true
                    }
                }
            }
            (None, Some(bound)) if bound.is_universal() => true,
            (None, bound) => {
                if let Some(bound) = bound
                    && !self.check(tracer, path, bound, value)
                {
                    return false;
                }
                trace!(slot = state.slot.0, type_id = observed.0, "recording slot");
                self.bindings.record(state.slot, observed);
                true
            }
        }
    }

    /// Type mode of the binder algorithm: `slot` compared against `input`.
    pub(crate) fn compare_slot(&mut self, slot: SlotId, usage: SlotUse, input: TypeId) -> i8 {
        let state = self.slot_state(slot);
        let observed = self.ctx.widen_literal(input);

        match (state.recorded, state.bound) {
            (Some(recorded), bound) => {
                if let Some(bound) = bound.filter(|b| !b.is_universal())
                    && self.compare(bound, input) == -1
                {
                    return -1;
                }
                let result = self.compare(recorded, input);
                if result >= 0 || usage == SlotUse::Direct {
                    return result;
                }
                self.widen(state.slot, recorded, observed);
                1
            }
            (None, Some(bound)) if bound.is_universal() => 1,
            (None, bound) => {
                if let Some(bound) = bound
                    && self.compare(bound, input) == -1
                {
                    return -1;
                }
                trace!(slot = state.slot.0, type_id = observed.0, "recording slot");
                self.bindings.record(state.slot, observed);
                0
            }
        }
    }

    /// What a slot currently stands for when it appears as the other operand
    /// of a comparison: its record, else its bound, else `mixed`.
    pub(crate) fn slot_operand(&self, slot: SlotId) -> TypeId {
        let state = self.slot_state(slot);
        state.recorded.or(state.bound).unwrap_or(TypeId::MIXED)
    }

    fn widen(&mut self, slot: SlotId, recorded: TypeId, observed: TypeId) {
        let widened = widened_union(self.ctx, recorded, observed);
        trace!(
            slot = slot.0,
            from = recorded.0,
            to = widened.0,
            "widening slot"
        );
        self.bindings.record(slot, widened);
    }
}

fn widened_union(ctx: &TypeContext, recorded: TypeId, observed: TypeId) -> TypeId {
    let union = ctx.union2(recorded, observed);
    match ctx.lookup(union) {
        Some(TypeData::Union(list)) if ctx.type_list(list).len() > MAX_WIDENED_UNION_MEMBERS => {
            TypeId::MIXED
        }
        _ => union,
    }
}

#[cfg(test)]
#[path = "../tests/binder_tests.rs"]
mod tests;
