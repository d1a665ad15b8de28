//! Three-way specificity comparison of descriptors.
//!
//! `compare(a, b)` answers how the values accepted by `a` relate to those
//! accepted by `b`:
//!
//! - `-1`: `a` rejects some value `b` accepts
//! - `0`: interchangeable for dispatch
//! - `1`: `a` accepts a strict superset of `b`
//!
//! The same ordering serves subtyping (`accepts_type` is `compare != -1`) and
//! overload ranking. Generic slots on the left bind the right operand the
//! same way values bind them during validation.

use crate::binder::SlotUse;
use crate::recursion::RecursionResult;
use crate::types::*;
use crate::validate::Validator;
use std::sync::Arc;
use tracing::trace;

/// Combine per-part results: any `-1` wins, then any `1`, else `0`.
fn combine(results: impl IntoIterator<Item = i8>) -> i8 {
    let mut broader = false;
    for result in results {
        match result {
            -1 => return -1,
            1 => broader = true,
            _ => {}
        }
    }
    i8::from(broader)
}

impl<'a> Validator<'a> {
    /// Three-way comparison of `a` against `b`.
    ///
    /// Revisiting a pair already under comparison counts as interchangeable;
    /// exceeding the comparison depth counts as a rejection.
    pub fn compare(&mut self, a: TypeId, b: TypeId) -> i8 {
        if a == b {
            return 0;
        }
        if self.compare_guard.depth() == 0 {
            self.compare_guard.reset();
        }
        let key = (a, b);
        match self.compare_guard.enter(key) {
            RecursionResult::Entered => {
                let result = self.compare_inner(a, b);
                self.compare_guard.leave(key);
                trace!(a = a.0, b = b.0, result, "compare");
                result
            }
            RecursionResult::Cycle => 0,
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => -1,
        }
    }

    /// Whether `a` accepts the values of `b`: false only when `compare` is
    /// `-1`.
    pub fn accepts_type(&mut self, a: TypeId, b: TypeId) -> bool {
        self.compare(a, b) != -1
    }

    fn data(&self, type_id: TypeId) -> TypeData {
        match self.ctx.lookup(type_id) {
            Some(data) => data,
            None => unreachable!("type {} was not interned by this context", type_id.0),
        }
    }

    fn compare_inner(&mut self, a: TypeId, b: TypeId) -> i8 {
        let a_data = self.data(a);
        if let Some((slot, usage)) = SlotUse::of(&a_data) {
            let b = match self.data(b).slot() {
                Some(b_slot) => self.slot_operand(b_slot),
                None => b,
            };
            return self.compare_slot(slot, usage, b);
        }

        let b_data = self.data(b);
        if let Some(b_slot) = b_data.slot() {
            let b = self.slot_operand(b_slot);
            return self.compare(a, b);
        }

        if a.is_universal() {
            return if b.is_universal() { 0 } else { 1 };
        }
        if b.is_universal() {
            return -1;
        }
        if b == TypeId::EMPTY {
            return 1;
        }

        match (&a_data, &b_data) {
            (TypeData::Union(a_list), TypeData::Union(b_list)) => {
                let (a_members, b_members) = (self.ctx.type_list(*a_list), self.ctx.type_list(*b_list));
                self.compare_union_union(&a_members, &b_members)
            }
            // `?T` is compared as `void | null | T` against a union.
            (TypeData::Union(_), TypeData::Nullable(inner)) => {
                let expanded = self.expand_nullable(*inner);
                self.compare(a, expanded)
            }
            (TypeData::Nullable(inner), TypeData::Union(_)) => {
                let expanded = self.expand_nullable(*inner);
                self.compare(expanded, b)
            }
            (TypeData::Union(_), TypeData::Intersection(list)) => self.compare_to_intersection(a, *list),
            (TypeData::Union(a_list), _) => {
                let members = self.ctx.type_list(*a_list);
                for &member in members.iter() {
                    if self.compare(member, b) >= 0 {
                        return 1;
                    }
                }
                -1
            }
            (_, TypeData::Union(b_list)) => {
                let members = self.ctx.type_list(*b_list);
                let results: Vec<i8> = members.iter().map(|&m| self.compare(a, m)).collect();
                combine(results)
            }
            (TypeData::Nullable(inner), TypeData::Nullable(other)) => self.compare(*inner, *other),
            (TypeData::Nullable(_), _) if b == TypeId::VOID || b == TypeId::NULL => 1,
            (TypeData::Nullable(inner), _) => match self.compare(*inner, b) {
                -1 => -1,
                _ => 1,
            },
            (_, TypeData::Nullable(inner)) => {
                let expanded = self.expand_nullable(*inner);
                self.compare(a, expanded)
            }
            (TypeData::Intersection(list), _) => {
                let members = self.ctx.type_list(*list);
                let results: Vec<i8> = members.iter().map(|&m| self.compare(m, b)).collect();
                if results.contains(&-1) {
                    -1
                } else if results.contains(&0) {
                    0
                } else {
                    1
                }
            }
            (_, TypeData::Intersection(list)) => self.compare_to_intersection(a, *list),
            _ => self.compare_leaves(a, &a_data, b, &b_data),
        }
    }

    fn expand_nullable(&self, inner: TypeId) -> TypeId {
        self.ctx.union(vec![TypeId::VOID, TypeId::NULL, inner])
    }

    /// An intersection's values lie inside each member, so covering any one
    /// member is enough.
    fn compare_to_intersection(&mut self, a: TypeId, list: TypeListId) -> i8 {
        let members = self.ctx.type_list(list);
        let mut best = -1;
        for &member in members.iter() {
            best = best.max(self.compare(a, member));
        }
        best
    }

    /// Union against union: every member of `b` must be covered by some
    /// member of `a`; the result is `0` only when `b` covers `a` back.
    fn compare_union_union(&mut self, a_members: &Arc<[TypeId]>, b_members: &Arc<[TypeId]>) -> i8 {
        for &b_member in b_members.iter() {
            let covered = a_members.iter().any(|&a_member| self.compare(a_member, b_member) >= 0);
            if !covered {
                return -1;
            }
        }
        let covered_back = a_members
            .iter()
            .all(|&a_member| b_members.iter().any(|&b_member| self.compare(b_member, a_member) >= 0));
        if covered_back { 0 } else { 1 }
    }

    fn compare_leaves(&mut self, a: TypeId, a_data: &TypeData, b: TypeId, b_data: &TypeData) -> i8 {
        match (a_data, b_data) {
            (TypeData::Intrinsic(IntrinsicKind::Function), TypeData::Function(_)) => 1,
            (TypeData::Intrinsic(_), TypeData::Literal(literal)) => {
                if literal.primitive() == a {
                    1
                } else {
                    -1
                }
            }
            (TypeData::Intrinsic(_), _) => -1,
            (TypeData::Literal(_), _) => -1,

            (TypeData::Array(x), TypeData::Array(y)) => self.compare(*x, *y),
            (TypeData::Array(x), TypeData::Tuple(list)) => {
                let elements = self.ctx.type_list(*list);
                for &element in elements.iter() {
                    if self.compare(*x, element) == -1 {
                        return -1;
                    }
                }
                1
            }
            (TypeData::Array(_), _) => -1,

            (TypeData::Tuple(xs), TypeData::Tuple(ys)) => {
                let (xs, ys) = (self.ctx.type_list(*xs), self.ctx.type_list(*ys));
                if xs.len() != ys.len() {
                    return -1;
                }
                let results: Vec<i8> = xs.iter().zip(ys.iter()).map(|(&x, &y)| self.compare(x, y)).collect();
                combine(results)
            }
            (TypeData::Tuple(_), _) => -1,

            (TypeData::Object(x), TypeData::Object(y)) => self.compare_objects(*x, *y),
            (TypeData::Object(shape), TypeData::Class(_)) => {
                // Instance properties are unknown at this level; only an empty
                // shape is sure to accept them.
                let shape = self.ctx.object_shape(*shape);
                if shape.properties.is_empty() && !shape.exact {
                    1
                } else {
                    -1
                }
            }
            (TypeData::Object(_), _) => -1,

            (TypeData::Class(x), TypeData::Class(y)) => {
                if self.ctx.is_subclass_of(*y, *x) {
                    1
                } else {
                    -1
                }
            }
            (TypeData::Class(_), _) => -1,

            (TypeData::This(ThisCapture::Unset), _) => 1,
            (TypeData::This(ThisCapture::Class(class)), TypeData::Class(other)) => {
                if self.ctx.is_subclass_of(*other, *class) {
                    1
                } else {
                    -1
                }
            }
            // Distinct captures never share values.
            (TypeData::This(_), _) => -1,

            (TypeData::Function(x), TypeData::Function(y)) => self.compare_functions(*x, *y),
            (TypeData::Function(_), _) => -1,

            (TypeData::Nullable(_), _)
            | (TypeData::Union(_), _)
            | (TypeData::Intersection(_), _)
            | (TypeData::TypeParameter(_), _)
            | (TypeData::FlowProxy(_), _) => {
                unreachable!("composite descriptors are compared before leaves")
            }
        }
    }

    /// Width subtyping: fewer or optional properties accept more values.
    fn compare_objects(&mut self, a: ObjectShapeId, b: ObjectShapeId) -> i8 {
        let (a_shape, b_shape) = (self.ctx.object_shape(a), self.ctx.object_shape(b));
        let mut broader = false;

        for prop in &a_shape.properties {
            match b_shape.property(prop.name) {
                None if prop.optional => broader = true,
                None => return -1,
                Some(other) => {
                    if !prop.optional && other.optional {
                        return -1;
                    }
                    if prop.optional && !other.optional {
                        broader = true;
                    }
                    match self.compare(prop.type_id, other.type_id) {
                        -1 => return -1,
                        1 => broader = true,
                        _ => {}
                    }
                }
            }
        }

        let b_has_extra = b_shape
            .properties
            .iter()
            .any(|other| a_shape.property(other.name).is_none());
        if b_has_extra {
            if a_shape.exact {
                return -1;
            }
            broader = true;
        }
        if a_shape.exact && !b_shape.exact {
            return -1;
        }
        if !a_shape.exact && b_shape.exact {
            broader = true;
        }

        i8::from(broader)
    }

    /// `a` is the reference signature, `b` the candidate.
    ///
    /// Return types are compared first and a `-1` there is fatal. Parameters
    /// are then compared positionally; the candidate must declare at least as
    /// many as the reference, counting its rest for the excess.
    fn compare_functions(&mut self, a: FunctionShapeId, b: FunctionShapeId) -> i8 {
        let (a_shape, b_shape) = (self.ctx.function_shape(a), self.ctx.function_shape(b));

        let return_result = self.compare(a_shape.return_type, b_shape.return_type);
        if return_result == -1 {
            return -1;
        }
        let mut broader = return_result == 1;

        for (index, param) in a_shape.params.iter().enumerate() {
            let candidate = match b_shape.params.get(index) {
                Some(other) => other.type_id,
                None => match &b_shape.rest {
                    Some(rest) => self.rest_element_type(rest.type_id),
                    None if param.optional => {
                        broader = true;
                        continue;
                    }
                    None => return -1,
                },
            };
            match self.compare(param.type_id, candidate) {
                -1 => return -1,
                1 => broader = true,
                _ => {}
            }
        }

        match (&a_shape.rest, &b_shape.rest) {
            (Some(_), None) => return -1,
            (Some(x), Some(y)) => match self.compare(x.type_id, y.type_id) {
                -1 => return -1,
                1 => broader = true,
                _ => {}
            },
            _ => {}
        }

        i8::from(broader)
    }

    /// The type each excess argument is checked against: the element of an
    /// array rest, otherwise the rest type itself.
    pub(crate) fn rest_element_type(&self, rest_type: TypeId) -> TypeId {
        match self.ctx.lookup(rest_type) {
            Some(TypeData::Array(element)) => element,
            _ => rest_type,
        }
    }
}

#[cfg(test)]
#[path = "../tests/compare_tests.rs"]
mod tests;
