//! Value validation.
//!
//! `Validator` borrows a `TypeContext` and owns the per-attempt state: the
//! generic slot bindings and the recursion guards. The same walk serves the
//! silent `accepts` check and diagnostic collection through the
//! [`ValidationTracer`] it is given.

use crate::binder::{Bindings, SlotUse};
use crate::intern::TypeContext;
use crate::path::{IdentifierPath, PathSegment};
use crate::recursion::{DepthCounter, RecursionGuard, RecursionProfile};
use crate::types::*;
use crate::validation::{FastTracer, TypeMismatch, Validation, ValidationError, ValidationTracer};
use crate::value::Value;
use flowguard_common::diagnostics::MessageKey;
use std::sync::Arc;

pub struct Validator<'a> {
    pub(crate) ctx: &'a TypeContext,
    pub(crate) bindings: Bindings,
    pub(crate) compare_guard: RecursionGuard<(TypeId, TypeId)>,
    pub(crate) depth: DepthCounter,
}

impl<'a> Validator<'a> {
    pub fn new(ctx: &'a TypeContext) -> Self {
        Validator {
            ctx,
            bindings: Bindings::new(),
            compare_guard: RecursionGuard::with_profile(RecursionProfile::Comparison),
            depth: DepthCounter::with_profile(RecursionProfile::Validation),
        }
    }

    pub fn context(&self) -> &'a TypeContext {
        self.ctx
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Clear every binding and guard before a new validation or dispatch
    /// attempt.
    pub fn begin_attempt(&mut self) {
        self.bindings.reset();
        self.compare_guard.reset();
        self.depth.reset();
    }

    /// The type recorded for the slot named by `type_parameter` in the
    /// current attempt.
    pub fn recorded(&self, type_parameter: TypeId) -> Option<TypeId> {
        let slot = self.ctx.lookup(type_parameter)?.slot()?;
        self.slot_state(slot).recorded
    }

    /// Silent contract check.
    pub fn accepts(&mut self, type_id: TypeId, value: &Value) -> bool {
        let mut path = IdentifierPath::new();
        self.check(&mut FastTracer, &mut path, type_id, value)
    }

    /// Check `value` and append a record to `session` for every violation
    /// found below `path`.
    ///
    /// Returns `true` when at least one record was appended.
    pub fn collect_errors(
        &mut self,
        session: &mut Validation,
        path: &IdentifierPath,
        type_id: TypeId,
        value: &Value,
    ) -> bool {
        let before = session.len();
        let mut path = path.clone();
        let ok = self.check(session, &mut path, type_id, value);
        debug_assert!(ok || session.len() > before);
        session.len() > before
    }

    /// Return `value` unchanged if it satisfies `type_id`, otherwise the
    /// first recorded failure. The path root is `value`.
    pub fn assert(&mut self, type_id: TypeId, value: Value) -> Result<Value, TypeMismatch> {
        let root = IdentifierPath::root(self.ctx.intern_string("value"));
        self.assert_at(&root, type_id, value)
    }

    pub fn assert_at(
        &mut self,
        path: &IdentifierPath,
        type_id: TypeId,
        value: Value,
    ) -> Result<Value, TypeMismatch> {
        let mut session = Validation::new();
        if self.collect_errors(&mut session, path, type_id, &value) {
            if let Some(first) = session.first() {
                return Err(TypeMismatch::from_error(self.ctx, first));
            }
        }
        Ok(value)
    }

    // =========================================================================
    // The validation walk
    // =========================================================================

    pub(crate) fn check<T: ValidationTracer>(
        &mut self,
        tracer: &mut T,
        path: &mut IdentifierPath,
        type_id: TypeId,
        value: &Value,
    ) -> bool {
        if !self.depth.enter() {
            // Nested too deep to inspect.
            return self.fail(tracer, path, type_id, MessageKey::ExpectEmpty);
        }
        let ok = self.check_inner(tracer, path, type_id, value);
        self.depth.leave();
        ok
    }

    fn check_inner<T: ValidationTracer>(
        &mut self,
        tracer: &mut T,
        path: &mut IdentifierPath,
        type_id: TypeId,
        value: &Value,
    ) -> bool {
        let Some(data) = self.ctx.lookup(type_id) else {
            unreachable!("type {} was not interned by this context", type_id.0);
        };

        match data {
            TypeData::Intrinsic(kind) => self.check_intrinsic(tracer, path, type_id, kind, value),
            TypeData::Literal(literal) => {
                let ok = match (literal, value) {
                    (LiteralValue::Boolean(expected), Value::Boolean(actual)) => expected == *actual,
                    (LiteralValue::Number(expected), Value::Number(actual)) => {
                        expected.0 == *actual
                    }
                    (LiteralValue::String(expected), Value::String(actual)) => {
                        *self.ctx.resolve_atom(expected) == **actual
                    }
                    (LiteralValue::Symbol(expected), Value::Symbol(actual)) => expected == *actual,
                    _ => false,
                };
                ok || self.fail(tracer, path, type_id, MessageKey::ExpectExactValue)
            }
            TypeData::Array(element) => {
                let Value::Array(items) = value else {
                    return self.fail(tracer, path, type_id, MessageKey::ExpectArray);
                };
                self.check_elements(tracer, path, items, |_| element)
            }
            TypeData::Tuple(list) => {
                let elements = self.ctx.type_list(list);
                let Value::Array(items) = value else {
                    return self.fail(tracer, path, type_id, MessageKey::ExpectTuple);
                };
                if items.len() != elements.len() {
                    return self.fail(tracer, path, type_id, MessageKey::ExpectTuple);
                }
                self.check_elements(tracer, path, items, |index| elements[index])
            }
            TypeData::Object(shape_id) => self.check_object(tracer, path, type_id, shape_id, value),
            TypeData::Class(class) => {
                let ok = matches!(
                    value,
                    Value::Object(object)
                        if object.class.is_some_and(|c| self.ctx.is_subclass_of(c, class))
                );
                ok || self.fail(tracer, path, type_id, MessageKey::ExpectInstanceOf)
            }
            TypeData::Nullable(inner) => value.is_missing() || self.check(tracer, path, inner, value),
            TypeData::Union(list) => {
                let members = self.ctx.type_list(list);
                for &member in members.iter() {
                    if self.check(&mut FastTracer, path, member, value) {
                        return true;
                    }
                }
                self.fail(tracer, path, type_id, MessageKey::NoUnionMatch)
            }
            TypeData::Intersection(list) => {
                let members = self.ctx.type_list(list);
                let mut ok = true;
                for &member in members.iter() {
                    if !self.check(tracer, path, member, value) {
                        ok = false;
                        if !T::COLLECTS_ALL {
                            break;
                        }
                    }
                }
                ok
            }
            TypeData::Function(shape_id) => {
                let Value::Function(function) = value else {
                    return self.fail(tracer, path, type_id, MessageKey::ExpectFunction);
                };
                match function.signature {
                    Some(signature) => {
                        self.accepts_type(type_id, signature)
                            || self.fail(tracer, path, type_id, MessageKey::IncompatibleSignature)
                    }
                    None => {
                        self.propagate_universal(shape_id);
                        true
                    }
                }
            }
            TypeData::This(capture) => {
                let ok = match (capture, value) {
                    (ThisCapture::Unset, _) => true,
                    (ThisCapture::Instance(id), Value::Object(object)) => object.id == id,
                    (ThisCapture::Class(class), Value::Class(actual)) => class == *actual,
                    (ThisCapture::Class(class), Value::Object(object)) => object
                        .class
                        .is_some_and(|c| self.ctx.is_subclass_of(c, class)),
                    _ => false,
                };
                ok || self.fail(tracer, path, type_id, MessageKey::ExpectThis)
            }
            TypeData::TypeParameter(slot) => {
                self.check_slot(tracer, path, slot, SlotUse::Direct, value)
            }
            TypeData::FlowProxy(slot) => self.check_slot(tracer, path, slot, SlotUse::Flow, value),
        }
    }

    fn check_intrinsic<T: ValidationTracer>(
        &mut self,
        tracer: &mut T,
        path: &mut IdentifierPath,
        type_id: TypeId,
        kind: IntrinsicKind,
        value: &Value,
    ) -> bool {
        let (ok, key) = match kind {
            IntrinsicKind::Any | IntrinsicKind::Mixed => return true,
            IntrinsicKind::Empty => (false, MessageKey::ExpectEmpty),
            IntrinsicKind::Void => (matches!(value, Value::Undefined), MessageKey::ExpectVoid),
            IntrinsicKind::Null => (matches!(value, Value::Null), MessageKey::ExpectNull),
            IntrinsicKind::Boolean => (matches!(value, Value::Boolean(_)), MessageKey::ExpectBoolean),
            IntrinsicKind::Number => (matches!(value, Value::Number(_)), MessageKey::ExpectNumber),
            IntrinsicKind::String => (matches!(value, Value::String(_)), MessageKey::ExpectString),
            IntrinsicKind::Symbol => (matches!(value, Value::Symbol(_)), MessageKey::ExpectSymbol),
            IntrinsicKind::Function => {
                (matches!(value, Value::Function(_)), MessageKey::ExpectFunction)
            }
        };
        ok || self.fail(tracer, path, type_id, key)
    }

    fn check_elements<T: ValidationTracer>(
        &mut self,
        tracer: &mut T,
        path: &mut IdentifierPath,
        items: &Arc<[Value]>,
        element_type: impl Fn(usize) -> TypeId,
    ) -> bool {
        let mut ok = true;
        for (index, item) in items.iter().enumerate() {
            path.push(PathSegment::Index(index));
            let item_ok = self.check(tracer, path, element_type(index), item);
            path.pop();
            if !item_ok {
                ok = false;
                if !T::COLLECTS_ALL {
                    break;
                }
            }
        }
        ok
    }

    fn check_object<T: ValidationTracer>(
        &mut self,
        tracer: &mut T,
        path: &mut IdentifierPath,
        type_id: TypeId,
        shape_id: ObjectShapeId,
        value: &Value,
    ) -> bool {
        let Value::Object(object) = value else {
            return self.fail(tracer, path, type_id, MessageKey::ExpectObject);
        };
        let shape = self.ctx.object_shape(shape_id);
        let mut ok = true;

        for prop in &shape.properties {
            path.push(PathSegment::Property(prop.name));
            let prop_ok = match object.get(prop.name) {
                Some(Value::Undefined) | None if prop.optional => true,
                Some(actual) => self.check(tracer, path, prop.type_id, actual),
                None => {
                    self.check(&mut FastTracer, path, prop.type_id, &Value::Undefined)
                        || self.fail(tracer, path, prop.type_id, MessageKey::MissingProperty)
                }
            };
            path.pop();
            if !prop_ok {
                ok = false;
                if !T::COLLECTS_ALL {
                    return false;
                }
            }
        }

        if shape.exact {
            for name in object.properties.keys() {
                if shape.property(*name).is_some() {
                    continue;
                }
                path.push(PathSegment::Property(*name));
                self.fail(tracer, path, type_id, MessageKey::UnknownProperty);
                path.pop();
                ok = false;
                if !T::COLLECTS_ALL {
                    return false;
                }
            }
        }

        ok
    }

    /// Report a failure. Always returns `false` so arms can end with
    /// `ok || self.fail(...)`.
    fn fail<T: ValidationTracer>(
        &self,
        tracer: &mut T,
        path: &IdentifierPath,
        expected: TypeId,
        key: MessageKey,
    ) -> bool {
        tracer.on_failure(|| ValidationError {
            path: path.clone(),
            expected,
            key,
        });
        false
    }

    /// An unannotated function accepts anything and returns anything: flow the
    /// universal type into every generic slot reachable from its parameters,
    /// its rest and its return type.
    fn propagate_universal(&mut self, shape_id: FunctionShapeId) {
        let shape = self.ctx.function_shape(shape_id);
        let mut guard = RecursionGuard::with_profile(RecursionProfile::Resolution);
        for param in &shape.params {
            self.flow_universal(&mut guard, param.type_id);
        }
        if let Some(rest) = &shape.rest {
            self.flow_universal(&mut guard, rest.type_id);
        }
        self.flow_universal(&mut guard, shape.return_type);
    }

    fn flow_universal(&mut self, guard: &mut RecursionGuard<TypeId>, type_id: TypeId) {
        if type_id.is_intrinsic() || !guard.enter(type_id).is_entered() {
            return;
        }
        let ctx = self.ctx;
        match ctx.lookup(type_id) {
            Some(TypeData::TypeParameter(slot) | TypeData::FlowProxy(slot)) => {
                self.compare_slot(slot, SlotUse::Flow, TypeId::ANY);
            }
            Some(TypeData::Array(inner) | TypeData::Nullable(inner)) => {
                self.flow_universal(guard, inner);
            }
            Some(
                TypeData::Tuple(list) | TypeData::Union(list) | TypeData::Intersection(list),
            ) => {
                for &member in ctx.type_list(list).iter() {
                    self.flow_universal(guard, member);
                }
            }
            Some(TypeData::Object(shape_id)) => {
                for prop in &ctx.object_shape(shape_id).properties {
                    self.flow_universal(guard, prop.type_id);
                }
            }
            Some(TypeData::Function(shape_id)) => {
                let shape = ctx.function_shape(shape_id);
                for param in &shape.params {
                    self.flow_universal(guard, param.type_id);
                }
                if let Some(rest) = &shape.rest {
                    self.flow_universal(guard, rest.type_id);
                }
                self.flow_universal(guard, shape.return_type);
            }
            _ => {}
        }
        guard.leave(type_id);
    }
}

#[cfg(test)]
#[path = "../tests/validate_tests.rs"]
mod tests;
