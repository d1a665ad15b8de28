//! Function-signature matching: concrete arguments, type-level invocation and
//! resolution of recorded generic bindings.
//!
//! Arguments are matched positionally. A parameter without an argument is
//! checked against the absent value, so only optional parameters and
//! descriptors that accept absence (nullable, void, universal) may be
//! omitted. Arguments beyond the declared parameters go to the rest
//! parameter, or are rejected when there is none.

use crate::path::{IdentifierPath, PathSegment};
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::*;
use crate::validate::Validator;
use crate::validation::{
    FastTracer, SignatureError, TypeMismatch, Validation, ValidationError, ValidationTracer,
};
use crate::value::Value;
use flowguard_common::diagnostics::MessageKey;
use flowguard_common::interner::Atom;
use std::sync::Arc;
use tracing::trace;

/// Result of a type-level call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallResult {
    /// Arguments match; carries the return type with bindings applied.
    Success(TypeId),

    /// Too many arguments, or a required parameter left without one.
    ArgumentCountMismatch {
        expected_min: usize,
        expected_max: Option<usize>,
        actual: usize,
    },

    /// An argument's type is not accepted by its parameter.
    ArgumentTypeMismatch {
        index: usize,
        expected: TypeId,
        actual: TypeId,
    },
}

impl CallResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CallResult::Success(_))
    }
}

/// Minimum and maximum argument counts accepted by a signature. The maximum
/// is `None` with a rest parameter.
pub fn arg_count_bounds(shape: &FunctionShape) -> (usize, Option<usize>) {
    let required = shape.params.iter().filter(|p| !p.optional).count();
    let max = if shape.rest.is_some() {
        None
    } else {
        Some(shape.params.len())
    };
    (required, max)
}

impl<'a> Validator<'a> {
    /// The shape behind a function descriptor.
    pub fn signature_shape(&self, function: TypeId) -> Result<Arc<FunctionShape>, SignatureError> {
        match self.ctx.lookup(function) {
            Some(TypeData::Function(shape_id)) => Ok(self.ctx.function_shape(shape_id)),
            _ => Err(SignatureError::NotAFunction(function)),
        }
    }

    /// Silent check of concrete arguments against a signature.
    pub fn accepts_params(&mut self, function: TypeId, args: &[Value]) -> Result<bool, SignatureError> {
        let shape = self.signature_shape(function)?;
        Ok(self.check_params(&mut FastTracer, &shape, args))
    }

    /// Check concrete arguments and append a record for every violation.
    ///
    /// Returns `true` when at least one record was appended.
    pub fn collect_params_errors(
        &mut self,
        session: &mut Validation,
        function: TypeId,
        args: &[Value],
    ) -> Result<bool, SignatureError> {
        let shape = self.signature_shape(function)?;
        let before = session.len();
        self.check_params(session, &shape, args);
        Ok(session.len() > before)
    }

    /// Fail with the first violation, if any.
    pub fn assert_params(&mut self, function: TypeId, args: &[Value]) -> Result<(), AssertParamsError> {
        let mut session = Validation::new();
        if self.collect_params_errors(&mut session, function, args)? {
            if let Some(first) = session.first() {
                return Err(AssertParamsError::Mismatch(TypeMismatch::from_error(
                    self.ctx, first,
                )));
            }
        }
        Ok(())
    }

    fn check_params<T: ValidationTracer>(
        &mut self,
        tracer: &mut T,
        shape: &FunctionShape,
        args: &[Value],
    ) -> bool {
        let arguments = self.ctx.intern_string("arguments");
        let mut ok = true;

        for (index, param) in shape.params.iter().enumerate() {
            let value = args.get(index).unwrap_or(&Value::Undefined);
            if param.optional && matches!(value, Value::Undefined) {
                continue;
            }
            let mut path = param_path(param.name, arguments, index);
            if !self.check(tracer, &mut path, param.type_id, value) {
                ok = false;
                if !T::COLLECTS_ALL {
                    return false;
                }
            }
        }

        let declared = shape.params.len();
        for (index, value) in args.iter().enumerate().skip(declared) {
            let item_ok = match &shape.rest {
                Some(rest) => {
                    let mut path = match rest.name {
                        Some(name) => IdentifierPath::root(name),
                        None => IdentifierPath::root(arguments),
                    };
                    path.push(PathSegment::Index(match rest.name {
                        Some(_) => index - declared,
                        None => index,
                    }));
                    let element = self.rest_element_type(rest.type_id);
                    self.check(tracer, &mut path, element, value)
                }
                None => {
                    let mut path = IdentifierPath::root(arguments);
                    path.push(PathSegment::Index(index));
                    tracer.on_failure(|| ValidationError {
                        path,
                        expected: TypeId::EMPTY,
                        key: MessageKey::UnexpectedArgument,
                    });
                    false
                }
            };
            if !item_ok {
                ok = false;
                if !T::COLLECTS_ALL {
                    return false;
                }
            }
        }

        ok
    }

    /// Type-level call: match argument types against the signature and
    /// return its resolved return type.
    pub fn invoke(&mut self, function: TypeId, arg_types: &[TypeId]) -> Result<CallResult, SignatureError> {
        let shape = self.signature_shape(function)?;
        let (expected_min, expected_max) = arg_count_bounds(&shape);
        let count_mismatch = CallResult::ArgumentCountMismatch {
            expected_min,
            expected_max,
            actual: arg_types.len(),
        };

        for (index, param) in shape.params.iter().enumerate() {
            let actual = match arg_types.get(index) {
                Some(&actual) => actual,
                None if param.optional => continue,
                None => TypeId::VOID,
            };
            if self.compare(param.type_id, actual) == -1 {
                trace!(index, "argument rejected");
                if index >= arg_types.len() {
                    return Ok(count_mismatch);
                }
                return Ok(CallResult::ArgumentTypeMismatch {
                    index,
                    expected: param.type_id,
                    actual,
                });
            }
        }

        if arg_types.len() > shape.params.len() {
            let Some(rest) = &shape.rest else {
                return Ok(count_mismatch);
            };
            let element = self.rest_element_type(rest.type_id);
            for (index, &actual) in arg_types.iter().enumerate().skip(shape.params.len()) {
                if self.compare(element, actual) == -1 {
                    return Ok(CallResult::ArgumentTypeMismatch {
                        index,
                        expected: element,
                        actual,
                    });
                }
            }
        }

        Ok(CallResult::Success(self.resolve(shape.return_type)))
    }

    /// Substitute the types recorded in this attempt for the generic slots
    /// inside `type_id`. A slot without a record resolves to its bound, or
    /// stays as it is when unbounded.
    pub fn resolve(&mut self, type_id: TypeId) -> TypeId {
        let mut guard = RecursionGuard::with_profile(RecursionProfile::Resolution);
        self.resolve_with(&mut guard, type_id)
    }

    fn resolve_with(&mut self, guard: &mut RecursionGuard<TypeId>, type_id: TypeId) -> TypeId {
        if type_id.is_intrinsic() {
            return type_id;
        }
        match guard.enter(type_id) {
            RecursionResult::Entered => {}
            _ => return type_id,
        }
        let resolved = self.resolve_inner(guard, type_id);
        guard.leave(type_id);
        resolved
    }

    fn resolve_inner(&mut self, guard: &mut RecursionGuard<TypeId>, type_id: TypeId) -> TypeId {
        let ctx = self.ctx;
        let Some(data) = ctx.lookup(type_id) else {
            return type_id;
        };
        match data {
            TypeData::TypeParameter(slot) | TypeData::FlowProxy(slot) => {
                let state = self.slot_state(slot);
                match state.recorded.or(state.bound) {
                    Some(target) => self.resolve_with(guard, target),
                    None => type_id,
                }
            }
            TypeData::Array(element) => {
                let resolved = self.resolve_with(guard, element);
                if resolved == element { type_id } else { ctx.array(resolved) }
            }
            TypeData::Nullable(inner) => {
                let resolved = self.resolve_with(guard, inner);
                ctx.nullable(resolved)
            }
            TypeData::Tuple(list) => {
                let elements = self.resolve_list(guard, &ctx.type_list(list));
                ctx.tuple(elements)
            }
            TypeData::Union(list) => {
                let members = self.resolve_list(guard, &ctx.type_list(list));
                ctx.union(members)
            }
            TypeData::Intersection(list) => {
                let members = self.resolve_list(guard, &ctx.type_list(list));
                ctx.intersection(members)
            }
            TypeData::Object(shape_id) => {
                let shape = ctx.object_shape(shape_id);
                let properties = shape
                    .properties
                    .iter()
                    .map(|prop| PropertyInfo {
                        type_id: self.resolve_with(guard, prop.type_id),
                        ..prop.clone()
                    })
                    .collect();
                if shape.exact {
                    ctx.exact_object(properties)
                } else {
                    ctx.object(properties)
                }
            }
            TypeData::Function(shape_id) => {
                let shape = ctx.function_shape(shape_id);
                let params = shape
                    .params
                    .iter()
                    .map(|param| ParamInfo {
                        type_id: self.resolve_with(guard, param.type_id),
                        ..param.clone()
                    })
                    .collect();
                let rest = shape.rest.as_ref().map(|rest| RestParam {
                    name: rest.name,
                    type_id: self.resolve_with(guard, rest.type_id),
                });
                let return_type = self.resolve_with(guard, shape.return_type);
                ctx.function(FunctionShape {
                    params,
                    rest,
                    return_type,
                })
            }
            TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::Class(_) | TypeData::This(_) => {
                type_id
            }
        }
    }

    fn resolve_list(&mut self, guard: &mut RecursionGuard<TypeId>, members: &[TypeId]) -> Vec<TypeId> {
        members
            .iter()
            .map(|&member| self.resolve_with(guard, member))
            .collect()
    }
}

fn param_path(name: Option<Atom>, arguments: Atom, index: usize) -> IdentifierPath {
    match name {
        Some(name) => IdentifierPath::root(name),
        None => IdentifierPath::root(arguments).child(PathSegment::Index(index)),
    }
}

/// Failure of `assert_params`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssertParamsError {
    /// The callee is not a function descriptor.
    Signature(SignatureError),
    /// An argument failed its parameter.
    Mismatch(TypeMismatch),
}

impl From<SignatureError> for AssertParamsError {
    fn from(error: SignatureError) -> Self {
        AssertParamsError::Signature(error)
    }
}

impl std::fmt::Display for AssertParamsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssertParamsError::Signature(error) => error.fmt(f),
            AssertParamsError::Mismatch(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for AssertParamsError {}

#[cfg(test)]
#[path = "../tests/signature_tests.rs"]
mod tests;
