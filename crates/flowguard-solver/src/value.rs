//! Runtime values checked against descriptors.
//!
//! Values are produced by the host (or by tests) and are opaque to the
//! descriptor tree. Objects and functions have identity: two `ObjectRef`s are
//! the same object only when their ids match, regardless of their contents.
//! Ids are handed out by the `TypeContext` that builds the value.

use crate::types::{ClassId, FunctionId, ObjectId, SymbolId, TypeId};
use flowguard_common::interner::Atom;
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub enum Value {
    /// The absent value (a missing argument or property).
    Undefined,
    /// The explicit null value.
    Null,
    Boolean(bool),
    Number(f64),
    String(Arc<str>),
    Symbol(SymbolId),
    Array(Arc<[Value]>),
    Object(ObjectRef),
    Function(FunctionRef),
    /// A constructor value.
    Class(ClassId),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::String(Arc::from(s))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(items.into())
    }

    /// `Undefined` or `Null`.
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Identity for reference values, strict equality for primitives.
    ///
    /// Numbers compare with IEEE semantics, so `NaN` is never identical to
    /// itself.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => a.id == b.id,
            (Value::Function(a), Value::Function(b)) => a.id == b.id,
            (Value::Class(a), Value::Class(b)) => a == b,
            _ => false,
        }
    }

    /// Short name of the value's runtime kind, for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Class(_) => "class",
        }
    }
}

/// An object value: identity, optional class, ordered own properties.
#[derive(Clone, Debug)]
pub struct ObjectRef {
    pub id: ObjectId,
    pub class: Option<ClassId>,
    pub properties: Arc<IndexMap<Atom, Value>>,
}

impl ObjectRef {
    pub fn get(&self, name: Atom) -> Option<&Value> {
        self.properties.get(&name)
    }
}

/// A function value. `signature` is the descriptor attached when the
/// function was declared with annotations; unannotated functions have none.
#[derive(Clone, Debug)]
pub struct FunctionRef {
    pub id: FunctionId,
    pub name: Atom,
    pub signature: Option<TypeId>,
}
