//! Descriptor representation.
//!
//! Every descriptor is a `TypeData` value interned into a `TypeContext` and
//! referred to by a `TypeId` handle. Handles are plain integers: equality of
//! two handles from the same context is structural equality of the
//! descriptors they name.
//!
//! The only descriptors with identity semantics are the binder slots
//! (`TypeParameter`, `FlowProxy`), which name an entry in the context's slot
//! arena rather than a structure, and `This`, which names one captured
//! instance or constructor.

use flowguard_common::interner::Atom;
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// Handle to an interned descriptor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Universal descriptor: accepts every value and propagates through flows.
    pub const ANY: TypeId = TypeId(0);
    /// Universal descriptor without propagation semantics.
    pub const MIXED: TypeId = TypeId(1);
    /// Accepts nothing.
    pub const EMPTY: TypeId = TypeId(2);
    /// Accepts only the absent value.
    pub const VOID: TypeId = TypeId(3);
    /// Accepts only the explicit null value.
    pub const NULL: TypeId = TypeId(4);
    pub const BOOLEAN: TypeId = TypeId(5);
    pub const NUMBER: TypeId = TypeId(6);
    pub const STRING: TypeId = TypeId(7);
    pub const SYMBOL: TypeId = TypeId(8);
    /// Any callable value, whatever its signature.
    pub const FUNCTION: TypeId = TypeId(9);

    /// First id handed out to non-intrinsic descriptors.
    pub const FIRST_USER: u32 = 10;

    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    /// `any` or `mixed`.
    #[inline]
    pub const fn is_universal(self) -> bool {
        self.0 == Self::ANY.0 || self.0 == Self::MIXED.0
    }
}

/// Built-in leaf descriptors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Any,
    Mixed,
    Empty,
    Void,
    Null,
    Boolean,
    Number,
    String,
    Symbol,
    Function,
}

impl IntrinsicKind {
    /// All intrinsics, in `TypeId` order.
    pub const ALL: [IntrinsicKind; 10] = [
        IntrinsicKind::Any,
        IntrinsicKind::Mixed,
        IntrinsicKind::Empty,
        IntrinsicKind::Void,
        IntrinsicKind::Null,
        IntrinsicKind::Boolean,
        IntrinsicKind::Number,
        IntrinsicKind::String,
        IntrinsicKind::Symbol,
        IntrinsicKind::Function,
    ];

    pub const fn type_id(self) -> TypeId {
        match self {
            Self::Any => TypeId::ANY,
            Self::Mixed => TypeId::MIXED,
            Self::Empty => TypeId::EMPTY,
            Self::Void => TypeId::VOID,
            Self::Null => TypeId::NULL,
            Self::Boolean => TypeId::BOOLEAN,
            Self::Number => TypeId::NUMBER,
            Self::String => TypeId::STRING,
            Self::Symbol => TypeId::SYMBOL,
            Self::Function => TypeId::FUNCTION,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Mixed => "mixed",
            Self::Empty => "empty",
            Self::Void => "void",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Symbol => "Symbol",
            Self::Function => "Function",
        }
    }
}

/// f64 wrapper with bitwise equality so number literals can be interned.
#[derive(Copy, Clone, Debug)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Opaque identity token for a symbol value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Exact-value literal descriptors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Boolean(bool),
    Number(OrderedFloat),
    String(Atom),
    Symbol(SymbolId),
}

impl LiteralValue {
    /// The primitive descriptor this literal widens to.
    pub const fn primitive(self) -> TypeId {
        match self {
            Self::Boolean(_) => TypeId::BOOLEAN,
            Self::Number(_) => TypeId::NUMBER,
            Self::String(_) => TypeId::STRING,
            Self::Symbol(_) => TypeId::SYMBOL,
        }
    }
}

/// Handle to an interned list of descriptors (union, intersection, tuple).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectShapeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShapeId(pub u32);

/// Index of a generic slot in the context's slot arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u32);

impl SlotId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Registered class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

/// Identity of an object value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

/// Identity of a function value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

/// What a `This` descriptor was bound to when it was created.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ThisCapture {
    /// Nothing captured yet; accepts every value.
    Unset,
    /// One specific object.
    Instance(ObjectId),
    /// A constructor: accepts the constructor itself and its instances.
    Class(ClassId),
}

/// A declared property of an object descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub optional: bool,
}

impl PropertyInfo {
    pub fn new(name: Atom, type_id: TypeId) -> Self {
        Self {
            name,
            type_id,
            optional: false,
        }
    }

    pub fn optional(name: Atom, type_id: TypeId) -> Self {
        Self {
            name,
            type_id,
            optional: true,
        }
    }
}

/// Properties are kept sorted by name so equal shapes intern to one id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectShape {
    pub properties: Vec<PropertyInfo>,
    /// Exact shapes reject values carrying undeclared properties.
    pub exact: bool,
}

impl ObjectShape {
    pub fn property(&self, name: Atom) -> Option<&PropertyInfo> {
        self.properties
            .binary_search_by_key(&name, |p| p.name)
            .ok()
            .map(|index| &self.properties[index])
    }
}

/// A positional parameter of a function descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: Option<Atom>,
    pub type_id: TypeId,
    pub optional: bool,
}

impl ParamInfo {
    pub fn required(name: Option<Atom>, type_id: TypeId) -> Self {
        Self {
            name,
            type_id,
            optional: false,
        }
    }

    pub fn optional(name: Option<Atom>, type_id: TypeId) -> Self {
        Self {
            name,
            type_id,
            optional: true,
        }
    }
}

/// The variadic tail of a function descriptor.
///
/// `type_id` is the declared type of the whole rest parameter, normally an
/// array; excess arguments are checked against its element type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RestParam {
    pub name: Option<Atom>,
    pub type_id: TypeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub params: Vec<ParamInfo>,
    pub rest: Option<RestParam>,
    pub return_type: TypeId,
}

/// Structural descriptor data.
///
/// The set of variants is closed: every protocol operation matches on it
/// exhaustively.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    Literal(LiteralValue),
    Array(TypeId),
    Tuple(TypeListId),
    Object(ObjectShapeId),
    /// Instances of a registered class (or its subclasses).
    Class(ClassId),
    /// The inner descriptor, the absent value, or null.
    Nullable(TypeId),
    Union(TypeListId),
    Intersection(TypeListId),
    Function(FunctionShapeId),
    This(ThisCapture),
    /// A generic slot. Once recorded it only accepts what the record accepts.
    TypeParameter(SlotId),
    /// A relay into a generic slot declared elsewhere, widening its record.
    FlowProxy(SlotId),
}

impl TypeData {
    /// The binder slot named by this descriptor, if any.
    pub fn slot(&self) -> Option<SlotId> {
        match self {
            TypeData::TypeParameter(slot) | TypeData::FlowProxy(slot) => Some(*slot),
            _ => None,
        }
    }
}

/// Declaration of a generic slot. Per-attempt state lives in `Bindings`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotInfo {
    pub name: Atom,
    pub bound: Option<TypeId>,
}

/// Registered class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: Atom,
    pub extends: Option<ClassId>,
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
