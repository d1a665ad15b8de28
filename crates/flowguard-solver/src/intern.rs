//! The type context: descriptor interning and registries.
//!
//! `TypeContext` converts `TypeData` structures into lightweight `TypeId`
//! handles and owns everything a descriptor tree refers to by handle: the
//! string pool, the generic-slot arena, the class registry and the symbol
//! registry. Descriptors never point back into the context; they hold ids and
//! every operation is given the context explicitly.
//!
//! Benefits:
//! - O(1) descriptor equality (just compare `TypeId` values)
//! - Each unique structure stored once
//! - Unions and intersections are normalized at construction
//!
//! All construction of `TypeData` values goes through this module.

use crate::types::*;
use crate::validation::SignatureError;
use crate::value::{FunctionRef, ObjectRef, Value};
use flowguard_common::interner::{Atom, Interner};
use flowguard_common::limits::MAX_BINDER_SLOTS;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::hash::Hash;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};
use tracing::trace;

const TYPE_LIST_INLINE: usize = 8;

type TypeListBuffer = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

struct TypeTable {
    key_to_id: FxHashMap<TypeData, TypeId>,
    id_to_key: Vec<TypeData>,
}

impl TypeTable {
    fn new() -> Self {
        let mut table = TypeTable {
            key_to_id: FxHashMap::default(),
            id_to_key: Vec::with_capacity(64),
        };
        for kind in IntrinsicKind::ALL {
            let id = table.insert(TypeData::Intrinsic(kind));
            debug_assert_eq!(id, kind.type_id());
        }
        table
    }

    fn insert(&mut self, key: TypeData) -> TypeId {
        if let Some(&id) = self.key_to_id.get(&key) {
            return id;
        }
        let id = TypeId(self.id_to_key.len() as u32);
        self.id_to_key.push(key.clone());
        self.key_to_id.insert(key, id);
        id
    }
}

/// Deduplicated shared values addressed by dense `u32` ids.
struct Pool<T: ?Sized> {
    items: Vec<Arc<T>>,
    ids: FxHashMap<Arc<T>, u32>,
}

impl<T: ?Sized + Eq + Hash> Pool<T> {
    fn new() -> Self {
        Pool {
            items: Vec::new(),
            ids: FxHashMap::default(),
        }
    }

    /// Callers check `ids` first.
    fn push(&mut self, shared: Arc<T>) -> u32 {
        let id = self.items.len() as u32;
        self.items.push(Arc::clone(&shared));
        self.ids.insert(shared, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<T>> {
        self.items.get(id as usize).cloned()
    }
}

impl<T: Eq + Hash> Pool<[T]> {
    /// A list pool whose id 0 is the empty list.
    fn with_empty_list() -> Self {
        let mut pool = Self::new();
        pool.push(Arc::from(Vec::new()));
        pool
    }

    fn intern_list(&mut self, items: Vec<T>) -> u32 {
        if let Some(&id) = self.ids.get(items.as_slice()) {
            return id;
        }
        self.push(Arc::from(items))
    }
}

impl<T: Eq + Hash> Pool<T> {
    fn intern_value(&mut self, value: T) -> u32 {
        if let Some(&id) = self.ids.get(&value) {
            return id;
        }
        self.push(Arc::new(value))
    }
}

/// Owns and interns every descriptor of one declaration set.
pub struct TypeContext {
    types: RwLock<TypeTable>,
    strings: RwLock<Interner>,
    type_lists: RwLock<Pool<[TypeId]>>,
    object_shapes: RwLock<Pool<ObjectShape>>,
    function_shapes: RwLock<Pool<FunctionShape>>,
    slots: RwLock<Vec<SlotInfo>>,
    classes: RwLock<Vec<ClassInfo>>,
    symbols: RwLock<Vec<Atom>>,
    next_object_id: AtomicU32,
    next_function_id: AtomicU32,
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeContext {
    /// Create a new context with pre-registered intrinsics.
    pub fn new() -> Self {
        TypeContext {
            types: RwLock::new(TypeTable::new()),
            strings: RwLock::new({
                let mut interner = Interner::new();
                interner.intern_common();
                interner
            }),
            type_lists: RwLock::new(Pool::with_empty_list()),
            object_shapes: RwLock::new(Pool::new()),
            function_shapes: RwLock::new(Pool::new()),
            slots: RwLock::new(Vec::new()),
            classes: RwLock::new(Vec::new()),
            symbols: RwLock::new(Vec::new()),
            next_object_id: AtomicU32::new(1),
            next_function_id: AtomicU32::new(1),
        }
    }

    // =========================================================================
    // Strings
    // =========================================================================

    pub fn intern_string(&self, s: &str) -> Atom {
        self.strings
            .write()
            .expect("strings lock poisoned")
            .intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.strings
            .read()
            .expect("strings lock poisoned")
            .resolve_arc(atom)
    }

    // =========================================================================
    // Interning and lookup
    // =========================================================================

    /// Intern a descriptor and return its `TypeId`.
    pub(crate) fn intern(&self, key: TypeData) -> TypeId {
        if let TypeData::Intrinsic(kind) = key {
            return kind.type_id();
        }
        {
            let table = self.types.read().expect("types lock poisoned");
            if let Some(&id) = table.key_to_id.get(&key) {
                return id;
            }
        }
        self.types
            .write()
            .expect("types lock poisoned")
            .insert(key)
    }

    /// Look up the descriptor for a `TypeId`.
    ///
    /// Returns `None` for handles that were not produced by this context.
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        self.types
            .read()
            .expect("types lock poisoned")
            .id_to_key
            .get(id.0 as usize)
            .cloned()
    }

    /// Number of interned descriptors, intrinsics included.
    pub fn type_count(&self) -> usize {
        self.types.read().expect("types lock poisoned").id_to_key.len()
    }

    fn intern_type_list(&self, members: Vec<TypeId>) -> TypeListId {
        let mut lists = self.type_lists.write().expect("type_lists lock poisoned");
        TypeListId(lists.intern_list(members))
    }

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        let lists = self.type_lists.read().expect("type_lists lock poisoned");
        lists
            .get(id.0)
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    pub fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape> {
        self.object_shapes
            .read()
            .expect("object_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(ObjectShape {
                    properties: Vec::new(),
                    exact: false,
                })
            })
    }

    pub fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        self.function_shapes
            .read()
            .expect("function_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(FunctionShape {
                    params: Vec::new(),
                    rest: None,
                    return_type: TypeId::EMPTY,
                })
            })
    }

    // =========================================================================
    // Leaf constructors
    // =========================================================================

    pub fn literal_string(&self, value: &str) -> TypeId {
        let atom = self.intern_string(value);
        self.intern(TypeData::Literal(LiteralValue::String(atom)))
    }

    pub fn literal_number(&self, value: f64) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Number(OrderedFloat(value))))
    }

    pub fn literal_boolean(&self, value: bool) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Boolean(value)))
    }

    pub fn symbol_literal(&self, symbol: SymbolId) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Symbol(symbol)))
    }

    pub fn array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(element))
    }

    pub fn tuple(&self, elements: Vec<TypeId>) -> TypeId {
        let list = self.intern_type_list(elements);
        self.intern(TypeData::Tuple(list))
    }

    /// Object descriptor that tolerates undeclared properties.
    pub fn object(&self, properties: Vec<PropertyInfo>) -> TypeId {
        self.object_with_exactness(properties, false)
    }

    /// Object descriptor that rejects undeclared properties.
    pub fn exact_object(&self, properties: Vec<PropertyInfo>) -> TypeId {
        self.object_with_exactness(properties, true)
    }

    fn object_with_exactness(&self, mut properties: Vec<PropertyInfo>, exact: bool) -> TypeId {
        properties.sort_by_key(|p| p.name);
        properties.dedup_by_key(|p| p.name);
        let shape = ObjectShape { properties, exact };
        let id = self
            .object_shapes
            .write()
            .expect("object_shapes lock poisoned")
            .intern_value(shape);
        self.intern(TypeData::Object(ObjectShapeId(id)))
    }

    pub fn class_instance(&self, class: ClassId) -> TypeId {
        self.intern(TypeData::Class(class))
    }

    /// `?inner`. Nullable of a nullable or of a universal descriptor is the
    /// descriptor itself.
    pub fn nullable(&self, inner: TypeId) -> TypeId {
        if inner.is_universal() {
            return inner;
        }
        if let Some(TypeData::Nullable(_)) = self.lookup(inner) {
            return inner;
        }
        self.intern(TypeData::Nullable(inner))
    }

    pub fn function(&self, shape: FunctionShape) -> TypeId {
        let id = self
            .function_shapes
            .write()
            .expect("function_shapes lock poisoned")
            .intern_value(shape);
        self.intern(TypeData::Function(FunctionShapeId(id)))
    }

    pub fn this_type(&self, capture: ThisCapture) -> TypeId {
        self.intern(TypeData::This(capture))
    }

    // =========================================================================
    // Generic slots
    // =========================================================================

    /// Declare a new generic slot and return its `TypeParameter` descriptor.
    ///
    /// Every call declares a distinct slot, even for equal names and bounds.
    ///
    /// # Panics
    ///
    /// Panics once `MAX_BINDER_SLOTS` slots exist. Use
    /// [`try_type_parameter`](Self::try_type_parameter) when the number of
    /// declarations comes from input.
    pub fn type_parameter(&self, name: &str, bound: Option<TypeId>) -> TypeId {
        match self.try_type_parameter(name, bound) {
            Ok(type_id) => type_id,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_type_parameter(
        &self,
        name: &str,
        bound: Option<TypeId>,
    ) -> Result<TypeId, SignatureError> {
        let name = self.intern_string(name);
        let slot = {
            let mut slots = self.slots.write().expect("slots lock poisoned");
            if slots.len() >= MAX_BINDER_SLOTS {
                return Err(SignatureError::TooManySlots {
                    limit: MAX_BINDER_SLOTS,
                });
            }
            slots.push(SlotInfo { name, bound });
            SlotId((slots.len() - 1) as u32)
        };
        trace!(slot = slot.0, "declared generic slot");
        Ok(self.intern(TypeData::TypeParameter(slot)))
    }

    /// A proxy that feeds the slot behind `type_parameter`.
    ///
    /// Returns `None` when `type_parameter` does not name a slot. A proxy of a
    /// proxy relays to the same slot.
    pub fn flow_into(&self, type_parameter: TypeId) -> Option<TypeId> {
        let slot = self.lookup(type_parameter)?.slot()?;
        Some(self.intern(TypeData::FlowProxy(slot)))
    }

    pub fn slot_info(&self, slot: SlotId) -> Option<SlotInfo> {
        self.slots
            .read()
            .expect("slots lock poisoned")
            .get(slot.index())
            .cloned()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.read().expect("slots lock poisoned").len()
    }

    // =========================================================================
    // Classes and symbols
    // =========================================================================

    pub fn declare_class(&self, name: &str, extends: Option<ClassId>) -> ClassId {
        let name = self.intern_string(name);
        let mut classes = self.classes.write().expect("classes lock poisoned");
        classes.push(ClassInfo { name, extends });
        ClassId((classes.len() - 1) as u32)
    }

    pub fn class_info(&self, class: ClassId) -> Option<ClassInfo> {
        self.classes
            .read()
            .expect("classes lock poisoned")
            .get(class.0 as usize)
            .cloned()
    }

    /// Whether `class` is `ancestor` or inherits from it.
    pub fn is_subclass_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        let classes = self.classes.read().expect("classes lock poisoned");
        let mut current = Some(class);
        // A well-formed chain is never longer than the registry.
        for _ in 0..=classes.len() {
            match current {
                Some(c) if c == ancestor => return true,
                Some(c) => current = classes.get(c.0 as usize).and_then(|info| info.extends),
                None => return false,
            }
        }
        false
    }

    /// Create a fresh symbol. Every call yields a distinct identity.
    pub fn symbol(&self, description: &str) -> SymbolId {
        let description = self.intern_string(description);
        let mut symbols = self.symbols.write().expect("symbols lock poisoned");
        symbols.push(description);
        SymbolId((symbols.len() - 1) as u32)
    }

    pub fn symbol_description(&self, symbol: SymbolId) -> Arc<str> {
        let atom = self
            .symbols
            .read()
            .expect("symbols lock poisoned")
            .get(symbol.0 as usize)
            .copied()
            .unwrap_or(Atom::NONE);
        self.resolve_atom(atom)
    }

    // =========================================================================
    // Values with identity
    // =========================================================================

    /// Build a plain object value with a fresh identity.
    pub fn object_value(&self, properties: Vec<(&str, Value)>) -> Value {
        self.build_object(None, properties)
    }

    /// Build an instance of `class` with a fresh identity.
    pub fn instance_value(&self, class: ClassId, properties: Vec<(&str, Value)>) -> Value {
        self.build_object(Some(class), properties)
    }

    fn build_object(&self, class: Option<ClassId>, properties: Vec<(&str, Value)>) -> Value {
        let id = ObjectId(self.next_object_id.fetch_add(1, Ordering::Relaxed));
        let mut map = IndexMap::with_capacity(properties.len());
        for (name, value) in properties {
            map.insert(self.intern_string(name), value);
        }
        Value::Object(ObjectRef {
            id,
            class,
            properties: Arc::new(map),
        })
    }

    /// Build a function value, optionally carrying an attached signature.
    pub fn function_value(&self, name: &str, signature: Option<TypeId>) -> Value {
        let id = FunctionId(self.next_function_id.fetch_add(1, Ordering::Relaxed));
        Value::Function(FunctionRef {
            id,
            name: self.intern_string(name),
            signature,
        })
    }

    // =========================================================================
    // Unions and intersections
    // =========================================================================

    /// Intern a union, normalizing and deduplicating members.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        self.union_from_iter(members)
    }

    /// Fast path for two-member unions.
    pub fn union2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.union_from_iter([left, right])
    }

    fn union_from_iter<I>(&self, members: I) -> TypeId
    where
        I: IntoIterator<Item = TypeId>,
    {
        let mut iter = members.into_iter();
        let Some(first) = iter.next() else {
            return TypeId::EMPTY;
        };
        let Some(second) = iter.next() else {
            return first;
        };

        let mut flat: TypeListBuffer = SmallVec::new();
        self.push_union_member(&mut flat, first);
        self.push_union_member(&mut flat, second);
        for member in iter {
            self.push_union_member(&mut flat, member);
        }

        self.normalize_union(flat)
    }

    fn push_union_member(&self, flat: &mut TypeListBuffer, member: TypeId) {
        if let Some(TypeData::Union(inner)) = self.lookup(member) {
            flat.extend(self.type_list(inner).iter().copied());
        } else {
            flat.push(member);
        }
    }

    fn normalize_union(&self, mut flat: TypeListBuffer) -> TypeId {
        // Deduplicate and sort for consistent hashing
        flat.sort_by_key(|id| id.0);
        flat.dedup();

        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        if flat.contains(&TypeId::MIXED) {
            return TypeId::MIXED;
        }
        flat.retain(|id| *id != TypeId::EMPTY);

        // "a" | string => string
        self.absorb_literals_into_primitives(&mut flat);

        match flat.len() {
            0 => TypeId::EMPTY,
            1 => flat[0],
            _ => {
                let list_id = self.intern_type_list(flat.into_vec());
                self.intern(TypeData::Union(list_id))
            }
        }
    }

    fn absorb_literals_into_primitives(&self, flat: &mut TypeListBuffer) {
        let has = |primitive: TypeId| flat.contains(&primitive);
        let (has_string, has_number, has_boolean, has_symbol) = (
            has(TypeId::STRING),
            has(TypeId::NUMBER),
            has(TypeId::BOOLEAN),
            has(TypeId::SYMBOL),
        );
        if !(has_string || has_number || has_boolean || has_symbol) {
            return;
        }

        flat.retain(|type_id| {
            let Some(TypeData::Literal(literal)) = self.lookup(*type_id) else {
                return true;
            };
            match literal {
                LiteralValue::String(_) => !has_string,
                LiteralValue::Number(_) => !has_number,
                LiteralValue::Boolean(_) => !has_boolean,
                LiteralValue::Symbol(_) => !has_symbol,
            }
        });
    }

    /// Intern an intersection, normalizing and deduplicating members.
    pub fn intersection(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat: TypeListBuffer = SmallVec::new();
        for member in members {
            if let Some(TypeData::Intersection(inner)) = self.lookup(member) {
                flat.extend(self.type_list(inner).iter().copied());
            } else {
                flat.push(member);
            }
        }

        flat.sort_by_key(|id| id.0);
        flat.dedup();

        if flat.contains(&TypeId::EMPTY) {
            return TypeId::EMPTY;
        }
        flat.retain(|id| !id.is_universal());

        match flat.len() {
            0 => TypeId::MIXED,
            1 => flat[0],
            _ => {
                let list_id = self.intern_type_list(flat.into_vec());
                self.intern(TypeData::Intersection(list_id))
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
