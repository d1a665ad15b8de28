//! Classification of runtime values into leaf descriptors.

use crate::intern::TypeContext;
use crate::types::*;
use crate::value::Value;

impl TypeContext {
    /// The narrowest descriptor that accepts `value`.
    ///
    /// Primitives classify to their literal, arrays to an array of the union
    /// of their element types, plain objects to an object of their property
    /// types, instances to their class, constructors to a `This` capturing
    /// the class.
    pub fn type_of(&self, value: &Value) -> TypeId {
        match value {
            Value::Undefined => TypeId::VOID,
            Value::Null => TypeId::NULL,
            Value::Boolean(b) => self.literal_boolean(*b),
            Value::Number(n) => self.literal_number(*n),
            Value::String(s) => self.literal_string(s),
            Value::Symbol(symbol) => self.symbol_literal(*symbol),
            Value::Array(items) => {
                let element = self.union(items.iter().map(|item| self.type_of(item)).collect());
                self.array(element)
            }
            Value::Object(object) => match object.class {
                Some(class) => self.class_instance(class),
                None => {
                    let properties = object
                        .properties
                        .iter()
                        .map(|(name, value)| PropertyInfo::new(*name, self.type_of(value)))
                        .collect();
                    self.object(properties)
                }
            },
            Value::Function(function) => function.signature.unwrap_or(TypeId::FUNCTION),
            Value::Class(class) => self.this_type(ThisCapture::Class(*class)),
        }
    }

    /// Widen a literal to its primitive (`"hi"` to `string`).
    ///
    /// Arrays, tuples, nullables and unions widen their members; every other
    /// descriptor is returned unchanged.
    pub fn widen_literal(&self, type_id: TypeId) -> TypeId {
        let Some(data) = self.lookup(type_id) else {
            return type_id;
        };
        match data {
            TypeData::Literal(literal) => literal.primitive(),
            TypeData::Array(element) => {
                let widened = self.widen_literal(element);
                if widened == element {
                    type_id
                } else {
                    self.array(widened)
                }
            }
            TypeData::Tuple(list) => {
                let elements = self.type_list(list);
                self.tuple(elements.iter().map(|e| self.widen_literal(*e)).collect())
            }
            TypeData::Nullable(inner) => self.nullable(self.widen_literal(inner)),
            TypeData::Union(list) => {
                let members = self.type_list(list);
                self.union(members.iter().map(|m| self.widen_literal(*m)).collect())
            }
            _ => type_id,
        }
    }
}

#[cfg(test)]
#[path = "../tests/type_of_tests.rs"]
mod tests;
