//! Rendering descriptors as annotation-like text, for error messages and logs.

use crate::intern::TypeContext;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::*;

/// Formats descriptors. Nested deeper than the validation profile allows,
/// a descriptor renders as `...`.
pub struct TypeFormatter<'a> {
    ctx: &'a TypeContext,
    depth: DepthCounter,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(ctx: &'a TypeContext) -> Self {
        TypeFormatter {
            ctx,
            depth: DepthCounter::with_profile(RecursionProfile::Validation),
        }
    }

    pub fn format(&mut self, type_id: TypeId) -> String {
        if !self.depth.enter() {
            return "...".to_string();
        }
        let text = self.format_inner(type_id);
        self.depth.leave();
        text
    }

    fn format_inner(&mut self, type_id: TypeId) -> String {
        let Some(data) = self.ctx.lookup(type_id) else {
            return format!("<unknown {}>", type_id.0);
        };
        match data {
            TypeData::Intrinsic(kind) => kind.name().to_string(),
            TypeData::Literal(literal) => self.format_literal(literal),
            TypeData::Array(element) => {
                let inner = self.format(element);
                if self.needs_parens(element) {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            TypeData::Tuple(list) => {
                let elements = self.ctx.type_list(list);
                format!("[{}]", self.join(&elements, ", "))
            }
            TypeData::Object(shape_id) => {
                let shape = self.ctx.object_shape(shape_id);
                let mut fields = Vec::with_capacity(shape.properties.len());
                for prop in &shape.properties {
                    let name = self.ctx.resolve_atom(prop.name);
                    let marker = if prop.optional { "?" } else { "" };
                    fields.push(format!("{name}{marker}: {}", self.format(prop.type_id)));
                }
                match (shape.exact, fields.is_empty()) {
                    (true, true) => "{||}".to_string(),
                    (true, false) => format!("{{| {} |}}", fields.join(", ")),
                    (false, true) => "{}".to_string(),
                    (false, false) => format!("{{ {} }}", fields.join(", ")),
                }
            }
            TypeData::Class(class) => self.class_name(class),
            TypeData::Nullable(inner) => {
                let text = self.format(inner);
                if self.needs_parens(inner) {
                    format!("?({text})")
                } else {
                    format!("?{text}")
                }
            }
            TypeData::Union(list) => {
                let members = self.ctx.type_list(list);
                self.join(&members, " | ")
            }
            TypeData::Intersection(list) => {
                let members = self.ctx.type_list(list);
                self.join(&members, " & ")
            }
            TypeData::Function(shape_id) => {
                let shape = self.ctx.function_shape(shape_id);
                let mut params = Vec::with_capacity(shape.params.len() + 1);
                for param in &shape.params {
                    let ty = self.format(param.type_id);
                    let marker = if param.optional { "?" } else { "" };
                    params.push(match param.name {
                        Some(name) => format!("{}{marker}: {ty}", self.ctx.resolve_atom(name)),
                        None => format!("{ty}{marker}"),
                    });
                }
                if let Some(rest) = &shape.rest {
                    let ty = self.format(rest.type_id);
                    params.push(match rest.name {
                        Some(name) => format!("...{}: {ty}", self.ctx.resolve_atom(name)),
                        None => format!("...{ty}"),
                    });
                }
                format!(
                    "({}) => {}",
                    params.join(", "),
                    self.format(shape.return_type)
                )
            }
            TypeData::This(capture) => match capture {
                ThisCapture::Unset | ThisCapture::Instance(_) => "this".to_string(),
                ThisCapture::Class(class) => format!("Class<{}>", self.class_name(class)),
            },
            TypeData::TypeParameter(slot) | TypeData::FlowProxy(slot) => self
                .ctx
                .slot_info(slot)
                .map(|info| self.ctx.resolve_atom(info.name).to_string())
                .unwrap_or_else(|| format!("<slot {}>", slot.0)),
        }
    }

    fn format_literal(&self, literal: LiteralValue) -> String {
        match literal {
            LiteralValue::Boolean(b) => b.to_string(),
            LiteralValue::Number(n) => n.0.to_string(),
            LiteralValue::String(atom) => format!("{:?}", &*self.ctx.resolve_atom(atom)),
            LiteralValue::Symbol(symbol) => {
                format!("Symbol({})", self.ctx.symbol_description(symbol))
            }
        }
    }

    fn class_name(&self, class: ClassId) -> String {
        self.ctx
            .class_info(class)
            .map(|info| self.ctx.resolve_atom(info.name).to_string())
            .unwrap_or_else(|| format!("<class {}>", class.0))
    }

    fn needs_parens(&self, type_id: TypeId) -> bool {
        matches!(
            self.ctx.lookup(type_id),
            Some(TypeData::Union(_) | TypeData::Intersection(_) | TypeData::Function(_))
        )
    }

    fn join(&mut self, members: &[TypeId], separator: &str) -> String {
        members
            .iter()
            .map(|member| self.format(*member))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl TypeContext {
    /// Shorthand for `TypeFormatter::new(self).format(type_id)`.
    pub fn format_type(&self, type_id: TypeId) -> String {
        TypeFormatter::new(self).format(type_id)
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
