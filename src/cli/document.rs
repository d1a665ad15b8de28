//! The JSON input document and its translation into interned descriptors.
//!
//! A type is written either as a name (an intrinsic, a declared class, an
//! alias or a generic in scope) or as a single-key object naming a
//! composite:
//!
//! ```json
//! { "union": ["number", { "array": "string" }] }
//! { "object": { "properties": [{ "name": "id", "type": "number" }], "exact": true } }
//! { "function": { "generics": [{ "name": "T" }], "params": [{ "type": "T" }], "returns": "T" } }
//! ```
//!
//! Runtime values are plain JSON. An object carrying a `"$class"` key becomes
//! an instance of that class; the remaining keys are its properties.

use anyhow::{Context, Result, anyhow, bail};
use flowguard_solver::{
    ClassId, FunctionShape, IntrinsicKind, ParamInfo, PropertyInfo, RestParam, SymbolId,
    ThisCapture, TypeContext, TypeId, Value,
};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;

const CLASS_KEY: &str = "$class";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(default)]
    pub classes: Vec<ClassSpec>,
    /// Named descriptors, declared in order. Later aliases may refer to
    /// earlier ones.
    #[serde(default)]
    pub types: Vec<AliasSpec>,
    /// The overload set, in declaration order.
    #[serde(default)]
    pub candidates: Vec<SignatureSpec>,
    /// Argument lists dispatched against `candidates`.
    #[serde(default)]
    pub calls: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassSpec {
    pub name: String,
    #[serde(default)]
    pub extends: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenericSpec {
    pub name: String,
    #[serde(default)]
    pub bound: Option<TypeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignatureSpec {
    #[serde(default)]
    pub generics: Vec<GenericSpec>,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    #[serde(default)]
    pub rest: Option<RestSpec>,
    #[serde(default = "void_type")]
    pub returns: TypeSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeSpec,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestSpec {
    #[serde(default)]
    pub name: Option<String>,
    /// Type of the whole rest parameter, normally an array.
    #[serde(rename = "type")]
    pub ty: TypeSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertySpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeSpec,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckSpec {
    /// Generics visible to `ty`. Their recorded types are reported.
    #[serde(default)]
    pub generics: Vec<GenericSpec>,
    #[serde(rename = "type")]
    pub ty: TypeSpec,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    Name(String),
    Composite(Box<CompositeSpec>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeSpec {
    Literal(serde_json::Value),
    Symbol(String),
    Array(TypeSpec),
    Tuple(Vec<TypeSpec>),
    Object {
        #[serde(default)]
        properties: Vec<PropertySpec>,
        #[serde(default)]
        exact: bool,
    },
    Nullable(TypeSpec),
    Union(Vec<TypeSpec>),
    Intersection(Vec<TypeSpec>),
    Function(SignatureSpec),
    /// `this`, optionally captured to a class.
    This(Option<String>),
    /// A proxy feeding the named generic.
    Flow(String),
}

fn void_type() -> TypeSpec {
    TypeSpec::Name("void".to_string())
}

pub fn load_document(path: &Path) -> Result<Document> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_document(&source).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn parse_document(source: &str) -> Result<Document> {
    Ok(serde_json::from_str(source)?)
}

/// Resolves names and interns descriptors into one context.
pub struct TypeBuilder<'a> {
    ctx: &'a TypeContext,
    classes: FxHashMap<String, ClassId>,
    aliases: FxHashMap<String, TypeId>,
    symbols: FxHashMap<String, SymbolId>,
    /// Generic scopes, innermost last.
    generics: Vec<(String, TypeId)>,
}

impl<'a> TypeBuilder<'a> {
    pub fn new(ctx: &'a TypeContext) -> Self {
        TypeBuilder {
            ctx,
            classes: FxHashMap::default(),
            aliases: FxHashMap::default(),
            symbols: FxHashMap::default(),
            generics: Vec::new(),
        }
    }

    pub fn context(&self) -> &'a TypeContext {
        self.ctx
    }

    /// Declare classes and aliases, in document order.
    pub fn declare(&mut self, document: &Document) -> Result<()> {
        for class in &document.classes {
            if self.classes.contains_key(&class.name) {
                bail!("class `{}` is declared twice", class.name);
            }
            let extends = match &class.extends {
                Some(parent) => Some(self.class(parent)?),
                None => None,
            };
            let id = self.ctx.declare_class(&class.name, extends);
            self.classes.insert(class.name.clone(), id);
        }
        for alias in &document.types {
            let ty = self
                .build(&alias.ty)
                .with_context(|| format!("in type `{}`", alias.name))?;
            self.aliases.insert(alias.name.clone(), ty);
        }
        Ok(())
    }

    pub fn class(&self, name: &str) -> Result<ClassId> {
        self.classes
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("unknown class `{name}`"))
    }

    /// Declare `generics` as a new innermost scope. Bounds may refer to
    /// generics declared before them.
    pub fn push_generics(&mut self, generics: &[GenericSpec]) -> Result<Vec<(String, TypeId)>> {
        let scope_start = self.generics.len();
        let mut declared = Vec::with_capacity(generics.len());
        for generic in generics {
            let bound = match &generic.bound {
                Some(bound) => match self.build(bound) {
                    Ok(bound) => Some(bound),
                    Err(err) => {
                        self.generics.truncate(scope_start);
                        return Err(err.context(format!("in bound of `{}`", generic.name)));
                    }
                },
                None => None,
            };
            let slot = match self.ctx.try_type_parameter(&generic.name, bound) {
                Ok(slot) => slot,
                Err(err) => {
                    self.generics.truncate(scope_start);
                    return Err(anyhow!(err).context(format!("declaring `{}`", generic.name)));
                }
            };
            self.generics.push((generic.name.clone(), slot));
            declared.push((generic.name.clone(), slot));
        }
        Ok(declared)
    }

    pub fn pop_generics(&mut self, count: usize) {
        let keep = self.generics.len().saturating_sub(count);
        self.generics.truncate(keep);
    }

    pub fn build(&mut self, spec: &TypeSpec) -> Result<TypeId> {
        match spec {
            TypeSpec::Name(name) => self.named(name),
            TypeSpec::Composite(composite) => self.composite(composite),
        }
    }

    fn named(&self, name: &str) -> Result<TypeId> {
        if let Some((_, slot)) = self.generics.iter().rev().find(|(n, _)| n == name) {
            return Ok(*slot);
        }
        if let Some(&alias) = self.aliases.get(name) {
            return Ok(alias);
        }
        if let Some(&class) = self.classes.get(name) {
            return Ok(self.ctx.class_instance(class));
        }
        IntrinsicKind::ALL
            .iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
            .map(|kind| kind.type_id())
            .ok_or_else(|| anyhow!("unknown type `{name}`"))
    }

    fn composite(&mut self, spec: &CompositeSpec) -> Result<TypeId> {
        let ctx = self.ctx;
        Ok(match spec {
            CompositeSpec::Literal(value) => match value {
                serde_json::Value::String(s) => ctx.literal_string(s),
                serde_json::Value::Bool(b) => ctx.literal_boolean(*b),
                serde_json::Value::Number(n) => ctx.literal_number(
                    n.as_f64()
                        .ok_or_else(|| anyhow!("literal {n} is not representable"))?,
                ),
                other => bail!("unsupported literal {other}"),
            },
            CompositeSpec::Symbol(description) => {
                let symbol = self.symbol(description);
                ctx.symbol_literal(symbol)
            }
            CompositeSpec::Array(element) => {
                let element = self.build(element)?;
                ctx.array(element)
            }
            CompositeSpec::Tuple(elements) => {
                let elements = self.build_all(elements)?;
                ctx.tuple(elements)
            }
            CompositeSpec::Object { properties, exact } => {
                let mut built = Vec::with_capacity(properties.len());
                for prop in properties {
                    let name = ctx.intern_string(&prop.name);
                    let ty = self.build(&prop.ty)?;
                    built.push(if prop.optional {
                        PropertyInfo::optional(name, ty)
                    } else {
                        PropertyInfo::new(name, ty)
                    });
                }
                if *exact {
                    ctx.exact_object(built)
                } else {
                    ctx.object(built)
                }
            }
            CompositeSpec::Nullable(inner) => {
                let inner = self.build(inner)?;
                ctx.nullable(inner)
            }
            CompositeSpec::Union(members) => {
                let members = self.build_all(members)?;
                ctx.union(members)
            }
            CompositeSpec::Intersection(members) => {
                let members = self.build_all(members)?;
                ctx.intersection(members)
            }
            CompositeSpec::Function(signature) => self.signature(signature)?,
            CompositeSpec::This(None) => ctx.this_type(ThisCapture::Unset),
            CompositeSpec::This(Some(class)) => {
                let class = self.class(class)?;
                ctx.this_type(ThisCapture::Class(class))
            }
            CompositeSpec::Flow(name) => {
                let target = self.named(name)?;
                ctx.flow_into(target)
                    .ok_or_else(|| anyhow!("`{name}` is not a generic"))?
            }
        })
    }

    fn build_all(&mut self, specs: &[TypeSpec]) -> Result<Vec<TypeId>> {
        specs.iter().map(|spec| self.build(spec)).collect()
    }

    /// Intern a function descriptor. Its generics are scoped to it.
    pub fn signature(&mut self, spec: &SignatureSpec) -> Result<TypeId> {
        let declared = self.push_generics(&spec.generics)?;
        let shape = self.signature_shape(spec);
        self.pop_generics(declared.len());
        Ok(self.ctx.function(shape?))
    }

    fn signature_shape(&mut self, spec: &SignatureSpec) -> Result<FunctionShape> {
        let mut params = Vec::with_capacity(spec.params.len());
        for param in &spec.params {
            let name = param.name.as_deref().map(|n| self.ctx.intern_string(n));
            let ty = self.build(&param.ty)?;
            params.push(if param.optional {
                ParamInfo::optional(name, ty)
            } else {
                ParamInfo::required(name, ty)
            });
        }
        let rest = match &spec.rest {
            Some(rest) => Some(RestParam {
                name: rest.name.as_deref().map(|n| self.ctx.intern_string(n)),
                type_id: self.build(&rest.ty)?,
            }),
            None => None,
        };
        let return_type = self.build(&spec.returns)?;
        Ok(FunctionShape {
            params,
            rest,
            return_type,
        })
    }

    fn symbol(&mut self, description: &str) -> SymbolId {
        if let Some(&symbol) = self.symbols.get(description) {
            return symbol;
        }
        let symbol = self.ctx.symbol(description);
        self.symbols.insert(description.to_string(), symbol);
        symbol
    }

    /// Convert a JSON value into a runtime value.
    pub fn value(&self, json: &serde_json::Value) -> Result<Value> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => Value::Number(
                n.as_f64()
                    .ok_or_else(|| anyhow!("number {n} is not representable"))?,
            ),
            serde_json::Value::String(s) => Value::string(s),
            serde_json::Value::Array(items) => {
                let items = items
                    .iter()
                    .map(|item| self.value(item))
                    .collect::<Result<Vec<_>>>()?;
                Value::array(items)
            }
            serde_json::Value::Object(map) => {
                let class = match map.get(CLASS_KEY) {
                    Some(serde_json::Value::String(name)) => Some(self.class(name)?),
                    Some(other) => bail!("`{CLASS_KEY}` must name a class, found {other}"),
                    None => None,
                };
                let mut properties = Vec::with_capacity(map.len());
                for (key, value) in map {
                    if key != CLASS_KEY {
                        properties.push((key.as_str(), self.value(value)?));
                    }
                }
                match class {
                    Some(class) => self.ctx.instance_value(class, properties),
                    None => self.ctx.object_value(properties),
                }
            }
        })
    }
}
