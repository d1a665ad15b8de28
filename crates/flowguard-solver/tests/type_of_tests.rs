use super::*;

#[test]
fn test_type_of_primitives() {
    let ctx = TypeContext::new();
    assert_eq!(ctx.type_of(&Value::Undefined), TypeId::VOID);
    assert_eq!(ctx.type_of(&Value::Null), TypeId::NULL);
    assert_eq!(ctx.type_of(&Value::Boolean(true)), ctx.literal_boolean(true));
    assert_eq!(ctx.type_of(&Value::Number(2.5)), ctx.literal_number(2.5));
    assert_eq!(ctx.type_of(&Value::string("hi")), ctx.literal_string("hi"));

    let symbol = ctx.symbol("s");
    assert_eq!(ctx.type_of(&Value::Symbol(symbol)), ctx.symbol_literal(symbol));
}

#[test]
fn test_type_of_arrays() {
    let ctx = TypeContext::new();
    assert_eq!(
        ctx.type_of(&Value::array(vec![])),
        ctx.array(TypeId::EMPTY)
    );
    let mixed = Value::array(vec![Value::Number(1.0), Value::string("a")]);
    let expected = ctx.array(ctx.union2(ctx.literal_number(1.0), ctx.literal_string("a")));
    assert_eq!(ctx.type_of(&mixed), expected);
}

#[test]
fn test_type_of_objects_and_classes() {
    let ctx = TypeContext::new();
    let point = ctx.object_value(vec![("x", Value::Number(1.0))]);
    let x = ctx.intern_string("x");
    assert_eq!(
        ctx.type_of(&point),
        ctx.object(vec![PropertyInfo::new(x, ctx.literal_number(1.0))])
    );

    let class = ctx.declare_class("Point", None);
    let instance = ctx.instance_value(class, vec![]);
    assert_eq!(ctx.type_of(&instance), ctx.class_instance(class));
    assert_eq!(
        ctx.type_of(&Value::Class(class)),
        ctx.this_type(ThisCapture::Class(class))
    );
}

#[test]
fn test_type_of_functions() {
    let ctx = TypeContext::new();
    let signature = ctx.function(FunctionShape {
        params: vec![],
        rest: None,
        return_type: TypeId::STRING,
    });
    assert_eq!(ctx.type_of(&ctx.function_value("f", Some(signature))), signature);
    assert_eq!(ctx.type_of(&ctx.function_value("g", None)), TypeId::FUNCTION);
}

#[test]
fn test_widen_literal() {
    let ctx = TypeContext::new();
    assert_eq!(ctx.widen_literal(ctx.literal_string("hi")), TypeId::STRING);
    assert_eq!(ctx.widen_literal(ctx.literal_boolean(false)), TypeId::BOOLEAN);
    assert_eq!(
        ctx.widen_literal(ctx.array(ctx.literal_number(3.0))),
        ctx.array(TypeId::NUMBER)
    );
    let union = ctx.union2(ctx.literal_string("a"), ctx.literal_number(1.0));
    assert_eq!(
        ctx.widen_literal(union),
        ctx.union2(TypeId::STRING, TypeId::NUMBER)
    );
    assert_eq!(ctx.widen_literal(TypeId::NULL), TypeId::NULL);
}
