use super::*;

#[test]
fn test_format_leaves() {
    let ctx = TypeContext::new();
    assert_eq!(ctx.format_type(TypeId::STRING), "string");
    assert_eq!(ctx.format_type(TypeId::VOID), "void");
    assert_eq!(ctx.format_type(ctx.literal_string("hi")), "\"hi\"");
    assert_eq!(ctx.format_type(ctx.literal_number(1.0)), "1");
    assert_eq!(ctx.format_type(ctx.literal_boolean(true)), "true");
}

#[test]
fn test_format_composites() {
    let ctx = TypeContext::new();
    let union = ctx.union2(TypeId::STRING, TypeId::NUMBER);
    assert_eq!(ctx.format_type(union), "number | string");
    assert_eq!(ctx.format_type(ctx.array(union)), "(number | string)[]");
    assert_eq!(ctx.format_type(ctx.nullable(TypeId::STRING)), "?string");
    assert_eq!(
        ctx.format_type(ctx.tuple(vec![TypeId::STRING, TypeId::BOOLEAN])),
        "[string, boolean]"
    );

    let name = ctx.intern_string("name");
    let age = ctx.intern_string("age");
    let object = ctx.object(vec![
        PropertyInfo::new(name, TypeId::STRING),
        PropertyInfo::optional(age, TypeId::NUMBER),
    ]);
    let text = ctx.format_type(object);
    assert!(text.contains("name: string"), "{text}");
    assert!(text.contains("age?: number"), "{text}");
}

#[test]
fn test_format_function() {
    let ctx = TypeContext::new();
    let s = ctx.intern_string("s");
    let rest = ctx.intern_string("rest");
    let function = ctx.function(FunctionShape {
        params: vec![ParamInfo::required(Some(s), TypeId::STRING)],
        rest: Some(RestParam {
            name: Some(rest),
            type_id: ctx.array(TypeId::NUMBER),
        }),
        return_type: ctx.array(TypeId::BOOLEAN),
    });
    assert_eq!(
        ctx.format_type(function),
        "(s: string, ...rest: number[]) => boolean[]"
    );
}

#[test]
fn test_format_named_entities() {
    let ctx = TypeContext::new();
    let class = ctx.declare_class("User", None);
    assert_eq!(ctx.format_type(ctx.class_instance(class)), "User");
    let t = ctx.type_parameter("T", None);
    assert_eq!(ctx.format_type(t), "T");
}
