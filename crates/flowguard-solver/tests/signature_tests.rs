use super::*;
use crate::intern::TypeContext;

fn signature(
    ctx: &TypeContext,
    params: &[(&str, TypeId)],
    rest: Option<(&str, TypeId)>,
    return_type: TypeId,
) -> TypeId {
    ctx.function(FunctionShape {
        params: params
            .iter()
            .map(|&(name, type_id)| ParamInfo::required(Some(ctx.intern_string(name)), type_id))
            .collect(),
        rest: rest.map(|(name, type_id)| RestParam {
            name: Some(ctx.intern_string(name)),
            type_id,
        }),
        return_type,
    })
}

#[test]
fn test_string_to_string() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let f = signature(&ctx, &[("s", TypeId::STRING)], None, TypeId::STRING);

    assert_eq!(v.accepts_params(f, &[Value::string("x")]), Ok(true));
    assert_eq!(v.accepts_params(f, &[Value::Number(1.0)]), Ok(false));
}

#[test]
fn test_rest_parameters() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let f = signature(
        &ctx,
        &[("s", TypeId::STRING)],
        Some(("rest", ctx.array(TypeId::NUMBER))),
        ctx.array(TypeId::BOOLEAN),
    );

    let good = [Value::string("x"), Value::Number(1.0), Value::Number(2.0)];
    let bad = [Value::string("x"), Value::Number(1.0), Value::string("y")];
    assert_eq!(v.accepts_params(f, &good), Ok(true));
    assert_eq!(v.accepts_params(f, &bad), Ok(false));
    assert_eq!(v.accepts_params(f, &[Value::string("x")]), Ok(true));

    let mut session = Validation::new();
    assert_eq!(v.collect_params_errors(&mut session, f, &bad), Ok(true));
    assert_eq!(session.len(), 1);
    assert_eq!(session.errors()[0].path.render(&ctx), "rest[1]");
    assert_eq!(session.errors()[0].key, MessageKey::ExpectNumber);
}

#[test]
fn test_arity_without_rest() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let f = signature(&ctx, &[("s", TypeId::STRING)], None, TypeId::VOID);

    assert_eq!(v.accepts_params(f, &[]), Ok(false));
    assert_eq!(
        v.accepts_params(f, &[Value::string("x"), Value::string("y")]),
        Ok(false)
    );

    let mut session = Validation::new();
    let args = [Value::string("x"), Value::string("y")];
    assert_eq!(v.collect_params_errors(&mut session, f, &args), Ok(true));
    assert_eq!(session.errors()[0].key, MessageKey::UnexpectedArgument);
    assert_eq!(session.errors()[0].path.render(&ctx), "arguments[1]");
}

#[test]
fn test_absent_arguments_are_checked_as_missing() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let note = ctx.intern_string("note");
    let f = ctx.function(FunctionShape {
        params: vec![
            ParamInfo::required(None, TypeId::STRING),
            ParamInfo::required(Some(note), ctx.nullable(TypeId::STRING)),
            ParamInfo::optional(None, TypeId::NUMBER),
        ],
        rest: None,
        return_type: TypeId::VOID,
    });

    assert_eq!(v.accepts_params(f, &[Value::string("x")]), Ok(true));
    assert_eq!(
        v.accepts_params(f, &[Value::string("x"), Value::Null, Value::Undefined]),
        Ok(true)
    );
    assert_eq!(
        v.accepts_params(f, &[Value::string("x"), Value::Null, Value::string("1")]),
        Ok(false)
    );

    let mut session = Validation::new();
    assert_eq!(v.collect_params_errors(&mut session, f, &[]), Ok(true));
    assert_eq!(session.len(), 1);
    assert_eq!(session.errors()[0].path.render(&ctx), "arguments[0]");
}

#[test]
fn test_assert_params() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let f = signature(&ctx, &[("s", TypeId::STRING)], None, TypeId::STRING);

    assert_eq!(v.assert_params(f, &[Value::string("x")]), Ok(()));
    let error = v
        .assert_params(f, &[Value::Number(1.0)])
        .expect_err("number rejected");
    assert_eq!(error.to_string(), "s must be a string");

    assert_eq!(
        v.assert_params(TypeId::STRING, &[]),
        Err(AssertParamsError::Signature(SignatureError::NotAFunction(
            TypeId::STRING
        )))
    );
}

#[test]
fn test_non_function_is_a_signature_error() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    assert_eq!(
        v.accepts_params(TypeId::NUMBER, &[]),
        Err(SignatureError::NotAFunction(TypeId::NUMBER))
    );
    assert_eq!(
        v.invoke(TypeId::NUMBER, &[]),
        Err(SignatureError::NotAFunction(TypeId::NUMBER))
    );
}

#[test]
fn test_generic_identity_binds_its_return_type() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let slot = ctx.type_parameter("_", None);
    let f = signature(&ctx, &[("x", slot)], None, slot);

    v.begin_attempt();
    assert_eq!(v.accepts_params(f, &[Value::string("hi")]), Ok(true));
    assert_eq!(v.recorded(slot), Some(TypeId::STRING));

    let bound_return = v.resolve(slot);
    assert_eq!(bound_return, TypeId::STRING);
    assert!(v.accepts(bound_return, &Value::string("x")));
    assert!(!v.accepts(bound_return, &Value::Number(1.0)));

    // The slot itself keeps accepting only strings for the rest of the attempt.
    assert!(v.accepts(slot, &Value::string("again")));
    assert!(!v.accepts(slot, &Value::Number(1.0)));
    assert_eq!(v.recorded(slot), Some(TypeId::STRING));
    assert_eq!(v.accepts_params(f, &[Value::Number(2.0)]), Ok(false));
}

#[test]
fn test_invoke() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let f = signature(&ctx, &[("s", TypeId::STRING)], None, TypeId::STRING);

    assert_eq!(
        v.invoke(f, &[ctx.literal_string("a")]),
        Ok(CallResult::Success(TypeId::STRING))
    );
    assert_eq!(
        v.invoke(f, &[TypeId::NUMBER]),
        Ok(CallResult::ArgumentTypeMismatch {
            index: 0,
            expected: TypeId::STRING,
            actual: TypeId::NUMBER,
        })
    );
    assert_eq!(
        v.invoke(f, &[]),
        Ok(CallResult::ArgumentCountMismatch {
            expected_min: 1,
            expected_max: Some(1),
            actual: 0,
        })
    );
    assert_eq!(
        v.invoke(f, &[TypeId::STRING, TypeId::STRING]),
        Ok(CallResult::ArgumentCountMismatch {
            expected_min: 1,
            expected_max: Some(1),
            actual: 2,
        })
    );
}

#[test]
fn test_invoke_with_rest_and_generics() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let t = ctx.type_parameter("T", None);
    let flow = ctx.flow_into(t).expect("t is a slot");
    let f = signature(&ctx, &[], Some(("items", ctx.array(flow))), ctx.array(t));

    let result = v.invoke(f, &[ctx.literal_string("a"), ctx.literal_number(1.0)]);
    assert_eq!(
        result,
        Ok(CallResult::Success(
            ctx.array(ctx.union2(TypeId::STRING, TypeId::NUMBER))
        ))
    );

    let strict = signature(&ctx, &[], Some(("items", ctx.array(t))), ctx.array(t));
    v.begin_attempt();
    assert_eq!(
        v.invoke(strict, &[ctx.literal_string("a"), ctx.literal_number(1.0)]),
        Ok(CallResult::ArgumentTypeMismatch {
            index: 1,
            expected: t,
            actual: ctx.literal_number(1.0),
        })
    );
}

#[test]
fn test_arg_count_bounds() {
    let ctx = TypeContext::new();
    let shape = FunctionShape {
        params: vec![
            ParamInfo::required(None, TypeId::STRING),
            ParamInfo::optional(None, TypeId::STRING),
        ],
        rest: None,
        return_type: TypeId::VOID,
    };
    assert_eq!(arg_count_bounds(&shape), (1, Some(2)));

    let variadic = FunctionShape {
        rest: Some(RestParam {
            name: None,
            type_id: ctx.array(TypeId::STRING),
        }),
        ..shape
    };
    assert_eq!(arg_count_bounds(&variadic), (1, None));
}

#[test]
fn test_resolve() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let open = ctx.type_parameter("T", None);
    let bounded = ctx.type_parameter("U", Some(TypeId::NUMBER));

    assert_eq!(v.resolve(open), open);
    assert_eq!(v.resolve(bounded), TypeId::NUMBER);
    assert_eq!(v.resolve(TypeId::STRING), TypeId::STRING);

    assert!(v.accepts(open, &Value::Boolean(true)));
    let x = ctx.intern_string("x");
    let wrapped = ctx.object(vec![PropertyInfo::new(x, ctx.nullable(open))]);
    assert_eq!(
        v.resolve(wrapped),
        ctx.object(vec![PropertyInfo::new(x, ctx.nullable(TypeId::BOOLEAN))])
    );
}
