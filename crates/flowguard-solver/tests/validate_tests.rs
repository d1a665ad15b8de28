use super::*;

fn value_path(ctx: &TypeContext) -> IdentifierPath {
    IdentifierPath::root(ctx.intern_string("value"))
}

fn collect(validator: &mut Validator<'_>, type_id: TypeId, value: &Value) -> Validation {
    let path = value_path(validator.context());
    let mut session = Validation::new();
    validator.collect_errors(&mut session, &path, type_id, value);
    session
}

#[test]
fn test_intrinsics() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);

    assert!(v.accepts(TypeId::STRING, &Value::string("x")));
    assert!(!v.accepts(TypeId::STRING, &Value::Number(1.0)));
    assert!(v.accepts(TypeId::NUMBER, &Value::Number(1.0)));
    assert!(v.accepts(TypeId::BOOLEAN, &Value::Boolean(false)));
    assert!(v.accepts(TypeId::VOID, &Value::Undefined));
    assert!(!v.accepts(TypeId::VOID, &Value::Null));
    assert!(v.accepts(TypeId::NULL, &Value::Null));
    assert!(!v.accepts(TypeId::NULL, &Value::Undefined));
    assert!(!v.accepts(TypeId::EMPTY, &Value::Undefined));
    assert!(v.accepts(TypeId::FUNCTION, &ctx.function_value("f", None)));
    assert!(!v.accepts(TypeId::FUNCTION, &Value::string("f")));

    let symbol = ctx.symbol("s");
    assert!(v.accepts(TypeId::SYMBOL, &Value::Symbol(symbol)));

    for value in [Value::Undefined, Value::Null, Value::Number(3.0), Value::string("")] {
        assert!(v.accepts(TypeId::ANY, &value));
        assert!(v.accepts(TypeId::MIXED, &value));
    }
}

#[test]
fn test_nullable_accepts_both_missing_sentinels() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let maybe = ctx.nullable(TypeId::STRING);

    assert!(v.accepts(maybe, &Value::Undefined));
    assert!(v.accepts(maybe, &Value::Null));
    assert!(v.accepts(maybe, &Value::string("x")));
    assert!(!v.accepts(maybe, &Value::Number(1.0)));
}

#[test]
fn test_literals_match_exact_values() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);

    let hi = ctx.literal_string("hi");
    assert!(v.accepts(hi, &Value::string("hi")));
    assert!(!v.accepts(hi, &Value::string("ho")));

    let one = ctx.literal_number(1.0);
    assert!(v.accepts(one, &Value::Number(1.0)));
    assert!(!v.accepts(one, &Value::Number(2.0)));

    let s1 = ctx.symbol("a");
    let s2 = ctx.symbol("a");
    let lit = ctx.symbol_literal(s1);
    assert!(v.accepts(lit, &Value::Symbol(s1)));
    assert!(!v.accepts(lit, &Value::Symbol(s2)));

    let session = collect(&mut v, hi, &Value::string("ho"));
    assert_eq!(session.errors()[0].key, MessageKey::ExpectExactValue);
}

#[test]
fn test_array_errors_carry_index_paths() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let strings = ctx.array(TypeId::STRING);

    assert!(v.accepts(strings, &Value::array(vec![Value::string("a")])));
    assert!(v.accepts(strings, &Value::array(vec![])));
    assert!(!v.accepts(strings, &Value::string("a")));

    let value = Value::array(vec![
        Value::string("a"),
        Value::Number(1.0),
        Value::Boolean(true),
    ]);
    let session = collect(&mut v, strings, &value);
    let paths: Vec<String> = session.errors().iter().map(|e| e.path.render(&ctx)).collect();
    assert_eq!(paths, vec!["value[1]", "value[2]"]);
    assert!(session.errors().iter().all(|e| e.key == MessageKey::ExpectString));
}

#[test]
fn test_tuple_arity() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let pair = ctx.tuple(vec![TypeId::STRING, TypeId::NUMBER]);

    assert!(v.accepts(pair, &Value::array(vec![Value::string("a"), Value::Number(1.0)])));
    assert!(!v.accepts(pair, &Value::array(vec![Value::string("a")])));
    assert!(!v.accepts(pair, &Value::array(vec![Value::Number(1.0), Value::string("a")])));

    let session = collect(&mut v, pair, &Value::array(vec![]));
    assert_eq!(session.errors()[0].key, MessageKey::ExpectTuple);
}

#[test]
fn test_object_properties() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let name = ctx.intern_string("name");
    let age = ctx.intern_string("age");
    let person = ctx.object(vec![
        PropertyInfo::new(name, TypeId::STRING),
        PropertyInfo::optional(age, TypeId::NUMBER),
    ]);

    assert!(v.accepts(person, &ctx.object_value(vec![("name", Value::string("a"))])));
    assert!(v.accepts(
        person,
        &ctx.object_value(vec![("name", Value::string("a")), ("extra", Value::Null)])
    ));
    assert!(!v.accepts(person, &Value::string("a")));

    let session = collect(&mut v, person, &ctx.object_value(vec![]));
    assert_eq!(session.len(), 1);
    assert_eq!(session.errors()[0].key, MessageKey::MissingProperty);
    assert_eq!(session.errors()[0].path.render(&ctx), "value.name");

    let session = collect(
        &mut v,
        person,
        &ctx.object_value(vec![("name", Value::string("a")), ("age", Value::string("old"))]),
    );
    assert_eq!(session.len(), 1);
    assert_eq!(session.errors()[0].key, MessageKey::ExpectNumber);
    assert_eq!(session.errors()[0].path.render(&ctx), "value.age");
}

#[test]
fn test_nullable_property_may_be_absent() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let note = ctx.intern_string("note");
    let shape = ctx.object(vec![PropertyInfo::new(note, ctx.nullable(TypeId::STRING))]);
    assert!(v.accepts(shape, &ctx.object_value(vec![])));
}

#[test]
fn test_exact_object_rejects_unknown_properties() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let id = ctx.intern_string("id");
    let exact = ctx.exact_object(vec![PropertyInfo::new(id, TypeId::NUMBER)]);

    assert!(v.accepts(exact, &ctx.object_value(vec![("id", Value::Number(1.0))])));
    let value = ctx.object_value(vec![("id", Value::Number(1.0)), ("extra", Value::Null)]);
    assert!(!v.accepts(exact, &value));

    let session = collect(&mut v, exact, &value);
    assert_eq!(session.len(), 1);
    assert_eq!(session.errors()[0].key, MessageKey::UnknownProperty);
    assert_eq!(session.errors()[0].path.render(&ctx), "value.extra");
}

#[test]
fn test_union_reports_one_record() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let union = ctx.union2(TypeId::STRING, TypeId::NUMBER);

    assert!(v.accepts(union, &Value::string("a")));
    assert!(v.accepts(union, &Value::Number(1.0)));

    let session = collect(&mut v, union, &Value::Boolean(true));
    assert_eq!(session.len(), 1);
    assert_eq!(session.errors()[0].key, MessageKey::NoUnionMatch);
    assert_eq!(session.errors()[0].expected, union);
}

#[test]
fn test_intersection_requires_every_member() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let a = ctx.intern_string("a");
    let b = ctx.intern_string("b");
    let both = ctx.intersection(vec![
        ctx.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]),
        ctx.object(vec![PropertyInfo::new(b, TypeId::STRING)]),
    ]);

    assert!(v.accepts(
        both,
        &ctx.object_value(vec![("a", Value::Number(1.0)), ("b", Value::string("x"))])
    ));
    assert!(!v.accepts(both, &ctx.object_value(vec![("a", Value::Number(1.0))])));
}

#[test]
fn test_class_instances() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let animal = ctx.declare_class("Animal", None);
    let dog = ctx.declare_class("Dog", Some(animal));
    let animal_type = ctx.class_instance(animal);

    assert!(v.accepts(animal_type, &ctx.instance_value(dog, vec![])));
    assert!(v.accepts(animal_type, &ctx.instance_value(animal, vec![])));
    assert!(!v.accepts(ctx.class_instance(dog), &ctx.instance_value(animal, vec![])));
    assert!(!v.accepts(animal_type, &ctx.object_value(vec![])));

    let session = collect(&mut v, animal_type, &Value::Null);
    assert_eq!(session.errors()[0].key, MessageKey::ExpectInstanceOf);
}

#[test]
fn test_this_capture() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);

    let unset = ctx.this_type(ThisCapture::Unset);
    assert!(v.accepts(unset, &Value::Number(1.0)));

    let instance = ctx.object_value(vec![]);
    let Value::Object(object) = &instance else {
        panic!("object_value builds objects");
    };
    let this_instance = ctx.this_type(ThisCapture::Instance(object.id));
    assert!(v.accepts(this_instance, &instance));
    assert!(!v.accepts(this_instance, &ctx.object_value(vec![])));

    let class = ctx.declare_class("Widget", None);
    let this_class = ctx.this_type(ThisCapture::Class(class));
    assert!(v.accepts(this_class, &Value::Class(class)));
    assert!(v.accepts(this_class, &ctx.instance_value(class, vec![])));
    assert!(!v.accepts(this_class, &Value::Null));

    let session = collect(&mut v, this_instance, &Value::Null);
    assert_eq!(session.errors()[0].key, MessageKey::ExpectThis);
}

#[test]
fn test_function_values() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let string_to_string = ctx.function(FunctionShape {
        params: vec![ParamInfo::required(None, TypeId::STRING)],
        rest: None,
        return_type: TypeId::STRING,
    });
    let number_to_string = ctx.function(FunctionShape {
        params: vec![ParamInfo::required(None, TypeId::NUMBER)],
        rest: None,
        return_type: TypeId::STRING,
    });

    assert!(v.accepts(string_to_string, &ctx.function_value("f", Some(string_to_string))));
    assert!(!v.accepts(string_to_string, &ctx.function_value("g", Some(number_to_string))));
    assert!(v.accepts(string_to_string, &ctx.function_value("h", None)));
    assert!(!v.accepts(string_to_string, &Value::string("f")));

    let session = collect(
        &mut v,
        string_to_string,
        &ctx.function_value("g", Some(number_to_string)),
    );
    assert_eq!(session.errors()[0].key, MessageKey::IncompatibleSignature);
}

#[test]
fn test_unannotated_function_binds_generics_to_any() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let t = ctx.type_parameter("T", None);
    let identity = ctx.function(FunctionShape {
        params: vec![ParamInfo::required(None, t)],
        rest: None,
        return_type: t,
    });

    assert!(v.accepts(identity, &ctx.function_value("id", None)));
    assert_eq!(v.recorded(t), Some(TypeId::ANY));
}

#[test]
fn test_unannotated_function_binds_nested_generics() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let t = ctx.type_parameter("T", None);
    let u = ctx.type_parameter("U", None);
    let bounded = ctx.type_parameter("N", Some(TypeId::NUMBER));
    let each = ctx.function(FunctionShape {
        params: vec![ParamInfo::required(None, ctx.array(t))],
        rest: Some(RestParam {
            name: None,
            type_id: ctx.array(ctx.nullable(bounded)),
        }),
        return_type: ctx.object(vec![PropertyInfo::new(ctx.intern_string("done"), u)]),
    });

    assert!(v.accepts(each, &ctx.function_value("g", None)));
    assert_eq!(v.recorded(t), Some(TypeId::ANY));
    assert_eq!(v.recorded(u), Some(TypeId::ANY));
    // A bound still gates what flows in.
    assert_eq!(v.recorded(bounded), None);
}

#[test]
fn test_collect_errors_reports_nothing_for_valid_values() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let session = collect(&mut v, TypeId::STRING, &Value::string("ok"));
    assert!(session.is_empty());

    let mut session = Validation::new();
    let path = value_path(&ctx);
    assert!(!v.collect_errors(&mut session, &path, TypeId::STRING, &Value::string("ok")));
    assert!(v.collect_errors(&mut session, &path, TypeId::STRING, &Value::Null));
    assert_eq!(session.len(), 1);
}

#[test]
fn test_assert() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);

    let value = v
        .assert(TypeId::STRING, Value::string("x"))
        .expect("string accepted");
    assert!(matches!(value, Value::String(ref s) if &**s == "x"));

    let error = v
        .assert(TypeId::STRING, Value::Number(1.0))
        .expect_err("number rejected");
    assert_eq!(error.key, MessageKey::ExpectString);
    assert_eq!(error.to_string(), "value must be a string");

    let hi = ctx.literal_string("hi");
    let error = v.assert(hi, Value::string("ho")).expect_err("literal mismatch");
    assert_eq!(error.to_string(), "value must be exactly \"hi\"");
}

#[test]
#[should_panic(expected = "was not interned")]
fn test_foreign_handle_is_a_programming_error() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    v.accepts(TypeId(9_999), &Value::Null);
}

#[test]
fn test_session_serializes_structured_records() {
    let ctx = TypeContext::new();
    let mut v = Validator::new(&ctx);
    let numbers = ctx.array(TypeId::NUMBER);
    let session = collect(&mut v, numbers, &Value::array(vec![Value::string("x")]));

    let json = serde_json::to_value(&session).expect("session serializes");
    let error = &json["errors"][0];
    assert_eq!(error["key"], "ExpectNumber");
    assert_eq!(error["expected"], TypeId::NUMBER.0);
    assert_eq!(error["path"]["segments"][1], serde_json::json!({ "Index": 0 }));
}
