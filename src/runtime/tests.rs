use super::*;

fn prefixes(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn int() -> TypeRef {
    TypeRef::Primitive(Primitive::Int)
}

#[derive(Debug)]
struct Denied;

impl UnitLoader for Denied {
    fn load(&self, path: &str) -> Result<CodeUnit, LoadError> {
        Err(LoadError::AccessDenied(path.to_string()))
    }
}

#[test]
fn core_unit_is_always_loaded() {
    let runtime = Runtime::standard();

    assert_eq!(runtime.units().len(), 1);
    assert_eq!(runtime.units()[0].name, "core");
    assert_eq!(
        runtime.resolve_type(&prefixes(&[""]), "DivideByZeroFault"),
        Some(TypeRef::declared("DivideByZeroFault"))
    );
}

#[test]
fn aliases_resolve_before_units() {
    let runtime = Runtime::standard();

    assert_eq!(runtime.resolve_type(&[], "int"), Some(int()));
    assert_eq!(
        runtime.resolve_type(&[], "string"),
        Some(TypeRef::Primitive(Primitive::String))
    );
}

#[test]
fn namespace_prefixes_are_searched_in_order() {
    let mut runtime = Runtime::standard();

    assert_eq!(runtime.resolve_type(&prefixes(&[""]), "Calculator"), None);

    runtime.load_unit("samples").unwrap();

    assert_eq!(runtime.resolve_type(&prefixes(&[""]), "Calculator"), None);
    assert_eq!(
        runtime.resolve_type(&prefixes(&[""]), "Samples.Calculator"),
        Some(TypeRef::declared("Samples.Calculator"))
    );
    assert_eq!(
        runtime.resolve_type(&prefixes(&["", "Samples"]), "Calculator"),
        Some(TypeRef::declared("Samples.Calculator"))
    );
}

#[test]
fn loading_twice_keeps_one_copy() {
    let mut runtime = Runtime::standard();

    runtime.load_unit("samples").unwrap();
    runtime.load_unit("samples").unwrap();

    assert_eq!(runtime.units().len(), 2);
}

#[test]
fn load_errors() {
    let mut runtime = Runtime::standard();

    assert_eq!(runtime.load_unit("").unwrap_err(), LoadError::EmptyPath);
    assert_eq!(
        runtime.load_unit("nothing/here").unwrap_err(),
        LoadError::NotFound("nothing/here".to_string())
    );

    let long = "a".repeat(MAX_PATH_LEN + 1);
    assert_eq!(
        runtime.load_unit(&long).unwrap_err(),
        LoadError::PathTooLong(MAX_PATH_LEN + 1)
    );

    let mut runtime = Runtime::new(Denied);
    assert_eq!(
        runtime.load_unit("samples").unwrap_err(),
        LoadError::AccessDenied("samples".to_string())
    );
}

#[test]
fn overloads_match_exactly() {
    let mut runtime = Runtime::standard();
    runtime.load_unit("samples").unwrap();
    let calculator = TypeRef::declared(samples::CALCULATOR);
    let long = TypeRef::Primitive(Primitive::Long);

    let add = runtime
        .resolve_member(&calculator, "Add", &[int(), int()])
        .unwrap();
    assert_eq!(add.to_string(), "Calculator->Add(int, int)");

    let add_long = runtime
        .resolve_member(&calculator, "Add", &[long.clone(), long])
        .unwrap();
    let result = add_long
        .invoke(None, &[Value::new_long(1 << 40), Value::new_long(1)])
        .unwrap()
        .unwrap();
    assert_eq!(result.as_long(), Some((1 << 40) + 1));

    assert!(runtime.resolve_member(&calculator, "Add", &[int()]).is_none());
    assert!(runtime.resolve_member(&calculator, "add", &[int(), int()]).is_none());
}

#[test]
fn static_methods_raise_faults() {
    let mut runtime = Runtime::standard();
    runtime.load_unit("samples").unwrap();
    let calculator = TypeRef::declared(samples::CALCULATOR);

    let divide = runtime
        .resolve_member(&calculator, "Divide", &[int(), int()])
        .unwrap();
    let fault = divide
        .invoke(None, &[Value::new_int(1), Value::new_int(0)])
        .unwrap_err();
    assert_eq!(fault.ty(), TypeRef::declared(builtins::DIVIDE_BY_ZERO_FAULT));

    let add = runtime
        .resolve_member(&calculator, "Add", &[int(), int()])
        .unwrap();
    let fault = add
        .invoke(None, &[Value::new_int(i32::MAX), Value::new_int(1)])
        .unwrap_err();
    assert_eq!(fault.ty(), TypeRef::declared(builtins::OVERFLOW_FAULT));
}

#[test]
fn instance_methods_need_a_target() {
    let mut runtime = Runtime::standard();
    runtime.load_unit("samples").unwrap();
    let counter = TypeRef::declared(samples::COUNTER);

    let increment = runtime.resolve_member(&counter, "Increment", &[]).unwrap();
    let fault = increment.invoke(None, &[]).unwrap_err();
    assert_eq!(fault.ty(), TypeRef::declared(builtins::TARGET_FAULT));

    let wrong_target = Value::new_int(3);
    let fault = increment.invoke(Some(&wrong_target), &[]).unwrap_err();
    assert_eq!(fault.ty(), TypeRef::declared(builtins::TARGET_FAULT));
}

#[test]
fn constructed_instances_keep_state() {
    let mut runtime = Runtime::standard();
    runtime.load_unit("samples").unwrap();
    let counter = TypeRef::declared(samples::COUNTER);

    let new = runtime.resolve_constructor(&counter, &[int()]).unwrap();
    assert_eq!(new.to_string(), "new Counter(int)");

    let instance = new.construct(&[Value::new_int(41)]).unwrap();
    let increment = runtime.resolve_member(&counter, "Increment", &[]).unwrap();
    let reset = runtime.resolve_member(&counter, "Reset", &[]).unwrap();

    let next = increment.invoke(Some(&instance), &[]).unwrap().unwrap();
    assert_eq!(next.as_int(), Some(42));
    assert!(reset.invoke(Some(&instance), &[]).unwrap().is_none());
    assert_eq!(
        instance.as_object().and_then(|object| object.get("count")).and_then(|count| count.as_int()),
        Some(0)
    );
}

#[test]
fn string_methods_dispatch_on_strings() {
    let runtime = Runtime::standard();
    let string = TypeRef::Primitive(Primitive::String);

    let substring = runtime
        .resolve_member(&string, "Substring", &[int(), int()])
        .unwrap();
    let target = Value::new_string("interpreter");
    let result = substring
        .invoke(Some(&target), &[Value::new_int(5), Value::new_int(6)])
        .unwrap()
        .unwrap();
    assert_eq!(result.as_str(), Some("preter"));

    let fault = substring
        .invoke(Some(&target), &[Value::new_int(8), Value::new_int(6)])
        .unwrap_err();
    assert_eq!(fault.ty(), TypeRef::declared(builtins::ARGUMENT_FAULT));
}

#[test]
fn fault_constructors_fill_in_the_message() {
    let runtime = Runtime::standard();
    let ty = TypeRef::declared(builtins::DIVIDE_BY_ZERO_FAULT);
    let string = TypeRef::Primitive(Primitive::String);

    let fault = runtime
        .resolve_constructor(&ty, &[])
        .unwrap()
        .construct(&[])
        .unwrap();
    assert_eq!(
        fault.as_object().and_then(|object| object.get("message")).map(|m| m.to_string()),
        Some("Attempted to divide by zero.".to_string())
    );

    let fault = runtime
        .resolve_constructor(&ty, &[string])
        .unwrap()
        .construct(&[Value::new_string("boom")])
        .unwrap();
    assert_eq!(fault.to_string(), "DivideByZeroFault { message: boom }");
}

fn panics(_: Option<&Value>, _: &[Value]) -> Result<Option<Value>, Fault> {
    panic!("native code gave up")
}

#[test]
fn panics_become_faults() {
    let unit = CodeUnit::new("panicky")
        .with_type(TypeDef::declared("Panicky").static_method("Go", vec![], panics));
    let callable = Callable {
        owner: TypeRef::declared("Panicky"),
        method: unit
            .get(&TypeRef::declared("Panicky"))
            .and_then(|def| def.find_method("Go", &[]))
            .cloned()
            .unwrap(),
    };

    let fault = callable.invoke(None, &[]).unwrap_err();
    assert_eq!(fault.ty(), TypeRef::declared(builtins::PANIC_FAULT));
    assert_eq!(fault.message(), "native code gave up");
    assert!(!unit::in_guarded_call());
}

#[test]
fn arguments_must_match_the_signature() {
    let mut runtime = Runtime::standard();
    runtime.load_unit("samples").unwrap();
    let calculator = TypeRef::declared(samples::CALCULATOR);
    let add = runtime
        .resolve_member(&calculator, "Add", &[int(), int()])
        .unwrap();

    let fault = add
        .invoke(None, &[Value::new_int(2), Value::new_int(3), Value::new_int(99)])
        .unwrap_err();
    assert_eq!(fault.ty(), TypeRef::declared(builtins::ARGUMENT_FAULT));
    assert_eq!(
        fault.message(),
        "Parameter count mismatch, expected 2 but got 3"
    );

    let fault = add
        .invoke(None, &[Value::new_int(2), Value::new_string("junk")])
        .unwrap_err();
    assert_eq!(
        fault.message(),
        "Object of type string cannot be converted to type int"
    );

    let point = TypeRef::declared(samples::POINT);
    let new = runtime.resolve_constructor(&point, &[int(), int()]).unwrap();
    let fault = new.construct(&[Value::new_int(1)]).unwrap_err();
    assert_eq!(fault.ty(), TypeRef::declared(builtins::ARGUMENT_FAULT));
}

fn reports_guard_state(_: Option<&Value>, _: &[Value]) -> Result<Option<Value>, Fault> {
    Ok(Some(Value::new_bool(unit::in_guarded_call())))
}

#[test]
fn native_calls_run_with_panic_output_silenced() {
    let callable = Callable {
        owner: TypeRef::declared("Guarded"),
        method: Method {
            name: "State".into(),
            params: vec![],
            receiver: Receiver::Static,
            fn_ptr: reports_guard_state,
        },
    };

    assert!(!unit::in_guarded_call());
    let inside = callable.invoke(None, &[]).unwrap().unwrap();
    assert_eq!(inside.to_string(), "true");
    assert!(!unit::in_guarded_call());
}
