//! Sample targets, registered under the path `samples`. Used by the demos and
//! the test suite.

use super::{
    builtins::{self, double_arg, int_arg, long_arg, string_arg, this, ty},
    CodeUnit, Fault, Primitive, TypeDef, TypeRef, Value,
};

pub const PATH: &str = "samples";

pub const CALCULATOR: &str = "Samples.Calculator";
pub const COUNTER: &str = "Samples.Counter";
pub const POINT: &str = "Samples.Point";
pub const GREETER: &str = "Samples.Greeter";

type NativeResult = Result<Option<Value>, Fault>;

mod calculator {
    use super::*;

    pub fn add(_: Option<&Value>, args: &[Value]) -> NativeResult {
        let sum = int_arg(args, 0)?
            .checked_add(int_arg(args, 1)?)
            .ok_or_else(builtins::overflow)?;
        Ok(Some(Value::new_int(sum)))
    }

    pub fn add_long(_: Option<&Value>, args: &[Value]) -> NativeResult {
        let sum = long_arg(args, 0)?
            .checked_add(long_arg(args, 1)?)
            .ok_or_else(builtins::overflow)?;
        Ok(Some(Value::new_long(sum)))
    }

    pub fn subtract(_: Option<&Value>, args: &[Value]) -> NativeResult {
        let difference = int_arg(args, 0)?
            .checked_sub(int_arg(args, 1)?)
            .ok_or_else(builtins::overflow)?;
        Ok(Some(Value::new_int(difference)))
    }

    pub fn multiply(_: Option<&Value>, args: &[Value]) -> NativeResult {
        let product = int_arg(args, 0)?
            .checked_mul(int_arg(args, 1)?)
            .ok_or_else(builtins::overflow)?;
        Ok(Some(Value::new_int(product)))
    }

    pub fn divide(_: Option<&Value>, args: &[Value]) -> NativeResult {
        let divisor = int_arg(args, 1)?;
        if divisor == 0 {
            return Err(builtins::divide_by_zero());
        }
        let quotient = int_arg(args, 0)?
            .checked_div(divisor)
            .ok_or_else(builtins::overflow)?;
        Ok(Some(Value::new_int(quotient)))
    }

    pub fn divide_double(_: Option<&Value>, args: &[Value]) -> NativeResult {
        Ok(Some(Value::new_double(double_arg(args, 0)? / double_arg(args, 1)?)))
    }
}

mod counter {
    use super::*;

    pub fn new(ty: &TypeRef, args: &[Value]) -> Result<Value, Fault> {
        let start = match args.first() {
            Some(_) => int_arg(args, 0)?,
            None => 0,
        };
        Ok(Value::new_object(
            ty.clone(),
            vec![("count".to_string(), Value::new_int(start))],
        ))
    }

    fn count(instance: Option<&Value>) -> Result<i32, Fault> {
        this(instance)?
            .as_object()
            .and_then(|object| object.get("count"))
            .and_then(|count| count.as_int())
            .ok_or_else(|| builtins::argument("Counter has no count"))
    }

    fn set_count(instance: Option<&Value>, count: i32) -> Result<(), Fault> {
        let object = this(instance)?
            .as_object()
            .ok_or_else(|| builtins::argument("Counter is not an object"))?;
        object.set("count", Value::new_int(count));
        Ok(())
    }

    pub fn increment(instance: Option<&Value>, _: &[Value]) -> NativeResult {
        let next = count(instance)?.checked_add(1).ok_or_else(builtins::overflow)?;
        set_count(instance, next)?;
        Ok(Some(Value::new_int(next)))
    }

    pub fn get(instance: Option<&Value>, _: &[Value]) -> NativeResult {
        Ok(Some(Value::new_int(count(instance)?)))
    }

    /// Produces no value on purpose.
    pub fn reset(instance: Option<&Value>, _: &[Value]) -> NativeResult {
        set_count(instance, 0)?;
        Ok(None)
    }
}

mod point {
    use super::*;

    pub fn new(ty: &TypeRef, args: &[Value]) -> Result<Value, Fault> {
        Ok(make(ty.clone(), int_arg(args, 0)?, int_arg(args, 1)?))
    }

    fn make(ty: TypeRef, x: i32, y: i32) -> Value {
        Value::new_object(
            ty,
            vec![
                ("x".to_string(), Value::new_int(x)),
                ("y".to_string(), Value::new_int(y)),
            ],
        )
    }

    fn coordinates(instance: Option<&Value>) -> Result<(i32, i32), Fault> {
        let object = this(instance)?
            .as_object()
            .ok_or_else(|| builtins::argument("Point is not an object"))?;
        let coordinate = |name: &str| {
            object
                .get(name)
                .and_then(|value| value.as_int())
                .ok_or_else(|| builtins::argument(format!("Point has no {name}")))
        };
        Ok((coordinate("x")?, coordinate("y")?))
    }

    pub fn translate(instance: Option<&Value>, args: &[Value]) -> NativeResult {
        let (x, y) = coordinates(instance)?;
        let x = x.checked_add(int_arg(args, 0)?).ok_or_else(builtins::overflow)?;
        let y = y.checked_add(int_arg(args, 1)?).ok_or_else(builtins::overflow)?;
        Ok(Some(make(TypeRef::declared(POINT), x, y)))
    }

    pub fn distance(instance: Option<&Value>, _: &[Value]) -> NativeResult {
        let (x, y) = coordinates(instance)?;
        Ok(Some(Value::new_double(f64::from(x).hypot(f64::from(y)))))
    }
}

mod greeter {
    use super::*;

    pub fn greet(_: Option<&Value>, args: &[Value]) -> NativeResult {
        let name = string_arg(args, 0)?;
        Ok(Some(Value::new_string(format!("Hello, {name}!"))))
    }

    pub fn initial(_: Option<&Value>, args: &[Value]) -> NativeResult {
        let name = string_arg(args, 0)?;
        let first = name
            .chars()
            .next()
            .ok_or_else(|| builtins::argument("Name cannot be empty"))?;
        Ok(Some(Value::new_char(first)))
    }
}

pub fn unit() -> CodeUnit {
    let int = || ty(Primitive::Int);
    let long = || ty(Primitive::Long);
    let double = || ty(Primitive::Double);
    let string = || ty(Primitive::String);

    CodeUnit::new(PATH)
        .with_type(
            TypeDef::declared(CALCULATOR)
                .static_method("Add", vec![int(), int()], calculator::add)
                .static_method("Add", vec![long(), long()], calculator::add_long)
                .static_method("Subtract", vec![int(), int()], calculator::subtract)
                .static_method("Multiply", vec![int(), int()], calculator::multiply)
                .static_method("Divide", vec![int(), int()], calculator::divide)
                .static_method("Divide", vec![double(), double()], calculator::divide_double),
        )
        .with_type(
            TypeDef::declared(COUNTER)
                .constructor(vec![], counter::new)
                .constructor(vec![int()], counter::new)
                .instance_method("Increment", vec![], counter::increment)
                .instance_method("Get", vec![], counter::get)
                .instance_method("Reset", vec![], counter::reset),
        )
        .with_type(
            TypeDef::declared(POINT)
                .constructor(vec![int(), int()], point::new)
                .instance_method("Translate", vec![int(), int()], point::translate)
                .instance_method("Distance", vec![], point::distance),
        )
        .with_type(
            TypeDef::declared(GREETER)
                .static_method("Greet", vec![string()], greeter::greet)
                .static_method("Initial", vec![string()], greeter::initial),
        )
}
