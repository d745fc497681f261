//! The core unit, loaded into every runtime: built-in fault types, `Math`
//! and the `string` instance methods.

use super::{CodeUnit, Fault, Primitive, TypeDef, TypeRef, Value};

pub const FAULT: &str = "Fault";
pub const DIVIDE_BY_ZERO_FAULT: &str = "DivideByZeroFault";
pub const ARGUMENT_FAULT: &str = "ArgumentFault";
pub const OVERFLOW_FAULT: &str = "OverflowFault";
pub const NULL_RETURN_FAULT: &str = "NullReturnFault";
pub const TARGET_FAULT: &str = "TargetFault";
pub const PANIC_FAULT: &str = "PanicFault";

const FAULT_TYPES: [&str; 7] = [
    FAULT,
    DIVIDE_BY_ZERO_FAULT,
    ARGUMENT_FAULT,
    OVERFLOW_FAULT,
    NULL_RETURN_FAULT,
    TARGET_FAULT,
    PANIC_FAULT,
];

pub(crate) fn ty(primitive: Primitive) -> TypeRef {
    TypeRef::Primitive(primitive)
}

/// Message used when a fault type is constructed without one.
pub fn default_message(fault_type: &str) -> String {
    match fault_type {
        DIVIDE_BY_ZERO_FAULT => "Attempted to divide by zero.".to_string(),
        ARGUMENT_FAULT => "Value does not fall within the expected range.".to_string(),
        OVERFLOW_FAULT => "Arithmetic operation resulted in an overflow.".to_string(),
        NULL_RETURN_FAULT => "Method Returned Null Value".to_string(),
        other => format!("Fault of type '{other}' was raised."),
    }
}

pub fn divide_by_zero() -> Fault {
    Fault::new(DIVIDE_BY_ZERO_FAULT, default_message(DIVIDE_BY_ZERO_FAULT))
}

pub fn overflow() -> Fault {
    Fault::new(OVERFLOW_FAULT, default_message(OVERFLOW_FAULT))
}

pub fn argument(message: impl Into<String>) -> Fault {
    Fault::new(ARGUMENT_FAULT, message)
}

pub fn null_return() -> Fault {
    Fault::new(NULL_RETURN_FAULT, default_message(NULL_RETURN_FAULT))
}

fn arg(args: &[Value], index: usize) -> Result<&Value, Fault> {
    args.get(index)
        .ok_or_else(|| argument(format!("Missing argument #{}", index + 1)))
}

pub fn int_arg(args: &[Value], index: usize) -> Result<i32, Fault> {
    let value = arg(args, index)?;
    value
        .as_int()
        .ok_or_else(|| argument(format!("Expected int, got {}", value.to_typed_string())))
}

pub fn long_arg(args: &[Value], index: usize) -> Result<i64, Fault> {
    let value = arg(args, index)?;
    value
        .as_long()
        .ok_or_else(|| argument(format!("Expected long, got {}", value.to_typed_string())))
}

pub fn double_arg(args: &[Value], index: usize) -> Result<f64, Fault> {
    let value = arg(args, index)?;
    value
        .as_double()
        .ok_or_else(|| argument(format!("Expected double, got {}", value.to_typed_string())))
}

pub fn string_arg(args: &[Value], index: usize) -> Result<&str, Fault> {
    let value = arg(args, index)?;
    value
        .as_str()
        .ok_or_else(|| argument(format!("Expected string, got {}", value.to_typed_string())))
}

/// The instance a method was dispatched against.
pub fn this(instance: Option<&Value>) -> Result<&Value, Fault> {
    instance.ok_or_else(|| Fault::new(TARGET_FAULT, "Non-static method requires a target"))
}

fn construct_fault(ty: &TypeRef, args: &[Value]) -> Result<Value, Fault> {
    let message = match args.first() {
        Some(_) => string_arg(args, 0)?.to_string(),
        None => default_message(ty.name()),
    };
    Ok(Fault::with_fields(ty.clone(), message, vec![]).value().clone())
}

mod math {
    use super::*;

    pub fn abs(_: Option<&Value>, args: &[Value]) -> Result<Option<Value>, Fault> {
        let n = int_arg(args, 0)?;
        let abs = n.checked_abs().ok_or_else(overflow)?;
        Ok(Some(Value::new_int(abs)))
    }

    pub fn max(_: Option<&Value>, args: &[Value]) -> Result<Option<Value>, Fault> {
        Ok(Some(Value::new_int(int_arg(args, 0)?.max(int_arg(args, 1)?))))
    }

    pub fn min(_: Option<&Value>, args: &[Value]) -> Result<Option<Value>, Fault> {
        Ok(Some(Value::new_int(int_arg(args, 0)?.min(int_arg(args, 1)?))))
    }

    pub fn pow(_: Option<&Value>, args: &[Value]) -> Result<Option<Value>, Fault> {
        Ok(Some(Value::new_double(double_arg(args, 0)?.powf(double_arg(args, 1)?))))
    }

    pub fn sqrt(_: Option<&Value>, args: &[Value]) -> Result<Option<Value>, Fault> {
        Ok(Some(Value::new_double(double_arg(args, 0)?.sqrt())))
    }
}

mod strings {
    use super::*;

    fn this_str(instance: Option<&Value>) -> Result<&str, Fault> {
        let value = this(instance)?;
        value
            .as_str()
            .ok_or_else(|| Fault::new(TARGET_FAULT, "Target is not a string"))
    }

    pub fn length(instance: Option<&Value>, _: &[Value]) -> Result<Option<Value>, Fault> {
        let len = this_str(instance)?.chars().count();
        let len = i32::try_from(len).map_err(|_| overflow())?;
        Ok(Some(Value::new_int(len)))
    }

    pub fn to_upper(instance: Option<&Value>, _: &[Value]) -> Result<Option<Value>, Fault> {
        Ok(Some(Value::new_string(this_str(instance)?.to_uppercase())))
    }

    pub fn to_lower(instance: Option<&Value>, _: &[Value]) -> Result<Option<Value>, Fault> {
        Ok(Some(Value::new_string(this_str(instance)?.to_lowercase())))
    }

    pub fn contains(instance: Option<&Value>, args: &[Value]) -> Result<Option<Value>, Fault> {
        let needle = string_arg(args, 0)?;
        Ok(Some(Value::new_bool(this_str(instance)?.contains(needle))))
    }

    pub fn substring(instance: Option<&Value>, args: &[Value]) -> Result<Option<Value>, Fault> {
        let s = this_str(instance)?;
        let start = int_arg(args, 0)?;
        let len = int_arg(args, 1)?;

        let (Ok(start), Ok(len)) = (usize::try_from(start), usize::try_from(len)) else {
            return Err(argument("Start index and length cannot be negative"));
        };
        if start + len > s.chars().count() {
            return Err(argument("Index and length must refer to a location within the string"));
        }

        Ok(Some(Value::new_string(s.chars().skip(start).take(len).collect::<String>())))
    }
}

pub fn unit() -> CodeUnit {
    let int = || ty(Primitive::Int);
    let double = || ty(Primitive::Double);
    let string = || ty(Primitive::String);

    let mut unit = CodeUnit::new("core")
        .with_type(
            TypeDef::declared("Math")
                .static_method("Abs", vec![int()], math::abs)
                .static_method("Max", vec![int(), int()], math::max)
                .static_method("Min", vec![int(), int()], math::min)
                .static_method("Pow", vec![double(), double()], math::pow)
                .static_method("Sqrt", vec![double()], math::sqrt),
        )
        .with_type(
            TypeDef::new(string())
                .instance_method("Length", vec![], strings::length)
                .instance_method("ToUpper", vec![], strings::to_upper)
                .instance_method("ToLower", vec![], strings::to_lower)
                .instance_method("Contains", vec![string()], strings::contains)
                .instance_method("Substring", vec![int(), int()], strings::substring),
        );

    for fault in FAULT_TYPES {
        unit = unit.with_type(
            TypeDef::declared(fault)
                .constructor(vec![], construct_fault)
                .constructor(vec![string()], construct_fault),
        );
    }

    unit
}
