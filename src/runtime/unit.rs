use std::{
    cell::Cell,
    fmt,
    panic::{self, AssertUnwindSafe},
    rc::Rc,
    sync::Once,
};

use rustc_hash::FxHashMap as HashMap;

use super::{
    builtins::{self, PANIC_FAULT, TARGET_FAULT},
    Fault, Primitive, TypeRef, Value,
};

/// Native method body. `Ok(None)` means the call produced no usable value.
pub type MethodFn = fn(Option<&Value>, &[Value]) -> Result<Option<Value>, Fault>;

/// Native constructor body, handed the type being constructed.
pub type ConstructorFn = fn(&TypeRef, &[Value]) -> Result<Value, Fault>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    Static,
    Instance,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: Rc<str>,
    pub params: Vec<TypeRef>,
    pub receiver: Receiver,
    pub fn_ptr: MethodFn,
}

#[derive(Debug, Clone)]
pub struct Constructor {
    pub owner: TypeRef,
    pub params: Vec<TypeRef>,
    pub fn_ptr: ConstructorFn,
}

impl Constructor {
    pub fn construct(&self, args: &[Value]) -> Result<Value, Fault> {
        check_arguments(&self.params, args)?;
        guard(|| (self.fn_ptr)(&self.owner, args))
    }
}

fn format_params(params: &[TypeRef]) -> String {
    params
        .iter()
        .map(|param| param.short_name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "new {}({})", self.owner.short_name(), format_params(&self.params))
    }
}

/// A resolved method together with its owning type.
#[derive(Debug, Clone)]
pub struct Callable {
    pub owner: TypeRef,
    pub method: Method,
}

impl Callable {
    pub fn name(&self) -> &str {
        &self.method.name
    }

    pub fn invoke(&self, instance: Option<&Value>, args: &[Value]) -> Result<Option<Value>, Fault> {
        if self.method.receiver == Receiver::Instance {
            let Some(target) = instance else {
                return Err(Fault::new(TARGET_FAULT, "Non-static method requires a target"));
            };
            if target.type_ref() != self.owner {
                return Err(Fault::new(
                    TARGET_FAULT,
                    format!(
                        "Object of type {} does not match target type {}",
                        target.type_ref(),
                        self.owner
                    ),
                ));
            }
        }

        let instance = match self.method.receiver {
            Receiver::Static => None,
            Receiver::Instance => instance,
        };

        check_arguments(&self.method.params, args)?;
        guard(|| (self.method.fn_ptr)(instance, args))
    }
}

/// Arguments must match the declared parameters one to one. `object`
/// accepts any value.
fn check_arguments(params: &[TypeRef], args: &[Value]) -> Result<(), Fault> {
    if params.len() != args.len() {
        return Err(builtins::argument(format!(
            "Parameter count mismatch, expected {} but got {}",
            params.len(),
            args.len()
        )));
    }

    for (param, arg) in params.iter().zip(args) {
        let actual = arg.type_ref();
        if *param != TypeRef::Primitive(Primitive::Object) && actual != *param {
            return Err(builtins::argument(format!(
                "Object of type {actual} cannot be converted to type {param}"
            )));
        }
    }
    Ok(())
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{}({})",
            self.owner.short_name(),
            self.method.name,
            format_params(&self.method.params)
        )
    }
}

thread_local! {
    static GUARDED: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Wraps the installed panic hook so panics inside `guard` stay off stderr.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !GUARDED.get() {
                previous(info);
            }
        }));
    });
}

/// Whether the current thread is inside native code run by `guard`.
#[cfg(test)]
pub(crate) fn in_guarded_call() -> bool {
    GUARDED.get()
}

/// Runs native code, turning a panic into a `PanicFault`.
fn guard<T>(call: impl FnOnce() -> Result<T, Fault>) -> Result<T, Fault> {
    install_quiet_hook();
    let outer = GUARDED.replace(true);
    let result = panic::catch_unwind(AssertUnwindSafe(call));
    GUARDED.set(outer);

    match result {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "target panicked".to_string());
            Err(Fault::new(PANIC_FAULT, message))
        }
    }
}

#[derive(Debug)]
pub struct TypeDef {
    pub type_ref: TypeRef,
    pub constructors: Vec<Constructor>,
    pub methods: Vec<Method>,
}

impl TypeDef {
    pub fn new(type_ref: TypeRef) -> Self {
        Self {
            type_ref,
            constructors: vec![],
            methods: vec![],
        }
    }

    pub fn declared(name: &str) -> Self {
        Self::new(TypeRef::declared(name))
    }

    pub fn constructor(mut self, params: Vec<TypeRef>, fn_ptr: ConstructorFn) -> Self {
        self.constructors.push(Constructor {
            owner: self.type_ref.clone(),
            params,
            fn_ptr,
        });
        self
    }

    pub fn static_method(self, name: &str, params: Vec<TypeRef>, fn_ptr: MethodFn) -> Self {
        self.method(name, params, Receiver::Static, fn_ptr)
    }

    pub fn instance_method(self, name: &str, params: Vec<TypeRef>, fn_ptr: MethodFn) -> Self {
        self.method(name, params, Receiver::Instance, fn_ptr)
    }

    fn method(
        mut self,
        name: &str,
        params: Vec<TypeRef>,
        receiver: Receiver,
        fn_ptr: MethodFn,
    ) -> Self {
        self.methods.push(Method {
            name: Rc::from(name),
            params,
            receiver,
            fn_ptr,
        });
        self
    }

    /// Exact signature match. Arguments are never converted.
    pub fn find_method(&self, name: &str, signature: &[TypeRef]) -> Option<&Method> {
        self.methods
            .iter()
            .find(|method| &*method.name == name && method.params == signature)
    }

    pub fn find_constructor(&self, signature: &[TypeRef]) -> Option<&Constructor> {
        self.constructors
            .iter()
            .find(|constructor| constructor.params == signature)
    }
}

/// A named bundle of types, the unit of `using "<path>";`.
#[derive(Debug)]
pub struct CodeUnit {
    pub name: String,
    types: HashMap<TypeRef, TypeDef>,
}

impl CodeUnit {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            types: HashMap::default(),
        }
    }

    pub fn with_type(mut self, def: TypeDef) -> Self {
        self.types.insert(def.type_ref.clone(), def);
        self
    }

    pub fn get(&self, ty: &TypeRef) -> Option<&TypeDef> {
        self.types.get(ty)
    }

    /// Looks up a declared type by its fully qualified name.
    pub fn declares(&self, full_name: &str) -> bool {
        self.types.contains_key(&TypeRef::declared(full_name))
    }
}
