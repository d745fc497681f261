use std::{
    cell::{BorrowError, Ref, RefCell},
    fmt,
    ops::Deref,
    rc::Rc,
};

/// Built-in types, named by their TDL alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Byte,
    Char,
    Short,
    Int,
    UInt,
    Long,
    Float,
    Double,
    String,
    Object,
    /// The type of a type reference. Has no alias.
    Type,
}

impl Primitive {
    pub fn from_alias(alias: &str) -> Option<Self> {
        let primitive = match alias {
            "bool" => Primitive::Bool,
            "byte" => Primitive::Byte,
            "char" => Primitive::Char,
            "short" => Primitive::Short,
            "int" => Primitive::Int,
            "uint" => Primitive::UInt,
            "long" => Primitive::Long,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            "string" => Primitive::String,
            "object" => Primitive::Object,
            _ => return None,
        };
        Some(primitive)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::UInt => "uint",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::String => "string",
            Primitive::Object => "object",
            Primitive::Type => "type",
        }
    }
}

/// Identity of a type: a built-in alias or a fully qualified declared name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(Primitive),
    Declared(Rc<str>),
}

impl TypeRef {
    pub fn declared(name: &str) -> Self {
        TypeRef::Declared(Rc::from(name))
    }

    pub fn name(&self) -> &str {
        match self {
            TypeRef::Primitive(primitive) => primitive.name(),
            TypeRef::Declared(name) => name,
        }
    }

    /// Name without its namespace.
    pub fn short_name(&self) -> &str {
        let name = self.name();
        name.rsplit('.').next().unwrap_or(name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An instance of a declared type.
#[derive(Debug)]
pub struct Object {
    ty: TypeRef,
    fields: RefCell<Vec<(String, Value)>>,
}

impl Object {
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn fields(&self) -> Result<Ref<'_, Vec<(String, Value)>>, BorrowError> {
        self.fields.try_borrow()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let fields = self.fields.try_borrow().ok()?;
        fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.clone())
    }

    /// Replaces an existing field or appends a new one.
    pub fn set(&self, name: &str, value: Value) {
        let mut fields = self.fields.borrow_mut();
        match fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, slot)) => *slot = value,
            None => fields.push((name.to_string(), value)),
        }
    }
}

/// A runtime value. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Value {
    pub(crate) inner: Rc<ValueInner>,
}

#[derive(Debug)]
pub enum ValueInner {
    Bool(bool),
    Byte(u8),
    Char(char),
    Short(i16),
    Int(i32),
    UInt(u32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Type(TypeRef),
    Object(Object),
}

impl Deref for Value {
    type Target = ValueInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Value {
    fn from_inner(inner: ValueInner) -> Self {
        Self {
            inner: Rc::new(inner),
        }
    }

    pub fn new_bool(b: bool) -> Self {
        Self::from_inner(ValueInner::Bool(b))
    }

    pub fn new_byte(n: u8) -> Self {
        Self::from_inner(ValueInner::Byte(n))
    }

    pub fn new_char(c: char) -> Self {
        Self::from_inner(ValueInner::Char(c))
    }

    pub fn new_short(n: i16) -> Self {
        Self::from_inner(ValueInner::Short(n))
    }

    pub fn new_int(n: i32) -> Self {
        Self::from_inner(ValueInner::Int(n))
    }

    pub fn new_uint(n: u32) -> Self {
        Self::from_inner(ValueInner::UInt(n))
    }

    pub fn new_long(n: i64) -> Self {
        Self::from_inner(ValueInner::Long(n))
    }

    pub fn new_float(n: f32) -> Self {
        Self::from_inner(ValueInner::Float(n))
    }

    pub fn new_double(n: f64) -> Self {
        Self::from_inner(ValueInner::Double(n))
    }

    pub fn new_string(s: impl Into<String>) -> Self {
        Self::from_inner(ValueInner::String(s.into()))
    }

    pub fn new_type(ty: TypeRef) -> Self {
        Self::from_inner(ValueInner::Type(ty))
    }

    pub fn new_object(ty: TypeRef, fields: Vec<(String, Value)>) -> Self {
        Self::from_inner(ValueInner::Object(Object {
            ty,
            fields: RefCell::new(fields),
        }))
    }

    /// The runtime type, used for overload inference and type-match expectations.
    pub fn type_ref(&self) -> TypeRef {
        let primitive = match &**self {
            ValueInner::Bool(_) => Primitive::Bool,
            ValueInner::Byte(_) => Primitive::Byte,
            ValueInner::Char(_) => Primitive::Char,
            ValueInner::Short(_) => Primitive::Short,
            ValueInner::Int(_) => Primitive::Int,
            ValueInner::UInt(_) => Primitive::UInt,
            ValueInner::Long(_) => Primitive::Long,
            ValueInner::Float(_) => Primitive::Float,
            ValueInner::Double(_) => Primitive::Double,
            ValueInner::String(_) => Primitive::String,
            ValueInner::Type(_) => Primitive::Type,
            ValueInner::Object(object) => return object.ty.clone(),
        };
        TypeRef::Primitive(primitive)
    }

    pub fn as_int(&self) -> Option<i32> {
        match &**self {
            ValueInner::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match &**self {
            ValueInner::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match &**self {
            ValueInner::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &**self {
            ValueInner::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeRef> {
        match &**self {
            ValueInner::Type(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match &**self {
            ValueInner::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn ptr_eq(&self, other: &Value) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// `<type>(value)`, the form used in reports.
    pub fn to_typed_string(&self) -> String {
        format!("<{}>({})", self.type_ref().short_name(), self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &**self {
            ValueInner::Bool(b) => write!(f, "{b}"),
            ValueInner::Byte(n) => write!(f, "{n}"),
            ValueInner::Char(c) => write!(f, "{c}"),
            ValueInner::Short(n) => write!(f, "{n}"),
            ValueInner::Int(n) => write!(f, "{n}"),
            ValueInner::UInt(n) => write!(f, "{n}"),
            ValueInner::Long(n) => write!(f, "{n}"),
            ValueInner::Float(n) => write!(f, "{n}"),
            ValueInner::Double(n) => write!(f, "{n}"),
            ValueInner::String(s) => write!(f, "{s}"),
            ValueInner::Type(ty) => write!(f, "{ty}"),
            ValueInner::Object(object) => {
                let Ok(fields) = object.fields() else {
                    return write!(f, "{} {{ .. }}", object.ty.short_name());
                };
                let fields: Vec<String> = fields
                    .iter()
                    .map(|(name, value)| format!("{name}: {value}"))
                    .collect();
                write!(f, "{} {{ {} }}", object.ty.short_name(), fields.join(", "))
            }
        }
    }
}

/// A fault raised by an invoked target. Faults are objects of a fault type
/// carrying at least a `message` field.
#[derive(Debug, Clone)]
pub struct Fault {
    value: Value,
}

impl Fault {
    pub fn new(ty: &str, message: impl Into<String>) -> Self {
        Self::with_fields(TypeRef::declared(ty), message, vec![])
    }

    pub fn with_fields(
        ty: TypeRef,
        message: impl Into<String>,
        extra: Vec<(String, Value)>,
    ) -> Self {
        let mut fields = vec![("message".to_string(), Value::new_string(message))];
        fields.extend(extra);
        Self {
            value: Value::new_object(ty, fields),
        }
    }

    pub fn ty(&self) -> TypeRef {
        self.value.type_ref()
    }

    pub fn message(&self) -> String {
        self.value
            .as_object()
            .and_then(|object| object.get("message"))
            .map(|message| message.to_string())
            .unwrap_or_default()
    }

    /// The fault as a comparable value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.ty().short_name(), self.message())
    }
}
