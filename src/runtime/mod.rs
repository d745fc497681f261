//! Code units, types and the values that flow through invoked targets.

use std::fmt;

use rustc_hash::FxHashMap as HashMap;
use thiserror::Error;

mod unit;
mod value;

pub mod builtins;
pub mod samples;

pub use unit::{
    Callable, CodeUnit, Constructor, ConstructorFn, Method, MethodFn, Receiver, TypeDef,
};
pub use value::{Fault, Object, Primitive, TypeRef, Value, ValueInner};

#[cfg(test)]
mod tests;

/// Longest path accepted by `using "<path>";`.
pub const MAX_PATH_LEN: usize = 260;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Code unit path cannot be empty")]
    EmptyPath,
    #[error("Code unit \"{0}\" was not found")]
    NotFound(String),
    #[error("Code unit \"{path}\" could not be loaded: {reason}")]
    LoadFailed { path: String, reason: String },
    #[error("Code unit \"{0}\" is not a valid code unit")]
    InvalidFormat(String),
    #[error("Access to code unit \"{0}\" was denied")]
    AccessDenied(String),
    #[error("Code unit path is {0} characters long, the limit is {MAX_PATH_LEN}")]
    PathTooLong(usize),
}

/// Source of code units for `using "<path>";`.
pub trait UnitLoader: fmt::Debug {
    fn load(&self, path: &str) -> Result<CodeUnit, LoadError>;
}

/// In-memory table of unit factories keyed by path.
#[derive(Debug, Default)]
pub struct StaticUnits {
    units: HashMap<String, fn() -> CodeUnit>,
}

impl StaticUnits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, factory: fn() -> CodeUnit) -> Self {
        self.units.insert(path.to_string(), factory);
        self
    }

    /// Every unit shipped with the interpreter.
    pub fn standard() -> Self {
        Self::new().with(samples::PATH, samples::unit)
    }
}

impl UnitLoader for StaticUnits {
    fn load(&self, path: &str) -> Result<CodeUnit, LoadError> {
        self.units
            .get(path)
            .map(|factory| factory())
            .ok_or_else(|| LoadError::NotFound(path.to_string()))
    }
}

/// Loaded code units, in load order. The core unit is always first.
#[derive(Debug)]
pub struct Runtime {
    loader: Box<dyn UnitLoader>,
    units: Vec<CodeUnit>,
}

impl Runtime {
    pub fn new(loader: impl UnitLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            units: vec![builtins::unit()],
        }
    }

    pub fn standard() -> Self {
        Self::new(StaticUnits::standard())
    }

    /// Loads a unit once. Loading an already loaded unit is a no-op.
    pub fn load_unit(&mut self, path: &str) -> Result<&CodeUnit, LoadError> {
        if path.is_empty() {
            return Err(LoadError::EmptyPath);
        }
        let len = path.chars().count();
        if len > MAX_PATH_LEN {
            return Err(LoadError::PathTooLong(len));
        }

        let unit = self.loader.load(path)?;
        let index = match self.units.iter().position(|loaded| loaded.name == unit.name) {
            Some(index) => index,
            None => {
                self.units.push(unit);
                self.units.len() - 1
            }
        };
        Ok(&self.units[index])
    }

    pub fn units(&self) -> &[CodeUnit] {
        &self.units
    }

    /// Resolves a type name: aliases first, then each unit in load order
    /// against each namespace prefix in registration order.
    pub fn resolve_type(&self, prefixes: &[String], name: &str) -> Option<TypeRef> {
        if let Some(primitive) = Primitive::from_alias(name) {
            return Some(TypeRef::Primitive(primitive));
        }

        self.units.iter().find_map(|unit| {
            prefixes.iter().find_map(|prefix| {
                let full_name = if prefix.is_empty() {
                    name.to_string()
                } else {
                    format!("{prefix}.{name}")
                };
                unit.declares(&full_name)
                    .then(|| TypeRef::declared(&full_name))
            })
        })
    }

    pub fn type_def(&self, ty: &TypeRef) -> Option<&TypeDef> {
        self.units.iter().find_map(|unit| unit.get(ty))
    }

    pub fn resolve_member(
        &self,
        ty: &TypeRef,
        name: &str,
        signature: &[TypeRef],
    ) -> Option<Callable> {
        let method = self.type_def(ty)?.find_method(name, signature)?;
        Some(Callable {
            owner: ty.clone(),
            method: method.clone(),
        })
    }

    pub fn resolve_constructor(&self, ty: &TypeRef, signature: &[TypeRef]) -> Option<Constructor> {
        self.type_def(ty)?.find_constructor(signature).cloned()
    }
}
