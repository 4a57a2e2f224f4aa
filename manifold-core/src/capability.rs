//! Capability and type-signature descriptors.
//!
//! A dispatch registration is keyed by a [`Capability`] (the abstract
//! operation name, e.g. `"GET"`) plus a [`Signature`]: an ordered tuple of
//! argument type descriptors. Signatures carry [`TypeSpec`]s rather than
//! bare `TypeId`s so a registration can match either one exact runtime type,
//! a declared supertype of it, or any type at all.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An abstract operation name, dispatched polymorphically by argument
/// run-time type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capability(String);

impl Capability {
    /// Create a capability from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The capability name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Capability {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A run-time type descriptor: a `TypeId` plus the type name for
/// diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    /// Describe the type `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The type's `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type's name, for diagnostics only.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

// Identity is the TypeId; the name is determined by it.
impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Trailing path segment reads better in error messages.
        f.write_str(self.name.rsplit("::").next().unwrap_or(self.name))
    }
}

/// One argument position of a registration signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSpec {
    /// Matches the named type exactly, or any declared subtype of it.
    Is(TypeInfo),
    /// Matches every type. Least specific; loses to any concrete match.
    Any,
}

impl TypeSpec {
    /// A spec matching `T` (or declared subtypes of `T`).
    pub fn is_type<T: 'static>() -> Self {
        Self::Is(TypeInfo::of::<T>())
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Is(info) => info.fmt(f),
            TypeSpec::Any => f.write_str("Any"),
        }
    }
}

/// An ordered tuple of argument type descriptors.
///
/// Together with a [`Capability`] this forms the identity under which view
/// registrations can conflict.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(Vec<TypeSpec>);

impl Signature {
    /// Create a signature from argument specs.
    pub fn new(specs: Vec<TypeSpec>) -> Self {
        Self(specs)
    }

    /// The common single-argument signature: dispatch on one model type.
    pub fn single<T: 'static>() -> Self {
        Self(vec![TypeSpec::is_type::<T>()])
    }

    /// The argument specs in order.
    pub fn specs(&self) -> &[TypeSpec] {
        &self.0
    }

    /// Number of argument positions.
    pub fn arity(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, spec) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            spec.fmt(f)?;
        }
        f.write_str(")")
    }
}
