//! Structural descriptors: what derivation knows about a type.
//!
//! A [`TypeDescriptor`] classifies a type into a [`Shape`] and carries the
//! description segments attached to it. Types refer to each other through
//! [`TypeRef`], either by catalog name (descriptor tables loaded at runtime)
//! or through a [`Reflect`] impl (native Rust types).
pub mod native;

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::catalog::TypeCatalog;
use crate::error::DeriveError;

pub use native::Reflect;

/// Coverage probes and outer-instance references show up as members on some
/// platforms; they are never domain fields.
static SYNTHETIC_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:this\$.*|__\$hits\$__)$").expect("static regex"));

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub shape: Shape,
    /// Description segments; `None` when the type carries no description at all.
    #[serde(default, deserialize_with = "segments")]
    pub description: Option<Vec<String>>,
}

/// Kind classification, in the order derivation tests for it.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    String,
    Integer,
    Number,
    Boolean,
    Enum {
        constants: Vec<String>,
    },
    /// Fixed-size array with a declared component type.
    Array {
        component: TypeRef,
    },
    /// Single-parameter collection (list/set); the element type comes from
    /// generic arguments.
    #[serde(rename = "list", alias = "set", alias = "collection")]
    Collection,
    Structured {
        #[serde(default)]
        members: Vec<Member>,
    },
}

/// A declared member of a structured type.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub type_args: Vec<TypeRef>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub synthetic: bool,
    #[serde(default, deserialize_with = "segments")]
    pub description: Option<Vec<String>>,
}

/// Reference to a type from a member, an array component or a generic argument.
#[derive(Clone)]
pub enum TypeRef {
    /// Resolved through a [`TypeCatalog`].
    Named { name: String, args: Vec<TypeRef> },
    /// Resolved by calling into a [`Reflect`] impl.
    Native {
        id: TypeId,
        descriptor: fn() -> TypeDescriptor,
        args: fn() -> Vec<TypeRef>,
    },
}

/// Identity of a referenced type. Display names may collide; keys do not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Named(String),
    Native(TypeId),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            description: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, Shape::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, Shape::Integer)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, Shape::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, Shape::Boolean)
    }

    pub fn collection(name: impl Into<String>) -> Self {
        Self::new(name, Shape::Collection)
    }

    pub fn structured(name: impl Into<String>) -> Self {
        Self::new(name, Shape::Structured { members: Vec::new() })
    }

    pub fn array(name: impl Into<String>, component: TypeRef) -> Self {
        Self::new(name, Shape::Array { component })
    }

    pub fn enumeration<I, S>(name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let constants = constants.into_iter().map(Into::into).collect();
        Self::new(name, Shape::Enum { constants })
    }

    /// Enum descriptor from a `strum::VariantNames` derive; constants keep
    /// declaration order.
    pub fn from_variants<E: strum::VariantNames>(name: impl Into<String>) -> Self {
        Self::enumeration(name, E::VARIANTS.iter().copied())
    }

    pub fn describe<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.description = Some(segments.into_iter().map(Into::into).collect());
        self
    }

    /// Append a member. Only structured types have members.
    pub fn member(mut self, member: Member) -> Self {
        match &mut self.shape {
            Shape::Structured { members } => members.push(member),
            other => tracing::warn!(
                type_name = %self.name,
                member = %member.name,
                "ignoring member on non-structured type ({other:?})"
            ),
        }
        self
    }

    /// Declared members, empty for anything but structured types.
    pub fn members(&self) -> &[Member] {
        match &self.shape {
            Shape::Structured { members } => members,
            _ => &[],
        }
    }

    pub fn description_text(&self) -> Option<String> {
        join_segments(self.description.as_deref())
    }
}

impl Member {
    /// Member whose declared type and generic arguments come from `T`.
    pub fn of<T: Reflect + ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::of::<T>()).with_type_args(T::type_args())
    }

    /// Member referring to a catalog type by name.
    pub fn named(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::named(type_name))
    }

    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            type_args: Vec::new(),
            is_static: false,
            synthetic: false,
            description: None,
        }
    }

    pub fn with_type_args(mut self, args: Vec<TypeRef>) -> Self {
        self.type_args = args;
        self
    }

    pub fn describe<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.description = Some(segments.into_iter().map(Into::into).collect());
        self
    }

    pub fn mark_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn mark_synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    /// False for class-level, compiler-generated and outer-instance members.
    pub fn is_domain_field(&self) -> bool {
        !self.is_static && !self.synthetic && !SYNTHETIC_NAME.is_match(&self.name)
    }

    pub fn description_text(&self) -> Option<String> {
        join_segments(self.description.as_deref())
    }
}

impl TypeRef {
    pub fn of<T: Reflect + ?Sized + 'static>() -> Self {
        TypeRef::Native {
            id: TypeId::of::<T>(),
            descriptor: T::descriptor,
            args: T::type_args,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn applied(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args,
        }
    }

    pub fn name(&self) -> Cow<'_, str> {
        match self {
            TypeRef::Named { name, .. } => Cow::Borrowed(name),
            TypeRef::Native { descriptor, .. } => Cow::Owned(descriptor().name),
        }
    }

    pub fn key(&self) -> TypeKey {
        match self {
            TypeRef::Named { name, .. } => TypeKey::Named(name.clone()),
            TypeRef::Native { id, .. } => TypeKey::Native(*id),
        }
    }

    /// Generic arguments the reference itself carries (`List<String>`).
    pub fn args(&self) -> Vec<TypeRef> {
        match self {
            TypeRef::Named { args, .. } => args.clone(),
            TypeRef::Native { args, .. } => args(),
        }
    }

    pub fn resolve<'c>(
        &self,
        catalog: &'c dyn TypeCatalog,
    ) -> Result<Cow<'c, TypeDescriptor>, DeriveError> {
        match self {
            TypeRef::Named { name, .. } => catalog
                .lookup(name)
                .map(Cow::Borrowed)
                .ok_or_else(|| DeriveError::UnknownType(name.clone())),
            TypeRef::Native { descriptor, .. } => Ok(Cow::Owned(descriptor())),
        }
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named { name, args } if args.is_empty() => write!(f, "{name}"),
            TypeRef::Named { name, args } => write!(f, "{name}{args:?}"),
            TypeRef::Native { descriptor, .. } => write!(f, "native {}", descriptor().name),
        }
    }
}

/// Catalog form: either `"String"` or `{"name": "List", "args": ["String"]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTypeRef {
    Name(String),
    Applied {
        name: String,
        #[serde(default)]
        args: Vec<RawTypeRef>,
    },
}

impl From<RawTypeRef> for TypeRef {
    fn from(raw: RawTypeRef) -> Self {
        match raw {
            RawTypeRef::Name(name) => TypeRef::named(name),
            RawTypeRef::Applied { name, args } => {
                TypeRef::applied(name, args.into_iter().map(TypeRef::from).collect())
            }
        }
    }
}

impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawTypeRef::deserialize(deserializer).map(TypeRef::from)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Segments are joined with a single space; no source means no description.
pub fn join_segments(segments: Option<&[String]>) -> Option<String> {
    segments.map(|xs| xs.join(" "))
}

/// Accept `"text"` as shorthand for `["text"]`; `null` means no description.
fn segments<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => None,
        Some(OneOrMany::One(s)) => Some(vec![s]),
        Some(OneOrMany::Many(xs)) => Some(xs),
    })
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
