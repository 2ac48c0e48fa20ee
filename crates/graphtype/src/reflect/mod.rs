//! Static description of domain types.
//!
//! A domain type opts into schema synthesis by implementing [`Reflect`],
//! which returns a [`TypeDescriptor`] describing its shape and knows how to
//! box an instance into a [`BoxedValue`]. Nested descriptors are produced
//! lazily through function pointers, so a type may refer to itself.
//!
//! ```ignore
//! #[derive(Clone)]
//! struct Loja {
//!     nome: String,
//!     endereco: Endereco,
//! }
//!
//! impl Reflect for Loja {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::composite::<Self>("Loja", || {
//!             vec![
//!                 FieldDescriptor::new("Nome", |l: &Loja| &l.nome),
//!                 FieldDescriptor::new("Endereco", |l: &Loja| &l.endereco),
//!             ]
//!         })
//!     }
//!
//!     fn to_boxed(&self) -> BoxedValue {
//!         BoxedValue::object(self.clone())
//!     }
//! }
//! ```

mod impls;
mod value;

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

pub use value::{BoxedValue, Instance};

use crate::types::ScalarKind;

/// Capability contract for types that can be exposed through the schema.
pub trait Reflect: Send + Sync + 'static {
    /// Describes the shape of the type.
    fn descriptor() -> TypeDescriptor;

    /// Boxes this value into the uniform field representation.
    ///
    /// Composites usually box through [`BoxedValue::object`], which clones
    /// the value and everything it owns on every read. Deep or recursive
    /// types should hold children as `Arc<T>`; those box by reference count.
    fn to_boxed(&self) -> BoxedValue;
}

/// Structural classification of a domain type.
#[derive(Clone, Copy)]
pub enum TypeKind {
    /// A primitive value backed by the scalar registry.
    Scalar(ScalarKind),
    /// An optional wrapper around another type.
    Optional(fn() -> TypeDescriptor),
    /// A homogeneous collection of another type.
    Collection(fn() -> TypeDescriptor),
    /// An enumeration with named values.
    Enumeration(&'static [&'static str]),
    /// A composite type with declared fields.
    Composite(fn() -> Vec<FieldDescriptor>),
}

impl TypeKind {
    /// Short label used in diagnostics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Optional(_) => "optional",
            Self::Collection(_) => "collection",
            Self::Enumeration(_) => "enumeration",
            Self::Composite(_) => "composite",
        }
    }
}

impl fmt::Debug for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => f.debug_tuple("Scalar").field(kind).finish(),
            Self::Enumeration(values) => f.debug_tuple("Enumeration").field(values).finish(),
            other => f.write_str(other.label()),
        }
    }
}

/// Runtime handle describing one domain type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
    description: Option<&'static str>,
    kind: TypeKind,
}

impl TypeDescriptor {
    /// Describes a scalar type.
    pub fn scalar<T: 'static>(name: &'static str, kind: ScalarKind) -> Self {
        Self::with_kind::<T>(name, TypeKind::Scalar(kind))
    }

    /// Describes an optional wrapper.
    pub fn optional<T: 'static>(inner: fn() -> TypeDescriptor) -> Self {
        Self::with_kind::<T>(std::any::type_name::<T>(), TypeKind::Optional(inner))
    }

    /// Describes a homogeneous collection.
    pub fn collection<T: 'static>(element: fn() -> TypeDescriptor) -> Self {
        Self::with_kind::<T>(std::any::type_name::<T>(), TypeKind::Collection(element))
    }

    /// Describes an enumeration by its value names.
    pub fn enumeration<T: 'static>(name: &'static str, values: &'static [&'static str]) -> Self {
        Self::with_kind::<T>(name, TypeKind::Enumeration(values))
    }

    /// Describes a composite type by its declared fields.
    pub fn composite<T: 'static>(name: &'static str, fields: fn() -> Vec<FieldDescriptor>) -> Self {
        Self::with_kind::<T>(name, TypeKind::Composite(fields))
    }

    fn with_kind<T: 'static>(name: &'static str, kind: TypeKind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name,
            description: None,
            kind,
        }
    }

    /// Attaches a description, carried into the synthesized schema type.
    #[must_use]
    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Returns the type identity used as cache key.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the source name of the type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&'static str> {
        self.description
    }

    /// Returns the structural kind.
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Strips optional wrappers, returning the underlying type and whether
    /// any wrapper was present.
    #[must_use]
    pub fn unwrap_optional(&self) -> (TypeDescriptor, bool) {
        let mut current = self.clone();
        let mut optional = false;
        while let TypeKind::Optional(inner) = current.kind {
            current = inner();
            optional = true;
        }
        (current, optional)
    }
}

type Reader = Arc<dyn Fn(&dyn Any) -> Option<BoxedValue> + Send + Sync>;

/// A field declared on a composite type.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    description: Option<&'static str>,
    field_type: fn() -> TypeDescriptor,
    declaring_type: TypeId,
    declaring_name: &'static str,
    reader: Option<Reader>,
}

impl FieldDescriptor {
    /// Declares a readable field.
    ///
    /// The getter is erased into a reader over `&dyn Any` that yields `None`
    /// when handed anything other than a `T`.
    pub fn new<T, F, G>(name: &'static str, get: G) -> Self
    where
        T: Any + Send + Sync,
        F: Reflect,
        G: Fn(&T) -> &F + Send + Sync + 'static,
    {
        let reader: Reader = Arc::new(move |instance: &dyn Any| {
            instance.downcast_ref::<T>().map(|value| get(value).to_boxed())
        });
        Self {
            name,
            description: None,
            field_type: F::descriptor,
            declaring_type: TypeId::of::<T>(),
            declaring_name: std::any::type_name::<T>(),
            reader: Some(reader),
        }
    }

    /// Declares a field that is part of the shape but has no reader.
    ///
    /// Compiling an accessor for such a field fails with a binding error.
    pub fn write_only<T, F>(name: &'static str) -> Self
    where
        T: Any + Send + Sync,
        F: Reflect,
    {
        Self {
            name,
            description: None,
            field_type: F::descriptor,
            declaring_type: TypeId::of::<T>(),
            declaring_name: std::any::type_name::<T>(),
            reader: None,
        }
    }

    /// Attaches a description.
    #[must_use]
    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Returns the source name of the field.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&'static str> {
        self.description
    }

    /// Describes the declared field type.
    #[must_use]
    pub fn field_type(&self) -> TypeDescriptor {
        (self.field_type)()
    }

    /// Returns the identity of the declaring type.
    #[must_use]
    pub fn declaring_type(&self) -> TypeId {
        self.declaring_type
    }

    /// Returns the Rust name of the declaring type.
    #[must_use]
    pub fn declaring_name(&self) -> &'static str {
        self.declaring_name
    }

    pub(crate) fn reader(&self) -> Option<&Reader> {
        self.reader.as_ref()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("declaring_name", &self.declaring_name)
            .field("readable", &self.reader.is_some())
            .finish()
    }
}

/// Implements [`Reflect`] for a fieldless enum.
///
/// ```ignore
/// #[derive(Clone, Copy)]
/// enum Status { Active, Closed }
///
/// reflect_enum!(Status { Active, Closed });
/// ```
#[macro_export]
macro_rules! reflect_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::reflect::Reflect for $ty {
            fn descriptor() -> $crate::reflect::TypeDescriptor {
                $crate::reflect::TypeDescriptor::enumeration::<Self>(
                    stringify!($ty),
                    &[$(stringify!($variant)),+],
                )
            }

            fn to_boxed(&self) -> $crate::reflect::BoxedValue {
                match self {
                    $(Self::$variant => $crate::reflect::BoxedValue::Enum(stringify!($variant)),)+
                }
            }
        }
    };
}
