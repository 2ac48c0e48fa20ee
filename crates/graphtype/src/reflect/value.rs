//! Type-erased instances and boxed field values.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_graphql::dynamic::FieldValue;
use async_graphql::{Name, Value};

use super::Reflect;

/// A type-erased handle to a domain value.
///
/// Instances are what the data-access collaborator hands to the engine and
/// what nested object fields box into. Cloning is cheap.
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Instance {
    /// Wraps an owned domain value.
    pub fn new<T: Reflect>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps a shared domain value without cloning it.
    pub fn from_arc<T: Reflect>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Returns the Rust type name of the wrapped value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the wrapped value as `&dyn Any`.
    #[must_use]
    pub fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self.value.as_ref()
    }

    /// Returns the wrapped value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Uniform representation of a field value read from an instance.
///
/// Scalar values are boxed into GraphQL values, nested objects into
/// [`Instance`] handles, so heterogeneous field lists can be traversed
/// without special-casing storage.
#[derive(Debug, Clone)]
pub enum BoxedValue {
    /// Absent optional value.
    Null,
    /// A scalar value.
    Scalar(Value),
    /// An enumeration value, by variant name.
    Enum(&'static str),
    /// A nested composite value.
    Object(Instance),
    /// A collection.
    List(Vec<BoxedValue>),
}

impl BoxedValue {
    /// Boxes a composite domain value.
    pub fn object<T: Reflect>(value: T) -> Self {
        Self::Object(Instance::new(value))
    }

    /// Boxes every element of a collection.
    pub fn list<'a, T: Reflect>(items: impl IntoIterator<Item = &'a T>) -> Self {
        Self::List(items.into_iter().map(Reflect::to_boxed).collect())
    }

    /// Returns whether the value is [`BoxedValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the scalar value, if this is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the nested instance, if this is an object.
    #[must_use]
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Self::Object(instance) => Some(instance),
            _ => None,
        }
    }

    /// Converts into an async-graphql field value.
    ///
    /// Returns `None` for [`BoxedValue::Null`] so resolvers can hand the
    /// result straight back to the executor.
    #[must_use]
    pub fn into_field_value(self) -> Option<FieldValue<'static>> {
        match self {
            Self::Null => None,
            Self::Scalar(value) => Some(FieldValue::value(value)),
            Self::Enum(name) => Some(FieldValue::value(Value::Enum(Name::new(name)))),
            Self::Object(instance) => Some(FieldValue::owned_any(instance)),
            Self::List(items) => Some(FieldValue::list(
                items
                    .into_iter()
                    .map(|item| item.into_field_value().unwrap_or(FieldValue::NULL)),
            )),
        }
    }

    /// Converts into a plain GraphQL value, dropping nested objects to `null`.
    ///
    /// Used for input-role projections where only leaf values matter.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Null | Self::Object(_) => Value::Null,
            Self::Scalar(value) => value,
            Self::Enum(name) => Value::Enum(Name::new(name)),
            Self::List(items) => Value::List(items.into_iter().map(Self::into_value).collect()),
        }
    }
}
