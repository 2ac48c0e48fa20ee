//! Field accessor compilation.
//!
//! An accessor is compiled once per (declaring type, field) pair and reused
//! for every instance. Binding problems surface at compile time; feeding an
//! accessor an instance of the wrong type is reported at read time.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::GraphTypeError;
use crate::reflect::{BoxedValue, FieldDescriptor, Instance, Reflect, TypeDescriptor};

type ReadFn = Arc<dyn Fn(&dyn Any) -> Option<BoxedValue> + Send + Sync>;

/// Reusable reader for one field of one declaring type.
#[derive(Clone)]
pub struct FieldAccessor {
    declaring_type: TypeId,
    type_name: Arc<str>,
    field_name: Arc<str>,
    read: ReadFn,
}

impl FieldAccessor {
    /// Compiles an accessor for a field declared on `declaring`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphTypeError::Binding`] if the field belongs to another
    /// type or has no reader.
    pub fn compile(
        declaring: &TypeDescriptor,
        field: &FieldDescriptor,
    ) -> Result<Self, GraphTypeError> {
        if field.declaring_type() != declaring.id() {
            return Err(GraphTypeError::binding(
                declaring.name(),
                field.name(),
                format!("field is declared on {}", field.declaring_name()),
            ));
        }

        let read = field.reader().cloned().ok_or_else(|| {
            GraphTypeError::binding(declaring.name(), field.name(), "field has no reader")
        })?;

        Ok(Self {
            declaring_type: declaring.id(),
            type_name: Arc::from(declaring.name()),
            field_name: Arc::from(field.name()),
            read,
        })
    }

    /// Builds an accessor from a computed getter on `T`.
    ///
    /// Used by configuration callbacks to add fields that are not declared on
    /// the domain type.
    pub fn computed<T, F, G>(type_name: &str, field_name: &str, get: G) -> Self
    where
        T: Any + Send + Sync,
        F: Reflect,
        G: Fn(&T) -> F + Send + Sync + 'static,
    {
        let read: ReadFn = Arc::new(move |instance: &dyn Any| {
            instance.downcast_ref::<T>().map(|value| get(value).to_boxed())
        });
        Self {
            declaring_type: TypeId::of::<T>(),
            type_name: Arc::from(type_name),
            field_name: Arc::from(field_name),
            read,
        }
    }

    /// Returns the declaring type identity.
    #[must_use]
    pub fn declaring_type(&self) -> TypeId {
        self.declaring_type
    }

    /// Returns the declaring type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the source field name.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Reads the field from a type-erased value.
    ///
    /// # Errors
    ///
    /// Returns [`GraphTypeError::AccessorFailure`] if `instance` is not of the
    /// declaring type.
    pub fn read(&self, instance: &dyn Any) -> Result<BoxedValue, GraphTypeError> {
        (self.read)(instance).ok_or_else(|| self.mismatch("an unrelated type"))
    }

    /// Reads the field from an instance handle.
    ///
    /// # Errors
    ///
    /// Returns [`GraphTypeError::AccessorFailure`] if `instance` is not of the
    /// declaring type.
    pub fn read_instance(&self, instance: &Instance) -> Result<BoxedValue, GraphTypeError> {
        (self.read)(instance.as_any()).ok_or_else(|| self.mismatch(instance.type_name()))
    }

    fn mismatch(&self, actual: &str) -> GraphTypeError {
        GraphTypeError::AccessorFailure {
            type_name: self.type_name.to_string(),
            field: self.field_name.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl fmt::Debug for FieldAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldAccessor({}.{})", self.type_name, self.field_name)
    }
}
