//! Synthesized schema types.
//!
//! A [`SchemaType`] is shared behind an `Arc` and compared by identity. Object
//! and input types are registered as empty placeholders before their fields
//! are built, so their name and field list live behind a lock and are filled
//! in place. Once a type leaves synthesis it is never mutated again.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockWriteGuard};

use super::accessor::FieldAccessor;
use crate::resolvers::DataSource;
use crate::types::ScalarKind;

/// Position a schema type is used in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Output position (query results).
    Query,
    /// Input position (field arguments).
    Input,
}

impl Role {
    /// Returns the schema kind composites take in this role.
    #[must_use]
    pub fn composite_kind(self) -> SchemaKind {
        match self {
            Self::Query => SchemaKind::Object,
            Self::Input => SchemaKind::InputObject,
        }
    }
}

/// Structural kind of a schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Object,
    InputObject,
    List,
    Enum,
    Scalar,
}

/// A schema type reference together with the optionality of its use site.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    /// The resolved schema type.
    pub schema_type: Arc<SchemaType>,
    /// Whether the declared type was optional.
    pub nullable: bool,
}

impl ResolvedType {
    /// Creates a new resolved type.
    #[must_use]
    pub fn new(schema_type: Arc<SchemaType>, nullable: bool) -> Self {
        Self {
            schema_type,
            nullable,
        }
    }
}

/// How a field obtains its value.
#[derive(Clone)]
pub enum FieldBinding {
    /// Read from the parent instance.
    Accessor(FieldAccessor),
    /// Fetched from a data-access collaborator (root query fields).
    Source(Arc<dyn DataSource>),
}

impl fmt::Debug for FieldBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accessor(accessor) => f.debug_tuple("Accessor").field(accessor).finish(),
            Self::Source(_) => f.write_str("Source"),
        }
    }
}

/// An argument accepted by a field.
#[derive(Debug, Clone)]
pub struct SchemaArgument {
    /// Argument name.
    pub name: String,
    /// Argument type, synthesized in the input role.
    pub resolved: ResolvedType,
}

/// A field of an object or input type.
#[derive(Debug, Clone)]
pub struct SchemaField {
    name: String,
    source_name: String,
    description: Option<String>,
    resolved: ResolvedType,
    binding: FieldBinding,
    arguments: Vec<SchemaArgument>,
}

impl SchemaField {
    /// Creates a field read through an accessor.
    #[must_use]
    pub fn new(name: impl Into<String>, resolved: ResolvedType, accessor: FieldAccessor) -> Self {
        let name = name.into();
        Self {
            source_name: accessor.field_name().to_string(),
            name,
            description: None,
            resolved,
            binding: FieldBinding::Accessor(accessor),
            arguments: Vec::new(),
        }
    }

    /// Creates a root field backed by a data source.
    #[must_use]
    pub fn sourced(
        name: impl Into<String>,
        resolved: ResolvedType,
        source: Arc<dyn DataSource>,
        arguments: Vec<SchemaArgument>,
    ) -> Self {
        let name = name.into();
        Self {
            source_name: name.clone(),
            name,
            description: None,
            resolved,
            binding: FieldBinding::Source(source),
            arguments,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name of the source field this was derived from.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the resolved field type.
    #[must_use]
    pub fn resolved(&self) -> &ResolvedType {
        &self.resolved
    }

    /// Returns the resolved schema type.
    #[must_use]
    pub fn schema_type(&self) -> &Arc<SchemaType> {
        &self.resolved.schema_type
    }

    /// Returns whether the field may be null.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.resolved.nullable
    }

    /// Returns the field binding.
    #[must_use]
    pub fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    /// Returns the accessor, for instance-bound fields.
    #[must_use]
    pub fn accessor(&self) -> Option<&FieldAccessor> {
        match &self.binding {
            FieldBinding::Accessor(accessor) => Some(accessor),
            FieldBinding::Source(_) => None,
        }
    }

    /// Returns the field arguments.
    #[must_use]
    pub fn arguments(&self) -> &[SchemaArgument] {
        &self.arguments
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = Some(description);
    }

    pub(crate) fn push_argument(&mut self, argument: SchemaArgument) {
        self.arguments.push(argument);
    }
}

/// Mutable part of a schema type, filled while the type is a placeholder.
#[derive(Debug, Default)]
pub(crate) struct TypeShape {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) fields: Vec<SchemaField>,
}

/// Queryable representation of a domain type.
pub struct SchemaType {
    kind: SchemaKind,
    role: Option<Role>,
    source: Option<TypeId>,
    source_name: String,
    shape: RwLock<TypeShape>,
    element: Option<ResolvedType>,
    values: Vec<String>,
    scalar: Option<ScalarKind>,
}

impl SchemaType {
    /// Creates the shared schema type for a scalar kind.
    pub(crate) fn scalar(kind: ScalarKind) -> Self {
        Self {
            kind: SchemaKind::Scalar,
            role: None,
            source: None,
            source_name: kind.graphql_name().to_string(),
            shape: RwLock::new(TypeShape {
                name: kind.graphql_name().to_string(),
                description: Some(kind.description().to_string()),
                fields: Vec::new(),
            }),
            element: None,
            values: Vec::new(),
            scalar: Some(kind),
        }
    }

    /// Creates an empty object or input placeholder.
    pub(crate) fn placeholder(
        role: Role,
        source: TypeId,
        source_name: &str,
        name: String,
        description: Option<String>,
    ) -> Self {
        Self {
            kind: role.composite_kind(),
            role: Some(role),
            source: Some(source),
            source_name: source_name.to_string(),
            shape: RwLock::new(TypeShape {
                name,
                description,
                fields: Vec::new(),
            }),
            element: None,
            values: Vec::new(),
            scalar: None,
        }
    }

    /// Creates an enumeration type.
    pub(crate) fn enumeration(
        role: Role,
        source: TypeId,
        source_name: &str,
        name: String,
        description: Option<String>,
        values: Vec<String>,
    ) -> Self {
        Self {
            kind: SchemaKind::Enum,
            role: Some(role),
            source: Some(source),
            source_name: source_name.to_string(),
            shape: RwLock::new(TypeShape {
                name,
                description,
                fields: Vec::new(),
            }),
            element: None,
            values,
            scalar: None,
        }
    }

    /// Creates a list type wrapping an element type.
    pub(crate) fn list(role: Role, source: TypeId, source_name: &str, element: ResolvedType) -> Self {
        Self {
            kind: SchemaKind::List,
            role: Some(role),
            source: Some(source),
            source_name: source_name.to_string(),
            shape: RwLock::new(TypeShape::default()),
            element: Some(element),
            values: Vec::new(),
            scalar: None,
        }
    }

    /// Creates the root query object.
    pub(crate) fn root(name: &str, description: Option<String>, fields: Vec<SchemaField>) -> Self {
        Self {
            kind: SchemaKind::Object,
            role: Some(Role::Query),
            source: None,
            source_name: name.to_string(),
            shape: RwLock::new(TypeShape {
                name: name.to_string(),
                description,
                fields,
            }),
            element: None,
            values: Vec::new(),
            scalar: None,
        }
    }

    /// Returns the schema kind.
    #[must_use]
    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// Returns the role, or `None` for role-agnostic scalars.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Returns the domain type this was synthesized from.
    #[must_use]
    pub fn source(&self) -> Option<TypeId> {
        self.source
    }

    /// Returns the source name of the domain type.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Returns the schema name.
    ///
    /// List names follow their element, which may still be renamed while it
    /// is a placeholder.
    #[must_use]
    pub fn name(&self) -> String {
        match &self.element {
            Some(element) => format!("[{}]", element.schema_type.name()),
            None => self.shape.read().name.clone(),
        }
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.shape.read().description.clone()
    }

    /// Returns a snapshot of the fields.
    #[must_use]
    pub fn fields(&self) -> Vec<SchemaField> {
        self.shape.read().fields.clone()
    }

    /// Returns the names of all fields, in declaration order.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.shape
            .read()
            .fields
            .iter()
            .map(|field| field.name.clone())
            .collect()
    }

    /// Looks up a field by schema name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<SchemaField> {
        self.shape
            .read()
            .fields
            .iter()
            .find(|field| field.name == name)
            .cloned()
    }

    /// Returns the element of a list type.
    #[must_use]
    pub fn element(&self) -> Option<&ResolvedType> {
        self.element.as_ref()
    }

    /// Returns the values of an enumeration type.
    #[must_use]
    pub fn enum_values(&self) -> &[String] {
        &self.values
    }

    /// Returns the scalar kind of a scalar type.
    #[must_use]
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        self.scalar
    }

    /// Returns whether this type owns a name in its role namespace.
    #[must_use]
    pub fn is_named(&self) -> bool {
        matches!(
            self.kind,
            SchemaKind::Object | SchemaKind::InputObject | SchemaKind::Enum
        )
    }

    pub(crate) fn shape_mut(&self) -> RwLockWriteGuard<'_, TypeShape> {
        self.shape.write()
    }

    pub(crate) fn push_field(&self, field: SchemaField) {
        self.shape.write().fields.push(field);
    }
}

impl fmt::Debug for SchemaType {
    // Fields may point back at this type, so only names are printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaType")
            .field("name", &self.name())
            .field("kind", &self.kind)
            .field("role", &self.role)
            .field("fields", &self.field_names())
            .finish()
    }
}
