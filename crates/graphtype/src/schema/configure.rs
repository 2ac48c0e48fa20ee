//! Per-type configuration callbacks.
//!
//! Callbacks are registered per domain type and scope, run in registration
//! order, and receive a [`SchemaTypeEditor`] over the placeholder that is
//! being synthesized. The editor mutates the placeholder in place; it never
//! replaces it.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use super::accessor::FieldAccessor;
use super::types::{ResolvedType, Role, SchemaField, SchemaType};
use crate::error::GraphTypeError;
use crate::reflect::{Reflect, TypeKind};
use crate::types::{ScalarKind, ScalarRegistry};

/// Roles a configuration callback applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    /// Only the query (object) role.
    Object,
    /// Only the input role.
    Input,
    /// Both roles.
    Both,
}

impl ConfigScope {
    /// Returns whether the scope covers `role`.
    #[must_use]
    pub fn covers(self, role: Role) -> bool {
        match self {
            Self::Both => true,
            Self::Object => role == Role::Query,
            Self::Input => role == Role::Input,
        }
    }
}

/// A configuration callback.
pub type Configurer = Arc<dyn Fn(&mut SchemaTypeEditor<'_>) + Send + Sync>;

struct Entry {
    scope: ConfigScope,
    configurer: Configurer,
}

/// Ordered, composable configuration callbacks keyed by domain type.
#[derive(Default)]
pub struct ConfigurationRegistry {
    entries: RwLock<HashMap<TypeId, Vec<Entry>>>,
}

impl ConfigurationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a callback for `type_id` in `scope`.
    pub fn register(&self, type_id: TypeId, scope: ConfigScope, configurer: Configurer) {
        self.entries
            .write()
            .entry(type_id)
            .or_default()
            .push(Entry { scope, configurer });
    }

    /// Returns the callbacks that apply to `type_id` in `role`, in
    /// registration order.
    #[must_use]
    pub fn resolve(&self, type_id: TypeId, role: Role) -> Vec<Configurer> {
        self.entries
            .read()
            .get(&type_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.scope.covers(role))
                    .map(|entry| entry.configurer.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns whether any callback is registered for `type_id`.
    #[must_use]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries
            .read()
            .get(&type_id)
            .is_some_and(|entries| !entries.is_empty())
    }
}

impl fmt::Debug for ConfigurationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationRegistry")
            .field("types", &self.entries.read().len())
            .finish()
    }
}

/// Mutable view of a placeholder handed to configuration callbacks.
///
/// Misuse (unknown fields, duplicates, invalid names) is collected and
/// reported by [`SchemaTypeEditor::finish`] so synthesis fails fast.
pub struct SchemaTypeEditor<'a> {
    target: &'a SchemaType,
    role: Role,
    scalars: &'a ScalarRegistry,
    errors: Vec<String>,
}

impl<'a> SchemaTypeEditor<'a> {
    pub(crate) fn new(target: &'a SchemaType, role: Role, scalars: &'a ScalarRegistry) -> Self {
        Self {
            target,
            role,
            scalars,
            errors: Vec::new(),
        }
    }

    /// Returns the role being configured.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the current type name.
    #[must_use]
    pub fn name(&self) -> String {
        self.target.name()
    }

    /// Overrides the type name. The override is used verbatim.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if !is_valid_graphql_name(&name) {
            self.errors.push(format!("'{name}' is not a valid GraphQL name"));
            return self;
        }
        if ScalarKind::is_reserved_name(&name) {
            self.errors
                .push(format!("'{name}' is reserved for a scalar or built-in type"));
            return self;
        }
        self.target.shape_mut().name = name;
        self
    }

    /// Sets the type description.
    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.target.shape_mut().description = Some(description.into());
        self
    }

    /// Returns whether a field with this schema or source name exists.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.target
            .fields()
            .iter()
            .any(|field| field.name() == name || field.source_name() == name)
    }

    /// Returns the current field names.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.target.field_names()
    }

    /// Renames a field, matched by schema or source name.
    pub fn rename_field(&mut self, from: &str, to: impl Into<String>) -> &mut Self {
        let to = to.into();
        if !is_valid_graphql_name(&to) {
            self.errors.push(format!("'{to}' is not a valid GraphQL name"));
            return self;
        }

        let target = self.target;
        let mut shape = target.shape_mut();
        let Some(index) = shape
            .fields
            .iter()
            .position(|field| field.name() == from || field.source_name() == from)
        else {
            self.errors.push(format!("cannot rename unknown field '{from}'"));
            return self;
        };
        let taken = shape
            .fields
            .iter()
            .enumerate()
            .any(|(i, field)| i != index && field.name() == to);
        if taken {
            self.errors.push(format!("field '{to}' already exists"));
            return self;
        }

        trace!(from, to = %to, "Renaming field");
        shape.fields[index].set_name(to);
        self
    }

    /// Sets a field description, matched by schema or source name.
    pub fn describe_field(&mut self, name: &str, description: impl Into<String>) -> &mut Self {
        let target = self.target;
        let mut shape = target.shape_mut();
        match shape
            .fields
            .iter_mut()
            .find(|field| field.name() == name || field.source_name() == name)
        {
            Some(field) => field.set_description(description.into()),
            None => {
                self.errors
                    .push(format!("cannot describe unknown field '{name}'"));
            }
        }
        self
    }

    /// Adds a custom field.
    pub fn add_field(&mut self, field: SchemaField) -> &mut Self {
        if !is_valid_graphql_name(field.name()) {
            self.errors
                .push(format!("'{}' is not a valid GraphQL name", field.name()));
            return self;
        }
        if let Some(accessor) = field.accessor()
            && Some(accessor.declaring_type()) != self.target.source()
        {
            self.errors.push(format!(
                "field '{}' reads from {}, not from this type",
                field.name(),
                accessor.type_name()
            ));
            return self;
        }

        let target = self.target;
        let mut shape = target.shape_mut();
        if shape.fields.iter().any(|existing| existing.name() == field.name()) {
            self.errors
                .push(format!("field '{}' already exists", field.name()));
            return self;
        }
        trace!(field = %field.name(), "Adding custom field");
        shape.fields.push(field);
        self
    }

    /// Adds a scalar field computed from the instance.
    ///
    /// The field type is taken from the getter's return type; an `Option`
    /// return makes the field nullable.
    pub fn add_computed<T, F, G>(&mut self, name: &str, get: G) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Reflect,
        G: Fn(&T) -> F + Send + Sync + 'static,
    {
        let (descriptor, nullable) = F::descriptor().unwrap_optional();
        let TypeKind::Scalar(kind) = descriptor.kind() else {
            self.errors.push(format!(
                "computed field '{name}' must return a scalar, found {}",
                descriptor.kind().label()
            ));
            return self;
        };
        let Some(scalar) = self.scalars.lookup(kind) else {
            self.errors.push(format!("scalar {kind:?} is not registered"));
            return self;
        };
        let accessor =
            FieldAccessor::computed::<T, F, G>(self.target.source_name(), name, get);
        self.add_field(SchemaField::new(
            name,
            ResolvedType::new(scalar, nullable),
            accessor,
        ))
    }

    /// Returns the shared scalar schema type for `kind`.
    #[must_use]
    pub fn scalar(&self, kind: ScalarKind) -> Option<Arc<SchemaType>> {
        self.scalars.lookup(kind)
    }

    /// Consumes the editor, failing if any edit was invalid.
    pub(crate) fn finish(self) -> Result<(), GraphTypeError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(GraphTypeError::configuration(
                self.target.source_name(),
                self.errors.join("; "),
            ))
        }
    }
}

/// Checks if a name is valid for GraphQL.
///
/// GraphQL names must match the pattern `[_a-zA-Z][_a-zA-Z0-9]*` and must
/// not use the reserved `__` prefix.
pub fn is_valid_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    if name.starts_with("__") {
        return false;
    }

    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configurer(f: impl Fn(&mut SchemaTypeEditor<'_>) + Send + Sync + 'static) -> Configurer {
        Arc::new(f)
    }

    #[test]
    fn test_scope_covers() {
        assert!(ConfigScope::Both.covers(Role::Query));
        assert!(ConfigScope::Both.covers(Role::Input));
        assert!(ConfigScope::Object.covers(Role::Query));
        assert!(!ConfigScope::Object.covers(Role::Input));
        assert!(ConfigScope::Input.covers(Role::Input));
    }

    #[test]
    fn test_resolve_keeps_registration_order() {
        let registry = ConfigurationRegistry::new();
        let id = TypeId::of::<u8>();
        registry.register(id, ConfigScope::Object, configurer(|e| {
            e.set_name("first");
        }));
        registry.register(id, ConfigScope::Input, configurer(|e| {
            e.set_name("input");
        }));
        registry.register(id, ConfigScope::Both, configurer(|e| {
            e.set_description("second");
        }));

        assert_eq!(registry.resolve(id, Role::Query).len(), 2);
        assert_eq!(registry.resolve(id, Role::Input).len(), 2);
        assert!(registry.resolve(TypeId::of::<u16>(), Role::Query).is_empty());
        assert!(registry.contains(id));

        let scalars = ScalarRegistry::new();
        let target = SchemaType::placeholder(Role::Query, id, "Byte", "byte".into(), None);
        let mut editor = SchemaTypeEditor::new(&target, Role::Query, &scalars);
        for configure in registry.resolve(id, Role::Query) {
            configure(&mut editor);
        }
        editor.finish().unwrap();
        assert_eq!(target.name(), "first");
        assert_eq!(target.description().as_deref(), Some("second"));
    }

    #[test]
    fn test_editor_collects_errors() {
        let scalars = ScalarRegistry::new();
        let target = SchemaType::placeholder(
            Role::Query,
            TypeId::of::<u8>(),
            "Byte",
            "byte".into(),
            None,
        );
        let mut editor = SchemaTypeEditor::new(&target, Role::Query, &scalars);
        editor.rename_field("missing", "other").set_name("not-valid");

        let err = editor.finish().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown field 'missing'"));
        assert!(message.contains("'not-valid' is not a valid GraphQL name"));
    }

    #[test]
    fn test_rename_to_current_name_is_allowed() {
        let scalars = ScalarRegistry::new();
        let id = TypeId::of::<u8>();
        let target = SchemaType::placeholder(Role::Query, id, "Byte", "byte".into(), None);
        let text = ResolvedType::new(scalars.lookup(ScalarKind::Text).unwrap(), false);
        target.push_field(SchemaField::new(
            "nome",
            text.clone(),
            FieldAccessor::computed::<u8, String, _>("Byte", "Nome", |b: &u8| b.to_string()),
        ));
        target.push_field(SchemaField::new(
            "cidade",
            text,
            FieldAccessor::computed::<u8, String, _>("Byte", "Cidade", |b: &u8| b.to_string()),
        ));

        let mut editor = SchemaTypeEditor::new(&target, Role::Query, &scalars);
        editor.rename_field("Nome", "nome");
        editor.rename_field("Cidade", "nome");
        let err = editor.finish().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("field 'nome' already exists"));
        assert!(!message.contains("unknown field"));
        assert_eq!(target.field_names(), vec!["nome", "cidade"]);
    }

    #[test]
    fn test_computed_field_type_follows_getter() {
        let scalars = ScalarRegistry::new();
        let id = TypeId::of::<u8>();
        let target = SchemaType::placeholder(Role::Query, id, "Byte", "byte".into(), None);

        let mut editor = SchemaTypeEditor::new(&target, Role::Query, &scalars);
        editor
            .add_computed::<u8, String, _>("label", |b: &u8| b.to_string())
            .add_computed::<u8, Option<i64>, _>("wide", |b: &u8| Some(i64::from(*b)))
            .add_computed::<u8, Vec<i32>, _>("digits", |b: &u8| vec![i32::from(*b)]);
        let err = editor.finish().unwrap_err();
        assert!(err.to_string().contains("computed field 'digits' must return a scalar"));

        let label = target.field("label").unwrap();
        assert_eq!(label.schema_type().scalar_kind(), Some(ScalarKind::Text));
        assert!(!label.is_nullable());

        let wide = target.field("wide").unwrap();
        assert_eq!(wide.schema_type().scalar_kind(), Some(ScalarKind::Long));
        assert!(wide.is_nullable());
        assert!(target.field("digits").is_none());
    }

    #[test]
    fn test_set_name_rejects_reserved_names() {
        let scalars = ScalarRegistry::new();
        let target = SchemaType::placeholder(
            Role::Query,
            TypeId::of::<u8>(),
            "Byte",
            "byte".into(),
            None,
        );
        let mut editor = SchemaTypeEditor::new(&target, Role::Query, &scalars);
        editor.set_name("Int").set_name("ID");

        let message = editor.finish().unwrap_err().to_string();
        assert!(message.contains("'Int' is reserved"));
        assert!(message.contains("'ID' is reserved"));
        assert_eq!(target.name(), "byte");
    }

    #[test]
    fn test_is_valid_graphql_name() {
        assert!(is_valid_graphql_name("legalName"));
        assert!(is_valid_graphql_name("_internal"));
        assert!(is_valid_graphql_name("Type123"));

        assert!(!is_valid_graphql_name(""));
        assert!(!is_valid_graphql_name("123Type"));
        assert!(!is_valid_graphql_name("legal-name"));
        assert!(!is_valid_graphql_name("legal name"));
        assert!(!is_valid_graphql_name("__typename"));
    }
}
