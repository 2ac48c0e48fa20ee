//! Type synthesis and the type cache.
//!
//! Every `(domain type, role)` key moves through `unseen -> synthesizing ->
//! cached`. Composite types are staged as empty placeholders before their
//! fields are derived, so a type that reaches itself (directly or through a
//! collection) resolves to the same placeholder instead of recursing.
//!
//! First-time synthesis is serialized by a single mutex. Types created during
//! one run are staged in a [`Session`] and published to the shared cache only
//! when the whole run succeeds; a failed run discards everything it staged.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::accessor::FieldAccessor;
use super::configure::{ConfigScope, Configurer, ConfigurationRegistry, SchemaTypeEditor};
use super::types::{ResolvedType, Role, SchemaKind, SchemaField, SchemaType};
use crate::error::GraphTypeError;
use crate::reflect::{FieldDescriptor, TypeDescriptor, TypeKind};
use crate::types::{ScalarKind, ScalarRegistry};

/// Cache key: one schema type per domain type per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    pub type_id: TypeId,
    pub role: Role,
}

impl TypeKey {
    #[must_use]
    pub fn new(type_id: TypeId, role: Role) -> Self {
        Self { type_id, role }
    }
}

/// Lifecycle of a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisState {
    /// Never synthesized, or the last attempt failed.
    Unseen,
    /// A synthesis run currently holds a placeholder for the key.
    Synthesizing,
    /// Published to the shared cache.
    Cached,
}

/// Claimed name in a role namespace.
#[derive(Debug, Clone)]
struct NameOwner {
    type_id: TypeId,
    source_name: String,
}

/// Derives and caches schema types for domain types.
///
/// Configuration callbacks run while the synthesis mutex is held, so a
/// callback must not call back into the synthesizer or its provider.
pub struct TypeSynthesizer {
    cache: DashMap<TypeKey, Arc<SchemaType>>,
    names: DashMap<(Role, String), NameOwner>,
    in_flight: DashSet<TypeKey>,
    synthesis: Mutex<()>,
}

impl TypeSynthesizer {
    /// Creates a synthesizer with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
            names: DashMap::new(),
            in_flight: DashSet::new(),
            synthesis: Mutex::new(()),
        }
    }

    /// Resolves a descriptor to a schema type, synthesizing it on first use.
    ///
    /// Optional wrappers are stripped and reported through
    /// [`ResolvedType::nullable`]. Scalars come straight from the registry.
    ///
    /// # Errors
    ///
    /// Returns the first [`GraphTypeError`] raised while synthesizing the type
    /// or anything it reaches. Nothing from a failed run is cached.
    pub fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        role: Role,
        scalars: &ScalarRegistry,
        configuration: &ConfigurationRegistry,
    ) -> Result<ResolvedType, GraphTypeError> {
        let (underlying, nullable) = descriptor.unwrap_optional();

        if let TypeKind::Scalar(kind) = underlying.kind() {
            let scalar = scalars.lookup(kind).ok_or_else(|| {
                GraphTypeError::synthesis(underlying.name(), format!("scalar {kind:?} is not registered"))
            })?;
            return Ok(ResolvedType::new(scalar, nullable));
        }

        let key = TypeKey::new(underlying.id(), role);
        if let Some(cached) = self.cached(&key) {
            trace!(type_name = underlying.name(), ?role, "Type cache hit");
            return Ok(ResolvedType::new(cached, nullable));
        }

        let _guard = self.synthesis.lock();
        let mut session = Session::new(self, scalars, configuration);
        match session.resolve(&underlying, role) {
            Ok(resolved) => {
                let staged = session.commit();
                debug!(
                    type_name = underlying.name(),
                    ?role,
                    staged,
                    "Synthesis complete"
                );
                Ok(ResolvedType::new(resolved.schema_type, nullable))
            }
            Err(err) => {
                warn!(
                    type_name = underlying.name(),
                    ?role,
                    error = %err,
                    "Synthesis failed, discarding staged types"
                );
                Err(err)
            }
        }
    }

    /// Returns the lifecycle state of a key.
    #[must_use]
    pub fn state(&self, key: &TypeKey) -> SynthesisState {
        if self.cache.contains_key(key) {
            SynthesisState::Cached
        } else if self.in_flight.contains(key) {
            SynthesisState::Synthesizing
        } else {
            SynthesisState::Unseen
        }
    }

    /// Returns the cached schema type for a key.
    #[must_use]
    pub fn cached(&self, key: &TypeKey) -> Option<Arc<SchemaType>> {
        self.cache.get(key).map(|entry| entry.value().clone())
    }

    /// Returns the number of cached schema types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Registers a configuration callback unless an affected key is cached.
    ///
    /// Runs under the synthesis mutex so a registration cannot slip in
    /// between a run reading the callbacks and publishing its types.
    pub(crate) fn register_configuration(
        &self,
        configuration: &ConfigurationRegistry,
        type_id: TypeId,
        type_name: &str,
        scope: ConfigScope,
        configurer: Configurer,
    ) -> Result<(), GraphTypeError> {
        let _guard = self.synthesis.lock();
        for role in [Role::Query, Role::Input] {
            if scope.covers(role) && self.cache.contains_key(&TypeKey::new(type_id, role)) {
                return Err(GraphTypeError::configuration(
                    type_name,
                    format!("type is already synthesized for the {role:?} role"),
                ));
            }
        }
        configuration.register(type_id, scope, configurer);
        debug!(type_name, ?scope, "Registered type configuration");
        Ok(())
    }
}

impl Default for TypeSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeSynthesizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSynthesizer")
            .field("cached", &self.cache.len())
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

/// One synthesis run. Holds everything it creates until [`Session::commit`].
struct Session<'a> {
    synthesizer: &'a TypeSynthesizer,
    scalars: &'a ScalarRegistry,
    configuration: &'a ConfigurationRegistry,
    staged: HashMap<TypeKey, Arc<SchemaType>>,
    names: HashMap<(Role, String), NameOwner>,
}

impl<'a> Session<'a> {
    fn new(
        synthesizer: &'a TypeSynthesizer,
        scalars: &'a ScalarRegistry,
        configuration: &'a ConfigurationRegistry,
    ) -> Self {
        Self {
            synthesizer,
            scalars,
            configuration,
            staged: HashMap::new(),
            names: HashMap::new(),
        }
    }

    fn lookup(&self, key: &TypeKey) -> Option<Arc<SchemaType>> {
        self.staged
            .get(key)
            .cloned()
            .or_else(|| self.synthesizer.cached(key))
    }

    fn stage(&mut self, key: TypeKey, schema_type: Arc<SchemaType>) {
        self.synthesizer.in_flight.insert(key);
        self.staged.insert(key, schema_type);
    }

    fn resolve(&mut self, descriptor: &TypeDescriptor, role: Role) -> Result<ResolvedType, GraphTypeError> {
        let (underlying, nullable) = descriptor.unwrap_optional();
        let schema_type = self.classify(&underlying, role)?;
        Ok(ResolvedType::new(schema_type, nullable))
    }

    fn classify(
        &mut self,
        descriptor: &TypeDescriptor,
        role: Role,
    ) -> Result<Arc<SchemaType>, GraphTypeError> {
        if let TypeKind::Scalar(kind) = descriptor.kind() {
            return self.scalars.lookup(kind).ok_or_else(|| {
                GraphTypeError::synthesis(descriptor.name(), format!("scalar {kind:?} is not registered"))
            });
        }

        let key = TypeKey::new(descriptor.id(), role);
        if let Some(existing) = self.lookup(&key) {
            return Ok(existing);
        }

        match descriptor.kind() {
            TypeKind::Enumeration(values) => self.enumeration(descriptor, values, key),
            TypeKind::Collection(element) => self.collection(descriptor, element(), key),
            TypeKind::Composite(fields) => self.composite(descriptor, fields(), key),
            other => Err(GraphTypeError::synthesis(
                descriptor.name(),
                format!("cannot classify {} type", other.label()),
            )),
        }
    }

    fn enumeration(
        &mut self,
        descriptor: &TypeDescriptor,
        values: &[&str],
        key: TypeKey,
    ) -> Result<Arc<SchemaType>, GraphTypeError> {
        if values.is_empty() {
            return Err(GraphTypeError::synthesis(
                descriptor.name(),
                "enumeration has no values",
            ));
        }

        let name = descriptor.name().to_lowercase();
        self.claim_name(key.role, &name, descriptor)?;
        let schema_type = Arc::new(SchemaType::enumeration(
            key.role,
            descriptor.id(),
            descriptor.name(),
            name,
            descriptor.description().map(str::to_string),
            values.iter().map(|value| (*value).to_string()).collect(),
        ));
        trace!(type_name = descriptor.name(), role = ?key.role, "Staged enumeration");
        self.stage(key, schema_type.clone());
        Ok(schema_type)
    }

    fn collection(
        &mut self,
        descriptor: &TypeDescriptor,
        element: TypeDescriptor,
        key: TypeKey,
    ) -> Result<Arc<SchemaType>, GraphTypeError> {
        let (inner, _) = element.unwrap_optional();
        if matches!(inner.kind(), TypeKind::Collection(_)) {
            return Err(GraphTypeError::synthesis(
                descriptor.name(),
                "collections of collections are not supported",
            ));
        }

        let element = self.resolve(&element, key.role)?;
        debug_assert_ne!(element.schema_type.kind(), SchemaKind::List);

        let schema_type = Arc::new(SchemaType::list(
            key.role,
            descriptor.id(),
            descriptor.name(),
            element,
        ));
        self.stage(key, schema_type.clone());
        Ok(schema_type)
    }

    fn composite(
        &mut self,
        descriptor: &TypeDescriptor,
        fields: Vec<FieldDescriptor>,
        key: TypeKey,
    ) -> Result<Arc<SchemaType>, GraphTypeError> {
        let placeholder = Arc::new(SchemaType::placeholder(
            key.role,
            descriptor.id(),
            descriptor.name(),
            descriptor.name().to_lowercase(),
            descriptor.description().map(str::to_string),
        ));
        self.stage(key, placeholder.clone());
        trace!(
            type_name = descriptor.name(),
            role = ?key.role,
            fields = fields.len(),
            "Staged placeholder"
        );

        for field in &fields {
            let resolved = self
                .resolve(&field.field_type(), key.role)
                .map_err(|err| err.within_field(descriptor.name(), field.name()))?;
            let accessor = FieldAccessor::compile(descriptor, field)?;

            let name = field.name().to_lowercase();
            if placeholder.field(&name).is_some() {
                return Err(GraphTypeError::Synthesis {
                    type_name: descriptor.name().to_string(),
                    field: Some(field.name().to_string()),
                    reason: format!("field name '{name}' is already taken"),
                });
            }

            let mut schema_field = SchemaField::new(name, resolved, accessor);
            if let Some(description) = field.description() {
                schema_field = schema_field.with_description(description);
            }
            placeholder.push_field(schema_field);
        }

        let configurers = self.configuration.resolve(descriptor.id(), key.role);
        if !configurers.is_empty() {
            debug!(
                type_name = descriptor.name(),
                role = ?key.role,
                callbacks = configurers.len(),
                "Applying type configuration"
            );
            let mut editor = SchemaTypeEditor::new(&placeholder, key.role, self.scalars);
            for configure in &configurers {
                configure(&mut editor);
            }
            editor.finish()?;
        }

        self.claim_name(key.role, &placeholder.name(), descriptor)?;
        Ok(placeholder)
    }

    fn claim_name(
        &mut self,
        role: Role,
        name: &str,
        descriptor: &TypeDescriptor,
    ) -> Result<(), GraphTypeError> {
        if ScalarKind::is_reserved_name(name) {
            return Err(GraphTypeError::synthesis(
                descriptor.name(),
                format!("name '{name}' is reserved for a scalar or built-in type"),
            ));
        }

        let claim = (role, name.to_string());
        let owner = self
            .names
            .get(&claim)
            .cloned()
            .or_else(|| self.synthesizer.names.get(&claim).map(|entry| entry.value().clone()));

        match owner {
            Some(owner) if owner.type_id != descriptor.id() => Err(GraphTypeError::synthesis(
                descriptor.name(),
                format!(
                    "name '{name}' is already used by {} in the {role:?} role",
                    owner.source_name
                ),
            )),
            Some(_) => Ok(()),
            None => {
                self.names.insert(
                    claim,
                    NameOwner {
                        type_id: descriptor.id(),
                        source_name: descriptor.name().to_string(),
                    },
                );
                Ok(())
            }
        }
    }

    /// Publishes staged types and names, returning how many types were staged.
    fn commit(&mut self) -> usize {
        let count = self.staged.len();
        for (key, schema_type) in &self.staged {
            self.synthesizer.cache.insert(*key, schema_type.clone());
        }
        for (claim, owner) in self.names.drain() {
            self.synthesizer.names.insert(claim, owner);
        }
        count
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        for key in self.staged.keys() {
            self.synthesizer.in_flight.remove(key);
        }
    }
}
