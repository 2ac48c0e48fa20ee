//! The process-scoped entry point for schema synthesis.

use std::any::TypeId;
use std::sync::Arc;

use super::configure::{ConfigScope, ConfigurationRegistry, SchemaTypeEditor};
use super::synthesizer::{SynthesisState, TypeKey, TypeSynthesizer};
use super::types::{ResolvedType, Role, SchemaType};
use crate::error::GraphTypeError;
use crate::reflect::{Reflect, TypeKind};
use crate::types::ScalarRegistry;

/// Owns the scalar registry, configuration registry and type cache.
///
/// There is no global instance; construct one per schema (or per test).
/// The provider is `Send + Sync` and is usually shared behind an `Arc`.
///
/// Self-referencing types point at each other through `Arc`, so their
/// schema types outlive the provider that synthesized them. Keep one
/// provider per schema for the life of the process rather than creating
/// providers in a loop.
///
/// # Example
///
/// ```ignore
/// let provider = TypeProvider::new();
/// provider.register_configuration::<Empresa>(ConfigScope::Object, |editor| {
///     editor.rename_field("RazaoSocial", "legalName");
/// })?;
///
/// let empresa = provider.synthesize_query_type::<Empresa>()?;
/// assert_eq!(empresa.name(), "empresa");
/// ```
#[derive(Debug, Default)]
pub struct TypeProvider {
    scalars: ScalarRegistry,
    configuration: ConfigurationRegistry,
    synthesizer: TypeSynthesizer,
}

impl TypeProvider {
    /// Creates a provider with every scalar registered and an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the query (object) schema type for `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if `T` or anything it reaches cannot be synthesized.
    pub fn synthesize_query_type<T: Reflect>(&self) -> Result<Arc<SchemaType>, GraphTypeError> {
        self.resolve_field_type::<T>(Role::Query)
            .map(|resolved| resolved.schema_type)
    }

    /// Returns the input schema type for `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if `T` or anything it reaches cannot be synthesized.
    pub fn synthesize_input_type<T: Reflect>(&self) -> Result<Arc<SchemaType>, GraphTypeError> {
        self.resolve_field_type::<T>(Role::Input)
            .map(|resolved| resolved.schema_type)
    }

    /// Resolves any field type: scalar, optional, enumeration, collection or
    /// composite.
    ///
    /// # Errors
    ///
    /// Returns an error if the type cannot be synthesized.
    pub fn resolve_field_type<T: Reflect>(
        &self,
        role: Role,
    ) -> Result<ResolvedType, GraphTypeError> {
        self.synthesizer
            .resolve(&T::descriptor(), role, &self.scalars, &self.configuration)
    }

    /// Registers a configuration callback for `T`.
    ///
    /// Callbacks for the same type compose in registration order and run
    /// once, when the type is first synthesized in a covered role. A
    /// callback must not call back into this provider.
    ///
    /// # Errors
    ///
    /// Returns [`GraphTypeError::Configuration`] if `T` is already cached in a
    /// role covered by `scope`, or if `T` is not a composite type.
    pub fn register_configuration<T, F>(
        &self,
        scope: ConfigScope,
        configure: F,
    ) -> Result<(), GraphTypeError>
    where
        T: Reflect,
        F: Fn(&mut SchemaTypeEditor<'_>) + Send + Sync + 'static,
    {
        let (descriptor, _) = T::descriptor().unwrap_optional();
        if !matches!(descriptor.kind(), TypeKind::Composite(_)) {
            return Err(GraphTypeError::configuration(
                descriptor.name(),
                format!("only composite types can be configured, found {}", descriptor.kind().label()),
            ));
        }

        self.synthesizer.register_configuration(
            &self.configuration,
            descriptor.id(),
            descriptor.name(),
            scope,
            Arc::new(configure),
        )
    }

    /// Returns the synthesis state of `T` in `role`.
    ///
    /// Scalars are always reported as cached.
    #[must_use]
    pub fn state<T: Reflect>(&self, role: Role) -> SynthesisState {
        let (descriptor, _) = T::descriptor().unwrap_optional();
        if matches!(descriptor.kind(), TypeKind::Scalar(_)) {
            return SynthesisState::Cached;
        }
        self.synthesizer.state(&TypeKey::new(descriptor.id(), role))
    }

    /// Returns whether `T` has a cached schema type in `role`.
    #[must_use]
    pub fn is_cached<T: Reflect>(&self, role: Role) -> bool {
        self.state::<T>(role) == SynthesisState::Cached
    }

    /// Returns the cached schema type for a raw type id, if any.
    #[must_use]
    pub fn cached(&self, type_id: TypeId, role: Role) -> Option<Arc<SchemaType>> {
        self.synthesizer.cached(&TypeKey::new(type_id, role))
    }

    /// Returns the scalar registry.
    #[must_use]
    pub fn scalars(&self) -> &ScalarRegistry {
        &self.scalars
    }
}
