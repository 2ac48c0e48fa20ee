//! Schema assembler.
//!
//! This module provides `SchemaAssembler`, which composes root query fields
//! over synthesized types into a root query graph and lowers that graph into
//! an executable schema using async-graphql's dynamic schema API.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{
    Enum, Field, FieldFuture, InputObject, InputValue, Object, Scalar, Schema, SchemaBuilder,
    TypeRef,
};
use tracing::{debug, trace};

use super::configure::is_valid_graphql_name;
use super::provider::TypeProvider;
use super::types::{FieldBinding, ResolvedType, Role, SchemaArgument, SchemaField, SchemaKind, SchemaType};
use crate::error::GraphTypeError;
use crate::reflect::Reflect;
use crate::resolvers::{DataSource, FieldResolver, RootResolver, RootShape};

/// Name of the field added to objects that would otherwise have none.
pub const PLACEHOLDER_FIELD: &str = "_placeholder";

/// Configuration for the schema builder.
#[derive(Debug, Clone)]
pub struct SchemaBuilderConfig {
    /// Maximum query depth allowed.
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    pub max_complexity: usize,

    /// Whether to enable introspection queries.
    pub introspection_enabled: bool,

    /// Name of the root query object.
    pub query_type_name: String,

    /// Suffix appended to input-role object names.
    pub input_type_suffix: String,
}

impl Default for SchemaBuilderConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            max_complexity: 500,
            introspection_enabled: true,
            query_type_name: "Query".to_string(),
            input_type_suffix: "Input".to_string(),
        }
    }
}

/// A root query field backed by a [`DataSource`].
///
/// ```ignore
/// let empresas = RootQueryField::new::<Vec<Empresa>>(&provider, "empresas", source)?
///     .argument::<Option<IdFilter>>(&provider, "idFilter")?
///     .description("Registered companies");
/// ```
#[derive(Debug, Clone)]
pub struct RootQueryField {
    field: SchemaField,
}

impl RootQueryField {
    /// Declares a root field returning `R`, typically `Vec<T>` or `Option<T>`.
    ///
    /// # Errors
    ///
    /// Returns an error if `R` cannot be synthesized, if the name is not a
    /// valid GraphQL name, or if `R` does not resolve to an object (or a list
    /// of objects).
    pub fn new<R: Reflect>(
        provider: &TypeProvider,
        name: impl Into<String>,
        source: Arc<dyn DataSource>,
    ) -> Result<Self, GraphTypeError> {
        let name = name.into();
        if !is_valid_graphql_name(&name) {
            return Err(GraphTypeError::configuration(
                &name,
                "root field name is not a valid GraphQL name",
            ));
        }

        let resolved = provider.resolve_field_type::<R>(Role::Query)?;
        let target = match resolved.schema_type.element() {
            Some(element) => &element.schema_type,
            None => &resolved.schema_type,
        };
        if target.kind() != SchemaKind::Object {
            return Err(GraphTypeError::configuration(
                &name,
                format!("root field must return objects, not {}", target.name()),
            ));
        }

        Ok(Self {
            field: SchemaField::sourced(name, resolved, source, Vec::new()),
        })
    }

    /// Adds an argument whose type is synthesized in the input role.
    ///
    /// Declare `Option<A>` for an optional argument.
    ///
    /// # Errors
    ///
    /// Returns an error if `A` cannot be synthesized or the name is invalid
    /// or already taken.
    pub fn argument<A: Reflect>(
        mut self,
        provider: &TypeProvider,
        name: impl Into<String>,
    ) -> Result<Self, GraphTypeError> {
        let name = name.into();
        if !is_valid_graphql_name(&name) {
            return Err(GraphTypeError::configuration(
                self.field.name(),
                format!("argument '{name}' is not a valid GraphQL name"),
            ));
        }
        if self.field.arguments().iter().any(|arg| arg.name == name) {
            return Err(GraphTypeError::configuration(
                self.field.name(),
                format!("argument '{name}' is declared twice"),
            ));
        }

        let resolved = provider.resolve_field_type::<A>(Role::Input)?;
        self.field.push_argument(SchemaArgument { name, resolved });
        Ok(self)
    }

    /// Sets the field description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.field = self.field.with_description(description);
        self
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.field.name()
    }
}

/// Composes root query fields into an executable schema.
///
/// # Example
///
/// ```ignore
/// let provider = Arc::new(TypeProvider::new());
/// let schema = SchemaAssembler::new(provider.clone(), SchemaBuilderConfig::default())
///     .field(RootQueryField::new::<Vec<Empresa>>(&provider, "empresas", source)?)
///     .build()?;
/// ```
pub struct SchemaAssembler {
    provider: Arc<TypeProvider>,
    config: SchemaBuilderConfig,
    description: Option<String>,
    fields: Vec<RootQueryField>,
}

impl SchemaAssembler {
    /// Creates a new assembler.
    #[must_use]
    pub fn new(provider: Arc<TypeProvider>, config: SchemaBuilderConfig) -> Self {
        Self {
            provider,
            config,
            description: None,
            fields: Vec::new(),
        }
    }

    /// Adds a root query field.
    #[must_use]
    pub fn field(mut self, field: RootQueryField) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the description of the root query object.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the provider types are synthesized with.
    #[must_use]
    pub fn provider(&self) -> &Arc<TypeProvider> {
        &self.provider
    }

    /// Returns the root query schema type.
    ///
    /// # Errors
    ///
    /// Returns [`GraphTypeError::Configuration`] if two root fields share a
    /// name or the query type name is invalid.
    pub fn assemble_root(&self) -> Result<Arc<SchemaType>, GraphTypeError> {
        let root_name = &self.config.query_type_name;
        if !is_valid_graphql_name(root_name) {
            return Err(GraphTypeError::configuration(
                root_name,
                "query type name is not a valid GraphQL name",
            ));
        }

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(self.fields.len());
        for root_field in &self.fields {
            if !seen.insert(root_field.name()) {
                return Err(GraphTypeError::configuration(
                    root_name,
                    format!("root field '{}' is declared twice", root_field.name()),
                ));
            }
            fields.push(root_field.field.clone());
        }

        Ok(Arc::new(SchemaType::root(
            root_name,
            self.description.clone(),
            fields,
        )))
    }

    /// Builds the executable schema.
    ///
    /// This lowers the root query and every type reachable from it:
    /// - Objects, with fields resolved through their accessors
    /// - Input objects, suffixed with the configured input suffix
    /// - Enums, shared between roles when the input enum mirrors a query enum
    /// - Non-builtin scalars
    ///
    /// # Errors
    ///
    /// Returns an error if the root is invalid, two lowered types share a
    /// name, or async-graphql rejects the schema.
    pub fn build(&self) -> Result<Schema, GraphTypeError> {
        debug!(fields = self.fields.len(), "Starting GraphQL schema build");

        let root = self.assemble_root()?;
        let reachable = collect_reachable(&root);
        let names = self.assign_names(&reachable)?;
        let lowering = Lowering {
            names: &names,
        };

        let mut schema_builder = Schema::build(&self.config.query_type_name, None, None);
        for schema_type in &reachable {
            schema_builder = lowering.register(schema_builder, schema_type);
        }

        // Configure limits
        let mut schema_builder = schema_builder.limit_depth(self.config.max_depth);
        schema_builder = schema_builder.limit_complexity(self.config.max_complexity);

        // Enable/disable introspection
        if !self.config.introspection_enabled {
            schema_builder = schema_builder.disable_introspection();
        }

        let schema = schema_builder
            .finish()
            .map_err(|e| GraphTypeError::SchemaBuildFailed(e.to_string()))?;

        debug!(types = reachable.len(), "GraphQL schema build complete");
        Ok(schema)
    }

    /// Chooses the GraphQL name of every reachable named type.
    ///
    /// Input enums that mirror a query enum of the same domain type reuse
    /// its name and are not registered a second time.
    fn assign_names(&self, reachable: &[Arc<SchemaType>]) -> Result<TypeNames, GraphTypeError> {
        let mut names = TypeNames::default();
        let mut query_enums = HashMap::new();
        for schema_type in reachable {
            if schema_type.kind() == SchemaKind::Enum && schema_type.role() == Some(Role::Query) {
                query_enums.insert(schema_type.source(), schema_type.clone());
            }
        }

        let mut owners: HashMap<String, String> = HashMap::new();
        for schema_type in reachable {
            let name = match (schema_type.kind(), schema_type.role()) {
                (SchemaKind::Scalar, _) | (SchemaKind::List, _) => continue,
                (SchemaKind::Enum, Some(Role::Input)) => {
                    match query_enums.get(&schema_type.source()) {
                        Some(twin) if twin.enum_values() == schema_type.enum_values() => {
                            names.shared.insert(key(schema_type));
                            names.by_type.insert(key(schema_type), twin.name());
                            continue;
                        }
                        _ => format!("{}{}", schema_type.name(), self.config.input_type_suffix),
                    }
                }
                (SchemaKind::InputObject, _) => {
                    format!("{}{}", schema_type.name(), self.config.input_type_suffix)
                }
                _ => schema_type.name(),
            };

            if let Some(previous) = owners.insert(name.clone(), schema_type.source_name().to_string())
            {
                return Err(GraphTypeError::SchemaBuildFailed(format!(
                    "type name '{name}' is used by both {previous} and {}",
                    schema_type.source_name()
                )));
            }
            trace!(type_name = %name, kind = ?schema_type.kind(), "Assigned GraphQL type name");
            names.by_type.insert(key(schema_type), name);
        }
        Ok(names)
    }
}

fn key(schema_type: &Arc<SchemaType>) -> *const SchemaType {
    Arc::as_ptr(schema_type)
}

/// Walks the type graph from the root, visiting every type once.
fn collect_reachable(root: &Arc<SchemaType>) -> Vec<Arc<SchemaType>> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([root.clone()]);
    let mut reachable = Vec::new();

    while let Some(schema_type) = queue.pop_front() {
        if !visited.insert(key(&schema_type)) {
            continue;
        }
        if let Some(element) = schema_type.element() {
            queue.push_back(element.schema_type.clone());
        }
        for field in schema_type.fields() {
            queue.push_back(field.schema_type().clone());
            for argument in field.arguments() {
                queue.push_back(argument.resolved.schema_type.clone());
            }
        }
        reachable.push(schema_type);
    }
    reachable
}

#[derive(Default)]
struct TypeNames {
    by_type: HashMap<*const SchemaType, String>,
    shared: HashSet<*const SchemaType>,
}

struct Lowering<'a> {
    names: &'a TypeNames,
}

impl Lowering<'_> {
    fn name(&self, schema_type: &Arc<SchemaType>) -> String {
        match schema_type.scalar_kind() {
            Some(kind) => kind.graphql_name().to_string(),
            None => self
                .names
                .by_type
                .get(&key(schema_type))
                .cloned()
                .unwrap_or_else(|| schema_type.name()),
        }
    }

    fn type_ref(&self, resolved: &ResolvedType) -> TypeRef {
        let inner = match resolved.schema_type.element() {
            Some(element) => TypeRef::List(Box::new(self.type_ref(element))),
            None => TypeRef::named(self.name(&resolved.schema_type)),
        };
        if resolved.nullable {
            inner
        } else {
            TypeRef::NonNull(Box::new(inner))
        }
    }

    fn register(&self, builder: SchemaBuilder, schema_type: &Arc<SchemaType>) -> SchemaBuilder {
        match schema_type.kind() {
            SchemaKind::Object => builder.register(self.object(schema_type)),
            SchemaKind::InputObject => builder.register(self.input_object(schema_type)),
            SchemaKind::Enum if !self.names.shared.contains(&key(schema_type)) => {
                builder.register(self.enumeration(schema_type))
            }
            SchemaKind::Scalar => match schema_type.scalar_kind() {
                Some(kind) if !kind.is_builtin() => {
                    builder.register(Scalar::new(kind.graphql_name()).description(kind.description()))
                }
                _ => builder,
            },
            SchemaKind::Enum | SchemaKind::List => builder,
        }
    }

    fn object(&self, schema_type: &Arc<SchemaType>) -> Object {
        let name = self.name(schema_type);
        let mut object = Object::new(&name);
        if let Some(description) = schema_type.description() {
            object = object.description(description);
        }

        let fields = schema_type.fields();
        if fields.is_empty() {
            object = object.field(
                Field::new(PLACEHOLDER_FIELD, TypeRef::named(TypeRef::BOOLEAN), |_| {
                    FieldFuture::new(async { Ok(None::<Value>) })
                })
                .description("Placeholder for a type without fields"),
            );
        }

        for field in &fields {
            let type_ref = self.type_ref(field.resolved());
            let mut lowered = match field.binding() {
                FieldBinding::Accessor(accessor) => {
                    let element_nullable = field
                        .schema_type()
                        .element()
                        .is_none_or(|element| element.nullable);
                    Field::new(
                        field.name(),
                        type_ref,
                        FieldResolver::resolve(accessor.clone(), field.is_nullable(), element_nullable),
                    )
                }
                FieldBinding::Source(source) => Field::new(
                    field.name(),
                    type_ref,
                    RootResolver::resolve(field.name().to_string(), source.clone(), root_shape(field)),
                ),
            };
            for argument in field.arguments() {
                lowered = lowered.argument(InputValue::new(&argument.name, self.type_ref(&argument.resolved)));
            }
            if let Some(description) = field.description() {
                lowered = lowered.description(description);
            }
            object = object.field(lowered);
        }

        trace!(type_name = %name, fields = fields.len(), "Lowered object type");
        object
    }

    fn input_object(&self, schema_type: &Arc<SchemaType>) -> InputObject {
        let name = self.name(schema_type);
        let mut input = InputObject::new(&name);
        if let Some(description) = schema_type.description() {
            input = input.description(description);
        }

        let fields = schema_type.fields();
        if fields.is_empty() {
            input = input.field(InputValue::new(PLACEHOLDER_FIELD, TypeRef::named(TypeRef::BOOLEAN)));
        }
        for field in &fields {
            let mut value = InputValue::new(field.name(), self.type_ref(field.resolved()));
            if let Some(description) = field.description() {
                value = value.description(description);
            }
            input = input.field(value);
        }

        trace!(type_name = %name, fields = fields.len(), "Lowered input type");
        input
    }

    fn enumeration(&self, schema_type: &Arc<SchemaType>) -> Enum {
        let mut lowered = Enum::new(self.name(schema_type)).items(schema_type.enum_values().iter().cloned());
        if let Some(description) = schema_type.description() {
            lowered = lowered.description(description);
        }
        lowered
    }
}

fn root_shape(field: &SchemaField) -> RootShape {
    if field.schema_type().kind() == SchemaKind::List {
        RootShape::List
    } else {
        RootShape::Single {
            nullable: field.is_nullable(),
        }
    }
}
