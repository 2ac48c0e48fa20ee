//! # graphtype
//!
//! Runtime GraphQL schema synthesis for in-process domain types.
//!
//! Domain types describe themselves through the [`Reflect`] trait. A
//! [`TypeProvider`] turns those descriptions into schema types on first use
//! and caches them per role (query or input), and a [`SchemaAssembler`]
//! lowers the result into an executable `async_graphql` schema.
//!
//! It supports:
//!
//! - Scalars for text, booleans, sized integers, floats, decimals, date/time
//!   values, UUIDs and URIs
//! - Optional fields, enumerations, collections and nested composites
//! - Self-referencing types, resolved through cached placeholders
//! - Per-type configuration callbacks (renames, descriptions, computed fields)
//! - Root query fields backed by a caller-supplied [`DataSource`]
//!
//! ## Example
//!
//! ```ignore
//! let provider = Arc::new(TypeProvider::new());
//! provider.register_configuration::<Empresa, _>(ConfigScope::Object, |editor| {
//!     editor.rename_field("RazaoSocial", "legalName");
//! })?;
//!
//! let empresas = RootQueryField::new::<Vec<Empresa>>(&provider, "empresas", source)?
//!     .argument::<Option<IdFilter>>(&provider, "idFilter")?;
//!
//! let schema = SchemaAssembler::new(provider, GraphTypeConfig::default().to_schema_builder_config())
//!     .field(empresas)
//!     .build()?;
//! ```
//!
//! ## Modules
//!
//! - [`reflect`] - Domain type descriptors and boxed values
//! - [`types`] - Scalar kinds and the scalar registry
//! - [`schema`] - Synthesis, configuration and schema assembly
//! - [`resolvers`] - Data source contract and field resolvers
//! - [`config`] - Configuration options
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod reflect;
pub mod resolvers;
pub mod schema;
pub mod types;

// Re-export main types
pub use config::GraphTypeConfig;
pub use error::GraphTypeError;
pub use reflect::{BoxedValue, FieldDescriptor, Instance, Reflect, TypeDescriptor, TypeKind};
pub use resolvers::{DataSource, QueryArguments};
pub use schema::{
    ConfigScope, ResolvedType, Role, RootQueryField, SchemaAssembler, SchemaBuilderConfig,
    SchemaField, SchemaKind, SchemaType, SchemaTypeEditor, SynthesisState, TypeProvider,
};
pub use types::{ScalarKind, ScalarRegistry};

/// Result type for synthesis and resolution.
pub type Result<T> = std::result::Result<T, GraphTypeError>;
