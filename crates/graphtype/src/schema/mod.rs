//! Schema type synthesis and assembly.
//!
//! This module turns domain types into schema types and schema types into an
//! executable GraphQL schema.
//!
//! ## Components
//!
//! - [`TypeProvider`] - Process-scoped entry point owning the caches
//! - [`TypeSynthesizer`] - Derives and caches schema types per role
//! - [`FieldAccessor`] - Compiled reader for one field of one domain type
//! - [`ConfigurationRegistry`] - Per-type customization callbacks
//! - [`SchemaAssembler`] - Builds the root query and lowers it to a [`Schema`](async_graphql::dynamic::Schema)
//!
//! ## Synthesis
//!
//! 1. Optional wrappers are stripped and recorded as nullability
//! 2. Scalars come from the scalar registry
//! 3. Enumerations and collections are synthesized and cached
//! 4. Composites are cached as placeholders, then filled field by field
//! 5. Configuration callbacks mutate the placeholder in place
//! 6. The run is published to the cache only if every step succeeded

mod accessor;
mod builder;
mod configure;
mod provider;
mod synthesizer;
mod types;

pub use accessor::FieldAccessor;
pub use builder::{PLACEHOLDER_FIELD, RootQueryField, SchemaAssembler, SchemaBuilderConfig};
pub use configure::{
    ConfigScope, ConfigurationRegistry, Configurer, SchemaTypeEditor, is_valid_graphql_name,
};
pub use provider::TypeProvider;
pub use synthesizer::{SynthesisState, TypeKey, TypeSynthesizer};
pub use types::{
    FieldBinding, ResolvedType, Role, SchemaArgument, SchemaField, SchemaKind, SchemaType,
};
