//! Schema configuration.
//!
//! Configuration can be loaded from any serde source, typically a
//! `[graphtype]` section of the host application's TOML file.
//!
//! # Example Configuration
//!
//! ```toml
//! [graphtype]
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! query_type_name = "Query"
//! input_type_suffix = "Input"
//! ```

use serde::{Deserialize, Serialize};

use crate::schema::{SchemaBuilderConfig, is_valid_graphql_name};

/// Schema assembly configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphTypeConfig {
    /// Maximum query depth allowed.
    /// Self-referencing types allow unbounded nesting, so keep this finite.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable GraphQL introspection queries.
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,

    /// Name of the root query object.
    /// Default: "Query"
    #[serde(default = "default_query_type_name")]
    pub query_type_name: String,

    /// Suffix appended to input object names, so the query and input
    /// variants of one domain type do not clash.
    /// Default: "Input"
    #[serde(default = "default_input_type_suffix")]
    pub input_type_suffix: String,
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

fn default_introspection() -> bool {
    true
}

fn default_query_type_name() -> String {
    "Query".to_string()
}

fn default_input_type_suffix() -> String {
    "Input".to_string()
}

impl Default for GraphTypeConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_introspection(),
            query_type_name: default_query_type_name(),
            input_type_suffix: default_input_type_suffix(),
        }
    }
}

impl GraphTypeConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("graphtype.max_depth must be > 0".into());
        }
        if self.max_complexity == 0 {
            return Err("graphtype.max_complexity must be > 0".into());
        }
        if !is_valid_graphql_name(&self.query_type_name) {
            return Err(format!(
                "graphtype.query_type_name '{}' is not a valid GraphQL name",
                self.query_type_name
            ));
        }
        if self.input_type_suffix.is_empty() {
            return Err("graphtype.input_type_suffix must not be empty".into());
        }
        if !self
            .input_type_suffix
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        {
            return Err(format!(
                "graphtype.input_type_suffix '{}' may only contain letters, digits and '_'",
                self.input_type_suffix
            ));
        }
        Ok(())
    }

    /// Converts this config to a SchemaBuilderConfig.
    #[must_use]
    pub fn to_schema_builder_config(&self) -> SchemaBuilderConfig {
        SchemaBuilderConfig {
            max_depth: self.max_depth,
            max_complexity: self.max_complexity,
            introspection_enabled: self.introspection,
            query_type_name: self.query_type_name.clone(),
            input_type_suffix: self.input_type_suffix.clone(),
        }
    }
}
