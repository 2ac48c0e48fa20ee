//! Resolvers for synthesized schema types.
//!
//! - `field`: reads object fields from the parent [`Instance`] through the
//!   compiled [`FieldAccessor`](crate::schema::FieldAccessor)
//! - `root`: root query fields backed by a [`DataSource`]
//!
//! The engine itself never performs I/O. Root fields delegate to a
//! [`DataSource`] supplied by the caller and only shape its results.

mod field;
mod root;

pub use field::FieldResolver;
pub use root::{RootResolver, RootShape};

use async_graphql::indexmap::IndexMap;
use async_graphql::{Name, Value};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::GraphTypeError;
use crate::reflect::Instance;

/// Data-access collaborator for a root query field.
///
/// Implementations own persistence; the engine only hands them the resolved
/// arguments and exposes whatever instances they return.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches the instances for one root field invocation.
    async fn fetch(&self, args: &QueryArguments) -> Result<Vec<Instance>, GraphTypeError>;
}

/// Arguments of a root query field, after variable substitution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryArguments {
    values: IndexMap<String, Value>,
}

impl QueryArguments {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the arguments of a resolver invocation.
    pub(crate) fn from_index_map(args: &IndexMap<Name, Value>) -> Self {
        args.iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    /// Returns a raw argument value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns whether the argument was supplied with a non-null value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some_and(|value| !matches!(value, Value::Null))
    }

    /// Deserializes an argument into `T`.
    ///
    /// Missing and `null` arguments yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphTypeError::Source`] if the value does not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, GraphTypeError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => async_graphql::from_value(value.clone())
                .map(Some)
                .map_err(|e| {
                    GraphTypeError::source_failed(format!("invalid argument '{name}': {e}"))
                }),
        }
    }

    /// Converts all arguments into a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`GraphTypeError::Source`] if a value has no JSON form.
    pub fn to_json(&self) -> Result<serde_json::Value, GraphTypeError> {
        let mut object = serde_json::Map::with_capacity(self.values.len());
        for (name, value) in &self.values {
            let json = value.clone().into_json().map_err(|e| {
                GraphTypeError::source_failed(format!("argument '{name}' is not JSON: {e}"))
            })?;
            object.insert(name.clone(), json);
        }
        Ok(serde_json::Value::Object(object))
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether no arguments were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for QueryArguments {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
