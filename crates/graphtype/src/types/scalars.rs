//! Scalar kinds and the scalar registry.
//!
//! The registry is built once per provider and never mutated afterwards, so
//! every field of, say, text type resolves to the same shared schema type.

use std::collections::HashMap;
use std::sync::Arc;

use crate::schema::SchemaType;

/// Primitive semantic types recognised by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Text,
    Boolean,
    SByte,
    Short,
    Int,
    Long,
    Byte,
    UShort,
    UInt,
    ULong,
    BigInt,
    Float,
    Decimal,
    DateTime,
    DateTimeOffset,
    Date,
    Time,
    Milliseconds,
    Uuid,
    Uri,
}

impl ScalarKind {
    /// Every scalar kind, in registration order.
    pub const ALL: [ScalarKind; 20] = [
        Self::Text,
        Self::Boolean,
        Self::SByte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Byte,
        Self::UShort,
        Self::UInt,
        Self::ULong,
        Self::BigInt,
        Self::Float,
        Self::Decimal,
        Self::DateTime,
        Self::DateTimeOffset,
        Self::Date,
        Self::Time,
        Self::Milliseconds,
        Self::Uuid,
        Self::Uri,
    ];

    /// Returns the GraphQL scalar name.
    #[must_use]
    pub fn graphql_name(self) -> &'static str {
        match self {
            Self::Text => "String",
            Self::Boolean => "Boolean",
            Self::SByte => "SByte",
            Self::Short => "Short",
            Self::Int => "Int",
            Self::Long => "Long",
            Self::Byte => "Byte",
            Self::UShort => "UShort",
            Self::UInt => "UInt",
            Self::ULong => "ULong",
            Self::BigInt => "BigInt",
            Self::Float => "Float",
            Self::Decimal => "Decimal",
            Self::DateTime => "DateTime",
            Self::DateTimeOffset => "DateTimeOffset",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::Milliseconds => "Milliseconds",
            Self::Uuid => "UUID",
            Self::Uri => "Uri",
        }
    }

    /// Returns the scalar description used in the schema.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Text => "UTF-8 text",
            Self::Boolean => "true or false",
            Self::SByte => "A signed 8-bit integer",
            Self::Short => "A signed 16-bit integer",
            Self::Int => "A signed 32-bit integer",
            Self::Long => "A signed 64-bit integer",
            Self::Byte => "An unsigned 8-bit integer",
            Self::UShort => "An unsigned 16-bit integer",
            Self::UInt => "An unsigned 32-bit integer",
            Self::ULong => "An unsigned 64-bit integer",
            Self::BigInt => "A 128-bit integer, encoded as a string",
            Self::Float => "A double precision floating point number",
            Self::Decimal => "An arbitrary precision decimal, encoded as a string",
            Self::DateTime => "A date and time without offset (YYYY-MM-DDThh:mm:ss)",
            Self::DateTimeOffset => "An RFC 3339 date and time with offset",
            Self::Date => "A calendar date (YYYY-MM-DD)",
            Self::Time => "A time of day (hh:mm:ss)",
            Self::Milliseconds => "A duration in whole milliseconds",
            Self::Uuid => "A hyphenated UUID",
            Self::Uri => "An absolute URI",
        }
    }

    /// Returns whether the scalar is built into every GraphQL schema.
    #[must_use]
    pub fn is_builtin(self) -> bool {
        matches!(self, Self::Text | Self::Boolean | Self::Int | Self::Float)
    }

    /// Returns whether `name` belongs to a scalar or to the GraphQL built-ins.
    ///
    /// Scalars live in every role's namespace, so no synthesized type may
    /// take one of these names.
    #[must_use]
    pub fn is_reserved_name(name: &str) -> bool {
        name == "ID"
            || name.starts_with("__")
            || Self::ALL.iter().any(|kind| kind.graphql_name() == name)
    }
}

/// Read-only table from scalar kind to its shared schema type.
#[derive(Debug)]
pub struct ScalarRegistry {
    scalars: HashMap<ScalarKind, Arc<SchemaType>>,
}

impl ScalarRegistry {
    /// Creates a registry pre-populated with every [`ScalarKind`].
    #[must_use]
    pub fn new() -> Self {
        let scalars = ScalarKind::ALL
            .into_iter()
            .map(|kind| (kind, Arc::new(SchemaType::scalar(kind))))
            .collect();
        Self { scalars }
    }

    /// Looks up the shared schema type for a scalar kind.
    #[must_use]
    pub fn lookup(&self, kind: ScalarKind) -> Option<Arc<SchemaType>> {
        self.scalars.get(&kind).cloned()
    }

    /// Iterates over all registered scalar schema types.
    pub fn iter(&self) -> impl Iterator<Item = (ScalarKind, &Arc<SchemaType>)> {
        self.scalars.iter().map(|(kind, ty)| (*kind, ty))
    }

    /// Returns the number of registered scalars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scalars.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty()
    }
}

impl Default for ScalarRegistry {
    fn default() -> Self {
        Self::new()
    }
}
