//! Scalar types for GraphQL.
//!
//! This module maps primitive Rust value types onto GraphQL scalars:
//!
//! - Text and boolean: `String`, `Boolean`
//! - Integers: `SByte`, `Short`, `Int`, `Long`, `Byte`, `UShort`, `UInt`, `ULong`, `BigInt`
//! - Numbers: `Float`, `Decimal`
//! - Date/Time: `DateTime`, `DateTimeOffset`, `Date`, `Time`, `Milliseconds`
//! - Identifiers: `UUID`, `Uri`

mod scalars;

pub use scalars::{ScalarKind, ScalarRegistry};
