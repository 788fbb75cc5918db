//! ZQLZ Core - Core abstractions shared by the data editing crates
//!
//! This crate provides the fundamental types that the other ZQLZ crates
//! depend on:
//!
//! - `Value` / `SqlType` - typed cell values, including a typed NULL
//! - `TableIdentity` - catalog/schema/name identity of a table
//! - `SchemaMetadata` - foreign key and primary key lookups
//! - `LiteralFormatter` - rendering values as SQL literals
//! - `Dialect` - identifier quoting and literal rules per engine

mod dialect;
mod error;
mod literal;
mod schema;
mod types;

pub use dialect::*;
pub use error::*;
pub use literal::*;
pub use schema::*;
pub use types::*;
