//! Foreign key dependency resolution
//!
//! Builds trees of tables connected by foreign keys and orders sets of
//! tables so that inserts and deletes never violate referential integrity.

mod node;
mod resolver;
mod sorter;

#[cfg(test)]
mod tests;

pub use node::*;
pub use resolver::*;
pub use sorter::*;
