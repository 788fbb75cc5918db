//! INSERT/UPDATE/DELETE generation for edited rows

mod dml_statement;
mod factory;


pub use dml_statement::*;
pub use factory::*;
