//! Change-tracked rows
//!
//! A [`RowState`] holds the current values of one result row together with
//! the values it had when it was read, so that statements can be generated
//! for exactly what the user changed.

mod result_info;
mod row_state;
mod row_store;


pub use result_info::*;
pub use row_state::*;
pub use row_store::*;
