//! Literal DELETE scripts that remove a row together with every row that
//! depends on it through foreign keys

mod generator;


pub use generator::*;
