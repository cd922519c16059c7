//! Value objects for the domain layer.
//!
//! Value objects are immutable, validated data types that represent
//! concepts in the domain model: what a code unit is and how large a
//! buffer may be.

mod capacity;
mod code_unit;

pub use capacity::{presets, DEFAULT_CAPACITY};
pub use code_unit::CodeUnit;
