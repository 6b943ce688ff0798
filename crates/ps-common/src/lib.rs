//! Probspace common value model and errors.
//!
//! This crate provides the foundational types shared across ps-core:
//! - Raw attribute values and the normalized comparable form
//! - Equality, ordering, and list coercion over heterogeneous values
//! - The unified error taxonomy

pub mod error;
pub mod value;

pub use error::{Error, ErrorCategory, Result};
pub use value::{eq, cmp, normalize, to_list, AttrValue, Comparable, ValueKind};
