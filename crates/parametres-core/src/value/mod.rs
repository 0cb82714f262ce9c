//! Value model and codecs
//!
//! Settings values are `serde_json::Value` - a closed tagged variant covering
//! everything the system stores. `codec` maps values to and from their
//! `(stored string, type tag)` storage form; `serialized` is the composite
//! wire format; `path` walks dotted sub-paths into composites.

pub mod codec;
pub mod path;
pub mod serialized;

pub use codec::{decode, encode, TypeTag};
pub use serialized::looks_serialized;
