//! Dynamic attribute registry: typed, validated, introspectable per-object
//! state with independent current and default values.

mod registry;
mod value;

pub use registry::{AttrDescriptor, AttrField, AttrRegistry, CLASS_ATTR};
pub use value::{AttrKind, AttrValue};
