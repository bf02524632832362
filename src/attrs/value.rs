//! Attribute value and kind tags.

use std::fmt;
use std::sync::Arc;

use crate::logging::Log;

/// The kind tag constraining what an attribute may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    /// Unconstrained value.
    Any,
    /// Boolean flag; stored values must be `Int(0)` or `Int(1)`.
    Boolean,
    /// Opaque collaborator handle (e.g., the injected logger); inert to
    /// validation and compared by pointer identity.
    OpaqueHandle,
}

impl AttrKind {
    /// Short lowercase name used in diagnostics and the `prop` view.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Boolean => "boolean",
            Self::OpaqueHandle => "handle",
        }
    }
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete attribute value.
///
/// "Unset" is represented as `Option::<AttrValue>::None` by the registry,
/// never as an in-band sentinel, so legitimate empty strings and zeros are
/// always distinguishable from absence.
#[derive(Clone)]
pub enum AttrValue {
    /// General string value.
    Str(String),
    /// Numeric value; also the storage for Boolean-kind flags (0 or 1).
    Int(i64),
    /// Opaque handle to the logging collaborator.
    Handle(Arc<dyn Log>),
}

impl AttrValue {
    /// Returns the string slice if this is a `Str` variant.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Int` variant.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the handle if this is a `Handle` variant.
    #[must_use]
    pub fn as_handle(&self) -> Option<&Arc<dyn Log>> {
        match self {
            Self::Handle(h) => Some(h),
            _ => None,
        }
    }

    /// Returns `true` for an `Int` holding 0 or 1.
    #[must_use]
    pub const fn is_boolean(&self) -> bool {
        matches!(self, Self::Int(0 | 1))
    }

    /// The variant name, for diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "str",
            Self::Int(_) => "int",
            Self::Handle(_) => "handle",
        }
    }
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Handle(_) => f.write_str("Handle(..)"),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(v) => write!(f, "{v}"),
            Self::Handle(_) => f.write_str("<handle>"),
        }
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Handle(a), Self::Handle(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<Arc<dyn Log>> for AttrValue {
    fn from(v: Arc<dyn Log>) -> Self {
        Self::Handle(v)
    }
}
