//! The per-object attribute registry.
//!
//! Every host object owns one [`AttrRegistry`]: a map from attribute name
//! to a tagged [`AttrDescriptor`] holding the current value, the default,
//! the read-only flag, and diagnostic metadata. All access is late-bound by
//! string name through one generic get/set surface, so callers that build
//! names dynamically (the LoV helpers in particular) need no compiled
//! accessors.
//!
//! Each call is atomic: every precondition is checked before the first
//! mutation, so a failed call leaves the registry untouched.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::attrs::value::{AttrKind, AttrValue};
use crate::error::AttrError;
use crate::logging::Log;

/// Name of the implicit class-name placeholder attribute.
///
/// Defined at construction, read-only, holding the owning type name.
/// Underscore-prefixed, so it is invisible to [`AttrRegistry::list`] and
/// to the inheritable-set capture, and the `ALL` forms of reset/sync
/// skip it.
pub const CLASS_ATTR: &str = "_class";

/// One named, typed, access-controlled property on an object.
#[derive(Debug, Clone)]
pub struct AttrDescriptor {
    /// Unique name within the owning object.
    pub name: String,
    /// Kind tag constraining `value` and `default`.
    pub kind: AttrKind,
    /// Current value; `None` means unset.
    pub value: Option<AttrValue>,
    /// Default value, independent of `value`; `None` means unset.
    pub default: Option<AttrValue>,
    /// Gates the direct `set` operation only; reset/sync bypass it.
    pub read_only: bool,
    /// Type name that defined the attribute (diagnostic only).
    pub owner_class: String,
}

/// Metadata field selector for [`AttrRegistry::prop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrField {
    /// The type name that defined the attribute.
    OwnerClass,
    /// The default value.
    Default,
    /// The attribute name itself.
    Name,
    /// The read-only flag, rendered as 0/1.
    ReadOnly,
    /// The kind tag name.
    Kind,
    /// The current value.
    Value,
}

impl FromStr for AttrField {
    type Err = AttrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ownerClass" => Ok(Self::OwnerClass),
            "default" => Ok(Self::Default),
            "name" => Ok(Self::Name),
            "readOnly" => Ok(Self::ReadOnly),
            "kind" => Ok(Self::Kind),
            "value" => Ok(Self::Value),
            other => Err(AttrError::Syntax(format!(
                "unknown property field '{other}'"
            ))),
        }
    }
}

/// Typed, named, mutable property store for one object.
pub struct AttrRegistry {
    class_name: String,
    attrs: BTreeMap<String, AttrDescriptor>,
    log: Arc<dyn Log>,
}

impl std::fmt::Debug for AttrRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttrRegistry")
            .field("class_name", &self.class_name)
            .field("attrs", &self.attrs)
            .field("log", &"<dyn Log>")
            .finish()
    }
}

impl AttrRegistry {
    /// Create an empty registry for an object of type `class_name`.
    ///
    /// The implicit [`CLASS_ATTR`] placeholder is defined immediately:
    /// read-only, holding `class_name`.
    #[must_use]
    pub fn new(class_name: impl Into<String>, log: Arc<dyn Log>) -> Self {
        let class_name = class_name.into();
        let mut attrs = BTreeMap::new();
        attrs.insert(
            CLASS_ATTR.to_string(),
            AttrDescriptor {
                name: CLASS_ATTR.to_string(),
                kind: AttrKind::Any,
                value: Some(AttrValue::Str(class_name.clone())),
                default: Some(AttrValue::Str(class_name.clone())),
                read_only: true,
                owner_class: class_name.clone(),
            },
        );
        Self {
            class_name,
            attrs,
            log,
        }
    }

    /// The owning type name this registry was created for.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Whether `name` is currently defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Number of defined attributes, including the class placeholder.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether no attributes beyond the class placeholder are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.len() <= 1
    }

    /// Define a new attribute.
    ///
    /// For [`AttrKind::Boolean`], `value` and `default` must each be
    /// `Int(0)` or `Int(1)` whenever supplied; an unsupplied boolean value
    /// coerces to `Int(0)` with a logged warning rather than failing.
    ///
    /// # Errors
    ///
    /// Returns [`AttrError::DuplicateAttribute`] if `name` is already
    /// defined, or [`AttrError::InvalidKind`] if a supplied value violates
    /// the Boolean constraint.
    pub fn define(
        &mut self,
        name: &str,
        kind: AttrKind,
        value: Option<AttrValue>,
        default: Option<AttrValue>,
    ) -> Result<(), AttrError> {
        if self.attrs.contains_key(name) {
            return Err(AttrError::DuplicateAttribute(name.to_string()));
        }
        check_kind(name, kind, value.as_ref())?;
        check_kind(name, kind, default.as_ref())?;

        let value = if kind == AttrKind::Boolean && value.is_none() {
            self.log.warn(&format!(
                "boolean attribute '{name}' defined without a value; coercing to 0"
            ));
            Some(AttrValue::Int(0))
        } else {
            value
        };

        self.attrs.insert(
            name.to_string(),
            AttrDescriptor {
                name: name.to_string(),
                kind,
                value,
                default,
                read_only: false,
                owner_class: self.class_name.clone(),
            },
        );
        Ok(())
    }

    /// Return the current value of `name` (`None` if unset).
    ///
    /// # Errors
    ///
    /// Returns [`AttrError::UnknownAttribute`] if `name` is not defined.
    pub fn get(&self, name: &str) -> Result<Option<AttrValue>, AttrError> {
        self.descriptor(name).map(|d| d.value.clone())
    }

    /// Set the current value of `name`, and the default too if supplied.
    ///
    /// Returns the newly stored value.
    ///
    /// # Errors
    ///
    /// Returns [`AttrError::UnknownAttribute`] if `name` is not defined,
    /// [`AttrError::ReadOnlyViolation`] if it is read-only, or
    /// [`AttrError::InvalidKind`] on a Boolean-constraint violation. No
    /// state changes on failure.
    pub fn set(
        &mut self,
        name: &str,
        value: AttrValue,
        default: Option<AttrValue>,
    ) -> Result<AttrValue, AttrError> {
        let kind = {
            let desc = self.descriptor(name)?;
            if desc.read_only {
                return Err(AttrError::ReadOnlyViolation(name.to_string()));
            }
            desc.kind
        };
        check_kind(name, kind, Some(&value))?;
        check_kind(name, kind, default.as_ref())?;

        let desc = self.descriptor_mut(name)?;
        desc.value = Some(value.clone());
        if let Some(d) = default {
            desc.default = Some(d);
        }
        Ok(value)
    }

    /// Return the default value of `name` without mutating anything.
    ///
    /// # Errors
    ///
    /// Returns [`AttrError::UnknownAttribute`] if `name` is not defined.
    pub fn default_of(&self, name: &str) -> Result<Option<AttrValue>, AttrError> {
        self.descriptor(name).map(|d| d.default.clone())
    }

    /// Set `value := default` for one attribute, bypassing `read_only`.
    ///
    /// # Errors
    ///
    /// Returns [`AttrError::UnknownAttribute`] if `name` is not defined.
    pub fn reset(&mut self, name: &str) -> Result<(), AttrError> {
        let desc = self.descriptor_mut(name)?;
        desc.value = desc.default.clone();
        Ok(())
    }

    /// Set `value := default` for every attribute except the class
    /// placeholder. Never fails: read-only attributes are reset too.
    pub fn reset_all(&mut self) {
        for desc in self.attrs.values_mut() {
            if desc.name != CLASS_ATTR {
                desc.value = desc.default.clone();
            }
        }
    }

    /// Set `default := value` for one attribute, bypassing `read_only`.
    ///
    /// # Errors
    ///
    /// Returns [`AttrError::UnknownAttribute`] if `name` is not defined.
    pub fn sync(&mut self, name: &str) -> Result<(), AttrError> {
        let desc = self.descriptor_mut(name)?;
        desc.default = desc.value.clone();
        Ok(())
    }

    /// Set `default := value` for every attribute except the class
    /// placeholder.
    pub fn sync_all(&mut self) {
        for desc in self.attrs.values_mut() {
            if desc.name != CLASS_ATTR {
                desc.default = desc.value.clone();
            }
        }
    }

    /// Mark every named attribute read-only.
    ///
    /// Idempotent: attributes already read-only still count toward the
    /// returned total.
    ///
    /// # Errors
    ///
    /// Returns [`AttrError::UnknownAttribute`] if any name is undefined;
    /// in that case no flag is changed.
    pub fn ro(&mut self, names: &[&str]) -> Result<usize, AttrError> {
        self.set_read_only(names, true)
    }

    /// Mark every named attribute writable.
    ///
    /// Idempotent, with the same counting and atomicity as [`Self::ro`].
    ///
    /// # Errors
    ///
    /// Returns [`AttrError::UnknownAttribute`] if any name is undefined.
    pub fn rw(&mut self, names: &[&str]) -> Result<usize, AttrError> {
        self.set_read_only(names, false)
    }

    /// Return one metadata field of an attribute.
    ///
    /// `ReadOnly` renders as `Int(0)`/`Int(1)`; `Value` and `Default` may
    /// be `None` when unset; every other field is always present.
    ///
    /// # Errors
    ///
    /// Returns [`AttrError::UnknownAttribute`] if `name` is not defined.
    /// Unknown field strings fail earlier, in [`AttrField::from_str`],
    /// with [`AttrError::Syntax`].
    pub fn prop(&self, name: &str, field: AttrField) -> Result<Option<AttrValue>, AttrError> {
        let desc = self.descriptor(name)?;
        Ok(match field {
            AttrField::OwnerClass => Some(AttrValue::Str(desc.owner_class.clone())),
            AttrField::Default => desc.default.clone(),
            AttrField::Name => Some(AttrValue::Str(desc.name.clone())),
            AttrField::ReadOnly => Some(AttrValue::from(desc.read_only)),
            AttrField::Kind => Some(AttrValue::Str(desc.kind.name().to_string())),
            AttrField::Value => desc.value.clone(),
        })
    }

    /// Delete an attribute and return a snapshot of its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`AttrError::UnknownAttribute`] if `name` is not defined.
    pub fn remove(&mut self, name: &str) -> Result<AttrDescriptor, AttrError> {
        self.attrs
            .remove(name)
            .ok_or_else(|| AttrError::UnknownAttribute(name.to_string()))
    }

    /// Sorted public (non-underscore-prefixed) attribute names, with the
    /// owning type name prepended for display.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let mut out = vec![self.class_name.clone()];
        out.extend(self.public_names());
        out
    }

    /// Sorted public attribute names, without the display prefix.
    #[must_use]
    pub fn public_names(&self) -> Vec<String> {
        self.attrs
            .keys()
            .filter(|n| !n.starts_with('_'))
            .cloned()
            .collect()
    }

    /// Render a tabulated dump of every attribute through the logging
    /// collaborator, one `info` line per attribute, clamped to the
    /// terminal width.
    pub fn dump(&self) {
        let width = terminal_columns();
        self.log
            .info(&clamp(&format!("attributes of {}", self.class_name), width));
        for desc in self.attrs.values() {
            let line = format!(
                "  {:<16} {:<8} {} value={} default={} owner={}",
                desc.name,
                desc.kind,
                if desc.read_only { "ro" } else { "rw" },
                render(desc.value.as_ref()),
                render(desc.default.as_ref()),
                desc.owner_class,
            );
            self.log.info(&clamp(&line, width));
        }
    }

    fn descriptor(&self, name: &str) -> Result<&AttrDescriptor, AttrError> {
        self.attrs
            .get(name)
            .ok_or_else(|| AttrError::UnknownAttribute(name.to_string()))
    }

    fn descriptor_mut(&mut self, name: &str) -> Result<&mut AttrDescriptor, AttrError> {
        self.attrs
            .get_mut(name)
            .ok_or_else(|| AttrError::UnknownAttribute(name.to_string()))
    }

    fn set_read_only(&mut self, names: &[&str], flag: bool) -> Result<usize, AttrError> {
        // Validate every name before touching any flag.
        for name in names {
            self.descriptor(name)?;
        }
        for name in names {
            if let Some(desc) = self.attrs.get_mut(*name) {
                desc.read_only = flag;
            }
        }
        Ok(names.len())
    }
}

fn check_kind(name: &str, kind: AttrKind, value: Option<&AttrValue>) -> Result<(), AttrError> {
    if kind == AttrKind::Boolean
        && let Some(v) = value
        && !v.is_boolean()
    {
        return Err(AttrError::InvalidKind {
            name: name.to_string(),
            reason: format!("boolean values must be 0 or 1, got '{v}'"),
        });
    }
    Ok(())
}

fn render(value: Option<&AttrValue>) -> String {
    value.map_or_else(|| "<unset>".to_string(), ToString::to_string)
}

/// Current terminal width in columns, with a conventional fallback.
fn terminal_columns() -> usize {
    terminal_size::terminal_size().map_or(80, |(w, _)| w.0 as usize)
}

fn clamp(line: &str, width: usize) -> String {
    line.chars().take(width).collect()
}
