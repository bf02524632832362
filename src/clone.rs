//! Bulk attribute copying between two attribute-bearing objects.
//!
//! Two entry points: [`inherit`] copies the caller's captured
//! inheritable-attribute list and fails fast on read-only destinations;
//! [`clone_attrs`] copies the destination's full current public attribute
//! list under an explicit [`ClonePolicy`] governing read-only handling.
//!
//! Unset source values are not copied and do not count toward the
//! returned totals.

use crate::attrs::{AttrField, AttrRegistry, AttrValue};
use crate::error::AttrError;

/// Rule governing read-only destination attributes during a bulk copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClonePolicy {
    /// A read-only destination attribute aborts the whole copy.
    Normal,
    /// Temporarily flip read-only destinations writable, copy, then
    /// restore the flag; never aborts on read-only attributes.
    Force,
    /// Read-only destinations are excluded from copying; the returned
    /// count covers only the attributes actually copied.
    Skip,
}

/// Copy each named attribute from `src` into `dst`.
///
/// Used with the inheritable list captured at object construction.
/// Returns the number of attributes copied.
///
/// # Errors
///
/// Propagates [`AttrError::UnknownAttribute`] if either side lacks a
/// name, and [`AttrError::ReadOnlyViolation`] from the first read-only
/// destination; attributes copied before the failure remain applied.
pub fn inherit(
    dst: &mut AttrRegistry,
    src: &AttrRegistry,
    names: &[String],
) -> Result<usize, AttrError> {
    let mut copied = 0;
    for name in names {
        let Some(value) = src.get(name)? else {
            continue;
        };
        dst.set(name, value, None)?;
        copied += 1;
    }
    Ok(copied)
}

/// Copy every public attribute of `dst` from `src` under `policy`.
///
/// Returns the number of attributes actually copied (under
/// [`ClonePolicy::Skip`], read-only destinations are excluded from the
/// count).
///
/// # Errors
///
/// Propagates [`AttrError::UnknownAttribute`] if `src` lacks one of the
/// destination's attributes. Under [`ClonePolicy::Normal`] the first
/// read-only destination aborts with
/// [`AttrError::ReadOnlyViolation`].
pub fn clone_attrs(
    dst: &mut AttrRegistry,
    src: &AttrRegistry,
    policy: ClonePolicy,
) -> Result<usize, AttrError> {
    let mut copied = 0;
    for name in dst.public_names() {
        let Some(value) = src.get(&name)? else {
            continue;
        };
        let read_only = matches!(
            dst.prop(&name, AttrField::ReadOnly)?,
            Some(AttrValue::Int(1))
        );
        match policy {
            ClonePolicy::Normal => {
                dst.set(&name, value, None)?;
            }
            ClonePolicy::Force => {
                if read_only {
                    dst.rw(&[name.as_str()])?;
                    let result = dst.set(&name, value, None);
                    dst.ro(&[name.as_str()])?;
                    result?;
                } else {
                    dst.set(&name, value, None)?;
                }
            }
            ClonePolicy::Skip => {
                if read_only {
                    continue;
                }
                dst.set(&name, value, None)?;
            }
        }
        copied += 1;
    }
    Ok(copied)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::attrs::AttrKind;
    use crate::logging::RecordingLog;
    use std::sync::Arc;

    fn registry(values: &[(&str, &str)]) -> AttrRegistry {
        let mut reg = AttrRegistry::new("Batch", Arc::new(RecordingLog::new()));
        for (name, value) in values {
            reg.define(name, AttrKind::Any, Some((*value).into()), None)
                .unwrap();
        }
        reg
    }

    #[test]
    fn inherit_copies_named_attributes() {
        let src = registry(&[("a", "1"), ("b", "2")]);
        let mut dst = registry(&[("a", "x"), ("b", "y")]);
        let names = vec!["a".to_string(), "b".to_string()];
        let copied = inherit(&mut dst, &src, &names).unwrap();
        assert_eq!(copied, 2);
        assert_eq!(dst.get("a").unwrap(), Some(AttrValue::from("1")));
        assert_eq!(dst.get("b").unwrap(), Some(AttrValue::from("2")));
    }

    #[test]
    fn inherit_fails_fast_on_read_only() {
        let src = registry(&[("a", "1"), ("b", "2")]);
        let mut dst = registry(&[("a", "x"), ("b", "y")]);
        dst.ro(&["a"]).unwrap();
        let err = inherit(&mut dst, &src, &["a".to_string(), "b".to_string()]).unwrap_err();
        assert!(matches!(err, AttrError::ReadOnlyViolation(_)));
        // "b" was never reached.
        assert_eq!(dst.get("b").unwrap(), Some(AttrValue::from("y")));
    }

    #[test]
    fn inherit_skips_unset_source_values() {
        let mut src = registry(&[("a", "1")]);
        src.define("empty", AttrKind::Any, None, None).unwrap();
        let mut dst = registry(&[("a", "x")]);
        dst.define("empty", AttrKind::Any, None, None).unwrap();
        let copied = inherit(&mut dst, &src, &["a".to_string(), "empty".to_string()]).unwrap();
        assert_eq!(copied, 1);
        assert_eq!(dst.get("empty").unwrap(), None);
    }

    #[test]
    fn inherit_unknown_source_attribute_fails() {
        let src = registry(&[]);
        let mut dst = registry(&[("a", "x")]);
        let err = inherit(&mut dst, &src, &["a".to_string()]).unwrap_err();
        assert!(matches!(err, AttrError::UnknownAttribute(_)));
    }

    #[test]
    fn normal_clone_aborts_on_read_only() {
        let src = registry(&[("a", "1"), ("b", "2")]);
        let mut dst = registry(&[("a", "x"), ("b", "y")]);
        dst.ro(&["b"]).unwrap();
        let err = clone_attrs(&mut dst, &src, ClonePolicy::Normal).unwrap_err();
        assert!(matches!(err, AttrError::ReadOnlyViolation(_)));
    }

    #[test]
    fn force_clone_copies_and_restores_read_only() {
        let src = registry(&[("a", "1"), ("b", "2")]);
        let mut dst = registry(&[("a", "x"), ("b", "y")]);
        dst.ro(&["b"]).unwrap();
        let copied = clone_attrs(&mut dst, &src, ClonePolicy::Force).unwrap();
        assert_eq!(copied, 2);
        assert_eq!(dst.get("b").unwrap(), Some(AttrValue::from("2")));
        assert_eq!(
            dst.prop("b", AttrField::ReadOnly).unwrap(),
            Some(AttrValue::Int(1))
        );
    }

    #[test]
    fn force_clone_restores_flag_even_when_set_fails() {
        let mut src = registry(&[]);
        src.define("flag", AttrKind::Any, Some("not a bool".into()), None)
            .unwrap();
        let mut dst = registry(&[]);
        dst.define("flag", AttrKind::Boolean, Some(0.into()), None)
            .unwrap();
        dst.ro(&["flag"]).unwrap();
        let err = clone_attrs(&mut dst, &src, ClonePolicy::Force).unwrap_err();
        assert!(matches!(err, AttrError::InvalidKind { .. }));
        assert_eq!(
            dst.prop("flag", AttrField::ReadOnly).unwrap(),
            Some(AttrValue::Int(1))
        );
    }

    #[test]
    fn skip_clone_excludes_read_only_from_count() {
        let src = registry(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let mut dst = registry(&[("a", "x"), ("b", "y"), ("c", "z")]);
        dst.ro(&["b"]).unwrap();
        let copied = clone_attrs(&mut dst, &src, ClonePolicy::Skip).unwrap();
        assert_eq!(copied, 2);
        assert_eq!(dst.get("b").unwrap(), Some(AttrValue::from("y")));
        assert_eq!(dst.get("a").unwrap(), Some(AttrValue::from("1")));
        assert_eq!(dst.get("c").unwrap(), Some(AttrValue::from("3")));
    }

    #[test]
    fn clone_ignores_class_placeholder() {
        let src = AttrRegistry::new("Other", Arc::new(RecordingLog::new()));
        let mut dst = registry(&[]);
        let copied = clone_attrs(&mut dst, &src, ClonePolicy::Normal).unwrap();
        assert_eq!(copied, 0);
        assert_eq!(dst.class_name(), "Batch");
    }
}
