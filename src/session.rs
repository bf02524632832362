//! The batch host object.
//!
//! A [`Batch`] owns one attribute registry holding all of its
//! configuration state (retry count, echo flag, starting directory, fatal
//! policy), shares the process-wide LoV registry through a cloned handle,
//! and exposes the shell and directory conveniences that make up the bulk
//! of the library. Every convenience flows through the registry, so
//! behavior is reconfigurable at runtime by attribute name.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::attrs::{AttrKind, AttrRegistry, AttrValue};
use crate::clone::{self, ClonePolicy};
use crate::error::{AttrError, BatchError};
use crate::exec::{self, ExecResult};
use crate::fsops::{FsOps, SystemFsOps};
use crate::logging::{Log, TracingLog};
use crate::lov::SharedLov;
use crate::platform::Platform;

/// Name of the attribute holding the retry count for [`Batch::run`].
pub const ATTR_RETRIES: &str = "retries";
/// Name of the Boolean attribute echoing commands before execution.
pub const ATTR_ECHO: &str = "echo";
/// Name of the Boolean attribute selecting fatal escalation.
pub const ATTR_FATAL: &str = "fatal";
/// Name of the attribute holding the working directory for [`Batch::run`].
pub const ATTR_STARTDIR: &str = "startdir";
/// Name of the hidden attribute holding the injected logger handle.
pub const ATTR_LOGGER: &str = "_logger";

/// Batch-processing host object.
pub struct Batch {
    attrs: AttrRegistry,
    inheritable: Vec<String>,
    lov: SharedLov,
    log: Arc<dyn Log>,
    platform: Platform,
    fs: Arc<dyn FsOps>,
}

impl std::fmt::Debug for Batch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch")
            .field("attrs", &self.attrs)
            .field("inheritable", &self.inheritable)
            .field("lov", &self.lov)
            .field("log", &"<dyn Log>")
            .field("platform", &self.platform)
            .field("fs", &"<dyn FsOps>")
            .finish()
    }
}

impl Batch {
    /// Create a host object with the default tracing logger and real
    /// filesystem operations.
    ///
    /// # Errors
    ///
    /// Returns an error if the standard attributes cannot be defined.
    pub fn new(lov: SharedLov) -> Result<Self, AttrError> {
        Self::with_log(lov, Arc::new(TracingLog))
    }

    /// Create a host object with an explicit logging collaborator.
    ///
    /// Defines the standard configuration attributes, registers the `os`
    /// enumeration class, and captures the inheritable set: every public
    /// attribute name present at this point. Attributes defined later are
    /// not automatically inheritable.
    ///
    /// # Errors
    ///
    /// Returns an error if the standard attributes cannot be defined.
    pub fn with_log(lov: SharedLov, log: Arc<dyn Log>) -> Result<Self, AttrError> {
        let mut attrs = AttrRegistry::new("Batch", Arc::clone(&log));
        let startdir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let startdir = AttrValue::Str(startdir.display().to_string());

        attrs.define(
            ATTR_RETRIES,
            AttrKind::Any,
            Some(AttrValue::Int(0)),
            Some(AttrValue::Int(0)),
        )?;
        attrs.define(
            ATTR_ECHO,
            AttrKind::Boolean,
            Some(AttrValue::Int(0)),
            Some(AttrValue::Int(0)),
        )?;
        attrs.define(
            ATTR_FATAL,
            AttrKind::Boolean,
            Some(AttrValue::Int(0)),
            Some(AttrValue::Int(0)),
        )?;
        attrs.define(
            ATTR_STARTDIR,
            AttrKind::Any,
            Some(startdir.clone()),
            Some(startdir),
        )?;
        attrs.define(
            ATTR_LOGGER,
            AttrKind::OpaqueHandle,
            Some(AttrValue::Handle(Arc::clone(&log))),
            None,
        )?;

        Platform::register_lov(&lov);
        let inheritable = attrs.public_names();

        Ok(Self {
            attrs,
            inheritable,
            lov,
            log,
            platform: Platform::detect(),
            fs: Arc::new(SystemFsOps),
        })
    }

    /// Replace the filesystem operations implementation (for testing).
    #[must_use]
    pub fn with_fs_ops(mut self, fs: Arc<dyn FsOps>) -> Self {
        self.fs = fs;
        self
    }

    /// The attribute registry holding this object's configuration.
    #[must_use]
    pub fn attrs(&self) -> &AttrRegistry {
        &self.attrs
    }

    /// Mutable access to the attribute registry.
    pub fn attrs_mut(&mut self) -> &mut AttrRegistry {
        &mut self.attrs
    }

    /// The shared LoV registry handle.
    #[must_use]
    pub fn lov(&self) -> &SharedLov {
        &self.lov
    }

    /// The logging collaborator.
    #[must_use]
    pub fn log(&self) -> &Arc<dyn Log> {
        &self.log
    }

    /// Detected platform information.
    #[must_use]
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// The attribute names captured as inheritable at construction.
    #[must_use]
    pub fn inheritable(&self) -> &[String] {
        &self.inheritable
    }

    /// Whether the fatal escalation policy is enabled.
    ///
    /// Reads the `fatal` Boolean attribute; an unset or missing flag
    /// counts as disabled.
    #[must_use]
    pub fn fatal(&self) -> bool {
        matches!(self.attrs.get(ATTR_FATAL), Ok(Some(AttrValue::Int(1))))
    }

    /// Apply the failure-escalation contract to a registry result.
    ///
    /// In fatal mode the error propagates unchanged, for the caller to
    /// escalate into process termination. In non-fatal mode the error is
    /// logged as a warning and the `None` sentinel is returned instead.
    ///
    /// # Errors
    ///
    /// Propagates `result`'s error only when the fatal policy is enabled.
    pub fn absorb<T>(&self, result: Result<T, BatchError>) -> Result<Option<T>, BatchError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if !self.fatal() => {
                self.log.warn(&err.to_string());
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Read a Boolean attribute as `bool`.
    ///
    /// An unset value coerces to `false` with a logged warning, matching
    /// the define-time coercion rule. A defined non-integer value also
    /// reads as `false`, with a warning naming the kind mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`AttrError::UnknownAttribute`] if `name` is not defined.
    pub fn bool_attr(&self, name: &str) -> Result<bool, AttrError> {
        match self.attrs.get(name)? {
            Some(AttrValue::Int(1)) => Ok(true),
            Some(AttrValue::Int(_)) => Ok(false),
            Some(other) => {
                self.log.warn(&format!(
                    "boolean attribute '{name}' holds a {} value; reading as 0",
                    other.type_name()
                ));
                Ok(false)
            }
            None => {
                self.log
                    .warn(&format!("boolean attribute '{name}' is unset; reading as 0"));
                Ok(false)
            }
        }
    }

    /// Read an integer attribute; unset or non-numeric values read as 0.
    ///
    /// # Errors
    ///
    /// Returns [`AttrError::UnknownAttribute`] if `name` is not defined.
    pub fn int_attr(&self, name: &str) -> Result<i64, AttrError> {
        Ok(self
            .attrs
            .get(name)?
            .and_then(|v| v.as_int())
            .unwrap_or(0))
    }

    /// Copy the inheritable attributes from another host object.
    ///
    /// Returns the number of attributes copied.
    ///
    /// # Errors
    ///
    /// Fails fast with [`AttrError::ReadOnlyViolation`] on the first
    /// read-only destination; no policy override exists in this form.
    pub fn inherit(&mut self, source: &Self) -> Result<usize, AttrError> {
        let names = self.inheritable.clone();
        clone::inherit(&mut self.attrs, &source.attrs, &names)
    }

    /// Copy the full current public attribute list from another host
    /// object under an explicit read-only policy.
    ///
    /// # Errors
    ///
    /// See [`clone::clone_attrs`].
    pub fn clone_attrs(&mut self, source: &Self, policy: ClonePolicy) -> Result<usize, AttrError> {
        clone::clone_attrs(&mut self.attrs, &source.attrs, policy)
    }

    /// Run a command, honoring the `startdir`, `echo`, and `retries`
    /// attributes.
    ///
    /// The command executes in the canonicalized starting directory, is
    /// echoed through the logger when `echo` is 1, and is retried up to
    /// `retries` extra times on failure.
    ///
    /// # Errors
    ///
    /// Returns the last execution error once every attempt has failed,
    /// or an attribute error if the configuration attributes are missing.
    pub fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let dir = self.start_dir()?;
        let echo = self.bool_attr(ATTR_ECHO)?;
        let retries = usize::try_from(self.int_attr(ATTR_RETRIES)?).unwrap_or(0);

        let mut last_err = None;
        for attempt in 0..=retries {
            if echo {
                self.log.info(&format!("+ {program} {}", args.join(" ")));
            }
            match exec::run_in(&dir, program, args) {
                Ok(result) => return Ok(result),
                Err(err) => {
                    if attempt < retries {
                        self.log
                            .debug(&format!("{program} failed, retrying ({err:#})"));
                    }
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("{program} failed")))
    }

    /// Create a directory (and parents), logging the action.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails.
    pub fn make_dir(&self, path: &Path) -> Result<()> {
        self.log.debug(&format!("mkdir {}", path.display()));
        self.fs.make_dir(path)
    }

    /// Remove a directory tree, logging the action.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    pub fn remove_dir(&self, path: &Path) -> Result<()> {
        self.log.debug(&format!("rmdir {}", path.display()));
        self.fs.remove_dir(path)
    }

    /// Set Unix permission bits on a path, logging the action.
    ///
    /// # Errors
    ///
    /// Returns an error if the permissions cannot be changed.
    pub fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        self.log.debug(&format!("chmod {mode:o} {}", path.display()));
        self.fs.set_mode(path, mode)
    }

    fn start_dir(&self) -> Result<PathBuf> {
        let raw = self
            .attrs
            .get(ATTR_STARTDIR)
            .map_err(BatchError::from)?
            .and_then(|v| v.as_str().map(ToString::to_string))
            .unwrap_or_else(|| ".".to_string());
        self.fs.canonicalize(Path::new(&raw))
    }
}
