//! Batch-processing convenience engine.
//!
//! Thin, reconfigurable wrapping of OS shell invocation, directory
//! manipulation, and platform detection, built around a runtime property
//! system that gives every host object typed, validated, introspectable
//! state.
//!
//! The public API is organised into three core components and their
//! collaborators:
//!
//! - **[`attrs`]** — per-object attribute registry: typed descriptors with
//!   independent current/default values, read-only gating, introspection
//! - **[`lov`]** — shared controlled-vocabulary registry: named sets of
//!   valid values with randomized and conditional assignment helpers
//! - **[`clone`]** — bulk attribute copy between objects under an explicit
//!   read-only policy
//! - **[`session`]** — the [`Batch`](session::Batch) host object wiring the
//!   registries to the shell ([`exec`]), directory ([`fsops`]), and
//!   platform ([`platform`]) wrappers, with the fatal-policy escalation
//!   contract
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod attrs;
pub mod clone;
pub mod error;
pub mod exec;
pub mod fsops;
pub mod logging;
pub mod lov;
pub mod platform;
pub mod session;

pub use attrs::{AttrDescriptor, AttrField, AttrKind, AttrRegistry, AttrValue};
pub use clone::ClonePolicy;
pub use error::{AttrError, BatchError, LovError};
pub use logging::Log;
pub use lov::{Picker, SharedLov};
pub use session::Batch;
