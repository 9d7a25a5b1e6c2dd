//! Service module - exposing receivers as remotely callable methods.
//!
//! Provides:
//! - [`ServiceDescriptor`] - a receiver and its method table, built once
//! - [`MethodDescriptor`] - argument/reply factories and a call counter
//! - [`ServiceBuilder`] - explicit method registration with name checks
//!
//! # Dispatch flow
//!
//! ```text
//! lookup(name) ─► new_argument()/new_reply() ─► codec.read_body(arg)
//!              ─► call(method, arg, reply)   ─► codec.write(header, reply)
//! ```

mod method;
mod naming;
mod registry;
mod shape;

pub use method::{MethodDescriptor, ValueDescriptor};
pub use naming::{is_exported, is_exported_or_builtin};
pub use registry::{ExcludedMethod, ExclusionReason, ServiceBuilder, ServiceDescriptor};
pub use shape::ValueShape;
