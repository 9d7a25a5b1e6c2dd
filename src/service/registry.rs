//! Service descriptors: a receiver plus its table of callable methods.
//!
//! Methods are listed explicitly on a [`ServiceBuilder`]. The type system
//! enforces the call shape (`&self`, one argument, one mutable reply, an error
//! return); the builder additionally requires exported names and silently
//! drops methods that fail, recording them for diagnostics.
//!
//! # Example
//!
//! ```
//! use rpcwire::service::ServiceDescriptor;
//!
//! #[derive(Default)]
//! struct Arith;
//!
//! impl Arith {
//!     fn multiply(&self, args: (i64, i64), reply: &mut i64) -> Result<(), std::fmt::Error> {
//!         *reply = args.0 * args.1;
//!         Ok(())
//!     }
//! }
//!
//! let service = ServiceDescriptor::builder(Arith)
//!     .method("Multiply", Arith::multiply)
//!     .build()
//!     .unwrap();
//!
//! let method = service.lookup("Multiply").unwrap();
//! let mut reply = method.new_reply();
//! service.call(method, Box::new((6i64, 7i64)), reply.as_mut()).unwrap();
//! assert_eq!(reply.downcast_ref::<i64>(), Some(&42));
//! ```

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::method::MethodDescriptor;
use super::naming::{is_exported_identifier, is_exported_or_builtin, short_type_name};
use crate::codec::Body;
use crate::error::{MethodError, Result, RpcwireError};

/// Why a method was left out of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    /// The method name is not an exported identifier.
    UnexportedName,
    /// The argument type is neither exported nor built-in.
    UnexportedArgument(&'static str),
    /// The reply type is neither exported nor built-in.
    UnexportedReply(&'static str),
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexportedName => f.write_str("method name is not exported"),
            Self::UnexportedArgument(t) => write!(f, "argument type {} is not exported", t),
            Self::UnexportedReply(t) => write!(f, "reply type {} is not exported", t),
        }
    }
}

/// A method dropped during registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedMethod {
    /// Name it was offered under.
    pub name: String,
    /// First rule it failed.
    pub reason: ExclusionReason,
}

/// Check the name rules of the remotely-callable predicate.
fn check_callable(
    name: &str,
    argument: &'static str,
    reply: &'static str,
) -> Option<ExclusionReason> {
    if !is_exported_identifier(name) {
        Some(ExclusionReason::UnexportedName)
    } else if !is_exported_or_builtin(argument) {
        Some(ExclusionReason::UnexportedArgument(argument))
    } else if !is_exported_or_builtin(reply) {
        Some(ExclusionReason::UnexportedReply(reply))
    } else {
        None
    }
}

/// Collects the methods of one receiver before validation.
pub struct ServiceBuilder<R> {
    receiver: Arc<R>,
    name: Option<String>,
    methods: Vec<MethodDescriptor>,
    excluded: Vec<ExcludedMethod>,
}

impl<R: Send + Sync + 'static> ServiceBuilder<R> {
    fn new(receiver: Arc<R>) -> Self {
        Self {
            receiver,
            name: None,
            methods: Vec::new(),
            excluded: Vec::new(),
        }
    }

    /// Override the service name (defaults to the receiver's type name).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Offer a method under `name`.
    ///
    /// Methods whose name or parameter types are not exported are silently
    /// left out; see [`ServiceDescriptor::excluded`].
    pub fn method<A, Rp, E, F>(mut self, name: &str, f: F) -> Self
    where
        A: Serialize + DeserializeOwned + Default + Send + 'static,
        Rp: Serialize + DeserializeOwned + Default + Send + 'static,
        E: Into<MethodError>,
        F: Fn(&R, A, &mut Rp) -> std::result::Result<(), E> + Send + Sync + 'static,
    {
        if let Some(reason) = check_callable(name, type_name::<A>(), type_name::<Rp>()) {
            tracing::debug!("rpc server: skip {}: {}", name, reason);
            self.excluded.push(ExcludedMethod {
                name: name.to_string(),
                reason,
            });
            return self;
        }
        self.methods.push(MethodDescriptor::new(name, f));
        self
    }

    /// Validate and freeze the service.
    ///
    /// # Errors
    ///
    /// - [`RpcwireError::InvalidServiceName`] if the name is not exported
    /// - [`RpcwireError::DuplicateMethod`] if a method name was offered twice
    ///
    /// Nothing is registered on error.
    pub fn build(self) -> Result<ServiceDescriptor> {
        let name = self
            .name
            .unwrap_or_else(|| short_type_name(type_name::<R>()).to_string());
        if !is_exported_identifier(&name) {
            tracing::error!("rpc server: {} is not a valid service name", name);
            return Err(RpcwireError::InvalidServiceName(name));
        }

        let mut methods = HashMap::with_capacity(self.methods.len());
        for method in self.methods {
            if methods.contains_key(method.name()) {
                return Err(RpcwireError::DuplicateMethod {
                    service: name,
                    method: method.name().to_string(),
                });
            }
            methods.insert(method.name().to_string(), method);
        }

        let mut names: Vec<&String> = methods.keys().collect();
        names.sort_unstable();
        for method in names.into_iter().map(|n| &methods[n]) {
            tracing::info!(
                "rpc server: register {}.{}({}) -> {}",
                name,
                method.name(),
                method.argument(),
                method.reply()
            );
        }

        Ok(ServiceDescriptor {
            name,
            type_name: type_name::<R>(),
            receiver: self.receiver,
            methods,
            excluded: self.excluded,
        })
    }
}

/// A registered receiver and its callable methods.
///
/// The method set is fixed at construction. Calls may run concurrently from
/// any number of threads.
pub struct ServiceDescriptor {
    name: String,
    type_name: &'static str,
    receiver: Arc<dyn Any + Send + Sync>,
    methods: HashMap<String, MethodDescriptor>,
    excluded: Vec<ExcludedMethod>,
}

impl ServiceDescriptor {
    /// Start describing a service backed by `receiver`.
    pub fn builder<R: Send + Sync + 'static>(receiver: R) -> ServiceBuilder<R> {
        ServiceBuilder::new(Arc::new(receiver))
    }

    /// Start describing a service backed by a shared receiver.
    pub fn builder_arc<R: Send + Sync + 'static>(receiver: Arc<R>) -> ServiceBuilder<R> {
        ServiceBuilder::new(receiver)
    }

    /// Service name, as used before the dot in `Service.Method`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full type name of the receiver.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the receiver as `R`.
    pub fn receiver<R: Any>(&self) -> Option<&R> {
        self.receiver.downcast_ref()
    }

    /// Find a method by exact, case-sensitive name.
    pub fn lookup(&self, method: &str) -> Result<&MethodDescriptor> {
        self.methods
            .get(method)
            .ok_or_else(|| RpcwireError::MethodNotFound {
                service: self.name.clone(),
                method: method.to_string(),
            })
    }

    /// Invoke `method` on the receiver.
    ///
    /// `replyv` is filled in place. The method's own error comes back as-is,
    /// boxed but not wrapped; the call is counted either way.
    pub fn call(
        &self,
        method: &MethodDescriptor,
        argv: Box<dyn Body>,
        replyv: &mut dyn Body,
    ) -> std::result::Result<(), MethodError> {
        method.invoke(&*self.receiver, argv, replyv)
    }

    /// Registered method names, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All registered methods, in no particular order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.values()
    }

    /// Methods offered to the builder but left out.
    pub fn excluded(&self) -> &[ExcludedMethod] {
        &self.excluded
    }

    /// Number of registered methods.
    #[inline]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Check if no method was registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("methods", &self.method_names())
            .field("excluded", &self.excluded)
            .finish()
    }
}
