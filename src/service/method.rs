//! Method descriptors: one remotely callable method of a service.
//!
//! Each descriptor carries factories for its argument and reply values, an
//! atomic call counter, and a type-erased invoker built once at registration.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::naming::short_type_name;
use super::shape::ValueShape;
use crate::codec::Body;
use crate::error::{MethodError, RpcwireError};

/// Receiver of any service.
type ErasedReceiver = dyn Any + Send + Sync;

/// Type-erased call: receiver, owned argument, reply mutated in place.
type Invoker =
    dyn Fn(&ErasedReceiver, Box<dyn Body>, &mut dyn Body) -> Result<(), MethodError> + Send + Sync;

/// Describes one parameter type and how to allocate it.
#[derive(Clone, Copy)]
pub struct ValueDescriptor {
    type_name: &'static str,
    shape: ValueShape,
    factory: fn() -> Box<dyn Body>,
}

impl ValueDescriptor {
    /// Describe `T`, probing its shape from `T::default()`.
    pub fn of<T>() -> Self
    where
        T: Serialize + DeserializeOwned + Default + Send + 'static,
    {
        Self {
            type_name: type_name::<T>(),
            shape: ValueShape::of(&T::default()),
            factory: new_default::<T>,
        }
    }

    /// Full name of the described type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Top-level shape of the described type.
    #[inline]
    pub fn shape(&self) -> ValueShape {
        self.shape
    }

    /// Allocate a fresh zero value.
    ///
    /// Maps and sequences come back empty, never absent.
    #[inline]
    pub fn new_value(&self) -> Box<dyn Body> {
        (self.factory)()
    }
}

impl fmt::Debug for ValueDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueDescriptor")
            .field("type_name", &self.type_name)
            .field("shape", &self.shape)
            .finish()
    }
}

impl fmt::Display for ValueDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.shape, short_type_name(self.type_name))
    }
}

fn new_default<T>() -> Box<dyn Body>
where
    T: Serialize + DeserializeOwned + Default + Send + 'static,
{
    Box::new(T::default())
}

/// One remotely callable method.
pub struct MethodDescriptor {
    name: String,
    argument: ValueDescriptor,
    reply: ValueDescriptor,
    num_calls: AtomicU64,
    invoke: Box<Invoker>,
}

impl MethodDescriptor {
    /// Wrap `f` as a method of receivers of type `R`.
    pub(crate) fn new<R, A, Rp, E, F>(name: &str, f: F) -> Self
    where
        R: Send + Sync + 'static,
        A: Serialize + DeserializeOwned + Default + Send + 'static,
        Rp: Serialize + DeserializeOwned + Default + Send + 'static,
        E: Into<MethodError>,
        F: Fn(&R, A, &mut Rp) -> Result<(), E> + Send + Sync + 'static,
    {
        let invoke = move |receiver: &ErasedReceiver,
                           argv: Box<dyn Body>,
                           replyv: &mut dyn Body|
              -> Result<(), MethodError> {
            let receiver = receiver
                .downcast_ref::<R>()
                .ok_or(RpcwireError::TypeMismatch {
                    expected: type_name::<R>(),
                    found: "receiver of another service",
                })?;
            let found = argv.type_name();
            let argv = argv
                .into_any()
                .downcast::<A>()
                .map_err(|_| RpcwireError::TypeMismatch {
                    expected: type_name::<A>(),
                    found,
                })?;
            let found = replyv.type_name();
            let replyv = replyv
                .as_any_mut()
                .downcast_mut::<Rp>()
                .ok_or(RpcwireError::TypeMismatch {
                    expected: type_name::<Rp>(),
                    found,
                })?;
            f(receiver, *argv, replyv).map_err(Into::into)
        };

        Self {
            name: name.to_string(),
            argument: ValueDescriptor::of::<A>(),
            reply: ValueDescriptor::of::<Rp>(),
            num_calls: AtomicU64::new(0),
            invoke: Box::new(invoke),
        }
    }

    /// Method name, as used after the dot in `Service.Method`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument (first parameter) type.
    #[inline]
    pub fn argument(&self) -> &ValueDescriptor {
        &self.argument
    }

    /// Reply (second parameter) type.
    #[inline]
    pub fn reply(&self) -> &ValueDescriptor {
        &self.reply
    }

    /// Allocate a zero argument for a codec to decode into.
    #[inline]
    pub fn new_argument(&self) -> Box<dyn Body> {
        self.argument.new_value()
    }

    /// Allocate a zero reply for the method to fill in.
    #[inline]
    pub fn new_reply(&self) -> Box<dyn Body> {
        self.reply.new_value()
    }

    /// Number of times this method has been called.
    #[inline]
    pub fn num_calls(&self) -> u64 {
        self.num_calls.load(Ordering::Acquire)
    }

    /// Count the call, then run it. Counted even when it fails.
    pub(crate) fn invoke(
        &self,
        receiver: &ErasedReceiver,
        argv: Box<dyn Body>,
        replyv: &mut dyn Body,
    ) -> Result<(), MethodError> {
        self.num_calls.fetch_add(1, Ordering::AcqRel);
        (self.invoke)(receiver, argv, replyv)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("argument", &self.argument)
            .field("reply", &self.reply)
            .field("num_calls", &self.num_calls())
            .finish()
    }
}
