//! Type-erased frame bodies.
//!
//! A [`Body`] is any serde value seen through a trait object, so that a codec
//! can decode into a caller-allocated value without knowing its type, and the
//! registry can hand argument/reply instances around opaquely.

use std::any::Any;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A value that can be encoded from and decoded into by any codec.
///
/// Implemented for every `Serialize + DeserializeOwned + Send + 'static` type.
pub trait Body: Any + Send {
    /// Erased serializer view of the value.
    fn encode(&self) -> &dyn erased_serde::Serialize;

    /// Replace the value with one read from `de`.
    fn decode(
        &mut self,
        de: &mut dyn erased_serde::Deserializer<'_>,
    ) -> std::result::Result<(), erased_serde::Error>;

    /// Name of the concrete type.
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<T> Body for T
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    fn encode(&self) -> &dyn erased_serde::Serialize {
        self
    }

    fn decode(
        &mut self,
        de: &mut dyn erased_serde::Deserializer<'_>,
    ) -> std::result::Result<(), erased_serde::Error> {
        *self = erased_serde::deserialize(de)?;
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl dyn Body {
    /// Borrow the value as `T` if that is its concrete type.
    #[inline]
    pub fn downcast_ref<T: Body>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Mutably borrow the value as `T` if that is its concrete type.
    #[inline]
    pub fn downcast_mut<T: Body>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Check the concrete type.
    #[inline]
    pub fn is<T: Body>(&self) -> bool {
        self.as_any().is::<T>()
    }
}
