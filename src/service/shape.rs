//! Top-level shape of a value type, probed once through serde.
//!
//! The probe is a serializer that stops at the first call it receives, so
//! describing a type costs one `Default` allocation at registration time.

use std::fmt;

use serde::ser::{self, Impossible, Serialize, Serializer};

/// Kind of value a parameter type serializes as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    /// Numbers, booleans, strings, bytes and `None`.
    Scalar,
    /// Sequences, tuples and tuple structs.
    Sequence,
    /// Key-value maps.
    Map,
    /// Structs with named fields.
    Struct,
    /// Enum variants.
    Enum,
    /// `()` and unit structs.
    Unit,
}

impl ValueShape {
    /// Probe the shape of `value`.
    pub fn of<T: Serialize + ?Sized>(value: &T) -> ValueShape {
        match value.serialize(Probe) {
            Ok(shape) | Err(Stop(Some(shape))) => shape,
            // The type refused to serialize its default; it still decodes.
            Err(Stop(None)) => ValueShape::Scalar,
        }
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueShape::Scalar => "scalar",
            ValueShape::Sequence => "sequence",
            ValueShape::Map => "map",
            ValueShape::Struct => "struct",
            ValueShape::Enum => "enum",
            ValueShape::Unit => "unit",
        };
        f.write_str(name)
    }
}

/// Early exit carrying the shape of a compound value.
#[derive(Debug)]
struct Stop(Option<ValueShape>);

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape probe stopped at {:?}", self.0)
    }
}

impl std::error::Error for Stop {}

impl ser::Error for Stop {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        Stop(None)
    }
}

struct Probe;

type Rest = Impossible<ValueShape, Stop>;

impl Serializer for Probe {
    type Ok = ValueShape;
    type Error = Stop;
    type SerializeSeq = Rest;
    type SerializeTuple = Rest;
    type SerializeTupleStruct = Rest;
    type SerializeTupleVariant = Rest;
    type SerializeMap = Rest;
    type SerializeStruct = Rest;
    type SerializeStructVariant = Rest;

    fn serialize_bool(self, _v: bool) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_i8(self, _v: i8) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_i16(self, _v: i16) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_i32(self, _v: i32) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_i64(self, _v: i64) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_i128(self, _v: i128) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_u8(self, _v: u8) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_u16(self, _v: u16) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_u32(self, _v: u32) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_u64(self, _v: u64) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_u128(self, _v: u128) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_f32(self, _v: f32) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_f64(self, _v: f64) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_char(self, _v: char) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_str(self, _v: &str) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_none(self) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Scalar)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<ValueShape, Stop> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Unit)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Unit)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Enum)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<ValueShape, Stop> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<ValueShape, Stop> {
        Ok(ValueShape::Enum)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Rest, Stop> {
        Err(Stop(Some(ValueShape::Sequence)))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Rest, Stop> {
        Err(Stop(Some(ValueShape::Sequence)))
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Rest, Stop> {
        Err(Stop(Some(ValueShape::Sequence)))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Rest, Stop> {
        Err(Stop(Some(ValueShape::Enum)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Rest, Stop> {
        Err(Stop(Some(ValueShape::Map)))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Rest, Stop> {
        Err(Stop(Some(ValueShape::Struct)))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Rest, Stop> {
        Err(Stop(Some(ValueShape::Enum)))
    }
}
