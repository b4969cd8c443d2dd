//! Implementation of [serde::ser::Serializer] for [VarSerializer]

use serde::ser;

use super::consts::{ENVELOPE_ARITY, OPTION_NONE, OPTION_SOME};
use super::encoder::Encoder;
use super::err::{overflow, CodecResult, Error};
use super::field::FieldEncoder;
use crate::config::CodecConfig;

/// Serializes any [serde::Serialize] type into the binary wire format.
///
/// Structs write their fields in declaration order with no header, sequences
/// and maps write a count header, and enum variants are written like an
/// envelope: an array header of 2, the variant index, then the payload.
#[derive(Debug, Default)]
pub struct VarSerializer {
    pub(crate) output: Encoder,
}

impl VarSerializer {
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            output: Encoder::with_config(config),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.output.into_bytes()
    }

    /// Writes the variant envelope header.
    fn open_variant(&mut self, variant_index: u32) -> CodecResult<()> {
        self.output.open_array("", ENVELOPE_ARITY)?;
        self.output.encode_int("", i64::from(variant_index))
    }
}

/// Impl serialize for numeric primitives that widen losslessly into `i64`
macro_rules! serialize_numeric_primitive {
    ($fn_name: ident, $num_type: ty) => {
        fn $fn_name(self, v: $num_type) -> Result<Self::Ok, Self::Error> {
            self.output.encode_int("", i64::from(v))
        }
    };
}

impl<'a> ser::Serializer for &'a mut VarSerializer {
    type Ok = ();

    type Error = Error;

    type SerializeSeq = Self;

    type SerializeTuple = Self;

    type SerializeTupleStruct = Self;

    type SerializeTupleVariant = Self;

    type SerializeMap = Self;

    type SerializeStruct = Self;

    type SerializeStructVariant = Self;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        self.output.encode_bool("", v)
    }

    serialize_numeric_primitive! {serialize_i8, i8}
    serialize_numeric_primitive! {serialize_i16, i16}
    serialize_numeric_primitive! {serialize_i32, i32}
    serialize_numeric_primitive! {serialize_i64, i64}

    serialize_numeric_primitive! {serialize_u8, u8}
    serialize_numeric_primitive! {serialize_u16, u16}
    serialize_numeric_primitive! {serialize_u32, u32}

    // the upper half of u64 has no varint representation
    fn serialize_u64(self, v: u64) -> Result<Self::Ok, Self::Error> {
        let v = i64::try_from(v).map_err(|_| overflow("i64"))?;
        self.output.encode_int("", v)
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        self.output.encode_f32("", v)
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Self::Error> {
        self.output.encode_f64("", v)
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        let mut buf = [0_u8; 4];
        self.output.encode_string("", v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        self.output.encode_string("", v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        self.output.encode_binary("", v)
    }

    // none is an empty array
    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        self.output.open_array("", OPTION_NONE)?;
        self.output.close()
    }

    // some is an array of one
    fn serialize_some<T: ?Sized>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: serde::Serialize,
    {
        self.output.open_array("", OPTION_SOME)?;
        value.serialize(&mut *self)?;
        self.output.close()
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<Self::Ok, Self::Error> {
        ser::Serializer::serialize_unit(self)
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        variant_index: u32,
        _: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        self.open_variant(variant_index)?;
        self.output.close()
    }

    // serialize the inner value
    fn serialize_newtype_struct<T: ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: serde::Serialize,
    {
        value.serialize(self)
    }

    // serialize the index, then the inner variant
    fn serialize_newtype_variant<T: ?Sized>(
        self,
        _: &'static str,
        variant_index: u32,
        _: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: serde::Serialize,
    {
        self.open_variant(variant_index)?;
        value.serialize(&mut *self)?;
        self.output.close()
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        let len = len.ok_or(Error::UnknownLength)?;
        self.output.open_array("", len)?;
        Ok(self)
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        self.output.open_array("", len)?;
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        ser::Serializer::serialize_tuple(self, len)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        self.open_variant(variant_index)?;
        ser::Serializer::serialize_tuple(self, len)
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        let len = len.ok_or(Error::UnknownLength)?;
        self.output.open_map("", len)?;
        Ok(self)
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        self.output.open_record(name)?;
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        self.open_variant(variant_index)?;
        ser::Serializer::serialize_struct(self, name, len)
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

impl<'a> ser::SerializeSeq for &'a mut VarSerializer {
    type Ok = ();

    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: serde::Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.output.close()
    }
}

impl<'a> ser::SerializeTuple for &'a mut VarSerializer {
    type Ok = ();

    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: serde::Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.output.close()
    }
}

impl<'a> ser::SerializeTupleStruct for &'a mut VarSerializer {
    type Ok = ();

    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: serde::Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.output.close()
    }
}

impl<'a> ser::SerializeTupleVariant for &'a mut VarSerializer {
    type Ok = ();

    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: serde::Serialize,
    {
        value.serialize(&mut **self)
    }

    // closes the tuple, then the variant envelope
    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.output.close()?;
        self.output.close()
    }
}

impl<'a> ser::SerializeMap for &'a mut VarSerializer {
    type Ok = ();

    type Error = Error;

    fn serialize_key<T: ?Sized>(&mut self, key: &T) -> Result<(), Self::Error>
    where
        T: serde::Serialize,
    {
        key.serialize(&mut **self)
    }

    fn serialize_value<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: serde::Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.output.close()
    }
}

impl<'a> ser::SerializeStruct for &'a mut VarSerializer {
    type Ok = ();

    type Error = Error;

    // field names are not written
    fn serialize_field<T: ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error>
    where
        T: serde::Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.output.close()
    }
}

impl<'a> ser::SerializeStructVariant for &'a mut VarSerializer {
    type Ok = ();

    type Error = Error;

    fn serialize_field<T: ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error>
    where
        T: serde::Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.output.close()?;
        self.output.close()
    }
}

#[cfg(test)]
mod tests {

    use serde::Serialize;

    use super::*;

    fn to_vec<T: Serialize + ?Sized>(value: &T) -> Vec<u8> {
        let mut serializer = VarSerializer::default();
        value.serialize(&mut serializer).unwrap();
        serializer.into_bytes()
    }

    #[test]
    fn test_ser_layout() {
        assert_eq!(to_vec(&-65_i32), vec![0xc1, 0x01]);
        assert_eq!(to_vec(&Some(true)), vec![1, 1]);
        assert_eq!(to_vec(&None::<bool>), vec![0]);
        assert_eq!(to_vec(&()), Vec::<u8>::new());
        assert_eq!(to_vec(&(1_u8, 'x')), vec![2, 1, 1, b'x']);
        assert_eq!(to_vec(&vec![3_u16, 4]), vec![2, 3, 4]);
    }

    #[test]
    fn test_ser_u64_overflow() {
        let mut serializer = VarSerializer::default();

        assert_eq!(
            u64::MAX.serialize(&mut serializer),
            Err(Error::Overflow("i64"))
        );
        assert!(serializer.into_bytes().is_empty());
    }
}
