//! Implementation of [serde::de::Deserializer] for [VarDeserializer]

use serde::de::{
    self, DeserializeSeed, Deserializer, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    VariantAccess,
};

use super::consts::{ENVELOPE_ARITY, OPTION_NONE, OPTION_SOME};
use super::decoder::Decoder;
use super::err::{overflow, Error};
use super::field::FieldDecoder;

/// Deserializes any [serde::Deserialize] type from the binary wire format.
///
/// Strings and byte slices are handed to visitors as borrows of the source
/// buffer, so `&'de str` and `&'de [u8]` fields decode without copying.
pub struct VarDeserializer<'de> {
    input: Decoder<'de>,
}

impl<'de> VarDeserializer<'de> {
    pub fn from_slice(s: &'de [u8]) -> Self {
        Self {
            input: Decoder::from_slice(s),
        }
    }

    /// Number of bytes left after deserializing.
    pub fn remaining(&self) -> usize {
        self.input.remaining()
    }
}

/// Impl deserialize for integer primitives, checking the decoded range
macro_rules! deserialize_int {
    ($fn_name: ident: $data_type: ty => $visitor_fn: ident) => {
        fn $fn_name<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: de::Visitor<'de>,
        {
            let value = self.input.decode_int("")?;
            let value =
                <$data_type>::try_from(value).map_err(|_| overflow(stringify!($data_type)))?;
            visitor.$visitor_fn(value)
        }
    };
}

impl<'de, 'a> de::Deserializer<'de> for &'a mut VarDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::NotSelfDescribing("deserialize_any"))
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_bool(self.input.decode_bool("")?)
    }

    deserialize_int! {deserialize_i64: i64 => visit_i64}
    deserialize_int! {deserialize_i32: i32 => visit_i32}
    deserialize_int! {deserialize_i16: i16 => visit_i16}
    deserialize_int! {deserialize_i8: i8 => visit_i8}

    deserialize_int! {deserialize_u64: u64 => visit_u64}
    deserialize_int! {deserialize_u32: u32 => visit_u32}
    deserialize_int! {deserialize_u16: u16 => visit_u16}
    deserialize_int! {deserialize_u8: u8 => visit_u8}

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_f32(self.input.decode_f32("")?)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_f64(self.input.decode_f64("")?)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let s = self.input.decode_str("")?;
        let mut chars = s.chars();

        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(de::Error::invalid_value(
                de::Unexpected::Str(s),
                &"a single character",
            )),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.input.decode_str("")?)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_bytes(self.input.decode_binary("")?)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match self.input.open_array("")? {
            OPTION_NONE => visitor.visit_none(),
            OPTION_SOME => visitor.visit_some(self),
            found => Err(Error::LengthMismatch {
                expected: OPTION_SOME,
                found,
            }),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let len = self.input.open_array("")?;
        let val = visitor.visit_seq(CollectionsAccessor::from_deserializer(&mut *self, len))?;
        self.input.close()?;

        Ok(val)
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let found = self.input.open_array("")?;
        if found != len {
            return Err(Error::LengthMismatch {
                expected: len,
                found,
            });
        }

        let val = visitor.visit_seq(CollectionsAccessor::from_deserializer(&mut *self, len))?;
        self.input.close()?;

        Ok(val)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let len = self.input.open_map("")?;
        let val = visitor.visit_map(CollectionsAccessor::from_deserializer(&mut *self, len))?;
        self.input.close()?;

        Ok(val)
    }

    // structs are a fixed number of fields in declaration order
    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.input.open_record(name)?;
        let accessor = CollectionsAccessor::from_deserializer(&mut *self, fields.len());
        let val = visitor.visit_seq(accessor)?;
        self.input.close()?;

        Ok(val)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let arity = self.input.open_array("")?;
        if arity != ENVELOPE_ARITY {
            return Err(Error::MalformedEnvelope(arity));
        }

        let index = self.input.decode_int("")?;
        let index = u32::try_from(index).map_err(|_| overflow("u32"))?;

        let val = visitor.visit_enum(VariantAccessor {
            des: &mut *self,
            index,
        })?;
        self.input.close()?;

        Ok(val)
    }

    // only reached for variant tags, which are written as indices
    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_u32(visitor)
    }

    fn deserialize_ignored_any<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::NotSelfDescribing("skip an unknown value"))
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

/// Element access for sequences, tuples, structs and maps, all of which
/// know their element count up front.
struct CollectionsAccessor<'a, 'de: 'a> {
    des: &'a mut VarDeserializer<'de>,
    remaining: usize,
}

impl<'a, 'de> CollectionsAccessor<'a, 'de> {
    /// Create a new instance of the collections accessor
    fn from_deserializer(des: &'a mut VarDeserializer<'de>, len: usize) -> Self {
        Self {
            des,
            remaining: len,
        }
    }
}

impl<'a, 'de> SeqAccess<'de> for CollectionsAccessor<'a, 'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        // stop at sequence boundary
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        seed.deserialize(&mut *self.des).map(Some)
    }

    // never trust a length header for preallocation
    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining.min(self.des.remaining()))
    }
}

impl<'a, 'de> MapAccess<'de> for CollectionsAccessor<'a, 'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        seed.deserialize(&mut *self.des).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        seed.deserialize(&mut *self.des)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining.min(self.des.remaining()))
    }
}

/// Access to an enum variant once its index has been read.
struct VariantAccessor<'a, 'de: 'a> {
    des: &'a mut VarDeserializer<'de>,
    index: u32,
}

impl<'a, 'de> EnumAccess<'de> for VariantAccessor<'a, 'de> {
    type Error = Error;

    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let index: de::value::U32Deserializer<Error> = self.index.into_deserializer();
        let val = seed.deserialize(index)?;

        Ok((val, self))
    }
}

impl<'a, 'de> VariantAccess<'de> for VariantAccessor<'a, 'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        seed.deserialize(self.des)
    }

    fn tuple_variant<V>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Deserializer::deserialize_tuple(self.des, len, visitor)
    }

    fn struct_variant<V>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Deserializer::deserialize_struct(self.des, "", fields, visitor)
    }
}

#[cfg(test)]
mod tests {

    use serde::Deserialize;

    use super::*;

    fn from_slice<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T, Error> {
        let mut deserializer = VarDeserializer::from_slice(bytes);
        T::deserialize(&mut deserializer)
    }

    #[test]
    fn test_de_layout() {
        assert_eq!(from_slice::<i32>(&[0xc1, 0x01]).unwrap(), -65);
        assert_eq!(from_slice::<Option<bool>>(&[1, 1]).unwrap(), Some(true));
        assert_eq!(from_slice::<Option<bool>>(&[0]).unwrap(), None);
        assert_eq!(from_slice::<(u8, char)>(&[2, 1, 1, b'x']).unwrap(), (1, 'x'));
        assert_eq!(from_slice::<Vec<u16>>(&[2, 3, 4]).unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_de_range_checks() {
        assert_eq!(from_slice::<u8>(&[0x80, 0x04]), Err(Error::Overflow("u8")));
        assert_eq!(from_slice::<u32>(&[0x41]), Err(Error::Overflow("u32")));
        assert_eq!(
            from_slice::<(u8, u8)>(&[3, 1, 1, 1]),
            Err(Error::LengthMismatch {
                expected: 2,
                found: 3
            })
        );
        assert_eq!(
            from_slice::<Option<u8>>(&[2, 1, 1]),
            Err(Error::LengthMismatch {
                expected: 1,
                found: 2
            })
        );
        assert!(matches!(
            from_slice::<char>(&[2, b'a', b'b']),
            Err(Error::Message(_))
        ));
    }

    #[test]
    fn test_de_not_self_describing() {
        assert_eq!(
            from_slice::<serde::de::IgnoredAny>(&[0]),
            Err(Error::NotSelfDescribing("skip an unknown value"))
        );
    }

    #[test]
    fn test_de_truncated_seq() {
        assert!(matches!(
            from_slice::<Vec<i64>>(&[3, 1, 2]),
            Err(Error::Truncated { .. })
        ));
    }
}
