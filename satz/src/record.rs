//! Composite records: named, ordered fields each carrying a tag.
//!
//! Records are usually declared through [`record!`](crate::record!), which defines the struct and implements
//! [`Record`] and [`Structural`] for it. A manual implementation visits its fields in declaration order through the
//! [`FieldEncoder`], [`FieldDecoder`] and [`FieldSizer`] it is handed.

use crate::codec::{Decoder, Encoder};
use crate::error::{DecodeError, EncodeError, LayoutError};
use crate::layout::{Layout, LayoutCache, NamedCodec};
use crate::shape::Structural;
use std::sync::Arc;

/// The declaration of a record field: its name and its raw tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: &'static str,
    pub tag: &'static str,
}

pub trait Record: Structural {
    const NAME: &'static str;

    /// The fields in declaration order. Visitors must touch exactly these, in this order.
    const FIELDS: &'static [FieldDecl];

    /// Functions available to `codec:` directives
    const CODECS: &'static [NamedCodec<Self>] = &[];

    fn encode_fields(&self, fields: &mut FieldEncoder<'_, '_, Self>) -> Result<(), EncodeError>;

    fn decode_fields(&mut self, fields: &mut FieldDecoder<'_, '_, '_, Self>) -> Result<(), DecodeError>;

    fn size_fields(fields: &mut FieldSizer<'_, Self>) -> Result<(), EncodeError>;
}

/// Moves past a field which never appears on wire, whatever its type
fn skip_slot<R: Record>(layout: &Layout<R>, index: &mut usize) -> Result<(), LayoutError> {
    let slot = layout.slot(*index)?;
    *index += 1;
    if slot.annotation.skip {
        Ok(())
    } else {
        Err(LayoutError::NotSkipped { record: R::NAME, field: slot.name })
    }
}

pub struct FieldEncoder<'e, 'c, R> {
    record: &'e R,
    layout: Arc<Layout<R>>,
    enc: &'e mut Encoder<'c>,
    index: usize,
}

impl<'e, 'c, R: Record> FieldEncoder<'e, 'c, R> {

    pub fn field<T: Structural>(&mut self, value: &T) -> Result<(), EncodeError> {
        let slot = self.layout.slot(self.index)?;
        self.index += 1;
        if slot.annotation.skip {
            return Ok(());
        }
        let result = match slot.codec {
            Some(codec) => (codec.encode)(self.record)
                .map(|bytes| self.enc.put_bytes(&bytes))
                .map_err(EncodeError::CustomCodec),
            None => value.encode_field(&slot.annotation, self.enc),
        };
        result.map_err(|e| e.within(R::NAME, slot.name))
    }

    pub fn skip(&mut self) -> Result<(), EncodeError> {
        Ok(skip_slot(&self.layout, &mut self.index)?)
    }

}

pub struct FieldDecoder<'d, 'c, 'b, R> {
    layout: Arc<Layout<R>>,
    dec: &'d mut Decoder<'c, 'b>,
    index: usize,
}

impl<'d, 'c, 'b, R: Record> FieldDecoder<'d, 'c, 'b, R> {

    /// Decodes the next field. `project` selects it from the record; it is not called for skipped fields or fields with
    /// a custom codec, the latter receive the whole record instead.
    pub fn field<T, F>(&mut self, record: &mut R, project: F) -> Result<(), DecodeError>
    where
        T: Structural,
        F: FnOnce(&mut R) -> &mut T,
    {
        let slot = self.layout.slot(self.index)?;
        self.index += 1;
        if slot.annotation.skip {
            return Ok(());
        }
        let result = match slot.codec {
            Some(codec) => (codec.decode)(record, self.dec.remaining())
                .map_err(DecodeError::CustomCodec)
                .and_then(|consumed| self.dec.skip(consumed)),
            None => project(record).decode_field(&slot.annotation, self.dec),
        };
        result.map_err(|e| e.within(R::NAME, slot.name))
    }

    pub fn skip(&mut self) -> Result<(), DecodeError> {
        Ok(skip_slot(&self.layout, &mut self.index)?)
    }

}

pub struct FieldSizer<'s, R> {
    layouts: &'s LayoutCache,
    layout: Arc<Layout<R>>,
    index: usize,
    total: usize,
}

impl<'s, R: Record> FieldSizer<'s, R> {

    /// Adds the width of the next field, nothing if it is skipped
    pub fn field<T: Structural>(&mut self) -> Result<(), EncodeError> {
        let slot = self.layout.slot(self.index)?;
        self.index += 1;
        if slot.annotation.skip {
            return Ok(());
        }
        let width = T::size_of(self.layouts, &slot.annotation).map_err(|e| e.within(R::NAME, slot.name))?;
        self.total = self.total.checked_add(width).ok_or(EncodeError::Overflow)?;
        Ok(())
    }

    pub fn skip(&mut self) -> Result<(), EncodeError> {
        Ok(skip_slot(&self.layout, &mut self.index)?)
    }

}

/// Writes all fields of `record`. This is what `Structural::encode` of a record delegates to.
pub fn encode<R: Record>(record: &R, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
    let layout = enc.layouts().resolve::<R>()?;
    let mut fields = FieldEncoder { record, layout, enc, index: 0 };
    record.encode_fields(&mut fields)
}

pub fn decode<R: Record>(record: &mut R, dec: &mut Decoder<'_, '_>) -> Result<(), DecodeError> {
    let layout = dec.layouts().resolve::<R>()?;
    let mut fields = FieldDecoder { layout, dec, index: 0 };
    record.decode_fields(&mut fields)
}

pub fn size_of<R: Record>(layouts: &LayoutCache) -> Result<usize, EncodeError> {
    let layout = layouts.resolve::<R>()?;
    let mut fields = FieldSizer { layouts, layout, index: 0, total: 0 };
    R::size_fields(&mut fields)?;
    Ok(fields.total)
}

/// Defines a struct and implements [`Record`](crate::Record) and [`Structural`](crate::Structural) for it.
///
/// Field tags are given as `#[satz("...")]` after the field's doc comments. `#[satz(skip)]` marks a field which only
/// lives in memory: unlike `#[satz("-")]` its type need not be `Structural`, only `Default`. Functions for `codec:`
/// directives are associated functions of the struct, listed in an optional `codecs` block:
///
/// ```
/// use satz::{record, ByteOrder, Codec, CodecError};
///
/// record! {
///     #[derive(Debug, PartialEq)]
///     pub struct Frame {
///         pub kind: u8,
///         /// Only meaningful in memory
///         #[satz(skip)]
///         pub seen: usize,
///         #[satz("length:4")]
///         pub name: String,
///         #[satz("codec:write_flags:read_flags")]
///         pub flags: u8,
///     }
///     codecs {
///         encode: [write_flags],
///         decode: [read_flags],
///     }
/// }
///
/// impl Frame {
///     fn write_flags(&self) -> Result<Vec<u8>, CodecError> {
///         Ok(vec![self.flags | 0x80])
///     }
///
///     fn read_flags(&mut self, bytes: &[u8]) -> Result<usize, CodecError> {
///         self.flags = bytes.first().ok_or("no flags")? & 0x7f;
///         Ok(1)
///     }
/// }
///
/// let frame = Frame { kind: 2, seen: 7, name: "ab".to_owned(), flags: 3 };
/// let bytes = Codec::new().encode(&frame, ByteOrder::BigEndian).unwrap();
/// assert_eq!(bytes, [2, b'a', b'b', 0, 0, 0x83]);
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[doc = $doc:literal])*
                $(#[satz($($attr:tt)*)])?
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
        $(
            codecs {
                encode: [$($enc:ident),* $(,)?],
                decode: [$($dec:ident),* $(,)?] $(,)?
            }
        )?
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[doc = $doc])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            const NAME: &'static str = stringify!($name);

            const FIELDS: &'static [$crate::FieldDecl] = &[
                $( $crate::FieldDecl { name: stringify!($field), tag: $crate::__record_field!(tag [$($($attr)*)?]) }, )*
            ];

            const CODECS: &'static [$crate::NamedCodec<Self>] = &[
                $(
                    $( $crate::NamedCodec::Encode(stringify!($enc), <$name>::$enc), )*
                    $( $crate::NamedCodec::Decode(stringify!($dec), <$name>::$dec), )*
                )?
            ];

            #[allow(unused_variables)]
            fn encode_fields(
                &self,
                fields: &mut $crate::record::FieldEncoder<'_, '_, Self>,
            ) -> ::core::result::Result<(), $crate::EncodeError> {
                $( $crate::__record_field!(encode fields [$($($attr)*)?] &self.$field); )*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn decode_fields(
                &mut self,
                fields: &mut $crate::record::FieldDecoder<'_, '_, '_, Self>,
            ) -> ::core::result::Result<(), $crate::DecodeError> {
                $( $crate::__record_field!(decode fields [$($($attr)*)?] self, |record| &mut record.$field); )*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn size_fields(
                fields: &mut $crate::record::FieldSizer<'_, Self>,
            ) -> ::core::result::Result<(), $crate::EncodeError> {
                $( $crate::__record_field!(size fields [$($($attr)*)?] $ty); )*
                ::core::result::Result::Ok(())
            }
        }

        impl $crate::Structural for $name {
            const SHAPE: $crate::Shape = $crate::Shape::Composite(stringify!($name));

            fn zeroed() -> Self {
                $name {
                    $( $field: $crate::__record_field!(zero [$($($attr)*)?] $ty), )*
                }
            }

            fn size_of(
                layouts: &$crate::LayoutCache,
                _annotation: &$crate::FieldAnnotation,
            ) -> ::core::result::Result<usize, $crate::EncodeError> {
                $crate::record::size_of::<Self>(layouts)
            }

            fn encode(&self, enc: &mut $crate::Encoder<'_>) -> ::core::result::Result<(), $crate::EncodeError> {
                $crate::record::encode(self, enc)
            }

            fn decode(&mut self, dec: &mut $crate::Decoder<'_, '_>) -> ::core::result::Result<(), $crate::DecodeError> {
                $crate::record::decode(self, dec)
            }
        }
    };
}

/// One field's part of a `record!` expansion. `[skip]` fields are never handed to `Structural`.
#[doc(hidden)]
#[macro_export]
macro_rules! __record_field {
    (tag []) => { "" };
    (tag [skip]) => { "-" };
    (tag [$tag:literal]) => { $tag };

    (encode $fields:ident [skip] $value:expr) => { $fields.skip()? };
    (encode $fields:ident [$($tag:literal)?] $value:expr) => { $fields.field($value)? };

    (decode $fields:ident [skip] $record:expr, $access:expr) => { $fields.skip()? };
    (decode $fields:ident [$($tag:literal)?] $record:expr, $access:expr) => { $fields.field($record, $access)? };

    (size $fields:ident [skip] $ty:ty) => { $fields.skip()? };
    (size $fields:ident [$($tag:literal)?] $ty:ty) => { $fields.field::<$ty>()? };

    (zero [skip] $ty:ty) => { <$ty as ::core::default::Default>::default() };
    (zero [$($tag:literal)?] $ty:ty) => { <$ty as $crate::Structural>::zeroed() };
}
