//! The structural kinds a value can have on wire and how each of them is sized, written and read.
//!
//! Primitives, fixed arrays, optionals and records have a width which follows from their type alone. Sequences (`Vec`)
//! and text (`String`) have no intrinsic width: they can only appear as record fields which declare a `length:`.

use crate::annotation::FieldAnnotation;
use crate::codec::{Decoder, Encoder};
use crate::error::{DecodeError, EncodeError};
use crate::layout::LayoutCache;
use crate::order::Primitive;
use std::fmt::{Display, Formatter, self};

/// The structural classification of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Primitive(&'static str),
    FixedArray(usize),
    Sequence,
    Text,
    Optional,
    Composite(&'static str),
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Shape::Primitive(name) => f.write_str(name),
            Shape::FixedArray(n)   => write!(f, "array of {}", n),
            Shape::Sequence        => f.write_str("sequence"),
            Shape::Text            => f.write_str("text"),
            Shape::Optional        => f.write_str("optional"),
            Shape::Composite(name) => write!(f, "record {}", name),
        }
    }
}

/// A type which can be laid out on wire.
///
/// The `*_field` variants are used when the value is a record field and receive that field's annotation. Shapes which
/// ignore annotations can rely on the default implementations.
pub trait Structural: Sized + 'static {
    const SHAPE: Shape;

    /// The value used for freshly allocated optionals and sequence elements before they are decoded into
    fn zeroed() -> Self;

    /// The number of bytes any value of this type occupies on wire under the given annotation
    fn size_of(layouts: &LayoutCache, annotation: &FieldAnnotation) -> Result<usize, EncodeError>;

    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError>;

    fn encode_field(&self, _annotation: &FieldAnnotation, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        self.encode(enc)
    }

    fn decode(&mut self, dec: &mut Decoder<'_, '_>) -> Result<(), DecodeError>;

    fn decode_field(&mut self, _annotation: &FieldAnnotation, dec: &mut Decoder<'_, '_>) -> Result<(), DecodeError> {
        self.decode(dec)
    }
}

macro_rules! primitive_shape {
    ($($ty:ty),*) => { $(
        impl Structural for $ty {
            const SHAPE: Shape = Shape::Primitive(stringify!($ty));

            fn zeroed() -> Self {
                <$ty>::default()
            }

            fn size_of(_layouts: &LayoutCache, _annotation: &FieldAnnotation) -> Result<usize, EncodeError> {
                Ok(<$ty as Primitive>::WIDTH)
            }

            fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
                enc.put(*self);
                Ok(())
            }

            fn decode(&mut self, dec: &mut Decoder<'_, '_>) -> Result<(), DecodeError> {
                *self = dec.get()?;
                Ok(())
            }
        }
    )* }
}

primitive_shape!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64, bool);

/// Arrays are written element by element without any length information. A field annotation applies to every element,
/// so `[String; 3]` tagged with `length:8` occupies 24 bytes.
impl<T: Structural, const N: usize> Structural for [T; N] {
    const SHAPE: Shape = Shape::FixedArray(N);

    fn zeroed() -> Self {
        std::array::from_fn(|_| T::zeroed())
    }

    fn size_of(layouts: &LayoutCache, annotation: &FieldAnnotation) -> Result<usize, EncodeError> {
        N.checked_mul(T::size_of(layouts, annotation)?).ok_or(EncodeError::Overflow)
    }

    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        self.iter().try_for_each(|item| item.encode(enc))
    }

    fn encode_field(&self, annotation: &FieldAnnotation, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        self.iter().try_for_each(|item| item.encode_field(annotation, enc))
    }

    fn decode(&mut self, dec: &mut Decoder<'_, '_>) -> Result<(), DecodeError> {
        self.iter_mut().try_for_each(|item| item.decode(dec))
    }

    fn decode_field(&mut self, annotation: &FieldAnnotation, dec: &mut Decoder<'_, '_>) -> Result<(), DecodeError> {
        self.iter_mut().try_for_each(|item| item.decode_field(annotation, dec))
    }
}

/// An absent value is written as zeroes of the wrapped type's width so that the layout of the enclosing record does not
/// depend on presence. Decoding always allocates.
impl<T: Structural> Structural for Option<T> {
    const SHAPE: Shape = Shape::Optional;

    fn zeroed() -> Self {
        None
    }

    fn size_of(layouts: &LayoutCache, annotation: &FieldAnnotation) -> Result<usize, EncodeError> {
        T::size_of(layouts, annotation)
    }

    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        match self {
            Some(value) => value.encode(enc),
            None => placeholder::<T>(&FieldAnnotation::EMPTY, enc),
        }
    }

    fn encode_field(&self, annotation: &FieldAnnotation, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        match self {
            Some(value) => value.encode_field(annotation, enc),
            None => placeholder::<T>(annotation, enc),
        }
    }

    fn decode(&mut self, dec: &mut Decoder<'_, '_>) -> Result<(), DecodeError> {
        self.get_or_insert_with(T::zeroed).decode(dec)
    }

    fn decode_field(&mut self, annotation: &FieldAnnotation, dec: &mut Decoder<'_, '_>) -> Result<(), DecodeError> {
        self.get_or_insert_with(T::zeroed).decode_field(annotation, dec)
    }
}

fn placeholder<T: Structural>(annotation: &FieldAnnotation, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
    let width = T::size_of(enc.layouts(), annotation)?;
    enc.put_zeroes(width)
}

impl<T: Structural> Structural for Box<T> {
    const SHAPE: Shape = T::SHAPE;

    fn zeroed() -> Self {
        Box::new(T::zeroed())
    }

    fn size_of(layouts: &LayoutCache, annotation: &FieldAnnotation) -> Result<usize, EncodeError> {
        T::size_of(layouts, annotation)
    }

    fn encode(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        (**self).encode(enc)
    }

    fn encode_field(&self, annotation: &FieldAnnotation, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        (**self).encode_field(annotation, enc)
    }

    fn decode(&mut self, dec: &mut Decoder<'_, '_>) -> Result<(), DecodeError> {
        (**self).decode(dec)
    }

    fn decode_field(&mut self, annotation: &FieldAnnotation, dec: &mut Decoder<'_, '_>) -> Result<(), DecodeError> {
        (**self).decode_field(annotation, dec)
    }
}

/// Sequences always occupy `length` elements: longer ones are cut, shorter ones are padded with zeroed elements. The
/// actual number of elements is therefore not recoverable from the wire format.
impl<T: Structural> Structural for Vec<T> {
    const SHAPE: Shape = Shape::Sequence;

    fn zeroed() -> Self {
        Vec::new()
    }

    fn size_of(layouts: &LayoutCache, annotation: &FieldAnnotation) -> Result<usize, EncodeError> {
        let length = annotation.required_length().ok_or(EncodeError::LengthRequired)?;
        length.checked_mul(T::size_of(layouts, &FieldAnnotation::EMPTY)?).ok_or(EncodeError::Overflow)
    }

    fn encode(&self, _enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        Err(EncodeError::Unsupported(Self::SHAPE))
    }

    fn encode_field(&self, annotation: &FieldAnnotation, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        let length = annotation.required_length().ok_or(EncodeError::LengthRequired)?;
        let present = self.len().min(length);
        for item in &self[..present] {
            item.encode(enc)?;
        }
        if present < length {
            let width = T::size_of(enc.layouts(), &FieldAnnotation::EMPTY)?;
            enc.put_zeroes(width.checked_mul(length - present).ok_or(EncodeError::Overflow)?)?;
        }
        Ok(())
    }

    fn decode(&mut self, _dec: &mut Decoder<'_, '_>) -> Result<(), DecodeError> {
        Err(DecodeError::Unsupported(Self::SHAPE))
    }

    /// Elements already present are decoded in place, missing ones are appended. Elements beyond `length` stay as they
    /// are. At most one element per remaining input byte is appended.
    fn decode_field(&mut self, annotation: &FieldAnnotation, dec: &mut Decoder<'_, '_>) -> Result<(), DecodeError> {
        let length = annotation.required_length().ok_or(DecodeError::LengthRequired)?;
        let missing = length.saturating_sub(self.len());
        let remaining = dec.remaining().len();
        if missing > remaining {
            return Err(DecodeError::Truncated { needed: missing, remaining });
        }
        for item in self.iter_mut().take(length) {
            item.decode(dec)?;
        }
        while self.len() < length {
            let mut item = T::zeroed();
            item.decode(dec)?;
            self.push(item);
        }
        Ok(())
    }
}

/// Text occupies exactly `length` bytes. Longer strings are cut at the last character boundary which fits, shorter ones
/// are padded with zeroes. On decode, everything from the first zero byte on is discarded.
///
/// The remaining bytes must be valid UTF-8, otherwise decoding fails with [`DecodeError::Utf8`]. Fields carrying
/// arbitrary bytes should be declared as `Vec<u8>` or `[u8; N]` instead.
impl Structural for String {
    const SHAPE: Shape = Shape::Text;

    fn zeroed() -> Self {
        String::new()
    }

    fn size_of(_layouts: &LayoutCache, annotation: &FieldAnnotation) -> Result<usize, EncodeError> {
        annotation.required_length().ok_or(EncodeError::LengthRequired)
    }

    fn encode(&self, _enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        Err(EncodeError::Unsupported(Self::SHAPE))
    }

    fn encode_field(&self, annotation: &FieldAnnotation, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        let length = annotation.required_length().ok_or(EncodeError::LengthRequired)?;
        let mut cut = self.len().min(length);
        while !self.is_char_boundary(cut) {
            cut -= 1;
        }
        enc.put_bytes(&self.as_bytes()[..cut]);
        enc.put_zeroes(length - cut)
    }

    fn decode(&mut self, _dec: &mut Decoder<'_, '_>) -> Result<(), DecodeError> {
        Err(DecodeError::Unsupported(Self::SHAPE))
    }

    fn decode_field(&mut self, annotation: &FieldAnnotation, dec: &mut Decoder<'_, '_>) -> Result<(), DecodeError> {
        let length = annotation.required_length().ok_or(DecodeError::LengthRequired)?;
        let raw = dec.take(length)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        *self = std::str::from_utf8(&raw[..end])?.to_owned();
        Ok(())
    }
}
