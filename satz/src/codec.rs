use crate::annotation::FieldAnnotation;
use crate::error::{DecodeError, DecoderError, EncodeError};
use crate::layout::LayoutCache;
use crate::order::{ByteOrder, Primitive};
use crate::shape::Structural;
use log::trace;
use std::sync::Arc;

/// The entry point for encoding and decoding. Clones share one layout cache, so a `Codec` is cheap to hand around
/// between threads.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    layouts: Arc<LayoutCache>,
}

impl Codec {

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a codec using an existing cache, e.g. one shared with other codecs
    pub fn with_layouts(layouts: Arc<LayoutCache>) -> Self {
        Codec { layouts }
    }

    pub fn layouts(&self) -> &LayoutCache {
        &self.layouts
    }

    /// Encodes `value` into a freshly allocated buffer. No partial output is returned on error.
    pub fn encode<T: Structural>(&self, value: &T, order: ByteOrder) -> Result<Vec<u8>, EncodeError> {
        let mut encoder = Encoder { layouts: &self.layouts, order, out: Vec::new() };
        value.encode(&mut encoder)?;
        trace!("[satz] encoded {} into {} bytes ({:?})", T::SHAPE, encoder.out.len(), order);
        Ok(encoder.out)
    }

    /// Decodes `bytes` into `destination` and returns the number of bytes consumed. Bytes after those are ignored.
    ///
    /// On error the destination may be partially overwritten.
    pub fn decode<T: Structural>(&self, bytes: &[u8], order: ByteOrder, destination: &mut T) -> Result<usize, DecoderError> {
        let mut decoder = Decoder { layouts: &self.layouts, order, buf: bytes, pos: 0 };
        destination.decode(&mut decoder).map_err(|e| e.at(decoder.pos))?;
        trace!("[satz] decoded {} from {} of {} bytes ({:?})", T::SHAPE, decoder.pos, bytes.len(), order);
        Ok(decoder.pos)
    }

    /// Decodes into a zeroed value of `T`
    pub fn decode_new<T: Structural>(&self, bytes: &[u8], order: ByteOrder) -> Result<(T, usize), DecoderError> {
        let mut value = T::zeroed();
        let consumed = self.decode(bytes, order, &mut value)?;
        Ok((value, consumed))
    }

    /// The number of bytes every value of `T` occupies on wire
    pub fn size_of<T: Structural>(&self) -> Result<usize, EncodeError> {
        T::size_of(&self.layouts, &FieldAnnotation::EMPTY)
    }

}

/// The output side of an encode call, handed down to every `Structural::encode`.
pub struct Encoder<'c> {
    layouts: &'c LayoutCache,
    order: ByteOrder,
    out: Vec<u8>,
}

impl<'c> Encoder<'c> {

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn layouts(&self) -> &'c LayoutCache {
        self.layouts
    }

    #[inline]
    pub fn put<P: Primitive>(&mut self, value: P) {
        value.put(self.order, &mut self.out);
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    /// Appends `n` zero bytes, failing instead of aborting if they can not be allocated
    pub fn put_zeroes(&mut self, n: usize) -> Result<(), EncodeError> {
        self.out.try_reserve(n).map_err(|_| EncodeError::Overflow)?;
        self.out.resize(self.out.len() + n, 0);
        Ok(())
    }

    /// The number of bytes written so far
    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

}

/// The input side of a decode call: a cursor over the input buffer.
pub struct Decoder<'c, 'b> {
    layouts: &'c LayoutCache,
    order: ByteOrder,
    buf: &'b [u8],
    pos: usize,
}

impl<'c, 'b> Decoder<'c, 'b> {

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn layouts(&self) -> &'c LayoutCache {
        self.layouts
    }

    /// The number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Everything after the cursor. Does not advance.
    pub fn remaining(&self) -> &'b [u8] {
        let buf = self.buf;
        &buf[self.pos..]
    }

    #[inline]
    pub fn get<P: Primitive>(&mut self) -> Result<P, DecodeError> {
        let bytes = self.take(P::WIDTH)?;
        Ok(P::get(self.order, bytes))
    }

    pub fn take(&mut self, len: usize) -> Result<&'b [u8], DecodeError> {
        let remaining = self.buf.len() - self.pos;
        if len > remaining {
            return Err(DecodeError::Truncated { needed: len, remaining });
        }
        let buf = self.buf;
        let slice = &buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.take(len).map(|_| ())
    }

}
