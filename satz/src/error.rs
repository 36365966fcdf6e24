use crate::shape::Shape;
use std::fmt::{Display, Formatter, self};

/// Error type returned by user-supplied custom field codecs.
pub type CodecError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Problems with the declared layout of a record. These are configuration errors: they depend
/// on the type, never on the value being encoded or decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// A recognized directive could not be parsed, e.g. `length:1qwe`
    Malformed(String),
    /// A `codec:` directive names too few functions or functions of the wrong kind
    CustomCodecArity(String),
    /// A record visited more fields than it declares
    UndeclaredField { record: &'static str, index: usize },
    /// A field declared as skipped by its record is not skipped by its tag
    NotSkipped { record: &'static str, field: &'static str },
    Field { record: &'static str, field: &'static str, inner: Box<LayoutError> },
}

impl LayoutError {

    pub fn within(self, record: &'static str, field: &'static str) -> LayoutError {
        LayoutError::Field { record, field, inner: Box::new(self) }
    }

    pub fn root(&self) -> &LayoutError {
        match self {
            LayoutError::Field { inner, .. } => inner.root(),
            e => e,
        }
    }

}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayoutError::Field { inner, .. } => Some(&**inner),
            _ => None,
        }
    }
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            LayoutError::Malformed(directive) => write!(f, "Malformed field tag directive `{}`", directive),
            LayoutError::CustomCodecArity(msg) => write!(f, "Invalid custom codec: {}", msg),
            LayoutError::UndeclaredField { record, index } => write!(f, "Record {} has no declared field at index {}", record, index),
            LayoutError::NotSkipped { record, field } => write!(f, "Field {}.{} is declared as skipped but its tag does not skip it", record, field),
            LayoutError::Field { record, field, inner } => write!(f, "field {}.{}: {}", record, field, inner),
        }
    }
}

#[derive(Debug)]
pub enum EncodeError {
    Layout(LayoutError),
    /// Text and sequence fields need a positive `length:` directive
    LengthRequired,
    Unsupported(Shape),
    CustomCodec(CodecError),
    /// The wire width does not fit into memory
    Overflow,
    /// Wraps the error of a record field with the location it occurred at
    Field { record: &'static str, field: &'static str, inner: Box<EncodeError> },
}

impl EncodeError {

    pub fn within(self, record: &'static str, field: &'static str) -> EncodeError {
        EncodeError::Field { record, field, inner: Box::new(self) }
    }

    /// The innermost error, stripped of all field locations
    pub fn root(&self) -> &EncodeError {
        match self {
            EncodeError::Field { inner, .. } => inner.root(),
            e => e,
        }
    }

}

impl From<LayoutError> for EncodeError {
    fn from(e: LayoutError) -> EncodeError {
        EncodeError::Layout(e)
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodeError::Layout(e) => Some(e),
            EncodeError::CustomCodec(e) => Some(&**e),
            EncodeError::Field { inner, .. } => Some(&**inner),
            _ => None,
        }
    }
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            EncodeError::Layout(e) => write!(f, "{}", e),
            EncodeError::LengthRequired => f.write_str("Need to specify a positive length"),
            EncodeError::Unsupported(shape) => write!(f, "Unsupported shape {} outside of an annotated record field", shape),
            EncodeError::CustomCodec(e) => write!(f, "Custom codec failed: {}", e),
            EncodeError::Overflow => f.write_str("Wire size exceeds the addressable range"),
            EncodeError::Field { record, field, inner } => write!(f, "can't encode {}.{}: {}", record, field, inner),
        }
    }
}

/// A `DecodeError` together with the input position it occurred at
#[derive(Debug)]
pub struct DecoderError {
    inner: DecodeError,
    at: usize,
}

impl DecoderError {

    pub fn into_inner(self) -> DecodeError {
        self.inner
    }

    pub fn inner(&self) -> &DecodeError {
        &self.inner
    }

    pub fn position(&self) -> usize {
        self.at
    }

}

impl std::error::Error for DecoderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
       Some(&self.inner)
    }
}

impl Display for DecoderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{} at input position {}", self.inner, self.at)
    }
}

#[derive(Debug)]
pub enum DecodeError {
    Layout(LayoutError),
    LengthRequired,
    Unsupported(Shape),
    CustomCodec(CodecError),
    /// Fewer bytes remained than the shape requires
    Truncated { needed: usize, remaining: usize },
    Utf8(std::str::Utf8Error),
    Field { record: &'static str, field: &'static str, inner: Box<DecodeError> },
}

impl DecodeError {

    pub fn at(self, at: usize) -> DecoderError {
        DecoderError { inner: self, at }
    }

    pub fn within(self, record: &'static str, field: &'static str) -> DecodeError {
        DecodeError::Field { record, field, inner: Box::new(self) }
    }

    /// The innermost error, stripped of all field locations
    pub fn root(&self) -> &DecodeError {
        match self {
            DecodeError::Field { inner, .. } => inner.root(),
            e => e,
        }
    }

}

impl From<LayoutError> for DecodeError {
    fn from(e: LayoutError) -> DecodeError {
        DecodeError::Layout(e)
    }
}

impl From<std::str::Utf8Error> for DecodeError {
    fn from(e: std::str::Utf8Error) -> DecodeError {
        DecodeError::Utf8(e)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Layout(e) => Some(e),
            DecodeError::CustomCodec(e) => Some(&**e),
            DecodeError::Utf8(e) => Some(e),
            DecodeError::Field { inner, .. } => Some(&**inner),
            _ => None,
        }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DecodeError::Layout(e) => write!(f, "{}", e),
            DecodeError::LengthRequired => f.write_str("Need to specify a positive length"),
            DecodeError::Unsupported(shape) => write!(f, "Unsupported shape {} outside of an annotated record field", shape),
            DecodeError::CustomCodec(e) => write!(f, "Custom codec failed: {}", e),
            DecodeError::Truncated { needed, remaining } => write!(f, "Unexpected end of buffer: needed {} bytes, {} remaining", needed, remaining),
            DecodeError::Utf8(e) => write!(f, "Text field was not valid Utf-8: {}", e),
            DecodeError::Field { record, field, inner } => write!(f, "can't decode {}.{}: {}", record, field, inner),
        }
    }
}
