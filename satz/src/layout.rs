//! Resolved record layouts and the cache which keeps them.
//!
//! Parsing field tags and binding custom codecs happens once per record type. The result is immutable and shared by
//! every encode and decode call made through the same cache.

use crate::annotation::{CodecNames, FieldAnnotation};
use crate::error::{CodecError, LayoutError};
use crate::record::Record;
use log::debug;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Writes a field of `R` on its own. The returned bytes are emitted verbatim.
pub type EncodeFn<R> = fn(&R) -> Result<Vec<u8>, CodecError>;

/// Reads a field of `R` from the remaining input and returns the number of consumed bytes.
pub type DecodeFn<R> = fn(&mut R, &[u8]) -> Result<usize, CodecError>;

/// A function a record offers for use in `codec:` directives.
pub enum NamedCodec<R> {
    Encode(&'static str, EncodeFn<R>),
    Decode(&'static str, DecodeFn<R>),
}

impl<R> NamedCodec<R> {
    pub fn name(&self) -> &'static str {
        match *self {
            NamedCodec::Encode(name, _) | NamedCodec::Decode(name, _) => name,
        }
    }
}

/// An encode/decode pair bound to a field.
pub struct CustomCodec<R> {
    pub encode: EncodeFn<R>,
    pub decode: DecodeFn<R>,
}

impl<R> Clone for CustomCodec<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for CustomCodec<R> {}

/// A resolved field: its name, its parsed tag and, if requested, the custom codec taking care of it.
pub struct Slot<R> {
    pub name: &'static str,
    pub annotation: FieldAnnotation,
    pub codec: Option<CustomCodec<R>>,
}

pub struct Layout<R> {
    slots: Vec<Slot<R>>,
}

impl<R: Record> Layout<R> {

    /// Parses all field tags of `R` in declaration order
    pub fn resolve() -> Result<Self, LayoutError> {
        let mut slots = Vec::with_capacity(R::FIELDS.len());
        for decl in R::FIELDS {
            let annotation = FieldAnnotation::parse(decl.tag).map_err(|e| e.within(R::NAME, decl.name))?;
            let codec = match &annotation.codec {
                Some(names) => Some(Self::bind(names).map_err(|e| e.within(R::NAME, decl.name))?),
                None => None,
            };
            slots.push(Slot { name: decl.name, annotation, codec });
        }
        Ok(Layout { slots })
    }

    fn bind(names: &CodecNames) -> Result<CustomCodec<R>, LayoutError> {
        let encode = R::CODECS.iter().find_map(|c| match *c {
            NamedCodec::Encode(name, f) if name == names.encode => Some(f),
            _ => None,
        }).ok_or_else(|| Self::unbound(&names.encode, "encode"))?;
        let decode = R::CODECS.iter().find_map(|c| match *c {
            NamedCodec::Decode(name, f) if name == names.decode => Some(f),
            _ => None,
        }).ok_or_else(|| Self::unbound(&names.decode, "decode"))?;
        Ok(CustomCodec { encode, decode })
    }

    fn unbound(name: &str, kind: &str) -> LayoutError {
        match R::CODECS.iter().find(|c| c.name() == name) {
            Some(_) => LayoutError::CustomCodecArity(format!("`{}` of {} is not an {} function", name, R::NAME, kind)),
            None    => LayoutError::CustomCodecArity(format!("{} has no {} function `{}`", R::NAME, kind, name)),
        }
    }

    pub fn slot(&self, index: usize) -> Result<&Slot<R>, LayoutError> {
        self.slots.get(index).ok_or(LayoutError::UndeclaredField { record: R::NAME, index })
    }

    pub fn slots(&self) -> &[Slot<R>] {
        &self.slots
    }

}

/// Caches the layout of every record type it has seen. Lookups take a shared lock; only the first resolution of a type
/// takes the exclusive one, and it publishes the complete layout before releasing it.
#[derive(Default)]
pub struct LayoutCache {
    layouts: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl LayoutCache {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve<R: Record>(&self) -> Result<Arc<Layout<R>>, LayoutError> {
        let id = TypeId::of::<R>();
        if let Some(layout) = Self::cached::<R>(self.layouts.read().get(&id)) {
            return Ok(layout);
        }
        let mut layouts = self.layouts.write();
        // someone else might have won the race for the exclusive lock
        if let Some(layout) = Self::cached::<R>(layouts.get(&id)) {
            return Ok(layout);
        }
        let layout = Arc::new(Layout::<R>::resolve()?);
        debug!("[satz] resolved layout of {} with {} fields", R::NAME, layout.slots.len());
        layouts.insert(id, layout.clone());
        Ok(layout)
    }

    /// The number of record types resolved so far
    pub fn len(&self) -> usize {
        self.layouts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached<R: Record>(entry: Option<&Arc<dyn Any + Send + Sync>>) -> Option<Arc<Layout<R>>> {
        entry.and_then(|layout| layout.clone().downcast::<Layout<R>>().ok())
    }

}

impl std::fmt::Debug for LayoutCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutCache").field("records", &self.len()).finish()
    }
}
