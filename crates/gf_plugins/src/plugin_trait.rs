use crate::error::BoxError;
use gf_domain::{Encoding, Item};
use std::sync::Arc;

/// Per-item work of a plugin. Mutates the item in place.
pub trait Transform: Send {
    fn transform(&mut self, item: &mut Item, encoding: Encoding) -> Result<(), BoxError>;
}

impl<F> Transform for F
where
    F: FnMut(&mut Item, Encoding) -> Result<(), BoxError> + Send,
{
    fn transform(&mut self, item: &mut Item, encoding: Encoding) -> Result<(), BoxError> {
        self(item, encoding)
    }
}

/// Work run once after the last item.
pub trait Finalize: Send {
    fn finalize(&mut self) -> Result<(), BoxError>;
}

impl<F> Finalize for F
where
    F: FnMut() -> Result<(), BoxError> + Send,
{
    fn finalize(&mut self) -> Result<(), BoxError> {
        self()
    }
}

pub type SharedTransformFn = Arc<dyn Fn(&mut Item, Encoding) -> Result<(), BoxError> + Send + Sync>;
pub type SharedFinalizeFn = Arc<dyn Fn() -> Result<(), BoxError> + Send + Sync>;

/// A registry transform handed to one processor.
pub(crate) struct SharedTransform(pub(crate) SharedTransformFn);

impl Transform for SharedTransform {
    fn transform(&mut self, item: &mut Item, encoding: Encoding) -> Result<(), BoxError> {
        (self.0)(item, encoding)
    }
}

pub(crate) struct SharedFinalize(pub(crate) SharedFinalizeFn);

impl Finalize for SharedFinalize {
    fn finalize(&mut self) -> Result<(), BoxError> {
        (self.0)()
    }
}
