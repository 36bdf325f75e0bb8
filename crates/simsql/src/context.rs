//! Per-query resolution context.

use std::sync::Arc;

use crate::cache::FieldCache;
use crate::field::{AnyRecord, RecordType, Shape};

/// The record type a query runs against, plus the cache to resolve with.
///
/// A context is created at the start of each query and dropped when the
/// query returns, on success or failure. Conditions receive it by reference,
/// so concurrent queries over different types never share one.
///
/// A context without a current type resolves every record through its own
/// runtime type.
#[derive(Debug, Clone)]
pub struct QueryContext<'c> {
    cache: &'c FieldCache,
    current: Option<(RecordType, Arc<Shape>)>,
}

impl<'c> QueryContext<'c> {
    /// Context bound to `record_type`.
    pub fn new(cache: &'c FieldCache, record_type: RecordType) -> Self {
        let shape = cache.resolve(record_type);
        Self::with_shape(cache, record_type, shape)
    }

    pub(crate) fn with_shape(
        cache: &'c FieldCache,
        record_type: RecordType,
        shape: Arc<Shape>,
    ) -> Self {
        QueryContext {
            cache,
            current: Some((record_type, shape)),
        }
    }

    /// Context with no current type.
    pub fn detached(cache: &'c FieldCache) -> Self {
        QueryContext {
            cache,
            current: None,
        }
    }

    /// The cache this context resolves through.
    pub fn cache(&self) -> &'c FieldCache {
        self.cache
    }

    /// The current record type, if bound.
    pub fn record_type(&self) -> Option<RecordType> {
        self.current.as_ref().map(|(record_type, _)| *record_type)
    }

    /// The shape of the current record type, if bound.
    pub fn shape(&self) -> Option<&Arc<Shape>> {
        self.current.as_ref().map(|(_, shape)| shape)
    }

    /// Shape used to read `record`: the current type's if bound, otherwise
    /// the record's own.
    pub fn shape_for(&self, record: &dyn AnyRecord) -> Arc<Shape> {
        match &self.current {
            Some((_, shape)) => Arc::clone(shape),
            None => self.cache.resolve(record.record_type()),
        }
    }
}
