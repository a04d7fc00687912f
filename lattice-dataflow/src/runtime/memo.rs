//! Persistent function application.
//!
//! A [`MemoSlot`] lives in the store like a state cell and caches one
//! function application across traversals. It recomputes only when the
//! identity of its input changes, so an expensive function of stable state
//! (factoring a number, parsing a document) runs once per change rather than
//! once per traversal.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::signal::{Capability, Signal, Source, Value, ValueId};
use crate::tree::Slot;

struct Cached<R> {
    input: ValueId,
    output: Option<R>,
    version: u64,
}

pub(crate) struct MemoSlot<R> {
    origin: ValueId,
    cache: Mutex<Option<Cached<R>>>,
}

impl<R> MemoSlot<R>
where
    R: Value,
{
    pub(crate) fn new() -> Self {
        Self {
            origin: ValueId::fresh(),
            cache: Mutex::new(None),
        }
    }

    /// Bring the cache up to date with `input`, computing with `compute` if
    /// the input changed. Returns whether the function ran.
    ///
    /// The lock is released while `compute` runs: the input may read this
    /// slot's own previous result.
    pub(crate) fn refresh<F>(&self, input: ValueId, compute: F) -> bool
    where
        F: FnOnce() -> Option<R>,
    {
        if let Some(cached) = self.cache.lock().as_ref() {
            if cached.input == input {
                return false;
            }
        }

        let output = compute();
        let mut cache = self.cache.lock();
        let version = cache.as_ref().map_or(0, |cached| cached.version + 1);
        *cache = Some(Cached {
            input,
            output,
            version,
        });
        true
    }

    pub(crate) fn signal(self: &Arc<Self>) -> Signal<R> {
        Signal::from_source(MemoView {
            memo: Arc::clone(self),
        })
    }
}

impl<R> Slot for MemoSlot<R>
where
    R: Value,
{
    fn on_unmount(&self) {
        *self.cache.lock() = None;
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn std::any::Any + Send + Sync> {
        self
    }
}

struct MemoView<R> {
    memo: Arc<MemoSlot<R>>,
}

impl<R> Source<R> for MemoView<R>
where
    R: Value,
{
    fn capability(&self) -> Capability {
        Capability::ReadOnly
    }

    fn value_id(&self) -> ValueId {
        match self.memo.cache.lock().as_ref() {
            Some(Cached { output: Some(_), version, .. }) => self.memo.origin.versioned(*version),
            _ => ValueId::EMPTY,
        }
    }

    fn read(&self) -> Option<R> {
        self.memo
            .cache
            .lock()
            .as_ref()
            .and_then(|cached| cached.output.clone())
    }
}
