use crate::error::{Error, Result};
use crate::index::{build_model, DocId, DocumentInput, Model};
use crate::search::{search, SearchResult};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Holder of the one live [`Model`].
///
/// Readers take an `Arc` snapshot and never see a model that is still being
/// built. Rebuilds are serialized and publish by swapping the pointer.
#[derive(Default)]
pub struct ModelStore {
    current: RwLock<Option<Arc<Model>>>,
    build_lock: Mutex<()>,
}

impl ModelStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_model(model: Option<Model>) -> Self {
        Self { current: RwLock::new(model.map(Arc::new)), build_lock: Mutex::new(()) }
    }

    pub fn get(&self) -> Option<Arc<Model>> {
        self.current.read().clone()
    }

    pub fn replace(&self, model: Model) -> Arc<Model> {
        let model = Arc::new(model);
        *self.current.write() = Some(model.clone());
        model
    }

    pub fn clear(&self) {
        self.clear_with(|| {});
    }

    /// Drop the live model, running `after_clear` under the build lock so it
    /// cannot interleave with a rebuild's hook.
    pub fn clear_with<F: FnOnce()>(&self, after_clear: F) {
        let _guard = self.build_lock.lock();
        *self.current.write() = None;
        after_clear();
    }

    /// Build a new model and publish it. On failure the previous model stays live.
    pub fn rebuild(&self, documents: &IndexMap<DocId, DocumentInput>) -> Result<Arc<Model>> {
        self.rebuild_with(documents, |_| {})
    }

    /// Like [`rebuild`](Self::rebuild), but runs `after_publish` before the
    /// build lock is released. Persisting from the hook keeps the stored slot
    /// in the same order as published models.
    pub fn rebuild_with<F>(&self, documents: &IndexMap<DocId, DocumentInput>, after_publish: F) -> Result<Arc<Model>>
    where
        F: FnOnce(&Model),
    {
        let _guard = self.build_lock.lock();
        let model = build_model(documents)?;
        let published = self.replace(model);
        tracing::info!(num_docs = published.len(), num_terms = published.num_terms(), "published model");
        after_publish(&*published);
        Ok(published)
    }

    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let model = self.get().ok_or(Error::EmptyModel)?;
        search(query, &model)
    }
}
