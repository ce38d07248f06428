//! Visualization session shared by all route handlers.
//!
//! A session holds at most one store. Replacing it takes the write lock
//! only long enough to swap an `Arc`; queries clone the `Arc` and run
//! without holding any lock, so a query racing a replacement may see the
//! previous store.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use ontoview_core::{Error, Result, ServerConfig};
use ontoview_store::{Matches, Storage};

/// Turns a free-text query into raw records of the active store.
pub trait SearchHandler: Send + Sync {
    fn search(&self, storage: &Storage, query: &str, context: &Value) -> anyhow::Result<Matches>;
}

/// Answer to a chat message, optionally pointing at records to highlight.
#[derive(Debug, Clone, Default)]
pub struct ChatReply {
    pub response: String,
    pub matches: Option<Matches>,
}

pub trait ChatHandler: Send + Sync {
    fn chat(&self, storage: &Storage, query: &str, context: &Value) -> anyhow::Result<ChatReply>;
}

/// Case-insensitive substring search over element labels.
#[derive(Debug, Clone)]
pub struct LabelSearch {
    pub limit: usize,
}

impl Default for LabelSearch {
    fn default() -> Self {
        Self { limit: 20 }
    }
}

impl SearchHandler for LabelSearch {
    fn search(&self, storage: &Storage, query: &str, _context: &Value) -> anyhow::Result<Matches> {
        Ok(storage.find_by_label(query, self.limit))
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Features {
    pub search: bool,
    pub chat: bool,
}

pub struct Session {
    pub config: ServerConfig,
    storage: RwLock<Option<Arc<Storage>>>,
    search: RwLock<Option<Arc<dyn SearchHandler>>>,
    chat: RwLock<Option<Arc<dyn ChatHandler>>>,
    context: RwLock<Value>,
}

impl Session {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            storage: RwLock::new(None),
            search: RwLock::new(None),
            chat: RwLock::new(None),
            context: RwLock::new(Value::Object(Default::default())),
        }
    }

    /// Install a freshly built store, returning the one it replaces.
    pub fn replace(&self, storage: Storage) -> Option<Arc<Storage>> {
        let kind = storage.kind();
        let previous = self.storage.write().replace(Arc::new(storage));
        info!("Session now serving a {} visualization", kind);
        previous
    }

    pub fn storage(&self) -> Result<Arc<Storage>> {
        self.storage.read().clone().ok_or(Error::NoActiveStore)
    }

    pub fn register_search(&self, handler: impl SearchHandler + 'static) {
        *self.search.write() = Some(Arc::new(handler));
        debug!("Registered search handler");
    }

    pub fn register_chat(&self, handler: impl ChatHandler + 'static) {
        *self.chat.write() = Some(Arc::new(handler));
        debug!("Registered chat handler");
    }

    pub fn search_handler(&self) -> Result<Arc<dyn SearchHandler>> {
        self.search
            .read()
            .clone()
            .ok_or_else(|| Error::CallbackMissing("search".into()))
    }

    pub fn chat_handler(&self) -> Result<Arc<dyn ChatHandler>> {
        self.chat
            .read()
            .clone()
            .ok_or_else(|| Error::CallbackMissing("chat".into()))
    }

    pub fn features(&self) -> Features {
        Features {
            search: self.search.read().is_some(),
            chat: self.chat.read().is_some(),
        }
    }

    /// Merge `values` into the session context. Non-object values replace it.
    pub fn set_context(&self, values: Value) {
        let mut context = self.context.write();
        match (&mut *context, values) {
            (Value::Object(current), Value::Object(update)) => current.extend(update),
            (slot, other) => *slot = other,
        }
    }

    pub fn context(&self) -> Value {
        self.context.read().clone()
    }
}
