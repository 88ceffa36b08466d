//! In-memory doubles shared by the runtime tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use satchel_core::{Capture, Classified, Error, Result};
use satchel_llm::{ClassifierBackend, ClassifyRequest};
use satchel_store::RemoteStore;

/// In-memory remote that records every call it receives.
pub(crate) struct MemoryRemote {
    pub calls: Mutex<Vec<String>>,
    pub stored: Mutex<Vec<Capture>>,
    pub fail: AtomicBool,
}

impl MemoryRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            stored: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        })
    }

    fn check(&self, call: &str) -> Result<()> {
        self.calls.lock().push(call.to_string());
        if self.fail.load(Ordering::SeqCst) {
            Err(Error::RemoteStore("injected failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn load(&self) -> Result<Vec<Capture>> {
        self.check("load")?;
        Ok(self.stored.lock().clone())
    }

    async fn save_all(&self, captures: &[Capture]) -> Result<()> {
        self.check("save_all")?;
        *self.stored.lock() = captures.to_vec();
        Ok(())
    }

    async fn append(&self, capture: &Capture) -> Result<()> {
        self.check("append")?;
        self.stored.lock().push(capture.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check("delete")?;
        self.stored.lock().retain(|c| c.id != id);
        Ok(())
    }
}

/// Scripted classifier backend. Returns the queued response for each
/// call, or `ClassificationUnavailable` when told to fail.
pub(crate) struct MockClassifier {
    pub responses: Mutex<Vec<Classified>>,
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl MockClassifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        })
    }

    pub fn failing() -> Arc<Self> {
        let mock = Self::new();
        mock.fail.store(true, Ordering::SeqCst);
        mock
    }

    pub fn push(&self, classified: Classified) {
        self.responses.lock().push(classified);
    }
}

#[async_trait]
impl ClassifierBackend for MockClassifier {
    async fn classify(&self, _request: &ClassifyRequest) -> Result<Classified> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::ClassificationUnavailable("offline".into()));
        }
        let mut responses = self.responses.lock();
        if responses.is_empty() {
            Ok(Classified::default())
        } else {
            Ok(responses.remove(0))
        }
    }
}
