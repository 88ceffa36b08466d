//! Capture repository — the single owner of in-memory capture state.
//!
//! Local-first: every mutation lands in memory and the JSON cache
//! before any remote write is considered, and remote failures never
//! fail a local operation. The collection is kept most-recent-first.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use satchel_classify::classify_fallback;
use satchel_core::{
    now, ActionTaken, Capture, Classified, ContentType, Error, Result, SatchelConfig,
};
use satchel_llm::{ClassifierBackend, ClassifyRequest};
use satchel_store::{CaptureCache, RemoteStore};

use crate::sync::{SyncScheduler, WriteOp};

pub struct CaptureRepository {
    cache: CaptureCache,
    classifier: Arc<dyn ClassifierBackend>,
    remote: Option<Arc<dyn RemoteStore>>,
    scheduler: Option<Arc<SyncScheduler>>,
    captures: RwLock<Vec<Capture>>,
    /// Per-capture reprocess generation. A stale in-flight result is
    /// discarded when a newer reprocess has bumped the counter.
    generations: Mutex<HashMap<String, u64>>,
    /// Free-text classification rules injected into the prompt.
    rules: RwLock<Option<String>>,
    /// Standing facts the classifier should know about.
    memories: RwLock<Vec<String>>,
}

impl CaptureRepository {
    pub fn new(
        config: &SatchelConfig,
        classifier: Arc<dyn ClassifierBackend>,
        remote: Option<Arc<dyn RemoteStore>>,
    ) -> Arc<Self> {
        let scheduler = remote.as_ref().map(|remote| {
            SyncScheduler::new(
                Arc::clone(remote),
                Duration::from_millis(config.sync_quiet_ms),
            )
        });
        Arc::new(Self {
            cache: CaptureCache::new(&config.data_paths.captures_file),
            classifier,
            remote,
            scheduler,
            captures: RwLock::new(Vec::new()),
            generations: Mutex::new(HashMap::new()),
            rules: RwLock::new(None),
            memories: RwLock::new(Vec::new()),
        })
    }

    pub fn set_rules(&self, rules: Option<String>) {
        *self.rules.write() = rules;
    }

    pub fn set_memories(&self, memories: Vec<String>) {
        *self.memories.write() = memories;
    }

    /// Load the cached snapshot into memory, then reconcile with the
    /// remote in the background. The cache is available immediately; a
    /// non-empty remote replaces it wholesale once the load finishes.
    pub fn hydrate(self: &Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        let cached = self.cache.load();
        info!("Hydrated {} captures from local cache", cached.len());
        *self.captures.write() = cached;

        let remote = self.remote.clone()?;
        let this = Arc::clone(self);
        Some(tokio::spawn(async move {
            match remote.load().await {
                Ok(captures) if !captures.is_empty() => {
                    info!("Remote store has {} captures, replacing cache", captures.len());
                    let snapshot = {
                        let mut current = this.captures.write();
                        *current = captures;
                        current.clone()
                    };
                    this.persist(&snapshot);
                }
                Ok(_) => debug!("Remote store empty, keeping local cache"),
                Err(e) => warn!("Remote hydrate failed, keeping local cache: {}", e),
            }
        }))
    }

    /// Capture new content: classify, assign identity, insert at the
    /// head, persist, and schedule a remote sync.
    pub async fn create(&self, content: &str, content_type: ContentType) -> Result<Capture> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::InvalidInput("capture content is empty".into()));
        }

        let classified = self.classify(content, content_type).await;
        let timestamp = now();
        let capture = Capture::from_classified(
            Capture::new_id(),
            content,
            content_type,
            classified,
            timestamp.clone(),
            timestamp,
        );

        let snapshot = {
            let mut captures = self.captures.write();
            captures.insert(0, capture.clone());
            captures.clone()
        };
        self.persist(&snapshot);
        self.schedule(snapshot, WriteOp::Created(capture.id.clone()));
        Ok(capture)
    }

    /// Snapshot of the collection, most recent first. No I/O.
    pub fn list(&self) -> Vec<Capture> {
        self.captures.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<Capture> {
        self.captures.read().iter().find(|c| c.id == id).cloned()
    }

    pub fn count(&self) -> usize {
        self.captures.read().len()
    }

    /// Remove a capture. Idempotent — deleting an absent id succeeds.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let (removed, snapshot) = {
            let mut captures = self.captures.write();
            let before = captures.len();
            captures.retain(|c| c.id != id);
            (captures.len() != before, captures.clone())
        };
        if !removed {
            return Ok(());
        }
        self.persist(&snapshot);
        self.generations.lock().remove(id);

        if let Some(remote) = &self.remote {
            if let Err(e) = remote.delete(id).await {
                // Fall back to a bulk sync, which rewrites the remote
                // without the deleted capture.
                warn!("Remote delete failed, scheduling bulk sync: {}", e);
                self.schedule(snapshot, WriteOp::Other);
            }
        }
        Ok(())
    }

    /// Record a downstream action against a capture.
    pub fn mark_action(&self, id: &str, action: ActionTaken) -> Result<Capture> {
        let (capture, snapshot) = {
            let mut captures = self.captures.write();
            let capture = captures
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| Error::NotFound(format!("capture {}", id)))?;
            capture.action_taken = Some(action);
            capture.updated_at = now();
            (capture.clone(), captures.clone())
        };
        self.persist(&snapshot);
        self.schedule(snapshot, WriteOp::Other);
        Ok(capture)
    }

    /// Re-run classification for a capture, optionally with edited
    /// content. Preserves `id`, `created_at`, and `action_taken`.
    /// Rapid successive calls are last-write-wins: a result that
    /// arrives after a newer reprocess started is discarded.
    pub async fn reprocess(&self, id: &str, new_content: Option<&str>) -> Result<Capture> {
        let content = {
            let captures = self.captures.read();
            let capture = captures
                .iter()
                .find(|c| c.id == id)
                .ok_or_else(|| Error::NotFound(format!("capture {}", id)))?;
            match new_content {
                Some(edited) => edited.trim().to_string(),
                None => capture.raw_content.clone(),
            }
        };
        if content.is_empty() {
            return Err(Error::InvalidInput("capture content is empty".into()));
        }
        let content_type = ContentType::detect(&content);

        let generation = {
            let mut generations = self.generations.lock();
            let counter = generations.entry(id.to_string()).or_insert(0);
            *counter += 1;
            *counter
        };

        let classified = self.classify(&content, content_type).await;

        if self.generations.lock().get(id).copied() != Some(generation) {
            debug!("Discarding stale reprocess result for {}", id);
            return self
                .get(id)
                .ok_or_else(|| Error::NotFound(format!("capture {}", id)));
        }

        let (capture, snapshot) = {
            let mut captures = self.captures.write();
            let capture = captures
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| Error::NotFound(format!("capture {}", id)))?;
            capture.apply_classified(&content, content_type, classified, now());
            (capture.clone(), captures.clone())
        };
        self.persist(&snapshot);
        self.schedule(snapshot, WriteOp::Other);
        Ok(capture)
    }

    /// Start the background sync task, if a remote is configured.
    pub fn spawn_sync(&self) -> Option<tokio::task::JoinHandle<()>> {
        self.scheduler.as_ref().map(|s| s.spawn())
    }

    /// Flush any pending remote write immediately.
    pub async fn flush_remote(&self) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.flush().await;
        }
    }

    /// Stop the background sync task, flushing pending writes.
    pub fn shutdown_sync(&self) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.shutdown();
        }
    }

    async fn classify(&self, content: &str, content_type: ContentType) -> Classified {
        let mut request = ClassifyRequest::new(content, content_type);
        request.rules = self.rules.read().clone();
        request.memories = self.memories.read().clone();
        match self.classifier.classify(&request).await {
            Ok(classified) => classified,
            Err(e) => {
                debug!("Remote classification unavailable, using fallback: {}", e);
                classify_fallback(content, content_type)
            }
        }
    }

    fn persist(&self, snapshot: &[Capture]) {
        if let Err(e) = self.cache.save(snapshot) {
            warn!("Failed to write capture cache: {}", e);
        }
    }

    fn schedule(&self, snapshot: Vec<Capture>, op: WriteOp) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.schedule(snapshot, op);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryRemote, MockClassifier};
    use satchel_core::Category;
    use std::sync::atomic::Ordering;

    fn test_config(dir: &tempfile::TempDir) -> SatchelConfig {
        SatchelConfig {
            data_paths: satchel_core::DataPaths::new(dir.path()).unwrap(),
            sync_quiet_ms: 50,
        }
    }

    #[tokio::test]
    async fn test_create_inserts_at_head_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let repo = CaptureRepository::new(&config, MockClassifier::failing(), None);

        repo.create("first note", ContentType::Text).await.unwrap();
        let second = repo.create("second note", ContentType::Text).await.unwrap();

        let listed = repo.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);

        // Cache file reflects the collection
        let cached = CaptureCache::new(&config.data_paths.captures_file).load();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].id, second.id);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_content() {
        let dir = tempfile::tempdir().unwrap();
        let repo =
            CaptureRepository::new(&test_config(&dir), MockClassifier::failing(), None);

        for input in ["", "   ", "\n\t"] {
            match repo.create(input, ContentType::Text).await {
                Err(Error::InvalidInput(_)) => {}
                other => panic!("expected InvalidInput, got {:?}", other.map(|c| c.id)),
            }
        }
        assert_eq!(repo.count(), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back_to_rules() {
        let dir = tempfile::tempdir().unwrap();
        let repo =
            CaptureRepository::new(&test_config(&dir), MockClassifier::failing(), None);

        let capture = repo
            .create("URGENT: call John back ASAP", ContentType::Text)
            .await
            .unwrap();
        assert_eq!(capture.category, Category::Tasks);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let remote = MemoryRemote::new();
        let repo = CaptureRepository::new(
            &test_config(&dir),
            MockClassifier::failing(),
            Some(remote.clone()),
        );

        let capture = repo.create("to be removed", ContentType::Text).await.unwrap();
        repo.delete(&capture.id).await.unwrap();
        assert!(repo.get(&capture.id).is_none());

        // Second delete of the same id is a no-op, not an error.
        repo.delete(&capture.id).await.unwrap();
        assert_eq!(remote.calls.lock().iter().filter(|c| *c == "delete").count(), 1);
    }

    #[tokio::test]
    async fn test_mark_action_bumps_updated_at() {
        let dir = tempfile::tempdir().unwrap();
        let repo =
            CaptureRepository::new(&test_config(&dir), MockClassifier::failing(), None);

        let mut capture = repo
            .create("inquiry from Sarah at Marriott", ContentType::Text)
            .await
            .unwrap();
        capture.updated_at = "2026-01-01T00:00:00Z".into();

        let marked = repo
            .mark_action(&capture.id, ActionTaken::AddedToLeadtrack)
            .unwrap();
        assert_eq!(marked.action_taken, Some(ActionTaken::AddedToLeadtrack));
        assert_ne!(marked.updated_at, "2026-01-01T00:00:00Z");

        match repo.mark_action("cap_missing", ActionTaken::AddedToTasks) {
            Err(Error::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other.map(|c| c.id)),
        }
    }

    #[tokio::test]
    async fn test_reprocess_preserves_identity_and_action() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = MockClassifier::new();
        let repo = CaptureRepository::new(&test_config(&dir), classifier.clone(), None);

        let capture = repo.create("random note", ContentType::Text).await.unwrap();
        repo.mark_action(&capture.id, ActionTaken::AddedToTasks).unwrap();

        classifier.push(Classified {
            category: Category::Leads,
            summary: "a lead after all".into(),
            ..Default::default()
        });
        let reprocessed = repo
            .reprocess(&capture.id, Some("inquiry from Dana"))
            .await
            .unwrap();

        assert_eq!(reprocessed.id, capture.id);
        assert_eq!(reprocessed.created_at, capture.created_at);
        assert_eq!(reprocessed.category, Category::Leads);
        assert_eq!(reprocessed.raw_content, "inquiry from Dana");
        assert_eq!(reprocessed.action_taken, Some(ActionTaken::AddedToTasks));
    }

    #[tokio::test]
    async fn test_reprocess_same_content_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let repo =
            CaptureRepository::new(&test_config(&dir), MockClassifier::failing(), None);

        let capture = repo
            .create("book flights for March 5th", ContentType::Text)
            .await
            .unwrap();
        let first = repo.reprocess(&capture.id, None).await.unwrap();
        let second = repo.reprocess(&capture.id, None).await.unwrap();

        assert_eq!(first.category, second.category);
        assert_eq!(first.summary, second.summary);
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_create_schedules_remote_sync() {
        let dir = tempfile::tempdir().unwrap();
        let remote = MemoryRemote::new();
        let repo = CaptureRepository::new(
            &test_config(&dir),
            MockClassifier::failing(),
            Some(remote.clone()),
        );

        let capture = repo.create("sync me", ContentType::Text).await.unwrap();
        assert!(remote.calls.lock().is_empty());

        repo.flush_remote().await;
        assert_eq!(remote.calls.lock().as_slice(), ["append"]);
        assert_eq!(remote.stored.lock()[0].id, capture.id);
    }

    #[tokio::test]
    async fn test_hydrate_prefers_nonempty_remote() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);

        let remote_capture = Capture::from_classified(
            Capture::new_id(),
            "from the remote",
            ContentType::Text,
            Classified::default(),
            now(),
            now(),
        );
        let remote = MemoryRemote::new();
        remote.stored.lock().push(remote_capture.clone());

        // Stale local cache with a different capture
        let local_capture = Capture::from_classified(
            Capture::new_id(),
            "only local",
            ContentType::Text,
            Classified::default(),
            now(),
            now(),
        );
        CaptureCache::new(&config.data_paths.captures_file)
            .save(&[local_capture])
            .unwrap();

        let repo = CaptureRepository::new(
            &config,
            MockClassifier::failing(),
            Some(remote.clone()),
        );
        let handle = repo.hydrate().unwrap();
        handle.await.unwrap();

        let listed = repo.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, remote_capture.id);

        // Cache re-saved with the remote contents
        let cached = CaptureCache::new(&config.data_paths.captures_file).load();
        assert_eq!(cached[0].id, remote_capture.id);
    }

    #[tokio::test]
    async fn test_hydrate_keeps_cache_when_remote_empty_or_down() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);

        let local_capture = Capture::from_classified(
            Capture::new_id(),
            "survives",
            ContentType::Text,
            Classified::default(),
            now(),
            now(),
        );
        CaptureCache::new(&config.data_paths.captures_file)
            .save(&[local_capture.clone()])
            .unwrap();

        // Empty remote
        let remote = MemoryRemote::new();
        let repo = CaptureRepository::new(
            &config,
            MockClassifier::failing(),
            Some(remote.clone()),
        );
        repo.hydrate().unwrap().await.unwrap();
        assert_eq!(repo.list()[0].id, local_capture.id);

        // Failing remote
        let remote = MemoryRemote::new();
        remote.fail.store(true, Ordering::SeqCst);
        let repo = CaptureRepository::new(
            &config,
            MockClassifier::failing(),
            Some(remote.clone()),
        );
        repo.hydrate().unwrap().await.unwrap();
        assert_eq!(repo.list()[0].id, local_capture.id);
    }

    #[tokio::test]
    async fn test_burst_of_creates_coalesces_remote_writes() {
        let dir = tempfile::tempdir().unwrap();
        let remote = MemoryRemote::new();
        let repo = CaptureRepository::new(
            &test_config(&dir),
            MockClassifier::failing(),
            Some(remote.clone()),
        );

        for i in 0..4 {
            repo.create(&format!("note {}", i), ContentType::Text)
                .await
                .unwrap();
        }
        repo.flush_remote().await;

        // Four creates, one remote call (bulk, since more than one op
        // accumulated).
        assert_eq!(remote.calls.lock().as_slice(), ["save_all"]);
        assert_eq!(remote.stored.lock().len(), 4);
    }
}
