// src/query/mutation.rs

//! Mutation kinds and per-call-site serialization.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use crate::cache::CacheEvent;
use crate::error::Result;

/// A write against the story collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    ToggleLike,
}

impl MutationKind {
    /// Cache event applied after the mutation succeeds.
    pub fn event(&self) -> CacheEvent {
        match self {
            MutationKind::Create => CacheEvent::Created,
            MutationKind::Update => CacheEvent::Updated,
            MutationKind::Delete => CacheEvent::Deleted,
            MutationKind::ToggleLike => CacheEvent::LikeToggled,
        }
    }

    pub fn success_message(&self) -> Option<&'static str> {
        match self {
            MutationKind::Create => Some("Story created successfully!"),
            MutationKind::Update => Some("Story updated successfully!"),
            MutationKind::Delete => Some("Story deleted successfully!"),
            MutationKind::ToggleLike => None,
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            MutationKind::Create => "Failed to create story",
            MutationKind::Update => "Failed to update story",
            MutationKind::Delete => "Failed to delete story",
            MutationKind::ToggleLike => "Failed to update like",
        }
    }

    /// Failures that are reported even when only the defaults are enabled.
    pub fn always_reports_failure(&self) -> bool {
        matches!(self, MutationKind::Update)
    }
}

/// One mutation call site: at most one mutation in flight at a time.
///
/// Separate handles do not coordinate with each other.
#[derive(Debug, Default)]
pub struct MutationHandle {
    gate: Mutex<()>,
    pending: AtomicBool,
}

struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl MutationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Run `mutation` once every earlier mutation on this handle finished.
    pub async fn run<T, F>(&self, mutation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _turn = self.gate.lock().await;
        self.pending.store(true, Ordering::SeqCst);
        let _pending = PendingGuard(&self.pending);
        mutation.await
    }
}
