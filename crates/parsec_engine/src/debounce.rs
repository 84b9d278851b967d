use parsec_domain::{Action, TabKey};
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::EngineHandle;

pub const DEFAULT_EDIT_DELAY: Duration = Duration::from_millis(300);

/// Keyed trailing-edge debounce: scheduling work under a key cancels whatever was still
/// waiting under that key, so only the last submission in a burst runs.
pub struct Debouncer<K> {
    delay: Duration,
    pending: HashMap<K, JoinHandle<()>>,
}

impl<K: Eq + Hash> Debouncer<K> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    pub fn schedule<F>(&mut self, key: K, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.pending.retain(|_, task| !task.is_finished());

        let delay = self.delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        });
        if let Some(previous) = self.pending.insert(key, task) {
            previous.abort();
        }
    }

    /// Returns true when something was still waiting under `key`.
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.pending.remove(key) {
            Some(task) => {
                let waiting = !task.is_finished();
                task.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending
            .values()
            .filter(|task| !task.is_finished())
            .count()
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        for task in self.pending.values() {
            task.abort();
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EditKey {
    TabQuery(TabKey),
    ReferenceSearch,
}

/// Feeds keystroke-level edits into the engine once they settle.
pub struct EditorInput {
    handle: EngineHandle,
    debouncer: Debouncer<EditKey>,
}

impl EditorInput {
    pub fn new(handle: EngineHandle) -> Self {
        Self::with_delay(handle, DEFAULT_EDIT_DELAY)
    }

    pub fn with_delay(handle: EngineHandle, delay: Duration) -> Self {
        Self {
            handle,
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn query_changed(&mut self, tab_key: TabKey, query: impl Into<String>) {
        let action = Action::UpdateTabQuery {
            tab_key,
            query: query.into(),
        };
        self.schedule(EditKey::TabQuery(tab_key), action);
    }

    pub fn reference_search_changed(&mut self, search: impl Into<String>) {
        let action = Action::SetReferenceSearch {
            search: search.into(),
        };
        self.schedule(EditKey::ReferenceSearch, action);
    }

    /// Applies `query` immediately, dropping any edit still waiting for the tab. Use before
    /// running the query so the run sees the text on screen.
    pub async fn commit_query(
        &mut self,
        tab_key: TabKey,
        query: impl Into<String>,
    ) -> anyhow::Result<u64> {
        self.debouncer.cancel(&EditKey::TabQuery(tab_key));
        self.handle
            .apply(Action::UpdateTabQuery {
                tab_key,
                query: query.into(),
            })
            .await
    }

    pub fn pending_len(&self) -> usize {
        self.debouncer.pending_len()
    }

    fn schedule(&mut self, key: EditKey, action: Action) {
        let handle = self.handle.clone();
        self.debouncer.schedule(key, async move {
            if let Err(err) = handle.dispatch(action).await {
                tracing::warn!(error = %err, "dropped debounced edit");
            }
        });
    }
}
