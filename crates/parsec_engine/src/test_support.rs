use parsec_domain::{
    DataSet, ExecutionResult, ExecutionSummary, PersistedAppState, REFERENCE_CATALOG_QUERY,
    SessionServices,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{AppSnapshot, EngineHandle};

#[derive(Default)]
struct FakeState {
    stored: PersistedAppState,
    saved: Option<PersistedAppState>,
    save_count: usize,
    executed: Vec<String>,
    load_error: Option<String>,
    query_error: Option<String>,
}

/// In-memory services: persisted state lives in a mutex and queries answer instantly.
#[derive(Default)]
pub(crate) struct FakeServices {
    inner: Mutex<FakeState>,
}

impl FakeServices {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_state(stored: PersistedAppState) -> Arc<Self> {
        let services = Self::default();
        services.lock().stored = stored;
        Arc::new(services)
    }

    pub(crate) fn fail_load(&self, message: &str) {
        self.lock().load_error = Some(message.to_owned());
    }

    pub(crate) fn fail_queries(&self, message: &str) {
        self.lock().query_error = Some(message.to_owned());
    }

    pub(crate) fn saved(&self) -> Option<PersistedAppState> {
        self.lock().saved.clone()
    }

    pub(crate) fn save_count(&self) -> usize {
        self.lock().save_count
    }

    pub(crate) fn executed(&self) -> Vec<String> {
        self.lock().executed.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap()
    }

    fn answer(&self, query: &str) -> Result<ExecutionResult, String> {
        if let Some(message) = self.lock().query_error.clone() {
            return Err(message);
        }

        let rows = if query == REFERENCE_CATALOG_QUERY {
            vec![
                json!({ "key": "count", "type": "function", "description": "Counts rows" }),
                json!({ "key": "input", "type": "input", "description": "Reads a source" }),
            ]
        } else {
            vec![json!({ "a": 1 })]
        };

        Ok(ExecutionResult {
            summary: ExecutionSummary {
                pretty_parsed_tree: query.to_owned(),
                ..ExecutionSummary::default()
            },
            data_sets: vec![DataSet {
                name: "result".to_owned(),
                count: rows.len() as u64,
                data: rows,
                ..DataSet::default()
            }],
        })
    }
}

impl SessionServices for FakeServices {
    fn load_app_state(&self) -> Result<PersistedAppState, String> {
        let state = self.lock();
        match &state.load_error {
            Some(message) => Err(message.clone()),
            None => Ok(state.stored.clone()),
        }
    }

    fn save_app_state(&self, snapshot: PersistedAppState) -> Result<(), String> {
        let mut state = self.lock();
        state.save_count += 1;
        state.saved = Some(snapshot);
        Ok(())
    }

    fn execute_query(&self, query: String) -> Result<ExecutionResult, String> {
        self.lock().executed.push(query.clone());
        self.answer(&query)
    }

    fn validate_query(&self, query: String) -> Result<ExecutionResult, String> {
        let mut result = self.answer(&query)?;
        result.data_sets.clear();
        Ok(result)
    }
}

/// Waits for the first committed snapshot matching `predicate`.
pub(crate) async fn wait_for(
    handle: &EngineHandle,
    predicate: impl FnMut(&Arc<AppSnapshot>) -> bool,
) -> Arc<AppSnapshot> {
    let mut rx = handle.subscribe();
    let snapshot = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for snapshot")
        .expect("engine stopped");
    snapshot.clone()
}
