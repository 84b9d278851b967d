use anyhow::Context as _;
use parsec_domain::{ExecutionResult, PersistedAppState, SessionServices};
use std::sync::Arc;

use crate::config::BackendConfig;
use crate::query_client::QueryClient;
use crate::sqlite_store::SqliteStore;

/// Production [`SessionServices`]: SQLite for persisted state, HTTP for the query service.
pub struct ParsecService {
    sqlite: SqliteStore,
    queries: QueryClient,
}

impl ParsecService {
    pub fn new(config: &BackendConfig) -> anyhow::Result<Arc<Self>> {
        std::fs::create_dir_all(&config.parsec_root)
            .with_context(|| format!("failed to create {}", config.parsec_root.display()))?;

        let sqlite = SqliteStore::new(config.sqlite_path()).context("failed to init sqlite store")?;
        let queries = QueryClient::new(config.api_url.clone(), config.http_timeout)
            .context("failed to init query client")?;

        tracing::info!(
            root = %config.parsec_root.display(),
            api_url = %config.api_url,
            "parsec backend ready"
        );

        Ok(Arc::new(Self::with_parts(sqlite, queries)))
    }

    pub fn from_env() -> anyhow::Result<Arc<Self>> {
        Self::new(&BackendConfig::from_env()?)
    }

    pub fn with_parts(sqlite: SqliteStore, queries: QueryClient) -> Self {
        Self { sqlite, queries }
    }
}

impl SessionServices for ParsecService {
    fn load_app_state(&self) -> Result<PersistedAppState, String> {
        self.sqlite.load_app_state().map_err(|e| format!("{e:#}"))
    }

    fn save_app_state(&self, snapshot: PersistedAppState) -> Result<(), String> {
        self.sqlite
            .save_app_state(snapshot)
            .map_err(|e| format!("{e:#}"))
    }

    fn execute_query(&self, query: String) -> Result<ExecutionResult, String> {
        self.queries.execute(&query).map_err(|e| format!("{e:#}"))
    }

    fn validate_query(&self, query: String) -> Result<ExecutionResult, String> {
        self.queries.validate(&query).map_err(|e| format!("{e:#}"))
    }
}
