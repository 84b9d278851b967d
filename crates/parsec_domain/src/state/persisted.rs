use super::HistoryStatus;
use crate::ExecutionSummary;

/// Durable subset of [`super::AppState`]: no loading flags, no coordinator state, no
/// history payloads.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PersistedAppState {
    #[serde(default)]
    pub session: Option<PersistedSession>,
    #[serde(default)]
    pub history: Option<PersistedHistory>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PersistedSession {
    pub tabs: Vec<PersistedTab>,
    #[serde(default)]
    pub selected_index: usize,
    #[serde(default)]
    pub last_tab_number: u64,
    #[serde(default)]
    pub next_tab_key: u64,
    #[serde(default)]
    pub layout: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PersistedTab {
    Home {
        key: u64,
        label: String,
    },
    Query {
        key: u64,
        label: String,
        query: String,
        #[serde(default)]
        is_fresh: bool,
    },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PersistedHistory {
    pub entries: Vec<PersistedHistoryEntry>,
    #[serde(default)]
    pub next_id: u64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PersistedHistoryEntry {
    pub id: u64,
    pub query: String,
    pub status: HistoryStatus,
    #[serde(default)]
    pub summary: Option<ExecutionSummary>,
}
