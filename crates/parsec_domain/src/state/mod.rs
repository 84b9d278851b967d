mod app;
mod history;
mod ids;
mod persisted;
mod query_run;
mod reference;
mod session;
mod shell;
mod tab;

pub use app::{AppState, OperationStatus};
pub use history::{HISTORY_CAPACITY, HistoryCache, HistoryEntry, HistoryStatus};
pub(crate) use ids::MAX_RESTORED_ID;
pub use ids::{HistoryId, TabKey};
pub use persisted::{
    PersistedAppState, PersistedHistory, PersistedHistoryEntry, PersistedSession, PersistedTab,
};
pub use query_run::{DisplayedResult, QueryRun};
pub use reference::{REFERENCE_CATALOG_QUERY, ReferenceState, TokenType};
pub use session::{
    EditorLayout, HOME_TAB_LABEL, Session, SessionError, default_query_label, default_query_text,
};
pub use shell::{Activity, ShellState};
pub use tab::{HomeTab, QueryTab, Tab, TabKind};
