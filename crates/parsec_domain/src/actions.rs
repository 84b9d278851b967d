use crate::{
    Activity, ExecutionResult, HistoryId, InternalQuery, PersistedAppState, TabKey, TokenType,
};

#[derive(Clone, Debug)]
pub enum Action {
    AppStarted,
    AppStateLoaded {
        persisted: Box<PersistedAppState>,
    },
    AppStateLoadFailed {
        message: String,
    },
    AppStateSaved,
    AppStateSaveFailed {
        message: String,
    },

    SetActivity {
        activity: Activity,
    },
    ToggleSidebar,
    SetSidebarOpen {
        open: bool,
    },
    SetCanOpenSidebar {
        can_open: bool,
    },

    OpenQueryTab,
    OpenHomeTab,
    CloseTab {
        tab_key: TabKey,
    },
    SelectTab {
        index: usize,
    },
    UpdateTabLabel {
        tab_key: TabKey,
        label: String,
    },
    UpdateTabQuery {
        tab_key: TabKey,
        query: String,
    },
    MarkTabSeen {
        tab_key: TabKey,
    },
    ToggleLayout,

    ExecuteQuery {
        tab_key: TabKey,
    },
    QueryExecuted {
        tab_key: TabKey,
        history_id: HistoryId,
        result: Box<ExecutionResult>,
    },
    QueryExecuteFailed {
        tab_key: TabKey,
        history_id: HistoryId,
        message: String,
    },
    ValidateQuery {
        tab_key: TabKey,
    },
    QueryValidated {
        tab_key: TabKey,
        epoch: u64,
        result: Box<ExecutionResult>,
    },
    QueryValidateFailed {
        tab_key: TabKey,
        epoch: u64,
        message: String,
    },

    ClearHistory,

    LoadReferenceCatalog,
    InternalQueryFinished {
        purpose: InternalQuery,
        outcome: Result<Box<ExecutionResult>, String>,
    },
    SetReferenceSearch {
        search: String,
    },
    ClearReferenceSearch,
    ToggleReferenceTokenType {
        token_type: TokenType,
    },
    ClearReferenceTokenType,
}
