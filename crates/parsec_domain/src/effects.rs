use crate::{HistoryId, TabKey};

/// Background query calls that are not initiated by the user and never reach history.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum InternalQuery {
    ReferenceCatalog,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Effect {
    LoadAppState,
    SaveAppState,

    ExecuteQuery {
        tab_key: TabKey,
        history_id: HistoryId,
        query: String,
    },
    ValidateQuery {
        tab_key: TabKey,
        epoch: u64,
        query: String,
    },
    ExecuteInternalQuery {
        purpose: InternalQuery,
        query: String,
    },
}
