use crate::{
    AppState, EditorLayout, Effect, ExecutionSummary, HistoryCache, HistoryEntry, HistoryId,
    HistoryStatus, HomeTab, PersistedAppState, PersistedHistory, PersistedHistoryEntry,
    PersistedSession, PersistedTab, QueryTab, Session, Tab, TabKey,
};
use crate::state::MAX_RESTORED_ID;
use std::collections::HashSet;

pub(crate) const INTERRUPTED_MESSAGE: &str = "query was interrupted before it completed";

pub(crate) fn to_persisted_app_state(state: &AppState) -> PersistedAppState {
    let session = &state.session;
    let history = &state.history;

    PersistedAppState {
        session: Some(PersistedSession {
            tabs: session
                .tabs()
                .iter()
                .map(|tab| match tab {
                    Tab::Home(home) => PersistedTab::Home {
                        key: home.key().as_u64(),
                        label: home.label().to_owned(),
                    },
                    Tab::Query(query) => PersistedTab::Query {
                        key: query.key().as_u64(),
                        label: query.label().to_owned(),
                        query: query.query().to_owned(),
                        is_fresh: query.is_fresh(),
                    },
                })
                .collect(),
            selected_index: session.selected_index(),
            last_tab_number: session.last_tab_number(),
            next_tab_key: session.next_tab_key(),
            layout: Some(session.layout().as_str().to_owned()),
        }),
        history: Some(PersistedHistory {
            entries: history
                .entries()
                .map(|entry| PersistedHistoryEntry {
                    id: entry.id().as_u64(),
                    query: entry.query().to_owned(),
                    status: entry.status(),
                    summary: entry.summary().cloned(),
                })
                .collect(),
            next_id: history.next_id(),
        }),
    }
}

fn restore_session(persisted: PersistedSession) -> Session {
    let mut seen = HashSet::new();
    let mut tabs: Vec<Tab> = persisted
        .tabs
        .into_iter()
        .filter_map(|tab| {
            let tab = match tab {
                PersistedTab::Home { key, label } => Tab::Home(HomeTab {
                    key: TabKey(key),
                    label,
                }),
                PersistedTab::Query {
                    key,
                    label,
                    query,
                    is_fresh,
                } => {
                    let mut tab = QueryTab::new(TabKey(key), label, query);
                    tab.is_fresh = is_fresh;
                    Tab::Query(tab)
                }
            };
            seen.insert(tab.key()).then_some(tab)
        })
        .collect();

    let mut next_tab_key = persisted.next_tab_key;
    if next_tab_key > MAX_RESTORED_ID || tabs.iter().any(|tab| tab.key().0 > MAX_RESTORED_ID) {
        for (key, tab) in (1..).zip(tabs.iter_mut()) {
            tab.set_key(TabKey(key));
        }
        next_tab_key = 0;
    }

    let layout = persisted
        .layout
        .as_deref()
        .and_then(EditorLayout::parse)
        .unwrap_or_default();

    Session::from_parts(
        tabs,
        persisted.selected_index,
        persisted.last_tab_number.min(MAX_RESTORED_ID),
        next_tab_key,
        layout,
    )
}

/// Returns the cache and whether any entry had to be resolved.
fn restore_history(persisted: PersistedHistory) -> (HistoryCache, bool) {
    let mut repaired = false;
    let mut seen = HashSet::new();
    let mut entries: Vec<HistoryEntry> = persisted
        .entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id))
        .map(|entry| {
            let (status, summary) = match entry.status {
                HistoryStatus::Running => {
                    repaired = true;
                    (
                        HistoryStatus::Error,
                        Some(ExecutionSummary::transport_failure(INTERRUPTED_MESSAGE)),
                    )
                }
                status => (status, entry.summary),
            };
            HistoryEntry {
                id: HistoryId(entry.id),
                query: entry.query,
                status,
                summary,
            }
        })
        .collect();

    let mut next_id = persisted.next_id;
    if next_id > MAX_RESTORED_ID || entries.iter().any(|entry| entry.id.0 > MAX_RESTORED_ID) {
        let newest = entries.len() as u64;
        for (id, entry) in (1..=newest).rev().zip(entries.iter_mut()) {
            entry.id = HistoryId(id);
        }
        next_id = 0;
    }
    (HistoryCache::from_parts(entries, next_id), repaired)
}

pub(crate) fn apply_persisted_app_state(
    state: &mut AppState,
    persisted: PersistedAppState,
) -> Vec<Effect> {
    let mut effects = Vec::new();

    if let Some(session) = persisted.session {
        state.session = restore_session(session);
    }

    if let Some(history) = persisted.history {
        let (history, repaired) = restore_history(history);
        state.history = history;
        if repaired {
            effects.push(Effect::SaveAppState);
        }
    }

    effects
}
