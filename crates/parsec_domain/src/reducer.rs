use crate::persistence;
use crate::{
    Action, AppState, Effect, ExecutionResult, ExecutionSummary, HistoryId, HistoryStatus,
    InternalQuery, PersistedAppState, REFERENCE_CATALOG_QUERY, TabKey,
};

mod query;

impl AppState {
    pub fn to_persisted(&self) -> PersistedAppState {
        persistence::to_persisted_app_state(self)
    }

    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::AppStarted => vec![Effect::LoadAppState],
            Action::AppStateLoaded { persisted } => {
                persistence::apply_persisted_app_state(self, *persisted)
            }
            Action::AppStateLoadFailed { message } => {
                self.last_error = Some(message);
                Vec::new()
            }
            Action::AppStateSaved => Vec::new(),
            Action::AppStateSaveFailed { message } => {
                self.last_error = Some(message);
                Vec::new()
            }

            Action::SetActivity { activity } => {
                self.shell.activity = activity;
                Vec::new()
            }
            Action::ToggleSidebar => {
                self.shell.toggle_sidebar();
                Vec::new()
            }
            Action::SetSidebarOpen { open } => {
                self.shell.set_sidebar_open(open);
                Vec::new()
            }
            Action::SetCanOpenSidebar { can_open } => {
                self.shell.set_can_open_sidebar(can_open);
                Vec::new()
            }

            Action::OpenQueryTab => saved_if_ok(self.session.open_query_tab().map(|_| ())),
            Action::OpenHomeTab => saved_if_ok(self.session.open_home_tab().map(|_| ())),
            Action::CloseTab { tab_key } => saved_if_ok(self.session.close_tab(tab_key)),
            Action::SelectTab { index } => saved_if_ok(self.session.select_tab(index)),
            Action::UpdateTabLabel { tab_key, label } => {
                saved_if_ok(self.session.update_label(tab_key, label))
            }
            Action::UpdateTabQuery { tab_key, query } => {
                saved_if_ok(self.session.update_query_text(tab_key, query))
            }
            Action::MarkTabSeen { tab_key } => saved_if_ok(self.session.mark_tab_seen(tab_key)),
            Action::ToggleLayout => {
                self.session.toggle_layout();
                vec![Effect::SaveAppState]
            }

            Action::ExecuteQuery { tab_key } => self.start_execute(tab_key),
            Action::QueryExecuted {
                tab_key,
                history_id,
                result,
            } => self.finish_execute(tab_key, history_id, Ok(*result)),
            Action::QueryExecuteFailed {
                tab_key,
                history_id,
                message,
            } => self.finish_execute(tab_key, history_id, Err(message)),
            Action::ValidateQuery { tab_key } => self.start_validate(tab_key),
            Action::QueryValidated {
                tab_key,
                epoch,
                result,
            } => self.finish_validate(tab_key, epoch, Ok(*result)),
            Action::QueryValidateFailed {
                tab_key,
                epoch,
                message,
            } => self.finish_validate(tab_key, epoch, Err(message)),

            Action::ClearHistory => {
                self.history.clear();
                vec![Effect::SaveAppState]
            }

            Action::LoadReferenceCatalog => {
                if !self.reference.begin_catalog_load() {
                    return Vec::new();
                }
                vec![Effect::ExecuteInternalQuery {
                    purpose: InternalQuery::ReferenceCatalog,
                    query: REFERENCE_CATALOG_QUERY.to_owned(),
                }]
            }
            Action::InternalQueryFinished { purpose, outcome } => {
                match purpose {
                    InternalQuery::ReferenceCatalog => {
                        self.reference.finish_catalog_load(outcome.map(|result| *result));
                    }
                }
                Vec::new()
            }
            Action::SetReferenceSearch { search } => {
                self.reference.set_search(search);
                Vec::new()
            }
            Action::ClearReferenceSearch => {
                self.reference.clear_search();
                Vec::new()
            }
            Action::ToggleReferenceTokenType { token_type } => {
                self.reference.toggle_token_type(token_type);
                Vec::new()
            }
            Action::ClearReferenceTokenType => {
                self.reference.clear_token_type();
                Vec::new()
            }
        }
    }

    fn finish_execute(
        &mut self,
        tab_key: TabKey,
        history_id: HistoryId,
        outcome: Result<ExecutionResult, String>,
    ) -> Vec<Effect> {
        match &outcome {
            Ok(result) => {
                let status = if result.has_errors() {
                    HistoryStatus::Error
                } else {
                    HistoryStatus::Success
                };
                let (summary, data_sets) = result.clone().into_parts();
                self.history.complete(history_id, status, summary, data_sets);
            }
            Err(message) => {
                self.history.complete(
                    history_id,
                    HistoryStatus::Error,
                    ExecutionSummary::transport_failure(message.clone()),
                    Vec::new(),
                );
            }
        }

        self.finish_tab_execute(tab_key, outcome);
        vec![Effect::SaveAppState]
    }
}

/// Lookup and range failures are stale references from the caller; they change nothing.
fn saved_if_ok<E>(result: Result<(), E>) -> Vec<Effect> {
    match result {
        Ok(()) => vec![Effect::SaveAppState],
        Err(_) => Vec::new(),
    }
}
