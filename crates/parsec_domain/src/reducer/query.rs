use crate::{AppState, Effect, ExecutionResult, TabKey};

impl AppState {
    pub(super) fn start_execute(&mut self, tab_key: TabKey) -> Vec<Effect> {
        let Some(query) = self.session.query_tab(tab_key).map(|tab| tab.query().to_owned()) else {
            return Vec::new();
        };
        let Some(history_id) = self.history.record(query.clone()) else {
            return Vec::new();
        };
        if let Some(tab) = self.session.query_tab_mut(tab_key) {
            tab.run_mut().begin_execute();
            tab.sync_running();
        }

        vec![
            Effect::SaveAppState,
            Effect::ExecuteQuery {
                tab_key,
                history_id,
                query,
            },
        ]
    }

    /// The tab may have been closed while the call was in flight.
    pub(super) fn finish_tab_execute(
        &mut self,
        tab_key: TabKey,
        outcome: Result<ExecutionResult, String>,
    ) {
        if let Some(tab) = self.session.query_tab_mut(tab_key) {
            tab.run_mut().finish_execute(outcome);
            tab.sync_running();
        }
    }

    pub(super) fn start_validate(&mut self, tab_key: TabKey) -> Vec<Effect> {
        let Some(tab) = self.session.query_tab_mut(tab_key) else {
            return Vec::new();
        };
        let epoch = tab.run_mut().begin_validate();
        tab.sync_running();
        vec![Effect::ValidateQuery {
            tab_key,
            epoch,
            query: tab.query().to_owned(),
        }]
    }

    pub(super) fn finish_validate(
        &mut self,
        tab_key: TabKey,
        epoch: u64,
        outcome: Result<ExecutionResult, String>,
    ) -> Vec<Effect> {
        if let Some(tab) = self.session.query_tab_mut(tab_key) {
            tab.run_mut().finish_validate(epoch, outcome);
            tab.sync_running();
        }
        Vec::new()
    }
}
