use super::{HistoryCache, ReferenceState, Session, ShellState};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperationStatus {
    Idle,
    Running,
}

/// Root of everything the controller owns. Mutated only through [`AppState::apply`].
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub(crate) session: Session,
    pub(crate) history: HistoryCache,
    pub(crate) shell: ShellState,
    pub(crate) reference: ReferenceState,
    pub(crate) last_error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn history(&self) -> &HistoryCache {
        &self.history
    }

    pub fn shell(&self) -> &ShellState {
        &self.shell
    }

    pub fn reference(&self) -> &ReferenceState {
        &self.reference
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
