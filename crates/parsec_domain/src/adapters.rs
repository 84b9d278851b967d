use crate::{ExecutionResult, PersistedAppState};

/// Everything the controller needs from the outside world.
///
/// Calls are blocking; the engine runs them off the mutation task.
pub trait SessionServices: Send + Sync {
    fn load_app_state(&self) -> Result<PersistedAppState, String>;

    fn save_app_state(&self, snapshot: PersistedAppState) -> Result<(), String>;

    fn execute_query(&self, query: String) -> Result<ExecutionResult, String>;

    fn validate_query(&self, query: String) -> Result<ExecutionResult, String>;
}
