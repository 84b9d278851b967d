mod execution;
pub use execution::{DataSet, ExecutionResult, ExecutionSummary, MemoryStats, PerformanceStats};

mod adapters;
pub use adapters::SessionServices;
mod actions;
pub use actions::Action;
mod effects;
pub use effects::{Effect, InternalQuery};
mod dispatcher;
pub use dispatcher::{EffectDispatcher, Listener, Store, Transition, TransitionKind};
pub mod paths;

mod persistence;
mod state;
pub use state::*;

mod reducer;
