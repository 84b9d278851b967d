mod debounce;
mod engine;

pub use debounce::{Debouncer, EditKey, EditorInput};
pub use engine::{AppSnapshot, Engine, EngineCommand, EngineHandle};

#[cfg(test)]
mod test_support;
