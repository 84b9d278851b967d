//! Bridges navigation transitions to session mutations.
//!
//! Listeners subscribe to a [`TransitionKind`] and only ever see committed state. Whatever
//! they return is queued behind the current action instead of being applied inline, so no
//! listener observes a half-applied step.

use crate::{Action, Activity, AppState, Effect};
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transition {
    ActivityEntered(Activity),
    StateRestored,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TransitionKind {
    ActivityEntered,
    StateRestored,
}

impl Transition {
    pub fn kind(self) -> TransitionKind {
        match self {
            Transition::ActivityEntered(_) => TransitionKind::ActivityEntered,
            Transition::StateRestored => TransitionKind::StateRestored,
        }
    }

    pub fn for_action(action: &Action) -> Option<Self> {
        match action {
            Action::SetActivity { activity } => Some(Transition::ActivityEntered(*activity)),
            Action::AppStateLoaded { .. } => Some(Transition::StateRestored),
            _ => None,
        }
    }
}

pub type Listener = Box<dyn Fn(&AppState, Transition) -> Vec<Action> + Send + Sync>;

pub struct EffectDispatcher {
    subscriptions: Vec<(TransitionKind, Listener)>,
}

impl std::fmt::Debug for EffectDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectDispatcher")
            .field(
                "subscriptions",
                &self.subscriptions.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for EffectDispatcher {
    fn default() -> Self {
        let mut dispatcher = Self::empty();
        dispatcher.subscribe(TransitionKind::ActivityEntered, shell_listener);
        dispatcher.subscribe(TransitionKind::StateRestored, shell_listener);
        dispatcher.subscribe(TransitionKind::ActivityEntered, reference_listener);
        dispatcher
    }
}

impl EffectDispatcher {
    pub fn empty() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    pub fn subscribe(
        &mut self,
        kind: TransitionKind,
        listener: impl Fn(&AppState, Transition) -> Vec<Action> + Send + Sync + 'static,
    ) {
        self.subscriptions.push((kind, Box::new(listener)));
    }

    /// Runs every listener subscribed to the transition's kind, in subscription order.
    pub fn notify(&self, state: &AppState, transition: Transition) -> Vec<Action> {
        let kind = transition.kind();
        self.subscriptions
            .iter()
            .filter(|(subscribed, _)| *subscribed == kind)
            .flat_map(|(_, listener)| listener(state, transition))
            .collect()
    }
}

/// Entering Home surfaces the singleton Home tab and locks the sidebar shut; any other
/// activity unlocks it and opens it. A restore while Home is active re-runs the Home
/// policy against the restored tabs.
fn shell_listener(state: &AppState, transition: Transition) -> Vec<Action> {
    match transition {
        Transition::ActivityEntered(Activity::Home) => enter_home(state),
        Transition::ActivityEntered(
            Activity::Queries | Activity::History | Activity::Reference | Activity::Settings,
        ) => vec![
            Action::SetCanOpenSidebar { can_open: true },
            Action::SetSidebarOpen { open: true },
        ],
        Transition::StateRestored if state.shell().activity() == Activity::Home => {
            enter_home(state)
        }
        Transition::StateRestored => Vec::new(),
    }
}

fn enter_home(state: &AppState) -> Vec<Action> {
    let tab_action = match state.session().home_tab_index() {
        Some(index) => Action::SelectTab { index },
        None => Action::OpenHomeTab,
    };
    vec![
        Action::SetSidebarOpen { open: false },
        Action::SetCanOpenSidebar { can_open: false },
        tab_action,
    ]
}

fn reference_listener(state: &AppState, transition: Transition) -> Vec<Action> {
    match transition {
        Transition::ActivityEntered(Activity::Reference) if state.reference().needs_catalog() => {
            vec![Action::LoadReferenceCatalog]
        }
        Transition::ActivityEntered(_) | Transition::StateRestored => Vec::new(),
    }
}

/// Single-writer owner of [`AppState`] and its listeners.
#[derive(Debug, Default)]
pub struct Store {
    state: AppState,
    dispatcher: EffectDispatcher,
}

impl Store {
    pub fn new(state: AppState, dispatcher: EffectDispatcher) -> Self {
        Self { state, dispatcher }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Applies `action` and every listener follow-up it triggers, one step at a time.
    /// Returns the effects collected across all steps, in order.
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        let mut actions = VecDeque::from([action]);
        let mut effects = Vec::new();

        while let Some(action) = actions.pop_front() {
            let transition = Transition::for_action(&action);
            effects.extend(self.state.apply(action));

            if let Some(transition) = transition {
                actions.extend(self.dispatcher.notify(&self.state, transition));
            }
        }

        effects
    }
}
