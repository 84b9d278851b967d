use anyhow::Context as _;
use parsec_backend::{BackendConfig, ParsecService};
use parsec_domain::{
    Action, AppState, Effect, EffectDispatcher, ExecutionResult, InternalQuery, SessionServices,
    Store,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Committed state as seen by readers. `rev` increases once per processed action.
#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub rev: u64,
    pub state: AppState,
}

#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
    snapshots: watch::Receiver<Arc<AppSnapshot>>,
}

impl EngineHandle {
    pub async fn current_rev(&self) -> anyhow::Result<u64> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(EngineCommand::GetRev { reply: tx })
            .await
            .context("engine unavailable")?;
        rx.await.context("engine stopped")
    }

    /// Queues `action` without waiting for it to be applied.
    pub async fn dispatch(&self, action: Action) -> anyhow::Result<()> {
        self.tx
            .send(EngineCommand::DispatchAction {
                action: Box::new(action),
            })
            .await
            .context("engine unavailable")
    }

    /// Applies `action` and waits until it and its synchronous effects are committed.
    /// Returns the revision after the last follow-up.
    pub async fn apply(&self, action: Action) -> anyhow::Result<u64> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(EngineCommand::ApplyAction {
                action: Box::new(action),
                reply: tx,
            })
            .await
            .context("engine unavailable")?;
        rx.await.context("engine stopped")
    }

    pub fn snapshot(&self) -> Arc<AppSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<AppSnapshot>> {
        self.snapshots.clone()
    }
}

pub enum EngineCommand {
    GetRev {
        reply: oneshot::Sender<u64>,
    },
    ApplyAction {
        action: Box<Action>,
        reply: oneshot::Sender<u64>,
    },
    DispatchAction {
        action: Box<Action>,
    },
}

/// Single writer for [`AppState`].
///
/// Load and save effects are awaited in place. Query calls run in background tasks and report
/// back through [`EngineCommand::DispatchAction`], so the command loop never waits on the
/// query service.
pub struct Engine {
    store: Store,
    rev: u64,
    services: Arc<dyn SessionServices>,
    tx: mpsc::Sender<EngineCommand>,
    snapshots: watch::Sender<Arc<AppSnapshot>>,
}

impl Engine {
    pub fn start(services: Arc<dyn SessionServices>) -> EngineHandle {
        Self::start_with_dispatcher(services, EffectDispatcher::default())
    }

    pub fn start_with_dispatcher(
        services: Arc<dyn SessionServices>,
        dispatcher: EffectDispatcher,
    ) -> EngineHandle {
        let (tx, mut rx) = mpsc::channel::<EngineCommand>(256);
        let store = Store::new(AppState::new(), dispatcher);
        let (snapshots, snapshot_rx) = watch::channel(Arc::new(AppSnapshot {
            rev: 0,
            state: store.state().clone(),
        }));

        let mut engine = Self {
            store,
            rev: 0,
            services,
            tx: tx.clone(),
            snapshots,
        };

        tokio::spawn(async move {
            engine.bootstrap().await;
            while let Some(cmd) = rx.recv().await {
                engine.handle(cmd).await;
            }
        });

        EngineHandle {
            tx,
            snapshots: snapshot_rx,
        }
    }

    /// Starts an engine backed by SQLite and the HTTP query service described by `config`.
    pub async fn start_with_backend(config: BackendConfig) -> anyhow::Result<EngineHandle> {
        // The blocking HTTP client must be built off the async workers.
        let service = tokio::task::spawn_blocking(move || ParsecService::new(&config))
            .await
            .context("failed to join backend init task")??;
        Ok(Self::start(service))
    }

    async fn bootstrap(&mut self) {
        self.process_action_queue(Action::AppStarted).await;
    }

    async fn handle(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::GetRev { reply } => {
                let _ = reply.send(self.rev);
            }
            EngineCommand::ApplyAction { action, reply } => {
                self.process_action_queue(*action).await;
                let _ = reply.send(self.rev);
            }
            EngineCommand::DispatchAction { action } => {
                self.process_action_queue(*action).await;
            }
        }
    }

    async fn process_action_queue(&mut self, initial: Action) {
        let mut actions = VecDeque::from([initial]);
        let mut effects = VecDeque::<Effect>::new();

        while let Some(action) = actions.pop_front() {
            self.rev = self.rev.saturating_add(1);

            for effect in self.store.dispatch(action) {
                if effect == Effect::SaveAppState && effects.contains(&Effect::SaveAppState) {
                    continue;
                }
                effects.push_back(effect);
            }
            self.publish_snapshot();

            while let Some(effect) = effects.pop_front() {
                match self.run_effect(effect).await {
                    Ok(mut followups) => actions.append(&mut followups),
                    Err(err) => {
                        tracing::error!(error = %err, "effect failed");
                    }
                }
            }
        }
    }

    async fn run_effect(&mut self, effect: Effect) -> anyhow::Result<VecDeque<Action>> {
        match effect {
            Effect::LoadAppState => {
                let services = self.services.clone();
                let loaded = tokio::task::spawn_blocking(move || services.load_app_state())
                    .await
                    .ok()
                    .unwrap_or_else(|| Err("failed to join load task".to_owned()));
                let action = match loaded {
                    Ok(persisted) => Action::AppStateLoaded {
                        persisted: Box::new(persisted),
                    },
                    Err(message) => {
                        tracing::warn!(error = %message, "failed to load app state");
                        Action::AppStateLoadFailed { message }
                    }
                };
                Ok(VecDeque::from([action]))
            }
            Effect::SaveAppState => {
                let services = self.services.clone();
                let snapshot = self.store.state().to_persisted();
                let saved = tokio::task::spawn_blocking(move || services.save_app_state(snapshot))
                    .await
                    .ok()
                    .unwrap_or_else(|| Err("failed to join save task".to_owned()));
                let action = match saved {
                    Ok(()) => Action::AppStateSaved,
                    Err(message) => {
                        tracing::warn!(error = %message, "failed to save app state");
                        Action::AppStateSaveFailed { message }
                    }
                };
                Ok(VecDeque::from([action]))
            }
            Effect::ExecuteQuery {
                tab_key,
                history_id,
                query,
            } => {
                self.spawn_query(
                    "execute",
                    move |services| services.execute_query(query),
                    move |outcome| match outcome {
                        Ok(result) => Action::QueryExecuted {
                            tab_key,
                            history_id,
                            result: Box::new(result),
                        },
                        Err(message) => Action::QueryExecuteFailed {
                            tab_key,
                            history_id,
                            message,
                        },
                    },
                );
                Ok(VecDeque::new())
            }
            Effect::ValidateQuery {
                tab_key,
                epoch,
                query,
            } => {
                self.spawn_query(
                    "validate",
                    move |services| services.validate_query(query),
                    move |outcome| match outcome {
                        Ok(result) => Action::QueryValidated {
                            tab_key,
                            epoch,
                            result: Box::new(result),
                        },
                        Err(message) => Action::QueryValidateFailed {
                            tab_key,
                            epoch,
                            message,
                        },
                    },
                );
                Ok(VecDeque::new())
            }
            Effect::ExecuteInternalQuery { purpose, query } => {
                let label = match purpose {
                    InternalQuery::ReferenceCatalog => "reference catalog",
                };
                self.spawn_query(
                    label,
                    move |services| services.execute_query(query),
                    move |outcome| Action::InternalQueryFinished {
                        purpose,
                        outcome: outcome.map(Box::new),
                    },
                );
                Ok(VecDeque::new())
            }
        }
    }

    fn spawn_query(
        &self,
        label: &'static str,
        call: impl FnOnce(&dyn SessionServices) -> Result<ExecutionResult, String> + Send + 'static,
        into_action: impl FnOnce(Result<ExecutionResult, String>) -> Action + Send + 'static,
    ) {
        let services = self.services.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = tokio::task::spawn_blocking(move || call(services.as_ref()))
                .await
                .ok()
                .unwrap_or_else(|| Err(format!("failed to join {label} task")));
            if let Err(message) = &outcome {
                tracing::warn!(query = label, error = %message, "query call failed");
            }
            let action = into_action(outcome);
            if tx
                .send(EngineCommand::DispatchAction {
                    action: Box::new(action),
                })
                .await
                .is_err()
            {
                tracing::debug!(query = label, "engine stopped before query completed");
            }
        });
    }

    fn publish_snapshot(&self) {
        self.snapshots.send_replace(Arc::new(AppSnapshot {
            rev: self.rev,
            state: self.store.state().clone(),
        }));
    }
}
