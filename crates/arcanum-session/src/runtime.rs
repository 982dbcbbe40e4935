//! Tokio host for a [`Session`].
//!
//! The runtime turns the session's effects into real work: timers become
//! `tokio::time` deadlines, a reading order becomes a spawned generation
//! task, and a finished reading is appended to the store off the control
//! loop. Events flow back
//! through one unbounded channel, so the session itself stays a plain
//! single-owner state machine.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use arcanum_core::ReadingLog;

use crate::config::SessionConfig;
use crate::effect::{Effect, ReadingOrder};
use crate::event::{Action, SessionEvent};
use crate::narrator::{ChunkSink, Narrator, ReadingRequest};
use crate::session::Session;
use crate::store::{ProfileStore, bounded, load_snapshot};
use crate::timer::TimerQueue;

struct Generation {
    epoch: u64,
    task: JoinHandle<()>,
}

enum Wake {
    Event(Option<SessionEvent>),
    Timer,
    GenerationEnded,
    Recorded,
}

/// Drives a [`Session`] against real time, a narrator, and a store.
pub struct SessionRuntime {
    session: Session,
    timers: TimerQueue,
    narrator: Arc<dyn Narrator>,
    store: Arc<dyn ProfileStore>,
    user_id: Option<String>,
    origin: Instant,
    tx: UnboundedSender<SessionEvent>,
    rx: UnboundedReceiver<SessionEvent>,
    generation: Option<Generation>,
    records: JoinSet<()>,
}

impl SessionRuntime {
    /// Create an anonymous runtime around a fresh session.
    pub fn new(
        config: SessionConfig,
        narrator: Arc<dyn Narrator>,
        store: Arc<dyn ProfileStore>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(config),
            timers: TimerQueue::new(),
            narrator,
            store,
            user_id: None,
            origin: Instant::now(),
            tx,
            rx,
            generation: None,
            records: JoinSet::new(),
        }
    }

    /// Personalize readings for `user_id` and record their history.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// The driven session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The personalized user, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Whether timers, a generation, or a history write are still outstanding.
    pub fn is_busy(&self) -> bool {
        !self.timers.is_empty() || self.generation.is_some() || !self.records.is_empty()
    }

    /// Feed a caller action and carry out its effects.
    pub async fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        self.apply(SessionEvent::Action(action)).await
    }

    /// Wait for the next timer or stream event and return its effects.
    ///
    /// Returns `None` once nothing is outstanding. Stale events still
    /// resolve, with an empty effect list.
    pub async fn next_effects(&mut self) -> Option<Vec<Effect>> {
        if let Some(effects) = self.ready().await {
            return Some(effects);
        }
        if !self.is_busy() {
            return None;
        }

        let deadline = self.timers.next_deadline();
        let at = self.origin + deadline.unwrap_or_default();
        let rx = &mut self.rx;
        let records = &mut self.records;
        let has_records = !records.is_empty();
        let generation = &mut self.generation;
        let ended = async move {
            match generation {
                Some(g) => {
                    let _ = (&mut g.task).await;
                }
                None => std::future::pending::<()>().await,
            }
        };
        let wake = tokio::select! {
            event = rx.recv() => Wake::Event(event),
            () = sleep_until(at), if deadline.is_some() => Wake::Timer,
            () = ended => Wake::GenerationEnded,
            Some(_) = records.join_next(), if has_records => Wake::Recorded,
        };

        let event = match wake {
            Wake::Event(Some(event)) => event,
            Wake::Event(None) => return None,
            Wake::Timer => self.timers.pop_due(self.elapsed())?,
            // The task's queued events, or its orphan failure, are now ready.
            Wake::GenerationEnded => return Some(self.ready().await.unwrap_or_default()),
            Wake::Recorded => return Some(Vec::new()),
        };
        Some(self.apply(event).await)
    }

    /// Handle whatever can be handled without waiting.
    ///
    /// Queued events go first, so a generation that reported before exiting
    /// is never mistaken for an orphan.
    async fn ready(&mut self) -> Option<Vec<Effect>> {
        let orphaned = self
            .generation
            .as_ref()
            .filter(|g| g.task.is_finished())
            .map(|g| g.epoch);
        if let Ok(event) = self.rx.try_recv() {
            return Some(self.apply(event).await);
        }
        if let Some(epoch) = orphaned {
            warn!(epoch, "generation ended without a result");
            self.generation = None;
            let event = SessionEvent::ReadingFailed {
                epoch,
                message: "generation ended unexpectedly".into(),
            };
            return Some(self.apply(event).await);
        }
        if let Some(event) = self.timers.pop_due(self.elapsed()) {
            return Some(self.apply(event).await);
        }
        None
    }

    /// Run until idle, returning every effect produced on the way.
    pub async fn settle(&mut self) -> Vec<Effect> {
        let mut all = Vec::new();
        while let Some(effects) = self.next_effects().await {
            all.extend(effects);
        }
        all
    }

    async fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        let finishes_current = event.ends_generation()
            && self
                .generation
                .as_ref()
                .is_some_and(|g| event.epoch() == Some(g.epoch));
        if finishes_current {
            self.generation = None;
        }

        let effects = self.session.handle(event);
        for effect in &effects {
            self.execute(effect).await;
        }
        effects
    }

    async fn execute(&mut self, effect: &Effect) {
        match effect {
            Effect::ScheduleTimer {
                timer,
                delay,
                epoch,
            } => {
                self.timers.schedule(self.elapsed(), *timer, *delay, *epoch);
            }
            Effect::CancelTimers => {
                self.timers.cancel_all();
                if let Some(generation) = self.generation.take() {
                    debug!(epoch = generation.epoch, "aborting stale generation");
                    generation.task.abort();
                }
            }
            Effect::BeginReading(order) => self.spawn_generation(order.clone()),
            Effect::RecordHistory(log) => self.record(log),
            _ => {}
        }
    }

    fn spawn_generation(&mut self, order: ReadingOrder) {
        let epoch = order.epoch;
        let narrator = Arc::clone(&self.narrator);
        let store = Arc::clone(&self.store);
        let user_id = self.user_id.clone();
        let history_limit = self.session.config().history_limit;
        let store_timeout = self.session.config().store_timeout;
        let sink = ChunkSink::new(epoch, self.tx.clone());
        let tx = self.tx.clone();

        info!(epoch, user = user_id.as_deref().unwrap_or("anonymous"), "starting generation");
        let task = tokio::spawn(async move {
            let snapshot =
                load_snapshot(store.as_ref(), user_id.as_deref(), history_limit, store_timeout)
                    .await;
            let request = ReadingRequest::from_order(order, snapshot);
            let event = match narrator.stream_reading(&request, &sink).await {
                Ok(()) => SessionEvent::ReadingCompleted { epoch },
                Err(e) => {
                    warn!(epoch, error = %e, "generation failed");
                    SessionEvent::ReadingFailed {
                        epoch,
                        message: e.to_string(),
                    }
                }
            };
            if tx.send(event).is_err() {
                debug!(epoch, "runtime gone before generation finished");
            }
        });

        if let Some(previous) = self.generation.replace(Generation { epoch, task }) {
            previous.task.abort();
        }
    }

    fn record(&mut self, log: &ReadingLog) {
        let Some(user_id) = self.user_id.clone() else {
            return;
        };
        let store = Arc::clone(&self.store);
        let timeout = self.session.config().store_timeout;
        let log = log.clone();
        self.records.spawn(async move {
            match bounded(timeout, store.append_history(&user_id, &log)).await {
                Ok(()) => debug!(user_id = %user_id, "reading recorded"),
                Err(e) => warn!(user_id = %user_id, error = %e, "could not record reading"),
            }
        });
    }

    fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.origin)
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        if let Some(generation) = self.generation.take() {
            generation.task.abort();
        }
    }
}
