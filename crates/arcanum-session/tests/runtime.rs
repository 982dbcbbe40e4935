//! The tokio runtime driving real narrators and stores on a paused clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use arcanum_core::{ReadingLog, SoulProfile, SpreadKind, UserProfile};
use async_trait::async_trait;
use arcanum_session::{
    Action, ChunkSink, Effect, MemoryStore, Narrator, NarratorError, NarratorResult,
    ProfileStore, ReadingOutcome, ReadingRequest, ReadingStatus, SessionConfig, SessionRuntime,
    SessionState, StoreResult, TemplateNarrator,
};
use tokio::time::Instant;

/// Sends fixed chunks, each after its own delay, then succeeds or fails.
struct ScriptedNarrator {
    chunks: Vec<(u64, &'static str)>,
    failure: Option<&'static str>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedNarrator {
    fn new(chunks: Vec<(u64, &'static str)>) -> Self {
        Self {
            chunks,
            failure: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing(mut self, message: &'static str) -> Self {
        self.failure = Some(message);
        self
    }

    fn contexts(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Narrator for ScriptedNarrator {
    async fn stream_reading(
        &self,
        request: &ReadingRequest,
        sink: &ChunkSink,
    ) -> NarratorResult<()> {
        self.seen.lock().unwrap().push(request.querent_context());
        for (delay_ms, text) in &self.chunks {
            tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
            sink.send(*text);
        }
        match self.failure {
            Some(message) => Err(NarratorError::Request(message.into())),
            None => Ok(()),
        }
    }
}

/// Sends one chunk, then dies mid-stream.
struct PanickingNarrator;

#[async_trait]
impl Narrator for PanickingNarrator {
    async fn stream_reading(&self, _: &ReadingRequest, sink: &ChunkSink) -> NarratorResult<()> {
        sink.send("Partial ");
        tokio::time::sleep(Duration::from_millis(500)).await;
        panic!("narrator crashed");
    }
}

/// Profiles load normally, history writes never finish.
struct StalledHistoryStore(MemoryStore);

#[async_trait]
impl ProfileStore for StalledHistoryStore {
    async fn load_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        self.0.load_profile(user_id).await
    }

    async fn save_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        self.0.save_profile(profile).await
    }

    async fn append_history(&self, _: &str, _: &ReadingLog) -> StoreResult<()> {
        std::future::pending().await
    }

    async fn load_history(&self, user_id: &str, limit: usize) -> StoreResult<Vec<ReadingLog>> {
        self.0.load_history(user_id, limit).await
    }
}

fn runtime(narrator: Arc<dyn Narrator>, store: Arc<MemoryStore>) -> SessionRuntime {
    SessionRuntime::new(SessionConfig::default(), narrator, store)
}

async fn draw_all(rt: &mut SessionRuntime, question: &str, spread: SpreadKind) -> Vec<Effect> {
    rt.dispatch(Action::StartSelection).await;
    rt.dispatch(Action::SubmitQuestionAndSpread {
        question: question.into(),
        spread,
    })
    .await;
    rt.settle().await;
    assert_eq!(rt.session().state(), SessionState::Drawing);

    for _ in 0..spread.definition().card_count() {
        rt.dispatch(Action::DrawNextCard).await;
    }
    rt.settle().await
}

#[tokio::test(start_paused = true)]
async fn template_reading_completes_and_is_recorded() {
    let store = Arc::new(MemoryStore::new());
    store
        .save_profile(&UserProfile::new("ana", "Ana"))
        .await
        .unwrap();
    let mut rt = runtime(Arc::new(TemplateNarrator::new()), Arc::clone(&store)).with_user("ana");

    let effects = draw_all(&mut rt, "Where is my work leading?", SpreadKind::ThreeCard).await;

    let session = rt.session();
    assert_eq!(session.state(), SessionState::Reading);
    assert_eq!(session.reading_status(), &ReadingStatus::Complete);
    assert!(session.reading().contains("Ana"));
    assert!(effects.contains(&Effect::ReadingFinished(ReadingOutcome::Complete)));
    assert!(!rt.is_busy());

    let history = store.load_history("ana", 5).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].question, "Where is my work leading?");
    assert_eq!(history[0].spread_name, "Past, Present, Future");
    assert_eq!(history[0].cards.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn chunks_with_gaps_concatenate() {
    let narrator = Arc::new(ScriptedNarrator::new(vec![(10, "Hello, "), (750, "seeker.")]));
    let mut rt = runtime(narrator, Arc::new(MemoryStore::new()));

    draw_all(&mut rt, "Will I find clarity?", SpreadKind::Single).await;

    assert_eq!(rt.session().reading(), "Hello, seeker.");
    assert_eq!(rt.session().reading_status(), &ReadingStatus::Complete);
}

#[tokio::test(start_paused = true)]
async fn immediate_failure_keeps_reading_state() {
    let narrator = Arc::new(ScriptedNarrator::new(Vec::new()).failing("quota exceeded"));
    let store = Arc::new(MemoryStore::new());
    let mut rt = runtime(narrator, Arc::clone(&store)).with_user("ana");

    let effects = draw_all(&mut rt, "Will I find clarity?", SpreadKind::Single).await;

    assert_eq!(rt.session().reading(), "");
    assert_eq!(rt.session().state(), SessionState::Reading);
    assert!(matches!(
        rt.session().reading_status(),
        ReadingStatus::Failed(message) if message.contains("quota exceeded")
    ));
    assert!(
        !effects
            .iter()
            .any(|e| matches!(e, Effect::RecordHistory(_)))
    );
    assert_eq!(store.history_len("ana"), 0);

    rt.dispatch(Action::Reset).await;
    assert_eq!(rt.session().state(), SessionState::Intro);
}

#[tokio::test(start_paused = true)]
async fn partial_failure_appends_notice() {
    let narrator =
        Arc::new(ScriptedNarrator::new(vec![(0, "The Moon rises")]).failing("connection reset"));
    let mut rt = runtime(narrator, Arc::new(MemoryStore::new()));

    draw_all(&mut rt, "Is this real?", SpreadKind::Single).await;

    let reading = rt.session().reading();
    assert!(reading.starts_with("The Moon rises"));
    assert!(reading.ends_with(arcanum_session::reading::FAILURE_NOTICE));
}

#[tokio::test(start_paused = true)]
async fn chunk_queued_before_reset_is_dropped() {
    let narrator = Arc::new(ScriptedNarrator::new(vec![(0, "The Tower "), (40, "falls.")]));
    let mut rt = runtime(narrator, Arc::new(MemoryStore::new()));

    rt.dispatch(Action::StartSelection).await;
    rt.dispatch(Action::SubmitQuestionAndSpread {
        question: "What breaks?".into(),
        spread: SpreadKind::Single,
    })
    .await;
    rt.settle().await;
    rt.dispatch(Action::DrawNextCard).await;

    // Run until the first chunk lands.
    while rt.session().reading().is_empty() {
        rt.next_effects().await.expect("generation should still be running");
    }
    assert_eq!(rt.session().reading(), "The Tower ");

    // Let the narrator push its second chunk and its completion into the
    // channel, then reset before the runtime reads them.
    tokio::time::sleep(Duration::from_millis(100)).await;
    rt.dispatch(Action::Reset).await;
    rt.settle().await;

    assert_eq!(rt.session().state(), SessionState::Intro);
    assert_eq!(rt.session().reading(), "");
    assert_eq!(rt.session().reading_status(), &ReadingStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn reset_mid_shuffle_leaves_runtime_idle() {
    let mut rt = runtime(Arc::new(TemplateNarrator::new()), Arc::new(MemoryStore::new()));
    rt.dispatch(Action::StartSelection).await;
    rt.dispatch(Action::SubmitQuestionAndSpread {
        question: "Now?".into(),
        spread: SpreadKind::Single,
    })
    .await;
    assert!(rt.is_busy());

    rt.dispatch(Action::Reset).await;
    assert!(!rt.is_busy());
    assert!(rt.next_effects().await.is_none());
    assert_eq!(rt.session().state(), SessionState::Intro);
}

#[tokio::test(start_paused = true)]
async fn narrator_sees_profile_and_recent_history() {
    let store = Arc::new(MemoryStore::new());
    let mut profile = UserProfile::new("ana", "Ana");
    profile.soul_profile = Some(SoulProfile {
        current_goal: "finish the novel".into(),
        ..SoulProfile::default()
    });
    store.save_profile(&profile).await.unwrap();

    let narrator = Arc::new(ScriptedNarrator::new(vec![(0, "First reading.")]));
    let mut rt = runtime(narrator.clone(), Arc::clone(&store)).with_user("ana");

    draw_all(&mut rt, "Will I finish?", SpreadKind::Single).await;
    rt.dispatch(Action::Reset).await;
    draw_all(&mut rt, "And then?", SpreadKind::Single).await;

    let contexts = narrator.contexts();
    assert_eq!(contexts.len(), 2);
    assert!(contexts[0].contains("Ana"));
    assert!(contexts[0].contains("finish the novel"));
    assert!(contexts[1].contains("Will I finish?"));
    assert_eq!(store.history_len("ana"), 2);
}

#[tokio::test(start_paused = true)]
async fn anonymous_runtime_records_nothing() {
    let store = Arc::new(MemoryStore::new());
    let narrator = Arc::new(ScriptedNarrator::new(vec![(0, "Hello.")]));
    let mut rt = runtime(narrator.clone(), Arc::clone(&store));

    draw_all(&mut rt, "Anyone there?", SpreadKind::Single).await;

    assert_eq!(rt.session().reading_status(), &ReadingStatus::Complete);
    assert!(narrator.contexts()[0].contains("Anonymous Traveler"));
    assert_eq!(store.history_len(""), 0);
}

#[tokio::test(start_paused = true)]
async fn generation_dying_mid_stream_fails_the_reading() {
    let mut rt = runtime(Arc::new(PanickingNarrator), Arc::new(MemoryStore::new()));

    let effects = tokio::time::timeout(
        Duration::from_secs(60),
        draw_all(&mut rt, "Will it hold?", SpreadKind::Single),
    )
    .await
    .expect("runtime should notice the dead generation");

    let session = rt.session();
    assert_eq!(session.state(), SessionState::Reading);
    assert!(matches!(
        session.reading_status(),
        ReadingStatus::Failed(message) if message.contains("ended unexpectedly")
    ));
    assert!(session.reading().starts_with("Partial "));
    assert!(
        session
            .reading()
            .ends_with(arcanum_session::reading::FAILURE_NOTICE)
    );
    assert!(
        effects
            .iter()
            .any(|e| matches!(e, Effect::ReadingFinished(ReadingOutcome::Failed(_))))
    );
    assert!(!rt.is_busy());
}

#[tokio::test(start_paused = true)]
async fn slow_history_write_does_not_stall_events() {
    let store = Arc::new(StalledHistoryStore(MemoryStore::new()));
    let config = SessionConfig::default()
        .instant()
        .with_store_timeout(Duration::from_secs(3));
    let narrator = Arc::new(ScriptedNarrator::new(vec![(0, "Done.")]));
    let mut rt = SessionRuntime::new(config, narrator, store).with_user("ana");

    rt.dispatch(Action::StartSelection).await;
    rt.dispatch(Action::SubmitQuestionAndSpread {
        question: "How long?".into(),
        spread: SpreadKind::Single,
    })
    .await;
    rt.dispatch(Action::DrawNextCard).await;

    let start = Instant::now();
    while rt.session().reading_status() != &ReadingStatus::Complete {
        rt.next_effects().await.expect("reading should still be running");
    }
    assert!(start.elapsed() < Duration::from_secs(3));

    // The write is still pending, yet the next action is handled at once.
    assert!(rt.is_busy());
    rt.dispatch(Action::Reset).await;
    assert_eq!(rt.session().state(), SessionState::Intro);
    assert!(start.elapsed() < Duration::from_secs(3));

    // The write gives up at the store timeout and the runtime goes idle.
    rt.settle().await;
    assert!(!rt.is_busy());
    assert!(start.elapsed() >= Duration::from_secs(3));
}
