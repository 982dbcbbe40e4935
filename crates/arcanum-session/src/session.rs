//! The reading session state machine.
//!
//! `Session` owns everything one reading mutates: the draft question, the
//! shuffled deck stack, the cards dealt so far, and the interpretation text.
//! All mutation goes through [`Session::handle`], one event at a time, so a
//! session needs no locking as long as a single task drives it.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use arcanum_core::{DrawnCard, ReadingLog, SpreadDefinition, SpreadKind, deck, shuffle_deck};

use crate::config::SessionConfig;
use crate::effect::{Effect, ReadingOrder, ReadingOutcome, Rejection};
use crate::event::{Action, SessionEvent, Timer};
use crate::reading::{FAILURE_NOTICE, SUMMARY_MAX_CHARS, summarize_reading};
use crate::state::{ReadingStatus, SessionState};

/// One querent's reading, from intro to interpretation.
pub struct Session {
    config: SessionConfig,
    rng: StdRng,
    state: SessionState,
    question: String,
    spread: SpreadKind,
    deck_stack: VecDeque<DrawnCard>,
    drawn: Vec<DrawnCard>,
    shuffled_len: usize,
    reading: String,
    reading_status: ReadingStatus,
    cards_revealed: bool,
    epoch: u64,
}

impl Session {
    /// Create a session in the Intro state.
    pub fn new(config: SessionConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            state: SessionState::Intro,
            question: String::new(),
            spread: SpreadKind::default(),
            deck_stack: VecDeque::new(),
            drawn: Vec::new(),
            shuffled_len: 0,
            reading: String::new(),
            reading_status: ReadingStatus::Idle,
            cards_revealed: false,
            epoch: 0,
        }
    }

    /// The configuration this session was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The question, as drafted or submitted.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// The selected spread.
    pub fn spread(&self) -> &'static SpreadDefinition {
        self.spread.definition()
    }

    /// Undrawn cards, head first.
    pub fn deck_stack(&self) -> &VecDeque<DrawnCard> {
        &self.deck_stack
    }

    /// Cards dealt so far; index `i` fills spread position `i`.
    pub fn drawn(&self) -> &[DrawnCard] {
        &self.drawn
    }

    /// Size of the deck when it was shuffled for this reading.
    pub fn shuffled_len(&self) -> usize {
        self.shuffled_len
    }

    /// Cards still to be dealt for the selected spread.
    pub fn remaining_draws(&self) -> usize {
        self.spread().card_count().saturating_sub(self.drawn.len())
    }

    /// Interpretation text received so far.
    pub fn reading(&self) -> &str {
        &self.reading
    }

    /// Progress of the interpretation.
    pub fn reading_status(&self) -> &ReadingStatus {
        &self.reading_status
    }

    /// Whether the dealt cards are face up.
    pub fn cards_revealed(&self) -> bool {
        self.cards_revealed
    }

    /// Current epoch; bumped on every submit and every reset.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Feed one event and return the resulting effects.
    ///
    /// Events that are invalid in the current state, or that carry a stale
    /// epoch, are ignored and return no effects.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        if let Some(epoch) = event.epoch()
            && epoch != self.epoch
        {
            debug!(epoch, current = self.epoch, ?event, "dropping stale event");
            return Vec::new();
        }

        match event {
            SessionEvent::Action(action) => self.handle_action(action),
            SessionEvent::TimerFired { timer, .. } => self.handle_timer(timer),
            SessionEvent::ReadingChunk { text, .. } => self.append_chunk(text),
            SessionEvent::ReadingCompleted { .. } => self.complete_reading(),
            SessionEvent::ReadingFailed { message, .. } => self.fail_reading(message),
        }
    }

    fn handle_action(&mut self, action: Action) -> Vec<Effect> {
        match (self.state, action) {
            (_, Action::Reset) => self.reset(),
            (SessionState::Intro, Action::StartSelection) => {
                vec![self.transition_to(SessionState::Selection)]
            }
            (SessionState::Selection, Action::EditQuestion(text)) => {
                self.question = text;
                Vec::new()
            }
            (SessionState::Selection, Action::SelectSpread(kind)) => {
                self.spread = kind;
                Vec::new()
            }
            (SessionState::Selection, Action::Submit) => {
                let question = std::mem::take(&mut self.question);
                self.submit(question, self.spread)
            }
            (SessionState::Selection, Action::SubmitQuestionAndSpread { question, spread }) => {
                self.submit(question, spread)
            }
            (SessionState::Drawing, Action::DrawNextCard) => self.draw_next(),
            (state, action) => {
                debug!(%state, ?action, "ignoring action");
                Vec::new()
            }
        }
    }

    fn handle_timer(&mut self, timer: Timer) -> Vec<Effect> {
        match (self.state, timer) {
            (SessionState::Shuffling, Timer::Shuffle) => {
                vec![self.transition_to(SessionState::Drawing)]
            }
            (SessionState::Drawing, Timer::FinishDraw) if self.remaining_draws() == 0 => {
                self.enter_revealing()
            }
            (SessionState::Revealing | SessionState::Reading, Timer::RevealFlip) => {
                if self.cards_revealed {
                    Vec::new()
                } else {
                    self.cards_revealed = true;
                    vec![Effect::CardsRevealed]
                }
            }
            (SessionState::Revealing, Timer::BeginReading) => self.enter_reading(),
            (state, timer) => {
                debug!(%state, ?timer, "ignoring timer");
                Vec::new()
            }
        }
    }

    fn submit(&mut self, question: String, spread: SpreadKind) -> Vec<Effect> {
        self.spread = spread;
        let trimmed = question.trim();
        if trimmed.is_empty() {
            self.question = question;
            debug!("refusing blank question");
            return vec![Effect::Rejected(Rejection::BlankQuestion)];
        }
        self.question = trimmed.to_string();

        self.epoch += 1;
        self.drawn.clear();
        self.deck_stack = shuffle_deck(deck(), self.config.reversal_chance, &mut self.rng).into();
        self.shuffled_len = self.deck_stack.len();

        vec![
            self.transition_to(SessionState::Shuffling),
            self.schedule(Timer::Shuffle),
        ]
    }

    fn draw_next(&mut self) -> Vec<Effect> {
        let required = self.spread().card_count();
        if self.drawn.len() >= required {
            debug!("spread already full, ignoring draw");
            return Vec::new();
        }
        let Some(card) = self.deck_stack.pop_front() else {
            debug!("deck exhausted, ignoring draw");
            return Vec::new();
        };

        let index = self.drawn.len();
        self.drawn.push(card);
        debug!(index, card = %card, "card drawn");

        let mut effects = vec![Effect::CardDrawn {
            index,
            card,
            position: self.spread().positions[index],
        }];
        if self.drawn.len() == required {
            effects.push(self.schedule(Timer::FinishDraw));
        }
        effects
    }

    fn enter_revealing(&mut self) -> Vec<Effect> {
        vec![
            self.transition_to(SessionState::Revealing),
            self.schedule(Timer::RevealFlip),
            self.schedule(Timer::BeginReading),
        ]
    }

    fn enter_reading(&mut self) -> Vec<Effect> {
        let mut effects = vec![self.transition_to(SessionState::Reading)];
        if !self.cards_revealed {
            self.cards_revealed = true;
            effects.push(Effect::CardsRevealed);
        }
        self.reading.clear();
        self.reading_status = ReadingStatus::Streaming;
        effects.push(Effect::BeginReading(ReadingOrder {
            epoch: self.epoch,
            question: self.question.clone(),
            spread: self.spread,
            cards: self.drawn.clone(),
        }));
        effects
    }

    fn append_chunk(&mut self, text: String) -> Vec<Effect> {
        if !self.is_streaming() || text.is_empty() {
            return Vec::new();
        }
        self.reading.push_str(&text);
        vec![Effect::ReadingUpdated { appended: text }]
    }

    fn complete_reading(&mut self) -> Vec<Effect> {
        if !self.is_streaming() {
            return Vec::new();
        }
        self.reading_status = ReadingStatus::Complete;
        info!(epoch = self.epoch, chars = self.reading.len(), "reading complete");

        let mut effects = vec![Effect::ReadingFinished(ReadingOutcome::Complete)];
        if !self.reading.trim().is_empty() {
            let summary = summarize_reading(&self.reading, SUMMARY_MAX_CHARS);
            effects.push(Effect::RecordHistory(ReadingLog::new(
                self.question.clone(),
                self.spread(),
                &self.drawn,
                summary,
            )));
        }
        effects
    }

    fn fail_reading(&mut self, message: String) -> Vec<Effect> {
        if !self.is_streaming() {
            return Vec::new();
        }
        info!(epoch = self.epoch, %message, "reading failed");

        let mut effects = Vec::new();
        if !self.reading.is_empty() {
            self.reading.push_str(FAILURE_NOTICE);
            effects.push(Effect::ReadingUpdated {
                appended: FAILURE_NOTICE.to_string(),
            });
        }
        self.reading_status = ReadingStatus::Failed(message.clone());
        effects.push(Effect::ReadingFinished(ReadingOutcome::Failed(message)));
        effects
    }

    fn reset(&mut self) -> Vec<Effect> {
        let from = self.state;
        self.epoch += 1;
        self.question.clear();
        self.deck_stack.clear();
        self.drawn.clear();
        self.shuffled_len = 0;
        self.reading.clear();
        self.reading_status = ReadingStatus::Idle;
        self.cards_revealed = false;
        self.state = SessionState::Intro;
        info!(%from, epoch = self.epoch, "session reset");

        let mut effects = vec![Effect::CancelTimers];
        if from != SessionState::Intro {
            effects.push(Effect::StateChanged {
                from,
                to: SessionState::Intro,
            });
        }
        effects
    }

    fn is_streaming(&self) -> bool {
        self.state == SessionState::Reading && self.reading_status == ReadingStatus::Streaming
    }

    fn transition_to(&mut self, to: SessionState) -> Effect {
        let from = self.state;
        self.state = to;
        info!(%from, %to, epoch = self.epoch, "session state changed");
        Effect::StateChanged { from, to }
    }

    fn schedule(&self, timer: Timer) -> Effect {
        let delay = match timer {
            Timer::Shuffle => self.config.shuffle_delay,
            Timer::FinishDraw => self.config.final_draw_delay,
            Timer::RevealFlip => self.config.reveal_flip_delay,
            Timer::BeginReading => self.config.reading_delay,
        };
        Effect::ScheduleTimer {
            timer,
            delay,
            epoch: self.epoch,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
