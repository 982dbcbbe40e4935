//! Interactive reading session for Arcanum.
//!
//! A [`Session`] is a pure state machine: it consumes [`SessionEvent`]s
//! (caller actions, timer firings, streamed reading chunks) and returns
//! [`Effect`]s describing what changed and what the host should do next.
//! Every timer and every generation callback is tagged with the session
//! epoch it was launched under, so work that outlives a reset is dropped
//! instead of leaking into the next reading.
//!
//! [`SessionRuntime`] is the tokio host for that machine: it runs the
//! [`TimerQueue`], loads personalization from a [`ProfileStore`], and
//! streams the interpretation from a [`Narrator`].

pub mod config;
pub mod effect;
pub mod error;
pub mod event;
pub mod narrator;
pub mod reading;
pub mod runtime;
pub mod session;
pub mod state;
pub mod store;
pub mod timer;

pub use config::SessionConfig;
pub use effect::{Effect, ReadingOrder, ReadingOutcome, Rejection};
pub use error::{NarratorError, NarratorResult, StoreError, StoreResult};
pub use event::{Action, SessionEvent, Timer};
pub use narrator::{ChunkSink, Narrator, ReadingRequest, TemplateNarrator};
pub use runtime::SessionRuntime;
pub use session::Session;
pub use state::{ReadingStatus, SessionState};
pub use store::{JsonFileStore, MemoryStore, ProfileStore};
pub use timer::TimerQueue;
