use std::io::{self, BufRead, StdinLock, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use colored::Colorize;
use tokio::runtime::Runtime;
use tracing::warn;

use arcanum_core::{DEFAULT_REVERSAL_CHANCE, DrawnCard, SpreadKind};
use arcanum_gemini::{DEFAULT_MODEL, GeminiNarrator};
use arcanum_session::{
    Action, Effect, Narrator, ProfileStore, ReadingOutcome, Rejection, Session, SessionConfig,
    SessionRuntime, SessionState, TemplateNarrator,
};

use crate::StoreArgs;

#[derive(Args)]
pub struct ReadArgs {
    /// Spread id or name (single, three-card, celtic-cross, decision)
    #[arg(short, long)]
    spread: Option<String>,

    /// The question to ask the cards
    #[arg(short, long)]
    question: Option<String>,

    /// RNG seed for a reproducible shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Probability that a card is dealt reversed
    #[arg(long, default_value_t = DEFAULT_REVERSAL_CHANCE)]
    reversal_chance: f64,

    /// Use the built-in narrator instead of Gemini
    #[arg(long)]
    offline: bool,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Skip the shuffle and reveal pauses
    #[arg(long)]
    fast: bool,

    /// Read without your profile and leave no history
    #[arg(long)]
    incognito: bool,

    #[command(flatten)]
    store: StoreArgs,
}

pub fn run(args: ReadArgs) -> Result<(), String> {
    let spread = args
        .spread
        .as_deref()
        .map(str::parse::<SpreadKind>)
        .transpose()
        .map_err(|e| e.to_string())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start async runtime: {e}"))?;

    let mut config = SessionConfig::default()
        .with_seed(args.seed.unwrap_or_else(rand::random))
        .with_reversal_chance(args.reversal_chance);
    if args.fast {
        config = config.instant();
    }

    let store: Arc<dyn ProfileStore> = Arc::new(super::open_store(&args.store));
    let mut session = SessionRuntime::new(config, narrator(&args), store);
    if !args.incognito {
        session = session.with_user(args.store.user.clone());
    }

    Repl {
        runtime,
        session,
        input: io::stdin().lock(),
        question: args.question,
        spread,
    }
    .run()
}

fn narrator(args: &ReadArgs) -> Arc<dyn Narrator> {
    let pause = if args.fast {
        Duration::ZERO
    } else {
        Duration::from_millis(120)
    };
    let offline = Arc::new(TemplateNarrator::new().with_chunk_delay(pause));
    if args.offline {
        return offline;
    }

    match args.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Arc::new(GeminiNarrator::new(key).with_model(&args.model)),
        _ => {
            warn!("GEMINI_API_KEY is not set, falling back to the offline narrator");
            println!(
                "  {}",
                "No Gemini API key found; the built-in oracle will read for you.".dimmed()
            );
            offline
        }
    }
}

struct Repl {
    runtime: Runtime,
    session: SessionRuntime,
    input: StdinLock<'static>,
    question: Option<String>,
    spread: Option<SpreadKind>,
}

impl Repl {
    fn run(&mut self) -> Result<(), String> {
        println!("  {}", "Arcanum".bold());
        println!("  {}", "Still your mind and focus on your question.".dimmed());

        loop {
            self.dispatch(Action::StartSelection)?;

            let question = match self.question.take() {
                Some(question) => question,
                None => match self.ask_question()? {
                    Some(question) => question,
                    None => return Ok(()),
                },
            };
            let spread = match self.spread {
                Some(spread) => spread,
                None => self.ask_spread()?,
            };

            let effects = self.dispatch(Action::SubmitQuestionAndSpread { question, spread })?;
            if effects.contains(&Effect::Rejected(Rejection::BlankQuestion)) {
                continue;
            }
            self.pump()?;

            while self.session.session().state() == SessionState::Drawing
                && self.session.session().remaining_draws() > 0
            {
                let session = self.session.session();
                let next = session.drawn().len();
                let position = session.spread().positions[next].name;
                prompt(&format!(
                    "  Press Enter to draw card {} of {} ({position})",
                    next + 1,
                    session.spread().card_count()
                ))?;
                if self.read_line()?.is_none() {
                    println!();
                    return Ok(());
                }
                self.dispatch(Action::DrawNextCard)?;
            }
            self.pump()?;

            prompt("\n  Ask again? [y/N] ")?;
            match self.read_line()? {
                Some(answer) if is_yes(&answer) => {
                    self.dispatch(Action::Reset)?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn dispatch(&mut self, action: Action) -> Result<Vec<Effect>, String> {
        let effects = self.runtime.block_on(self.session.dispatch(action));
        for effect in &effects {
            render(effect, self.session.session())?;
        }
        Ok(effects)
    }

    /// Drive timers and the narrator until the session is idle.
    fn pump(&mut self) -> Result<(), String> {
        while let Some(effects) = self.runtime.block_on(self.session.next_effects()) {
            for effect in &effects {
                render(effect, self.session.session())?;
            }
        }
        Ok(())
    }

    fn ask_question(&mut self) -> Result<Option<String>, String> {
        loop {
            prompt("\n  What do you ask of the cards? ")?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            let question = line.trim();
            if !question.is_empty() {
                return Ok(Some(question.to_string()));
            }
            println!("  {}", "The cards need a question.".yellow());
        }
    }

    fn ask_spread(&mut self) -> Result<SpreadKind, String> {
        println!();
        for (i, kind) in SpreadKind::ALL.iter().enumerate() {
            let spread = kind.definition();
            println!(
                "  {}. {} {}",
                i + 1,
                kind.label(),
                format!("({} cards)", spread.card_count()).dimmed()
            );
        }
        loop {
            prompt("  Choose a spread [1]: ")?;
            let Some(line) = self.read_line()? else {
                return Ok(SpreadKind::default());
            };
            match parse_spread_choice(&line) {
                Some(kind) => return Ok(kind),
                None => println!("  {}", format!("unknown spread: {}", line.trim()).yellow()),
            }
        }
    }

    /// One line of input, or `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>, String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(line)),
            Err(e) => Err(e.to_string()),
        }
    }
}

fn prompt(text: &str) -> Result<(), String> {
    print!("{text}");
    io::stdout().flush().map_err(|e| e.to_string())
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "again")
}

/// A menu number (1-based), a spread id, or a spread name. Blank picks the
/// default spread.
fn parse_spread_choice(input: &str) -> Option<SpreadKind> {
    let input = input.trim();
    if input.is_empty() {
        return Some(SpreadKind::default());
    }
    if let Ok(n) = input.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| SpreadKind::ALL.get(i))
            .copied();
    }
    input.parse().ok()
}

fn render(effect: &Effect, session: &Session) -> Result<(), String> {
    match effect {
        Effect::StateChanged { to, .. } => match to {
            SessionState::Shuffling => {
                println!("\n  {}", "The deck is shuffled...".dimmed());
            }
            SessionState::Drawing => {
                let n = session.remaining_draws();
                println!(
                    "  The cards are ready. Draw {n} card{}.",
                    if n == 1 { "" } else { "s" }
                );
            }
            SessionState::Revealing => println!("\n  {}", "The cards turn over...".dimmed()),
            SessionState::Reading => println!("\n  {}\n", "~ The Reading ~".bold()),
            SessionState::Intro | SessionState::Selection => {}
        },
        Effect::Rejected(Rejection::BlankQuestion) => {
            println!("  {}", "The cards need a question.".yellow());
        }
        Effect::CardDrawn {
            index, position, ..
        } => {
            println!("  {} {}", format!("[{}]", index + 1).dimmed(), position.name);
        }
        Effect::CardsRevealed => {
            for (position, card) in session.spread().positions.iter().zip(session.drawn()) {
                println!("  {:<24} {}", position.name, styled_card(card));
            }
        }
        Effect::ReadingUpdated { appended } => {
            print!("{appended}");
            io::stdout().flush().map_err(|e| e.to_string())?;
        }
        Effect::ReadingFinished(outcome) => {
            println!();
            if let ReadingOutcome::Failed(message) = outcome
                && session.reading().is_empty()
            {
                println!(
                    "  {}",
                    format!("The spirits are clouded... ({message})").yellow()
                );
            }
        }
        Effect::ScheduleTimer { .. }
        | Effect::CancelTimers
        | Effect::BeginReading(_)
        | Effect::RecordHistory(_) => {}
    }
    Ok(())
}

fn styled_card(card: &DrawnCard) -> String {
    if card.reversed {
        format!("{} {}", card.name().bold(), "(reversed)".red())
    } else {
        card.name().bold().to_string()
    }
}
