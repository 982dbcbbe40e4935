//! Offline narrator that composes a reading from card keywords.

use std::time::Duration;

use async_trait::async_trait;

use arcanum_core::{Suit, Verbosity};

use super::{ChunkSink, Narrator, ReadingRequest};
use crate::error::NarratorResult;

/// Writes a markdown reading (overview, one section per card, synthesis)
/// without calling any service. Each section is sent as its own chunk.
#[derive(Debug, Clone, Default)]
pub struct TemplateNarrator {
    chunk_delay: Duration,
}

impl TemplateNarrator {
    /// A narrator that emits all sections back to back.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause between sections, for a streaming feel.
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// The reading for `request`, split into the chunks that will be sent.
    pub fn compose(&self, request: &ReadingRequest) -> Vec<String> {
        let concise = request
            .personalization
            .profile
            .as_ref()
            .and_then(|p| p.preferences)
            .is_some_and(|prefs| prefs.verbosity == Verbosity::Concise);

        let mut sections = vec![overview(request)];
        for (position, card) in request.placements() {
            let mut section = format!(
                "### {} ({})\n\n**{}**: {}.",
                card.name(),
                position.name,
                card.orientation(),
                card.card.keywords
            );
            if !concise {
                let place = position.description.trim_end_matches('.').to_lowercase();
                if card.reversed {
                    section.push_str(&format!(
                        " Reversed here, in the place of {place}, this energy turns inward: \
                         it is delayed, blocked, or asking to be met from within."
                    ));
                } else {
                    section.push_str(&format!(
                        " In the place of {place}, it asks you to carry this openly."
                    ));
                }
            }
            section.push_str("\n\n");
            sections.push(section);
        }
        sections.push(synthesis(request));
        sections
    }
}

#[async_trait]
impl Narrator for TemplateNarrator {
    async fn stream_reading(
        &self,
        request: &ReadingRequest,
        sink: &ChunkSink,
    ) -> NarratorResult<()> {
        for (i, section) in self.compose(request).into_iter().enumerate() {
            if i > 0 && !self.chunk_delay.is_zero() {
                tokio::time::sleep(self.chunk_delay).await;
            }
            if !sink.send(section) {
                break;
            }
        }
        Ok(())
    }
}

fn overview(request: &ReadingRequest) -> String {
    let reversed = request.cards.iter().filter(|c| c.reversed).count();
    let tone = match reversed {
        0 => "The cards lie open and unguarded",
        n if n * 2 > request.cards.len() => "Much of this spread is turned inward",
        _ => "Light and shadow share this spread",
    };

    let opening = match request.querent_name() {
        Some(name) => format!("{name}, {}{}", tone[..1].to_lowercase(), &tone[1..]),
        None => tone.to_string(),
    };

    // Ties go to the major arcana, then to the later suit.
    let dominant = Suit::MINOR
        .into_iter()
        .chain([Suit::Major])
        .map(|suit| {
            let n = request.cards.iter().filter(|c| c.card.suit == suit).count();
            (suit, n)
        })
        .filter(|(_, n)| *n > 1)
        .max_by_key(|(_, n)| *n)
        .map(|(suit, _)| suit);
    let focus = match dominant {
        Some(Suit::Major) => "The major arcana gather here; this question touches something larger than the day-to-day.".to_string(),
        Some(suit) => format!("The suit of {suit} returns again and again, pointing at {}.", suit_theme(suit)),
        None => "Each card comes from a different current, so read them as voices in conversation.".to_string(),
    };

    format!("## The Overview\n\n{opening}. {focus}\n\n")
}

fn synthesis(request: &ReadingRequest) -> String {
    let mut out = format!(
        "## The Synthesis\n\nYou asked: *{}* The answer is not a verdict but a direction.",
        request.question
    );
    if let Some(goal) = request
        .personalization
        .profile
        .as_ref()
        .and_then(|p| p.soul_profile.as_ref())
        .map(|s| s.current_goal.trim())
        .filter(|g| !g.is_empty())
    {
        out.push_str(&format!(
            " Hold these cards against your goal, {goal}, and notice which one you resist."
        ));
    }
    if let Some((position, card)) = request.placements().last() {
        out.push_str(&format!(
            " Let {} in {} be the note you carry forward.",
            card.name(),
            position.name
        ));
    }
    out.push('\n');
    out
}

fn suit_theme(suit: Suit) -> &'static str {
    match suit {
        Suit::Wands => "your drive and what sets you alight",
        Suit::Cups => "your feelings and the bonds around you",
        Suit::Swords => "your thoughts and the conflicts they stir",
        Suit::Pentacles => "work, money and the body",
        Suit::Major => "the larger arc of your life",
    }
}

#[cfg(test)]
mod tests {
    use arcanum_core::{
        AiPreferences, DrawnCard, PersonalizationSnapshot, SoulProfile, SpreadKind, UserProfile,
        deck,
    };

    use super::*;
    use crate::effect::ReadingOrder;
    use crate::event::SessionEvent;

    fn drawn(id: &str, reversed: bool) -> DrawnCard {
        DrawnCard {
            card: deck().get(id).unwrap(),
            reversed,
        }
    }

    fn request(cards: Vec<DrawnCard>, personalization: PersonalizationSnapshot) -> ReadingRequest {
        let spread = match cards.len() {
            1 => SpreadKind::Single,
            _ => SpreadKind::ThreeCard,
        };
        ReadingRequest::from_order(
            ReadingOrder {
                epoch: 1,
                question: "What should I focus on?".into(),
                spread,
                cards,
            },
            personalization,
        )
    }

    #[test]
    fn one_section_per_card_plus_frame() {
        let req = request(
            vec![
                drawn("major-0", false),
                drawn("cups-2", true),
                drawn("major-19", false),
            ],
            PersonalizationSnapshot::anonymous(),
        );
        let sections = TemplateNarrator::new().compose(&req);
        assert_eq!(sections.len(), 5);
        assert!(sections[0].starts_with("## The Overview"));
        assert!(sections[0].contains("major arcana gather"));
        assert!(sections[1].starts_with("### The Fool (Past)"));
        assert!(sections[2].contains("**Reversed**"));
        assert!(sections[4].contains("What should I focus on?"));
        assert!(sections[4].contains("The Sun in Future"));
    }

    #[test]
    fn addresses_querent_and_goal() {
        let mut profile = UserProfile::new("u1", "Ana");
        profile.soul_profile = Some(SoulProfile {
            current_goal: "finishing my thesis".into(),
            ..SoulProfile::default()
        });
        let req = request(
            vec![drawn("swords-3", false)],
            PersonalizationSnapshot {
                profile: Some(profile),
                history: Vec::new(),
            },
        );
        let sections = TemplateNarrator::new().compose(&req);
        assert!(sections[0].contains("Ana, "));
        assert!(sections.last().unwrap().contains("finishing my thesis"));
    }

    #[test]
    fn concise_preference_shortens_cards() {
        let mut profile = UserProfile::new("u1", "Ana");
        profile.preferences = Some(AiPreferences {
            verbosity: Verbosity::Concise,
            ..AiPreferences::default()
        });
        let req = request(
            vec![drawn("wands-0", false)],
            PersonalizationSnapshot {
                profile: Some(profile),
                history: Vec::new(),
            },
        );
        let sections = TemplateNarrator::new().compose(&req);
        assert_eq!(
            sections[1],
            "### Ace of Wands (The Answer)\n\n**Upright**: a seed of drive and creative fire.\n\n"
        );
    }

    #[tokio::test]
    async fn streams_sections_in_order() {
        let req = request(vec![drawn("major-13", true)], PersonalizationSnapshot::anonymous());
        let narrator = TemplateNarrator::new();
        let (sink, mut rx) = ChunkSink::channel(1);
        narrator.stream_reading(&req, &sink).await.unwrap();
        drop(sink);

        let mut text = String::new();
        while let Some(event) = rx.recv().await {
            if let SessionEvent::ReadingChunk { text: chunk, .. } = event {
                text.push_str(&chunk);
            }
        }
        assert_eq!(text, narrator.compose(&req).concat());
    }
}
