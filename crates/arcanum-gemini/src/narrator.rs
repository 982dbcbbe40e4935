//! The Gemini streaming client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use arcanum_session::{ChunkSink, Narrator, NarratorError, NarratorResult, ReadingRequest};

use crate::prompt::{reading_prompt, system_instruction};
use crate::sse::{ErrorWrapper, SseDecoder, event_text};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Sampling temperature for readings.
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// A [`Narrator`] that streams readings from the Gemini API.
#[derive(Clone)]
pub struct GeminiNarrator {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    base_url: String,
}

impl std::fmt::Debug for GeminiNarrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiNarrator")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiNarrator {
    /// Create a narrator using [`DEFAULT_MODEL`].
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Use a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a different sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Point at a different API root, e.g. a proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// The configured model.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: &ReadingRequest) -> StreamRequest {
        let preferences = request
            .personalization
            .profile
            .as_ref()
            .and_then(|p| p.preferences.as_ref());
        StreamRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: reading_prompt(request),
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction(preferences),
                }],
            },
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl Narrator for GeminiNarrator {
    async fn stream_reading(
        &self,
        request: &ReadingRequest,
        sink: &ChunkSink,
    ) -> NarratorResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(NarratorError::MissingApiKey);
        }

        let url = format!(
            "{}/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        );
        debug!(epoch = request.epoch, model = %self.model, "requesting reading");

        let mut response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request(request))
            .send()
            .await
            .map_err(|e| NarratorError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(map_http_error(status, &body));
        }

        let mut decoder = SseDecoder::default();
        let mut received = false;
        loop {
            let bytes = response
                .chunk()
                .await
                .map_err(|e| NarratorError::Request(e.to_string()))?;
            let done = bytes.is_none();
            let payloads = match bytes {
                Some(bytes) => decoder.push(&bytes)?,
                None => decoder.finish()?.into_iter().collect(),
            };
            for payload in payloads {
                let text = event_text(&payload)?;
                if text.is_empty() {
                    continue;
                }
                received = true;
                if !sink.send(text) {
                    debug!(epoch = request.epoch, "reading abandoned by session");
                    return Ok(());
                }
            }
            if done {
                break;
            }
        }

        if received {
            Ok(())
        } else {
            warn!(epoch = request.epoch, "stream ended without text");
            Err(NarratorError::Empty)
        }
    }
}

fn map_http_error(status: StatusCode, body: &str) -> NarratorError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| wrapper.error.describe(body))
        .unwrap_or_else(|_| body.to_string());
    NarratorError::Api {
        status: status.as_u16(),
        message,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[cfg(test)]
mod tests {
    use arcanum_core::{
        AiPreferences, DrawnCard, PersonalizationSnapshot, SpreadKind, UserProfile, Verbosity,
        deck,
    };
    use arcanum_session::ReadingOrder;

    use super::*;

    fn request(personalization: PersonalizationSnapshot) -> ReadingRequest {
        ReadingRequest::from_order(
            ReadingOrder {
                epoch: 4,
                question: "What should I let go of?".into(),
                spread: SpreadKind::Single,
                cards: vec![DrawnCard {
                    card: deck().get("major-13").unwrap(),
                    reversed: false,
                }],
            },
            personalization,
        )
    }

    #[test]
    fn request_body_shape() {
        let narrator = GeminiNarrator::new("key").with_temperature(0.5);
        let body = serde_json::to_value(
            narrator.build_request(&request(PersonalizationSnapshot::anonymous())),
        )
        .unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("Card: Death"));
        assert!(body["systemInstruction"].get("role").is_none());
        assert!(
            body["systemInstruction"]["parts"][0]["text"]
                .as_str()
                .unwrap()
                .contains("Oracle of Arcanum")
        );
        assert_eq!(body["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn profile_preferences_reach_system_instruction() {
        let mut profile = UserProfile::new("u1", "Ana");
        profile.preferences = Some(AiPreferences {
            verbosity: Verbosity::Concise,
            ..AiPreferences::default()
        });
        let snapshot = PersonalizationSnapshot {
            profile: Some(profile),
            history: Vec::new(),
        };
        let body = GeminiNarrator::new("key").build_request(&request(snapshot));
        assert!(body.system_instruction.parts[0].text.contains("Keep it brief"));
    }

    #[test]
    fn http_error_uses_api_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        match map_http_error(StatusCode::BAD_REQUEST, body) {
            NarratorError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "INVALID_ARGUMENT: API key not valid.");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn http_error_falls_back_to_raw_body() {
        match map_http_error(StatusCode::BAD_GATEWAY, "upstream down") {
            NarratorError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn builder_overrides() {
        let narrator = GeminiNarrator::new("secret-123")
            .with_model("gemini-2.5-pro")
            .with_base_url("http://localhost:9000/v1beta/models/");
        assert_eq!(narrator.model(), "gemini-2.5-pro");
        assert_eq!(narrator.base_url, "http://localhost:9000/v1beta/models");
        assert!(!format!("{narrator:?}").contains("secret-123"));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let (sink, mut rx) = ChunkSink::channel(4);
        let result = GeminiNarrator::new("  ")
            .stream_reading(&request(PersonalizationSnapshot::anonymous()), &sink)
            .await;
        assert!(matches!(result, Err(NarratorError::MissingApiKey)));
        drop(sink);
        assert!(rx.recv().await.is_none());
    }
}
