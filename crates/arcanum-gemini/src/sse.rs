//! Decoding of Gemini's `alt=sse` response stream.

use serde::Deserialize;

use arcanum_session::NarratorError;

/// Splits raw response bytes into `data:` payloads.
///
/// Bytes are buffered until a full line is available, so events and
/// multi-byte characters may straddle network chunks.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed bytes, returning every complete `data:` payload.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Result<Vec<String>, NarratorError> {
        self.buffer.extend_from_slice(bytes);
        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(payload) = data_payload(&line)? {
                payloads.push(payload);
            }
        }
        Ok(payloads)
    }

    /// Flush a trailing line that had no final newline.
    pub(crate) fn finish(&mut self) -> Result<Option<String>, NarratorError> {
        let line = std::mem::take(&mut self.buffer);
        data_payload(&line)
    }
}

fn data_payload(line: &[u8]) -> Result<Option<String>, NarratorError> {
    let line = std::str::from_utf8(line)
        .map_err(|e| NarratorError::Stream(format!("invalid UTF-8 in event stream: {e}")))?;
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim_start();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }
    Ok(Some(data.to_string()))
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    candidates: Option<Vec<Candidate>>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorWrapper {
    pub(crate) error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) code: Option<u16>,
    pub(crate) message: Option<String>,
    pub(crate) status: Option<String>,
}

impl ErrorBody {
    pub(crate) fn describe(&self, fallback: &str) -> String {
        let message = self.message.as_deref().unwrap_or(fallback);
        match self.status.as_deref() {
            Some(status) if !status.is_empty() => format!("{status}: {message}"),
            _ => message.to_string(),
        }
    }
}

/// Text carried by one stream event. Events without text yield `""`.
pub(crate) fn event_text(payload: &str) -> Result<String, NarratorError> {
    let event: StreamEvent = serde_json::from_str(payload)
        .map_err(|e| NarratorError::Stream(format!("bad event payload: {e}")))?;

    if let Some(error) = event.error {
        return Err(NarratorError::Api {
            status: error.code.unwrap_or(500),
            message: error.describe("stream error"),
        });
    }

    Ok(event
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_event(text: &str) -> String {
        format!(
            "data: {}\r\n\r\n",
            serde_json::json!({
                "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
            })
        )
    }

    #[test]
    fn splits_events_across_pushes() {
        let stream = format!("{}{}", text_event("The Star "), text_event("shines."));
        let (a, b) = stream.as_bytes().split_at(17);

        let mut decoder = SseDecoder::default();
        let mut payloads = decoder.push(a).unwrap();
        assert!(payloads.is_empty());
        payloads.extend(decoder.push(b).unwrap());

        let texts: Vec<_> = payloads.iter().map(|p| event_text(p).unwrap()).collect();
        assert_eq!(texts, ["The Star ", "shines."]);
    }

    #[test]
    fn multibyte_character_split_between_chunks() {
        let stream = text_event("Ω");
        let bytes = stream.as_bytes();
        let omega = stream.find('Ω').unwrap();

        let mut decoder = SseDecoder::default();
        assert!(decoder.push(&bytes[..=omega]).unwrap().is_empty());
        let payloads = decoder.push(&bytes[omega + 1..]).unwrap();
        assert_eq!(event_text(&payloads[0]).unwrap(), "Ω");
    }

    #[test]
    fn ignores_comments_and_blank_lines() {
        let mut decoder = SseDecoder::default();
        let payloads = decoder.push(b": keep-alive\n\nevent: message\ndata: [DONE]\n").unwrap();
        assert!(payloads.is_empty());
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut decoder = SseDecoder::default();
        decoder.push(b"data: {\"candidates\":[]}").unwrap();
        assert_eq!(
            decoder.finish().unwrap().as_deref(),
            Some("{\"candidates\":[]}")
        );
        assert_eq!(decoder.finish().unwrap(), None);
    }

    #[test]
    fn joins_parts_and_tolerates_missing_content() {
        let payload = r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}]}}]}"#;
        assert_eq!(event_text(payload).unwrap(), "ab");
        let finish_only = r#"{"candidates":[{"finishReason":"STOP"}],"usageMetadata":{}}"#;
        assert_eq!(event_text(finish_only).unwrap(), "");
    }

    #[test]
    fn in_stream_error_becomes_api_error() {
        let payload = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        match event_text(payload) {
            Err(NarratorError::Api { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "RESOURCE_EXHAUSTED: Quota exceeded");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn garbage_payload_is_stream_error() {
        assert!(matches!(
            event_text("{not json"),
            Err(NarratorError::Stream(_))
        ));
    }
}
