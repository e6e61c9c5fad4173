//! Response generation: one upstream attempt per request, or a mock reply.
//!
//! ```text
//! GenerationRequest
//!   ├─ Direct { mode, message }     → sanitize(message), mode prompt
//!   └─ DebateTurn { topic, speaker } → synthesized instruction, debate prompt
//!         │
//!         ├─ no credential → modes::mock_reply_for (no network)
//!         └─ credential    → CompletionBackend::complete (single attempt)
//! ```

pub mod anthropic;
pub mod errors;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;

pub use anthropic::{AnthropicBackend, AnthropicConfig};
pub use errors::GenerationError;

use crate::debate::Speaker;
use crate::modes::{self, Mode};
use crate::validation::{sanitize, MAX_MESSAGE_LENGTH};

/// What to generate. Built fresh per call and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    /// A single reply to user text under `mode`.
    Direct { mode: Mode, message: String },
    /// One debate statement by `speaker` on `topic`.
    DebateTurn { topic: String, speaker: Speaker },
}

impl GenerationRequest {
    pub fn direct(mode: Mode, message: impl Into<String>) -> Self {
        Self::Direct {
            mode,
            message: message.into(),
        }
    }

    pub fn debate_turn(topic: impl Into<String>, speaker: Speaker) -> Self {
        Self::DebateTurn {
            topic: topic.into(),
            speaker,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Self::Direct { mode, .. } => *mode,
            Self::DebateTurn { .. } => Mode::Debate,
        }
    }
}

/// Upstream language-model provider.
///
/// Implementations make exactly one attempt, map non-success statuses to
/// `GenerationError::Upstream` and never leak transport error types.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Return the reply text for `user_content` under `system`.
    async fn complete(&self, system: &str, user_content: &str) -> Result<String, GenerationError>;
}

/// Instruction sent upstream for a debate turn in place of user text.
pub fn debate_instruction(topic: &str, speaker: Speaker) -> String {
    format!(
        "Debate topic: \"{topic}\"\n\n\
         It is {id}'s turn. {id} is the {role} and argues {stance} the topic.\n\
         Write ONLY {id}'s statement: start with \"{id}:\" followed by 2-3 complete sentences.\n\
         Do not write anything for {other}.",
        id = speaker.id(),
        role = speaker.role_name(),
        stance = speaker.stance().to_uppercase(),
        other = speaker.other().id(),
    )
}

/// Turns a [`GenerationRequest`] into reply text.
///
/// Constructed once at start-up and shared by `Arc`. The presence of a
/// backend is the credential switch: without one every call returns the
/// registry's mock text.
pub struct ResponseGenerator {
    backend: Option<Arc<dyn CompletionBackend>>,
    max_message_length: usize,
}

impl ResponseGenerator {
    /// Generator without a credential; every call is answered by a mock reply.
    pub fn mock() -> Self {
        Self {
            backend: None,
            max_message_length: MAX_MESSAGE_LENGTH,
        }
    }

    pub fn with_backend(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend: Some(backend),
            max_message_length: MAX_MESSAGE_LENGTH,
        }
    }

    /// Build from provider settings: Anthropic when a credential is present,
    /// mock otherwise.
    pub fn from_config(config: &AnthropicConfig) -> anyhow::Result<Self> {
        match config.credential() {
            Some(key) => {
                let backend = AnthropicBackend::new(key, config.clone())
                    .context("failed to build Anthropic HTTP client")?;
                Ok(Self::with_backend(Arc::new(backend)))
            }
            None => {
                tracing::warn!("ANTHROPIC_API_KEY is not set - AI responses will be mocked");
                Ok(Self::mock())
            }
        }
    }

    pub fn with_max_message_length(mut self, max: usize) -> Self {
        self.max_message_length = max;
        self
    }

    /// `true` when replies come from the upstream provider.
    pub fn is_live(&self) -> bool {
        self.backend.is_some()
    }

    /// Produce the reply for `request`. Single attempt, no retry.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let mode = request.mode();
        let (user_content, topic, speaker) = match request {
            GenerationRequest::Direct { message, .. } => {
                let sanitized = sanitize(message, self.max_message_length);
                if sanitized.is_empty() {
                    return Err(GenerationError::InvalidMessage);
                }
                (sanitized, None, None)
            }
            GenerationRequest::DebateTurn { topic, speaker } => (
                debate_instruction(topic, *speaker),
                Some(topic.as_str()),
                Some(*speaker),
            ),
        };

        let Some(backend) = &self.backend else {
            tracing::warn!(%mode, "API key not configured, returning mock response");
            return Ok(modes::mock_reply_for(mode, topic, speaker));
        };

        tracing::debug!(
            %mode,
            backend = backend.name(),
            content_len = user_content.len(),
            speaker = speaker.map(Speaker::id),
            "generating response"
        );

        let text = backend
            .complete(modes::prompt_for(mode), &user_content)
            .await?;
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyUpstreamResponse);
        }
        Ok(text)
    }

    /// Loosely-typed entry point: debate mode with both `topic` and `speaker`
    /// becomes a debate turn and `message` is ignored; anything else is a
    /// direct request.
    pub async fn generate_reply(
        &self,
        mode: Mode,
        message: &str,
        topic: Option<&str>,
        speaker: Option<Speaker>,
    ) -> Result<String, GenerationError> {
        let request = match (mode, topic, speaker) {
            (Mode::Debate, Some(topic), Some(speaker)) => {
                GenerationRequest::debate_turn(topic, speaker)
            }
            _ => GenerationRequest::direct(mode, message),
        };
        self.generate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every call and answers with a fixed reply.
    struct RecordingBackend {
        reply: Result<String, GenerationError>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl RecordingBackend {
        fn replying(reply: Result<String, GenerationError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionBackend for RecordingBackend {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn complete(&self, system: &str, user_content: &str) -> Result<String, GenerationError> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user_content.to_string()));
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn mock_path_returns_fixed_text() {
        let generator = ResponseGenerator::mock();
        assert!(!generator.is_live());
        let reply = generator
            .generate(&GenerationRequest::direct(Mode::Agreeable, "I love this"))
            .await
            .unwrap();
        assert_eq!(reply, modes::mock_reply_for(Mode::Agreeable, None, None));
    }

    #[tokio::test]
    async fn empty_message_fails_before_any_call() {
        let backend = RecordingBackend::replying(Ok("unused".into()));
        let generator = ResponseGenerator::with_backend(backend.clone());
        let err = generator
            .generate(&GenerationRequest::direct(Mode::Contrarian, "   "))
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::InvalidMessage);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn direct_request_sends_mode_prompt_and_sanitized_text() {
        let backend = RecordingBackend::replying(Ok("Consider the deficit.".into()));
        let generator = ResponseGenerator::with_backend(backend.clone()).with_max_message_length(5);
        let reply = generator
            .generate(&GenerationRequest::direct(Mode::Contrarian, "  tax cuts  "))
            .await
            .unwrap();
        assert_eq!(reply, "Consider the deficit.");

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, modes::prompt_for(Mode::Contrarian));
        assert_eq!(calls[0].1, "tax c");
    }

    #[tokio::test]
    async fn debate_turn_synthesizes_instruction() {
        let backend = RecordingBackend::replying(Ok("AI-2: Not so fast.".into()));
        let generator = ResponseGenerator::with_backend(backend.clone());
        generator
            .generate_reply(Mode::Debate, "ignored", Some("space travel"), Some(Speaker::Opponent))
            .await
            .unwrap();

        let calls = backend.calls();
        assert_eq!(calls[0].0, modes::prompt_for(Mode::Debate));
        assert!(calls[0].1.contains("\"space travel\""));
        assert!(calls[0].1.contains("Write ONLY AI-2's statement"));
        assert!(!calls[0].1.contains("ignored"));
    }

    #[tokio::test]
    async fn upstream_errors_propagate_unchanged() {
        let backend = RecordingBackend::replying(Err(GenerationError::Upstream {
            status: 401,
            body: "invalid x-api-key".into(),
        }));
        let generator = ResponseGenerator::with_backend(backend);
        let err = generator
            .generate(&GenerationRequest::direct(Mode::Agreeable, "hello"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.details(), Some("invalid x-api-key"));
    }

    #[tokio::test]
    async fn blank_upstream_reply_is_empty_response() {
        let backend = RecordingBackend::replying(Ok("  ".into()));
        let generator = ResponseGenerator::with_backend(backend);
        let err = generator
            .generate(&GenerationRequest::direct(Mode::Agreeable, "hello"))
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::EmptyUpstreamResponse);
    }

    #[test]
    fn from_config_without_key_is_mock() {
        let generator = ResponseGenerator::from_config(&AnthropicConfig::default()).unwrap();
        assert!(!generator.is_live());
    }

    #[test]
    fn from_config_with_key_is_live() {
        let config = AnthropicConfig {
            api_key: Some("sk-test".into()),
            ..AnthropicConfig::default()
        };
        let generator = ResponseGenerator::from_config(&config).unwrap();
        assert!(generator.is_live());
    }

    #[test]
    fn request_mode() {
        assert_eq!(
            GenerationRequest::debate_turn("x", Speaker::Proponent).mode(),
            Mode::Debate
        );
        assert_eq!(
            GenerationRequest::direct(Mode::Agreeable, "x").mode(),
            Mode::Agreeable
        );
    }
}
