//! Non-debate mode routing: one request, one reply or one error turn.

use std::sync::Arc;

use crate::generator::{GenerationRequest, ResponseGenerator};
use crate::modes::Mode;
use crate::transcript::{ChatTurn, Transcript};
use crate::validation::ValidationError;

/// A single user's chat session under the contrarian or agreeable stance.
pub struct Conversation {
    generator: Arc<ResponseGenerator>,
    transcript: Transcript,
}

impl Conversation {
    pub fn new(generator: Arc<ResponseGenerator>) -> Self {
        Self {
            generator,
            transcript: Transcript::new(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Send `text` under `mode`.
    ///
    /// Empty input is rejected before anything is recorded. Otherwise the
    /// user turn is appended, followed by exactly one assistant turn: the reply,
    /// or an error turn if generation failed.
    pub async fn send(&mut self, mode: Mode, text: &str) -> Result<&ChatTurn, ValidationError> {
        let content = text.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }

        self.transcript.push(ChatTurn::user(content));

        let request = GenerationRequest::direct(mode, content);
        let turn = match self.generator.generate(&request).await {
            Ok(reply) => {
                tracing::info!(%mode, reply_len = reply.len(), "message exchange completed");
                ChatTurn::assistant(reply, mode)
            }
            Err(err) => {
                tracing::error!(
                    %mode,
                    error = %err,
                    status = err.status_code(),
                    details = err.details().unwrap_or_default(),
                    "message exchange failed"
                );
                ChatTurn::error(err.user_message(), mode)
            }
        };
        Ok(self.transcript.push(turn))
    }
}
