//! Input sanitation and chat payload validation.
//!
//! `validate` turns a loosely-typed JSON payload into a [`GenerationRequest`],
//! so downstream code only ever sees the tagged, checked form.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::debate::Speaker;
use crate::generator::GenerationRequest;
use crate::modes::Mode;

/// Default bound applied to user text before it goes upstream.
pub const MAX_MESSAGE_LENGTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid request body")]
    InvalidBody,

    #[error("Message content is required")]
    EmptyMessage,

    #[error("Invalid mode specified")]
    InvalidMode(String),

    #[error("Debate topic is required")]
    MissingTopic,

    #[error("Invalid debate speaker: {0}")]
    InvalidSpeaker(String),
}

/// Trim and bound `text` to `max_length` characters. Truncation is silent.
pub fn sanitize(text: &str, max_length: usize) -> String {
    text.trim().chars().take(max_length).collect()
}

/// `true` when `text` has content after trimming.
pub fn is_non_empty(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Validate a `/chat` payload of shape `{message, mode, topic?, speaker?}`.
///
/// A debate payload carrying a topic or a speaker is a debate turn: only
/// `topic` and `speaker` are checked and the message is ignored. Every other
/// payload needs a non-empty message, checked before the mode.
pub fn validate(payload: &Value) -> Result<GenerationRequest, ValidationError> {
    let obj = payload.as_object().ok_or(ValidationError::InvalidBody)?;

    let topic = str_field(obj, "topic");
    let speaker = str_field(obj, "speaker");
    let is_debate = str_field(obj, "mode").and_then(|m| m.parse::<Mode>().ok()) == Some(Mode::Debate);
    if is_debate && (topic.is_some() || speaker.is_some()) {
        return validate_debate_turn(topic.unwrap_or_default(), speaker.unwrap_or_default());
    }

    let message = str_field(obj, "message").unwrap_or_default();
    if !is_non_empty(message) {
        return Err(ValidationError::EmptyMessage);
    }

    let mode = match obj.get("mode") {
        Some(Value::String(raw)) => raw
            .parse::<Mode>()
            .map_err(|e| ValidationError::InvalidMode(e.0))?,
        Some(other) => return Err(ValidationError::InvalidMode(other.to_string())),
        None => return Err(ValidationError::InvalidMode(String::new())),
    };

    Ok(GenerationRequest::Direct {
        mode,
        message: message.to_string(),
    })
}

fn str_field<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    obj.get(name).and_then(Value::as_str)
}

/// Validate the topic and speaker of a single debate turn.
pub fn validate_debate_turn(topic: &str, speaker: &str) -> Result<GenerationRequest, ValidationError> {
    if !is_non_empty(topic) {
        return Err(ValidationError::MissingTopic);
    }
    let speaker = speaker
        .trim()
        .parse::<Speaker>()
        .map_err(|_| ValidationError::InvalidSpeaker(speaker.to_string()))?;

    Ok(GenerationRequest::DebateTurn {
        topic: sanitize(topic, MAX_MESSAGE_LENGTH),
        speaker,
    })
}
