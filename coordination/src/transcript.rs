//! In-memory chat transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::debate::Speaker;
use crate::modes::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Whether a turn carries a reply or a user-visible failure notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnKind {
    Message,
    Error,
}

/// One exchange unit. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<Speaker>,
    pub kind: TurnKind,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            mode: None,
            speaker: None,
            kind: TurnKind::Message,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, mode: Mode) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            mode: Some(mode),
            speaker: None,
            kind: TurnKind::Message,
            timestamp: Utc::now(),
        }
    }

    /// Assistant turn that reports a failed generation.
    pub fn error(content: impl Into<String>, mode: Mode) -> Self {
        Self {
            kind: TurnKind::Error,
            ..Self::assistant(content, mode)
        }
    }

    pub fn with_speaker(mut self, speaker: Speaker) -> Self {
        self.speaker = Some(speaker);
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == TurnKind::Error
    }
}

/// Append-only, ordered list of turns owned by one chat session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `turn` and return a reference to the stored copy.
    pub fn push(&mut self, turn: ChatTurn) -> &ChatTurn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    /// Speakers of the successful debate turns, in order.
    pub fn speaker_sequence(&self) -> Vec<Speaker> {
        self.turns
            .iter()
            .filter(|t| !t.is_error())
            .filter_map(|t| t.speaker)
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.turns.iter().filter(|t| t.is_error()).count()
    }
}
