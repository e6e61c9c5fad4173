//! Debate state machine: speakers, phases, transitions, and session tracking.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transition records kept per debate; older entries are dropped first.
pub const MAX_TRANSITIONS: usize = 64;

/// One of the two fixed debate identities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    /// `AI-1`, argues for the topic. Always opens.
    #[default]
    #[serde(rename = "AI-1")]
    Proponent,
    /// `AI-2`, argues against the topic.
    #[serde(rename = "AI-2")]
    Opponent,
}

impl Speaker {
    /// Wire identifier (`AI-1` / `AI-2`).
    pub fn id(self) -> &'static str {
        match self {
            Self::Proponent => "AI-1",
            Self::Opponent => "AI-2",
        }
    }

    pub fn role_name(self) -> &'static str {
        match self {
            Self::Proponent => "Proponent",
            Self::Opponent => "Opponent",
        }
    }

    pub fn stance(self) -> &'static str {
        match self {
            Self::Proponent => "for",
            Self::Opponent => "against",
        }
    }

    /// The speaker who goes next.
    pub fn other(self) -> Self {
        match self {
            Self::Proponent => Self::Opponent,
            Self::Opponent => Self::Proponent,
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown speaker {0:?} (expected AI-1 or AI-2)")]
pub struct UnknownSpeaker(pub String);

impl FromStr for Speaker {
    type Err = UnknownSpeaker;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AI-1" => Ok(Self::Proponent),
            "AI-2" => Ok(Self::Opponent),
            other => Err(UnknownSpeaker(other.to_string())),
        }
    }
}

/// Phase of a debate session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebatePhase {
    /// No debate running. Initial and terminal phase.
    Idle,
    /// Debate running; `speaker` generates next.
    Active { speaker: Speaker },
}

impl DebatePhase {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn speaker(self) -> Option<Speaker> {
        match self {
            Self::Active { speaker } => Some(speaker),
            Self::Idle => None,
        }
    }
}

impl std::fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Active { speaker } => write!(f, "active({speaker})"),
        }
    }
}

/// A phase transition record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateTransition {
    /// Phase before the transition.
    pub from: DebatePhase,
    /// Phase after the transition.
    pub to: DebatePhase,
    /// Successful turns at the moment of the transition.
    pub turn: u32,
    /// When the transition occurred.
    pub timestamp: DateTime<Utc>,
    /// Why it happened (`"turn complete"`, `"stopped"`, ...).
    pub reason: String,
}

/// A transition the state machine refused; the session is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition {from} -> {to}: {reason}")]
pub struct TransitionError {
    /// Phase the session was in.
    pub from: DebatePhase,
    /// Phase that was requested.
    pub to: DebatePhase,
    pub reason: String,
}

/// Ephemeral debate state. Exclusively owned by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateSession {
    /// Topic of the current (or most recent) debate.
    pub topic: String,
    pub phase: DebatePhase,
    /// Successful turns since the last `start`.
    pub turns_completed: u32,
    /// Transitions of the current debate, at most [`MAX_TRANSITIONS`].
    pub transitions: Vec<DebateTransition>,
}

impl Default for DebateSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DebateSession {
    pub fn new() -> Self {
        Self {
            topic: String::new(),
            phase: DebatePhase::Idle,
            turns_completed: 0,
            transitions: Vec::new(),
        }
    }

    fn transition(&mut self, to: DebatePhase, reason: &str) {
        if self.transitions.len() >= MAX_TRANSITIONS {
            self.transitions.remove(0);
        }
        self.transitions.push(DebateTransition {
            from: self.phase,
            to,
            turn: self.turns_completed,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });
        self.phase = to;
    }

    /// Idle → Active(AI-1). The topic must already be validated.
    pub fn start(&mut self, topic: &str) -> Result<(), TransitionError> {
        let to = DebatePhase::Active {
            speaker: Speaker::Proponent,
        };
        if self.phase.is_active() {
            return Err(TransitionError {
                from: self.phase,
                to,
                reason: "debate already active".to_string(),
            });
        }
        self.topic = topic.to_string();
        self.turns_completed = 0;
        self.transitions.clear();
        self.transition(to, "debate started");
        Ok(())
    }

    /// Active(X) → Active(other(X)) after X's reply was recorded.
    pub fn complete_turn(&mut self) -> Result<Speaker, TransitionError> {
        let DebatePhase::Active { speaker } = self.phase else {
            return Err(TransitionError {
                from: self.phase,
                to: self.phase,
                reason: "no active debate".to_string(),
            });
        };
        let next = speaker.other();
        self.turns_completed += 1;
        self.transition(DebatePhase::Active { speaker: next }, "turn complete");
        Ok(next)
    }

    /// Active → Idle. A no-op when already idle.
    pub fn reset(&mut self, reason: &str) {
        if self.phase.is_active() {
            self.transition(DebatePhase::Idle, reason);
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub fn current_speaker(&self) -> Option<Speaker> {
        self.phase.speaker()
    }

    /// Compact status line.
    pub fn status_line(&self) -> String {
        format!(
            "[{}] {} turns | topic={:?}",
            self.phase, self.turns_completed, self.topic
        )
    }
}
