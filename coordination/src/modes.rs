//! Mode registry: conversation stances and their fixed prompt table.
//!
//! Every lookup is a pure function over a static table. The only fallible
//! entry points are the string-keyed ones, which reject anything outside the
//! enumerated set with [`UnknownMode`].
//!
//! | Mode         | Label      | Icon | Shaping                                  |
//! |--------------|------------|------|------------------------------------------|
//! | `contrarian` | Contrarian | ⚡   | challenges and questions the statement   |
//! | `agreeable`  | Agreeable  | 💫   | validates and builds upon the statement  |
//! | `debate`     | Debate     | 🎭   | one speaker's 2–3 sentence statement     |

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::debate::Speaker;

/// Raised when a mode name is not one of the enumerated stances.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid mode specified: {0}")]
pub struct UnknownMode(pub String);

/// Conversational stance selected per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Challenges statements with logical counterarguments.
    Contrarian,
    /// Validates and builds upon what the user says.
    Agreeable,
    /// Two simulated speakers argue for and against a topic.
    Debate,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Contrarian, Mode::Agreeable, Mode::Debate];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contrarian => "contrarian",
            Self::Agreeable => "agreeable",
            Self::Debate => "debate",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contrarian" => Ok(Self::Contrarian),
            "agreeable" => Ok(Self::Agreeable),
            "debate" => Ok(Self::Debate),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

const CONTRARIAN_PROMPT: &str = r#"You are a sharp, critical thinker who challenges statements with logical counterarguments.
Find flaws, present alternative perspectives, and question assumptions.
Be intellectually rigorous but respectful. Provide constructive disagreement that helps people think deeper.
Keep responses concise and focused on the specific point being made."#;

const AGREEABLE_PROMPT: &str = r#"You are a warm, supportive conversationalist who validates and builds upon what people say.
Find genuine merit in their ideas, offer encouragement, and expand on their thoughts positively.
Be thoughtful in your agreement, adding real value rather than just echoing.
Keep responses concise and authentically supportive."#;

const DEBATE_PROMPT: &str = r#"You are simulating a debate between two AI personalities discussing a topic.

AI-1 (Proponent): Argues FOR the topic with supportive, optimistic arguments
AI-2 (Opponent): Argues AGAINST the topic with critical, cautious counterpoints

You will be told which speaker should speak next. Generate ONLY that speaker's statement.

Format: Start with the speaker label, then their statement (2-3 complete sentences).

Example for AI-1:
AI-1: [Supporting argument about the topic]

Example for AI-2:
AI-2: [Counter-argument about the topic]

CRITICAL RULES:
1. Generate ONLY the specified speaker's statement
2. Always write 2-3 COMPLETE sentences
3. NEVER end mid-sentence
4. NEVER write the other speaker's lines
5. Make each point substantive and engaging"#;

/// Environment variable named in every mock reply.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// System prompt sent upstream for `mode`.
pub fn prompt_for(mode: Mode) -> &'static str {
    match mode {
        Mode::Contrarian => CONTRARIAN_PROMPT,
        Mode::Agreeable => AGREEABLE_PROMPT,
        Mode::Debate => DEBATE_PROMPT,
    }
}

/// String-keyed variant of [`prompt_for`] for callers holding raw input.
pub fn prompt_for_name(name: &str) -> Result<&'static str, UnknownMode> {
    name.parse::<Mode>().map(prompt_for)
}

pub fn label_for(mode: Mode) -> &'static str {
    match mode {
        Mode::Contrarian => "Contrarian",
        Mode::Agreeable => "Agreeable",
        Mode::Debate => "Debate",
    }
}

pub fn icon_for(mode: Mode) -> &'static str {
    match mode {
        Mode::Contrarian => "⚡",
        Mode::Agreeable => "💫",
        Mode::Debate => "🎭",
    }
}

pub fn description_for(mode: Mode) -> &'static str {
    match mode {
        Mode::Contrarian => "Critical thinking mode - challenges and questions",
        Mode::Agreeable => "Supportive mode - validates and builds upon",
        Mode::Debate => "Self-debate mode - two speakers argue for and against a topic",
    }
}

/// Deterministic reply used when no upstream credential is configured.
///
/// `topic` and `speaker` only shape the debate reply; a debate reply without
/// them falls back to the opening speaker and a generic topic.
pub fn mock_reply_for(mode: Mode, topic: Option<&str>, speaker: Option<Speaker>) -> String {
    match mode {
        Mode::Contrarian => format!(
            "I'd challenge that assumption, but I'm not properly configured yet. Set {API_KEY_ENV} to enable real AI responses."
        ),
        Mode::Agreeable => format!(
            "I'd love to expand on that, but I need proper configuration first. Set {API_KEY_ENV} to enable real AI responses."
        ),
        Mode::Debate => {
            let speaker = speaker.unwrap_or_default();
            let topic = topic.unwrap_or("this topic");
            format!(
                "{}: I would argue {} \"{}\", but I'm not properly configured yet. Set {API_KEY_ENV} to enable real AI responses.",
                speaker.id(),
                speaker.stance(),
                topic
            )
        }
    }
}
