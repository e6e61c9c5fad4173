//! Debate orchestrator: drives the AI-1 → AI-2 turn-taking loop.
//!
//! Ties the state machine to the response generator. Exactly one generation
//! is in flight at a time; the next turn only starts after the previous one
//! has fully resolved and the inter-turn delay has elapsed.
//!
//! Cancellation is cooperative. A [`StopHandle`] flips a flag that the loop
//! reads at each iteration boundary; an in-flight upstream call is never
//! aborted, and a reply that resolves after a stop request is discarded.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::state::{DebateSession, Speaker};
use crate::generator::{GenerationError, GenerationRequest, ResponseGenerator};
use crate::modes::Mode;
use crate::validation::{sanitize, MAX_MESSAGE_LENGTH};
use crate::transcript::{ChatTurn, Transcript};

/// Pause between successful turns, keeping the exchange human-paced.
pub const DEFAULT_TURN_DELAY: Duration = Duration::from_millis(1500);

/// Configuration for the debate orchestrator.
#[derive(Debug, Clone)]
pub struct DebateConfig {
    /// Single suspension between successful turns.
    pub turn_delay: Duration,
    /// Stop after this many successful turns. `None` runs until stopped.
    pub max_turns: Option<u32>,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            turn_delay: DEFAULT_TURN_DELAY,
            max_turns: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebateError {
    #[error("Please enter a debate topic")]
    MissingTopic,

    #[error("a debate on {0:?} is already active")]
    AlreadyActive(String),
}

/// Requests a cooperative stop of the debate it was issued for.
#[derive(Debug, Clone)]
pub struct StopHandle {
    cancel: CancellationToken,
}

impl StopHandle {
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Result of a single turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// `Speaker` replied; the reply is in the transcript and the session
    /// moved on to the other speaker.
    Spoke(Speaker),
    /// The reply resolved after a stop request and was dropped.
    Discarded,
    /// Generation failed; an error turn was recorded and the session is idle.
    Failed(GenerationError),
    /// No debate is active.
    Inactive,
}

/// Why a debate loop ended. The session is idle in every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaltReason {
    Stopped,
    Failed(GenerationError),
    TurnBudgetReached,
    NotStarted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebateOutcome {
    pub topic: String,
    pub turns_completed: u32,
    pub halted_by: HaltReason,
}

impl DebateOutcome {
    pub fn summary_line(&self) -> String {
        let status = match &self.halted_by {
            HaltReason::Stopped => "STOPPED".to_string(),
            HaltReason::Failed(e) => format!("FAILED ({e})"),
            HaltReason::TurnBudgetReached => "COMPLETE".to_string(),
            HaltReason::NotStarted => "NOT STARTED".to_string(),
        };
        format!(
            "[{}] {} turns | topic={:?}",
            status, self.turns_completed, self.topic
        )
    }
}

/// The debate orchestrator.
///
/// Usage:
/// 1. `start(topic)`: returns a [`StopHandle`] for this debate
/// 2. `run(&mut transcript)`: loops until stopped, failed, or out of turns
/// 3. optionally `start` again with a new topic
pub struct DebateOrchestrator {
    generator: Arc<ResponseGenerator>,
    config: DebateConfig,
    session: DebateSession,
    cancel: CancellationToken,
    turn_sink: Option<mpsc::UnboundedSender<ChatTurn>>,
}

impl DebateOrchestrator {
    pub fn new(generator: Arc<ResponseGenerator>) -> Self {
        Self::with_config(generator, DebateConfig::default())
    }

    pub fn with_config(generator: Arc<ResponseGenerator>, config: DebateConfig) -> Self {
        Self {
            generator,
            config,
            session: DebateSession::new(),
            cancel: CancellationToken::new(),
            turn_sink: None,
        }
    }

    /// Also forward every recorded turn to `sink` as it is appended.
    pub fn with_turn_sink(mut self, sink: mpsc::UnboundedSender<ChatTurn>) -> Self {
        self.turn_sink = Some(sink);
        self
    }

    pub fn session(&self) -> &DebateSession {
        &self.session
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    /// Idle → Active(AI-1). The topic is sanitized like `/chat` input; an
    /// empty topic leaves the state untouched.
    pub fn start(&mut self, topic: &str) -> Result<StopHandle, DebateError> {
        let topic = sanitize(topic, MAX_MESSAGE_LENGTH);
        if topic.is_empty() {
            tracing::warn!("debate start rejected: empty topic");
            return Err(DebateError::MissingTopic);
        }
        self.session
            .start(&topic)
            .map_err(|_| DebateError::AlreadyActive(self.session.topic.clone()))?;
        if self.cancel.is_cancelled() {
            // stop requested while idle; it does not carry into this debate
            self.cancel = CancellationToken::new();
        }

        tracing::info!(topic = %topic, "debate started");
        Ok(self.stop_handle())
    }

    /// Handle for the current debate, or for the next one when idle.
    ///
    /// Each debate gets a fresh token when it ends, so a handle never
    /// outlives the debate it stopped or finished.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Active → Idle, speaker reset to AI-1 for the next debate. Idempotent;
    /// a no-op when idle.
    pub fn stop(&mut self) {
        if self.session.is_active() {
            self.cancel.cancel();
            self.halt("stopped");
            tracing::info!(turns = self.session.turns_completed, "debate stopped");
        }
    }

    /// Active → Idle and re-arm the stop token for the next debate.
    fn halt(&mut self, reason: &str) {
        self.session.reset(reason);
        self.cancel = CancellationToken::new();
    }

    fn record(&self, transcript: &mut Transcript, turn: ChatTurn) {
        if let Some(sink) = &self.turn_sink {
            // A dropped receiver only means nobody is watching.
            let _ = sink.send(turn.clone());
        }
        transcript.push(turn);
    }

    /// Generate one statement for the current speaker.
    pub async fn run_turn(&mut self, transcript: &mut Transcript) -> TurnOutcome {
        let Some(speaker) = self.session.current_speaker() else {
            return TurnOutcome::Inactive;
        };

        let request = GenerationRequest::debate_turn(self.session.topic.clone(), speaker);
        tracing::info!(
            speaker = %speaker,
            turn = self.session.turns_completed + 1,
            "requesting debate turn"
        );

        let generator = Arc::clone(&self.generator);
        match generator.generate(&request).await {
            Ok(text) => {
                if self.cancel.is_cancelled() {
                    tracing::info!(speaker = %speaker, "stop requested mid-generation, reply discarded");
                    self.halt("stopped");
                    return TurnOutcome::Discarded;
                }
                self.record(
                    transcript,
                    ChatTurn::assistant(text, Mode::Debate).with_speaker(speaker),
                );
                if let Err(e) = self.session.complete_turn() {
                    tracing::error!(error = %e, "turn completed outside an active debate");
                }
                tracing::info!(speaker = %speaker, "speaker spoke successfully");
                TurnOutcome::Spoke(speaker)
            }
            Err(err) => {
                tracing::error!(
                    speaker = %speaker,
                    error = %err,
                    details = err.details().unwrap_or_default(),
                    "debate turn failed, halting debate"
                );
                self.record(
                    transcript,
                    ChatTurn::error(err.user_message(), Mode::Debate).with_speaker(speaker),
                );
                self.halt("generation failed");
                TurnOutcome::Failed(err)
            }
        }
    }

    /// Run turns until stopped, failed, or the turn budget is spent.
    pub async fn run(&mut self, transcript: &mut Transcript) -> DebateOutcome {
        let halted_by = if !self.session.is_active() {
            HaltReason::NotStarted
        } else {
            loop {
                if self.cancel.is_cancelled() {
                    self.stop();
                    break HaltReason::Stopped;
                }

                match self.run_turn(transcript).await {
                    TurnOutcome::Spoke(_) => {}
                    TurnOutcome::Discarded | TurnOutcome::Inactive => break HaltReason::Stopped,
                    TurnOutcome::Failed(err) => break HaltReason::Failed(err),
                }

                let budget_spent = self
                    .config
                    .max_turns
                    .is_some_and(|max| self.session.turns_completed >= max);
                if budget_spent {
                    self.halt("turn budget reached");
                    break HaltReason::TurnBudgetReached;
                }

                tokio::select! {
                    _ = tokio::time::sleep(self.config.turn_delay) => {}
                    _ = self.cancel.cancelled() => {}
                }
            }
        };

        let outcome = DebateOutcome {
            topic: self.session.topic.clone(),
            turns_completed: self.session.turns_completed,
            halted_by,
        };
        tracing::info!(outcome = %outcome.summary_line(), "debate loop finished");
        outcome
    }
}
