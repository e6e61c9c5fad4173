//! Sparring coordination library
//!
//! This library provides the conversation core of the sparring chat service:
//! - Mode registry: system prompts, labels and mock replies per stance
//! - Input sanitation and `/chat` payload validation
//! - Response generation against the Anthropic Messages API, with a mock path
//!   when no credential is configured
//! - Debate orchestration: a strict AI-1/AI-2 turn-taking loop with
//!   cooperative cancellation
//!
//! # Modes
//!
//! - `contrarian`: challenges the statement with counterarguments
//! - `agreeable`: validates and builds upon the statement
//! - `debate`: two simulated speakers argue for and against a topic
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use coordination::{DebateOrchestrator, ResponseGenerator, Transcript};
//!
//! let generator = Arc::new(ResponseGenerator::mock());
//! let mut debate = DebateOrchestrator::new(generator);
//! let stop = debate.start("Remote work beats the office")?;
//! let mut transcript = Transcript::new();
//! let outcome = debate.run(&mut transcript).await;
//! ```

pub mod conversation;
pub mod debate;
pub mod generator;
pub mod modes;
pub mod transcript;
pub mod validation;

pub use conversation::Conversation;
pub use debate::{
    DebateConfig, DebateError, DebateOrchestrator, DebateOutcome, DebatePhase, DebateSession,
    HaltReason, Speaker, StopHandle, TurnOutcome,
};
pub use generator::{
    AnthropicBackend, AnthropicConfig, CompletionBackend, GenerationError, GenerationRequest,
    ResponseGenerator,
};
pub use modes::{Mode, UnknownMode};
pub use transcript::{ChatTurn, Role, Transcript, TurnKind};
pub use validation::{sanitize, validate, ValidationError};
