//! Debate Orchestration: two-speaker turn-taking loop
//!
//! State machine for a scripted debate between two fixed speakers. The
//! proponent (`AI-1`) always opens; speakers alternate strictly, one
//! generation at a time.
//!
//! # Debate Flow
//!
//! ```text
//! Idle ──start(topic)──→ Active(AI-1) ──turn──→ Active(AI-2) ──turn──→ Active(AI-1) …
//!  ▲                          │                      │
//!  │                          └──────────┬───────────┘
//!  │                                     │ stop / generation failure / turn budget
//!  └─────────────────────────────────────┘
//! ```

pub mod orchestrator;
pub mod state;

pub use orchestrator::{
    DebateConfig, DebateError, DebateOrchestrator, DebateOutcome, HaltReason, StopHandle,
    TurnOutcome,
};
pub use state::{DebatePhase, DebateSession, DebateTransition, Speaker, TransitionError};
