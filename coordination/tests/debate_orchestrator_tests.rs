//! Debate loop tests driven by a scripted completion backend.
//!
//! No network: every turn is answered from a queue of canned results, and the
//! tokio clock is paused so the inter-turn delay elapses instantly.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use coordination::{
    CompletionBackend, DebateConfig, DebateOrchestrator, DebatePhase, GenerationError, HaltReason,
    ResponseGenerator, Speaker, StopHandle, Transcript,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Answers from a queue; an exhausted queue keeps answering successfully.
#[derive(Default)]
struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    /// Request a stop while answering this (1-based) call.
    stop_during_call: Mutex<Option<(usize, StopHandle)>>,
}

impl ScriptedBackend {
    fn with_script(script: Vec<Result<String, GenerationError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn stop_during(&self, call: usize, handle: StopHandle) {
        *self.stop_during_call.lock().unwrap() = Some((call, handle));
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, _system: &str, user_content: &str) -> Result<String, GenerationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(200)).await;

        if let Some((stop_call, handle)) = self.stop_during_call.lock().unwrap().as_ref() {
            if *stop_call == call {
                handle.stop();
            }
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("statement #{call} for: {}", user_content.len())))
    }
}

fn orchestrator(backend: Arc<ScriptedBackend>, max_turns: Option<u32>) -> DebateOrchestrator {
    let generator = Arc::new(ResponseGenerator::with_backend(backend));
    DebateOrchestrator::with_config(
        generator,
        DebateConfig {
            max_turns,
            ..DebateConfig::default()
        },
    )
}

fn overloaded() -> GenerationError {
    GenerationError::Upstream {
        status: 529,
        body: r#"{"type":"error","error":{"type":"overloaded_error"}}"#.into(),
    }
}

// ── Alternation ──────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn n_turns_alternate_strictly_starting_with_ai_1() {
    let backend = ScriptedBackend::with_script(vec![]);
    let mut debate = orchestrator(backend.clone(), Some(7));
    let mut transcript = Transcript::new();

    debate.start("Cities should ban cars").unwrap();
    let outcome = debate.run(&mut transcript).await;

    assert_eq!(outcome.halted_by, HaltReason::TurnBudgetReached);
    assert_eq!(outcome.turns_completed, 7);
    let expected: Vec<Speaker> = (0..7)
        .map(|i| if i % 2 == 0 { Speaker::Proponent } else { Speaker::Opponent })
        .collect();
    assert_eq!(transcript.speaker_sequence(), expected);
    assert_eq!(backend.calls(), 7);
    assert_eq!(debate.session().phase, DebatePhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn never_more_than_one_generation_in_flight() {
    let backend = ScriptedBackend::with_script(vec![]);
    let mut debate = orchestrator(backend.clone(), Some(5));
    let mut transcript = Transcript::new();

    debate.start("Concurrency").unwrap();
    debate.run(&mut transcript).await;

    assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn turns_are_spaced_by_the_configured_delay() {
    let backend = ScriptedBackend::with_script(vec![]);
    let mut debate = orchestrator(backend, Some(3));
    let mut transcript = Transcript::new();

    let started = tokio::time::Instant::now();
    debate.start("Pacing").unwrap();
    debate.run(&mut transcript).await;

    // three 200ms generations, two 1500ms pauses; none after the last turn
    let expected = Duration::from_millis(3 * 200 + 2 * 1500);
    let elapsed = started.elapsed();
    assert!(elapsed >= expected, "elapsed {elapsed:?}");
    assert!(elapsed < expected + Duration::from_millis(100), "elapsed {elapsed:?}");
}

// ── Failure ──────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn failure_on_third_turn_halts_with_error_turn() {
    let backend = ScriptedBackend::with_script(vec![
        Ok("AI-1: Opening.".into()),
        Ok("AI-2: Rebuttal.".into()),
        Err(overloaded()),
        Ok("AI-2: never requested".into()),
    ]);
    let mut debate = orchestrator(backend.clone(), None);
    let mut transcript = Transcript::new();

    debate.start("Four-day work week").unwrap();
    let outcome = debate.run(&mut transcript).await;

    assert_eq!(outcome.halted_by, HaltReason::Failed(overloaded()));
    assert_eq!(outcome.turns_completed, 2);
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript.speaker_sequence().len(), 2);
    assert_eq!(transcript.error_count(), 1);

    let error_turn = transcript.last().unwrap();
    assert!(error_turn.is_error());
    assert_eq!(error_turn.speaker, Some(Speaker::Proponent));
    assert_eq!(
        error_turn.content,
        "Sorry, I encountered an error processing your message."
    );

    assert_eq!(debate.session().phase, DebatePhase::Idle);
    assert_eq!(backend.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn debate_can_restart_after_failure() {
    let backend = ScriptedBackend::with_script(vec![Ok("AI-1: first".into()), Err(overloaded())]);
    let mut debate = orchestrator(backend, Some(2));
    let mut transcript = Transcript::new();

    debate.start("first topic").unwrap();
    debate.run(&mut transcript).await;
    assert!(!debate.is_active());

    debate.start("second topic").unwrap();
    assert_eq!(debate.session().current_speaker(), Some(Speaker::Proponent));
    let outcome = debate.run(&mut transcript).await;

    assert_eq!(outcome.topic, "second topic");
    assert_eq!(outcome.halted_by, HaltReason::TurnBudgetReached);
    // history from the failed debate is kept
    assert_eq!(transcript.len(), 4);
}

// ── Cancellation ─────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn stop_mid_generation_discards_the_late_reply() {
    let backend = ScriptedBackend::with_script(vec![]);
    let mut debate = orchestrator(backend.clone(), None);
    let mut transcript = Transcript::new();

    let handle = debate.start("Late replies").unwrap();
    backend.stop_during(2, handle);
    let outcome = debate.run(&mut transcript).await;

    assert_eq!(outcome.halted_by, HaltReason::Stopped);
    assert_eq!(outcome.turns_completed, 1);
    assert_eq!(transcript.speaker_sequence(), vec![Speaker::Proponent]);
    // the in-flight call was allowed to finish; no third call was made
    assert_eq!(backend.calls(), 2);
    assert_eq!(debate.session().phase, DebatePhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn stop_during_delay_prevents_the_next_turn() {
    let backend = ScriptedBackend::with_script(vec![]);
    let mut debate = orchestrator(backend.clone(), None);
    let mut transcript = Transcript::new();

    let handle = debate.start("Interrupted").unwrap();
    // turn 1 ends at 200ms, turn 2 at 1900ms; 2000ms falls in the second pause
    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2000)).await;
        handle.stop();
    });

    let outcome = debate.run(&mut transcript).await;
    stopper.await.unwrap();

    assert_eq!(outcome.halted_by, HaltReason::Stopped);
    assert_eq!(outcome.turns_completed, 2);
    assert_eq!(backend.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent_after_a_run() {
    let backend = ScriptedBackend::with_script(vec![]);
    let mut debate = orchestrator(backend, Some(1));
    let mut transcript = Transcript::new();

    debate.start("Idempotence").unwrap();
    debate.run(&mut transcript).await;
    debate.stop();
    debate.stop();

    assert_eq!(debate.session().phase, DebatePhase::Idle);
    assert_eq!(transcript.len(), 1);
}
