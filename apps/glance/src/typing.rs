//! Typing engine with pause/resume
//!
//! Replays a prepared solution as key taps at a fixed cadence. One trigger
//! cycles the engine: idle starts a replay, running pauses at the current
//! position, paused resumes from it. Completion returns to idle. The engine
//! never overlaps replays: a new one can only start from idle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use capability::{KeySink, KeyTap, StatusSink};
use tracing::{info, warn};

/// How often a paused worker re-checks for resume.
const PAUSE_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Paused,
}

struct ReplayState {
    phase: Phase,
    position: usize,
    taps: Vec<KeyTap>,
}

/// Outcome of a toggle, rendered into a status line by the session.
#[derive(Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Nothing to type yet
    NoSolution,
    /// Replay started from the beginning
    Started { total: usize },
    /// Replay paused mid-way
    Paused { remaining: usize },
    /// Replay resumed from the pause position
    Resumed { remaining: usize },
}

/// Key replay engine. Cheap to share; all state lives behind the mutex.
pub struct TypingEngine {
    sink: Arc<dyn KeySink>,
    status: Arc<dyn StatusSink>,
    interval: Duration,
    state: Arc<Mutex<ReplayState>>,
}

impl TypingEngine {
    pub fn new(sink: Arc<dyn KeySink>, status: Arc<dyn StatusSink>, interval: Duration) -> Self {
        Self {
            sink,
            status,
            interval,
            state: Arc::new(Mutex::new(ReplayState {
                phase: Phase::Idle,
                position: 0,
                taps: Vec::new(),
            })),
        }
    }

    /// Cycle the engine: start (given text), pause, or resume.
    pub fn toggle(&self, text: Option<&str>) -> ToggleOutcome {
        let mut state = self.state.lock().expect("typing state poisoned");
        match state.phase {
            Phase::Idle => {
                let Some(text) = text.filter(|t| !t.is_empty()) else {
                    return ToggleOutcome::NoSolution;
                };
                state.taps = to_taps(text);
                state.position = 0;
                state.phase = Phase::Running;
                let total = state.taps.len();
                drop(state);
                info!(total, "starting key replay");
                self.spawn_worker();
                ToggleOutcome::Started { total }
            }
            Phase::Running => {
                state.phase = Phase::Paused;
                let remaining = state.taps.len() - state.position;
                info!(position = state.position, remaining, "replay paused");
                ToggleOutcome::Paused { remaining }
            }
            Phase::Paused => {
                state.phase = Phase::Running;
                let remaining = state.taps.len() - state.position;
                info!(position = state.position, remaining, "replay resumed");
                ToggleOutcome::Resumed { remaining }
            }
        }
    }

    /// Whether the engine is idle (no replay in flight).
    pub fn is_idle(&self) -> bool {
        self.state.lock().expect("typing state poisoned").phase == Phase::Idle
    }

    fn spawn_worker(&self) {
        let state = self.state.clone();
        let sink = self.sink.clone();
        let status = self.status.clone();
        let interval = self.interval;

        tokio::spawn(async move {
            loop {
                let next = {
                    let mut st = state.lock().expect("typing state poisoned");
                    match st.phase {
                        Phase::Idle => break,
                        Phase::Paused => None,
                        Phase::Running => {
                            if st.position >= st.taps.len() {
                                st.phase = Phase::Idle;
                                st.taps.clear();
                                st.position = 0;
                                drop(st);
                                info!("replay complete");
                                status.show("Replay complete", Duration::from_secs(3));
                                break;
                            }
                            let tap = st.taps[st.position];
                            st.position += 1;
                            Some(tap)
                        }
                    }
                };

                match next {
                    Some(tap) => {
                        if let Err(e) = sink.tap(tap) {
                            warn!(error = %e, "key sink failed, stopping replay");
                            let mut st = state.lock().expect("typing state poisoned");
                            st.phase = Phase::Idle;
                            st.taps.clear();
                            st.position = 0;
                            break;
                        }
                        tokio::time::sleep(interval).await;
                    }
                    None => tokio::time::sleep(PAUSE_POLL).await,
                }
            }
        });
    }
}

/// Translate text into key taps: newlines become Enter, everything else is
/// typed as-is.
fn to_taps(text: &str) -> Vec<KeyTap> {
    text.chars()
        .map(|c| if c == '\n' { KeyTap::Enter } else { KeyTap::Char(c) })
        .collect()
}
