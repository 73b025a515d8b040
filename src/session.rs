//! Press-driven heartbeat simulation state machine.
//!
//! A session starts at the resting rate and climbs while the visitor holds
//! the sensor surface, crossing into "synchronized" after a sustained hold.
//! On release the rate decays back to rest. The session itself owns no
//! browser timers; the widget glue layer schedules
//! [`HeartbeatSession::rise_tick`], [`HeartbeatSession::sync_fire`] and
//! [`HeartbeatSession::decay_tick`] on the cadences below, which keeps the
//! whole state machine exercisable from native tests.

use crate::emotion::EmotionalState;

/// Resting rate and decay floor.
pub const REST_BPM: f64 = 60.0;
/// Ceiling the rise never exceeds.
pub const MAX_BPM: f64 = 120.0;
/// Cadence of the rise interval while the press is held.
pub const RISE_TICK_MS: i32 = 500;
/// One-shot delay after which a continuous press counts as synchronized.
pub const SYNC_DELAY_MS: i32 = 5_000;
/// Cadence of the decay interval after release.
pub const DECAY_TICK_MS: i32 = 300;
/// BPM removed per decay tick.
pub const DECAY_STEP_BPM: f64 = 5.0;
/// Bounds on the per-tick rise increment.
pub const RISE_STEP_MIN: f64 = 2.0;
pub const RISE_STEP_MAX: f64 = 7.0;

/// Source of the randomized rise increment. Injectable so tests can pin the
/// step while the browser build draws from `Math.random`.
pub trait StepSource {
    /// Next rise increment in BPM. Values are clamped to
    /// `[RISE_STEP_MIN, RISE_STEP_MAX]` by the session regardless.
    fn next_step(&mut self) -> f64;
}

/// Constant step, for deterministic tests and as a fallback.
#[derive(Clone, Copy, Debug)]
pub struct FixedStep(pub f64);

impl StepSource for FixedStep {
    fn next_step(&mut self) -> f64 {
        self.0
    }
}

/// Entropy-backed step for native hosts.
#[cfg(feature = "rng")]
#[derive(Clone, Copy, Debug, Default)]
pub struct EntropyStep;

#[cfg(feature = "rng")]
impl StepSource for EntropyStep {
    fn next_step(&mut self) -> f64 {
        let mut buf = [0u8; 8];
        if getrandom::getrandom(&mut buf).is_err() {
            return (RISE_STEP_MIN + RISE_STEP_MAX) / 2.0;
        }
        let unit = (u64::from_le_bytes(buf) >> 11) as f64 / (1u64 << 53) as f64;
        RISE_STEP_MIN + unit * (RISE_STEP_MAX - RISE_STEP_MIN)
    }
}

/// Lifecycle of one press-and-release cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Rising,
    Synced,
    Decaying,
}

/// Read-only per-tick output consumed by the presentation layer, the audio
/// emitter (`beat_interval_ms`) and the waveform renderer. Serializes with
/// the camelCase keys the page script reads (`isActive`, `touchDuration`,
/// `beatInterval`, ...).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SessionView {
    pub bpm: f64,
    pub is_active: bool,
    pub is_synced: bool,
    pub emotional_state: EmotionalState,
    #[cfg_attr(feature = "serde", serde(rename = "touchDuration"))]
    pub touch_duration_s: f64,
    #[cfg_attr(feature = "serde", serde(rename = "beatInterval"))]
    pub beat_interval_ms: f64,
}

pub struct HeartbeatSession {
    bpm: f64,
    phase: Phase,
    is_synced: bool,
    touch_start_ms: Option<f64>,
    touch_duration_s: f64,
    step: Box<dyn StepSource>,
}

impl HeartbeatSession {
    pub fn new(step: Box<dyn StepSource>) -> Self {
        Self {
            bpm: REST_BPM,
            phase: Phase::Idle,
            is_synced: false,
            touch_start_ms: None,
            touch_duration_s: 0.0,
            step,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Active means the press is currently held (rising or already synced).
    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Rising | Phase::Synced)
    }

    pub fn is_synced(&self) -> bool {
        self.is_synced
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            bpm: self.bpm,
            is_active: self.is_active(),
            is_synced: self.is_synced,
            emotional_state: EmotionalState::from_bpm(self.bpm),
            touch_duration_s: self.touch_duration_s,
            beat_interval_ms: 60_000.0 / self.bpm,
        }
    }

    /// Begin a press at `now_ms`. A press arriving in any non-idle phase is a
    /// clean restart: the previous cycle's state is discarded first, matching
    /// the caller's obligation to cancel that cycle's timers.
    pub fn start(&mut self, now_ms: f64) {
        self.reset();
        self.phase = Phase::Rising;
        self.touch_start_ms = Some(now_ms);
    }

    /// Rise-interval tick. Raises the rate by one bounded step and refreshes
    /// the held duration. Ignored unless a press is active, so a stale tick
    /// that races a release cannot move the rate.
    pub fn rise_tick(&mut self, now_ms: f64) {
        if !self.is_active() {
            return;
        }
        let step = self.step.next_step().clamp(RISE_STEP_MIN, RISE_STEP_MAX);
        self.bpm = (self.bpm + step).min(MAX_BPM);
        if let Some(start) = self.touch_start_ms {
            self.touch_duration_s = ((now_ms - start) / 1000.0).max(0.0);
        }
    }

    /// Sync one-shot. Only a still-held press synchronizes; a fire that was
    /// not cancelled in time after release is a no-op.
    pub fn sync_fire(&mut self) {
        if self.phase == Phase::Rising {
            self.phase = Phase::Synced;
            self.is_synced = true;
        }
    }

    /// End the press. Returns `true` when a decay loop should be started.
    /// Calling from Idle or Decaying changes nothing and returns `false`,
    /// so a double release never arms a second decay timer.
    pub fn stop(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.phase = Phase::Decaying;
        self.touch_start_ms = None;
        true
    }

    /// Decay-interval tick. Lowers the rate by one step, never past the
    /// resting floor. Returns `true` once the session is back at rest so the
    /// caller cancels the decay timer; further ticks are no-ops.
    pub fn decay_tick(&mut self) -> bool {
        if self.phase != Phase::Decaying {
            return true;
        }
        self.bpm = (self.bpm - DECAY_STEP_BPM).max(REST_BPM);
        if self.bpm <= REST_BPM {
            self.bpm = REST_BPM;
            self.phase = Phase::Idle;
            self.is_synced = false;
            self.touch_duration_s = 0.0;
            return true;
        }
        false
    }

    /// Hard reset to idle defaults from any phase. The caller is responsible
    /// for cancelling outstanding timers alongside.
    pub fn reset(&mut self) {
        self.bpm = REST_BPM;
        self.phase = Phase::Idle;
        self.is_synced = false;
        self.touch_start_ms = None;
        self.touch_duration_s = 0.0;
    }
}
