//! Emotional classification of the simulated rate, plus the presentation
//! gradient each state maps to.

/// Three-way classification, a pure function of BPM.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EmotionalState {
    Calm,
    Moved,
    Passionate,
}

impl EmotionalState {
    /// Boundaries: below 70 is calm, 70 through 90 inclusive is moved,
    /// anything above 90 is passionate.
    pub fn from_bpm(bpm: f64) -> Self {
        if bpm < 70.0 {
            EmotionalState::Calm
        } else if bpm <= 90.0 {
            EmotionalState::Moved
        } else {
            EmotionalState::Passionate
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmotionalState::Calm => "calm",
            EmotionalState::Moved => "moved",
            EmotionalState::Passionate => "passionate",
        }
    }

    /// Two CSS color stops for the waveform stroke gradient.
    pub fn gradient(&self) -> (&'static str, &'static str) {
        match self {
            EmotionalState::Calm => ("#ffd1dc", "#a3c4f3"),
            EmotionalState::Moved => ("#ff8fab", "#fb6f92"),
            EmotionalState::Passionate => ("#ff4d6d", "#c9184a"),
        }
    }
}
