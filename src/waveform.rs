//! Scrolling ECG-style trace and beat ripples for the sensor canvas.
//!
//! Sample synthesis and ripple bookkeeping are plain data manipulation so
//! they stay testable off-browser; only [`WaveformRenderer::draw`] touches
//! the 2d context.

use std::collections::VecDeque;

use web_sys::CanvasRenderingContext2d;

use crate::session::{MAX_BPM, REST_BPM, SessionView};

const RIPPLE_GROWTH_PX: f64 = 1.8;
const RIPPLE_FADE: f64 = 0.02;

/// One trace sample of the idealized P-QRS-T pulse, `phase` in beats.
/// Output stays within `[-0.25, 1.0]`: a small P bump, a sharp QRS spike
/// with its undershoot, then a broad T wave, flat otherwise.
pub fn ecg_wave(phase: f64) -> f64 {
    let p = phase.rem_euclid(1.0);
    if (0.08..0.18).contains(&p) {
        // P wave
        0.18 * half_sine(p, 0.08, 0.18)
    } else if (0.24..0.30).contains(&p) {
        // R upstroke
        (p - 0.24) / 0.06
    } else if (0.30..0.36).contains(&p) {
        // S undershoot
        1.0 - (p - 0.30) / 0.06 * 1.25
    } else if (0.36..0.42).contains(&p) {
        // recovery to baseline
        -0.25 + (p - 0.36) / 0.06 * 0.25
    } else if (0.48..0.68).contains(&p) {
        // T wave
        0.30 * half_sine(p, 0.48, 0.68)
    } else {
        0.0
    }
}

fn half_sine(p: f64, from: f64, to: f64) -> f64 {
    (((p - from) / (to - from)) * std::f64::consts::PI).sin()
}

/// Expanding circle spawned on a beat while the press is held.
#[derive(Clone, Copy, Debug)]
pub struct Ripple {
    pub radius: f64,
    pub alpha: f64,
}

pub struct WaveformRenderer {
    samples: VecDeque<f64>,
    capacity: usize,
    ripples: Vec<Ripple>,
}

impl WaveformRenderer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            ripples: Vec::new(),
        }
    }

    /// Append one trace sample for the current beat phase and advance the
    /// ripples. Amplitude scales with how far the rate is above rest.
    pub fn push_sample(&mut self, beat_phase: f64, view: &SessionView) {
        let lift = ((view.bpm - REST_BPM) / (MAX_BPM - REST_BPM)).clamp(0.0, 1.0);
        let amp = 0.35 + 0.65 * lift;
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(ecg_wave(beat_phase) * amp);

        for r in &mut self.ripples {
            r.radius += RIPPLE_GROWTH_PX;
            r.alpha -= RIPPLE_FADE;
        }
        self.ripples.retain(|r| r.alpha > 0.0);
    }

    /// Spawn a ripple on the beat while the press is held; a synchronized
    /// press spawns a brighter one.
    pub fn on_beat(&mut self, view: &SessionView) {
        if view.is_active {
            self.ripples.push(Ripple {
                radius: 6.0,
                alpha: if view.is_synced { 0.9 } else { 0.6 },
            });
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn ripple_count(&self) -> usize {
        self.ripples.len()
    }

    pub fn draw(&self, ctx: &CanvasRenderingContext2d, w: f64, h: f64, view: &SessionView) {
        ctx.set_fill_style_str("#1a0b12");
        ctx.fill_rect(0.0, 0.0, w, h);

        // Baseline
        let mid = h * 0.55;
        ctx.set_stroke_style_str("#3a1f2b");
        ctx.set_line_width(1.0);
        ctx.begin_path();
        ctx.move_to(0.0, mid);
        ctx.line_to(w, mid);
        ctx.stroke();

        // Ripples behind the trace
        let (hot, _) = view.emotional_state.gradient();
        for r in &self.ripples {
            ctx.set_global_alpha(r.alpha);
            ctx.set_stroke_style_str(hot);
            ctx.set_line_width(2.0);
            ctx.begin_path();
            ctx.arc(w / 2.0, mid, r.radius, 0.0, std::f64::consts::TAU).ok();
            ctx.stroke();
        }
        ctx.set_global_alpha(1.0);

        // Trace, colored by emotional state
        let (from, to) = view.emotional_state.gradient();
        let gradient = ctx.create_linear_gradient(0.0, 0.0, w, 0.0);
        gradient.add_color_stop(0.0, from).ok();
        gradient.add_color_stop(1.0, to).ok();
        ctx.set_stroke_style_canvas_gradient(&gradient);
        ctx.set_line_width(if view.is_synced { 3.0 } else { 2.0 });
        ctx.begin_path();
        let dx = w / self.capacity as f64;
        for (i, s) in self.samples.iter().enumerate() {
            let x = i as f64 * dx;
            let y = mid - s * h * 0.35;
            if i == 0 {
                ctx.move_to(x, y);
            } else {
                ctx.line_to(x, y);
            }
        }
        ctx.stroke();
    }
}
