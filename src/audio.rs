//! Web Audio "lub-dub" pulse emitter.
//!
//! Each beat schedules two short low sine bursts through a gain envelope.
//! The context is created lazily from a user gesture (autoplay policy);
//! muting is handled by the widget simply not calling [`HeartbeatAudio::play_beat`].

use wasm_bindgen::prelude::*;
use web_sys::{AudioContext, OscillatorType};

const LUB_HZ: f32 = 55.0;
const DUB_HZ: f32 = 45.0;
const DUB_OFFSET_S: f64 = 0.14;

pub(crate) struct HeartbeatAudio {
    ctx: AudioContext,
}

impl HeartbeatAudio {
    pub(crate) fn new() -> Result<Self, JsValue> {
        let ctx = AudioContext::new()?;
        // Contexts start suspended until a gesture; resume is fire-and-forget.
        let _ = ctx.resume();
        Ok(Self { ctx })
    }

    pub(crate) fn play_beat(&self) {
        let now = self.ctx.current_time();
        self.tone(LUB_HZ, now, 0.10, 0.55);
        self.tone(DUB_HZ, now + DUB_OFFSET_S, 0.12, 0.40);
    }

    fn tone(&self, freq: f32, at: f64, dur: f64, peak: f32) {
        let Ok(osc) = self.ctx.create_oscillator() else {
            return;
        };
        let Ok(gain) = self.ctx.create_gain() else {
            return;
        };

        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(freq);

        gain.gain().set_value_at_time(0.0001, at).ok();
        gain.gain().linear_ramp_to_value_at_time(peak, at + 0.015).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.0001, at + dur)
            .ok();

        osc.connect_with_audio_node(&gain).ok();
        gain.connect_with_audio_node(&self.ctx.destination()).ok();

        osc.start_with_when(at).ok();
        osc.stop_with_when(at + dur + 0.05).ok();
    }
}
