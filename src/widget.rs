//! Browser glue for the heartbeat sensor: canvas mount, pointer input,
//! timer wiring and the requestAnimationFrame render loop.
//!
//! All mutation happens on the single JS event loop; the widget lives in a
//! thread-local cell and every timer / listener callback re-enters through
//! [`with_widget`]. Press transitions replace whole timer handles, so the
//! old timers are cleared before any further tick can observe stale state.

use std::cell::{Cell, RefCell};

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, PointerEvent, window};

use crate::audio::HeartbeatAudio;
use crate::session::{
    DECAY_TICK_MS, HeartbeatSession, RISE_STEP_MAX, RISE_STEP_MIN, RISE_TICK_MS, StepSource,
    SYNC_DELAY_MS,
};
use crate::timers::{Interval, TimerSet, Timeout};
use crate::waveform::WaveformRenderer;

const CANVAS_ID: &str = "lb-heart-canvas";
const CANVAS_W: u32 = 480;
const CANVAS_H: u32 = 280;

/// Rise step drawn from `Math.random`, the browser-side default.
struct MathRandomStep;

impl StepSource for MathRandomStep {
    fn next_step(&mut self) -> f64 {
        RISE_STEP_MIN + js_sys::Math::random() * (RISE_STEP_MAX - RISE_STEP_MIN)
    }
}

struct HeartWidget {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    session: HeartbeatSession,
    waveform: WaveformRenderer,
    audio: Option<HeartbeatAudio>,
    muted: bool,
    timers: TimerSet,
    last_beat_ms: f64,
    listeners: Vec<(&'static str, Closure<dyn FnMut(PointerEvent)>)>,
}

impl Drop for HeartWidget {
    // Teardown must leave nothing behind on the shared canvas: cancel the
    // cycle timers and detach the press listeners before their closures go.
    fn drop(&mut self) {
        self.timers.cancel_all();
        for (event, cb) in &self.listeners {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(event, cb.as_ref().unchecked_ref());
        }
    }
}

thread_local! {
    static WIDGET: RefCell<Option<HeartWidget>> = const { RefCell::new(None) };
    // One render loop services whichever widget is currently mounted.
    static FRAME_LOOP_RUNNING: Cell<bool> = const { Cell::new(false) };
}

fn with_widget<R>(f: impl FnOnce(&mut HeartWidget) -> R) -> Option<R> {
    WIDGET.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Find or create the sensor canvas, attach the press surface listeners and
/// start the render loop. Mounting again replaces the previous widget: its
/// timers cancel and its listeners detach on drop, and the render loop is
/// only ever started once.
pub(crate) fn mount() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win.document().ok_or_else(|| JsValue::from_str("no document"))?;

    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id(CANVAS_ID) {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id(CANVAS_ID);
        c.set_width(CANVAS_W);
        c.set_height(CANVAS_H);
        doc.body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&c)?;
        c
    };
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    let mut listeners = Vec::new();
    for (event, starts) in [
        ("pointerdown", true),
        ("pointerup", false),
        ("pointerleave", false),
    ] {
        let cb = Closure::wrap(Box::new(move |_: PointerEvent| {
            if starts {
                press_start();
            } else {
                press_end();
            }
        }) as Box<dyn FnMut(PointerEvent)>);
        canvas.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())?;
        listeners.push((event, cb));
    }

    let widget = HeartWidget {
        canvas,
        ctx,
        session: HeartbeatSession::new(Box::new(MathRandomStep)),
        waveform: WaveformRenderer::new(CANVAS_W as usize),
        audio: None,
        muted: false,
        timers: TimerSet::default(),
        last_beat_ms: performance_now(),
        listeners,
    };

    WIDGET.with(|cell| cell.replace(Some(widget)));
    start_frame_loop();
    Ok(())
}

fn start_frame_loop() {
    if FRAME_LOOP_RUNNING.with(|running| running.replace(true)) {
        return;
    }
    let f: std::rc::Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> =
        std::rc::Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        with_widget(|w| w.frame_tick(ts));
        if let Some(win) = window() {
            let _ = win.request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(win) = window() {
        let _ = win.request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}

/// Press-start trigger (pointerdown or the exported `start_heartbeat`).
/// Cancels anything left over from the previous cycle before arming the
/// rise interval and the sync one-shot.
pub(crate) fn press_start() {
    let now = performance_now();
    let mounted = with_widget(|w| {
        w.timers.cancel_all();
        w.session.start(now);
        if w.audio.is_none() {
            // First gesture: the audio context may now be created.
            w.audio = HeartbeatAudio::new().ok();
        }
    })
    .is_some();
    if !mounted {
        return;
    }

    let rise = Interval::new(RISE_TICK_MS, || {
        with_widget(|w| w.session.rise_tick(performance_now()));
        false
    });
    let sync = Timeout::new(SYNC_DELAY_MS, || {
        with_widget(|w| w.session.sync_fire());
    });
    with_widget(|w| {
        w.timers.rise = rise.ok();
        w.timers.sync = sync.ok();
    });
}

/// Press-end trigger (pointerup / pointerleave or the exported
/// `stop_heartbeat`). Drops the rise and sync timers before the decay loop
/// starts; releasing when already idle or decaying changes nothing.
pub(crate) fn press_end() {
    let needs_decay = with_widget(|w| {
        w.timers.rise = None;
        w.timers.sync = None;
        w.session.stop()
    })
    .unwrap_or(false);
    if !needs_decay {
        return;
    }

    let decay = Interval::new(DECAY_TICK_MS, || {
        // Widget gone means there is nothing left to decay; stop the timer.
        with_widget(|w| w.session.decay_tick()).unwrap_or(true)
    });
    with_widget(|w| w.timers.decay = decay.ok());
}

/// Hard reset: cancel every timer and return the session to idle.
pub(crate) fn reset() {
    with_widget(|w| {
        w.timers.cancel_all();
        w.session.reset();
    });
}

pub(crate) fn set_muted(muted: bool) {
    with_widget(|w| w.muted = muted);
}

#[cfg(feature = "serde_json")]
pub(crate) fn snapshot_json() -> String {
    with_widget(|w| serde_json::to_string(&w.session.view()).unwrap_or_default())
        .unwrap_or_default()
}

impl HeartWidget {
    fn frame_tick(&mut self, now: f64) {
        let view = self.session.view();

        if now - self.last_beat_ms >= view.beat_interval_ms {
            self.last_beat_ms = now;
            self.waveform.on_beat(&view);
            if view.is_active && !self.muted {
                if let Some(audio) = &self.audio {
                    audio.play_beat();
                }
            }
        }

        let phase = ((now - self.last_beat_ms) / view.beat_interval_ms).clamp(0.0, 1.0);
        self.waveform.push_sample(phase, &view);
        self.waveform.draw(
            &self.ctx,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
            &view,
        );
    }
}
