//! Owned wrappers around browser `setInterval` / `setTimeout` handles.
//!
//! Each handle keeps its `Closure` alive for as long as the browser may call
//! it and clears the underlying timer on `Drop`, so dropping (or replacing)
//! a handle is the cancellation. An `armed` cell makes cancellation
//! idempotent: clearing an already-cleared timer is a no-op.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::window;

/// Repeating timer. The callback returns `true` to stop the interval from
/// inside its own tick (the handle then stays around solely to own the
/// closure until the next transition drops it).
pub(crate) struct Interval {
    id: i32,
    armed: Rc<Cell<bool>>,
    _cb: Closure<dyn FnMut()>,
}

impl Interval {
    pub(crate) fn new(ms: i32, mut f: impl FnMut() -> bool + 'static) -> Result<Self, JsValue> {
        let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
        let armed = Rc::new(Cell::new(false));
        let armed_in_cb = Rc::clone(&armed);
        let id_cell = Rc::new(Cell::new(0i32));
        let id_in_cb = Rc::clone(&id_cell);
        let cb = Closure::wrap(Box::new(move || {
            if f() && armed_in_cb.replace(false) {
                if let Some(w) = window() {
                    w.clear_interval_with_handle(id_in_cb.get());
                }
            }
        }) as Box<dyn FnMut()>);
        let id = win
            .set_interval_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), ms)?;
        id_cell.set(id);
        armed.set(true);
        Ok(Self { id, armed, _cb: cb })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        if self.armed.replace(false) {
            if let Some(w) = window() {
                w.clear_interval_with_handle(self.id);
            }
        }
    }
}

/// One-shot timer. Firing disarms the handle so a later drop does not issue
/// a stray clear.
pub(crate) struct Timeout {
    id: i32,
    armed: Rc<Cell<bool>>,
    _cb: Closure<dyn FnMut()>,
}

impl Timeout {
    pub(crate) fn new(ms: i32, f: impl FnOnce() + 'static) -> Result<Self, JsValue> {
        let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
        let armed = Rc::new(Cell::new(false));
        let armed_in_cb = Rc::clone(&armed);
        let mut f = Some(f);
        let cb = Closure::wrap(Box::new(move || {
            armed_in_cb.set(false);
            if let Some(f) = f.take() {
                f();
            }
        }) as Box<dyn FnMut()>);
        let id = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), ms)?;
        armed.set(true);
        Ok(Self { id, armed, _cb: cb })
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        if self.armed.replace(false) {
            if let Some(w) = window() {
                w.clear_timeout_with_handle(self.id);
            }
        }
    }
}

/// The three timers a heartbeat cycle can own. At most one of each is alive;
/// the rise+sync pair and the decay timer are mutually exclusive across
/// press/release transitions.
#[derive(Default)]
pub(crate) struct TimerSet {
    pub(crate) rise: Option<Interval>,
    pub(crate) sync: Option<Timeout>,
    pub(crate) decay: Option<Interval>,
}

impl TimerSet {
    pub(crate) fn cancel_all(&mut self) {
        self.rise = None;
        self.sync = None;
        self.decay = None;
    }
}
