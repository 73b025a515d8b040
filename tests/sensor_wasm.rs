// Browser tests for the sensor widget glue (run with `wasm-pack test`).
// The native suites cover the state machine; these cover the DOM surface.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use lovebeat::{start_heart_sensor, start_heartbeat, stop_heartbeat};
use web_sys::PointerEvent;

#[wasm_bindgen_test]
fn remounting_reuses_a_single_sensor_surface() {
    start_heart_sensor().unwrap();
    start_heart_sensor().unwrap();

    let doc = web_sys::window().unwrap().document().unwrap();
    let surfaces = doc.query_selector_all("#lb-heart-canvas").unwrap();
    assert_eq!(surfaces.length(), 1);

    // Pointer input after a remount goes to the live widget only; the
    // replaced widget detached its listeners when it was dropped.
    let canvas = doc.get_element_by_id("lb-heart-canvas").unwrap();
    let down = PointerEvent::new("pointerdown").unwrap();
    assert!(canvas.dispatch_event(&down).unwrap());
    let up = PointerEvent::new("pointerup").unwrap();
    assert!(canvas.dispatch_event(&up).unwrap());

    // The exported triggers keep working across remounts too.
    start_heartbeat();
    stop_heartbeat();
}
