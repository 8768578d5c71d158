//! requestAnimationFrame loop with an explicit stop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::window;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub struct FrameLoop {
    callback: FrameCallback,
    running: Rc<Cell<bool>>,
    request_id: Rc<Cell<i32>>,
}

impl FrameLoop {
    /// Call `on_frame(timestamp_ms)` once per display refresh until [`FrameLoop::stop`].
    pub fn start(mut on_frame: impl FnMut(f64) + 'static) -> Result<FrameLoop, JsValue> {
        let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
        let f: FrameCallback = Rc::new(RefCell::new(None));
        let g = f.clone();
        let running = Rc::new(Cell::new(true));
        let request_id = Rc::new(Cell::new(0));
        let (run, req) = (running.clone(), request_id.clone());
        *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
            if !run.get() {
                return;
            }
            on_frame(ts);
            if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
                if let Ok(id) = w.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    req.set(id);
                }
            }
        }) as Box<dyn FnMut(f64)>));
        if let Some(cb) = g.borrow().as_ref() {
            request_id.set(win.request_animation_frame(cb.as_ref().unchecked_ref())?);
        }
        Ok(FrameLoop {
            callback: g,
            running,
            request_id,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Cancel the pending frame and release the callback. Must be called from
    /// outside the frame callback itself.
    pub fn stop(&self) {
        if !self.running.replace(false) {
            return;
        }
        if let Some(w) = window() {
            let _ = w.cancel_animation_frame(self.request_id.get());
        }
        self.callback.borrow_mut().take();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
