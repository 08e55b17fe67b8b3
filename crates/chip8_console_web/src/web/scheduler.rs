use std::cell::RefCell;
use std::rc::Rc;

use chip8_console::scheduler::{FrameScheduler, PollHandle};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::frame_slots::FrameSlots;

/// Where fired frames are delivered. Filled in once the controller exists.
pub(super) type FrameTarget = Rc<RefCell<Option<Box<dyn Fn(PollHandle)>>>>;

/// `requestAnimationFrame`-backed scheduler.
pub(super) struct RafScheduler {
    target: FrameTarget,
    slots: FrameSlots<Closure<dyn FnMut()>>,
}

impl RafScheduler {
    pub(super) fn new(target: FrameTarget) -> Self {
        Self {
            target,
            slots: FrameSlots::new(),
        }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> PollHandle {
        let handle = self.slots.next_handle();

        let target = self.target.clone();
        let cb = Closure::wrap(Box::new(move || {
            if let Some(deliver) = target.borrow().as_ref() {
                deliver(handle);
            }
        }) as Box<dyn FnMut()>);

        match web_sys::window().map(|w| w.request_animation_frame(cb.as_ref().unchecked_ref())) {
            Some(Ok(id)) => self.slots.track(handle, id, cb),
            _ => {
                web_sys::console::error_1(&"requestAnimationFrame failed".into());
                self.slots.clear();
            }
        }
        handle
    }

    fn cancel_frame(&mut self, handle: PollHandle) {
        let Some(id) = self.slots.cancel(handle) else {
            return;
        };
        if let Some(w) = web_sys::window() {
            let _ = w.cancel_animation_frame(id);
        }
    }
}
