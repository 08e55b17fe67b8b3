//! Ownership of the callbacks handed to `requestAnimationFrame`.
//!
//! Kept outside the wasm-only `web` module so the bookkeeping can be tested on
//! the host with any callback type.

use chip8_console::scheduler::PollHandle;

struct PendingFrame<C> {
    handle: PollHandle,
    request_id: i32,
    callback: C,
}

/// The one pending frame request plus the callback of the request before it.
///
/// A fired frame's callback is what asks for the next frame, so it is retired
/// rather than dropped and only freed one request later. At most two
/// callbacks are ever held.
pub struct FrameSlots<C> {
    next_id: u64,
    live: Option<PendingFrame<C>>,
    retired: Option<C>,
}

impl<C> Default for FrameSlots<C> {
    fn default() -> Self {
        Self {
            next_id: 0,
            live: None,
            retired: None,
        }
    }
}

impl<C> FrameSlots<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_handle(&mut self) -> PollHandle {
        self.next_id += 1;
        PollHandle::from_raw(self.next_id)
    }

    /// Records an accepted request. The previously pending callback is retired.
    pub fn track(&mut self, handle: PollHandle, request_id: i32, callback: C) {
        self.retire_live();
        self.live = Some(PendingFrame {
            handle,
            request_id,
            callback,
        });
    }

    /// Forgets the pending request if it is `handle` and returns the browser
    /// request id to cancel.
    pub fn cancel(&mut self, handle: PollHandle) -> Option<i32> {
        if self.live.as_ref()?.handle != handle {
            return None;
        }
        let request_id = self.live.as_ref()?.request_id;
        self.retire_live();
        Some(request_id)
    }

    /// Drops the pending request without a browser id to cancel (the request
    /// itself failed).
    pub fn clear(&mut self) {
        self.retire_live();
    }

    pub fn pending(&self) -> Option<PollHandle> {
        self.live.as_ref().map(|p| p.handle)
    }

    /// Callbacks currently kept alive.
    pub fn held(&self) -> usize {
        usize::from(self.live.is_some()) + usize::from(self.retired.is_some())
    }

    fn retire_live(&mut self) {
        if let Some(prev) = self.live.take() {
            self.retired = Some(prev.callback);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn fired_callback_outlives_its_own_rerequest() {
        let mut slots = FrameSlots::new();
        let a = Rc::new(());
        let b = Rc::new(());
        let c = Rc::new(());

        let h1 = slots.next_handle();
        slots.track(h1, 1, Rc::clone(&a));
        let h2 = slots.next_handle();
        slots.track(h2, 2, Rc::clone(&b));
        assert_eq!(Rc::strong_count(&a), 2);

        let h3 = slots.next_handle();
        slots.track(h3, 3, Rc::clone(&c));
        assert_eq!(Rc::strong_count(&a), 1);
        assert_eq!(Rc::strong_count(&b), 2);
        assert_eq!(slots.pending(), Some(h3));
    }

    #[test]
    fn cancelled_callbacks_are_freed() {
        let mut slots = FrameSlots::new();
        let first = Rc::new(());
        let h = slots.next_handle();
        slots.track(h, 7, Rc::clone(&first));
        assert_eq!(slots.cancel(h), Some(7));
        assert_eq!(slots.pending(), None);

        // Pause/resume many times: nothing accumulates.
        for id in 0..100 {
            let h = slots.next_handle();
            slots.track(h, id, Rc::new(()));
            assert_eq!(slots.cancel(h), Some(id));
            assert!(slots.held() <= 2);
        }
        assert_eq!(Rc::strong_count(&first), 1);
    }

    #[test]
    fn stale_cancel_is_ignored() {
        let mut slots = FrameSlots::new();
        let old = slots.next_handle();
        slots.track(old, 1, ());
        let new = slots.next_handle();
        slots.track(new, 2, ());

        assert_eq!(slots.cancel(old), None);
        assert_eq!(slots.pending(), Some(new));
        assert_eq!(slots.cancel(new), Some(2));
        assert_eq!(slots.cancel(new), None);
    }

    #[test]
    fn clear_drops_pending_request() {
        let mut slots = FrameSlots::new();
        let h = slots.next_handle();
        slots.track(h, 1, ());
        slots.clear();
        assert_eq!(slots.pending(), None);
        assert_eq!(slots.cancel(h), None);
    }
}
