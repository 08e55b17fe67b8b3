//! Display-refresh scheduling.
//!
//! A [`FrameScheduler`] hands out one [`PollHandle`] per requested frame. The
//! host later delivers that handle back through
//! [`SessionController::on_frame`](crate::session::SessionController::on_frame)
//! when the frame fires. Cancelling a handle means its frame is never
//! delivered; a handle that is delivered anyway is simply ignored as stale.

use std::collections::VecDeque;

/// Opaque token for one requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollHandle(u64);

impl PollHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// The host's one-callback-per-frame primitive.
pub trait FrameScheduler {
    /// Requests a single callback on the next frame.
    fn request_frame(&mut self) -> PollHandle;

    /// Drops a previously requested frame. Unknown or already fired handles are
    /// ignored.
    fn cancel_frame(&mut self, handle: PollHandle);
}

/// Scheduler for hosts that pump frames themselves (native loops and tests).
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: VecDeque<PollHandle>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles waiting for a frame, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = PollHandle> + '_ {
        self.pending.iter().copied()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Removes and returns the oldest pending handle, i.e. "the frame fired".
    pub fn fire_next(&mut self) -> Option<PollHandle> {
        self.pending.pop_front()
    }

    pub fn requested_total(&self) -> u64 {
        self.requested
    }

    pub fn cancelled_total(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> PollHandle {
        self.next_id += 1;
        let handle = PollHandle(self.next_id);
        self.pending.push_back(handle);
        self.requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: PollHandle) {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}
