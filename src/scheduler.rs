//! Display-refresh scheduling.
//!
//! The animator never loops on its own. At the end of each frame it asks a
//! [`FrameScheduler`] to call it again before the next repaint, and `stop`
//! cancels that request. Hosts implement the trait over whatever primitive
//! they have: `requestAnimationFrame` in a browser, a redraw request in a
//! native window, or a plain counter in tests.

/// Identifies one pending frame request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host primitive that runs the animator once on the next display refresh.
pub trait FrameScheduler {
    /// Ask for one more frame. The returned handle can cancel it.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a request made with [`request_frame`](Self::request_frame).
    /// Cancelling a request that already fired is a no-op.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// A scheduler driven by hand.
///
/// Remembers the outstanding request; the caller decides when to run the
/// frame. Used by tests and by headless rendering.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Option<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The request that has not fired or been cancelled yet, if any.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Consume the pending request, as the host does right before running
    /// the frame. Returns whether a frame was due.
    pub fn fire(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Total number of frames requested.
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total number of requests cancelled while still pending.
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        self.requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_then_fire() {
        let mut s = ManualScheduler::new();
        let h = s.request_frame();
        assert_eq!(s.pending(), Some(h));
        assert!(s.fire());
        assert!(!s.fire());
    }

    #[test]
    fn test_cancel_stale_handle_is_noop() {
        let mut s = ManualScheduler::new();
        let old = s.request_frame();
        s.fire();
        let new = s.request_frame();
        s.cancel_frame(old);
        assert_eq!(s.pending(), Some(new));
        assert_eq!(s.cancelled(), 0);
        s.cancel_frame(new);
        assert_eq!(s.pending(), None);
        assert_eq!(s.cancelled(), 1);
    }
}
