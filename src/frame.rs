//! Frame loop bookkeeping, kept as an explicit state object so start, stop
//! and teardown can be exercised without a browser.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

/// Something that can run a callback on the next display frame.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Clone, Debug, Default)]
pub struct FrameState {
    /// Timestamp (ms) of the previous processed frame.
    pub last_timestamp: Option<f64>,
    pub frame_handle: Option<FrameHandle>,
    pub is_running: bool,
    pub torn_down: bool,
}

impl FrameState {
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.is_running || self.torn_down {
            return;
        }
        self.is_running = true;
        // no catch-up after a pause
        self.last_timestamp = None;
        self.schedule_next(scheduler);
    }

    /// Seconds since the previous frame; 0 on the first frame and when the
    /// host clock goes backwards.
    pub fn advance(&mut self, now_ms: f64) -> f64 {
        let dt = match self.last_timestamp {
            Some(prev) if now_ms > prev => (now_ms - prev) / 1000.0,
            _ => 0.0,
        };
        if self.last_timestamp.is_none_or(|prev| now_ms >= prev) {
            self.last_timestamp = Some(now_ms);
        }
        dt
    }

    pub fn schedule_next(&mut self, scheduler: &mut dyn FrameScheduler) {
        if !self.is_running || self.torn_down {
            return;
        }
        if let Some(old) = self.frame_handle.take() {
            scheduler.cancel_frame(old);
        }
        self.frame_handle = scheduler.request_frame();
    }

    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.is_running = false;
        if let Some(h) = self.frame_handle.take() {
            scheduler.cancel_frame(h);
        }
    }

    pub fn teardown(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.stop(scheduler);
        self.torn_down = true;
        self.last_timestamp = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Fake {
        next: i32,
        requested: Vec<FrameHandle>,
        cancelled: Vec<FrameHandle>,
    }

    impl FrameScheduler for Fake {
        fn request_frame(&mut self) -> Option<FrameHandle> {
            self.next += 1;
            let h = FrameHandle(self.next);
            self.requested.push(h);
            Some(h)
        }
        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.cancelled.push(handle);
        }
    }

    #[test]
    fn first_frame_has_zero_dt() {
        let mut fs = FrameState::default();
        assert_eq!(fs.advance(1000.0), 0.0);
        assert!((fs.advance(1016.0) - 0.016).abs() < 1e-12);
        assert_eq!(fs.advance(900.0), 0.0);
        assert!((fs.advance(1032.0) - 0.016).abs() < 1e-12);
    }

    #[test]
    fn start_is_idempotent() {
        let mut sched = Fake::default();
        let mut fs = FrameState::default();
        fs.start(&mut sched);
        fs.start(&mut sched);
        assert_eq!(sched.requested.len(), 1);
        assert_eq!(fs.frame_handle, Some(FrameHandle(1)));
    }

    #[test]
    fn restart_resets_clock() {
        let mut sched = Fake::default();
        let mut fs = FrameState::default();
        fs.start(&mut sched);
        fs.advance(10.0);
        fs.stop(&mut sched);
        assert_eq!(sched.cancelled, vec![FrameHandle(1)]);
        fs.start(&mut sched);
        assert_eq!(fs.advance(60_000.0), 0.0);
    }

    #[test]
    fn teardown_is_final() {
        let mut sched = Fake::default();
        let mut fs = FrameState::default();
        fs.start(&mut sched);
        fs.teardown(&mut sched);
        assert!(!fs.is_running);
        assert_eq!(fs.frame_handle, None);
        fs.start(&mut sched);
        fs.schedule_next(&mut sched);
        assert_eq!(sched.requested.len(), 1);
    }
}
