use eframe::egui::Context;
use log::debug;

/// Anything that can arrange for one more frame callback.
pub(in crate::app) trait FrameScheduler {
    fn request_frame(&self);
}

impl FrameScheduler for Context {
    fn request_frame(&self) {
        self.request_repaint();
    }
}

/// Bookkeeping for the per-frame render loop.
///
/// At most one frame is outstanding at a time. Cancelling drops the outstanding frame, so a
/// callback that still arrives afterwards finds nothing to run.
#[derive(Debug, Default)]
pub(in crate::app) struct FrameLoop {
    generation: u64,
    running: bool,
    pending: bool,
    frames: u64,
}

impl FrameLoop {
    pub(in crate::app) fn start(&mut self, scheduler: &dyn FrameScheduler) {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
        self.running = true;
        debug!("render loop generation {} started", self.generation);
        self.schedule(scheduler);
    }

    pub(in crate::app) fn cancel(&mut self) {
        if self.running {
            debug!(
                "render loop generation {} cancelled after {} frames",
                self.generation, self.frames
            );
        }
        self.running = false;
        self.pending = false;
    }

    /// Requests the next frame unless one is already outstanding.
    pub(in crate::app) fn schedule(&mut self, scheduler: &dyn FrameScheduler) -> bool {
        if !self.running || self.pending {
            return false;
        }
        self.pending = true;
        scheduler.request_frame();
        true
    }

    /// Claims the outstanding frame. Returns false when there is none to run.
    pub(in crate::app) fn begin_frame(&mut self) -> bool {
        if !self.running || !self.pending {
            return false;
        }
        self.pending = false;
        self.frames += 1;
        true
    }

    #[cfg(test)]
    pub(in crate::app) fn is_running(&self) -> bool {
        self.running
    }

    pub(in crate::app) fn frames(&self) -> u64 {
        self.frames
    }
}
