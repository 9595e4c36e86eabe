//! Frame scheduler driving repeated step/convert/present cycles.
use log::trace;

use crate::error::HostError;
use crate::frame::DisplayFrame;
use crate::EmulatorHost;
use crate::LoadingState;

/// The presentation surface's side of the tick loop: a sink for finished
/// frames and the environment's "run again before the next refresh"
/// primitive.
pub trait PresentationSurface {
    fn present(&mut self, frame: &DisplayFrame);
    fn request_redraw(&mut self);
}

/// Drives [`EmulatorHost::step_frame`] at the surface's refresh cadence
/// until halted.
///
/// The environment owns the callback loop: [`FrameScheduler::begin`]
/// requests the first redraw and every [`FrameScheduler::tick`] requests the
/// next one while the scheduler is running. There is no cancel token;
/// [`FrameScheduler::halt`] clears the running flag and the next tick
/// observes it and stops rescheduling. Under the single-threaded cooperative
/// model the `&mut` receivers guarantee ticks never overlap and frames are
/// presented strictly in step order.
#[derive(Default)]
pub struct FrameScheduler {
    running: bool,
}

impl FrameScheduler {
    pub fn new() -> FrameScheduler {
        FrameScheduler { running: false }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts the tick chain. Requires a ready host. Calling `begin` while
    /// already running is a no-op: at most one active chain per scheduler.
    /// The no-op branch wins over the state check, so `begin` on a running
    /// scheduler returns `Ok` even if the host has failed since the chain
    /// started; the next tick observes the failure and halts the chain.
    pub fn begin(
        &mut self,
        host: &EmulatorHost,
        surface: &mut dyn PresentationSurface,
    ) -> Result<(), HostError> {
        if self.running {
            return Ok(());
        }
        host.require(LoadingState::Ready, "begin")?;
        self.running = true;
        surface.request_redraw();
        Ok(())
    }

    /// One iteration: step, present, reschedule. Invoked by the environment
    /// on each refresh signal. Does nothing if the scheduler was halted
    /// after this tick was scheduled.
    pub fn tick(
        &mut self,
        host: &mut EmulatorHost,
        surface: &mut dyn PresentationSurface,
    ) -> Result<(), HostError> {
        if !self.running {
            return Ok(());
        }
        let frame = match host.step_frame() {
            Ok(frame) => frame,
            Err(err) => {
                // The chain must not respawn against a failed host.
                self.running = false;
                return Err(err);
            }
        };
        surface.present(&frame);
        surface.request_redraw();
        trace!("Frame presented");
        Ok(())
    }

    /// Stops the tick chain. A tick already in flight finishes its frame
    /// normally. Halting an already-halted scheduler is a no-op.
    pub fn halt(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        presented: usize,
        redraws: usize,
    }

    impl PresentationSurface for RecordingSurface {
        fn present(&mut self, _frame: &DisplayFrame) {
            self.presented += 1;
        }

        fn request_redraw(&mut self) {
            self.redraws += 1;
        }
    }

    #[test]
    fn halt_before_begin_is_a_no_op() {
        let mut scheduler = FrameScheduler::new();
        scheduler.halt();
        assert!(!scheduler.is_running());
    }

    #[test]
    fn begin_requires_a_ready_host() {
        let mut scheduler = FrameScheduler::new();
        let host = EmulatorHost::new();
        let mut surface = RecordingSurface::default();
        let err = scheduler.begin(&host, &mut surface).unwrap_err();
        assert!(matches!(err, HostError::Precondition { .. }));
        assert!(!scheduler.is_running());
        assert_eq!(surface.redraws, 0);
    }

    #[test]
    fn tick_while_halted_touches_nothing() {
        let mut scheduler = FrameScheduler::new();
        let mut host = EmulatorHost::new();
        let mut surface = RecordingSurface::default();
        scheduler.tick(&mut host, &mut surface).unwrap();
        assert_eq!(surface.presented, 0);
        assert_eq!(surface.redraws, 0);
    }
}
