/// Fixed per-frame time step driving the ambient rotation.
pub const TIME_STEP: f32 = 0.05;

/// Rotation angle per unit of accumulated time.
pub const ROTATION_RATE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    Stopped,
}

/// Play/stop state machine for the render loop.
///
/// Owns the time accumulator so the ambient rotation keeps its phase across
/// a stop/play cycle. Scheduling itself (request_redraw) is the caller's
/// job; `play` reports whether a redraw kick is needed, so a play call on an
/// already-running loop never double-schedules.
#[derive(Debug)]
pub struct Playback {
    state: PlayState,
    time: f32,
}

impl Playback {
    pub fn new() -> Self {
        Self {
            state: PlayState::Playing,
            time: 0.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    /// Transition to Stopped. Idempotent.
    pub fn stop(&mut self) {
        self.state = PlayState::Stopped;
    }

    /// Transition to Playing. Returns true when the caller must re-enter the
    /// render loop (the loop was actually stopped); false when already
    /// playing.
    pub fn play(&mut self) -> bool {
        if self.state == PlayState::Playing {
            return false;
        }
        self.state = PlayState::Playing;
        true
    }

    /// Advance one frame worth of time. No-op while stopped.
    /// Returns the ambient rotation angle for this frame.
    pub fn tick(&mut self) -> Option<f32> {
        if self.state != PlayState::Playing {
            return None;
        }
        self.time += TIME_STEP;
        Some(self.rotation())
    }

    pub fn rotation(&self) -> f32 {
        self.time * ROTATION_RATE
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_playing() {
        let playback = Playback::new();
        assert!(playback.is_playing());
    }

    #[test]
    fn tick_advances_time_by_fixed_step() {
        let mut playback = Playback::new();
        playback.tick();
        playback.tick();
        assert!((playback.time() - 2.0 * TIME_STEP).abs() < 1e-6);
        assert!((playback.rotation() - 2.0 * TIME_STEP * ROTATION_RATE).abs() < 1e-6);
    }

    #[test]
    fn stop_is_idempotent_and_freezes_time() {
        let mut playback = Playback::new();
        playback.tick();
        let frozen = playback.time();

        playback.stop();
        playback.stop();
        assert!(!playback.is_playing());
        assert_eq!(playback.tick(), None);
        assert_eq!(playback.time(), frozen);
    }

    #[test]
    fn play_requests_reschedule_only_from_stopped() {
        let mut playback = Playback::new();
        // Already playing: must not double-schedule.
        assert!(!playback.play());
        assert!(!playback.play());

        playback.stop();
        assert!(playback.play());
        // Second call is idempotent again.
        assert!(!playback.play());
    }

    #[test]
    fn time_continues_monotonically_after_resume() {
        let mut playback = Playback::new();
        playback.tick();
        playback.tick();
        let before_stop = playback.time();

        playback.stop();
        playback.play();
        playback.tick();

        assert!(playback.time() > before_stop);
        assert!((playback.time() - (before_stop + TIME_STEP)).abs() < 1e-6);
    }
}
