/// Raw wheel deltas are divided by this before they move the accumulator.
/// Presentation tuning value, not an invariant.
pub const WHEEL_DAMPING: f32 = 4000.0;

/// Pixel equivalent of one wheel "line" for line-based mice.
pub const PIXELS_PER_LINE: f32 = 40.0;

/// Continuous scroll position over a ring of `scene_count` scenes.
///
/// The accumulator always lives in `[0, scene_count)`; the integer part picks
/// the scene pair, the fractional part is the cross-fade weight.
#[derive(Debug)]
pub struct ScrollState {
    position: f32,
    scene_count: usize,
}

impl ScrollState {
    pub fn new(scene_count: usize) -> Self {
        assert!(scene_count > 0, "scroll ring needs at least one scene");
        Self {
            position: 0.0,
            scene_count,
        }
    }

    /// Apply a signed wheel delta in pixel units. Non-finite deltas are
    /// dropped rather than poisoning the accumulator.
    pub fn adjust(&mut self, delta_pixels: f32) {
        if !delta_pixels.is_finite() {
            return;
        }
        self.position =
            (self.position - delta_pixels / WHEEL_DAMPING).rem_euclid(self.scene_count as f32);
    }

    /// Apply a line-based wheel delta (classic mouse wheel notches).
    pub fn adjust_lines(&mut self, delta_lines: f32) {
        self.adjust(delta_lines * PIXELS_PER_LINE);
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn scene_count(&self) -> usize {
        self.scene_count
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState::from_position(self.position, self.scene_count)
    }
}

/// Per-frame derivation of the scroll position: which two scenes to render
/// and how far the blend between them has progressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub current: usize,
    pub next: usize,
    pub progress: f32,
}

impl FrameState {
    pub fn from_position(position: f32, scene_count: usize) -> Self {
        let wrapped = position.rem_euclid(scene_count as f32);
        // rem_euclid of a value a hair below a multiple of scene_count can
        // still round up to scene_count itself, so clamp the index.
        let current = (wrapped.floor() as usize).min(scene_count - 1);
        let next = (current + 1) % scene_count;
        let progress = (wrapped - current as f32).clamp(0.0, 1.0 - f32::EPSILON);
        Self {
            current,
            next,
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_stays_in_range() {
        let mut scroll = ScrollState::new(3);
        for delta in [500.0, -12000.0, 99999.0, -0.5, 40000.0] {
            scroll.adjust(delta);
            assert!(
                scroll.position() >= 0.0 && scroll.position() < 3.0,
                "position {} escaped [0, 3)",
                scroll.position()
            );
        }
    }

    #[test]
    fn indices_stay_adjacent_mod_n() {
        let mut scroll = ScrollState::new(3);
        for i in 0..200 {
            scroll.adjust(if i % 2 == 0 { 777.0 } else { -1234.5 });
            let fs = scroll.frame_state();
            assert!(fs.current < 3);
            assert_eq!(fs.next, (fs.current + 1) % 3);
            assert!(fs.progress >= 0.0 && fs.progress < 1.0);
        }
    }

    #[test]
    fn reference_derivation() {
        let fs = FrameState::from_position(1.25, 3);
        assert_eq!(fs.current, 1);
        assert_eq!(fs.next, 2);
        assert!((fs.progress - 0.25).abs() < 1e-6);
    }

    #[test]
    fn wraps_from_last_scene_to_first() {
        let fs = FrameState::from_position(2.75, 3);
        assert_eq!(fs.current, 2);
        assert_eq!(fs.next, 0);
        assert!((fs.progress - 0.75).abs() < 1e-6);
    }

    #[test]
    fn negative_positions_wrap_like_modulo() {
        let fs = FrameState::from_position(-0.25, 3);
        assert_eq!(fs.current, 2);
        assert_eq!(fs.next, 0);
        assert!((fs.progress - 0.75).abs() < 1e-5);
    }

    #[test]
    fn non_finite_deltas_are_ignored() {
        let mut scroll = ScrollState::new(3);
        scroll.adjust(800.0);
        let before = scroll.position();
        scroll.adjust(f32::NAN);
        scroll.adjust(f32::INFINITY);
        scroll.adjust(f32::NEG_INFINITY);
        assert_eq!(scroll.position(), before);
    }

    #[test]
    fn damping_scales_raw_deltas() {
        let mut scroll = ScrollState::new(3);
        scroll.adjust(-400.0);
        assert!((scroll.position() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn position_just_below_wrap_boundary() {
        let fs = FrameState::from_position(2.999_999_9, 3);
        assert!(fs.current < 3);
        assert!(fs.progress < 1.0);
        assert_eq!(fs.next, (fs.current + 1) % 3);
    }
}
