use scrollfade::driver::{Playback, TIME_STEP};
use scrollfade::scene;
use scrollfade::scroll::{FrameState, ScrollState, WHEEL_DAMPING};

mod scroll_to_frame_tests {
    use super::*;

    #[test]
    fn test_reference_scenario_1_25() {
        // Raw wheel delta that lands the accumulator exactly on 1.25.
        let mut scroll = ScrollState::new(3);
        scroll.adjust(-1.25 * WHEEL_DAMPING);

        let frame = scroll.frame_state();
        assert_eq!(frame.current, 1);
        assert_eq!(frame.next, 2);
        assert!(
            (frame.progress - 0.25).abs() < 1e-5,
            "expected 75%/25% blend split, got progress {}",
            frame.progress
        );
    }

    #[test]
    fn test_full_ring_traversal_returns_home() {
        let mut scroll = ScrollState::new(3);
        // One full lap in 12 equal notches.
        for _ in 0..12 {
            scroll.adjust(-0.25 * WHEEL_DAMPING);
        }
        assert!(
            scroll.position() < 1e-4 || (3.0 - scroll.position()) < 1e-4,
            "full lap should wrap back to the start, got {}",
            scroll.position()
        );
    }

    #[test]
    fn test_invariants_hold_under_mixed_input() {
        let mut scroll = ScrollState::new(3);
        let deltas = [120.0, -360.0, 5000.0, -42.5, 0.0, 80000.0, -100000.0];
        for (i, &d) in deltas.iter().cycle().take(500).enumerate() {
            if i % 3 == 0 {
                scroll.adjust_lines(d / 40.0);
            } else {
                scroll.adjust(d);
            }
            let f = scroll.frame_state();
            assert!(f.current < 3);
            assert_eq!(f.next, (f.current + 1) % 3);
            assert!((0.0..1.0).contains(&f.progress));
        }
    }

    #[test]
    fn test_scene_count_matches_scroll_ring() {
        assert_eq!(scene::default_scenes().len(), scene::SCENE_COUNT);
        let scroll = ScrollState::new(scene::SCENE_COUNT);
        assert_eq!(scroll.scene_count(), scene::SCENE_COUNT);
    }

    #[test]
    fn test_blend_boundaries_select_single_scene() {
        // progress == 0 shows scene[current] verbatim; just below the wrap
        // the blend weight approaches 1 without ever reaching it.
        let at_start = FrameState::from_position(2.0, 3);
        assert_eq!(at_start.current, 2);
        assert_eq!(at_start.progress, 0.0);

        let near_end = FrameState::from_position(2.0 + (1.0 - 1e-6), 3);
        assert_eq!(near_end.current, 2);
        assert!(near_end.progress < 1.0);
        assert!(near_end.progress > 0.999);
    }
}

mod playback_tests {
    use super::*;

    #[test]
    fn test_stop_play_cycle_keeps_time_monotone() {
        let mut playback = Playback::new();
        let mut last = playback.time();

        for cycle in 0..5 {
            for _ in 0..10 {
                playback.tick();
                assert!(playback.time() > last);
                last = playback.time();
            }
            playback.stop();
            // Ticks while stopped have no side effects.
            for _ in 0..3 {
                assert_eq!(playback.tick(), None);
            }
            assert_eq!(playback.time(), last);
            assert!(playback.play(), "cycle {}: resume should reschedule", cycle);
        }

        let expected = 5.0 * 10.0 * TIME_STEP;
        assert!((playback.time() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_double_play_schedules_once() {
        let mut playback = Playback::new();
        playback.stop();

        let mut kicks = 0;
        for _ in 0..3 {
            if playback.play() {
                kicks += 1;
            }
        }
        assert_eq!(kicks, 1, "only the first play() may re-enter the loop");
    }

    #[test]
    fn test_rotation_tracks_time() {
        let mut playback = Playback::new();
        for _ in 0..7 {
            playback.tick();
        }
        assert!((playback.rotation() - playback.time() * 0.1).abs() < 1e-6);
    }
}
