//! Property tests for the level curve and XP calculator.

use blockday_core::progression::level::max_threshold;
use blockday_core::progression::{level_for, next_level_for, sanitize_xp, LevelProgress, LEVEL_CURVE};
use proptest::prelude::*;

proptest! {
    #[test]
    fn level_threshold_never_exceeds_xp(xp in 0u64..50_000) {
        let level = level_for(xp);
        prop_assert!(level.threshold <= xp);
        if let Some(next) = next_level_for(xp) {
            prop_assert!(next.threshold > xp);
            prop_assert_eq!(next.level, level.level + 1);
        }
    }

    #[test]
    fn saturates_at_max_level(extra in 0u64..1_000_000) {
        let xp = max_threshold() + extra;
        let progress = LevelProgress::from_xp(xp);
        prop_assert!(next_level_for(xp).is_none());
        prop_assert_eq!(progress.next_level_xp, 0);
        prop_assert!(progress.current_level_xp <= max_threshold() - LEVEL_CURVE[LEVEL_CURVE.len() - 2].threshold);
        prop_assert!(progress.is_max_level());
    }

    #[test]
    fn progress_stays_within_level(xp in 0u64..10_000) {
        let progress = LevelProgress::from_xp(xp);
        prop_assert!(progress.next_level_xp == 0 || progress.current_level_xp < progress.next_level_xp);
        prop_assert!((0.0..=100.0).contains(&progress.percent()));
    }

    #[test]
    fn raw_input_is_clamped(raw in prop::num::f64::ANY) {
        let xp = sanitize_xp(raw);
        prop_assert!(xp <= max_threshold());
        if raw.is_nan() || raw <= 0.0 {
            prop_assert_eq!(xp, 0);
        }
    }
}

#[test]
fn negative_and_nan_display_as_first_level() {
    for raw in [-5.0, f64::NAN, f64::NEG_INFINITY] {
        let progress = LevelProgress::from_raw(raw);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.current_level_xp, 0);
        assert_eq!(progress.next_level_xp, 100);
    }
    assert_eq!(LevelProgress::from_raw(f64::INFINITY).level, 10);
}
