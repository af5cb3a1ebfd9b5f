//! Property tests for the interval timer and the wire format.

use proptest::prelude::*;
use razmer_common::format::{AxisFormat, DefaultFormat, Layout};
use razmer_common::timer::{IntervalTimer, ManualClock};

proptest! {
    /// Expiry flips exactly at `start + interval`, wherever the counter wraps.
    #[test]
    fn timer_expires_exactly_at_interval(start in any::<u32>(), interval in 1u32..=u32::MAX) {
        let clock = ManualClock::new(start);
        let mut timer = IntervalTimer::with_interval(clock.clone(), interval);

        clock.set(start.wrapping_add(interval - 1));
        prop_assert!(!timer.is_expired(false));

        clock.set(start.wrapping_add(interval));
        prop_assert!(timer.is_expired(false));
    }

    /// After reset a non-zero interval is pending, a zero interval is not.
    #[test]
    fn reset_restarts_interval(start in any::<u32>(), interval in any::<u32>()) {
        let clock = ManualClock::new(start);
        let mut timer = IntervalTimer::with_interval(clock.clone(), interval);
        clock.advance(interval);
        timer.reset();
        prop_assert_eq!(timer.is_expired(false), interval == 0);
    }

    /// Auto-reset restarts from the sample taken in the expiring call.
    #[test]
    fn auto_reset_rearms(start in any::<u32>(), interval in 1u32..1_000_000, late in 0u32..1000) {
        let clock = ManualClock::new(start);
        let mut timer = IntervalTimer::with_interval(clock.clone(), interval);

        clock.advance(interval + late);
        prop_assert!(timer.is_expired(true));
        prop_assert!(!timer.is_expired(true));

        clock.advance(interval);
        prop_assert!(timer.is_expired(true));
    }

    /// Default layout: format then parse gives the values back.
    #[test]
    fn default_format_round_trip(axis in prop::array::uniform4(DefaultFormat::MIN_AXIS..=DefaultFormat::MAX_AXIS)) {
        let line = DefaultFormat::format(&axis);
        prop_assert_eq!(line.len(), Layout::DEFAULT.line_len());
        prop_assert_eq!(DefaultFormat::parse(&line).unwrap(), axis);
    }

    /// Any valid runtime layout round trips its clamped values.
    #[test]
    fn layout_round_trip(
        axes in 1usize..=5,
        digits in 1usize..=7,
        dot_seed in 0usize..=7,
        raw in prop::collection::vec(any::<i64>(), 5),
    ) {
        let dot = dot_seed % (digits + 1);
        let layout = Layout::new(axes, digits, dot).unwrap();
        let values: Vec<i64> = raw.iter().take(axes).map(|&v| layout.clamp(v)).collect();

        let line = layout.format(&values);
        prop_assert_eq!(line.len(), layout.line_len());
        let parsed = layout.parse(&line).unwrap();
        prop_assert_eq!(parsed.as_slice(), values.as_slice());
    }

    /// Sign fields line up: every field has the same width.
    #[test]
    fn fields_are_fixed_width(axis in prop::array::uniform3(AxisFormat::<3, 7, 4>::MIN_AXIS..=AxisFormat::<3, 7, 4>::MAX_AXIS)) {
        let line = AxisFormat::<3, 7, 4>::format(&axis);
        let body = line.strip_suffix('\n').unwrap();
        for field in body.split(':') {
            prop_assert_eq!(field.len(), 9);
        }
    }
}
