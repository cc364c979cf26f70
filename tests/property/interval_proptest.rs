//! Interval parsing properties

use chrono::TimeDelta;
use proptest::prelude::*;
use task_social::shared::{parse_interval, IntervalError};

fn unit() -> impl Strategy<Value = (&'static str, i64)> {
    prop_oneof![Just(("h", 3_600)), Just(("m", 60)), Just(("s", 1))]
}

proptest! {
    #[test]
    fn positive_whole_units_parse_exactly(n in 1i64..100_000, (suffix, secs) in unit()) {
        let parsed = parse_interval(&format!("{n}{suffix}")).unwrap();
        prop_assert_eq!(parsed, TimeDelta::seconds(n * secs));
    }

    #[test]
    fn compound_expressions_sum_their_parts(h in 0i64..1_000, m in 0i64..60, s in 1i64..60) {
        let parsed = parse_interval(&format!("{h}h{m}m{s}s")).unwrap();
        prop_assert_eq!(parsed, TimeDelta::seconds(h * 3_600 + m * 60 + s));
    }

    #[test]
    fn zero_and_negative_are_rejected(n in 0i64..100_000, (suffix, _) in unit()) {
        let input = format!("-{n}{suffix}");
        prop_assert_eq!(parse_interval(&input), Err(IntervalError::NotPositive(input.clone())));
    }

    #[test]
    fn parsing_never_panics(input in "\\PC{0,12}") {
        let _ = parse_interval(&input);
    }
}
