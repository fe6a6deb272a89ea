//! Property tests for duration conversion and group totals.

mod common;

use common::{child_row, ledger, parent_row, shipped_templates, TIMESTAMP};
use foxmlgen::{assemble, BatchConfig, DurationMode, RunTime};
use proptest::prelude::*;

fn clock(seconds: u64) -> String {
    format!("{:02}:{:02}:{:02}", seconds / 3600, (seconds / 60) % 60, seconds % 60)
}

proptest! {
    #[test]
    fn prop_structured_sum_is_exact(durations in prop::collection::vec(0u64..36_000, 0..8)) {
        let mode = DurationMode::Structured;
        let mut total = mode.identity();
        for seconds in &durations {
            let run_time = mode.convert(&clock(*seconds)).unwrap().unwrap();
            total = total.checked_add(run_time).unwrap();
        }
        let expected: u64 = durations.iter().sum();
        prop_assert_eq!(total.as_duration().unwrap().as_secs(), expected);
    }

    #[test]
    fn prop_minutes_round_to_hundredths(seconds in 0u64..360_000) {
        let run_time = DurationMode::Minutes.convert(&clock(seconds)).unwrap().unwrap();
        #[allow(clippy::cast_precision_loss)]
        let exact = seconds as f64 / 60.0;
        let minutes = run_time.as_minutes().unwrap();
        prop_assert!((minutes - exact).abs() <= 0.005 + f64::EPSILON * exact);
    }

    #[test]
    fn prop_group_total_matches_children(durations in prop::collection::vec(0u64..7_200, 0..6)) {
        let mut rows = vec![parent_row(2, "obj")];
        for (i, seconds) in durations.iter().enumerate() {
            rows.push(child_row(3 + i, &format!("obj-{i}"), &format!("obj-{i}.m4v"), &clock(*seconds)));
        }

        let config = BatchConfig::default();
        let mode = config.duration_mode;
        let expected = durations.iter().fold(mode.identity(), |acc, seconds| {
            acc.checked_add(mode.convert(&clock(*seconds)).unwrap().unwrap()).unwrap()
        });

        let templates = shipped_templates();
        let mut ledger = ledger(rows.len());
        let output = assemble(rows, &mut ledger, &templates, &config, TIMESTAMP).unwrap();
        let parent = output.records().last().unwrap();

        let extent = format!("<extent units=\"minutes\">{expected}</extent>");
        prop_assert!(parent.content.contains(&extent));
        prop_assert_eq!(output.records().len(), durations.len() + 1);
    }
}

#[test]
fn test_identity_elements() {
    assert_eq!(
        DurationMode::Minutes.identity(),
        RunTime::Minutes { hundredths: 0 }
    );
    assert_eq!(DurationMode::Structured.identity().to_string(), "0:00:00");
}
