//! Aggregation engine.
//!
//! Maps a measurement log, a window selector and an optional period offset to
//! a declarative chart description. Everything here is pure: no I/O, no state
//! carried between calls.

pub mod aggregator;
pub mod observer;
pub mod window;

pub use aggregator::{aggregate, daily_stats, group_by_day, previous_period, DayStats};
pub use observer::{AggregationObserver, NoopObserver, TracingObserver};
pub use window::{
    compute_window, compute_window_with, filter_by_window, navigate, period_label, Direction,
    Window,
};

use crate::models::{AggregationResult, Measurement, OffsetUnit, WindowSelector};
use chrono::NaiveDateTime;

/// Policy knobs for [`ChartEngine`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// How the period offset maps to a time shift.
    pub offset_unit: OffsetUnit,
    /// Append the previous-period overlay when there is data for it.
    pub include_previous: bool,
}

/// Outcome of one engine run, with the window it was computed over.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRun {
    pub window: Window,
    /// Measurements that fell inside the window.
    pub filtered: usize,
    pub result: AggregationResult,
}

/// Runs the full pipeline: window, filter, aggregate, optional overlay.
#[derive(Debug, Clone)]
pub struct ChartEngine<O = NoopObserver> {
    options: EngineOptions,
    observer: O,
}

impl ChartEngine<NoopObserver> {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            observer: NoopObserver,
        }
    }
}

impl<O: AggregationObserver> ChartEngine<O> {
    pub fn with_observer(options: EngineOptions, observer: O) -> Self {
        Self { options, observer }
    }

    /// Build a fresh chart description for `log`.
    pub fn run(
        &self,
        log: &[Measurement],
        selector: WindowSelector,
        now: NaiveDateTime,
        offset: u32,
    ) -> AggregationResult {
        self.render(log, selector, now, offset).result
    }

    /// Like [`run`](Self::run), also returning the window and filter count.
    pub fn render(
        &self,
        log: &[Measurement],
        selector: WindowSelector,
        now: NaiveDateTime,
        offset: u32,
    ) -> ChartRun {
        let window = compute_window_with(log, selector, now, offset, self.options.offset_unit);
        self.observer.on_window(selector, offset, &window);

        let filtered = filter_by_window(log, window.start, window.end);
        self.observer.on_filtered(log.len(), filtered.len());

        let mut result = aggregate(&filtered, selector);
        if self.options.include_previous && !result.is_empty() {
            if let Some(overlay) = previous_period(log, selector, &window) {
                result.datasets.push(overlay);
            }
        }
        self.observer.on_result(&result);

        ChartRun {
            window,
            filtered: filtered.len(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AggregationMode;
    use chrono::{NaiveDate, NaiveTime};
    use std::cell::RefCell;

    fn m(date: &str, time: &str, value: f64) -> Measurement {
        Measurement::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            Some(NaiveTime::parse_from_str(time, "%H:%M").unwrap()),
            value,
        )
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn sample_log() -> Vec<Measurement> {
        vec![
            m("2025-01-10", "08:00", 72.5),
            m("2025-01-10", "20:00", 73.2),
            m("2025-01-11", "08:00", 72.8),
        ]
    }

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl AggregationObserver for Recorder {
        fn on_window(&self, selector: WindowSelector, offset: u32, _window: &Window) {
            self.events
                .borrow_mut()
                .push(format!("window {} {}", selector.days(), offset));
        }

        fn on_filtered(&self, total: usize, kept: usize) {
            self.events
                .borrow_mut()
                .push(format!("filtered {}/{}", kept, total));
        }

        fn on_result(&self, result: &AggregationResult) {
            self.events
                .borrow_mut()
                .push(format!("result {}", result.datasets.len()));
        }
    }

    #[test]
    fn test_week_run() {
        let engine = ChartEngine::new(EngineOptions::default());
        let result = engine.run(&sample_log(), WindowSelector::WEEK, at("2025-01-11 21:00"), 0);
        assert_eq!(result.mode, AggregationMode::DailyAggregate);
        assert_eq!(result.datasets.len(), 3);
    }

    #[test]
    fn test_day_run_is_intraday() {
        let engine = ChartEngine::new(EngineOptions::default());
        let run = engine.render(&sample_log(), WindowSelector::DAY, at("2025-01-11 21:00"), 0);
        assert_eq!(run.filtered, 1);
        assert_eq!(run.result.mode, AggregationMode::Intraday);
        assert_eq!(run.result.datasets[0].points.len(), 1);
    }

    #[test]
    fn test_offset_pages_back() {
        let engine = ChartEngine::new(EngineOptions::default());
        let run = engine.render(&sample_log(), WindowSelector::DAY, at("2025-01-12 09:00"), 1);
        assert_eq!(run.window.end, at("2025-01-11 09:00"));
        assert_eq!(run.filtered, 2);
        assert_eq!(run.result.datasets[0].points.len(), 2);
    }

    #[test]
    fn test_empty_log_any_selector() {
        let engine = ChartEngine::new(EngineOptions {
            include_previous: true,
            ..EngineOptions::default()
        });
        for selector in WindowSelector::PRESETS {
            let result = engine.run(&[], selector, at("2025-01-11 21:00"), 0);
            assert!(result.is_empty());
        }
    }

    #[test]
    fn test_previous_overlay_appended() {
        let engine = ChartEngine::new(EngineOptions {
            include_previous: true,
            ..EngineOptions::default()
        });
        let result = engine.run(&sample_log(), WindowSelector::DAY, at("2025-01-11 21:00"), 0);
        assert_eq!(result.datasets.len(), 2);
        assert_eq!(result.datasets[1].label, "previous day");
    }

    #[test]
    fn test_observer_sees_every_stage() {
        let recorder = Recorder::default();
        let engine = ChartEngine::with_observer(EngineOptions::default(), &recorder);
        engine.run(&sample_log(), WindowSelector::WEEK, at("2025-01-11 21:00"), 0);
        assert_eq!(
            *recorder.events.borrow(),
            vec!["window 7 0", "filtered 3/3", "result 3"]
        );
    }

    #[test]
    fn test_very_long_windows_cover_whole_log() {
        let engine = ChartEngine::new(EngineOptions {
            include_previous: true,
            ..EngineOptions::default()
        });
        let now = at("2025-01-11 21:00");
        for days in [1_000_000, i64::from(u32::MAX)] {
            let selector = WindowSelector::new(days).unwrap();
            for offset in [0, 3] {
                let run = engine.render(&sample_log(), selector, now, offset);
                if offset == 0 {
                    assert_eq!(run.filtered, 3);
                    assert_eq!(run.result.mode, AggregationMode::DailyAggregate);
                    assert_eq!(run.result.datasets.len(), 3);
                }
                assert!(run.window.start <= run.window.end);
            }
        }
    }
}
