//! Display window computation and filtering.
//!
//! A window is a closed interval `[start, end]` of wall-clock instants. All
//! arithmetic saturates instead of panicking, so absurd offsets simply yield
//! windows that contain nothing.

use crate::models::{Measurement, OffsetUnit, WindowSelector};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Closed interval of instants a chart covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// `start == end`: the all-time window over an empty log.
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}

/// Compute the window with the default policy (offset counts whole windows).
pub fn compute_window(
    log: &[Measurement],
    selector: WindowSelector,
    now: NaiveDateTime,
    offset: u32,
) -> Window {
    compute_window_with(log, selector, now, offset, OffsetUnit::Window)
}

/// Compute the window for `selector`, anchored `offset` steps before `now`.
///
/// For a day count `N` the window is the `N` days ending at the anchor. For
/// the all-time selector its length is the span from the earliest logged day
/// (at midnight) to `now`, so with no offset it starts exactly at that day.
/// When every entry lies after `now` that span is negative: the start still
/// reports the earliest day, the window ends up inverted and matches nothing.
pub fn compute_window_with(
    log: &[Measurement],
    selector: WindowSelector,
    now: NaiveDateTime,
    offset: u32,
    unit: OffsetUnit,
) -> Window {
    let length = if selector.is_all_time() {
        match earliest_instant(log) {
            Some(first) => now - first,
            None => {
                let end = shift_back(now, offset_shift(Duration::zero(), offset, unit));
                return Window { start: end, end };
            }
        }
    } else {
        Duration::days(i64::from(selector.days()))
    };

    let end = shift_back(now, offset_shift(length.max(Duration::zero()), offset, unit));
    Window {
        start: shift_back(end, length),
        end,
    }
}

/// Keep the measurements whose instant lies in `[start, end]`.
pub fn filter_by_window(
    log: &[Measurement],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<Measurement> {
    let window = Window { start, end };
    log.iter()
        .filter(|m| window.contains(m.instant()))
        .cloned()
        .collect()
}

/// Midnight of the earliest logged day.
pub fn earliest_instant(log: &[Measurement]) -> Option<NaiveDateTime> {
    log.iter()
        .map(|m| m.date)
        .min()
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn offset_shift(window_length: Duration, offset: u32, unit: OffsetUnit) -> Duration {
    let step = match unit {
        OffsetUnit::Window => window_length,
        OffsetUnit::Day => Duration::days(1),
    };
    i32::try_from(offset)
        .ok()
        .and_then(|n| step.checked_mul(n))
        .unwrap_or(Duration::MAX)
}

fn shift_back(instant: NaiveDateTime, by: Duration) -> NaiveDateTime {
    instant
        .checked_sub_signed(by)
        .unwrap_or(NaiveDateTime::MIN)
}

/// Paging direction through history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Step the period offset one window back or forward.
///
/// Moving forward never goes past the current period. The all-time view has
/// nowhere to page to, so its offset comes back unchanged.
pub fn navigate(selector: WindowSelector, offset: u32, direction: Direction) -> u32 {
    if selector.is_all_time() {
        warn!("Navigation is not available for the all-time view");
        return offset;
    }

    match direction {
        Direction::Previous => offset.saturating_add(1),
        Direction::Next => offset.saturating_sub(1),
    }
}

/// Short human-readable description of the window ending at `end`.
pub fn period_label(selector: WindowSelector, end: NaiveDateTime) -> String {
    let end_day = end.date();
    match selector.days() {
        0 => "all time".to_string(),
        1 => format!("{}/{} (day)", end_day.month(), end_day.day()),
        n => {
            // Spans reaching past the calendar start at its first day.
            let start_day = end_day
                .checked_sub_signed(Duration::days(i64::from(n) - 1))
                .unwrap_or(NaiveDate::MIN);
            format!(
                "{}/{} - {}/{} ({})",
                start_day.month(),
                start_day.day(),
                end_day.month(),
                end_day.day(),
                selector
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M").unwrap()
    }

    fn m(date: &str, time: Option<&str>, value: f64) -> Measurement {
        Measurement::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time.map(|t| NaiveTime::parse_from_str(t, "%H:%M").unwrap()),
            value,
        )
    }

    fn sample_log() -> Vec<Measurement> {
        vec![
            m("2025-01-10", Some("08:00"), 72.5),
            m("2025-01-10", Some("20:00"), 73.2),
            m("2025-01-11", Some("08:00"), 72.8),
        ]
    }

    #[test]
    fn test_day_count_window() {
        let now = at("2025-01-11", "21:00");
        let w = compute_window(&sample_log(), WindowSelector::WEEK, now, 0);
        assert_eq!(w.end, now);
        assert_eq!(w.start, at("2025-01-04", "21:00"));
    }

    #[test]
    fn test_offset_shifts_whole_windows() {
        let now = at("2025-01-31", "10:00");
        let w = compute_window(&[], WindowSelector::WEEK, now, 2);
        assert_eq!(w.end, at("2025-01-17", "10:00"));
        assert_eq!(w.start, at("2025-01-10", "10:00"));
    }

    #[test]
    fn test_offset_in_days() {
        let now = at("2025-01-31", "10:00");
        let w = compute_window_with(&[], WindowSelector::WEEK, now, 2, OffsetUnit::Day);
        assert_eq!(w.end, at("2025-01-29", "10:00"));
        assert_eq!(w.start, at("2025-01-22", "10:00"));
    }

    #[test]
    fn test_all_time_starts_at_earliest_day() {
        let mut log = sample_log();
        log.reverse();
        let now = at("2025-02-01", "09:30");
        let w = compute_window(&log, WindowSelector::ALL_TIME, now, 0);
        assert_eq!(w.start, at("2025-01-10", "00:00"));
        assert_eq!(w.end, now);
    }

    #[test]
    fn test_all_time_offset_shifts_by_span() {
        let log = vec![m("2025-01-01", None, 70.0)];
        let now = at("2025-01-11", "00:00");
        let w = compute_window(&log, WindowSelector::ALL_TIME, now, 1);
        assert_eq!(w.end, at("2025-01-01", "00:00"));
        assert_eq!(w.start, at("2024-12-22", "00:00"));
    }

    #[test]
    fn test_all_time_on_empty_log_is_degenerate() {
        let now = at("2025-01-11", "12:00");
        let w = compute_window(&[], WindowSelector::ALL_TIME, now, 0);
        assert!(w.is_degenerate());
        assert_eq!(w.start, now);
    }

    #[test]
    fn test_huge_offset_saturates() {
        let now = at("2025-01-11", "12:00");
        let w = compute_window(&sample_log(), WindowSelector::YEAR, now, u32::MAX);
        assert!(filter_by_window(&sample_log(), w.start, w.end).is_empty());
    }

    #[test]
    fn test_filter_is_inclusive() {
        let log = sample_log();
        let kept = filter_by_window(&log, at("2025-01-10", "08:00"), at("2025-01-11", "08:00"));
        assert_eq!(kept.len(), 3);

        let kept = filter_by_window(&log, at("2025-01-10", "08:01"), at("2025-01-11", "07:59"));
        assert_eq!(kept, vec![log[1].clone()]);
    }

    #[test]
    fn test_filter_places_untimed_at_midday() {
        let log = vec![m("2025-01-10", None, 71.0)];
        assert_eq!(
            filter_by_window(&log, at("2025-01-10", "11:59"), at("2025-01-10", "12:00")).len(),
            1
        );
        assert!(filter_by_window(&log, at("2025-01-10", "12:01"), at("2025-01-11", "00:00"))
            .is_empty());
    }

    #[test]
    fn test_last_day_keeps_only_recent_measurement() {
        let log = sample_log();
        let now = at("2025-01-11", "21:00");
        let w = compute_window(&log, WindowSelector::DAY, now, 0);
        let kept = filter_by_window(&log, w.start, w.end);
        assert_eq!(kept, vec![log[2].clone()]);
    }

    #[test]
    fn test_navigate() {
        assert_eq!(navigate(WindowSelector::WEEK, 0, Direction::Previous), 1);
        assert_eq!(navigate(WindowSelector::WEEK, 3, Direction::Next), 2);
        assert_eq!(navigate(WindowSelector::WEEK, 0, Direction::Next), 0);
        assert_eq!(navigate(WindowSelector::ALL_TIME, 0, Direction::Previous), 0);
    }

    #[test]
    fn test_period_label() {
        let end = at("2025-01-11", "21:00");
        assert_eq!(period_label(WindowSelector::DAY, end), "1/11 (day)");
        assert_eq!(period_label(WindowSelector::WEEK, end), "1/5 - 1/11 (week)");
        assert_eq!(period_label(WindowSelector::MONTH, end), "12/13 - 1/11 (month)");
        assert_eq!(
            period_label(WindowSelector::new(3).unwrap(), end),
            "1/9 - 1/11 (3 days)"
        );
        assert_eq!(period_label(WindowSelector::ALL_TIME, end), "all time");
    }

    #[test]
    fn test_period_label_long_custom_window() {
        let end = at("2025-01-11", "21:00");
        assert_eq!(
            period_label(WindowSelector::new(500).unwrap(), end),
            "8/31 - 1/11 (500 days)"
        );
        assert_eq!(
            period_label(WindowSelector::new(i64::from(u32::MAX)).unwrap(), end),
            format!("1/1 - 1/11 ({} days)", u32::MAX)
        );
    }

    #[test]
    fn test_period_label_clamps_at_calendar_start() {
        let end = NaiveDate::MIN
            .checked_add_days(chrono::Days::new(2))
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(period_label(WindowSelector::WEEK, end), "1/1 - 1/3 (week)");
        assert_eq!(period_label(WindowSelector::DAY, end), "1/3 (day)");
    }

    #[test]
    fn test_all_time_with_only_future_entries() {
        let now = at("2025-01-11", "12:00");
        let log = vec![m("2025-02-01", Some("08:00"), 71.0)];
        let w = compute_window(&log, WindowSelector::ALL_TIME, now, 0);

        assert_eq!(w.start, at("2025-02-01", "00:00"));
        assert_eq!(w.end, now);
        assert!(filter_by_window(&log, w.start, w.end).is_empty());

        let paged = compute_window(&log, WindowSelector::ALL_TIME, now, 2);
        assert_eq!(paged.end, now);
        assert!(filter_by_window(&log, paged.start, paged.end).is_empty());
    }
}
