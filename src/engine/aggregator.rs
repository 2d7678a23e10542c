//! Measurement aggregation and dataset construction.
//!
//! Turns a filtered measurement log into the series a chart draws: raw timed
//! points for a single day, or per-day average/max/min for longer windows.

use super::window::{filter_by_window, Window};
use crate::models::{
    AggregationMode, AggregationResult, ChartDataset, ColorRole, Measurement, Point,
    WindowSelector, XValue,
};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

pub const VALUE_LABEL: &str = "value";
pub const AVERAGE_LABEL: &str = "average";
pub const MAX_LABEL: &str = "max";
pub const MIN_LABEL: &str = "min";

/// Statistics for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayStats {
    pub date: NaiveDate,
    pub count: usize,
    pub average: f64,
    pub max: f64,
    pub min: f64,
}

impl DayStats {
    fn from_values(date: NaiveDate, values: &[f64]) -> Self {
        let sum: f64 = values.iter().sum();
        Self {
            date,
            count: values.len(),
            average: sum / values.len() as f64,
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }

    pub fn has_spread(&self) -> bool {
        self.count > 1
    }
}

/// Build the chart description for an already filtered log.
///
/// `selector == 1` yields the intraday view; every other selector, all-time
/// included, yields the daily aggregate view. An empty log yields no datasets.
pub fn aggregate(filtered: &[Measurement], selector: WindowSelector) -> AggregationResult {
    let mode = AggregationMode::for_selector(selector);
    if filtered.is_empty() {
        return AggregationResult::empty(mode);
    }

    let datasets = match mode {
        AggregationMode::Intraday => vec![ChartDataset::solid(
            VALUE_LABEL,
            ColorRole::Primary,
            timed_points(filtered),
        )],
        AggregationMode::DailyAggregate => daily_datasets(&daily_stats(filtered)),
    };

    AggregationResult { mode, datasets }
}

/// Group values by calendar day, keeping log order within each day.
pub fn group_by_day(log: &[Measurement]) -> BTreeMap<NaiveDate, Vec<f64>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();

    for m in log {
        grouped.entry(m.date).or_default().push(m.value);
    }

    grouped
}

/// Per-day statistics, ascending by date.
pub fn daily_stats(log: &[Measurement]) -> Vec<DayStats> {
    group_by_day(log)
        .iter()
        .map(|(date, values)| DayStats::from_values(*date, values))
        .collect()
}

/// One point per measurement, ascending by instant.
///
/// The sort is stable, so measurements sharing an instant keep log order.
fn timed_points(log: &[Measurement]) -> Vec<Point> {
    let mut points: Vec<Point> = log
        .iter()
        .map(|m| Point {
            x: XValue::Time(m.instant()),
            y: m.value,
        })
        .collect();
    points.sort_by(|a, b| a.x.cmp(&b.x));
    points
}

fn daily_datasets(stats: &[DayStats]) -> Vec<ChartDataset> {
    let average = stats
        .iter()
        .map(|s| Point {
            x: XValue::Date(s.date),
            y: s.average,
        })
        .collect();
    let mut datasets = vec![ChartDataset::solid(
        AVERAGE_LABEL,
        ColorRole::Primary,
        average,
    )];

    // Single-measurement days would only repeat the average point.
    let spread: Vec<&DayStats> = stats.iter().filter(|s| s.has_spread()).collect();
    if spread.is_empty() {
        return datasets;
    }

    let max = spread
        .iter()
        .map(|s| Point {
            x: XValue::Date(s.date),
            y: s.max,
        })
        .collect();
    let min = spread
        .iter()
        .map(|s| Point {
            x: XValue::Date(s.date),
            y: s.min,
        })
        .collect();
    datasets.push(ChartDataset::dashed(MAX_LABEL, ColorRole::Max, max));
    datasets.push(ChartDataset::dashed(MIN_LABEL, ColorRole::Min, min));

    datasets
}

/// Label of the previous-period overlay for `selector`.
pub fn comparison_label(selector: WindowSelector) -> String {
    match selector.name() {
        Some(name) if !selector.is_all_time() => format!("previous {}", name),
        _ => "previous period".to_string(),
    }
}

/// The window immediately before `current`, one window length earlier.
pub fn previous_window(selector: WindowSelector, current: &Window) -> Option<Window> {
    if selector.is_all_time() {
        return None;
    }
    let length = Duration::days(i64::from(selector.days()));
    Some(Window {
        start: current.start.checked_sub_signed(length)?,
        end: current.end.checked_sub_signed(length)?,
    })
}

/// Overlay series for the period before `current`.
///
/// Raw timed points for the intraday view, per-day averages otherwise. `None`
/// for the all-time view or when the previous period holds no data.
pub fn previous_period(
    log: &[Measurement],
    selector: WindowSelector,
    current: &Window,
) -> Option<ChartDataset> {
    let window = previous_window(selector, current)?;
    let previous = filter_by_window(log, window.start, window.end);
    if previous.is_empty() {
        return None;
    }

    let points = if selector.is_intraday() {
        timed_points(&previous)
    } else {
        daily_stats(&previous)
            .into_iter()
            .map(|s| Point {
                x: XValue::Date(s.date),
                y: s.average,
            })
            .collect()
    };

    Some(ChartDataset::dashed(
        comparison_label(selector),
        ColorRole::Comparison,
        points,
    ))
}
