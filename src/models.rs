//! Data models for the aggregation engine.
//!
//! This module contains the measurement types consumed by the engine and the
//! declarative chart description it produces.

use crate::error::{MeasurementError, SelectorError};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Time of day assumed for measurements recorded without one.
pub const MIDDAY: NaiveTime = match NaiveTime::from_hms_opt(12, 0, 0) {
    Some(t) => t,
    None => panic!("12:00:00 is a valid time"),
};

/// A single recorded observation, already validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Calendar day of the observation.
    pub date: NaiveDate,
    /// Time of day, when one was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    /// Measured quantity (finite, non-negative).
    pub value: f64,
}

impl Measurement {
    pub fn new(date: NaiveDate, time: Option<NaiveTime>, value: f64) -> Self {
        Self { date, time, value }
    }

    /// The point in time this measurement is placed at; midday when untimed.
    pub fn instant(&self) -> NaiveDateTime {
        self.date.and_time(self.time.unwrap_or(MIDDAY))
    }
}

/// A log entry as stored by the host application.
///
/// Fields are loosely typed: values may be numbers or numeric strings, and the
/// quantity may live under `value` or `weight`. Anything else on the entry is
/// ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMeasurement {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub weight: Option<Value>,
}

impl RawMeasurement {
    /// Resolve into a canonical [`Measurement`].
    ///
    /// `value` wins over `weight` whenever it is present and non-null. An
    /// unparseable `time` is treated as absent.
    pub fn resolve(&self) -> Result<Measurement, MeasurementError> {
        let date_str = self
            .date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(MeasurementError::MissingDate)?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|_| MeasurementError::InvalidDate(date_str.to_string()))?;

        let raw_value = match (&self.value, &self.weight) {
            (Some(v), _) if !v.is_null() => v,
            (_, Some(w)) if !w.is_null() => w,
            _ => return Err(MeasurementError::MissingValue),
        };
        let value = numeric(raw_value)?;
        if !value.is_finite() || value < 0.0 {
            return Err(MeasurementError::OutOfRange(value));
        }

        Ok(Measurement {
            date,
            time: self.time.as_deref().and_then(parse_time),
            value,
        })
    }

    /// True when a `time` was supplied but could not be parsed.
    pub fn has_invalid_time(&self) -> bool {
        self.time
            .as_deref()
            .map(|t| !t.trim().is_empty() && parse_time(t).is_none())
            .unwrap_or(false)
    }
}

fn numeric(value: &Value) -> Result<f64, MeasurementError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| MeasurementError::NonNumericValue(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| MeasurementError::NonNumericValue(s.clone())),
        other => Err(MeasurementError::NonNumericValue(other.to_string())),
    }
}

/// Parse `HH:MM` (or `HH:MM:SS`).
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// Requested display span: a day count, or `0` for all time.
///
/// `1` additionally switches the chart to intraday resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct WindowSelector(u32);

impl WindowSelector {
    pub const ALL_TIME: Self = Self(0);
    pub const DAY: Self = Self(1);
    pub const WEEK: Self = Self(7);
    pub const MONTH: Self = Self(30);
    pub const QUARTER: Self = Self(90);
    pub const YEAR: Self = Self(365);

    /// The selectors offered by the host UI, in display order.
    pub const PRESETS: [Self; 6] = [
        Self::DAY,
        Self::WEEK,
        Self::MONTH,
        Self::QUARTER,
        Self::YEAR,
        Self::ALL_TIME,
    ];

    /// Validate a caller-supplied day count.
    ///
    /// Counts beyond `u32::MAX` days already reach past the calendar's range,
    /// so they saturate there.
    pub fn new(days: i64) -> Result<Self, SelectorError> {
        if days < 0 {
            return Err(SelectorError::Negative(days));
        }
        Ok(Self(u32::try_from(days).unwrap_or(u32::MAX)))
    }

    pub fn days(self) -> u32 {
        self.0
    }

    pub fn is_all_time(self) -> bool {
        self.0 == 0
    }

    pub fn is_intraday(self) -> bool {
        self.0 == 1
    }

    /// Preset name, if this selector is one of the host UI presets.
    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("all time"),
            1 => Some("day"),
            7 => Some("week"),
            30 => Some("month"),
            90 => Some("quarter"),
            365 => Some("year"),
            _ => None,
        }
    }
}

impl TryFrom<i64> for WindowSelector {
    type Error = SelectorError;

    fn try_from(days: i64) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<WindowSelector> for u32 {
    fn from(selector: WindowSelector) -> Self {
        selector.0
    }
}

impl Default for WindowSelector {
    fn default() -> Self {
        Self::MONTH
    }
}

impl fmt::Display for WindowSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{} days", self.0),
        }
    }
}

impl FromStr for WindowSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "all" | "all-time" | "alltime" => return Ok(Self::ALL_TIME),
            "day" => return Ok(Self::DAY),
            "week" => return Ok(Self::WEEK),
            "month" => return Ok(Self::MONTH),
            "quarter" => return Ok(Self::QUARTER),
            "year" => return Ok(Self::YEAR),
            _ => {}
        }
        let days = trimmed
            .parse::<i64>()
            .map_err(|_| SelectorError::NotAnInteger(trimmed.to_string()))?;
        Self::new(days)
    }
}

/// How a period offset is converted into a time shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetUnit {
    /// Each offset step moves back one whole window.
    #[default]
    Window,
    /// Each offset step moves back one day.
    Day,
}

/// Which of the two visual representations a result uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Single day, one point per measurement on a sub-day axis.
    Intraday,
    /// One point per calendar day with average/max/min series.
    DailyAggregate,
}

impl AggregationMode {
    pub fn for_selector(selector: WindowSelector) -> Self {
        if selector.is_intraday() {
            AggregationMode::Intraday
        } else {
            AggregationMode::DailyAggregate
        }
    }

    /// Axis resolution the renderer should use for this mode.
    pub fn axis_unit(self) -> AxisUnit {
        match self {
            AggregationMode::Intraday => AxisUnit::Hour,
            AggregationMode::DailyAggregate => AxisUnit::Day,
        }
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationMode::Intraday => write!(f, "Intraday"),
            AggregationMode::DailyAggregate => write!(f, "Daily aggregate"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisUnit {
    Hour,
    Day,
}

/// Styling role; the renderer maps it to an actual color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRole {
    Primary,
    Max,
    Min,
    /// Previous-period overlay.
    Comparison,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStyle {
    pub dashed: bool,
    pub color_role: ColorRole,
}

/// Horizontal coordinate of a chart point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum XValue {
    Time(NaiveDateTime),
    Date(NaiveDate),
}

impl XValue {
    pub fn date(self) -> NaiveDate {
        match self {
            XValue::Time(t) => t.date(),
            XValue::Date(d) => d,
        }
    }
}

impl fmt::Display for XValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XValue::Time(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M")),
            XValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: XValue,
    pub y: f64,
}

/// One series handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub points: Vec<Point>,
    pub style: SeriesStyle,
}

impl ChartDataset {
    /// A solid series.
    pub fn solid(label: impl Into<String>, color_role: ColorRole, points: Vec<Point>) -> Self {
        Self {
            label: label.into(),
            points,
            style: SeriesStyle {
                dashed: false,
                color_role,
            },
        }
    }

    /// A dashed series.
    pub fn dashed(label: impl Into<String>, color_role: ColorRole, points: Vec<Point>) -> Self {
        Self {
            label: label.into(),
            points,
            style: SeriesStyle {
                dashed: true,
                color_role,
            },
        }
    }
}

/// Everything the renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub mode: AggregationMode,
    pub datasets: Vec<ChartDataset>,
}

impl AggregationResult {
    /// A result with nothing to draw.
    pub fn empty(mode: AggregationMode) -> Self {
        Self {
            mode,
            datasets: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn axis_unit(&self) -> AxisUnit {
        self.mode.axis_unit()
    }

    /// Look up a dataset by label.
    pub fn dataset(&self, label: &str) -> Option<&ChartDataset> {
        self.datasets.iter().find(|d| d.label == label)
    }

    /// The series every non-empty result leads with.
    pub fn primary(&self) -> Option<&ChartDataset> {
        self.datasets.first()
    }

    /// First and last x of the primary series.
    pub fn x_range(&self) -> Option<(XValue, XValue)> {
        let points = &self.primary()?.points;
        Some((points.first()?.x, points.last()?.x))
    }

    /// Full-day axis bounds for an intraday chart: 00:00:00 of the first
    /// plotted day to 23:59:59 of the last.
    ///
    /// A rolling one-day window usually straddles midnight, so the span can
    /// cover two calendar days.
    pub fn intraday_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        if self.mode != AggregationMode::Intraday {
            return None;
        }
        let (first, last) = self.x_range()?;
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)?;
        Some((
            first.date().and_time(NaiveTime::MIN),
            last.date().and_time(end_of_day),
        ))
    }
}

/// Metadata about a rendered chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Requested window.
    pub selector: WindowSelector,
    /// Periods paged back from now.
    pub offset: u32,
    /// Human-readable span, e.g. `1/5 - 1/11 (week)`.
    pub period_label: String,
    /// Window start (inclusive).
    pub window_start: NaiveDateTime,
    /// Window end (inclusive).
    pub window_end: NaiveDateTime,
    /// When the report was produced.
    pub generated_at: DateTime<Local>,
    /// Valid measurements in the log.
    pub measurements_loaded: usize,
    /// Log entries dropped as malformed.
    pub measurements_excluded: usize,
    /// Measurements inside the window.
    pub measurements_in_window: usize,
}

/// A chart description together with how it was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartReport {
    pub metadata: ReportMetadata,
    pub chart: AggregationResult,
}
