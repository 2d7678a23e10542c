//! weightchart - aggregation engine for weight-tracking charts.
//!
//! Given a log of measurements and a requested display window, decides which
//! series a chart should draw: raw timed points for a single day, or per-day
//! average/max/min for longer spans. The result is a plain data description;
//! drawing it is up to the caller.

pub mod engine;
pub mod error;
pub mod ingest;
pub mod models;
pub mod report;

pub use engine::{ChartEngine, ChartRun, EngineOptions};
pub use error::{MeasurementError, SelectorError};
pub use models::{
    AggregationMode, AggregationResult, ChartDataset, ColorRole, Measurement, OffsetUnit,
    WindowSelector,
};
