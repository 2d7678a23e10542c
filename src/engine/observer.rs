//! Observability hook for the aggregation pipeline.
//!
//! The engine never writes anything itself; callers that want to see what it
//! decided plug in an observer.

use super::window::Window;
use crate::models::{AggregationResult, WindowSelector};
use tracing::debug;

/// Receives a report from each stage of [`super::ChartEngine::run`].
///
/// Every method defaults to doing nothing.
pub trait AggregationObserver {
    fn on_window(&self, _selector: WindowSelector, _offset: u32, _window: &Window) {}

    fn on_filtered(&self, _total: usize, _kept: usize) {}

    fn on_result(&self, _result: &AggregationResult) {}
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AggregationObserver for NoopObserver {}

/// Emits each report as a `tracing` debug event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AggregationObserver for TracingObserver {
    fn on_window(&self, selector: WindowSelector, offset: u32, window: &Window) {
        debug!(
            "Window for {} (offset {}): {} .. {}",
            selector, offset, window.start, window.end
        );
    }

    fn on_filtered(&self, total: usize, kept: usize) {
        debug!("Filtered {} of {} measurements into the window", kept, total);
    }

    fn on_result(&self, result: &AggregationResult) {
        debug!(
            "{} chart with {} dataset(s)",
            result.mode,
            result.datasets.len()
        );
        for dataset in &result.datasets {
            debug!("  {}: {} point(s)", dataset.label, dataset.points.len());
        }
    }
}

impl<T: AggregationObserver + ?Sized> AggregationObserver for &T {
    fn on_window(&self, selector: WindowSelector, offset: u32, window: &Window) {
        (**self).on_window(selector, offset, window)
    }

    fn on_filtered(&self, total: usize, kept: usize) {
        (**self).on_filtered(total, kept)
    }

    fn on_result(&self, result: &AggregationResult) {
        (**self).on_result(result)
    }
}
