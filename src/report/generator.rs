//! Chart report generation.
//!
//! This module renders a [`ChartReport`] as Markdown for humans or as JSON
//! for a rendering front end.

use crate::models::{
    AggregationMode, AxisUnit, ChartDataset, ChartReport, ColorRole, ReportMetadata,
};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &ChartReport) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Weight Chart\n\n");

    // Metadata section
    output.push_str(&generate_metadata_section(
        &report.metadata,
        report.chart.mode,
    ));

    // Datasets
    output.push_str(&generate_datasets_section(report));

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata, mode: AggregationMode) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Window:** {} ({})\n",
        metadata.selector, metadata.period_label
    ));
    if metadata.offset > 0 {
        section.push_str(&format!(
            "- **Offset:** {} period(s) back\n",
            metadata.offset
        ));
    }
    section.push_str(&format!(
        "- **Range:** {} to {}\n",
        metadata.window_start.format("%Y-%m-%d %H:%M"),
        metadata.window_end.format("%Y-%m-%d %H:%M")
    ));
    section.push_str(&format!("- **Mode:** {}\n", mode));
    section.push_str(&format!(
        "- **Axis Unit:** {}\n",
        match mode.axis_unit() {
            AxisUnit::Hour => "hour",
            AxisUnit::Day => "day",
        }
    ));
    section.push_str(&format!(
        "- **Measurements:** {} in window / {} loaded\n",
        metadata.measurements_in_window, metadata.measurements_loaded
    ));
    if metadata.measurements_excluded > 0 {
        section.push_str(&format!(
            "- **Excluded Entries:** {}\n",
            metadata.measurements_excluded
        ));
    }
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    section.push('\n');

    section
}

/// Generate one table per dataset.
fn generate_datasets_section(report: &ChartReport) -> String {
    let mut section = String::new();

    section.push_str("## Datasets\n\n");

    if report.chart.is_empty() {
        section.push_str("No data for this period.\n\n");
        return section;
    }

    if let Some((first, last)) = report.chart.x_range() {
        section.push_str(&format!("*Showing {} to {}*\n\n", first, last));
    }
    if let Some((start, end)) = report.chart.intraday_bounds() {
        section.push_str(&format!(
            "*Hour axis: {} to {}*\n\n",
            start.format("%Y-%m-%d %H:%M:%S"),
            end.format("%Y-%m-%d %H:%M:%S")
        ));
    }

    for dataset in &report.chart.datasets {
        section.push_str(&generate_dataset_table(dataset));
    }

    section
}

/// Generate the table for a single dataset.
fn generate_dataset_table(dataset: &ChartDataset) -> String {
    let mut table = String::new();

    let line = if dataset.style.dashed { "dashed" } else { "solid" };
    table.push_str(&format!(
        "### {}\n\n*{} line, {} color, {} point(s)*\n\n",
        dataset.label,
        line,
        color_name(dataset.style.color_role),
        dataset.points.len()
    ));

    table.push_str("| x | y |\n");
    table.push_str("|:---|---:|\n");
    for point in &dataset.points {
        table.push_str(&format!("| {} | {:.2} |\n", point.x, point.y));
    }
    table.push('\n');

    table
}

fn color_name(role: ColorRole) -> &'static str {
    match role {
        ColorRole::Primary => "primary",
        ColorRole::Max => "max",
        ColorRole::Min => "min",
        ColorRole::Comparison => "comparison",
    }
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Generated by weightchart*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &ChartReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered output to `path`, or to stdout when no path is given.
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let mut file = std::fs::File::create(path)?;
            file.write_all(content.as_bytes())?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                handle.write_all(b"\n")?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AggregationResult, Point, WindowSelector, XValue};
    use chrono::{Local, NaiveDate, NaiveDateTime};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn create_test_report(chart: AggregationResult) -> ChartReport {
        ChartReport {
            metadata: ReportMetadata {
                selector: WindowSelector::WEEK,
                offset: 0,
                period_label: "1/5 - 1/11 (week)".to_string(),
                window_start: at("2025-01-04 21:00"),
                window_end: at("2025-01-11 21:00"),
                generated_at: Local::now(),
                measurements_loaded: 4,
                measurements_excluded: 1,
                measurements_in_window: 3,
            },
            chart,
        }
    }

    fn weekly_chart() -> AggregationResult {
        let d = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        AggregationResult {
            mode: AggregationMode::DailyAggregate,
            datasets: vec![
                ChartDataset::solid(
                    "average",
                    ColorRole::Primary,
                    vec![Point {
                        x: XValue::Date(d),
                        y: 72.85,
                    }],
                ),
                ChartDataset::dashed(
                    "max",
                    ColorRole::Max,
                    vec![Point {
                        x: XValue::Date(d),
                        y: 73.2,
                    }],
                ),
            ],
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report(weekly_chart());
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Weight Chart"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("1/5 - 1/11 (week)"));
        assert!(markdown.contains("Daily aggregate"));
        assert!(markdown.contains("### average"));
        assert!(markdown.contains("| 2025-01-10 | 72.85 |"));
        assert!(markdown.contains("dashed line, max color"));
        assert!(markdown.contains("Excluded Entries:** 1"));
    }

    #[test]
    fn test_empty_chart_markdown() {
        let report = create_test_report(AggregationResult::empty(AggregationMode::Intraday));
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("No data for this period."));
        assert!(markdown.contains("**Axis Unit:** hour"));
        assert!(!markdown.contains("###"));
    }

    #[test]
    fn test_intraday_markdown_shows_hour_axis() {
        let report = create_test_report(AggregationResult {
            mode: AggregationMode::Intraday,
            datasets: vec![ChartDataset::solid(
                "value",
                ColorRole::Primary,
                vec![
                    Point {
                        x: XValue::Time(at("2025-01-10 20:00")),
                        y: 73.2,
                    },
                    Point {
                        x: XValue::Time(at("2025-01-11 07:30")),
                        y: 72.8,
                    },
                ],
            )],
        });
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("*Hour axis: 2025-01-10 00:00:00 to 2025-01-11 23:59:59*"));
        assert!(markdown.contains("| 2025-01-11 07:30 | 72.80 |"));
    }

    #[test]
    fn test_daily_markdown_has_no_hour_axis() {
        let markdown = generate_markdown_report(&create_test_report(weekly_chart()));
        assert!(!markdown.contains("Hour axis"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report(weekly_chart());
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"mode\": \"daily_aggregate\""));
        assert!(json.contains("\"colorRole\": \"primary\""));
        assert!(json.contains("\"selector\": 7"));
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.md");

        write_output("hello", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }
}
