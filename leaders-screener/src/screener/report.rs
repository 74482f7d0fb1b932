//! Report generation for screening runs.
//!
//! Produces the flat screening table: `Symbol`, `Company Name`, then one
//! column per period reported by any passing company, most recent first.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::export::{write_artifact, ExportError};

use super::engine::ScreeningRun;
use super::quantitative::ScreeningResult;

// ============================================================================
// Screener Report
// ============================================================================

/// Report generator for a screening run.
pub struct ScreenerReport<'a> {
    run: &'a ScreeningRun,
}

impl<'a> ScreenerReport<'a> {
    pub fn new(run: &'a ScreeningRun) -> Self {
        Self { run }
    }

    /// Period columns across all results, most recent first.
    ///
    /// Period keys are report dates, so descending string order is
    /// descending time order.
    pub fn period_columns(&self) -> Vec<String> {
        period_columns(&self.run.results)
    }

    /// Render the table as UTF-8 CSV with a header row.
    pub fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        let periods = self.period_columns();
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["Symbol".to_string(), "Company Name".to_string()];
        header.extend(periods.iter().cloned());
        writer.write_record(&header)?;

        for result in &self.run.results {
            let mut row = vec![result.symbol.clone(), result.name.clone()];
            row.extend(periods.iter().map(|p| match result.roe.get(p) {
                Some(value) => format!("{:.2}", value),
                None => String::new(),
            }));
            writer.write_record(&row)?;
        }

        writer
            .into_inner()
            .map_err(|e| ExportError::Flush(e.into_error().to_string()))
    }

    /// Write the CSV to `path`, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> Result<PathBuf, ExportError> {
        let bytes = self.to_csv()?;
        write_artifact(path, &bytes)
    }

    /// One block of plain text for the terminal.
    pub fn to_summary(&self) -> String {
        let mut out = format!(
            "ROE screen {} ({})\n{}\n",
            self.run.id, self.run.config_summary, self.run.summary()
        );
        for result in &self.run.results {
            let latest = result
                .roe
                .iter()
                .next()
                .map(|r| format!("{:.2}% ({})", r.value, r.period))
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(
                "  {:<8} {:<32} latest {}\n",
                result.symbol, result.name, latest
            ));
        }
        out
    }
}

fn period_columns(results: &[ScreeningResult]) -> Vec<String> {
    let periods: BTreeSet<&str> = results
        .iter()
        .flat_map(|r| r.roe.iter().map(|reading| reading.period.as_str()))
        .collect();
    periods.into_iter().rev().map(String::from).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReturnOnEquitySeries;
    use crate::screener::FilterResult;
    use chrono::Utc;

    fn run(results: Vec<ScreeningResult>) -> ScreeningRun {
        let now = Utc::now();
        ScreeningRun {
            id: "screen_test".into(),
            filter: FilterResult::new(results.len(), results.len()),
            total_scanned: results.len(),
            results,
            config_summary: "ROE > 15% in every period".into(),
            warnings: Vec::new(),
            started_at: now,
            completed_at: now,
            duration_secs: 0.0,
        }
    }

    fn result(symbol: &str, name: &str, pairs: &[(&str, f64)]) -> ScreeningResult {
        ScreeningResult {
            symbol: symbol.into(),
            name: name.into(),
            roe: ReturnOnEquitySeries::from_pairs(pairs.iter().map(|(p, v)| (*p, *v))),
        }
    }

    #[test]
    fn test_csv_union_of_periods_most_recent_first() {
        let run = run(vec![
            result("AAPL", "Apple Inc.", &[("2023-09-30", 156.08), ("2022-09-24", 175.46)]),
            result("KO", "Coca-Cola", &[("2023-12-31", 40.1)]),
        ]);
        let csv = String::from_utf8(ScreenerReport::new(&run).to_csv().unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Symbol,Company Name,2023-12-31,2023-09-30,2022-09-24");
        assert_eq!(lines[1], "AAPL,Apple Inc.,,156.08,175.46");
        assert_eq!(lines[2], "KO,Coca-Cola,40.10,,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_empty_run_has_header_only() {
        let run = run(Vec::new());
        let csv = String::from_utf8(ScreenerReport::new(&run).to_csv().unwrap()).unwrap();
        assert_eq!(csv, "Symbol,Company Name\n");
    }

    #[test]
    fn test_csv_quotes_names_with_commas() {
        let run = run(vec![result("BRK-B", "Berkshire Hathaway, Inc.", &[("2023", 20.0)])]);
        let csv = String::from_utf8(ScreenerReport::new(&run).to_csv().unwrap()).unwrap();
        assert!(csv.contains("\"Berkshire Hathaway, Inc.\""));
    }

    #[test]
    fn test_save_to_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("screen.csv");
        let run = run(vec![result("MSFT", "Microsoft", &[("2024-06-30", 37.13)])]);

        let written = ScreenerReport::new(&run).save_to_file(&path).unwrap();
        assert_eq!(written, path);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Symbol,Company Name,2024-06-30"));
    }

    #[test]
    fn test_summary_lists_results() {
        let run = run(vec![result("MSFT", "Microsoft", &[("2024-06-30", 37.13)])]);
        let summary = ScreenerReport::new(&run).to_summary();
        assert!(summary.contains("MSFT"));
        assert!(summary.contains("37.13% (2024-06-30)"));
    }
}
