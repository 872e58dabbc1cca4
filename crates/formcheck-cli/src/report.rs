//! Validation run summary

use chrono::NaiveDateTime;
use formcheck_compare::{AccuracyLevel, ComparisonFlag, Correction};
use serde::{Deserialize, Serialize};
use tabled::{settings::Style, Table, Tabled};

/// Outcome for one validated record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationEntry {
    pub filename: String,
    pub accuracy: f64,
    pub level: AccuracyLevel,
    pub is_accurate: bool,
    pub message: String,
    pub corrections: Vec<Correction>,
}

impl ValidationEntry {
    pub fn from_flag(filename: impl Into<String>, flag: ComparisonFlag) -> Self {
        ValidationEntry {
            filename: filename.into(),
            accuracy: flag.accuracy_percentage,
            level: flag.accuracy_level,
            is_accurate: flag.is_accurate,
            message: flag.message,
            corrections: flag.corrections,
        }
    }

    /// A record that could not be scored at all
    pub fn unreadable(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationEntry {
            filename: filename.into(),
            accuracy: 0.0,
            level: AccuracyLevel::Invalid,
            is_accurate: false,
            message: reason.into(),
            corrections: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_tested: usize,
    pub passed: usize,
    pub failed: usize,
    pub average_accuracy: f64,
}

impl ValidationSummary {
    pub fn from_entries(entries: &[ValidationEntry]) -> Self {
        let total_tested = entries.len();
        let passed = entries.iter().filter(|e| e.is_accurate).count();
        let average_accuracy = if total_tested == 0 {
            0.0
        } else {
            entries.iter().map(|e| e.accuracy).sum::<f64>() / total_tested as f64
        };

        ValidationSummary {
            total_tested,
            passed,
            failed: total_tested - passed,
            average_accuracy,
        }
    }

    /// Share of records in percent, 0 when nothing was tested
    pub fn percent(&self, count: usize) -> f64 {
        if self.total_tested == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total_tested as f64
        }
    }
}

/// Written by `formcheck validate --output`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub timestamp: NaiveDateTime,
    /// Files the baseline was built from
    pub baseline_files: Vec<String>,
    pub summary: ValidationSummary,
    pub results: Vec<ValidationEntry>,
}

impl ValidationReport {
    pub fn new(timestamp: NaiveDateTime, baseline_files: Vec<String>, results: Vec<ValidationEntry>) -> Self {
        ValidationReport {
            timestamp,
            baseline_files,
            summary: ValidationSummary::from_entries(&results),
            results,
        }
    }

    /// Results table, best accuracy first
    pub fn table(&self) -> String {
        let mut rows: Vec<ResultRow> = self
            .results
            .iter()
            .map(|entry| ResultRow {
                filename: entry.filename.clone(),
                accuracy: format!("{:.1}%", entry.accuracy),
                level: entry.level.to_string(),
                status: if entry.is_accurate { "PASS" } else { "FAIL" }.to_string(),
                sort_key: entry.accuracy,
            })
            .collect();
        rows.sort_by(|a, b| b.sort_key.total_cmp(&a.sort_key));

        Table::new(rows).with(Style::rounded()).to_string()
    }
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Filename")]
    filename: String,
    #[tabled(rename = "Accuracy")]
    accuracy: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(skip)]
    sort_key: f64,
}
