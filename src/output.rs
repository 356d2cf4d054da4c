//! Output types: the extracted receipt and the per-file / per-batch report.

use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Structured fields extracted from one receipt.
///
/// Field names on the wire are the camelCase keys of the response schema
/// (`companyName`, `priceWithoutVAT`, …). Every field is optional because
/// models omit what they cannot find; numeric fields are usually 0.0 instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(rename = "companyName", default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    #[serde(rename = "vatNumber", default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,

    #[serde(rename = "priceWithoutVAT", default, skip_serializing_if = "Option::is_none")]
    pub price_without_vat: Option<f64>,

    #[serde(rename = "vat", default, skip_serializing_if = "Option::is_none")]
    pub vat: Option<f64>,

    /// Percentage, e.g. `21.0` for 21 %.
    #[serde(rename = "vatRate", default, skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<f64>,

    #[serde(rename = "priceIncludingVAT", default, skip_serializing_if = "Option::is_none")]
    pub price_including_vat: Option<f64>,

    /// `dd.mm.yyyy`
    #[serde(rename = "dateOfSale", default, skip_serializing_if = "Option::is_none")]
    pub date_of_sale: Option<String>,
}

/// Where a file's result was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SavedOutput {
    /// Parsed and pretty-printed as `<basename>.json`.
    Json(PathBuf),
    /// The model's text was not valid JSON; saved verbatim as `<basename>.txt`.
    RawText(PathBuf),
}

impl SavedOutput {
    pub fn path(&self) -> &Path {
        match self {
            SavedOutput::Json(p) | SavedOutput::RawText(p) => p,
        }
    }
}

/// Coarse classification of a [`FileResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileOutcome {
    Extracted,
    RawFallback,
    Skipped,
    Failed,
}

/// Result of processing a single input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    /// Source file.
    pub path: PathBuf,
    /// Resolved MIME type, if any.
    pub mime_type: Option<String>,
    /// Raw text returned by the model.
    pub raw_response: Option<String>,
    /// Typed view of the response when it parsed and matched the receipt shape.
    pub receipt: Option<Receipt>,
    /// Written output file.
    pub saved: Option<SavedOutput>,
    /// Wall-clock time spent on this file.
    pub duration_ms: u64,
    /// Non-fatal error, if the file was skipped or failed.
    pub error: Option<FileError>,
}

impl FileResult {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            mime_type: None,
            raw_response: None,
            receipt: None,
            saved: None,
            duration_ms: 0,
            error: None,
        }
    }

    pub fn outcome(&self) -> FileOutcome {
        match (&self.saved, &self.error) {
            (Some(SavedOutput::Json(_)), _) => FileOutcome::Extracted,
            (Some(SavedOutput::RawText(_)), _) => FileOutcome::RawFallback,
            (None, Some(e)) if e.is_skip() => FileOutcome::Skipped,
            (None, _) => FileOutcome::Failed,
        }
    }
}

/// Aggregate counters for a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Files matching the pattern.
    pub discovered: usize,
    /// Files saved as `.json`.
    pub extracted: usize,
    /// Files saved as raw `.txt`.
    pub raw_fallbacks: usize,
    /// Files skipped because of their type.
    pub skipped: usize,
    /// Files that failed to read, extract or write.
    pub failed: usize,
    pub total_duration_ms: u64,
}

impl BatchStats {
    pub(crate) fn from_results(files: &[FileResult], total_duration_ms: u64) -> Self {
        let mut stats = BatchStats {
            discovered: files.len(),
            total_duration_ms,
            ..Default::default()
        };
        for f in files {
            match f.outcome() {
                FileOutcome::Extracted => stats.extracted += 1,
                FileOutcome::RawFallback => stats.raw_fallbacks += 1,
                FileOutcome::Skipped => stats.skipped += 1,
                FileOutcome::Failed => stats.failed += 1,
            }
        }
        stats
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutput {
    pub files: Vec<FileResult>,
    pub stats: BatchStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_uses_schema_field_names() {
        let json = r#"{
            "companyName": "Potraviny Novák s.r.o.",
            "vatNumber": "CZ12345678",
            "priceWithoutVAT": 100.0,
            "vat": 21.0,
            "vatRate": 21,
            "priceIncludingVAT": 121.0,
            "dateOfSale": "03.05.2024"
        }"#;
        let r: Receipt = serde_json::from_str(json).unwrap();
        assert_eq!(r.company_name.as_deref(), Some("Potraviny Novák s.r.o."));
        assert_eq!(r.vat_rate, Some(21.0));
        assert_eq!(r.date_of_sale.as_deref(), Some("03.05.2024"));
    }

    #[test]
    fn receipt_tolerates_missing_fields() {
        let r: Receipt = serde_json::from_str(r#"{"priceIncludingVAT": 59.9}"#).unwrap();
        assert_eq!(r.price_including_vat, Some(59.9));
        assert!(r.company_name.is_none());
        assert_eq!(serde_json::to_string(&r).unwrap(), r#"{"priceIncludingVAT":59.9}"#);
    }

    #[test]
    fn outcome_classification() {
        let mut r = FileResult::new("uctenka_1.pdf".into());
        r.error = Some(FileError::UnsupportedType {
            path: "uctenka_1.pdf".into(),
            mime_type: "text/plain".into(),
        });
        assert_eq!(r.outcome(), FileOutcome::Skipped);

        r.error = Some(FileError::RequestFailed {
            path: "uctenka_1.pdf".into(),
            detail: "HTTP 500".into(),
        });
        assert_eq!(r.outcome(), FileOutcome::Failed);

        r.error = None;
        r.saved = Some(SavedOutput::RawText("uctenka_1.txt".into()));
        assert_eq!(r.outcome(), FileOutcome::RawFallback);
    }

    #[test]
    fn stats_count_each_outcome() {
        let mut ok = FileResult::new("a.png".into());
        ok.saved = Some(SavedOutput::Json("a.json".into()));
        let mut raw = FileResult::new("b.png".into());
        raw.saved = Some(SavedOutput::RawText("b.txt".into()));
        let mut skipped = FileResult::new("c.doc".into());
        skipped.error = Some(FileError::UnknownMimeType { path: "c.doc".into() });
        let mut failed = FileResult::new("d.pdf".into());
        failed.error = Some(FileError::Timeout {
            path: "d.pdf".into(),
            secs: 5,
        });

        let stats = BatchStats::from_results(&[ok, raw, skipped, failed], 42);
        assert_eq!(stats.discovered, 4);
        assert_eq!(stats.extracted, 1);
        assert_eq!(stats.raw_fallbacks, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.total_duration_ms, 42);
    }
}
