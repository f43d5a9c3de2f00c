//! Merging per-target results into one response.

use capsule_core::{ExportResponse, ExportResult, ExportSummary};

/// Transport-level class of an export response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    /// At least one target succeeded (partial success included).
    Ok,
    /// Every requested target failed.
    AllFailed,
}

/// A finished export: the response body and its status class.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub status: ExportStatus,
    pub response: ExportResponse,
}

/// Build the response for per-target results, in request order.
pub fn aggregate(exports: Vec<ExportResult>) -> ExportOutcome {
    let mut summary = ExportSummary {
        total_platforms: exports.len(),
        ..ExportSummary::default()
    };

    for export in &exports {
        if export.success {
            summary.successful_platforms.push(export.platform);
            summary.total_files += export.file_count;
            summary.total_size += export.total_size;
        } else {
            summary.failed_platforms.push(export.platform);
        }
    }

    let status = if !exports.is_empty() && summary.successful_platforms.is_empty() {
        ExportStatus::AllFailed
    } else {
        ExportStatus::Ok
    };

    ExportOutcome {
        status,
        response: ExportResponse {
            success: summary.failed_platforms.is_empty(),
            exports,
            summary,
        },
    }
}
