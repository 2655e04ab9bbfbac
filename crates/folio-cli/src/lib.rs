//! Helpers shared by the folio command-line tools.

use folio_services::CleanupReport;
use serde::Serialize;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Output of a dry run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunSummary {
    pub retention_days: i64,
    pub would_clean: usize,
}

pub fn format_dry_run(summary: &DryRunSummary) -> String {
    format!(
        "Dry run: {} asset(s) soft-deleted more than {} day(s) ago would be purged",
        summary.would_clean, summary.retention_days
    )
}

pub fn format_report(report: &CleanupReport, retention_days: i64) -> String {
    let mut out = format!(
        "Cleanup (retention {} day(s)): cleaned {}, skipped {}, failed {}, orphaned files {}",
        retention_days, report.cleaned, report.skipped, report.failed, report.orphaned_files
    );
    for err in &report.errors {
        out.push_str(&format!(
            "\n  {} ({}): {}",
            err.id, err.storage_key, err.reason
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_services::CleanupItemError;

    #[test]
    fn format_report_lists_errors() {
        let id = uuid::Uuid::new_v4();
        let report = CleanupReport {
            cleaned: 2,
            failed: 1,
            errors: vec![CleanupItemError {
                id,
                storage_key: "2026/10/abc-cv.pdf".to_string(),
                reason: "Database error: connection reset".to_string(),
            }],
            ..Default::default()
        };

        let text = format_report(&report, 30);
        assert!(text.starts_with("Cleanup (retention 30 day(s)): cleaned 2, skipped 0, failed 1"));
        assert!(text.contains(&format!("{} (2026/10/abc-cv.pdf): Database error", id)));
    }

    #[test]
    fn format_dry_run_counts() {
        let text = format_dry_run(&DryRunSummary {
            retention_days: 7,
            would_clean: 3,
        });
        assert_eq!(
            text,
            "Dry run: 3 asset(s) soft-deleted more than 7 day(s) ago would be purged"
        );
    }

    #[test]
    fn dry_run_serializes_camel_case() {
        let json = serde_json::to_value(DryRunSummary {
            retention_days: 30,
            would_clean: 0,
        })
        .unwrap();
        assert_eq!(json["retentionDays"], 30);
        assert_eq!(json["wouldClean"], 0);
    }
}
