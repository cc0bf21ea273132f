use crate::domain::inspection::{latest_inspections, Inspection};
use crate::infrastructure::record_store::RecordStore;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportStats {
    pub total: usize,
    /// Inspections whose status is anything but `Pending`.
    pub completed: usize,
    pub pending_compliance: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportSummary {
    pub stats: ReportStats,
    pub inspections: Vec<Inspection>,
}

pub struct ReportsUseCase {
    store: Arc<RecordStore>,
}

impl ReportsUseCase {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    pub async fn summary(&self) -> ReportSummary {
        let inspections = latest_inspections(self.store.inspections().await);
        let compliance = self.store.compliance_entries().await;

        let stats = ReportStats {
            total: inspections.len(),
            completed: inspections.iter().filter(|i| !i.is_pending()).count(),
            pending_compliance: compliance.iter().filter(|c| c.is_pending()).count(),
        };

        ReportSummary { stats, inspections }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sheet::Table;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_summary_counts_latest_versions() {
        let (sheets, _, store) = RecordStore::in_memory();
        sheets.seed(
            Table::Inspections,
            &[
                &["a1", "S1", "O", "", "", "Pending", ""],
                &["b2", "S2", "O", "", "", "Pending", ""],
                &["a1", "S1", "O", "", "", "B+", ""],
                &["c3", "S3", "O", "", "", "", ""],
            ],
        );
        sheets.seed(
            Table::Compliance,
            &[
                &["a1", "r1", "", "", "Pending"],
                &["a1", "r2", "ok", "done", "Closed"],
                &["b2", "r3", "", "", "Pending"],
            ],
        );

        let summary = ReportsUseCase::new(Arc::new(store)).summary().await;

        assert_eq!(
            summary.stats,
            ReportStats {
                total: 3,
                completed: 2,
                pending_compliance: 2,
            }
        );
        assert_eq!(summary.inspections[0].status, "B+");
    }

    #[tokio::test]
    async fn test_summary_empty_when_sheet_unreachable() {
        let (sheets, _, store) = RecordStore::in_memory();
        sheets.set_failing(true);

        let summary = ReportsUseCase::new(Arc::new(store)).summary().await;

        assert_eq!(summary.stats, ReportStats::default());
        assert!(summary.inspections.is_empty());
    }
}
