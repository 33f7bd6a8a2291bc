use async_trait::async_trait;

use super::DBClient;
use crate::models::reportmodel::{Report, ReportStatus};

#[async_trait]
pub trait ReportExt {
    /// Newest first. `None` returns every report.
    async fn get_reports(&self, status: Option<ReportStatus>) -> Vec<Report>;
}

#[async_trait]
impl ReportExt for DBClient {
    async fn get_reports(&self, status: Option<ReportStatus>) -> Vec<Report> {
        self.read(|c| {
            let mut reports: Vec<Report> = c
                .reports
                .iter()
                .filter(|r| status.map_or(true, |s| r.status == s))
                .cloned()
                .collect();
            reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            reports
        })
        .await
    }
}
