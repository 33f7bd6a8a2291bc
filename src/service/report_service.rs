// service/report_service.rs
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::DBClient,
    models::reportmodel::{ContentType, Report, ReportStatus, GENERAL_CONTENT_ID},
    service::error::ServiceError,
};

#[derive(Debug)]
pub struct ReportService {
    db_client: Arc<DBClient>,
}

impl ReportService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    /// Files a report. A listing target that cannot be matched to an existing
    /// listing is recorded as a general user report.
    pub async fn report(
        &self,
        reporter_id: Uuid,
        target_type: ContentType,
        target_id: Option<&str>,
        reason: &str,
    ) -> Result<Report, ServiceError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ServiceError::Validation("A reason is required".to_string()));
        }

        let listing_id = match target_type {
            ContentType::Listing => target_id.and_then(|id| Uuid::parse_str(id.trim()).ok()),
            ContentType::User => None,
        };

        let report = self
            .db_client
            .write(|c| -> Result<Report, ServiceError> {
                let (content_type, content_id) = match listing_id {
                    Some(id) if c.listing(id).is_some() => (ContentType::Listing, id.to_string()),
                    _ => (ContentType::User, GENERAL_CONTENT_ID.to_string()),
                };

                let report = Report {
                    id: Uuid::new_v4(),
                    reporter_id,
                    content_type,
                    content_id,
                    reason: reason.to_string(),
                    status: ReportStatus::Pending,
                    resolved_by: None,
                    resolved_at: None,
                    created_at: Utc::now(),
                };
                c.reports.push(report.clone());
                Ok(report)
            })
            .await?;

        tracing::info!(
            "Report {} filed by {} against {:?}:{}",
            report.id,
            reporter_id,
            report.content_type,
            report.content_id
        );

        Ok(report)
    }

    pub async fn resolve(&self, report_id: Uuid, admin_id: Uuid) -> Result<Report, ServiceError> {
        self.close(report_id, admin_id, ReportStatus::Resolved).await
    }

    pub async fn dismiss(&self, report_id: Uuid, admin_id: Uuid) -> Result<Report, ServiceError> {
        self.close(report_id, admin_id, ReportStatus::Dismissed).await
    }

    async fn close(
        &self,
        report_id: Uuid,
        admin_id: Uuid,
        outcome: ReportStatus,
    ) -> Result<Report, ServiceError> {
        self.db_client
            .write(|c| -> Result<Report, ServiceError> {
                let report = c
                    .reports
                    .iter_mut()
                    .find(|r| r.id == report_id)
                    .ok_or(ServiceError::ReportNotFound(report_id))?;

                if report.status != ReportStatus::Pending {
                    return Err(ServiceError::InvalidReportStatus(report_id, report.status));
                }

                report.status = outcome;
                report.resolved_by = Some(admin_id);
                report.resolved_at = Some(Utc::now());
                Ok(report.clone())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{listing_dto, TestApp};

    #[tokio::test]
    async fn test_report_existing_listing() {
        let app = TestApp::new().await;
        let owner = app.owner("owner@example.com").await;
        let renter = app.renter("renter@example.com").await;
        let (listing, _) = app.listings.submit(&owner, listing_dto("Modern 3BR", 2500.0)).await.unwrap();
        let target = listing.id.to_string();

        let report = app
            .reports
            .report(renter.id, ContentType::Listing, Some(&target), "Fake photos")
            .await
            .unwrap();

        assert_eq!(report.content_type, ContentType::Listing);
        assert_eq!(report.content_id, target);
        assert_eq!(report.status, ReportStatus::Pending);
    }

    #[tokio::test]
    async fn test_missing_listing_falls_back_to_general() {
        let app = TestApp::new().await;
        let renter = app.renter("renter@example.com").await;
        let deleted = Uuid::new_v4().to_string();

        let report = app
            .reports
            .report(renter.id, ContentType::Listing, Some(&deleted), "Scam")
            .await
            .unwrap();
        assert_eq!(report.content_type, ContentType::User);
        assert_eq!(report.content_id, "general");

        let no_target = app
            .reports
            .report(renter.id, ContentType::Listing, None, "Scam")
            .await
            .unwrap();
        assert_eq!(no_target.content_id, GENERAL_CONTENT_ID);
    }

    #[tokio::test]
    async fn test_resolution_is_one_way() {
        let app = TestApp::new().await;
        let renter = app.renter("renter@example.com").await;
        let admin = Uuid::new_v4();
        let report = app
            .reports
            .report(renter.id, ContentType::User, None, "Rude owner")
            .await
            .unwrap();

        let resolved = app.reports.resolve(report.id, admin).await.unwrap();
        assert_eq!(resolved.status, ReportStatus::Resolved);
        assert_eq!(resolved.resolved_by, Some(admin));
        assert_eq!(resolved.reason, report.reason);

        let dismissed = app.reports.dismiss(report.id, admin).await;
        assert!(matches!(
            dismissed,
            Err(ServiceError::InvalidReportStatus(_, ReportStatus::Resolved))
        ));

        let unknown = app.reports.resolve(Uuid::new_v4(), admin).await;
        assert!(matches!(unknown, Err(ServiceError::ReportNotFound(_))));

        let blank = app.reports.report(renter.id, ContentType::User, None, " ").await;
        assert!(matches!(blank, Err(ServiceError::Validation(_))));
    }
}
