use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::reportmodel::{ContentType, ReportStatus};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReportDto {
    pub target_type: ContentType,
    /// Listing id as a string, or anything else for general reports.
    #[serde(default)]
    pub target_id: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "Please describe the problem"))]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportQueryDto {
    pub status: Option<ReportStatus>,
}
