//! Reports API.

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{GenerateReportRequest, Page, Report, ReportKind};

/// Query parameters for listing reports.
#[derive(Debug, Default, serde::Serialize)]
pub struct ListReportsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ReportKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Reports API client.
pub struct ReportsApi {
    client: ApiClient,
}

impl ReportsApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List generated reports.
    pub async fn list(&self, query: &ListReportsQuery) -> Result<Page<Report>> {
        self.client.get_with_query("reports", query).await
    }

    /// Get a report by ID.
    pub async fn get(&self, id: &str) -> Result<Report> {
        self.client.get(&format!("reports/{}", id)).await
    }

    /// Queue a report for generation.
    pub async fn generate(&self, request: GenerateReportRequest) -> Result<Report> {
        self.client.post("reports", &request).await
    }
}
