//! Licenses and permits API.

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{CreateLicenseRequest, License, Page, RenewLicenseRequest};

/// Query parameters for listing licenses.
#[derive(Debug, Default, serde::Serialize)]
pub struct ListLicensesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Only licenses expiring within this many days.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiring_within_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Licenses API client.
pub struct LicensesApi {
    client: ApiClient,
}

impl LicensesApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List licenses.
    pub async fn list(&self, query: &ListLicensesQuery) -> Result<Page<License>> {
        self.client.get_with_query("licenses", query).await
    }

    /// Get a license by ID.
    pub async fn get(&self, id: &str) -> Result<License> {
        self.client.get(&format!("licenses/{}", id)).await
    }

    /// Register a license.
    pub async fn create(&self, request: CreateLicenseRequest) -> Result<License> {
        self.client.post("licenses", &request).await
    }

    /// Record a renewal with the new expiry date.
    pub async fn renew(&self, id: &str, request: RenewLicenseRequest) -> Result<License> {
        self.client
            .post(&format!("licenses/{}/renew", id), &request)
            .await
    }

    /// Delete a license.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("licenses/{}", id)).await
    }
}
