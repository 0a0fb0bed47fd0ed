//! Fiscal obligations API.

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{
    CreateObligationRequest, Obligation, ObligationStatus, Page, UpdateObligationRequest,
};

/// Query parameters for listing obligations.
#[derive(Debug, Default, serde::Serialize)]
pub struct ListObligationsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ObligationStatus>,
    /// Competence period, e.g. `2026-09`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Obligations API client.
pub struct ObligationsApi {
    client: ApiClient,
}

impl ObligationsApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List obligations.
    pub async fn list(&self, query: &ListObligationsQuery) -> Result<Page<Obligation>> {
        self.client.get_with_query("obligations", query).await
    }

    /// Get an obligation by ID.
    pub async fn get(&self, id: &str) -> Result<Obligation> {
        self.client.get(&format!("obligations/{}", id)).await
    }

    /// Create an obligation.
    pub async fn create(&self, request: CreateObligationRequest) -> Result<Obligation> {
        self.client.post("obligations", &request).await
    }

    /// Update an obligation.
    pub async fn update(&self, id: &str, request: UpdateObligationRequest) -> Result<Obligation> {
        self.client
            .patch(&format!("obligations/{}", id), &request)
            .await
    }

    /// Mark an obligation as completed.
    pub async fn complete(&self, id: &str) -> Result<Obligation> {
        let request = UpdateObligationRequest {
            status: Some(ObligationStatus::Completed),
            ..Default::default()
        };
        self.update(id, request).await
    }
}
