//! Clients (companies) API.

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{ClientStatus, Company, CreateCompanyRequest, Page, UpdateCompanyRequest};

/// Query parameters for listing clients.
#[derive(Debug, Default, serde::Serialize)]
pub struct ListClientsQuery {
    /// Match against legal name, trade name or tax id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ClientStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Clients API client.
pub struct ClientsApi {
    client: ApiClient,
}

impl ClientsApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List client companies.
    pub async fn list(&self, query: &ListClientsQuery) -> Result<Page<Company>> {
        self.client.get_with_query("clients", query).await
    }

    /// Get a client by ID.
    pub async fn get(&self, id: &str) -> Result<Company> {
        self.client.get(&format!("clients/{}", id)).await
    }

    /// Register a new client.
    pub async fn create(&self, request: CreateCompanyRequest) -> Result<Company> {
        self.client.post("clients", &request).await
    }

    /// Update a client.
    pub async fn update(&self, id: &str, request: UpdateCompanyRequest) -> Result<Company> {
        self.client.patch(&format!("clients/{}", id), &request).await
    }

    /// Delete a client.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("clients/{}", id)).await
    }
}
