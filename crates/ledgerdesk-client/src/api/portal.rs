//! Client portal API.
//!
//! Endpoints scoped to the company of the logged-in portal user.

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{Obligation, PortalDashboard, PortalDocument};

/// Portal API client.
pub struct PortalApi {
    client: ApiClient,
}

impl PortalApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Dashboard for the portal user's company.
    pub async fn dashboard(&self) -> Result<PortalDashboard> {
        self.client.get("portal/dashboard").await
    }

    /// Documents shared with the company.
    pub async fn documents(&self) -> Result<Vec<PortalDocument>> {
        self.client.get("portal/documents").await
    }

    /// The company's obligations.
    pub async fn obligations(&self) -> Result<Vec<Obligation>> {
        self.client.get("portal/obligations").await
    }
}
