//! Transactions and invoicing API.

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{
    CreateTransactionRequest, Page, Transaction, TransactionKind, TransactionStatus,
    UpdateTransactionRequest,
};

/// Query parameters for listing transactions.
#[derive(Debug, Default, serde::Serialize)]
pub struct ListTransactionsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Transactions API client.
pub struct TransactionsApi {
    client: ApiClient,
}

impl TransactionsApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List transactions.
    pub async fn list(&self, query: &ListTransactionsQuery) -> Result<Page<Transaction>> {
        self.client.get_with_query("transactions", query).await
    }

    /// Get a transaction by ID.
    pub async fn get(&self, id: &str) -> Result<Transaction> {
        self.client.get(&format!("transactions/{}", id)).await
    }

    /// Create a transaction.
    pub async fn create(&self, request: CreateTransactionRequest) -> Result<Transaction> {
        self.client.post("transactions", &request).await
    }

    /// Update a transaction.
    pub async fn update(
        &self,
        id: &str,
        request: UpdateTransactionRequest,
    ) -> Result<Transaction> {
        self.client
            .patch(&format!("transactions/{}", id), &request)
            .await
    }

    /// Delete a transaction.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("transactions/{}", id)).await
    }

    /// Issue the invoice for a receivable.
    pub async fn issue_invoice(&self, id: &str) -> Result<Transaction> {
        self.client
            .post(&format!("transactions/{}/invoice", id), &serde_json::json!({}))
            .await
    }

    /// Cancel the issued invoice of a receivable. The transaction itself stays.
    pub async fn cancel_invoice(&self, id: &str) -> Result<Transaction> {
        self.client
            .post(
                &format!("transactions/{}/invoice/cancel", id),
                &serde_json::json!({}),
            )
            .await
    }
}
