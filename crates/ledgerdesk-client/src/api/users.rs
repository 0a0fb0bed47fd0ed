//! User administration API.

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{CreateUserRequest, Page, UpdateUserRequest, User, UserRole};

/// Query parameters for listing users.
#[derive(Debug, Default, serde::Serialize)]
pub struct ListUsersQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    /// Include deactivated accounts.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub include_inactive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Users API client.
pub struct UsersApi {
    client: ApiClient,
}

impl UsersApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List users.
    pub async fn list(&self, query: &ListUsersQuery) -> Result<Page<User>> {
        self.client.get_with_query("users", query).await
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> Result<User> {
        self.client.get(&format!("users/{}", id)).await
    }

    /// Create a user.
    pub async fn create(&self, request: CreateUserRequest) -> Result<User> {
        self.client.post("users", &request).await
    }

    /// Update a user.
    pub async fn update(&self, id: &str, request: UpdateUserRequest) -> Result<User> {
        self.client.patch(&format!("users/{}", id), &request).await
    }

    /// Deactivate a user without deleting their history.
    pub async fn deactivate(&self, id: &str) -> Result<User> {
        let request = UpdateUserRequest {
            is_active: Some(false),
            ..Default::default()
        };
        self.update(id, request).await
    }
}
