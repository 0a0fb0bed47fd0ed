//! Auth API.
//!
//! Login and logout live on [`ApiClient`] itself because they write the
//! token store; this wrapper covers the remaining account endpoints.

use crate::client::ApiClient;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::types::{ChangePasswordRequest, User};

/// Auth API client.
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Profile of the logged-in user.
    pub async fn me(&self) -> Result<User> {
        self.client.get("auth/me").await
    }

    /// Change the logged-in user's password.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<()> {
        let request = ChangePasswordRequest {
            current_password: current.to_string(),
            new_password: new.to_string(),
        };
        self.client
            .execute(ApiRequest::post("auth/change-password").json(&request)?)
            .await?;
        Ok(())
    }
}
