//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{
    AuthApi, ClientsApi, LicensesApi, ObligationsApi, PortalApi, ReportsApi, TransactionsApi,
    UsersApi,
};
use crate::error::{Error, Result};
use crate::refresh::{RefreshCoordinator, RefreshRotation};
use crate::request::{ApiRequest, Body, Payload, read_payload};
use crate::token_store::TokenStore;
use crate::types::{LoginRequest, LoginResponse};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for the token refresh call.
const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

/// Ledgerdesk API client.
///
/// Injects the current access token into every request and transparently
/// refreshes it when the backend answers 401. Clones share tokens and
/// refresh state.
///
/// # Example
///
/// ```no_run
/// use ledgerdesk_client::{ApiClient, TokenStore};
///
/// # async fn example() -> ledgerdesk_client::Result<()> {
/// let client = ApiClient::builder()
///     .base_url("http://localhost:8000/api/v1")
///     .token_store(TokenStore::in_memory())
///     .build()?;
///
/// client.login("owner@office.example", "secret").await?;
/// let page = client.clients().list(&Default::default()).await?;
/// println!("{} clients", page.total);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    /// HTTP client.
    http: reqwest::Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Request timeout.
    timeout: Duration,
    /// Current tokens.
    tokens: TokenStore,
    /// Single-flight refresh state.
    refresh: RefreshCoordinator,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The token store this client reads and refreshes.
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// True while an access-token refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────

    /// Log in with email and password and store the returned tokens.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let request = ApiRequest::post("auth/login").json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;

        // Never carries a stale token and never triggers a refresh.
        let response: LoginResponse = self.send_once(&request, None).await?.decode()?;
        self.inner
            .tokens
            .set_tokens(response.access_token.as_str(), response.refresh_token.as_str())?;

        tracing::info!(user = %response.user.email, "Logged in");
        Ok(response)
    }

    /// End the session locally by clearing both tokens.
    pub fn logout(&self) -> Result<()> {
        self.inner.tokens.clear_tokens()?;
        tracing::info!("Logged out");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the auth API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the clients (companies) API.
    pub fn clients(&self) -> ClientsApi {
        ClientsApi::new(self.clone())
    }

    /// Access the fiscal obligations API.
    pub fn obligations(&self) -> ObligationsApi {
        ObligationsApi::new(self.clone())
    }

    /// Access the transactions and invoicing API.
    pub fn transactions(&self) -> TransactionsApi {
        TransactionsApi::new(self.clone())
    }

    /// Access the licenses and permits API.
    pub fn licenses(&self) -> LicensesApi {
        LicensesApi::new(self.clone())
    }

    /// Access the reports API.
    pub fn reports(&self) -> ReportsApi {
        ReportsApi::new(self.clone())
    }

    /// Access the user administration API.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    /// Access the client portal API.
    pub fn portal(&self) -> PortalApi {
        PortalApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request execution
    // ─────────────────────────────────────────────────────────────────────────

    /// Execute a request, refreshing the access token once on 401.
    pub async fn execute(&self, request: ApiRequest) -> Result<Payload> {
        let sent_with = if request.has_explicit_auth() {
            None
        } else {
            self.inner.tokens.access_token()
        };

        let response = self.send(&request, sent_with.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED || request.has_explicit_auth() {
            return read_payload(response).await;
        }

        let unauthorized = match read_payload(response).await {
            Err(e) => e,
            Ok(payload) => return Ok(payload),
        };

        self.inner
            .refresh
            .recover(self, request, sent_with, unauthorized)
            .await
    }

    /// Make a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(ApiRequest::get(path)).await?.decode()
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(ApiRequest::get(path).query(query)?)
            .await?
            .decode()
    }

    /// Make a POST request.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::post(path).json(body)?)
            .await?
            .decode()
    }

    /// Make a PATCH request.
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::patch(path).json(body)?)
            .await?
            .decode()
    }

    /// Make a PUT request.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::put(path).json(body)?)
            .await?
            .decode()
    }

    /// Make a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(ApiRequest::delete(path)).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.inner.refresh
    }

    /// Send one attempt and normalize the outcome, without refresh handling.
    pub(crate) async fn send_once(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<Payload> {
        let response = self.send(request, token).await?;
        read_payload(response).await
    }

    /// Send one attempt. A caller-supplied `Authorization` header wins over `token`.
    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<reqwest::Response> {
        let url = self.url(&request.path)?;
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .headers(request.headers.clone())
            .timeout(self.inner.timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(token) = token
            && !request.has_explicit_auth()
        {
            builder = builder.bearer_auth(token);
        }

        match &request.body {
            Some(Body::Json(value)) => {
                if !request.headers.contains_key(CONTENT_TYPE) {
                    builder = builder.header(CONTENT_TYPE, "application/json");
                }
                builder = builder.body(serde_json::to_vec(value)?);
            }
            Some(Body::Raw(bytes)) => {
                builder = builder.body(bytes.clone());
            }
            None => {}
        }

        tracing::debug!(method = %request.method, path = %request.path, "Sending request");
        Ok(builder.send().await?)
    }
}

/// Builder for creating an ApiClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    tokens: Option<TokenStore>,
    timeout: Duration,
    refresh_timeout: Duration,
    rotation: RefreshRotation,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            tokens: None,
            timeout: DEFAULT_TIMEOUT,
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            rotation: RefreshRotation::default(),
            user_agent: None,
        }
    }

    /// Set the base URL for the backend API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the token store. Defaults to an in-memory store.
    pub fn token_store(mut self, tokens: TokenStore) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout for the token refresh call.
    pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Set how a refresh token returned by the refresh endpoint is handled.
    pub fn refresh_rotation(mut self, rotation: RefreshRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ApiClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("ledgerdesk-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                tokens: self.tokens.unwrap_or_else(TokenStore::in_memory),
                refresh: RefreshCoordinator::new(self.refresh_timeout, self.rotation),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
