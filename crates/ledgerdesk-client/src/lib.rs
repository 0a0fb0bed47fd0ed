//! Authenticated HTTP client for the Ledgerdesk accounting-office API.
//!
//! This crate provides a typed client for the backend that serves the
//! office's client registry, fiscal obligations, invoicing, license tracking,
//! reports, user administration and client portal.
//!
//! # Example
//!
//! ```no_run
//! use ledgerdesk_client::{ApiClient, FileStorage, Result, TokenStore};
//!
//! # async fn example() -> Result<()> {
//! // Tokens persist across runs in a JSON file
//! let tokens = TokenStore::new(FileStorage::new("/tmp/ledgerdesk-tokens.json"));
//!
//! let client = ApiClient::builder()
//!     .base_url("http://localhost:8000/api/v1")
//!     .token_store(tokens)
//!     .build()?;
//!
//! if !client.tokens().is_authenticated() {
//!     client.login("owner@office.example", "secret").await?;
//! }
//!
//! // An expired access token is refreshed transparently
//! let me = client.auth().me().await?;
//! println!("Logged in as {}", me.full_name);
//! # Ok(())
//! # }
//! ```
//!
//! # Components
//!
//! - [`token_store`]: current token pair, persisted through [`storage`]
//! - [`request`]: request descriptors and normalized payloads
//! - [`refresh`]: single-flight token refresh with FIFO replay of waiters
//! - [`api`]: typed wrappers per backend resource
//! - [`summary`]: obligation progress, receivables aging, license renewal state

pub mod api;
pub mod client;
pub mod error;
pub mod refresh;
pub mod request;
pub mod storage;
pub mod summary;
pub mod token_store;
pub mod types;

pub use client::{ApiClient, ClientBuilder};
pub use error::{Error, Result};
pub use refresh::{REFRESH_PATH, RefreshResponse, RefreshRotation};
pub use request::{ApiRequest, Body, Payload};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use token_store::{TokenPair, TokenStore};
pub use types::*;

// Re-export API query types that are commonly used with list methods
pub use api::{
    ListClientsQuery, ListLicensesQuery, ListObligationsQuery, ListReportsQuery,
    ListTransactionsQuery, ListUsersQuery,
};
