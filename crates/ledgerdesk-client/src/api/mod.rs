//! API endpoint implementations.

mod auth;
mod clients;
mod licenses;
mod obligations;
mod portal;
mod reports;
mod transactions;
mod users;

pub use auth::AuthApi;
pub use clients::{ClientsApi, ListClientsQuery};
pub use licenses::{LicensesApi, ListLicensesQuery};
pub use obligations::{ListObligationsQuery, ObligationsApi};
pub use portal::PortalApi;
pub use reports::{ListReportsQuery, ReportsApi};
pub use transactions::{ListTransactionsQuery, TransactionsApi};
pub use users::{ListUsersQuery, UsersApi};
