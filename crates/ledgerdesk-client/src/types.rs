//! Request and response types for the Ledgerdesk API.
//!
//! These types mirror the backend's API contract. Unknown enum values map to
//! an `Unknown` variant so a newer backend does not break older clients.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Pagination
// ─────────────────────────────────────────────────────────────────────────────

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total items across all pages.
    pub total: u64,
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Page size used by the server.
    #[serde(default)]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

impl<T> Page<T> {
    /// Number of pages for the reported total.
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return if self.total == 0 { 0 } else { 1 };
        }
        self.total.div_ceil(u64::from(self.page_size))
    }

    /// True if pages follow this one.
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.page_count()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth & Users
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response from `POST auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Profile of the logged-in user.
    pub user: User,
}

/// Role of a user within the accounting office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Accountant,
    Assistant,
    /// Portal user belonging to a client company.
    Client,
    #[serde(other)]
    Unknown,
}

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Set for portal users: the client company they belong to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Request to create a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

/// Request to update a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Request to change the current user's password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Clients (companies)
// ─────────────────────────────────────────────────────────────────────────────

/// Status of a client company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Active,
    Inactive,
    Suspended,
    #[serde(other)]
    Unknown,
}

/// A client company served by the office.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    /// Registered legal name.
    pub legal_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_name: Option<String>,
    /// Company tax registration number.
    pub tax_id: String,
    pub status: ClientStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_regime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Company {
    /// Trade name when set, legal name otherwise.
    pub fn display_name(&self) -> &str {
        self.trade_name.as_deref().unwrap_or(&self.legal_name)
    }
}

/// Request to register a client company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompanyRequest {
    pub legal_name: String,
    pub tax_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_regime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Request to update a client company.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCompanyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClientStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_regime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Fiscal obligations
// ─────────────────────────────────────────────────────────────────────────────

/// Progress of a fiscal obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationStatus {
    Pending,
    InProgress,
    Completed,
    /// Not applicable for the period.
    Waived,
    #[serde(other)]
    Unknown,
}

/// A recurring tax filing or payment owed by a client for one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obligation {
    pub id: String,
    pub client_id: String,
    pub name: String,
    /// Competence period, e.g. `2026-09`.
    pub period: String,
    pub due_date: NaiveDate,
    pub status: ObligationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
}

/// Request to create an obligation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateObligationRequest {
    pub client_id: String,
    pub name: String,
    pub period: String,
    pub due_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
}

/// Request to update an obligation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateObligationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ObligationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Transactions & invoices
// ─────────────────────────────────────────────────────────────────────────────

/// Direction of a financial transaction, from the office's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Fee billed to a client.
    Receivable,
    /// Expense owed by the office.
    Payable,
    #[serde(other)]
    Unknown,
}

/// Payment state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Open,
    Paid,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// A billed fee or expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub kind: TransactionKind,
    pub description: String,
    /// Amount in cents.
    pub amount_cents: i64,
    pub due_date: NaiveDate,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_on: Option<NaiveDate>,
    /// Number of the issued invoice, once issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
}

/// Request to create a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub kind: TransactionKind,
    pub description: String,
    pub amount_cents: i64,
    pub due_date: NaiveDate,
}

/// Request to update a transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_on: Option<NaiveDate>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Licenses & permits
// ─────────────────────────────────────────────────────────────────────────────

/// A license or permit held by a client that must be renewed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub id: String,
    pub client_id: String,
    pub name: String,
    /// Issuing authority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_on: Option<NaiveDate>,
    pub expires_on: NaiveDate,
}

/// Request to register a license.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLicenseRequest {
    pub client_id: String,
    pub name: String,
    pub expires_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_on: Option<NaiveDate>,
}

/// Request to record a license renewal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewLicenseRequest {
    pub expires_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Reports
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Obligations,
    Financial,
    Licenses,
    Clients,
    #[serde(other)]
    Unknown,
}

/// Generation state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Queued,
    Running,
    Ready,
    Failed,
    #[serde(other)]
    Unknown,
}

/// A report generated by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub kind: ReportKind,
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// Request to generate a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateReportRequest {
    pub kind: ReportKind,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Client portal
// ─────────────────────────────────────────────────────────────────────────────

/// Landing view for a portal user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalDashboard {
    pub company: Company,
    #[serde(default)]
    pub pending_obligations: Vec<Obligation>,
    #[serde(default)]
    pub open_invoices: Vec<Transaction>,
    #[serde(default)]
    pub licenses: Vec<License>,
}

/// A document shared with a portal user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalDocument {
    pub id: String,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        let page: Page<u32> = Page {
            items: vec![],
            total: 45,
            page: 1,
            page_size: 20,
        };
        assert_eq!(page.page_count(), 3);
        assert!(page.has_next());

        let last = Page { page: 3, ..page };
        assert!(!last.has_next());
    }

    #[test]
    fn test_page_without_size() {
        let page: Page<u32> = serde_json::from_str(r#"{"items": [1, 2], "total": 2}"#).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_count(), 1);
        assert!(!page.has_next());
    }

    #[test]
    fn test_unknown_enum_values() {
        let status: ObligationStatus = serde_json::from_str(r#""escalated""#).unwrap();
        assert_eq!(status, ObligationStatus::Unknown);

        let role: UserRole = serde_json::from_str(r#""accountant""#).unwrap();
        assert_eq!(role, UserRole::Accountant);
    }

    #[test]
    fn test_parse_obligation() {
        let json = r#"{
            "id": "ob-1",
            "client_id": "c-1",
            "name": "Monthly VAT return",
            "period": "2026-09",
            "due_date": "2026-10-20",
            "status": "in_progress"
        }"#;
        let obligation: Obligation = serde_json::from_str(json).unwrap();
        assert_eq!(obligation.status, ObligationStatus::InProgress);
        assert_eq!(obligation.due_date, NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
        assert!(obligation.completed_at.is_none());
    }

    #[test]
    fn test_company_display_name() {
        let mut company = Company {
            id: "c-1".to_string(),
            legal_name: "Acme Holdings Ltd".to_string(),
            trade_name: None,
            tax_id: "12.345.678/0001-90".to_string(),
            status: ClientStatus::Active,
            tax_regime: None,
            email: None,
            phone: None,
            created_at: None,
        };
        assert_eq!(company.display_name(), "Acme Holdings Ltd");

        company.trade_name = Some("Acme".to_string());
        assert_eq!(company.display_name(), "Acme");
    }

    #[test]
    fn test_update_request_skips_unset_fields() {
        let update = UpdateObligationRequest {
            status: Some(ObligationStatus::Completed),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"status": "completed"}));
    }
}
