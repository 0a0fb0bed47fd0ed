//! Derived figures computed client-side from fetched records.
//!
//! Pure functions over API types; callers pass `today` explicitly.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{
    License, Obligation, ObligationStatus, Transaction, TransactionKind, TransactionStatus,
};

// ─────────────────────────────────────────────────────────────────────────────
// Obligation progress
// ─────────────────────────────────────────────────────────────────────────────

/// Completion figures for a set of obligations. Waived obligations are left out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    /// Not completed and past the due date.
    pub overdue: usize,
    /// Completed share, 0-100, one decimal place.
    pub percent: f64,
}

impl Progress {
    fn add(&mut self, obligation: &Obligation, today: NaiveDate) {
        match obligation.status {
            ObligationStatus::Waived => return,
            ObligationStatus::Completed => self.completed += 1,
            _ if obligation.due_date < today => self.overdue += 1,
            _ => {}
        }
        self.total += 1;
    }

    fn finish(mut self) -> Self {
        self.percent = if self.total == 0 {
            0.0
        } else {
            (self.completed as f64 * 1000.0 / self.total as f64).round() / 10.0
        };
        self
    }
}

/// Completion progress across all given obligations.
pub fn obligation_progress(obligations: &[Obligation], today: NaiveDate) -> Progress {
    let mut progress = Progress::default();
    for obligation in obligations {
        progress.add(obligation, today);
    }
    progress.finish()
}

/// Completion progress per client id.
pub fn progress_by_client(
    obligations: &[Obligation],
    today: NaiveDate,
) -> BTreeMap<String, Progress> {
    let mut by_client: BTreeMap<String, Progress> = BTreeMap::new();
    for obligation in obligations {
        by_client
            .entry(obligation.client_id.clone())
            .or_default()
            .add(obligation, today);
    }
    by_client
        .into_iter()
        .map(|(client, progress)| (client, progress.finish()))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Receivables aging
// ─────────────────────────────────────────────────────────────────────────────

/// Count and amount of receivables in one aging range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgingBucket {
    pub count: usize,
    pub amount_cents: i64,
}

impl AgingBucket {
    fn add(&mut self, amount_cents: i64) {
        self.count += 1;
        self.amount_cents += amount_cents;
    }
}

/// Open receivables grouped by days past due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgingReport {
    /// Not yet due.
    pub current: AgingBucket,
    pub days_1_30: AgingBucket,
    pub days_31_60: AgingBucket,
    pub days_61_90: AgingBucket,
    pub over_90: AgingBucket,
}

impl AgingReport {
    /// Everything still open.
    pub fn total_cents(&self) -> i64 {
        self.current.amount_cents + self.overdue_cents()
    }

    /// Everything past its due date.
    pub fn overdue_cents(&self) -> i64 {
        self.days_1_30.amount_cents
            + self.days_31_60.amount_cents
            + self.days_61_90.amount_cents
            + self.over_90.amount_cents
    }
}

/// Bucket open receivables by how long they are past due.
///
/// Payables, paid and cancelled transactions are ignored.
pub fn aging_buckets(transactions: &[Transaction], today: NaiveDate) -> AgingReport {
    let mut report = AgingReport::default();

    let open_receivables = transactions.iter().filter(|t| {
        t.kind == TransactionKind::Receivable && t.status == TransactionStatus::Open
    });

    for transaction in open_receivables {
        let days_late = (today - transaction.due_date).num_days();
        let bucket = match days_late {
            ..=0 => &mut report.current,
            1..=30 => &mut report.days_1_30,
            31..=60 => &mut report.days_31_60,
            61..=90 => &mut report.days_61_90,
            _ => &mut report.over_90,
        };
        bucket.add(transaction.amount_cents);
    }

    report
}

// ─────────────────────────────────────────────────────────────────────────────
// License renewal
// ─────────────────────────────────────────────────────────────────────────────

/// Renewal state of a license relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LicenseStatus {
    Valid,
    /// Still valid, expiring within the warning window.
    ExpiringSoon { days_left: i64 },
    Expired,
}

/// Classify a license. A license expiring today is still valid today.
pub fn license_status(license: &License, today: NaiveDate, warn_days: i64) -> LicenseStatus {
    let days_left = (license.expires_on - today).num_days();
    if days_left < 0 {
        LicenseStatus::Expired
    } else if days_left <= warn_days {
        LicenseStatus::ExpiringSoon { days_left }
    } else {
        LicenseStatus::Valid
    }
}
