use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    AccountId, AlertId, Enquiry, EnquiryId, EnquiryStatus, Party, PartyId, PaymentStatus,
    Supplier, SupplierId, UrgentAlert, User, UserId,
};

/// Row filter for the primary enquiry read. An empty supplier set yields no
/// rows; it never widens to the whole table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnquiryFilter {
    pub supplier_ids: Vec<SupplierId>,
    pub status: Option<EnquiryStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl EnquiryFilter {
    pub fn for_suppliers(supplier_ids: Vec<SupplierId>) -> Self {
        Self {
            supplier_ids,
            status: None,
            payment_status: None,
        }
    }

    /// Restrict to paid enquiries; the supplier-facing list view always does.
    pub fn paid(mut self) -> Self {
        self.payment_status = Some(PaymentStatus::Paid);
        self
    }

    pub fn with_status(mut self, status: Option<EnquiryStatus>) -> Self {
        self.status = status;
        self
    }
}

/// Field-level update applied to an enquiry row. `None` leaves a field
/// untouched; `updated_at` is always written.
#[derive(Debug, Clone, PartialEq)]
pub struct EnquiryPatch {
    pub status: Option<EnquiryStatus>,
    pub supplier_response: Option<String>,
    pub supplier_response_date: Option<DateTime<Utc>>,
    pub final_price: Option<u32>,
    pub auto_accepted: Option<bool>,
    pub replacement_requested: Option<bool>,
    pub replacement_requested_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl EnquiryPatch {
    /// A patch that only bumps `updated_at`; callers set the fields they mean
    /// to change.
    pub fn touch(now: DateTime<Utc>) -> Self {
        Self {
            status: None,
            supplier_response: None,
            supplier_response_date: None,
            final_price: None,
            auto_accepted: None,
            replacement_requested: None,
            replacement_requested_at: None,
            updated_at: now,
        }
    }
}

/// Outcome of an alert insert. `created` is false when an equivalent alert
/// (same enquiry and kind) was already on file; `id` then names the existing
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertInsert {
    pub id: AlertId,
    pub created: bool,
}

/// Storage abstraction over the marketplace's primary store so the engine can
/// be exercised in isolation.
pub trait EnquiryStore: Send + Sync {
    /// Matching enquiries ordered by `created_at` descending.
    fn read_enquiries(&self, filter: &EnquiryFilter) -> Result<Vec<Enquiry>, StoreError>;
    fn read_enquiry(&self, id: &EnquiryId) -> Result<Option<Enquiry>, StoreError>;
    fn read_parties(&self, ids: &[PartyId]) -> Result<Vec<Party>, StoreError>;
    fn read_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError>;
    fn read_suppliers(&self, ids: &[SupplierId]) -> Result<Vec<Supplier>, StoreError>;
    fn suppliers_for_account(&self, account_id: &AccountId) -> Result<Vec<Supplier>, StoreError>;
    /// Guarded write: fails with [`StoreError::Conflict`] when the row's
    /// revision no longer matches `expected_revision`.
    fn update_enquiry(
        &self,
        id: &EnquiryId,
        expected_revision: u64,
        patch: EnquiryPatch,
    ) -> Result<Enquiry, StoreError>;
    /// Append an alert, deduplicating on `(enquiry_id, kind)`.
    fn insert_alert(&self, alert: UrgentAlert) -> Result<AlertInsert, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("enquiry was modified concurrently")]
    Conflict,
    #[error("store operation timed out")]
    Timeout,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Everything an operator needs to act on a declined paid booking without
/// re-querying. Serialized into the alert's `data` payload and handed to the
/// notification channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementContext {
    pub enquiry_id: EnquiryId,
    pub party_id: PartyId,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub party_date: Option<NaiveDate>,
    pub service_category: Option<String>,
    pub declined_message: String,
}

impl ReplacementContext {
    /// Human headline for the alert record and chat-ops message.
    pub fn operator_summary(&self) -> String {
        let service = match &self.service_category {
            Some(category) => format!("{category} supplier"),
            None => "supplier".to_string(),
        };
        let customer = self.customer_name.as_deref().unwrap_or("the customer");
        let mut summary =
            format!("Paid booking declined: find a replacement {service} for {customer}'s party");
        if let Some(date) = self.party_date {
            summary.push_str(&format!(" on {date}"));
        }
        summary.push_str(&format!(". Supplier said: \"{}\"", self.declined_message));
        summary
    }
}

/// Trait describing the best-effort notification channels fanned out to when
/// a replacement is needed.
pub trait ReplacementNotifier: Send + Sync {
    fn send_chat_alert(&self, notice: &ReplacementContext) -> Result<(), NotifyError>;
    fn send_email_alert(&self, notice: &ReplacementContext) -> Result<(), NotifyError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification channel unavailable: {0}")]
    Channel(String),
}
