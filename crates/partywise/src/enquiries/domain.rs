use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for enquiry records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnquiryId(pub String);

/// Identifier wrapper for supplier businesses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupplierId(pub String);

/// Identifier wrapper for customer parties (events).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyId(pub String);

/// Identifier wrapper for customer accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for the auth identity owning one or more suppliers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

/// Identifier wrapper for persisted urgent alerts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertId(pub String);

impl fmt::Display for EnquiryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SupplierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of an enquiry. The string forms are a wire contract;
/// dashboard badges and the urgent-response UI branch on these exact values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnquiryStatus {
    Pending,
    Viewed,
    Accepted,
    Declined,
    Expired,
}

impl EnquiryStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EnquiryStatus::Pending => "pending",
            EnquiryStatus::Viewed => "viewed",
            EnquiryStatus::Accepted => "accepted",
            EnquiryStatus::Declined => "declined",
            EnquiryStatus::Expired => "expired",
        }
    }

    /// Terminal statuses never move forward again.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            EnquiryStatus::Accepted | EnquiryStatus::Declined | EnquiryStatus::Expired
        )
    }
}

impl fmt::Display for EnquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when a status string arriving at the API edge names no known status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown enquiry status '{0}'")]
pub struct ParseEnquiryStatusError(pub String);

impl FromStr for EnquiryStatus {
    type Err = ParseEnquiryStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EnquiryStatus::Pending),
            "viewed" => Ok(EnquiryStatus::Viewed),
            "accepted" => Ok(EnquiryStatus::Accepted),
            "declined" => Ok(EnquiryStatus::Declined),
            "expired" => Ok(EnquiryStatus::Expired),
            other => Err(ParseEnquiryStatusError(other.to_string())),
        }
    }
}

/// Whether the customer's deposit has been captured for this enquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
        }
    }
}

/// The two answers a supplier may give to an enquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseDecision {
    Accepted,
    Declined,
}

impl ResponseDecision {
    pub const fn label(self) -> &'static str {
        match self {
            ResponseDecision::Accepted => "accepted",
            ResponseDecision::Declined => "declined",
        }
    }

    pub const fn as_status(self) -> EnquiryStatus {
        match self {
            ResponseDecision::Accepted => EnquiryStatus::Accepted,
            ResponseDecision::Declined => EnquiryStatus::Declined,
        }
    }
}

/// Optional extra line items attached to an enquiry. Prices are minor
/// currency units, as is `final_price` on the enquiry itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonDetail {
    pub name: String,
    pub price: u32,
    pub description: String,
}

/// One customer request to one supplier for one service.
///
/// `revision` is the optimistic-concurrency counter; every successful write
/// through the store bumps it, and writers must present the revision they
/// read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enquiry {
    pub id: EnquiryId,
    pub supplier_id: SupplierId,
    pub party_id: PartyId,
    pub status: EnquiryStatus,
    pub payment_status: PaymentStatus,
    pub auto_accepted: bool,
    pub final_price: Option<u32>,
    pub supplier_response: Option<String>,
    pub supplier_response_date: Option<DateTime<Utc>>,
    pub replacement_requested: bool,
    pub replacement_requested_at: Option<DateTime<Utc>>,
    pub addon_details: Vec<AddonDetail>,
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A customer's event; aggregates the enquiries sent out for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub user_id: Option<UserId>,
    pub event_date: NaiveDate,
    pub theme: Option<String>,
    pub guest_count: Option<u32>,
    pub location: Option<String>,
}

/// Customer identity. May be gone entirely if the account was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// A supplier business. One account may own several of these; `is_primary`
/// marks the one shown by default in multi-business dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub account_id: AccountId,
    pub business_name: String,
    pub service_category: String,
    pub is_primary: bool,
}

/// Categories of urgent operational events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    SupplierDecline,
}

impl AlertKind {
    pub const fn label(self) -> &'static str {
        match self {
            AlertKind::SupplierDecline => "supplier_decline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }
}

/// Durable record of a critical operational event. Append-only; created
/// only by the replacement orchestrator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgentAlert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub party_id: PartyId,
    pub enquiry_id: EnquiryId,
    pub message: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// An urgent alert as persisted, with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: AlertId,
    pub alert: UrgentAlert,
}

/// Party enriched with its owning customer during hydration. The customer
/// is only meaningful when the party itself resolved, so it nests here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydratedParty {
    #[serde(flatten)]
    pub detail: Party,
    pub user: Option<User>,
}

/// An enquiry with its related party and customer attached. Missing
/// relations are `None`, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydratedEnquiry {
    #[serde(flatten)]
    pub enquiry: Enquiry,
    pub party: Option<HydratedParty>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_round_trip_through_from_str() {
        let statuses = [
            EnquiryStatus::Pending,
            EnquiryStatus::Viewed,
            EnquiryStatus::Accepted,
            EnquiryStatus::Declined,
            EnquiryStatus::Expired,
        ];
        for status in statuses {
            assert_eq!(status.label().parse::<EnquiryStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        match "archived".parse::<EnquiryStatus>() {
            Err(ParseEnquiryStatusError(value)) => assert_eq!(value, "archived"),
            other => panic!("expected parse failure, got {other:?}"),
        }
    }

    #[test]
    fn wire_strings_use_snake_case() {
        assert_eq!(
            serde_json::to_value(EnquiryStatus::Pending).unwrap(),
            serde_json::json!("pending")
        );
        assert_eq!(
            serde_json::to_value(PaymentStatus::Unpaid).unwrap(),
            serde_json::json!("unpaid")
        );
        assert_eq!(
            serde_json::to_value(AlertKind::SupplierDecline).unwrap(),
            serde_json::json!("supplier_decline")
        );
        assert_eq!(
            serde_json::to_value(AlertSeverity::Critical).unwrap(),
            serde_json::json!("critical")
        );
    }

    #[test]
    fn decisions_map_to_terminal_statuses() {
        assert_eq!(
            ResponseDecision::Accepted.as_status(),
            EnquiryStatus::Accepted
        );
        assert_eq!(
            ResponseDecision::Declined.as_status(),
            EnquiryStatus::Declined
        );
        assert!(ResponseDecision::Accepted.as_status().is_terminal());
        assert!(!EnquiryStatus::Viewed.is_terminal());
    }
}
