use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use partywise::enquiries::{
    AccountId, AddonDetail, Enquiry, EnquiryId, EnquiryStatus, InMemoryEnquiryStore, NotifyError,
    Party, PartyId, PaymentStatus, ReplacementContext, ReplacementNotifier, Supplier, SupplierId,
    User, UserId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// The channel a replacement notification went out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum NotificationChannel {
    OpsChat,
    Email,
}

impl NotificationChannel {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            NotificationChannel::OpsChat => "ops_chat",
            NotificationChannel::Email => "email",
        }
    }
}

/// Stands in for the ops-chat webhook and the transactional email sender.
/// Dispatches are kept so the demo can show what would have gone out.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotifier {
    events: Arc<Mutex<Vec<(NotificationChannel, ReplacementContext)>>>,
}

impl InMemoryNotifier {
    pub(crate) fn events(&self) -> Vec<(NotificationChannel, ReplacementContext)> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl ReplacementNotifier for InMemoryNotifier {
    fn send_chat_alert(&self, notice: &ReplacementContext) -> Result<(), NotifyError> {
        let mut guard = self.events.lock().expect("notifier mutex poisoned");
        guard.push((NotificationChannel::OpsChat, notice.clone()));
        Ok(())
    }

    fn send_email_alert(&self, notice: &ReplacementContext) -> Result<(), NotifyError> {
        let mut guard = self.events.lock().expect("notifier mutex poisoned");
        guard.push((NotificationChannel::Email, notice.clone()));
        Ok(())
    }
}

/// Ids worth printing after seeding.
pub(crate) struct SeedSummary {
    pub(crate) account_id: AccountId,
    pub(crate) pending_paid: EnquiryId,
    pub(crate) viewed_paid: EnquiryId,
    pub(crate) unpaid: EnquiryId,
}

/// Load a small sample marketplace: one supplier account with two
/// businesses, two customers with upcoming parties, and a spread of
/// enquiries against them.
pub(crate) fn seed_sample_marketplace(store: &InMemoryEnquiryStore) -> SeedSummary {
    store.put_supplier(Supplier {
        id: SupplierId("sup-sunny-ents".to_string()),
        account_id: AccountId("acct-sunny".to_string()),
        business_name: "Sunny Day Entertainment".to_string(),
        service_category: "entertainer".to_string(),
        is_primary: true,
    });
    store.put_supplier(Supplier {
        id: SupplierId("sup-sunny-cakes".to_string()),
        account_id: AccountId("acct-sunny".to_string()),
        business_name: "Sunny Day Cakes".to_string(),
        service_category: "cake_maker".to_string(),
        is_primary: false,
    });

    store.put_user(User {
        id: UserId("user-grace".to_string()),
        name: "Grace O'Neill".to_string(),
        email: "grace.oneill@example.net".to_string(),
        phone: Some("07700 900456".to_string()),
    });
    store.put_user(User {
        id: UserId("user-tom".to_string()),
        name: "Tom Walsh".to_string(),
        email: "tom.walsh@example.net".to_string(),
        phone: None,
    });

    store.put_party(Party {
        id: PartyId("party-liam".to_string()),
        user_id: Some(UserId("user-grace".to_string())),
        event_date: date(2026, 10, 3),
        theme: Some("Pirate Adventure".to_string()),
        guest_count: Some(16),
        location: Some("Bristol".to_string()),
    });
    store.put_party(Party {
        id: PartyId("party-ella".to_string()),
        user_id: Some(UserId("user-tom".to_string())),
        event_date: date(2026, 11, 14),
        theme: Some("Unicorn Rainbow".to_string()),
        guest_count: Some(12),
        location: Some("Cardiff".to_string()),
    });

    let mut pending_paid = enquiry("enq-001", "sup-sunny-ents", "party-liam", 0);
    pending_paid.addon_details.push(AddonDetail {
        name: "Bubble machine finale".to_string(),
        price: 1500,
        description: "Ten minutes of bubbles to close the show".to_string(),
    });
    store.put_enquiry(pending_paid);

    let mut unpaid = enquiry("enq-002", "sup-sunny-cakes", "party-ella", 20);
    unpaid.payment_status = PaymentStatus::Unpaid;
    unpaid.auto_accepted = false;
    store.put_enquiry(unpaid);

    let mut viewed_paid = enquiry("enq-003", "sup-sunny-ents", "party-ella", 45);
    viewed_paid.status = EnquiryStatus::Viewed;
    store.put_enquiry(viewed_paid);

    SeedSummary {
        account_id: AccountId("acct-sunny".to_string()),
        pending_paid: EnquiryId("enq-001".to_string()),
        viewed_paid: EnquiryId("enq-003".to_string()),
        unpaid: EnquiryId("enq-002".to_string()),
    }
}

fn enquiry(id: &str, supplier: &str, party: &str, minutes: i64) -> Enquiry {
    let created = created_at(minutes);
    Enquiry {
        id: EnquiryId(id.to_string()),
        supplier_id: SupplierId(supplier.to_string()),
        party_id: PartyId(party.to_string()),
        status: EnquiryStatus::Pending,
        payment_status: PaymentStatus::Paid,
        auto_accepted: true,
        final_price: None,
        supplier_response: None,
        supplier_response_date: None,
        replacement_requested: false,
        replacement_requested_at: None,
        addon_details: Vec::new(),
        revision: 0,
        created_at: created,
        updated_at: created,
    }
}

fn created_at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 10, 8, 30, 0)
        .single()
        .unwrap_or_else(Utc::now)
        + Duration::minutes(minutes)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
