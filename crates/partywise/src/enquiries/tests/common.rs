use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::enquiries::domain::{
    AccountId, AddonDetail, AlertRecord, Enquiry, EnquiryId, EnquiryStatus, Party, PartyId,
    PaymentStatus, ResponseDecision, Supplier, SupplierId, UrgentAlert, User, UserId,
};
use crate::enquiries::lifecycle::ResponseRequest;
use crate::enquiries::memory::InMemoryEnquiryStore;
use crate::enquiries::repository::{
    AlertInsert, EnquiryFilter, EnquiryPatch, EnquiryStore, NotifyError, ReplacementContext,
    ReplacementNotifier, StoreError,
};
use crate::enquiries::router::enquiry_router;
use crate::enquiries::service::EnquiryService;

pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 18, 10, 0, 0).unwrap()
}

pub(super) fn magic_supplier() -> Supplier {
    Supplier {
        id: SupplierId("sup-magic".to_string()),
        account_id: AccountId("acct-marvellous".to_string()),
        business_name: "Marvellous Magic Co".to_string(),
        service_category: "entertainer".to_string(),
        is_primary: true,
    }
}

pub(super) fn bags_supplier() -> Supplier {
    Supplier {
        id: SupplierId("sup-bags".to_string()),
        account_id: AccountId("acct-marvellous".to_string()),
        business_name: "Marvellous Party Bags".to_string(),
        service_category: "party_bags".to_string(),
        is_primary: false,
    }
}

pub(super) fn amelia() -> User {
    User {
        id: UserId("user-amelia".to_string()),
        name: "Amelia Hart".to_string(),
        email: "amelia.hart@example.net".to_string(),
        phone: Some("07700 900123".to_string()),
    }
}

pub(super) fn sophie_party() -> Party {
    Party {
        id: PartyId("party-sophie".to_string()),
        user_id: Some(UserId("user-amelia".to_string())),
        event_date: NaiveDate::from_ymd_opt(2026, 6, 20).unwrap(),
        theme: Some("Space Explorer".to_string()),
        guest_count: Some(14),
        location: Some("Leeds".to_string()),
    }
}

/// Party whose owning account has been deleted.
pub(super) fn orphan_party() -> Party {
    Party {
        id: PartyId("party-orphan".to_string()),
        user_id: None,
        event_date: NaiveDate::from_ymd_opt(2026, 7, 4).unwrap(),
        theme: None,
        guest_count: Some(9),
        location: None,
    }
}

pub(super) fn party_for(id: &str, user: Option<&str>) -> Party {
    Party {
        id: PartyId(id.to_string()),
        user_id: user.map(|user| UserId(user.to_string())),
        event_date: NaiveDate::from_ymd_opt(2026, 6, 20).unwrap(),
        theme: None,
        guest_count: None,
        location: None,
    }
}

/// A paid, auto-accepted, still-pending enquiry created `minutes` after the
/// fixture epoch.
pub(super) fn paid_enquiry(id: &str, supplier: &str, party: &str, minutes: i64) -> Enquiry {
    let created = base_time() + Duration::minutes(minutes);
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
        addon_details: vec![AddonDetail {
            name: "Glitter face painting".to_string(),
            price: 2500,
            description: "Thirty minutes of face painting before the show".to_string(),
        }],
        revision: 0,
        created_at: created,
        updated_at: created,
    }
}

pub(super) fn unpaid_enquiry(id: &str, supplier: &str, party: &str, minutes: i64) -> Enquiry {
    let mut enquiry = paid_enquiry(id, supplier, party, minutes);
    enquiry.payment_status = PaymentStatus::Unpaid;
    enquiry.auto_accepted = false;
    enquiry.addon_details = Vec::new();
    enquiry
}

pub(super) fn accept_request(price: Option<u32>, message: Option<&str>) -> ResponseRequest {
    ResponseRequest {
        decision: ResponseDecision::Accepted,
        final_price: price,
        message: message.map(str::to_string),
    }
}

pub(super) fn decline_request(message: Option<&str>) -> ResponseRequest {
    ResponseRequest {
        decision: ResponseDecision::Declined,
        final_price: None,
        message: message.map(str::to_string),
    }
}

pub(super) fn replacement_context(enquiry: &str, party: &str) -> ReplacementContext {
    ReplacementContext {
        enquiry_id: EnquiryId(enquiry.to_string()),
        party_id: PartyId(party.to_string()),
        customer_name: Some("Amelia Hart".to_string()),
        customer_email: Some("amelia.hart@example.net".to_string()),
        party_date: NaiveDate::from_ymd_opt(2026, 6, 20),
        service_category: Some("entertainer".to_string()),
        declined_message: "Double-booked that weekend, sorry.".to_string(),
    }
}

/// Store preloaded with the Marvellous account, its two businesses, one
/// customer, and two parties. Tests add the enquiries they need.
pub(super) fn seeded_store() -> InMemoryEnquiryStore {
    let store = InMemoryEnquiryStore::new();
    store.put_supplier(magic_supplier());
    store.put_supplier(bags_supplier());
    store.put_user(amelia());
    store.put_party(sophie_party());
    store.put_party(orphan_party());
    store
}

pub(super) fn build_service() -> (
    EnquiryService<InMemoryEnquiryStore, RecordingNotifier>,
    Arc<InMemoryEnquiryStore>,
    Arc<RecordingNotifier>,
) {
    let store = Arc::new(seeded_store());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = EnquiryService::new(Arc::clone(&store), Arc::clone(&notifier));
    (service, store, notifier)
}

pub(super) fn enquiry_router_with_service(
    service: EnquiryService<InMemoryEnquiryStore, RecordingNotifier>,
) -> axum::Router {
    enquiry_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body is readable");
    serde_json::from_slice(&body).expect("body is json")
}

/// Records channel dispatches in order without delivering anything.
#[derive(Default)]
pub(super) struct RecordingNotifier {
    sent: Mutex<Vec<(&'static str, ReplacementContext)>>,
}

impl RecordingNotifier {
    pub(super) fn sent(&self) -> Vec<(&'static str, ReplacementContext)> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

impl ReplacementNotifier for RecordingNotifier {
    fn send_chat_alert(&self, notice: &ReplacementContext) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(("chat", notice.clone()));
        Ok(())
    }

    fn send_email_alert(&self, notice: &ReplacementContext) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(("email", notice.clone()));
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl ReplacementNotifier for FailingNotifier {
    fn send_chat_alert(&self, _notice: &ReplacementContext) -> Result<(), NotifyError> {
        Err(NotifyError::Channel("chat webhook offline".to_string()))
    }

    fn send_email_alert(&self, _notice: &ReplacementContext) -> Result<(), NotifyError> {
        Err(NotifyError::Channel("email relay offline".to_string()))
    }
}

/// Counts read calls so tests can pin the bounded-read contract.
pub(super) struct CountingStore {
    inner: InMemoryEnquiryStore,
    reads: AtomicUsize,
}

impl CountingStore {
    pub(super) fn new(inner: InMemoryEnquiryStore) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
        }
    }

    pub(super) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }
}

impl EnquiryStore for CountingStore {
    fn read_enquiries(&self, filter: &EnquiryFilter) -> Result<Vec<Enquiry>, StoreError> {
        self.count();
        self.inner.read_enquiries(filter)
    }

    fn read_enquiry(&self, id: &EnquiryId) -> Result<Option<Enquiry>, StoreError> {
        self.count();
        self.inner.read_enquiry(id)
    }

    fn read_parties(&self, ids: &[PartyId]) -> Result<Vec<Party>, StoreError> {
        self.count();
        self.inner.read_parties(ids)
    }

    fn read_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        self.count();
        self.inner.read_users(ids)
    }

    fn read_suppliers(&self, ids: &[SupplierId]) -> Result<Vec<Supplier>, StoreError> {
        self.count();
        self.inner.read_suppliers(ids)
    }

    fn suppliers_for_account(&self, account_id: &AccountId) -> Result<Vec<Supplier>, StoreError> {
        self.count();
        self.inner.suppliers_for_account(account_id)
    }

    fn update_enquiry(
        &self,
        id: &EnquiryId,
        expected_revision: u64,
        patch: EnquiryPatch,
    ) -> Result<Enquiry, StoreError> {
        self.inner.update_enquiry(id, expected_revision, patch)
    }

    fn insert_alert(&self, alert: UrgentAlert) -> Result<AlertInsert, StoreError> {
        self.inner.insert_alert(alert)
    }
}

/// Store that refuses everything, as a hard outage would.
pub(super) struct UnavailableStore;

impl UnavailableStore {
    fn offline<T>() -> Result<T, StoreError> {
        Err(StoreError::Unavailable("primary store offline".to_string()))
    }
}

impl EnquiryStore for UnavailableStore {
    fn read_enquiries(&self, _filter: &EnquiryFilter) -> Result<Vec<Enquiry>, StoreError> {
        Self::offline()
    }

    fn read_enquiry(&self, _id: &EnquiryId) -> Result<Option<Enquiry>, StoreError> {
        Self::offline()
    }

    fn read_parties(&self, _ids: &[PartyId]) -> Result<Vec<Party>, StoreError> {
        Self::offline()
    }

    fn read_users(&self, _ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        Self::offline()
    }

    fn read_suppliers(&self, _ids: &[SupplierId]) -> Result<Vec<Supplier>, StoreError> {
        Self::offline()
    }

    fn suppliers_for_account(&self, _account_id: &AccountId) -> Result<Vec<Supplier>, StoreError> {
        Self::offline()
    }

    fn update_enquiry(
        &self,
        _id: &EnquiryId,
        _expected_revision: u64,
        _patch: EnquiryPatch,
    ) -> Result<Enquiry, StoreError> {
        Self::offline()
    }

    fn insert_alert(&self, _alert: UrgentAlert) -> Result<AlertInsert, StoreError> {
        Self::offline()
    }
}

/// Healthy primary reads, but the party table read times out.
pub(super) struct PartyTimeoutStore {
    pub(super) inner: InMemoryEnquiryStore,
}

impl EnquiryStore for PartyTimeoutStore {
    fn read_enquiries(&self, filter: &EnquiryFilter) -> Result<Vec<Enquiry>, StoreError> {
        self.inner.read_enquiries(filter)
    }

    fn read_enquiry(&self, id: &EnquiryId) -> Result<Option<Enquiry>, StoreError> {
        self.inner.read_enquiry(id)
    }

    fn read_parties(&self, _ids: &[PartyId]) -> Result<Vec<Party>, StoreError> {
        Err(StoreError::Timeout)
    }

    fn read_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        self.inner.read_users(ids)
    }

    fn read_suppliers(&self, ids: &[SupplierId]) -> Result<Vec<Supplier>, StoreError> {
        self.inner.read_suppliers(ids)
    }

    fn suppliers_for_account(&self, account_id: &AccountId) -> Result<Vec<Supplier>, StoreError> {
        self.inner.suppliers_for_account(account_id)
    }

    fn update_enquiry(
        &self,
        id: &EnquiryId,
        expected_revision: u64,
        patch: EnquiryPatch,
    ) -> Result<Enquiry, StoreError> {
        self.inner.update_enquiry(id, expected_revision, patch)
    }

    fn insert_alert(&self, alert: UrgentAlert) -> Result<AlertInsert, StoreError> {
        self.inner.insert_alert(alert)
    }
}

/// Every guarded write loses the revision race.
pub(super) struct UpdateConflictStore {
    pub(super) inner: InMemoryEnquiryStore,
}

impl EnquiryStore for UpdateConflictStore {
    fn read_enquiries(&self, filter: &EnquiryFilter) -> Result<Vec<Enquiry>, StoreError> {
        self.inner.read_enquiries(filter)
    }

    fn read_enquiry(&self, id: &EnquiryId) -> Result<Option<Enquiry>, StoreError> {
        self.inner.read_enquiry(id)
    }

    fn read_parties(&self, ids: &[PartyId]) -> Result<Vec<Party>, StoreError> {
        self.inner.read_parties(ids)
    }

    fn read_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        self.inner.read_users(ids)
    }

    fn read_suppliers(&self, ids: &[SupplierId]) -> Result<Vec<Supplier>, StoreError> {
        self.inner.read_suppliers(ids)
    }

    fn suppliers_for_account(&self, account_id: &AccountId) -> Result<Vec<Supplier>, StoreError> {
        self.inner.suppliers_for_account(account_id)
    }

    fn update_enquiry(
        &self,
        _id: &EnquiryId,
        _expected_revision: u64,
        _patch: EnquiryPatch,
    ) -> Result<Enquiry, StoreError> {
        Err(StoreError::Conflict)
    }

    fn insert_alert(&self, alert: UrgentAlert) -> Result<AlertInsert, StoreError> {
        self.inner.insert_alert(alert)
    }
}

/// Alert writes fail until `restore` is called; everything else works.
/// Models the window where the status update commits but the alert insert
/// does not.
pub(super) struct AlertOutageStore {
    inner: InMemoryEnquiryStore,
    failing: AtomicBool,
}

impl AlertOutageStore {
    pub(super) fn new(inner: InMemoryEnquiryStore) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(true),
        }
    }

    pub(super) fn restore(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }

    pub(super) fn alerts(&self) -> Vec<AlertRecord> {
        self.inner.alerts()
    }
}

impl EnquiryStore for AlertOutageStore {
    fn read_enquiries(&self, filter: &EnquiryFilter) -> Result<Vec<Enquiry>, StoreError> {
        self.inner.read_enquiries(filter)
    }

    fn read_enquiry(&self, id: &EnquiryId) -> Result<Option<Enquiry>, StoreError> {
        self.inner.read_enquiry(id)
    }

    fn read_parties(&self, ids: &[PartyId]) -> Result<Vec<Party>, StoreError> {
        self.inner.read_parties(ids)
    }

    fn read_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        self.inner.read_users(ids)
    }

    fn read_suppliers(&self, ids: &[SupplierId]) -> Result<Vec<Supplier>, StoreError> {
        self.inner.read_suppliers(ids)
    }

    fn suppliers_for_account(&self, account_id: &AccountId) -> Result<Vec<Supplier>, StoreError> {
        self.inner.suppliers_for_account(account_id)
    }

    fn update_enquiry(
        &self,
        id: &EnquiryId,
        expected_revision: u64,
        patch: EnquiryPatch,
    ) -> Result<Enquiry, StoreError> {
        self.inner.update_enquiry(id, expected_revision, patch)
    }

    fn insert_alert(&self, alert: UrgentAlert) -> Result<AlertInsert, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("alert store offline".to_string()));
        }
        self.inner.insert_alert(alert)
    }
}
