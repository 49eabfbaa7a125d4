use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{
    AccountId, AlertId, AlertRecord, Enquiry, EnquiryId, Party, PartyId, Supplier, SupplierId,
    UrgentAlert, User, UserId,
};
use super::repository::{AlertInsert, EnquiryFilter, EnquiryPatch, EnquiryStore, StoreError};

/// In-memory reference store backing the API service, the demo walkthrough,
/// and tests. Mirrors the semantics expected of the production store:
/// newest-first ordering, the revision guard, and alert deduplication.
#[derive(Default, Clone)]
pub struct InMemoryEnquiryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    enquiries: HashMap<EnquiryId, Enquiry>,
    parties: HashMap<PartyId, Party>,
    users: HashMap<UserId, User>,
    suppliers: Vec<Supplier>,
    alerts: Vec<AlertRecord>,
    alert_seq: u64,
}

impl InMemoryEnquiryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_enquiry(&self, enquiry: Enquiry) {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        guard.enquiries.insert(enquiry.id.clone(), enquiry);
    }

    pub fn put_party(&self, party: Party) {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        guard.parties.insert(party.id.clone(), party);
    }

    pub fn put_user(&self, user: User) {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        guard.users.insert(user.id.clone(), user);
    }

    pub fn put_supplier(&self, supplier: Supplier) {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        guard.suppliers.retain(|existing| existing.id != supplier.id);
        guard.suppliers.push(supplier);
    }

    /// Snapshot of persisted alerts, oldest first.
    pub fn alerts(&self) -> Vec<AlertRecord> {
        self.inner
            .lock()
            .expect("store mutex poisoned")
            .alerts
            .clone()
    }

    /// Direct row read, for inspection without the viewed side effect.
    pub fn enquiry(&self, id: &EnquiryId) -> Option<Enquiry> {
        self.inner
            .lock()
            .expect("store mutex poisoned")
            .enquiries
            .get(id)
            .cloned()
    }
}

impl EnquiryStore for InMemoryEnquiryStore {
    fn read_enquiries(&self, filter: &EnquiryFilter) -> Result<Vec<Enquiry>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        let mut rows: Vec<Enquiry> = guard
            .enquiries
            .values()
            .filter(|enquiry| filter.supplier_ids.contains(&enquiry.supplier_id))
            .filter(|enquiry| {
                filter
                    .status
                    .map_or(true, |status| enquiry.status == status)
            })
            .filter(|enquiry| {
                filter
                    .payment_status
                    .map_or(true, |payment| enquiry.payment_status == payment)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn read_enquiry(&self, id: &EnquiryId) -> Result<Option<Enquiry>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard.enquiries.get(id).cloned())
    }

    fn read_parties(&self, ids: &[PartyId]) -> Result<Vec<Party>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(ids
            .iter()
            .filter_map(|id| guard.parties.get(id).cloned())
            .collect())
    }

    fn read_users(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(ids
            .iter()
            .filter_map(|id| guard.users.get(id).cloned())
            .collect())
    }

    fn read_suppliers(&self, ids: &[SupplierId]) -> Result<Vec<Supplier>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard
            .suppliers
            .iter()
            .filter(|supplier| ids.contains(&supplier.id))
            .cloned()
            .collect())
    }

    fn suppliers_for_account(&self, account_id: &AccountId) -> Result<Vec<Supplier>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard
            .suppliers
            .iter()
            .filter(|supplier| &supplier.account_id == account_id)
            .cloned()
            .collect())
    }

    fn update_enquiry(
        &self,
        id: &EnquiryId,
        expected_revision: u64,
        patch: EnquiryPatch,
    ) -> Result<Enquiry, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        let enquiry = guard.enquiries.get_mut(id).ok_or(StoreError::NotFound)?;
        if enquiry.revision != expected_revision {
            return Err(StoreError::Conflict);
        }

        if let Some(status) = patch.status {
            enquiry.status = status;
        }
        if let Some(response) = patch.supplier_response {
            enquiry.supplier_response = Some(response);
        }
        if let Some(date) = patch.supplier_response_date {
            enquiry.supplier_response_date = Some(date);
        }
        if let Some(price) = patch.final_price {
            enquiry.final_price = Some(price);
        }
        if let Some(flag) = patch.auto_accepted {
            enquiry.auto_accepted = flag;
        }
        if let Some(flag) = patch.replacement_requested {
            enquiry.replacement_requested = flag;
        }
        if let Some(at) = patch.replacement_requested_at {
            enquiry.replacement_requested_at = Some(at);
        }
        enquiry.updated_at = patch.updated_at;
        enquiry.revision += 1;

        Ok(enquiry.clone())
    }

    fn insert_alert(&self, alert: UrgentAlert) -> Result<AlertInsert, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        if let Some(existing) = guard.alerts.iter().find(|record| {
            record.alert.enquiry_id == alert.enquiry_id && record.alert.kind == alert.kind
        }) {
            return Ok(AlertInsert {
                id: existing.id.clone(),
                created: false,
            });
        }

        guard.alert_seq += 1;
        let id = AlertId(format!("alert-{:06}", guard.alert_seq));
        guard.alerts.push(AlertRecord {
            id: id.clone(),
            alert,
        });
        Ok(AlertInsert { id, created: true })
    }
}
