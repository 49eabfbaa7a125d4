use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use tracing::{debug, warn};

use super::domain::{
    Enquiry, EnquiryStatus, HydratedEnquiry, HydratedParty, Party, PartyId, SupplierId, User,
    UserId,
};
use super::repository::{EnquiryFilter, EnquiryStore, StoreError};

/// Attaches related party and customer rows to raw enquiries. The store has
/// no join the engine trusts, so relations are reconstructed from batch
/// fetches and id-indexed maps: at most one read of parties and one of users
/// per call, never per-row lookups.
pub struct Reconciler<S> {
    store: Arc<S>,
}

impl<S: EnquiryStore> Reconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The supplier-facing list read: paid enquiries only, newest first,
    /// optionally narrowed to one status. The primary read is the only hard
    /// failure; everything after it degrades to partial hydration.
    pub fn list_for_suppliers(
        &self,
        supplier_ids: &[SupplierId],
        status: Option<EnquiryStatus>,
    ) -> Result<Vec<HydratedEnquiry>, StoreError> {
        let filter = EnquiryFilter::for_suppliers(supplier_ids.to_vec())
            .paid()
            .with_status(status);
        let enquiries = self.store.read_enquiries(&filter)?;
        Ok(self.hydrate(enquiries))
    }

    /// Hydrate a batch. Missing parties or customers surface as `None` on
    /// the affected records; the rest of the batch is unaffected.
    pub fn hydrate(&self, enquiries: Vec<Enquiry>) -> Vec<HydratedEnquiry> {
        let party_ids = distinct(enquiries.iter().map(|enquiry| enquiry.party_id.clone()));
        let parties = self.fetch_parties(&party_ids);

        let user_ids = distinct(parties.values().filter_map(|party| party.user_id.clone()));
        let users = self.fetch_users(&user_ids);

        enquiries
            .into_iter()
            .map(|enquiry| attach_relations(enquiry, &parties, &users))
            .collect()
    }

    /// Single-record hydration with the same bounded-read contract.
    pub fn hydrate_one(&self, enquiry: Enquiry) -> HydratedEnquiry {
        let parties = self.fetch_parties(std::slice::from_ref(&enquiry.party_id));
        let user_ids = distinct(parties.values().filter_map(|party| party.user_id.clone()));
        let users = self.fetch_users(&user_ids);
        attach_relations(enquiry, &parties, &users)
    }

    fn fetch_parties(&self, ids: &[PartyId]) -> HashMap<PartyId, Party> {
        if ids.is_empty() {
            return HashMap::new();
        }
        match self.store.read_parties(ids) {
            Ok(rows) => rows.into_iter().map(|party| (party.id.clone(), party)).collect(),
            Err(err) => {
                warn!(error = %err, "party batch fetch failed; continuing with partial hydration");
                HashMap::new()
            }
        }
    }

    fn fetch_users(&self, ids: &[UserId]) -> HashMap<UserId, User> {
        if ids.is_empty() {
            return HashMap::new();
        }
        match self.store.read_users(ids) {
            Ok(rows) => rows.into_iter().map(|user| (user.id.clone(), user)).collect(),
            Err(err) => {
                warn!(error = %err, "user batch fetch failed; continuing with partial hydration");
                HashMap::new()
            }
        }
    }
}

fn attach_relations(
    enquiry: Enquiry,
    parties: &HashMap<PartyId, Party>,
    users: &HashMap<UserId, User>,
) -> HydratedEnquiry {
    let party = match parties.get(&enquiry.party_id) {
        Some(detail) => {
            let user = detail.user_id.as_ref().and_then(|id| {
                let user = users.get(id).cloned();
                if user.is_none() {
                    debug!(enquiry = %enquiry.id, user = %id, "customer missing during hydration");
                }
                user
            });
            Some(HydratedParty {
                detail: detail.clone(),
                user,
            })
        }
        None => {
            debug!(enquiry = %enquiry.id, party = %enquiry.party_id, "party missing during hydration");
            None
        }
    };

    HydratedEnquiry { enquiry, party }
}

/// First-seen-order distinct ids for a batch fetch.
fn distinct<I, T>(ids: I) -> Vec<T>
where
    I: Iterator<Item = T>,
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(id.clone())).collect()
}
