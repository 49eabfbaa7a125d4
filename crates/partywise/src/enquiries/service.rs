use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use super::domain::{
    AccountId, AlertId, Enquiry, EnquiryId, EnquiryStatus, HydratedEnquiry, Supplier, SupplierId,
};
use super::hydrate::Reconciler;
use super::lifecycle::{self, PlanOutcome, ResponseEffect, ResponseRequest, TransitionError};
use super::replacement::ReplacementOrchestrator;
use super::repository::{
    EnquiryFilter, EnquiryStore, ReplacementContext, ReplacementNotifier, StoreError,
};
use super::stats::{self, StatusCounts};

/// Service composing the reconciler, lifecycle planner, and replacement
/// orchestrator over one store.
pub struct EnquiryService<S, N> {
    store: Arc<S>,
    reconciler: Reconciler<S>,
    orchestrator: ReplacementOrchestrator<S, N>,
}

impl<S, N> EnquiryService<S, N>
where
    S: EnquiryStore + 'static,
    N: ReplacementNotifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        let reconciler = Reconciler::new(Arc::clone(&store));
        let orchestrator = ReplacementOrchestrator::new(Arc::clone(&store), notifier);
        Self {
            store,
            reconciler,
            orchestrator,
        }
    }

    /// The supplier dashboard's list view: paid enquiries only, hydrated,
    /// newest first.
    pub fn list_enquiries(
        &self,
        supplier_ids: &[SupplierId],
        status: Option<EnquiryStatus>,
    ) -> Result<Vec<HydratedEnquiry>, EnquiryServiceError> {
        Ok(self.reconciler.list_for_suppliers(supplier_ids, status)?)
    }

    /// Fetch one enquiry with relations attached. Reading detail flips a
    /// pending enquiry to viewed.
    pub fn get_enquiry_detail(
        &self,
        id: &EnquiryId,
    ) -> Result<HydratedEnquiry, EnquiryServiceError> {
        let enquiry = self.mark_viewed(id)?;
        Ok(self.reconciler.hydrate_one(enquiry))
    }

    /// Record that the supplier has seen the enquiry. A no-op on anything
    /// other than pending; losing the revision race to a concurrent writer
    /// resolves to that writer's state rather than an error.
    pub fn mark_viewed(&self, id: &EnquiryId) -> Result<Enquiry, EnquiryServiceError> {
        let prior = self.fetch(id)?;
        match lifecycle::plan_viewed(&prior, Utc::now()) {
            None => Ok(prior),
            Some(patch) => match self.store.update_enquiry(id, prior.revision, patch) {
                Ok(updated) => Ok(updated),
                Err(StoreError::Conflict) => {
                    debug!(enquiry = %id, "viewed flip lost a concurrent update; re-reading");
                    self.fetch(id)
                }
                Err(err) => Err(err.into()),
            },
        }
    }

    /// Apply a supplier's decision and run its side effects, returning the
    /// updated record. Replaying the decision already on record is
    /// idempotent; answering with the other decision, or answering an
    /// expired enquiry, is rejected before any write.
    pub fn respond(
        &self,
        id: &EnquiryId,
        request: ResponseRequest,
    ) -> Result<Enquiry, EnquiryServiceError> {
        let prior = self.fetch(id)?;
        let now = Utc::now();

        match lifecycle::plan_response(&prior, &request, now)? {
            PlanOutcome::AlreadyApplied => {
                // Re-raise through the deduplicating insert so a decline
                // whose alert write failed first time around still ends up
                // with its alert on file.
                if prior.replacement_requested {
                    self.raise_replacement(&prior)?;
                }
                Ok(prior)
            }
            PlanOutcome::Apply(plan) => {
                let updated = self.store.update_enquiry(id, prior.revision, plan.patch)?;
                for effect in &plan.effects {
                    match effect {
                        ResponseEffect::RaiseReplacementAlert => {
                            self.raise_replacement(&updated)?;
                        }
                    }
                }
                Ok(updated)
            }
        }
    }

    /// Badge counts over all of the suppliers' enquiries, paid or not,
    /// recomputed from the store on every call.
    pub fn stats(&self, supplier_ids: &[SupplierId]) -> Result<StatusCounts, EnquiryServiceError> {
        let filter = EnquiryFilter::for_suppliers(supplier_ids.to_vec());
        let enquiries = self.store.read_enquiries(&filter)?;
        Ok(stats::count_by_status(&enquiries))
    }

    /// Resolve the supplier businesses owned by an account. An account with
    /// none gets the distinguished onboarding error, not an empty list.
    pub fn suppliers_for_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<Supplier>, EnquiryServiceError> {
        let suppliers = self.store.suppliers_for_account(account_id)?;
        if suppliers.is_empty() {
            return Err(EnquiryServiceError::NoSupplierProfile {
                account_id: account_id.clone(),
            });
        }
        Ok(suppliers)
    }

    fn fetch(&self, id: &EnquiryId) -> Result<Enquiry, EnquiryServiceError> {
        self.store
            .read_enquiry(id)?
            .ok_or_else(|| EnquiryServiceError::EnquiryNotFound { id: id.clone() })
    }

    fn raise_replacement(&self, enquiry: &Enquiry) -> Result<AlertId, EnquiryServiceError> {
        let context = self.replacement_context(enquiry);
        Ok(self.orchestrator.raise(context)?)
    }

    /// Assemble operator context with best-effort lookups; a failed lookup
    /// leaves its field empty rather than blocking the alert.
    fn replacement_context(&self, enquiry: &Enquiry) -> ReplacementContext {
        let hydrated = self.reconciler.hydrate_one(enquiry.clone());
        let party = hydrated.party.as_ref();
        let customer = party.and_then(|party| party.user.as_ref());

        let service_category = self
            .store
            .read_suppliers(std::slice::from_ref(&enquiry.supplier_id))
            .ok()
            .and_then(|suppliers| suppliers.into_iter().next())
            .map(|supplier| supplier.service_category);

        ReplacementContext {
            enquiry_id: enquiry.id.clone(),
            party_id: enquiry.party_id.clone(),
            customer_name: customer.map(|user| user.name.clone()),
            customer_email: customer.map(|user| user.email.clone()),
            party_date: party.map(|party| party.detail.event_date),
            service_category,
            declined_message: enquiry
                .supplier_response
                .clone()
                .unwrap_or_else(|| lifecycle::DEFAULT_DECLINE_RESPONSE.to_string()),
        }
    }
}

/// Error raised by the enquiry service.
#[derive(Debug, thiserror::Error)]
pub enum EnquiryServiceError {
    #[error("enquiry '{id}' was not found")]
    EnquiryNotFound { id: EnquiryId },
    #[error(
        "account '{account_id}' has no supplier profile; complete supplier onboarding to receive enquiries"
    )]
    NoSupplierProfile { account_id: AccountId },
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
