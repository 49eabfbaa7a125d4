use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Enquiry, EnquiryStatus, PaymentStatus, ResponseDecision};
use super::repository::EnquiryPatch;

/// Recorded when an accepting supplier sends no message of their own.
pub const DEFAULT_ACCEPT_RESPONSE: &str =
    "Great news! We'd love to be part of your celebration and have confirmed this booking.";

/// Recorded when a declining supplier sends no message of their own.
pub const DEFAULT_DECLINE_RESPONSE: &str =
    "Unfortunately we're unable to take this booking. We're sorry we can't be part of your celebration.";

/// A supplier's answer to an enquiry as it arrives from the API edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRequest {
    pub decision: ResponseDecision,
    pub final_price: Option<u32>,
    pub message: Option<String>,
}

/// Side effects the service must run once the status write has committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseEffect {
    RaiseReplacementAlert,
}

/// The planned write plus its follow-up effects.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsePlan {
    pub patch: EnquiryPatch,
    pub effects: Vec<ResponseEffect>,
}

/// Outcome of planning a response against prior state.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    /// The transition is allowed; apply the patch, then run the effects.
    Apply(ResponsePlan),
    /// The same decision is already on record; nothing to write, no effects.
    AlreadyApplied,
}

/// Transition rejections, raised before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("enquiry has expired and can no longer be answered")]
    Expired,
    #[error("enquiry is already {current}; it cannot change to {requested}")]
    AlreadyResolved {
        current: EnquiryStatus,
        requested: EnquiryStatus,
    },
}

/// Plan the pending -> viewed flip that reading enquiry detail triggers.
/// Detail reads must be safe to repeat, so any other prior status is a no-op
/// rather than an error.
pub fn plan_viewed(prior: &Enquiry, now: DateTime<Utc>) -> Option<EnquiryPatch> {
    match prior.status {
        EnquiryStatus::Pending => {
            let mut patch = EnquiryPatch::touch(now);
            patch.status = Some(EnquiryStatus::Viewed);
            Some(patch)
        }
        EnquiryStatus::Viewed
        | EnquiryStatus::Accepted
        | EnquiryStatus::Declined
        | EnquiryStatus::Expired => None,
    }
}

/// Plan a supplier response. Pure over prior state, the request, and the
/// clock; the caller owns persistence and effect execution.
pub fn plan_response(
    prior: &Enquiry,
    request: &ResponseRequest,
    now: DateTime<Utc>,
) -> Result<PlanOutcome, TransitionError> {
    let requested = request.decision.as_status();

    match prior.status {
        EnquiryStatus::Expired => Err(TransitionError::Expired),
        EnquiryStatus::Accepted | EnquiryStatus::Declined if prior.status == requested => {
            Ok(PlanOutcome::AlreadyApplied)
        }
        EnquiryStatus::Accepted | EnquiryStatus::Declined => Err(TransitionError::AlreadyResolved {
            current: prior.status,
            requested,
        }),
        EnquiryStatus::Pending | EnquiryStatus::Viewed => {
            let mut patch = EnquiryPatch::touch(now);
            patch.status = Some(requested);
            patch.supplier_response = Some(response_text(request));
            patch.supplier_response_date = Some(now);

            if request.decision == ResponseDecision::Accepted {
                patch.final_price = request.final_price;
            }

            let mut effects = Vec::new();
            // Payment-aware branch: both sides key off state as it stood
            // before this write, read once.
            if prior.payment_status == PaymentStatus::Paid && prior.auto_accepted {
                match request.decision {
                    ResponseDecision::Accepted => {
                        // The provisional acceptance becomes a real one.
                        patch.auto_accepted = Some(false);
                    }
                    ResponseDecision::Declined => {
                        patch.replacement_requested = Some(true);
                        patch.replacement_requested_at = Some(now);
                        effects.push(ResponseEffect::RaiseReplacementAlert);
                    }
                }
            }

            Ok(PlanOutcome::Apply(ResponsePlan { patch, effects }))
        }
    }
}

fn response_text(request: &ResponseRequest) -> String {
    match &request.message {
        Some(message) if !message.trim().is_empty() => message.clone(),
        _ => match request.decision {
            ResponseDecision::Accepted => DEFAULT_ACCEPT_RESPONSE.to_string(),
            ResponseDecision::Declined => DEFAULT_DECLINE_RESPONSE.to_string(),
        },
    }
}
