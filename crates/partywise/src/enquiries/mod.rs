//! The enquiry and booking lifecycle engine.
//!
//! An enquiry is one customer's request to one supplier for one service at
//! one party. This module reconciles enquiry rows with their party and
//! customer records via bounded batch reads, validates supplier responses
//! against the lifecycle state machine (with its payment-aware side
//! effects), and runs the urgent replacement workflow when a paid booking
//! is declined.

pub mod domain;
pub mod hydrate;
pub mod lifecycle;
pub mod memory;
pub mod replacement;
pub mod repository;
pub mod router;
pub mod service;
pub mod stats;

#[cfg(test)]
mod tests;

pub use domain::{
    AccountId, AddonDetail, AlertId, AlertKind, AlertRecord, AlertSeverity, Enquiry, EnquiryId,
    EnquiryStatus, HydratedEnquiry, HydratedParty, ParseEnquiryStatusError, Party, PartyId,
    PaymentStatus, ResponseDecision, Supplier, SupplierId, UrgentAlert, User, UserId,
};
pub use hydrate::Reconciler;
pub use lifecycle::{
    PlanOutcome, ResponseEffect, ResponsePlan, ResponseRequest, TransitionError,
    DEFAULT_ACCEPT_RESPONSE, DEFAULT_DECLINE_RESPONSE,
};
pub use memory::InMemoryEnquiryStore;
pub use replacement::ReplacementOrchestrator;
pub use repository::{
    AlertInsert, EnquiryFilter, EnquiryPatch, EnquiryStore, NotifyError, ReplacementContext,
    ReplacementNotifier, StoreError,
};
pub use router::enquiry_router;
pub use service::{EnquiryService, EnquiryServiceError};
pub use stats::{count_by_status, StatusCounts};
