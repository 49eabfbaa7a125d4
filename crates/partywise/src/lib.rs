//! Partywise: the enquiry and booking lifecycle engine for a party-planning
//! marketplace. Suppliers receive customer enquiries, answer them, and the
//! engine keeps paid bookings safe when a supplier pulls out.

pub mod config;
pub mod enquiries;
pub mod error;
pub mod telemetry;

pub use error::AppError;
