use serde::{Deserialize, Serialize};

use super::domain::{Enquiry, EnquiryStatus};

/// Per-status enquiry counts backing the dashboard badges. Covers all
/// enquiries for a supplier, paid and unpaid alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub viewed: u64,
    pub accepted: u64,
    pub declined: u64,
    pub expired: u64,
    pub total: u64,
}

impl StatusCounts {
    pub fn record(&mut self, status: EnquiryStatus) {
        match status {
            EnquiryStatus::Pending => self.pending += 1,
            EnquiryStatus::Viewed => self.viewed += 1,
            EnquiryStatus::Accepted => self.accepted += 1,
            EnquiryStatus::Declined => self.declined += 1,
            EnquiryStatus::Expired => self.expired += 1,
        }
        self.total += 1;
    }
}

/// Fold a fresh read of enquiry rows into badge counts. Counts are always
/// recomputed from the store, never cached, so they cannot drift. Zero rows
/// is a valid answer, not an error.
pub fn count_by_status(enquiries: &[Enquiry]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for enquiry in enquiries {
        counts.record(enquiry.status);
    }
    counts
}
