use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::domain::{AlertId, AlertKind, AlertSeverity, UrgentAlert};
use super::repository::{
    EnquiryStore, NotifyError, ReplacementContext, ReplacementNotifier, StoreError,
};

/// Runs the replacement workflow for a paid booking its supplier declined.
/// The durable alert write comes first and must be confirmed; the chat and
/// email channels are best-effort and isolated from each other.
pub struct ReplacementOrchestrator<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> ReplacementOrchestrator<S, N>
where
    S: EnquiryStore,
    N: ReplacementNotifier,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    /// Persist the critical alert, then fan out to the channels. The alert
    /// write is the only failure this reports; a deduplicated insert skips
    /// the fan-out, so replays never re-page anyone.
    pub fn raise(&self, context: ReplacementContext) -> Result<AlertId, StoreError> {
        let alert = UrgentAlert {
            kind: AlertKind::SupplierDecline,
            severity: AlertSeverity::Critical,
            party_id: context.party_id.clone(),
            enquiry_id: context.enquiry_id.clone(),
            message: context.operator_summary(),
            data: serde_json::to_value(&context).unwrap_or(Value::Null),
            created_at: Utc::now(),
        };

        let inserted = self.store.insert_alert(alert)?;

        if inserted.created {
            info!(
                alert = %inserted.id,
                enquiry = %context.enquiry_id,
                "replacement alert recorded for declined paid booking"
            );
            self.dispatch(&context);
        } else {
            debug!(
                alert = %inserted.id,
                enquiry = %context.enquiry_id,
                "replacement alert already on file"
            );
        }

        Ok(inserted.id)
    }

    fn dispatch(&self, context: &ReplacementContext) {
        if let Err(err) = self.notifier.send_chat_alert(context) {
            log_channel_failure("chat", context, &err);
        }
        if let Err(err) = self.notifier.send_email_alert(context) {
            log_channel_failure("email", context, &err);
        }
    }
}

fn log_channel_failure(channel: &str, context: &ReplacementContext, err: &NotifyError) {
    warn!(
        channel,
        enquiry = %context.enquiry_id,
        error = %err,
        "replacement channel notification failed"
    );
}
