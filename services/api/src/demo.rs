use crate::infra::{seed_sample_marketplace, InMemoryNotifier};
use clap::Args;
use std::sync::Arc;

use partywise::enquiries::{
    EnquiryService, HydratedEnquiry, InMemoryEnquiryStore, ResponseDecision, ResponseRequest,
    SupplierId,
};
use partywise::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print full JSON payloads for each step instead of one-line summaries
    #[arg(long)]
    pub(crate) show_payloads: bool,
}

/// Walk the seeded marketplace through the whole lifecycle: list the
/// dashboard, open an enquiry, decline a paid booking (raising the
/// replacement alert), accept the other one, and read the badge counts.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryEnquiryStore::new());
    let seeded = seed_sample_marketplace(&store);
    let notifier = Arc::new(InMemoryNotifier::default());
    let service = EnquiryService::new(store.clone(), notifier.clone());

    println!("Enquiry lifecycle demo");

    let suppliers = service.suppliers_for_account(&seeded.account_id)?;
    println!("\nSupplier account {}", seeded.account_id);
    for supplier in &suppliers {
        let primary = if supplier.is_primary { " [primary]" } else { "" };
        println!(
            "- {} ({}){}",
            supplier.business_name, supplier.service_category, primary
        );
    }
    let supplier_ids: Vec<SupplierId> = suppliers
        .into_iter()
        .map(|supplier| supplier.id)
        .collect();

    let dashboard = service.list_enquiries(&supplier_ids, None)?;
    println!(
        "\nDashboard: {} paid enquiries (unpaid ones stay hidden)",
        dashboard.len()
    );
    for row in &dashboard {
        println!("- {}", describe(row));
    }
    println!("  ({} is unpaid, so it stays off the dashboard)", seeded.unpaid);
    if args.show_payloads {
        print_payload("Dashboard payload", &dashboard);
    }

    let detail = service.get_enquiry_detail(&seeded.pending_paid)?;
    println!(
        "\nOpened enquiry {} -> status {}",
        detail.enquiry.id, detail.enquiry.status
    );
    if args.show_payloads {
        print_payload("Detail payload", &detail);
    }

    let declined = service.respond(
        &seeded.pending_paid,
        ResponseRequest {
            decision: ResponseDecision::Declined,
            final_price: None,
            message: Some("Our team is fully booked that day.".to_string()),
        },
    )?;
    println!(
        "\nDeclined paid booking {} -> replacement requested: {}",
        declined.id, declined.replacement_requested
    );
    for record in store.alerts() {
        println!(
            "  Urgent alert {} [{}]: {}",
            record.id,
            record.alert.severity.label(),
            record.alert.message
        );
    }
    for (channel, notice) in notifier.events() {
        println!("  Notified {} about {}", channel.label(), notice.enquiry_id);
    }

    let accepted = service.respond(
        &seeded.viewed_paid,
        ResponseRequest {
            decision: ResponseDecision::Accepted,
            final_price: Some(15000),
            message: None,
        },
    )?;
    println!(
        "\nAccepted paid booking {} at {} minor units (auto-accept cleared: {})",
        accepted.id,
        accepted.final_price.unwrap_or(0),
        !accepted.auto_accepted
    );

    let counts = service.stats(&supplier_ids)?;
    print_payload("Badge counts (all enquiries, paid or not)", &counts);

    Ok(())
}

fn describe(row: &HydratedEnquiry) -> String {
    let customer = row
        .party
        .as_ref()
        .and_then(|party| party.user.as_ref())
        .map(|user| user.name.as_str())
        .unwrap_or("unknown customer");
    let theme = row
        .party
        .as_ref()
        .and_then(|party| party.detail.theme.as_deref())
        .unwrap_or("no theme");
    format!(
        "{} | {} | {} | {}",
        row.enquiry.id, row.enquiry.status, customer, theme
    )
}

fn print_payload<T: serde::Serialize>(heading: &str, payload: &T) {
    match serde_json::to_string_pretty(payload) {
        Ok(json) => println!("\n{heading}:\n{json}"),
        Err(err) => println!("\n{heading} unavailable: {err}"),
    }
}
