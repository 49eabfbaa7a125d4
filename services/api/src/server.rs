use crate::cli::ServeArgs;
use crate::infra::{seed_sample_marketplace, AppState, InMemoryNotifier};
use crate::routes::with_enquiry_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use partywise::config::AppConfig;
use partywise::enquiries::{EnquiryService, InMemoryEnquiryStore};
use partywise::error::AppError;
use partywise::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryEnquiryStore::new());
    if args.seed {
        let seeded = seed_sample_marketplace(&store);
        info!(account = %seeded.account_id, "seeded sample marketplace");
    }
    let notifier = Arc::new(InMemoryNotifier::default());
    let enquiry_service = Arc::new(EnquiryService::new(store, notifier));

    let app = with_enquiry_routes(enquiry_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "enquiry engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
