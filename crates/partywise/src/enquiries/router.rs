use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AccountId, EnquiryId, EnquiryStatus, SupplierId};
use super::lifecycle::ResponseRequest;
use super::repository::{EnquiryStore, ReplacementNotifier, StoreError};
use super::service::{EnquiryService, EnquiryServiceError};

/// Router builder exposing the enquiry lifecycle over HTTP.
pub fn enquiry_router<S, N>(service: Arc<EnquiryService<S, N>>) -> Router
where
    S: EnquiryStore + 'static,
    N: ReplacementNotifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/accounts/:account_id/enquiries",
            get(list_enquiries_handler::<S, N>),
        )
        .route(
            "/api/v1/accounts/:account_id/enquiries/stats",
            get(stats_handler::<S, N>),
        )
        .route(
            "/api/v1/enquiries/:enquiry_id",
            get(enquiry_detail_handler::<S, N>),
        )
        .route(
            "/api/v1/enquiries/:enquiry_id/response",
            post(respond_handler::<S, N>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    status: Option<String>,
}

pub(crate) async fn list_enquiries_handler<S, N>(
    State(service): State<Arc<EnquiryService<S, N>>>,
    Path(account_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: EnquiryStore + 'static,
    N: ReplacementNotifier + 'static,
{
    let status = match parse_status_filter(query.status.as_deref()) {
        Ok(status) => status,
        Err(rejection) => return rejection,
    };

    let account = AccountId(account_id);
    let result = service
        .suppliers_for_account(&account)
        .and_then(|suppliers| {
            let supplier_ids: Vec<SupplierId> =
                suppliers.into_iter().map(|supplier| supplier.id).collect();
            service.list_enquiries(&supplier_ids, status)
        });

    match result {
        Ok(enquiries) => (StatusCode::OK, axum::Json(enquiries)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn stats_handler<S, N>(
    State(service): State<Arc<EnquiryService<S, N>>>,
    Path(account_id): Path<String>,
) -> Response
where
    S: EnquiryStore + 'static,
    N: ReplacementNotifier + 'static,
{
    let account = AccountId(account_id);
    let result = service
        .suppliers_for_account(&account)
        .and_then(|suppliers| {
            let supplier_ids: Vec<SupplierId> =
                suppliers.into_iter().map(|supplier| supplier.id).collect();
            service.stats(&supplier_ids)
        });

    match result {
        Ok(counts) => (StatusCode::OK, axum::Json(counts)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn enquiry_detail_handler<S, N>(
    State(service): State<Arc<EnquiryService<S, N>>>,
    Path(enquiry_id): Path<String>,
) -> Response
where
    S: EnquiryStore + 'static,
    N: ReplacementNotifier + 'static,
{
    let id = EnquiryId(enquiry_id);
    match service.get_enquiry_detail(&id) {
        Ok(detail) => (StatusCode::OK, axum::Json(detail)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn respond_handler<S, N>(
    State(service): State<Arc<EnquiryService<S, N>>>,
    Path(enquiry_id): Path<String>,
    axum::Json(request): axum::Json<ResponseRequest>,
) -> Response
where
    S: EnquiryStore + 'static,
    N: ReplacementNotifier + 'static,
{
    let id = EnquiryId(enquiry_id);
    match service.respond(&id, request) {
        Ok(updated) => (StatusCode::OK, axum::Json(updated)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// An absent or empty `status` query means "all statuses"; anything else
/// must name a known status or the request is rejected before any work.
fn parse_status_filter(raw: Option<&str>) -> Result<Option<EnquiryStatus>, Response> {
    match raw {
        None => Ok(None),
        Some(value) if value.is_empty() => Ok(None),
        Some(value) => match value.parse::<EnquiryStatus>() {
            Ok(status) => Ok(Some(status)),
            Err(err) => {
                let payload = json!({ "error": err.to_string() });
                Err((StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response())
            }
        },
    }
}

impl IntoResponse for EnquiryServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            EnquiryServiceError::EnquiryNotFound { .. } => StatusCode::NOT_FOUND,
            EnquiryServiceError::NoSupplierProfile { .. } => StatusCode::FORBIDDEN,
            EnquiryServiceError::Transition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EnquiryServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            EnquiryServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
            EnquiryServiceError::Store(StoreError::Timeout | StoreError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        let payload = json!({ "error": self.to_string() });
        (status, axum::Json(payload)).into_response()
    }
}
