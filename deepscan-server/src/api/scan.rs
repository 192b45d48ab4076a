//! Scan API Handlers
//!
//! Package scan submission from the web form.

use axum::{
    Form, Json,
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
};
use deepscan_core::dto::scan::PackageScanRequest;

use crate::api::error::{ApiError, ApiResult};
use crate::service::scan_service;
use crate::state::AppState;

/// Package scan request sent either as a form or as JSON
pub struct PackageSubmission(pub PackageScanRequest);

impl<S> FromRequest<S> for PackageSubmission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let request = if is_json {
            Json::<PackageScanRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?
                .0
        } else {
            Form::<PackageScanRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?
                .0
        };

        Ok(Self(request))
    }
}

/// POST /package
/// Run a package scan and answer the submitted values once it finished
pub async fn scan_package(
    State(state): State<AppState>,
    PackageSubmission(request): PackageSubmission,
) -> ApiResult<Json<PackageScanRequest>> {
    tracing::info!("Package scan requested for {}@{}", request.name, request.version);

    let outcome = scan_service::scan_package(&state, request.clone())
        .await
        .map_err(|e| match e {
            scan_service::ScanServiceError::Scan(err) => ApiError::from(err),
            scan_service::ScanServiceError::Interrupted(msg) => {
                ApiError::InternalError(format!("Scan interrupted: {}", msg))
            }
        })?;

    tracing::info!(
        "Package scan of {}@{} found {} violation(s)",
        request.name,
        request.version,
        outcome.violations.len()
    );

    Ok(Json(request))
}
