//! `POST /process`: validate, admit, acknowledge.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use mediarelay_core::{ProcessRequest, SubmitError};
use tracing::{info, warn};

use crate::http::errors::ApiError;
use crate::models::{ProcessAccepted, ProcessPayload};
use crate::state::ApiState;

pub(crate) async fn process(
    State(state): State<ApiState>,
    payload: Result<Json<ProcessPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ProcessAccepted>), ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected undecodable process request");
        ApiError::bad_request(rejection.body_text())
    })?;
    if payload.url.trim().is_empty() {
        return Err(ApiError::bad_request("url is required"));
    }

    let request = ProcessRequest::from(payload);
    let chat_id = request.chat_id;
    let user_id = request.user_id;
    match state.workflow.submit(request) {
        Ok(job_id) => {
            info!(%job_id, chat_id, user_id, "relay request accepted");
            Ok((StatusCode::ACCEPTED, Json(ProcessAccepted::started())))
        }
        Err(err) => {
            state.telemetry.inc_job_rejected();
            warn!(error = %err, chat_id, "relay request rejected");
            let detail = match err {
                SubmitError::Saturated { capacity } => {
                    format!("all {capacity} relay slots are busy; retry later")
                }
                SubmitError::ShuttingDown => "service is shutting down".to_string(),
            };
            Err(ApiError::service_unavailable(detail))
        }
    }
}
