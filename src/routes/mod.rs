//! Router Module Index
//!
//! Adapts controllers to axum. Each route forwards to a single controller
//! action; the controller's filter pipeline runs inside the dispatch.

use std::sync::Arc;

use axum::{
    extract::RawPathParams,
    http::StatusCode,
    routing::{MethodFilter, MethodRouter, on},
};

use crate::{
    controller::Controller,
    http::{Request, Response},
};

/// Routes under `/records`, served by the records controller.
pub mod records;

/// action
///
/// A method router that converts the incoming request (query, form and path
/// parameters included) and dispatches it to `action` on `controller`.
pub fn action<S>(
    filter: MethodFilter,
    controller: &Arc<Controller>,
    action: &str,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    let controller = Arc::clone(controller);
    let action = action.to_string();

    on(filter, move |path_params: RawPathParams, request: axum::extract::Request| {
        let controller = Arc::clone(&controller);
        let action = action.clone();
        async move {
            match Request::from_http(request, path_params.iter()).await {
                Ok(request) => controller.dispatch(&action, &request),
                Err(err) => {
                    tracing::warn!(error = %err, action = %action, "rejecting unreadable request");
                    Response::plain(StatusCode::BAD_REQUEST, "Bad Request")
                }
            }
        }
    })
}
