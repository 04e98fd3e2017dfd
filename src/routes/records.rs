use std::sync::Arc;

use axum::{Router, routing::MethodFilter};

use super::action;
use crate::controller::Controller;

/// Records Router
///
/// | route                 | action   |
/// |-----------------------|----------|
/// | `GET /records`        | `index`  |
/// | `POST /records`       | `create` |
/// | `GET /records/new`    | `new`    |
/// | `GET /records/{id}`   | `show`   |
/// | `POST /records/{id}`  | `update` |
pub fn records_routes(controller: Arc<Controller>) -> Router {
    Router::new()
        .route(
            "/records",
            action(MethodFilter::GET, &controller, "index")
                .merge(action(MethodFilter::POST, &controller, "create")),
        )
        .route("/records/new", action(MethodFilter::GET, &controller, "new"))
        .route(
            "/records/{id}",
            action(MethodFilter::GET, &controller, "show")
                .merge(action(MethodFilter::POST, &controller, "update")),
        )
}
