use std::sync::Arc;

use axum::http::StatusCode;

use crate::{
    controller::{Controller, FallbackScoping, FilterOptions, FilterProviderState},
    http::{Request, Response},
    models::RecordCollection,
    negotiate::{Responders, respond_to},
    repository::RepositoryState,
    view::{Renderer, ViewContext, redirect_to},
};

pub const RECORD_NOT_FOUND: &str = "Record Not Found";

/// application_controller
///
/// Filters shared by every controller in the application. Child controllers
/// reference these by name in their own before/after tables.
///
/// - `log_request`: logs the request line, never aborts.
/// - `require_accept`: answers 406 when the request has no `Accept` header.
pub fn application_controller() -> Controller {
    Controller::build(None, |c| {
        c.filter("log_request", |request| {
            tracing::info!(method = %request.method, path = %request.path, "handling request");
            None
        });

        c.filter("require_accept", |request| {
            if request.header("accept").is_none() {
                return Some(Response::plain(
                    StatusCode::NOT_ACCEPTABLE,
                    "Missing Accept header",
                ));
            }
            None
        });
    })
}

/// records_controller
///
/// CRUD-style controller over the record repository.
///
/// | action   | response                                             |
/// |----------|------------------------------------------------------|
/// | `index`  | every record, as HTML or JSON depending on `Accept`  |
/// | `show`   | one record (`id` param) as HTML                      |
/// | `new`    | the creation form                                    |
/// | `create` | stores the params as a record, redirects to it       |
/// | `update` | merges the params into a record, redirects to it     |
///
/// `show` and `update` are guarded by `load_record`, which answers 404 for an
/// unknown or malformed id before the action runs.
pub fn records_controller(
    repo: RepositoryState,
    renderer: Renderer,
    application: Option<FilterProviderState>,
    scoping: FallbackScoping,
) -> Controller {
    Controller::build(application, |c| {
        c.set_fallback_scoping(scoping);

        // --- Filters ---

        let filter_repo = repo.clone();
        c.filter("load_record", move |request| {
            let found = record_id(request).and_then(|id| filter_repo.find(id));
            match found {
                Some(_) => None,
                None => Some(Response::not_found(RECORD_NOT_FOUND)),
            }
        });

        c.filter("audit", |request| {
            tracing::info!(
                method = %request.method,
                path = %request.path,
                params = ?request.params,
                "record action completed"
            );
            None
        });

        c.before_action("log_request", None);
        c.before_action("require_accept", None);
        c.before_action("load_record", FilterOptions::only(["show", "update"]));
        c.after_action("audit", FilterOptions::skip(["index"]));

        // --- Actions ---

        let (index_repo, index_renderer) = (repo.clone(), renderer.clone());
        c.action("index", move |request| {
            let records = index_repo.all();
            let collection = RecordCollection {
                key: "records",
                records: &records,
            };
            respond_to(
                request,
                Responders::new()
                    .html(|| {
                        index_renderer.render("records/index.html", ViewContext::html(&collection))
                    })
                    .json(|| index_renderer.render_json(ViewContext::json(&collection))),
            )
        });

        let (show_repo, show_renderer) = (repo.clone(), renderer.clone());
        c.action("show", move |request| {
            match record_id(request).and_then(|id| show_repo.find(id)) {
                Some(record) => {
                    show_renderer.render("records/show.html", ViewContext::html(&record))
                }
                None => Response::not_found(RECORD_NOT_FOUND),
            }
        });

        let new_renderer = renderer.clone();
        c.action("new", move |_request| {
            new_renderer.render("records/new.html", ViewContext::Empty)
        });

        let create_repo = repo.clone();
        c.action("create", move |request| {
            let record = create_repo.create(record_attributes(request));
            redirect_to(&format!("/records/{}", record.id))
        });

        let update_repo = Arc::clone(&repo);
        c.action("update", move |request| {
            let updated = record_id(request)
                .and_then(|id| update_repo.update(id, record_attributes(request)));
            match updated {
                Some(record) => redirect_to(&format!("/records/{}", record.id)),
                None => Response::not_found(RECORD_NOT_FOUND),
            }
        });
    })
}

fn record_id(request: &Request) -> Option<u64> {
    request.param("id")?.parse().ok()
}

// Params other than `id`, sorted by key so stored attribute order is stable.
fn record_attributes(request: &Request) -> Vec<(String, String)> {
    let mut attributes: Vec<(String, String)> = request
        .params
        .iter()
        .filter(|(key, _)| key.as_str() != "id")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    attributes.sort();
    attributes
}
