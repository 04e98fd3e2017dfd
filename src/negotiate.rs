//! Content negotiation over the `Accept` header.

use std::collections::{HashMap, HashSet};

use axum::http::{StatusCode, header};
use once_cell::sync::Lazy;

use crate::http::{Request, Response};

static DEFAULT_MIME_TYPES: Lazy<MimeTypes> = Lazy::new(MimeTypes::default);

/// MimeTypes
///
/// Maps short labels (`html`, `json`) to MIME types and holds the set of
/// types the server is willing to produce.
#[derive(Debug, Clone)]
pub struct MimeTypes {
    labels: HashMap<String, String>,
    accepted: HashSet<String>,
}

impl Default for MimeTypes {
    fn default() -> Self {
        let mut mimes = Self::empty();
        mimes.register("html", "text/html");
        mimes.register("json", "application/json");
        mimes.register("text", "text/plain");
        mimes.register("xml", "application/xml");
        mimes
    }
}

impl MimeTypes {
    pub fn empty() -> Self {
        Self {
            labels: HashMap::new(),
            accepted: HashSet::new(),
        }
    }

    /// Registers `label` for `mime` and marks the type as accepted.
    pub fn register(&mut self, label: &str, mime: &str) {
        let mime = mime.to_ascii_lowercase();
        self.labels.insert(label.to_ascii_lowercase(), mime.clone());
        self.accepted.insert(mime);
    }

    /// Stops producing `mime` without forgetting its label.
    pub fn reject(&mut self, mime: &str) {
        self.accepted.remove(&mime.to_ascii_lowercase());
    }

    pub fn accepts(&self, mime: &str) -> bool {
        self.accepted.contains(mime)
    }

    /// mime_type
    ///
    /// Canonical MIME type for a label or an `Accept` token: parameters are
    /// dropped, case is folded, and `type/subtype` tokens pass through.
    pub fn mime_type(&self, token: &str) -> Option<String> {
        let token = token.split(';').next().unwrap_or_default().trim();
        if token.is_empty() {
            return None;
        }
        let token = token.to_ascii_lowercase();
        if token.contains('/') {
            return Some(token);
        }
        self.labels.get(&token).cloned()
    }
}

type Responder<'a> = Box<dyn FnOnce() -> Response + 'a>;

/// Responders
///
/// Response producers keyed by label, tried in insertion order.
#[derive(Default)]
pub struct Responders<'a> {
    entries: Vec<(String, Responder<'a>)>,
}

impl<'a> Responders<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        mut self,
        label: impl Into<String>,
        responder: impl FnOnce() -> Response + 'a,
    ) -> Self {
        self.entries.push((label.into(), Box::new(responder)));
        self
    }

    pub fn html(self, responder: impl FnOnce() -> Response + 'a) -> Self {
        self.on("html", responder)
    }

    pub fn json(self, responder: impl FnOnce() -> Response + 'a) -> Self {
        self.on("json", responder)
    }
}

/// respond_to
///
/// Picks a responder from the request's `Accept` header using the default
/// MIME table. See [`respond_to_with`].
pub fn respond_to(request: &Request, responders: Responders<'_>) -> Response {
    respond_to_with(&DEFAULT_MIME_TYPES, request, responders)
}

/// respond_to_with
///
/// Candidates from the `Accept` header are tried in header order. A candidate
/// selects the first responder whose label maps to the same accepted type;
/// `*/*` selects the first responder with an accepted type and `type/*` the
/// first one sharing the top-level type. Without a match the answer is 406
/// with no body.
pub fn respond_to_with(
    mimes: &MimeTypes,
    request: &Request,
    responders: Responders<'_>,
) -> Response {
    let accept = request.header(header::ACCEPT.as_str()).unwrap_or_default();

    let offered: Vec<Option<String>> = responders
        .entries
        .iter()
        .map(|(label, _)| mimes.mime_type(label).filter(|mime| mimes.accepts(mime)))
        .collect();

    let selected = accept
        .split(',')
        .filter_map(|candidate| mimes.mime_type(candidate))
        .find_map(|candidate| {
            offered.iter().position(|mime| {
                mime.as_deref()
                    .is_some_and(|mime| media_range_matches(&candidate, mime))
            })
        });

    match selected.and_then(|index| responders.entries.into_iter().nth(index)) {
        Some((label, responder)) => {
            tracing::debug!(%label, accept, "negotiated response format");
            responder()
        }
        None => {
            tracing::debug!(accept, "no acceptable response format");
            Response::new(StatusCode::NOT_ACCEPTABLE)
        }
    }
}

fn media_range_matches(range: &str, mime: &str) -> bool {
    if range == "*/*" {
        return true;
    }
    match range.strip_suffix("/*") {
        Some(top_level) => mime.split('/').next() == Some(top_level),
        None => range == mime,
    }
}
