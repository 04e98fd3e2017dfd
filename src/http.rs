use std::collections::HashMap;

use axum::{
    Form,
    body::Body,
    extract::{FromRequest, Query},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header},
    response::IntoResponse,
};

use crate::error::HttpError;

/// Upper bound on request bodies read by [`Request::from_http`] (mirrors axum's default limit).
pub const BODY_LIMIT: usize = 2 * 1024 * 1024;

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json; charset=utf-8";

/// Request
///
/// The request value every action and filter receives. Headers reuse axum's
/// `HeaderMap`, so lookups by name are case-insensitive.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: String,
    /// Query, form and path parameters merged into one string map.
    pub params: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: String::new(),
            params: HashMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Adds a header. Invalid header values are dropped with a warning.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(_) => tracing::warn!(header = %name, "dropping invalid request header value"),
        }
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// from_http
    ///
    /// Converts an incoming axum request into a controller request.
    ///
    /// Parameters are merged in this order, later sources overwriting earlier ones:
    /// query string, `application/x-www-form-urlencoded` body, path parameters.
    pub async fn from_http<'a>(
        request: axum::extract::Request,
        path_params: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, HttpError> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let headers = request.headers().clone();

        let mut params = Query::<HashMap<String, String>>::try_from_uri(request.uri())
            .map(|Query(query)| query)
            .unwrap_or_default();

        let bytes = axum::body::to_bytes(request.into_body(), BODY_LIMIT).await?;

        if is_form(&headers) {
            let mut form_request = axum::http::Request::new(Body::from(bytes.clone()));
            *form_request.method_mut() = method.clone();
            *form_request.headers_mut() = headers.clone();
            match Form::<HashMap<String, String>>::from_request(form_request, &()).await {
                Ok(Form(form)) => params.extend(form),
                Err(rejection) => tracing::debug!(%rejection, "ignoring undecodable form body"),
            }
        }

        params.extend(
            path_params
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );

        Ok(Self {
            method,
            path,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            params,
        })
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// Response
///
/// What actions, filters and the view helpers produce. A missing body is
/// distinct from an empty one (redirects and 406 responses carry none).
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// A `text/plain` response with the given status.
    pub fn plain(status: StatusCode, text: impl Into<String>) -> Self {
        Self::new(status)
            .with_header(header::CONTENT_TYPE, TEXT_PLAIN)
            .with_body(text)
    }

    pub fn not_found(text: impl Into<String>) -> Self {
        Self::plain(StatusCode::NOT_FOUND, text)
    }

    /// Sets a header. Invalid header values are dropped with a warning.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(_) => tracing::warn!(header = %name, "dropping invalid response header value"),
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    /// The body text, or `""` when the response has no body.
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let body = self.body.map(Body::from).unwrap_or_else(Body::empty);
        let mut response = axum::response::Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
