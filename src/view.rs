//! View helpers: HTML and JSON rendering, redirects.
//!
//! The template and JSON engines sit behind traits so a controller only ever
//! holds a [`Renderer`]; the defaults are minijinja and serde_json.

use std::{path::Path, sync::Arc};

use axum::http::{StatusCode, header};
use minijinja::{Environment, ErrorKind, Value};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::Map;

use crate::{
    error::RenderError,
    http::{APPLICATION_JSON, Response, TEXT_HTML},
};

/// String-keyed attribute set handed to the engines.
pub type Attributes = Map<String, serde_json::Value>;

/// Objects that expose attributes for HTML templates.
pub trait HtmlRenderable {
    fn renderable_attributes(&self) -> Attributes;
}

/// Objects that expose attributes for JSON output.
pub trait JsonRenderable {
    fn renderable_json_attributes(&self) -> Attributes;
}

/// ViewContext
///
/// The data a view is rendered with: nothing, or a string-keyed attribute set
/// (either open or extracted from a renderable object).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ViewContext {
    #[default]
    Empty,
    Values(Attributes),
}

impl ViewContext {
    pub fn html(object: &dyn HtmlRenderable) -> Self {
        Self::Values(object.renderable_attributes())
    }

    pub fn json(object: &dyn JsonRenderable) -> Self {
        Self::Values(object.renderable_json_attributes())
    }
}

impl From<Attributes> for ViewContext {
    fn from(values: Attributes) -> Self {
        Self::Values(values)
    }
}

impl From<Option<Attributes>> for ViewContext {
    fn from(values: Option<Attributes>) -> Self {
        values.map_or(Self::Empty, Self::Values)
    }
}

impl From<Option<&dyn HtmlRenderable>> for ViewContext {
    fn from(object: Option<&dyn HtmlRenderable>) -> Self {
        object.map_or(Self::Empty, Self::html)
    }
}

impl From<Option<&dyn JsonRenderable>> for ViewContext {
    fn from(object: Option<&dyn JsonRenderable>) -> Self {
        object.map_or(Self::Empty, Self::json)
    }
}

/// TemplateEngine
///
/// Renders a named template with an attribute set.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, context: &Attributes) -> Result<String, RenderError>;

    fn has_template(&self, template: &str) -> bool;
}

/// MiniJinja-backed template engine.
///
/// Templates are loaded lazily from a views directory (or registered in
/// memory) and `{% include %}` resolves against the same source. Trailing
/// newlines are kept so output matches the template file byte for byte.
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    pub fn from_directory(views_dir: impl AsRef<Path>) -> Self {
        let mut env = Self::environment();
        env.set_loader(minijinja::path_loader(views_dir));
        Self { env }
    }

    pub fn from_templates<I, N, S>(templates: I) -> Result<Self, RenderError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut env = Self::environment();
        for (name, source) in templates {
            let (name, source): (String, String) = (name.into(), source.into());
            env.add_template_owned(name, source)?;
        }
        Ok(Self { env })
    }

    fn environment() -> Environment<'static> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, template: &str, context: &Attributes) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(template).map_err(|err| {
            if err.kind() == ErrorKind::TemplateNotFound {
                RenderError::MissingTemplate(template.to_string())
            } else {
                RenderError::Template(err)
            }
        })?;
        Ok(tmpl.render(Value::from_serialize(context))?)
    }

    fn has_template(&self, template: &str) -> bool {
        self.env.get_template(template).is_ok()
    }
}

/// JsonEngine
///
/// Serializes a JSON value into a response body.
pub trait JsonEngine: Send + Sync {
    fn render(&self, value: &serde_json::Value) -> Result<String, RenderError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonEngine {
    pub pretty: bool,
}

impl JsonEngine for SerdeJsonEngine {
    fn render(&self, value: &serde_json::Value) -> Result<String, RenderError> {
        let body = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(body)
    }
}

/// Renderer
///
/// Bundles the engines a controller renders with. Cheap to clone; actions
/// capture a clone.
#[derive(Clone)]
pub struct Renderer {
    templates: Arc<dyn TemplateEngine>,
    json: Arc<dyn JsonEngine>,
}

impl Renderer {
    pub fn new(templates: Arc<dyn TemplateEngine>, json: Arc<dyn JsonEngine>) -> Self {
        Self { templates, json }
    }

    /// render
    ///
    /// Renders `template` as a 200 `text/html` response. Engine failures
    /// become a 500 response.
    pub fn render(&self, template: &str, context: impl Into<ViewContext>) -> Response {
        let context: ViewContext = context.into();
        let values = match context {
            ViewContext::Empty => Attributes::new(),
            ViewContext::Values(values) => values,
        };

        match self.templates.render(template, &values) {
            Ok(body) => Response::new(StatusCode::OK)
                .with_header(header::CONTENT_TYPE, TEXT_HTML)
                .with_body(body),
            Err(err) => render_failure(err),
        }
    }

    /// render_json
    ///
    /// Renders a 200 `application/json` response. An empty context renders
    /// as `null`.
    pub fn render_json(&self, context: impl Into<ViewContext>) -> Response {
        let context: ViewContext = context.into();
        let body = match context {
            ViewContext::Empty => Ok("null".to_string()),
            ViewContext::Values(values) => self.json.render(&serde_json::Value::Object(values)),
        };

        match body {
            Ok(body) => Response::new(StatusCode::OK)
                .with_header(header::CONTENT_TYPE, APPLICATION_JSON)
                .with_body(body),
            Err(err) => render_failure(err),
        }
    }
}

fn render_failure(err: RenderError) -> Response {
    tracing::error!(error = %err, "view rendering failed");
    Response::plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

/// Bytes a `Location` value cannot carry verbatim. Non-ASCII is always encoded.
const LOCATION_ENCODE_SET: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

/// redirect_to
///
/// A 302 redirect to `path`, without a body. Characters a header value cannot
/// hold are percent-encoded; existing escapes, `/`, `?` and `#` pass through.
pub fn redirect_to(path: &str) -> Response {
    let location = utf8_percent_encode(path, LOCATION_ENCODE_SET).to_string();
    Response::new(StatusCode::FOUND).with_header(header::LOCATION, &location)
}
