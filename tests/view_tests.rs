use axum::http::StatusCode;
use mvc_controller::{
    HtmlRenderable, JsonRenderable, MiniJinjaEngine, Renderer, SerdeJsonEngine, ViewContext,
    error::RenderError,
    redirect_to,
    view::{Attributes, JsonEngine, TemplateEngine},
};
use serde_json::{Value, json};
use std::sync::Arc;

// --- Test Utilities ---

struct Person {
    name: &'static str,
}

impl HtmlRenderable for Person {
    fn renderable_attributes(&self) -> Attributes {
        Attributes::from_iter([("name".to_string(), Value::from(self.name))])
    }
}

impl JsonRenderable for Person {
    fn renderable_json_attributes(&self) -> Attributes {
        Attributes::from_iter([
            ("name".to_string(), Value::from(self.name)),
            ("kind".to_string(), Value::from("person")),
        ])
    }
}

struct FailingJson;

impl JsonEngine for FailingJson {
    fn render(&self, _value: &Value) -> Result<String, RenderError> {
        Err(RenderError::MissingTemplate("json".to_string()))
    }
}

fn renderer() -> Renderer {
    let engine = MiniJinjaEngine::from_templates([
        ("hello.html", "Hello, {{ name | default('nobody') }}!"),
        ("broken.html", "{% include \"missing.html\" %}"),
    ])
    .unwrap();
    Renderer::new(Arc::new(engine), Arc::new(SerdeJsonEngine::default()))
}

// --- HTML ---

#[test]
fn test_render_without_context() {
    let response = renderer().render("hello.html", ViewContext::Empty);

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), Some("text/html; charset=utf-8"));
    assert_eq!(response.body_text(), "Hello, nobody!");
}

#[test]
fn test_render_with_renderable_object() {
    let person = Person { name: "Ada" };

    let response = renderer().render("hello.html", ViewContext::html(&person));

    assert_eq!(response.body_text(), "Hello, Ada!");
}

#[test]
fn test_render_with_open_context() {
    let context = json!({ "name": "Grace" }).as_object().cloned().unwrap();

    let response = renderer().render("hello.html", context);

    assert_eq!(response.body_text(), "Hello, Grace!");
}

#[test]
fn test_render_missing_template_is_a_server_error_response() {
    let response = renderer().render("nope.html", ViewContext::Empty);

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.content_type(), Some("text/plain; charset=utf-8"));
}

#[test]
fn test_render_broken_template_is_a_server_error_response() {
    let response = renderer().render("broken.html", ViewContext::Empty);

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_template_engine_reports_missing_template() {
    let engine = MiniJinjaEngine::from_templates([("a.html", "a")]).unwrap();

    assert!(engine.has_template("a.html"));
    assert!(!engine.has_template("b.html"));
    assert!(matches!(
        engine.render("b.html", &Attributes::new()),
        Err(RenderError::MissingTemplate(name)) if name == "b.html"
    ));
}

// --- JSON ---

#[test]
fn test_render_json_empty_context_is_null() {
    let response = renderer().render_json(ViewContext::Empty);

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), Some("application/json; charset=utf-8"));
    assert_eq!(response.body_text(), "null");
}

#[test]
fn test_render_json_absent_object_is_null() {
    let person: Option<&dyn JsonRenderable> = None;

    assert_eq!(renderer().render_json(person).body_text(), "null");
}

#[test]
fn test_render_json_uses_json_attributes() {
    let person = Person { name: "Ada" };

    let response = renderer().render_json(ViewContext::json(&person));

    assert_eq!(response.body_text(), r#"{"name":"Ada","kind":"person"}"#);
}

#[test]
fn test_render_json_pretty() {
    let renderer = Renderer::new(
        Arc::new(MiniJinjaEngine::from_templates([("x", "x")]).unwrap()),
        Arc::new(SerdeJsonEngine { pretty: true }),
    );
    let context = json!({ "a": 1 }).as_object().cloned().unwrap();

    assert_eq!(renderer.render_json(context).body_text(), "{\n  \"a\": 1\n}");
}

#[test]
fn test_render_json_engine_failure_is_a_server_error_response() {
    let renderer = Renderer::new(
        Arc::new(MiniJinjaEngine::from_templates([("x", "x")]).unwrap()),
        Arc::new(FailingJson),
    );
    let context = json!({ "a": 1 }).as_object().cloned().unwrap();

    assert_eq!(
        renderer.render_json(context).status,
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

// --- Redirect ---

#[test]
fn test_redirect_to_sets_location_without_body() {
    let response = redirect_to("/items/1");

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.header("Location"), Some("/items/1"));
    assert!(response.body.is_none());
}

#[test]
fn test_redirect_to_encodes_non_ascii_path() {
    let response = redirect_to("/records/ąčę");

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.header("Location"), Some("/records/%C4%85%C4%8D%C4%99"));
}

#[test]
fn test_redirect_to_keeps_query_and_existing_escapes() {
    let response = redirect_to("/records?name=James%20Bond&page=2");

    assert_eq!(
        response.header("Location"),
        Some("/records?name=James%20Bond&page=2")
    );
}
