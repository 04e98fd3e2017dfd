//! Controller Module
//!
//! A controller maps action names to handlers and wraps every dispatch in an
//! ordered pipeline of named before/after filters:
//!
//! ```text
//! resolve(action)
//!   → before filters   (first Some(response) short-circuits; the action never runs)
//!   → action
//!   → after filters    (first Some(response) replaces the action's response)
//!   → action response
//! ```
//!
//! Filter names are resolved against the controller's own filters first and
//! then against the application controller handed in at construction.
//! Nothing in the pipeline is an error: a missing action, an aborting filter
//! and a missing filter are all ordinary outcomes.

pub mod filters;

use std::{collections::HashMap, sync::Arc};

use crate::http::{Request, Response};

pub use filters::{FallbackScoping, FilterChain, FilterOptions, FilterPhase, should_run};

/// A named request handler.
pub type Action = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

/// A named filter. `Some(response)` aborts the remaining pipeline.
pub type Filter = Arc<dyn Fn(&Request) -> Option<Response> + Send + Sync>;

/// FilterProvider
///
/// A source of named filters. Every [`Controller`] is one; the application
/// controller is passed to child controllers as a `FilterProviderState`.
pub trait FilterProvider: Send + Sync {
    fn find_filter(&self, name: &str) -> Option<Filter>;
}

/// Shared handle to the application-wide filter source.
pub type FilterProviderState = Arc<dyn FilterProvider>;

pub const ACTION_NOT_FOUND: &str = "Action Not Found";

/// Controller
///
/// Registries are filled by the setup hook and are read-only afterwards;
/// dispatch only takes `&self`.
#[derive(Default)]
pub struct Controller {
    actions: HashMap<String, Action>,
    filters: HashMap<String, Filter>,
    before_filters: FilterChain,
    after_filters: FilterChain,
    application: Option<FilterProviderState>,
    fallback_scoping: FallbackScoping,
}

impl Controller {
    /// A controller with no application controller behind it.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_application(application: FilterProviderState) -> Self {
        Self {
            application: Some(application),
            ..Self::default()
        }
    }

    /// build
    ///
    /// Constructs a controller and runs its setup hook once. Registration of
    /// actions, filters and scope rules happens inside `setup`.
    pub fn build<F>(application: Option<FilterProviderState>, setup: F) -> Self
    where
        F: FnOnce(&mut Controller),
    {
        let mut controller = Self {
            application,
            ..Self::default()
        };
        setup(&mut controller);
        controller
    }

    pub fn set_fallback_scoping(&mut self, scoping: FallbackScoping) {
        self.fallback_scoping = scoping;
    }

    pub fn fallback_scoping(&self) -> FallbackScoping {
        self.fallback_scoping
    }

    // --- Registration ---

    pub fn action<F>(&mut self, name: impl Into<String>, body: F)
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(body));
    }

    pub fn filter<F>(&mut self, name: impl Into<String>, body: F)
    where
        F: Fn(&Request) -> Option<Response> + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Arc::new(body));
    }

    pub fn before_action(
        &mut self,
        filter: impl Into<String>,
        options: impl Into<Option<FilterOptions>>,
    ) {
        self.before_filters.insert(filter, options.into());
    }

    pub fn after_action(
        &mut self,
        filter: impl Into<String>,
        options: impl Into<Option<FilterOptions>>,
    ) {
        self.after_filters.insert(filter, options.into());
    }

    // --- Lookup ---

    pub fn lookup_action(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn before_filters(&self) -> &FilterChain {
        &self.before_filters
    }

    pub fn after_filters(&self) -> &FilterChain {
        &self.after_filters
    }

    // --- Dispatch ---

    /// Returns the filtered handler for `action_name`. Resolution never fails;
    /// an unknown action yields a handler answering 404.
    pub fn resolve(&self, action_name: impl Into<String>) -> Handler<'_> {
        Handler {
            controller: self,
            action_name: action_name.into(),
        }
    }

    pub fn dispatch(&self, action_name: &str, request: &Request) -> Response {
        let Some(action) = self.actions.get(action_name) else {
            tracing::warn!(action = action_name, "no action registered");
            return Response::not_found(ACTION_NOT_FOUND);
        };

        tracing::debug!(
            action = action_name,
            method = %request.method,
            path = %request.path,
            "dispatching"
        );

        if let Some(response) =
            self.run_filters(FilterPhase::Before, &self.before_filters, action_name, request)
        {
            return response;
        }

        let response = action(request);

        if let Some(response) =
            self.run_filters(FilterPhase::After, &self.after_filters, action_name, request)
        {
            return response;
        }

        response
    }

    fn run_filters(
        &self,
        phase: FilterPhase,
        chain: &FilterChain,
        action_name: &str,
        request: &Request,
    ) -> Option<Response> {
        for (name, options) in chain.iter() {
            let response = if let Some(filter) = self.filters.get(name) {
                if !should_run(options, action_name) {
                    continue;
                }
                filter(request)
            } else if let Some(filter) = self.application_filter(name) {
                if self.fallback_scoping == FallbackScoping::Scoped
                    && !should_run(options, action_name)
                {
                    continue;
                }
                filter(request)
            } else {
                tracing::trace!(filter = name, %phase, "filter not registered, skipping");
                continue;
            };

            if let Some(response) = response {
                tracing::debug!(
                    filter = name,
                    %phase,
                    action = action_name,
                    status = %response.status,
                    "filter short-circuited dispatch"
                );
                return Some(response);
            }
        }
        None
    }

    fn application_filter(&self, name: &str) -> Option<Filter> {
        self.application.as_ref()?.find_filter(name)
    }
}

impl FilterProvider for Controller {
    fn find_filter(&self, name: &str) -> Option<Filter> {
        self.filters.get(name).cloned()
    }
}

/// Handler
///
/// A controller action bound to its filter pipeline, as returned by
/// [`Controller::resolve`].
pub struct Handler<'a> {
    controller: &'a Controller,
    action_name: String,
}

impl Handler<'_> {
    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    pub fn call(&self, request: &Request) -> Response {
        self.controller.dispatch(&self.action_name, request)
    }
}
