use super::{PRESENTER_KEY, Params, Route, Router};
use crate::Result;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Ordered collection of routers, optionally under a module.
///
/// The first child that matches wins. When the list has a module, matched
/// presenters are prefixed with it, and only presenters inside the module
/// are constructed.
#[derive(Clone, Default)]
pub struct RouteList {
    module: Option<String>,
    routes: Vec<Arc<dyn Router>>,
}

impl RouteList {
    /// Create an empty list without a module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty list for `module`, e.g. `"Admin"` or `"Admin:"`.
    pub fn with_module(module: impl Into<String>) -> Self {
        let module = module.into();
        let module = module.trim_end_matches(':').to_string();
        Self {
            module: (!module.is_empty()).then_some(module),
            routes: Vec::new(),
        }
    }

    /// Append a router.
    pub fn add(self, router: impl Router + 'static) -> Self {
        self.add_shared(Arc::new(router))
    }

    /// Append an already shared router.
    pub fn add_shared(mut self, router: Arc<dyn Router>) -> Self {
        self.routes.push(router);
        self
    }

    /// Compile and append a [`Route`] for a `Presenter:action` destination.
    pub fn add_route(self, mask: &str, destination: &str) -> Result<Self> {
        Ok(self.add(Route::with_destination(mask, destination)?))
    }

    /// Module name without the trailing colon.
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Child routers in order.
    pub fn routes(&self) -> &[Arc<dyn Router>] {
        &self.routes
    }

    fn prefix(&self) -> Option<String> {
        self.module.as_ref().map(|m| format!("{m}:"))
    }
}

impl Router for RouteList {
    fn match_url(&self, url: &Url) -> Option<Params> {
        let mut params = self.routes.iter().find_map(|r| r.match_url(url))?;
        if let Some(prefix) = self.prefix() {
            if let Some(Value::String(presenter)) = params.get(PRESENTER_KEY) {
                let prefixed = format!("{prefix}{presenter}");
                params.insert(PRESENTER_KEY.to_string(), Value::String(prefixed));
            }
        }
        Some(params)
    }

    fn construct_url(&self, params: &Params, base: &Url) -> Option<String> {
        let Some(prefix) = self.prefix() else {
            return self.routes.iter().find_map(|r| r.construct_url(params, base));
        };

        let presenter = params.get(PRESENTER_KEY)?.as_str()?;
        let inner = presenter.strip_prefix(&prefix)?;
        let mut local = params.clone();
        local.insert(PRESENTER_KEY.to_string(), Value::String(inner.to_string()));
        self.routes.iter().find_map(|r| r.construct_url(&local, base))
    }

    fn type_name(&self) -> &str {
        "RouteList"
    }

    fn as_list(&self) -> Option<&RouteList> {
        Some(self)
    }
}

impl fmt::Debug for RouteList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteList")
            .field("module", &self.module)
            .field("routes", &self.routes.len())
            .finish()
    }
}
