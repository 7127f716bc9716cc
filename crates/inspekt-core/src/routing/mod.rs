//! URL routing.
//!
//! A [`Router`] maps URLs to a presenter/action pair plus parameters and
//! back. [`Route`] matches a single mask, [`RouteList`] tries several
//! routers in order under an optional module prefix, and [`LinkGenerator`]
//! turns `Presenter:action` destinations into absolute URLs.
//!
//! The router is also introspectable: `type_name`, `mask`, `defaults` and
//! `as_list` expose enough to list every route in a tree.

mod link;
mod list;
mod route;

pub use link::{Destination, LinkGenerator};
pub use list::RouteList;
pub use route::Route;

pub(crate) use route::destination_params;

use crate::{Error, Result};
use serde_json::Value;
use url::Url;

/// Route parameters, including `presenter` and `action`.
pub type Params = serde_json::Map<String, Value>;

/// Parameter holding the presenter name.
pub const PRESENTER_KEY: &str = "presenter";

/// Parameter holding the action name.
pub const ACTION_KEY: &str = "action";

/// Action used when none is given.
pub const DEFAULT_ACTION: &str = "default";

/// Bidirectional router.
pub trait Router: Send + Sync {
    /// Match a URL, returning its parameters.
    fn match_url(&self, url: &Url) -> Option<Params>;

    /// Build a URL for the parameters, relative to `base`.
    fn construct_url(&self, params: &Params, base: &Url) -> Option<String>;

    /// Short name of the router implementation.
    fn type_name(&self) -> &str;

    /// Child routers, when this router is a list.
    fn as_list(&self) -> Option<&RouteList> {
        None
    }

    /// URL mask, when the router has one.
    fn mask(&self) -> Option<&str> {
        None
    }

    /// Default parameters, when the router has them.
    fn defaults(&self) -> Option<&Params> {
        None
    }
}

/// Make a possibly relative URL absolute against `http://localhost`.
///
/// `"/article/1"` and `"article/1"` both become
/// `"http://localhost/article/1"`; `http://` and `https://` URLs are
/// returned unchanged.
pub fn normalize_url(input: &str) -> String {
    if input.starts_with("http://") || input.starts_with("https://") {
        return input.to_string();
    }
    let separator = if input.starts_with('/') { "" } else { "/" };
    format!("http://localhost{separator}{input}")
}

/// Parse an absolute URL.
pub fn parse_url(input: &str) -> Result<Url> {
    Url::parse(input).map_err(|e| Error::InvalidUrl {
        url: input.to_string(),
        reason: e.to_string(),
    })
}

/// Render a parameter value as it appears in a URL.
///
/// `null` has no URL form.
pub fn param_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some("0".to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
