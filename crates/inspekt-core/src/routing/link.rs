use super::{ACTION_KEY, DEFAULT_ACTION, PRESENTER_KEY, Params, Router, param_to_string};
use crate::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A parsed link destination such as `Admin:User:edit#form`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Destination {
    /// Fully qualified presenter, e.g. `Admin:User`.
    pub presenter: String,
    /// Action, `default` when omitted.
    pub action: String,
    /// Fragment without the `#`.
    pub fragment: Option<String>,
}

impl Destination {
    /// Parse `[//]:?Module:Presenter:action[#fragment]`.
    ///
    /// Generated links are always absolute, so a leading `//` is accepted
    /// and dropped.
    pub fn parse(text: &str) -> Result<Self> {
        let rest = text.strip_prefix("//").unwrap_or(text);
        let (rest, fragment) = match rest.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (rest, None),
        };

        if rest.contains('!') {
            return Err(Error::invalid_link(format!(
                "signal destinations are not supported: '{text}'"
            )));
        }

        let rest = rest.strip_prefix(':').unwrap_or(rest);
        let Some((presenter, action)) = rest.rsplit_once(':') else {
            return Err(Error::invalid_link(format!(
                "destination '{text}' must have the form Presenter:action"
            )));
        };
        if presenter.is_empty() || presenter.split(':').any(str::is_empty) {
            return Err(Error::invalid_link(format!(
                "destination '{text}' has no presenter"
            )));
        }

        Ok(Self {
            presenter: presenter.to_string(),
            action: if action.is_empty() {
                DEFAULT_ACTION.to_string()
            } else {
                action.to_string()
            },
            fragment,
        })
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.presenter, self.action)
    }
}

/// Generates URLs for destinations through a router.
#[derive(Clone)]
pub struct LinkGenerator {
    router: Arc<dyn Router>,
    base_url: Url,
}

impl LinkGenerator {
    /// Create a generator producing URLs under `base_url`.
    pub fn new(router: Arc<dyn Router>, base_url: Url) -> Self {
        Self { router, base_url }
    }

    /// Base URL links are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the URL of `destination` with `params`.
    ///
    /// Fails with [`Error::InvalidLink`] for a malformed destination or
    /// when no route can produce the URL.
    pub fn link(&self, destination: &str, params: &Params) -> Result<String> {
        let target = Destination::parse(destination)?;

        let mut full = params.clone();
        full.insert(
            PRESENTER_KEY.to_string(),
            Value::String(target.presenter.clone()),
        );
        full.insert(ACTION_KEY.to_string(), Value::String(target.action.clone()));

        let url = self
            .router
            .construct_url(&full, &self.base_url)
            .ok_or_else(|| {
                Error::invalid_link(format!("No route for {}", describe(&target, params)))
            })?;

        Ok(match target.fragment {
            Some(fragment) => format!("{url}#{fragment}"),
            None => url,
        })
    }
}

impl fmt::Debug for LinkGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkGenerator")
            .field("router", &self.router.type_name())
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

fn describe(target: &Destination, params: &Params) -> String {
    let args: Vec<String> = params
        .iter()
        .filter(|(key, _)| key.as_str() != PRESENTER_KEY && key.as_str() != ACTION_KEY)
        .map(|(key, value)| format!("{key}={}", param_to_string(value).unwrap_or_default()))
        .collect();
    format!("{target}({})", args.join(", "))
}
