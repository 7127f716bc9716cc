//! Mask-based route.
//!
//! Masks are written relative to the site root:
//!
//! - `article/<id \d+>`: literal text and a parameter with a pattern
//! - `<presenter>/<action>[/<id>]`: bracketed parts are optional
//! - `archive/<year=2024>`: inline default; trailing parameters with a
//!   default become optional together with the slash in front of them
//!
//! `presenter` and `action` travel through URLs in dashed lowercase
//! (`article-detail`, `show-all`) and are stored in parameters as
//! `ArticleDetail` and `showAll`. A dot in the URL form separates modules
//! (`admin.user` is `Admin:User`).

use super::{ACTION_KEY, DEFAULT_ACTION, PRESENTER_KEY, Params, Router, param_to_string};
use crate::{Error, Result};
use regex::Regex;
use serde_json::Value;
use url::Url;

const DEFAULT_PATTERN: &str = "[^/]+";
const PRESENTER_PATTERN: &str = "[a-z][a-z0-9.-]*";
const ACTION_PATTERN: &str = "[a-z][a-z0-9-]*";

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Literal(String),
    Param(String),
    Optional(Vec<Token>),
}

#[derive(Clone, Debug)]
struct Placeholder {
    name: String,
    default: Option<String>,
    matcher: Regex,
    pattern: String,
}

/// A single URL mask with default parameters.
#[derive(Clone, Debug)]
pub struct Route {
    mask: String,
    defaults: Params,
    tokens: Vec<Token>,
    params: Vec<Placeholder>,
    regex: Regex,
}

impl Route {
    /// Compile a route from a mask and default parameters.
    pub fn new(mask: impl Into<String>, defaults: Params) -> Result<Self> {
        let mask = mask.into();
        let invalid = |reason: String| Error::InvalidRoute {
            mask: mask.clone(),
            reason,
        };

        let body = mask.split('?').next().unwrap_or_default();
        let body = body.trim_start_matches('/');

        let mut raw = Vec::new();
        let mut chars = body.chars();
        let tokens = parse_tokens(&mut chars, 0, &mut raw).map_err(invalid)?;

        let mut params = Vec::with_capacity(raw.len());
        for (name, inline_default, pattern) in raw {
            let default = inline_default.or_else(|| defaults.get(&name).and_then(param_to_string));
            let pattern = pattern.unwrap_or_else(|| default_pattern(&name).to_string());
            let matcher = Regex::new(&format!("^(?:{pattern})$"))
                .map_err(|e| invalid(format!("bad pattern for <{name}>: {e}")))?;
            params.push(Placeholder {
                name,
                default,
                matcher,
                pattern,
            });
        }

        let tokens = wrap_trailing_optional(tokens, &params);

        let mut source = String::from("^");
        push_regex(&tokens, &params, &mut source);
        source.push('$');
        let regex = Regex::new(&source).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            mask,
            defaults,
            tokens,
            params,
            regex,
        })
    }

    /// Compile a route whose defaults come from a `Presenter:action`
    /// destination, e.g. `"Article:show"` or `"Homepage:"`.
    pub fn with_destination(mask: impl Into<String>, destination: &str) -> Result<Self> {
        Self::new(mask, destination_params(destination))
    }

    fn placeholder(&self, name: &str) -> Option<&Placeholder> {
        self.params.iter().find(|p| p.name == name)
    }

    fn render(&self, tokens: &[Token], params: &Params) -> Option<(String, bool)> {
        let mut out = String::new();
        let mut meaningful = false;

        for token in tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Param(name) => {
                    let placeholder = self.placeholder(name)?;
                    let given = params.get(name).and_then(param_to_string);
                    let internal = match given {
                        Some(value) => {
                            if placeholder.default.as_deref() != Some(value.as_str()) {
                                meaningful = true;
                            }
                            value
                        }
                        None => placeholder.default.clone()?,
                    };
                    let external = filter_out(name, &internal);
                    if !placeholder.matcher.is_match(&external) {
                        return None;
                    }
                    out.push_str(&external);
                }
                Token::Optional(inner) => match self.render(inner, params) {
                    Some((text, true)) => {
                        out.push_str(&text);
                        meaningful = true;
                    }
                    Some((_, false)) => {}
                    None if mentions_given(inner, params) => return None,
                    None => {}
                },
            }
        }

        Some((out, meaningful))
    }
}

impl Router for Route {
    fn match_url(&self, url: &Url) -> Option<Params> {
        let path = url.path().trim_start_matches('/');
        let captures = self.regex.captures(path)?;

        let mut params = self.defaults.clone();
        for placeholder in &self.params {
            match captures.name(&placeholder.name) {
                Some(m) => {
                    params.insert(
                        placeholder.name.clone(),
                        Value::String(filter_in(&placeholder.name, m.as_str())),
                    );
                }
                None => {
                    if let Some(default) = &placeholder.default {
                        params
                            .entry(placeholder.name.clone())
                            .or_insert_with(|| Value::String(default.clone()));
                    }
                }
            }
        }

        for (key, value) in url.query_pairs() {
            params
                .entry(key.into_owned())
                .or_insert_with(|| Value::String(value.into_owned()));
        }

        Some(params)
    }

    fn construct_url(&self, params: &Params, base: &Url) -> Option<String> {
        if self.placeholder(PRESENTER_KEY).is_none() && !self.defaults.contains_key(PRESENTER_KEY) {
            return None;
        }

        for (key, default) in &self.defaults {
            if self.placeholder(key).is_some() {
                continue;
            }
            if let Some(given) = params.get(key).and_then(param_to_string) {
                if Some(given) != param_to_string(default) {
                    return None;
                }
            }
        }

        let (path, _) = self.render(&self.tokens, params)?;

        let mut url = base.join(&path).ok()?;
        let query: Vec<(String, String)> = params
            .iter()
            .filter(|(key, _)| self.placeholder(key).is_none() && !self.defaults.contains_key(*key))
            .filter_map(|(key, value)| param_to_string(value).map(|v| (key.clone(), v)))
            .collect();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Some(url.to_string())
    }

    fn type_name(&self) -> &str {
        "Route"
    }

    fn mask(&self) -> Option<&str> {
        Some(&self.mask)
    }

    fn defaults(&self) -> Option<&Params> {
        Some(&self.defaults)
    }
}

/// `presenter` and `action` defaults for a `Presenter:action` destination.
pub(crate) fn destination_params(destination: &str) -> Params {
    let mut defaults = Params::new();
    let (presenter, action) = match destination.rsplit_once(':') {
        Some((presenter, action)) => (presenter, action),
        None => (destination, ""),
    };
    if !presenter.is_empty() {
        defaults.insert(PRESENTER_KEY.to_string(), Value::String(presenter.to_string()));
    }
    let action = if action.is_empty() { DEFAULT_ACTION } else { action };
    defaults.insert(ACTION_KEY.to_string(), Value::String(action.to_string()));
    defaults
}

// ============================================================================
// Mask parsing
// ============================================================================

type RawParam = (String, Option<String>, Option<String>);

fn parse_tokens(
    chars: &mut std::str::Chars<'_>,
    depth: usize,
    raw: &mut Vec<RawParam>,
) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut literal = String::new();

    let flush = |literal: &mut String, tokens: &mut Vec<Token>| {
        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(literal)));
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '[' => {
                flush(&mut literal, &mut tokens);
                tokens.push(Token::Optional(parse_tokens(chars, depth + 1, raw)?));
            }
            ']' if depth == 0 => return Err("unbalanced ']'".to_string()),
            ']' => {
                flush(&mut literal, &mut tokens);
                return Ok(tokens);
            }
            '<' => {
                flush(&mut literal, &mut tokens);
                let mut body = String::new();
                loop {
                    match chars.next() {
                        Some('>') => break,
                        Some(c) => body.push(c),
                        None => return Err("unclosed '<'".to_string()),
                    }
                }
                let param = parse_placeholder(&body)?;
                if raw.iter().any(|(name, _, _)| *name == param.0) {
                    return Err(format!("parameter <{}> used twice", param.0));
                }
                tokens.push(Token::Param(param.0.clone()));
                raw.push(param);
            }
            c => literal.push(c),
        }
    }

    if depth > 0 {
        return Err("unclosed '['".to_string());
    }
    flush(&mut literal, &mut tokens);
    Ok(tokens)
}

fn parse_placeholder(body: &str) -> std::result::Result<RawParam, String> {
    let body = body.trim();
    let (head, pattern) = match body.split_once(char::is_whitespace) {
        Some((head, pattern)) => (head, Some(pattern.trim().to_string())),
        None => (body, None),
    };
    let (name, default) = match head.split_once('=') {
        Some((name, default)) => (name, Some(default.to_string())),
        None => (head, None),
    };

    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(format!("invalid parameter name '{name}'"));
    }

    Ok((name.to_string(), default, pattern.filter(|p| !p.is_empty())))
}

/// Trailing `/<param>` pairs whose parameter has a default become optional,
/// nested so that a later one can only appear after an earlier one. A
/// trailing optional group joins the innermost level.
fn wrap_trailing_optional(mut tokens: Vec<Token>, params: &[Placeholder]) -> Vec<Token> {
    let has_default = |name: &str| {
        params
            .iter()
            .any(|p| p.name == name && p.default.is_some())
    };

    let mut tail: Vec<Token> = Vec::new();
    if let Some(Token::Optional(_)) = tokens.last() {
        if let Some(Token::Optional(inner)) = tokens.pop() {
            tail = inner;
        }
    }

    loop {
        let len = tokens.len();
        let param = match tokens.last() {
            Some(Token::Param(name)) if has_default(name) => name.clone(),
            _ => break,
        };

        let mut group = Vec::new();
        match len.checked_sub(2).map(|i| &tokens[i]) {
            Some(Token::Literal(text)) if text.ends_with('/') => {
                tokens.pop();
                let Some(Token::Literal(mut text)) = tokens.pop() else {
                    break;
                };
                text.pop();
                if !text.is_empty() {
                    tokens.push(Token::Literal(text));
                }
                group.push(Token::Literal("/".to_string()));
            }
            None => {
                tokens.pop();
            }
            _ => break,
        }

        group.push(Token::Param(param));
        if !tail.is_empty() {
            group.push(Token::Optional(std::mem::take(&mut tail)));
        }
        tail = group;
    }

    if !tail.is_empty() {
        tokens.push(Token::Optional(tail));
    }
    tokens
}

fn push_regex(tokens: &[Token], params: &[Placeholder], out: &mut String) {
    for token in tokens {
        match token {
            Token::Literal(text) => out.push_str(&regex::escape(text)),
            Token::Param(name) => {
                let pattern = params
                    .iter()
                    .find(|p| p.name == *name)
                    .map(|p| p.pattern.as_str())
                    .unwrap_or(DEFAULT_PATTERN);
                out.push_str(&format!("(?P<{name}>(?:{pattern}))"));
            }
            Token::Optional(inner) => {
                out.push_str("(?:");
                push_regex(inner, params, out);
                out.push_str(")?");
            }
        }
    }
}

fn mentions_given(tokens: &[Token], params: &Params) -> bool {
    tokens.iter().any(|token| match token {
        Token::Literal(_) => false,
        Token::Param(name) => params.get(name).is_some_and(|v| !v.is_null()),
        Token::Optional(inner) => mentions_given(inner, params),
    })
}

// ============================================================================
// Presenter/action filters
// ============================================================================

fn default_pattern(name: &str) -> &'static str {
    match name {
        PRESENTER_KEY => PRESENTER_PATTERN,
        ACTION_KEY => ACTION_PATTERN,
        _ => DEFAULT_PATTERN,
    }
}

fn filter_in(name: &str, value: &str) -> String {
    match name {
        PRESENTER_KEY => value
            .split('.')
            .map(|part| part.split('-').map(capitalize).collect::<String>())
            .collect::<Vec<_>>()
            .join(":"),
        ACTION_KEY => {
            let mut words = value.split('-');
            let first = words.next().unwrap_or_default().to_string();
            first + &words.map(capitalize).collect::<String>()
        }
        _ => value.to_string(),
    }
}

fn filter_out(name: &str, value: &str) -> String {
    match name {
        PRESENTER_KEY => value
            .split(':')
            .map(dasherize)
            .collect::<Vec<_>>()
            .join("."),
        ACTION_KEY => dasherize(value),
        _ => value.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn dasherize(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    for (i, c) in word.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
