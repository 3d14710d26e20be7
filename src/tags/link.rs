//! Query-string rewriting for a single link

use std::collections::BTreeMap;
use url::{form_urlencoded, ParseError, Url};

/// Ordered query parameters
///
/// A repeated key keeps the position of its first occurrence and the value
/// of its last one.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub(crate) fn parse(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match params.0.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value.into_owned(),
                None => params.0.push((key.into_owned(), value.into_owned())),
            }
        }
        params
    }

    /// Sets `key` unless it already carries a non-empty value. An existing
    /// empty value is replaced in place.
    pub(crate) fn set_if_unset(&mut self, key: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) if entry.1.is_empty() => entry.1 = value.to_string(),
            Some(_) => {}
            None => self.0.push((key.to_string(), value.to_string())),
        }
    }

    pub(crate) fn serialize(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

/// Tracking values for one link
#[derive(Debug, Clone, Copy)]
pub(crate) struct Tracking<'a> {
    pub medium: &'a str,
    pub source: &'a str,
    pub campaign: &'a str,
    /// `None` leaves `utm_content` out entirely
    pub content: Option<&'a str>,
    pub extra: &'a BTreeMap<String, String>,
}

impl Tracking<'_> {
    fn apply_to(&self, query: Option<&str>) -> String {
        let mut params = QueryParams::parse(query.unwrap_or(""));
        params.set_if_unset("utm_medium", self.medium);
        params.set_if_unset("utm_source", self.source);
        params.set_if_unset("utm_campaign", self.campaign);
        if let Some(content) = self.content {
            params.set_if_unset("utm_content", content);
        }
        for (key, value) in self.extra {
            params.set_if_unset(key, value);
        }
        params.serialize()
    }
}

/// Adds tracking parameters to `link`
///
/// Absolute URLs are rebuilt from their parsed components, relative ones are
/// split by hand. Links with a scheme but no host (`mailto:`, `tel:`,
/// `javascript:`) and links that fail to parse are returned unchanged.
pub(crate) fn tag_link(link: &str, tracking: &Tracking<'_>) -> String {
    match Url::parse(link) {
        Ok(url) => tag_absolute(url, tracking).unwrap_or_else(|| link.to_string()),
        Err(ParseError::RelativeUrlWithoutBase) => {
            if link.starts_with("//") {
                tag_scheme_relative(link, tracking)
            } else {
                tag_relative(link, tracking)
            }
        }
        Err(_) => link.to_string(),
    }
}

fn tag_absolute(mut url: Url, tracking: &Tracking<'_>) -> Option<String> {
    if !url.has_host() || url.cannot_be_a_base() {
        return None;
    }
    let query = tracking.apply_to(url.query());
    url.set_query(Some(&query));
    Some(url.into())
}

fn tag_scheme_relative(link: &str, tracking: &Tracking<'_>) -> String {
    let placeholder = format!("http:{link}");
    match Url::parse(&placeholder)
        .ok()
        .and_then(|url| tag_absolute(url, tracking))
    {
        Some(tagged) => tagged
            .strip_prefix("http:")
            .map(str::to_string)
            .unwrap_or(tagged),
        None => link.to_string(),
    }
}

fn tag_relative(link: &str, tracking: &Tracking<'_>) -> String {
    let (rest, fragment) = match link.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (link, None),
    };
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };

    let mut tagged = if path.is_empty() { "/".to_string() } else { path.to_string() };
    tagged.push('?');
    tagged.push_str(&tracking.apply_to(query));
    if let Some(fragment) = fragment {
        tagged.push('#');
        tagged.push_str(fragment);
    }
    tagged
}
