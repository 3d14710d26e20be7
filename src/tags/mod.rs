//! Campaign tracking for links in HTML fragments
//!
//! [`UtmTagger`] appends `utm_*` query parameters to every anchor `href` in a
//! fragment, or to a single URL. Parameters already present on a link are
//! never overwritten. The tagger is plain configuration, so the free
//! functions [`apply`] and [`process_url`] simply use the default one.
//!
//! ```rust
//! let html = r#"<a id="cta" href="https://example.com/shop">Shop</a>"#;
//! let tagged = gcm_tags::tags::apply(html, "newsletter", "spring");
//! assert_eq!(
//!     tagged,
//!     r#"<a id="cta" href="https://example.com/shop?utm_medium=email&utm_source=newsletter&utm_campaign=spring&utm_content=cta">Shop</a>"#
//! );
//! ```

pub mod html;
mod link;

use std::collections::BTreeMap;
use tracing::debug;

pub use html::{decode_special_chars, find_anchors, AnchorMatch};
use link::{tag_link, Tracking};

/// Default value of `utm_medium`
pub const DEFAULT_MEDIUM: &str = "email";

/// Link tagging configuration
#[derive(Debug, Clone, PartialEq)]
pub struct UtmTagger {
    medium: String,
    extra_params: BTreeMap<String, String>,
}

impl Default for UtmTagger {
    fn default() -> Self {
        Self {
            medium: DEFAULT_MEDIUM.to_string(),
            extra_params: BTreeMap::new(),
        }
    }
}

impl UtmTagger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_medium(mut self, medium: impl Into<String>) -> Self {
        self.medium = medium.into();
        self
    }

    /// Static parameters appended to every link after the `utm_*` ones
    pub fn with_extra_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.extra_params = params;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_params.insert(key.into(), value.into());
        self
    }

    pub fn medium(&self) -> &str {
        &self.medium
    }

    pub fn extra_params(&self) -> &BTreeMap<String, String> {
        &self.extra_params
    }

    /// Tags every anchor in `html`.
    ///
    /// Escaped special characters are decoded first. Anchors pointing at a
    /// fragment of the current page and anchors without `href` are left
    /// alone; an anchor's `id` becomes its `utm_content`. Only `href` values
    /// change, everything else is copied through. Input without any anchor
    /// tag is returned as given, without decoding.
    pub fn apply(&self, html: &str, source: &str, campaign: &str) -> String {
        let decoded = decode_special_chars(html);
        if !html::has_anchor_tag(&decoded) {
            return html.to_string();
        }

        let mut output = String::with_capacity(decoded.len());
        let mut cursor = 0;
        let mut tagged = 0;

        for anchor in find_anchors(&decoded) {
            if anchor.href.is_empty() || anchor.is_fragment_link() {
                continue;
            }
            let link = tag_link(anchor.href, &self.tracking(source, campaign, anchor.id));
            output.push_str(&decoded[cursor..anchor.href_span.start]);
            output.push_str(&link);
            cursor = anchor.href_span.end;
            tagged += 1;
        }
        output.push_str(&decoded[cursor..]);

        debug!(links = tagged, "Applied tracking parameters");
        output
    }

    /// Tags a single URL.
    ///
    /// Unlike anchors without an `id`, a direct call always writes
    /// `utm_content`, empty when `content` is `None`.
    pub fn process_url(
        &self,
        url: &str,
        source: &str,
        campaign: &str,
        content: Option<&str>,
    ) -> String {
        tag_link(url, &self.tracking(source, campaign, Some(content.unwrap_or(""))))
    }

    fn tracking<'a>(
        &'a self,
        source: &'a str,
        campaign: &'a str,
        content: Option<&'a str>,
    ) -> Tracking<'a> {
        Tracking {
            medium: &self.medium,
            source,
            campaign,
            content,
            extra: &self.extra_params,
        }
    }
}

/// Tags every anchor in `html` with the default tagger
pub fn apply(html: &str, source: &str, campaign: &str) -> String {
    UtmTagger::default().apply(html, source, campaign)
}

/// Tags a single URL with the default tagger
pub fn process_url(url: &str, source: &str, campaign: &str, content: Option<&str>) -> String {
    UtmTagger::default().process_url(url, source, campaign, content)
}
