//! Anchor-tag scanning over HTML fragments

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::ops::Range;

static ANCHOR_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<\s*a\s+([^>]*)").expect("anchor tag pattern is valid")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .expect("attribute pattern is valid")
});

static SPECIAL_CHAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:amp|lt|gt|quot|apos|#0*39|#[xX]0*27);").expect("entity pattern is valid")
});

/// A located `<a ...>` open tag that carries an `href`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorMatch<'a> {
    /// Byte range of the matched tag text, without the closing `>`
    pub span: Range<usize>,
    pub id: Option<&'a str>,
    pub href: &'a str,
    /// Byte range of the `href` value, excluding quotes
    pub href_span: Range<usize>,
}

impl AnchorMatch<'_> {
    /// `href="#..."` links point inside the current page
    pub fn is_fragment_link(&self) -> bool {
        self.href.starts_with('#')
    }
}

/// Decodes the entities produced by escaping HTML special characters.
///
/// Decoding is single-pass, so `&amp;lt;` becomes `&lt;`.
pub fn decode_special_chars(html: &str) -> Cow<'_, str> {
    SPECIAL_CHAR.replace_all(html, |caps: &Captures<'_>| match &caps[0] {
        "&amp;" => "&",
        "&lt;" => "<",
        "&gt;" => ">",
        "&quot;" => "\"",
        _ => "'",
    })
}

pub(crate) fn has_anchor_tag(html: &str) -> bool {
    ANCHOR_TAG.is_match(html)
}

/// Finds every anchor open tag with an `href` attribute, in document order.
///
/// Tags are matched first, then `id` and `href` are read from the attribute
/// text of each tag. When an attribute repeats, the first occurrence wins.
pub fn find_anchors(html: &str) -> Vec<AnchorMatch<'_>> {
    ANCHOR_TAG
        .captures_iter(html)
        .filter_map(|tag| {
            let whole = tag.get(0)?;
            let attrs = tag.get(1)?;
            let offset = attrs.start();

            let mut id = None;
            let mut href = None;
            for attr in ATTRIBUTE.captures_iter(attrs.as_str()) {
                let Some(value) = attr.get(2).or_else(|| attr.get(3)).or_else(|| attr.get(4)) else {
                    continue;
                };
                let name = &attr[1];
                if name.eq_ignore_ascii_case("href") && href.is_none() {
                    href = Some((offset + value.start())..(offset + value.end()));
                } else if name.eq_ignore_ascii_case("id") && id.is_none() {
                    id = Some(&html[(offset + value.start())..(offset + value.end())]);
                }
            }

            let href_span = href?;
            Some(AnchorMatch {
                span: whole.range(),
                id: id.filter(|v| !v.is_empty()),
                href: &html[href_span.clone()],
                href_span,
            })
        })
        .collect()
}
