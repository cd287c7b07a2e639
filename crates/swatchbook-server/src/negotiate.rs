//! Response format negotiation from the `Accept` header.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::header;
use axum::http::request::Parts;

/// Formats an error or page can be returned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Html,
    Json,
    Text,
}

/// Offered media types, in preference order for ties.
const OFFERS: [(&str, ResponseFormat); 2] = [
    ("text/html", ResponseFormat::Html),
    ("application/json", ResponseFormat::Json),
];

/// Pick a response format for an `Accept` header value.
///
/// A missing or empty header means HTML. Otherwise each offer takes the
/// quality of the most specific media range matching it; the best non-zero
/// offer wins and plain text is used when nothing matches.
pub fn negotiate(accept: Option<&str>) -> ResponseFormat {
    let Some(accept) = accept.map(str::trim).filter(|a| !a.is_empty()) else {
        return ResponseFormat::Html;
    };

    let ranges: Vec<MediaRange<'_>> = accept.split(',').filter_map(MediaRange::parse).collect();

    let mut best = (ResponseFormat::Text, 0.0_f32);
    for (mime, format) in OFFERS {
        let q = quality(&ranges, mime);
        if q > best.1 {
            best = (format, q);
        }
    }

    best.0
}

/// One entry of an `Accept` header.
#[derive(Debug)]
struct MediaRange<'a> {
    kind: &'a str,
    subtype: &'a str,
    q: f32,
}

impl<'a> MediaRange<'a> {
    fn parse(entry: &'a str) -> Option<Self> {
        let mut parts = entry.split(';');
        let (kind, subtype) = parts.next()?.trim().split_once('/')?;

        let q = parts
            .filter_map(|param| param.trim().split_once('='))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
            .and_then(|(_, value)| value.trim().parse::<f32>().ok())
            .unwrap_or(1.0)
            .clamp(0.0, 1.0);

        Some(Self {
            kind: kind.trim(),
            subtype: subtype.trim(),
            q,
        })
    }

    /// 2 for an exact match, 1 for `type/*`, 0 for `*/*`.
    fn specificity(&self, mime: &str) -> Option<u8> {
        let (kind, subtype) = mime.split_once('/')?;

        if self.kind == "*" && self.subtype == "*" {
            Some(0)
        } else if self.kind.eq_ignore_ascii_case(kind) && self.subtype == "*" {
            Some(1)
        } else if self.kind.eq_ignore_ascii_case(kind) && self.subtype.eq_ignore_ascii_case(subtype)
        {
            Some(2)
        } else {
            None
        }
    }
}

fn quality(ranges: &[MediaRange<'_>], mime: &str) -> f32 {
    let mut best: Option<(u8, f32)> = None;

    for range in ranges {
        let Some(specificity) = range.specificity(mime) else {
            continue;
        };
        best = match best {
            Some((s, q)) if s > specificity || (s == specificity && q >= range.q) => Some((s, q)),
            _ => Some((specificity, range.q)),
        };
    }

    best.map(|(_, q)| q).unwrap_or(0.0)
}

/// Per-request details needed to shape a response: the negotiated format and
/// the URL as the client requested it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub format: ResponseFormat,
    pub url: String,
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accept = parts
            .headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok());

        let url = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.to_string())
            .unwrap_or_else(|| parts.uri.to_string());

        Ok(Self {
            format: negotiate(accept),
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_html_without_header() {
        assert_eq!(negotiate(None), ResponseFormat::Html);
        assert_eq!(negotiate(Some("  ")), ResponseFormat::Html);
    }

    #[test]
    fn picks_exact_types() {
        assert_eq!(negotiate(Some("application/json")), ResponseFormat::Json);
        assert_eq!(negotiate(Some("text/html")), ResponseFormat::Html);
    }

    #[test]
    fn falls_back_to_text() {
        assert_eq!(negotiate(Some("text/plain")), ResponseFormat::Text);
        assert_eq!(negotiate(Some("image/png, garbage")), ResponseFormat::Text);
    }

    #[test]
    fn prefers_html_for_wildcards() {
        assert_eq!(negotiate(Some("*/*")), ResponseFormat::Html);
        assert_eq!(negotiate(Some("text/*")), ResponseFormat::Html);
        assert_eq!(
            negotiate(Some(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
            )),
            ResponseFormat::Html
        );
    }

    #[test]
    fn honours_quality_values() {
        assert_eq!(
            negotiate(Some("application/json, text/html;q=0.5")),
            ResponseFormat::Json
        );
        assert_eq!(negotiate(Some("text/html;q=0, */*")), ResponseFormat::Json);
        assert_eq!(
            negotiate(Some("text/html;q=0, application/json;q=0")),
            ResponseFormat::Text
        );
    }
}
