use crate::error::{GyaoError, GyaoErrorContext};
use crate::Result;
use reqwest::Url;

/// Characters besides the unreserved ones which are left as they are when re-encoding a page url.
const SAFE_URL_CHARS: [char; 3] = ['/', ':', '+'];

/// Bring a page url into one canonical encoding. The url is decoded first and then encoded again,
/// so urls copied from the browser address bar (already encoded) and hand written urls with raw
/// japanese titles in their path end up as the same url.
pub fn normalize_url<S: AsRef<str>>(url: S) -> Result<String> {
    let decoded = urlencoding::decode(url.as_ref()).map_err(|e| {
        GyaoError::MalformedUrl(
            GyaoErrorContext::new(format!("url is not valid utf-8 when decoded: {}", e))
                .with_url(url.as_ref()),
        )
    })?;

    let mut normalized = String::with_capacity(decoded.len());
    let mut pending = String::new();
    for c in decoded.chars() {
        if SAFE_URL_CHARS.contains(&c) {
            normalized.push_str(&urlencoding::encode(&pending));
            pending.clear();
            normalized.push(c);
        } else {
            pending.push(c)
        }
    }
    normalized.push_str(&urlencoding::encode(&pending));

    Ok(normalized)
}

/// Parse `url` into a [`Url`], mapping failures to [`GyaoError::MalformedUrl`].
pub(crate) fn parse_absolute_url<S: AsRef<str>>(url: S) -> Result<Url> {
    Url::parse(url.as_ref()).map_err(|e| {
        GyaoError::MalformedUrl(GyaoErrorContext::new(e.to_string()).with_url(url.as_ref()))
    })
}

/// Last non-empty segment of the url path.
pub(crate) fn last_path_segment(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default()
        .to_string()
}

/// If one of the url path segments is exactly `segment`.
pub(crate) fn has_path_segment(url: &Url, segment: &str) -> bool {
    url.path_segments()
        .map(|mut segments| segments.any(|s| s == segment))
        .unwrap_or(false)
}
