use crate::error::{GyaoError, GyaoErrorContext};
use crate::{Gyao, Result};
use regex::Regex;

/// Types of GYAO! urls, pointing to a single episode or to a title page.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UrlType {
    /// `<site>/episode/<slug>/<id>` or `<site>/episode/<id>`. The id is usually the GYAO! video
    /// id of the episode.
    Episode { slug: Option<String>, id: String },
    /// `<site>/title/<slug>/<id>` or `<site>/title/<id>`. The id is the id of the title (series),
    /// not of a video. The video the page plays must be scraped from the page itself.
    Title { slug: Option<String>, id: String },
}

impl UrlType {
    /// The trailing id of the url path.
    pub fn id(&self) -> &str {
        match self {
            UrlType::Episode { id, .. } | UrlType::Title { id, .. } => id,
        }
    }
}

impl Gyao {
    /// Check if `url` points to a page on the configured site ([`crate::GyaoBuilder::site`]) which
    /// can be resolved and extract its type and id.
    pub fn parse_url<S: AsRef<str>>(&self, url: S) -> Result<UrlType> {
        parse_url_for_site(self.site(), url)
    }
}

/// Extract information out of urls pointing to episodes or titles on `site` (e.g.
/// `https://gyao.yahoo.co.jp`).
pub fn parse_url_for_site<S: AsRef<str>, U: AsRef<str>>(site: S, url: U) -> Result<UrlType> {
    lazy_static::lazy_static! {
        static ref PATH_REGEX: Regex = Regex::new(r"^/(?P<type>episode|title)(/(?P<slug>[^/]+)/|/)(?P<id>[0-9a-z-]+)$").unwrap();
    }

    let url = url.as_ref();
    let site = site.as_ref().trim_end_matches('/');

    let capture = url
        .strip_prefix(site)
        .and_then(|path| PATH_REGEX.captures(path))
        .ok_or_else(|| {
            GyaoError::MalformedUrl(
                GyaoErrorContext::new(format!("Unexpected URL, expected {}/(episode|title)/...", site))
                    .with_url(url),
            )
        })?;

    let slug = capture.name("slug").map(|slug| slug.as_str().to_string());
    let id = capture["id"].to_string();
    match &capture["type"] {
        "episode" => Ok(UrlType::Episode { slug, id }),
        "title" => Ok(UrlType::Title { slug, id }),
        _ => unreachable!(),
    }
}
