use crate::error::{GyaoError, GyaoErrorContext};
use crate::internal::serde::{decode_item, take_list_property};
use crate::scrape::{extract_series_endpoint, extract_video_id};
use crate::utils::{has_path_segment, last_path_segment, normalize_url, parse_absolute_url};
use crate::{Gyao, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An episode as listed by the (undocumented) series api
/// (`<site>/api/programs/<program id>/videos`).
///
/// Unlike most api structs the fields are not defaulted: if a field is missing or has another type
/// than a string, the whole listing is rejected with [`GyaoError::Schema`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRef {
    /// GYAO! video id.
    pub id: String,
    pub title: String,
    pub short_title: String,
    /// Usually `available` or `unavailable`. See [`EpisodeRef::is_available`].
    pub streaming_availability: String,
    /// ISO 8601 timestamp, e.g. `2024-01-01T00:00:00+09:00`.
    pub start_date: String,
    /// ISO 8601 timestamp, e.g. `2024-12-31T23:59:59+09:00`.
    pub end_date: String,
    /// Link to the video page, e.g. `https://gyao.yahoo.co.jp/episode/<id>`.
    #[serde(rename = "shortWebUrl")]
    pub page_url: String,
}

impl Gyao {
    /// Get the episodes `page_url` refers to. If `series` is `true` all episodes of the series the
    /// page belongs to are returned. Otherwise the returned list contains exactly the episode the
    /// page shows.
    pub async fn episodes<S: AsRef<str>>(&self, page_url: S, series: bool) -> Result<Vec<EpisodeRef>> {
        let page_url = page_url.as_ref();

        let normalized = normalize_url(page_url)?;
        tracing::debug!(%normalized, "fetching page");
        let html = self.executor.get(&normalized).request_html().await?;

        let endpoint = extract_series_endpoint(&html);
        if endpoint.is_empty() {
            return Err(GyaoError::EndpointNotFound(
                GyaoErrorContext::new("Endpoint not found in html source").with_url(&normalized),
            ));
        }
        tracing::debug!(%endpoint, "found series endpoint");

        // scheme, host and query of the url as given, only the path is replaced
        let page = parse_absolute_url(page_url)?;
        let mut series_url = page.clone();
        series_url.set_path(&endpoint);
        let series_url = series_url.to_string();

        let listing: Value = self.executor.get(&series_url).request().await?;
        let episodes = take_list_property(listing, "videos", &series_url)?
            .into_iter()
            .map(|item| decode_item::<EpisodeRef>(item, &series_url))
            .collect::<Result<Vec<EpisodeRef>>>()?;
        tracing::debug!(count = episodes.len(), "parsed series listing");

        if series {
            if episodes.is_empty() {
                return Err(GyaoError::EmptyCatalog(
                    GyaoErrorContext::new("The series has no episodes").with_url(&series_url),
                ));
            }
            return Ok(episodes);
        }

        // the trailing id of title urls is the id of the series, not of the video
        let video_id = if has_path_segment(&page, "title") {
            extract_video_id(&html)
        } else {
            last_path_segment(&page)
        };
        if video_id.is_empty() {
            return Err(GyaoError::IdentifierNotFound(
                GyaoErrorContext::new("Failed to get the video id").with_url(&normalized),
            ));
        }
        tracing::debug!(%video_id, "looking up episode");

        episodes
            .into_iter()
            .find(|episode| episode.id == video_id)
            .map(|episode| vec![episode])
            .ok_or_else(|| {
                GyaoError::EpisodeNotFound(
                    GyaoErrorContext::new(format!(
                        "Video '{}' is not listed in its series",
                        video_id
                    ))
                    .with_url(&series_url),
                )
            })
    }
}
