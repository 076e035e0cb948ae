use crate::gyao::{Device, LogicaAgent, Os};
use crate::internal::serde::take_list_property;
use crate::{Gyao, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// GraphQL document the GYAO! web player sends to look up the delivery of a video.
pub(crate) const PLAYBACK_QUERY: &str = concat!(
    "query Playback($videoId: ID!, $logicaAgent: LogicaAgent!, ",
    "$clientSpaceId: String!, $os: Os!, $device: Device!) ",
    "{ content( parameter: { contentId: $videoId logicaAgent: $logicaAgent ",
    "clientSpaceId: $clientSpaceId os: $os device: $device view: WEB } ) ",
    "{ video { id title delivery { id drm } } } }"
);

/// Content type of a HLS playlist source.
pub const HLS_SOURCE_TYPE: &str = "application/x-mpegURL";
/// HLS version (`EXT-X-VERSION`) of the playlist variant which can be downloaded as is.
pub const HLS_SOURCE_VERSION: &str = "4";

/// Metadata of a video which is required to look up its stream.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct DeliveryInfo {
    /// GYAO! video id.
    pub video_id: String,
    pub title: String,
    /// Id of the video at Brightcove, the service which actually streams GYAO! videos.
    pub delivery_id: String,
    /// If the stream is DRM protected. Protected streams cannot be muxed into a playable file.
    pub is_drm_protected: bool,
}

/// Url of a HLS playlist which can be handed to a downloader / muxer. Always absolute and `https`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct StreamTarget {
    pub url: String,
}

impl StreamTarget {
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Display for StreamTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaybackVariables<'a> {
    video_id: &'a str,
    logica_agent: &'a LogicaAgent,
    client_space_id: &'a str,
    os: &'a Os,
    device: &'a Device,
}

#[derive(Deserialize)]
struct PlaybackResponse {
    data: PlaybackData,
}

#[derive(Deserialize)]
struct PlaybackData {
    content: Option<PlaybackContent>,
}

#[derive(Deserialize)]
struct PlaybackContent {
    video: PlaybackVideo,
}

#[derive(Deserialize)]
struct PlaybackVideo {
    id: String,
    title: String,
    delivery: PlaybackDelivery,
}

#[derive(Deserialize)]
struct PlaybackDelivery {
    id: String,
    drm: bool,
}

/// A single stream source of the Brightcove playback api. Sources which do not deserialize into
/// this are skipped.
#[derive(Debug, Deserialize)]
struct PlaybackSource {
    #[serde(rename = "type")]
    source_type: String,
    src: String,
    #[serde(default)]
    ext_x_version: Option<String>,
}

impl PlaybackSource {
    fn into_hls_target(self) -> Option<StreamTarget> {
        if self.source_type != HLS_SOURCE_TYPE
            || self.ext_x_version.as_deref() != Some(HLS_SOURCE_VERSION)
        {
            return None;
        }

        let url = Url::parse(&self.src).ok()?;
        if url.scheme() != "https" || !url.path().ends_with("m3u8") {
            return None;
        }

        Some(StreamTarget { url: self.src })
    }
}

impl Gyao {
    /// Look up the delivery of a GYAO! video. Returns [`None`] if the video does not exist (yet)
    /// or isn't available in your region.
    pub async fn delivery<S: AsRef<str>>(&self, video_id: S) -> Result<Option<DeliveryInfo>> {
        let config = &self.executor.config;

        let variables = serde_json::to_string(&PlaybackVariables {
            video_id: video_id.as_ref(),
            logica_agent: &config.logica_agent,
            client_space_id: &config.client_space_id,
            os: &config.os,
            device: &config.device,
        })?;

        let resp: PlaybackResponse = self
            .executor
            .get(&config.graphql_endpoint)
            .query(&[
                ("appId", config.app_id.as_str()),
                ("query", PLAYBACK_QUERY),
                ("variables", variables.as_str()),
            ])
            .request()
            .await?;

        let Some(content) = resp.data.content else {
            tracing::debug!(video_id = video_id.as_ref(), "video has no content");
            return Ok(None);
        };
        let video = content.video;
        if video.delivery.id.is_empty() {
            tracing::debug!(video_id = video_id.as_ref(), "video has no delivery id");
            return Ok(None);
        }
        if video.delivery.drm {
            tracing::warn!(video_id = %video.id, "video is DRM protected");
        }

        Ok(Some(DeliveryInfo {
            video_id: video.id,
            title: video.title,
            delivery_id: video.delivery.id,
            is_drm_protected: video.delivery.drm,
        }))
    }

    /// Resolve the HLS playlist of a delivery. Returns [`None`] if Brightcove offers no source
    /// which is a version 4 HLS playlist served via `https`.
    pub async fn playlist<S: AsRef<str>>(&self, delivery_id: S) -> Result<Option<StreamTarget>> {
        let config = &self.executor.config;

        let endpoint = format!(
            "{}/{}/videos/{}",
            config.playback_endpoint,
            config.account_id,
            delivery_id.as_ref()
        );
        let resp: Value = self
            .executor
            .get(&endpoint)
            .header(
                http::header::ACCEPT,
                format!("application/json;pk={}", config.policy_key),
            )
            .request()
            .await?;

        let target = take_list_property(resp, "sources", &endpoint)?
            .into_iter()
            .filter_map(|source| match serde_json::from_value::<PlaybackSource>(source) {
                Ok(source) => Some(source),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed playback source");
                    None
                }
            })
            .find_map(PlaybackSource::into_hls_target);

        match &target {
            Some(target) => tracing::debug!(playlist = %target, "found playlist"),
            None => tracing::warn!(
                delivery_id = delivery_id.as_ref(),
                "no source is a https hls v4 playlist"
            ),
        }

        Ok(target)
    }
}
