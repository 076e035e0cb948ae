//! Drive the whole resolution pipeline: page url → episodes → deliveries → playlists.

use crate::error::GyaoError;
use crate::media::{DeliveryInfo, EpisodeRef, StreamTarget};
use crate::{Gyao, Result};
use chrono::{DateTime, Utc};

/// Outcome of resolving a single episode.
///
/// Everything except [`Resolution::Ready`] means the episode cannot be downloaded right now.
/// Only [`Resolution::Failed`] carries an actual error, the other variants are expected states
/// (unreleased episode, region locked video, ...).
#[derive(Clone, Debug)]
pub enum Resolution {
    /// The episode can be downloaded from its `stream`.
    Ready {
        episode: EpisodeRef,
        delivery: DeliveryInfo,
        stream: StreamTarget,
    },
    /// The episode isn't streamable at the moment.
    Unavailable(EpisodeRef),
    /// GYAO! has no delivery for the episode.
    NoDelivery(EpisodeRef),
    /// Brightcove has no downloadable playlist for the delivery.
    NoStream {
        episode: EpisodeRef,
        delivery: DeliveryInfo,
    },
    /// A request or response failed.
    Failed {
        episode: EpisodeRef,
        error: GyaoError,
    },
}

impl Resolution {
    pub fn episode(&self) -> &EpisodeRef {
        match self {
            Resolution::Ready { episode, .. }
            | Resolution::Unavailable(episode)
            | Resolution::NoDelivery(episode)
            | Resolution::NoStream { episode, .. }
            | Resolution::Failed { episode, .. } => episode,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Resolution::Ready { .. })
    }
}

impl Gyao {
    /// Resolve every episode `page_url` refers to (see [`Gyao::episodes`]), in listing order.
    ///
    /// Fails only if `page_url` is malformed or the episode listing cannot be obtained. Errors of
    /// single episodes are reported as [`Resolution::Failed`] and do not stop the others.
    pub async fn resolve<S: AsRef<str>>(
        &self,
        page_url: S,
        series: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Resolution>> {
        self.parse_url(page_url.as_ref())?;

        let episodes = self.episodes(page_url, series).await?;

        let mut resolutions = Vec::with_capacity(episodes.len());
        for episode in episodes {
            resolutions.push(self.resolve_episode(episode, now).await)
        }
        Ok(resolutions)
    }

    /// Resolve the stream of a single episode.
    pub async fn resolve_episode(&self, episode: EpisodeRef, now: DateTime<Utc>) -> Resolution {
        if !episode.is_available(now) {
            tracing::debug!(id = %episode.id, "episode is not available");
            return Resolution::Unavailable(episode);
        }

        let delivery = match self.delivery(&episode.id).await {
            Ok(Some(delivery)) => delivery,
            Ok(None) => return Resolution::NoDelivery(episode),
            Err(error) => return Resolution::Failed { episode, error },
        };
        tracing::debug!(delivery_id = %delivery.delivery_id, title = %delivery.title, "found delivery");

        match self.playlist(&delivery.delivery_id).await {
            Ok(Some(stream)) => Resolution::Ready {
                episode,
                delivery,
                stream,
            },
            Ok(None) => Resolution::NoStream { episode, delivery },
            Err(error) => Resolution::Failed { episode, error },
        }
    }
}
