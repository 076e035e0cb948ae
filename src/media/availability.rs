use crate::media::EpisodeRef;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Utc};

/// Value of [`EpisodeRef::streaming_availability`] which marks an episode as available.
pub const STREAMING_AVAILABLE: &str = "available";

/// A start or end date of an episode. GYAO! usually sends them with an offset (`+09:00`) but
/// naive timestamps were seen too.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EpisodeDate {
    Offset(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl EpisodeDate {
    fn parse(date: &str) -> Option<EpisodeDate> {
        if let Ok(datetime) = DateTime::parse_from_rfc3339(date) {
            return Some(EpisodeDate::Offset(datetime));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(date, format) {
                return Some(EpisodeDate::Naive(datetime));
            }
        }
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(EpisodeDate::Naive)
    }
}

impl EpisodeRef {
    /// Check if the episode can be streamed at `now`.
    ///
    /// Episodes flagged as [`STREAMING_AVAILABLE`] are always available. For all others the
    /// availability window `[start_date, end_date)` decides. If the dates have an offset, `now`
    /// is compared in the offset of the start date, otherwise as naive local time. An episode whose
    /// dates cannot be parsed (or mix offset and naive timestamps) is not available.
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        if self
            .streaming_availability
            .eq_ignore_ascii_case(STREAMING_AVAILABLE)
        {
            return true;
        }

        let (Some(start), Some(end)) = (
            EpisodeDate::parse(&self.start_date),
            EpisodeDate::parse(&self.end_date),
        ) else {
            tracing::debug!(
                id = %self.id,
                start_date = %self.start_date,
                end_date = %self.end_date,
                "unparsable availability window"
            );
            return false;
        };

        match (start, end) {
            (EpisodeDate::Offset(start), EpisodeDate::Offset(end)) => {
                let now = now.with_timezone(start.offset());
                start <= now && now < end
            }
            (EpisodeDate::Naive(start), EpisodeDate::Naive(end)) => {
                let now = now.with_timezone(&Local).naive_local();
                start <= now && now < end
            }
            _ => false,
        }
    }
}
