//! # gyao-rs
//!
//! Resolve [GYAO!](https://gyao.yahoo.co.jp/) video pages into downloadable HLS playlists.
//!
//! GYAO! has no public api. Getting from a page url to a stream takes four undocumented steps:
//! 1. Scrape the page for the series api endpoint (`data-endpoint-url`) and, for title pages, the
//!    video id of the player (`data-vid`).
//! 2. Query the series api for the episode listing ([`Gyao::episodes`]).
//! 3. Exchange the video id for a Brightcove delivery id via GraphQL ([`Gyao::delivery`]).
//! 4. Exchange the delivery id for a HLS playlist via the Brightcove playback api
//!    ([`Gyao::playlist`]).
//!
//! [`Gyao::resolve`] runs all of them for a page (or its whole series) and reports the outcome per
//! episode.
//!
//! # Implementation
//! None of the apis are versioned and their response shapes change without notice. Every response
//! is decoded into typed structs right when it arrives, everything unexpected results in a
//! [`error::GyaoError::Schema`] error instead of being carried through the pipeline.
//! Expected "nothing there" states, like an unreleased episode or a video without a downloadable
//! playlist, are returned as [`None`] and are never errors.
//!
//! # Features
//! - `download` (default): [`download::HlsDownloader`] to save playlists via ffmpeg.
//! - `cli`: the `gyaodl` binary.

pub mod error;
pub mod gyao;
pub mod media;
pub mod parse;
pub mod resolve;
pub mod scrape;
pub mod utils;

#[cfg(feature = "download")]
pub mod download;

// internal
mod internal;
mod macros;

// internal
pub(crate) use error::Result;
pub(crate) use macros::enum_values;

pub use error::{GyaoError, GyaoErrorContext};
pub use gyao::{Gyao, GyaoBuilder};
pub use media::{DeliveryInfo, EpisodeRef, StreamTarget};
pub use parse::UrlType;
pub use resolve::Resolution;
