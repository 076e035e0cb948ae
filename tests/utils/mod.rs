#![allow(dead_code)]

pub mod macros;
pub mod server;

pub use server::{
    delivery_json, episode_json, page_html, playback_json, FakeUpstream, Upstream,
};
