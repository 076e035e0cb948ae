//! Episodes, their delivery metadata and resolved streams.

mod availability;
mod episode;
mod playback;

pub use availability::*;
pub use episode::*;
pub use playback::*;
