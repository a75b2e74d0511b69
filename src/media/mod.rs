//! User-facing local tracks.

mod data_track;

pub use self::data_track::{DataTrackOptions, LocalDataTrack};
