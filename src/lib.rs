//! Client-side signaling of room tracks.
//!
//! Keeps the state of local and remote tracks in sync with the signaling
//! server, notifies observers about actual changes only, and binds each
//! remote track to its transport object whichever of them arrives first.

pub mod component;
pub mod error;
pub mod media;
pub mod proto;
pub mod reactive;
pub mod signaling;
pub mod sys;

pub use self::{
    error::{Error, Result},
    media::{DataTrackOptions, LocalDataTrack},
    proto::{
        ParticipantState, PublicationState, PublicationUpdate, TrackKind,
        TrackPatch, TrackState,
    },
    signaling::{
        LocalTrackPublicationSignaling, RemoteTrackSignaling, TrackSignaling,
    },
};
