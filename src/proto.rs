//! Track state records exchanged with the signaling server.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a track.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
    Data,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrackKind::Audio => "audio",
            TrackKind::Video => "video",
            TrackKind::Data => "data",
        })
    }
}

/// Full track state record.
///
/// `sid` is always present for remote tracks and absent for local
/// publications the server hasn't acknowledged yet.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct TrackState {
    pub id: String,
    pub enabled: bool,
    pub kind: TrackKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

/// Partial [`TrackState`] pushed by the server.
///
/// Only `enabled` is ever reconciled, identity fields are accepted so the
/// server may send full records, but they are never applied.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<TrackKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

impl From<TrackState> for TrackPatch {
    fn from(state: TrackState) -> Self {
        Self {
            id: Some(state.id),
            enabled: Some(state.enabled),
            kind: Some(state.kind),
            name: Some(state.name),
            sid: state.sid,
        }
    }
}

impl From<&TrackState> for TrackPatch {
    fn from(state: &TrackState) -> Self {
        Self::from(state.clone())
    }
}

/// Snapshot of a local publication sent towards the server.
///
/// Has no `sid` on purpose: the server doesn't need its own identifier back.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct PublicationState {
    pub enabled: bool,
    pub id: String,
    pub kind: TrackKind,
    pub name: String,
}

/// Server acknowledgement of a local publication.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct PublicationUpdate {
    pub sid: String,
}

/// State of a remote participant and all of its published tracks.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct ParticipantState {
    pub sid: String,
    pub identity: String,
    pub revision: u64,
    #[serde(default)]
    pub tracks: Vec<TrackState>,
}
