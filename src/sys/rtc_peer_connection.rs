use std::time::Duration;

use log::debug;
use tokio::time::sleep;

use crate::{proto::TrackKind, sys::MediaStreamTrack};

/// Platform peer connection producing remote media sources.
#[derive(Clone, Debug, Default)]
pub struct RtcPeerConnection;

impl RtcPeerConnection {
    pub fn new() -> Self {
        RtcPeerConnection
    }

    /// Resolves once the remote media source with the provided `id` is
    /// negotiated.
    pub async fn receive_track(
        &self,
        id: String,
        kind: TrackKind,
        negotiation: Duration,
    ) -> MediaStreamTrack {
        debug!("Negotiating remote {} track [id = {}]", kind, id);
        sleep(negotiation).await;

        MediaStreamTrack::new(id, kind)
    }
}
