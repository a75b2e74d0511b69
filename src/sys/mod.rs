mod data_channel_sender;
mod media_stream_track;
mod rtc_peer_connection;

use crate::proto::TrackKind;

pub use self::{
    data_channel_sender::{DataChannelSender, RtcDataChannelSender},
    media_stream_track::MediaStreamTrack,
    rtc_peer_connection::RtcPeerConnection,
};

/// Object actually moving media or data of a track.
pub trait TrackTransport {
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    /// Whether the transport currently carries media, data channels always
    /// do.
    fn is_enabled(&self) -> bool {
        true
    }
}
