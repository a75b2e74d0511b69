use bytes::Bytes;
use log::{debug, warn};
use serde::Deserialize;

use crate::{
    error::Result,
    proto::TrackKind,
    sys::{DataChannelSender, RtcDataChannelSender, TrackTransport},
};

/// Options of a [`LocalDataTrack`].
///
/// At most one of `max_packet_life_time` and `max_retransmits` may be set,
/// which is not validated here.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct DataTrackOptions {
    /// Name of the track, defaults to its `id`.
    pub name: Option<String>,

    /// Time (in milliseconds) during which a payload is retransmitted.
    pub max_packet_life_time: Option<u16>,

    /// Number of times a payload is retransmitted.
    pub max_retransmits: Option<u16>,

    /// Whether payloads are delivered in order.
    pub ordered: bool,
}

impl Default for DataTrackOptions {
    fn default() -> Self {
        Self {
            name: None,
            max_packet_life_time: None,
            max_retransmits: None,
            ordered: true,
        }
    }
}

/// Local track sending arbitrary payloads over its own data channel.
#[derive(Debug)]
pub struct LocalDataTrack<S = RtcDataChannelSender> {
    name: String,
    is_reliable: bool,
    sender: S,
}

impl LocalDataTrack {
    /// Creates a new [`LocalDataTrack`] backed by a [`RtcDataChannelSender`].
    pub fn new(options: DataTrackOptions) -> Self {
        Self::with_factory(options, RtcDataChannelSender::new)
    }
}

impl<S: DataChannelSender> LocalDataTrack<S> {
    /// Creates a new [`LocalDataTrack`] with a sender built by the provided
    /// `factory` out of `max_packet_life_time`, `max_retransmits` and
    /// `ordered`.
    pub fn with_factory<F>(options: DataTrackOptions, factory: F) -> Self
    where
        F: FnOnce(Option<u16>, Option<u16>, bool) -> S,
    {
        let DataTrackOptions {
            name,
            max_packet_life_time,
            max_retransmits,
            ordered,
        } = options;
        if max_packet_life_time.is_some() && max_retransmits.is_some() {
            warn!(
                "Both max_packet_life_time and max_retransmits are set, \
                 delivery semantics are undefined",
            );
        }

        let sender = factory(max_packet_life_time, max_retransmits, ordered);
        let is_reliable = sender.max_packet_life_time().is_none()
            && sender.max_retransmits().is_none();
        let name = match name {
            Some(name) if !name.is_empty() => name,
            _ => sender.id().to_string(),
        };
        debug!(
            "LocalDataTrack [id = {}] created, reliable: {}",
            sender.id(),
            is_reliable,
        );

        Self {
            name,
            is_reliable,
            sender,
        }
    }

    pub fn id(&self) -> &str {
        self.sender.id()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TrackKind {
        TrackKind::Data
    }

    /// Whether no retransmission limit is configured.
    pub fn is_reliable(&self) -> bool {
        self.is_reliable
    }

    pub fn max_packet_life_time(&self) -> Option<u16> {
        self.sender.max_packet_life_time()
    }

    pub fn max_retransmits(&self) -> Option<u16> {
        self.sender.max_retransmits()
    }

    pub fn ordered(&self) -> bool {
        self.sender.ordered()
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Passes `data` unmodified to the underlying sender.
    pub fn send(&self, data: impl Into<Bytes>) -> Result<()> {
        self.sender.send(data.into())
    }
}

impl<S: DataChannelSender> TrackTransport for LocalDataTrack<S> {
    fn id(&self) -> &str {
        self.sender.id()
    }

    fn kind(&self) -> TrackKind {
        TrackKind::Data
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use futures::{FutureExt as _, StreamExt as _};

    use super::*;

    #[derive(Debug, Default)]
    struct FakeSender {
        id: String,
        max_packet_life_time: Option<u16>,
        max_retransmits: Option<u16>,
        ordered: bool,
        sent: RefCell<Vec<Bytes>>,
    }

    impl TrackTransport for FakeSender {
        fn id(&self) -> &str {
            &self.id
        }

        fn kind(&self) -> TrackKind {
            TrackKind::Data
        }
    }

    impl DataChannelSender for FakeSender {
        fn max_packet_life_time(&self) -> Option<u16> {
            self.max_packet_life_time
        }

        fn max_retransmits(&self) -> Option<u16> {
            self.max_retransmits
        }

        fn ordered(&self) -> bool {
            self.ordered
        }

        fn send(&self, data: Bytes) -> Result<()> {
            self.sent.borrow_mut().push(data);
            Ok(())
        }
    }

    fn fake(options: DataTrackOptions) -> LocalDataTrack<FakeSender> {
        LocalDataTrack::with_factory(
            options,
            |max_packet_life_time, max_retransmits, ordered| FakeSender {
                id: "abc".to_string(),
                max_packet_life_time,
                max_retransmits,
                ordered,
                sent: RefCell::default(),
            },
        )
    }

    #[test]
    fn identity_comes_from_sender() {
        let track = fake(DataTrackOptions::default());

        assert_eq!(track.id(), "abc");
        assert_eq!(track.kind(), TrackKind::Data);
        assert_eq!(track.name(), "abc");
        assert!(track.ordered());
    }

    #[test]
    fn explicit_name_wins() {
        let track = fake(DataTrackOptions {
            name: Some("foo".to_string()),
            ..DataTrackOptions::default()
        });

        assert_eq!(track.name(), "foo");
        assert_eq!(track.id(), "abc");
    }

    #[test]
    fn reliability_follows_retry_limits() {
        assert!(fake(DataTrackOptions::default()).is_reliable());

        let lifetime = fake(DataTrackOptions {
            max_packet_life_time: Some(1000),
            ..DataTrackOptions::default()
        });
        assert!(!lifetime.is_reliable());
        assert_eq!(lifetime.max_packet_life_time(), Some(1000));

        let retransmits = fake(DataTrackOptions {
            max_retransmits: Some(0),
            ordered: false,
            ..DataTrackOptions::default()
        });
        assert!(!retransmits.is_reliable());
        assert!(!retransmits.ordered());
    }

    #[test]
    fn send_passes_payload_through() {
        let track = fake(DataTrackOptions::default());

        track.send(&b"payload"[..]).unwrap();

        assert_eq!(
            *track.sender().sent.borrow(),
            vec![Bytes::from_static(b"payload")],
        );
    }

    #[test]
    fn default_sender_is_used_by_new() {
        let track = LocalDataTrack::new(DataTrackOptions::default());

        assert!(track.is_reliable());
        assert_eq!(track.name(), track.sender().id());
        let mut outgoing = track.sender().outgoing().unwrap();
        track.send("hello").unwrap();
        assert_eq!(
            outgoing.next().now_or_never(),
            Some(Some(Bytes::from_static(b"hello"))),
        );
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: DataTrackOptions =
            serde_json::from_str(r#"{"max_retransmits":5}"#).unwrap();

        assert_eq!(
            options,
            DataTrackOptions {
                max_retransmits: Some(5),
                ..DataTrackOptions::default()
            },
        );
        assert!(options.ordered);
    }
}
