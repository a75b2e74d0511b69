use std::cell::RefCell;

use bytes::Bytes;
use futures::channel::mpsc;
use log::trace;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    proto::TrackKind,
    sys::TrackTransport,
};

/// Object framing and sending payloads over a data channel.
///
/// `max_packet_life_time` and `max_retransmits` are mutually exclusive.
/// Setting both is a caller error which isn't validated here, delivery
/// semantics are undefined in that case.
pub trait DataChannelSender: TrackTransport {
    /// Time (in milliseconds) during which a payload is retransmitted.
    fn max_packet_life_time(&self) -> Option<u16>;

    /// Number of times a payload is retransmitted.
    fn max_retransmits(&self) -> Option<u16>;

    fn ordered(&self) -> bool;

    fn send(&self, data: Bytes) -> Result<()>;
}

/// Default [`DataChannelSender`] queueing payloads for the transport layer.
#[derive(Debug)]
pub struct RtcDataChannelSender {
    id: String,
    max_packet_life_time: Option<u16>,
    max_retransmits: Option<u16>,
    ordered: bool,
    tx: mpsc::UnboundedSender<Bytes>,
    rx: RefCell<Option<mpsc::UnboundedReceiver<Bytes>>>,
}

impl RtcDataChannelSender {
    pub fn new(
        max_packet_life_time: Option<u16>,
        max_retransmits: Option<u16>,
        ordered: bool,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded();
        Self {
            id: Uuid::new_v4().to_string(),
            max_packet_life_time,
            max_retransmits,
            ordered,
            tx,
            rx: RefCell::new(Some(rx)),
        }
    }

    /// Takes the stream of payloads to be put on the wire.
    ///
    /// Returns [`None`] if it was already taken. Once the returned stream is
    /// dropped every [`DataChannelSender::send`] fails.
    pub fn outgoing(&self) -> Option<mpsc::UnboundedReceiver<Bytes>> {
        self.rx.borrow_mut().take()
    }
}

impl TrackTransport for RtcDataChannelSender {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        TrackKind::Data
    }
}

impl DataChannelSender for RtcDataChannelSender {
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
        trace!("DataChannel [id = {}] send {} bytes", self.id, data.len());
        self.tx.unbounded_send(data).map_err(|_| Error::ChannelClosed {
            id: self.id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt as _;

    use super::*;

    #[test]
    fn ids_are_unique() {
        let first = RtcDataChannelSender::new(None, None, true);
        let second = RtcDataChannelSender::new(None, None, true);

        assert_ne!(first.id(), second.id());
        assert_eq!(first.kind(), TrackKind::Data);
    }

    #[test]
    fn payloads_are_queued_until_taken() {
        let sender = RtcDataChannelSender::new(Some(100), None, false);
        sender.send(Bytes::from_static(b"one")).unwrap();
        sender.send(Bytes::from_static(b"two")).unwrap();

        let outgoing = sender.outgoing().unwrap();
        assert!(sender.outgoing().is_none());
        drop(sender);

        let sent: Vec<_> = futures::executor::block_on(outgoing.collect());
        assert_eq!(
            sent,
            vec![Bytes::from_static(b"one"), Bytes::from_static(b"two")],
        );
    }

    #[test]
    fn send_fails_once_consumer_is_gone() {
        let sender = RtcDataChannelSender::new(None, Some(3), true);
        drop(sender.outgoing());

        let err = sender.send(Bytes::from_static(b"lost")).unwrap_err();

        assert_eq!(
            err,
            Error::ChannelClosed {
                id: sender.id().to_string()
            },
        );
    }
}
