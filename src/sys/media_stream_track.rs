use std::{cell::Cell, rc::Rc, time::Duration};

use log::debug;
use tokio::time::sleep;

use crate::{proto::TrackKind, sys::TrackTransport};

/// Live media source provided by the platform.
#[derive(Clone, Debug)]
pub struct MediaStreamTrack {
    id: String,
    kind: TrackKind,
    enabled: Rc<Cell<bool>>,
}

impl MediaStreamTrack {
    /// Creates a new enabled source.
    ///
    /// `kind` is expected to be [`TrackKind::Audio`] or [`TrackKind::Video`].
    pub fn new(id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
            enabled: Rc::new(Cell::new(true)),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.get()
    }

    pub async fn set_enabled(&self, enabled: bool) {
        debug!("MediaStreamTrack [id = {}] set enabled: {}", self.id, enabled);
        sleep(Duration::from_millis(50)).await;
        self.enabled.set(enabled);
    }
}

impl TrackTransport for MediaStreamTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn is_enabled(&self) -> bool {
        self.enabled()
    }
}
