use futures::future::LocalBoxFuture;
use log::{debug, trace};

use crate::{
    error::{Error, Result},
    proto::{TrackPatch, TrackState},
    reactive::Deferred,
    signaling::{Signaling, TrackSignaling},
};

/// Signaling of a track published by a remote participant.
///
/// `T` is the transport object (media source or data channel) bound to this
/// track once the transport layer obtains it.
#[derive(Debug)]
pub struct RemoteTrackSignaling<T> {
    signaling: Signaling,
    sid: String,
    transport: Deferred<T>,
}

impl<T: Clone + 'static> RemoteTrackSignaling<T> {
    /// Creates a new [`RemoteTrackSignaling`] out of the provided server
    /// record.
    ///
    /// # Errors
    ///
    /// With [`Error::MissingSid`] if the record has no `sid`.
    pub fn new(state: TrackState) -> Result<Self> {
        let TrackState {
            id,
            enabled,
            kind,
            name,
            sid,
        } = state;
        let sid = sid.ok_or_else(|| Error::MissingSid { id: id.clone() })?;

        Ok(Self {
            signaling: Signaling::new(id, Some(name), kind, enabled),
            sid,
            transport: Deferred::new(),
        })
    }

    /// Server-assigned identifier.
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Reconciles the state pushed by the server.
    ///
    /// Only the enabled flag is applied. `id`, `kind`, `name` and `sid` are
    /// fixed for the whole track lifetime and ignored even when they differ.
    pub fn update(&self, patch: impl Into<TrackPatch>) -> &Self {
        let patch = patch.into();
        if patch.sid.as_deref().map_or(false, |sid| sid != self.sid) {
            trace!(
                "RemoteTrack [sid = {}] ignores sid {:?}",
                self.sid,
                patch.sid,
            );
        }
        if let Some(is_enabled) = patch.enabled {
            self.signaling.set_enabled(is_enabled);
        }
        self
    }

    /// Binds the transport object to this track.
    ///
    /// Only the first call has an effect, returns whether it was this one.
    /// Never emits an "updated" notification.
    pub fn set_transport(&self, transport: T) -> bool {
        let bound = self.transport.resolve(transport);
        if bound {
            debug!("RemoteTrack [sid = {}] transport bound", self.sid);
        } else {
            trace!("RemoteTrack [sid = {}] transport already bound", self.sid);
        }
        bound
    }

    /// Returns a future resolving to the first transport object passed to
    /// [`RemoteTrackSignaling::set_transport`], no matter whether it is
    /// called before or after that.
    pub fn transport(&self) -> LocalBoxFuture<'static, T> {
        self.transport.get()
    }

    /// Returns the bound transport object, if any.
    pub fn transport_now(&self) -> Option<T> {
        self.transport.peek()
    }
}

impl<T> TrackSignaling for RemoteTrackSignaling<T> {
    fn signaling(&self) -> &Signaling {
        &self.signaling
    }
}
