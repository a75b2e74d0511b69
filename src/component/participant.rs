//! Remote participant and the tracks it publishes.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use futures::channel::mpsc;
use log::{debug, trace, warn};

use crate::{
    proto::{ParticipantState, TrackState},
    signaling::RemoteTrackSignaling,
};

type Track<T> = Rc<RemoteTrackSignaling<T>>;

/// Senders of a stream-based event subscription.
struct Subscribers<T>(RefCell<Vec<mpsc::UnboundedSender<T>>>);

impl<T: Clone> Subscribers<T> {
    fn new() -> Self {
        Self(RefCell::new(Vec::new()))
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded();
        self.0.borrow_mut().push(tx);
        rx
    }

    fn send(&self, value: &T) {
        self.0
            .borrow_mut()
            .retain(|tx| tx.unbounded_send(value.clone()).is_ok());
    }
}

/// Tracks published by a single remote participant, kept in sync with the
/// server view.
pub struct RemoteParticipant<T> {
    sid: String,
    identity: String,
    revision: Cell<Option<u64>>,
    tracks: RefCell<HashMap<String, Track<T>>>,
    on_track_added: Subscribers<Track<T>>,
    on_track_removed: Subscribers<Track<T>>,
}

impl<T: Clone + 'static> RemoteParticipant<T> {
    pub fn new(sid: String, identity: String) -> Rc<Self> {
        Rc::new(Self {
            sid,
            identity,
            revision: Cell::new(None),
            tracks: RefCell::new(HashMap::new()),
            on_track_added: Subscribers::new(),
            on_track_removed: Subscribers::new(),
        })
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Revision of the last applied [`ParticipantState`].
    pub fn revision(&self) -> Option<u64> {
        self.revision.get()
    }

    /// Returns the track with the provided `sid`.
    pub fn track(&self, sid: &str) -> Option<Track<T>> {
        self.tracks.borrow().get(sid).cloned()
    }

    pub fn tracks(&self) -> Vec<Track<T>> {
        self.tracks.borrow().values().cloned().collect()
    }

    /// Stream of tracks created by [`RemoteParticipant::update`].
    pub fn on_track_added(&self) -> mpsc::UnboundedReceiver<Track<T>> {
        self.on_track_added.subscribe()
    }

    /// Stream of tracks dropped by [`RemoteParticipant::update`].
    pub fn on_track_removed(&self) -> mpsc::UnboundedReceiver<Track<T>> {
        self.on_track_removed.subscribe()
    }

    /// Reconciles tracks with the state pushed by the server.
    ///
    /// States of another participant and states not newer than the last
    /// applied one are ignored. Returns whether `state` was applied.
    pub fn update(&self, state: ParticipantState) -> bool {
        if state.sid != self.sid {
            warn!(
                "Participant [sid = {}] ignores state of participant {}",
                self.sid, state.sid,
            );
            return false;
        }
        if self.revision.get().map_or(false, |rev| state.revision <= rev) {
            trace!(
                "Participant [sid = {}] ignores stale revision {}",
                self.sid,
                state.revision,
            );
            return false;
        }
        self.revision.set(Some(state.revision));

        let mut updated: Vec<(Track<T>, TrackState)> = Vec::new();
        let mut added: Vec<Track<T>> = Vec::new();
        for track_state in state.tracks {
            let is_duplicate = track_state.sid.as_deref().map_or(false, |sid| {
                added.iter().any(|track| track.sid() == sid)
                    || updated.iter().any(|(track, _)| track.sid() == sid)
            });
            if is_duplicate {
                trace!(
                    "Participant [sid = {}] skips duplicate track {:?}",
                    self.sid,
                    track_state.sid,
                );
                continue;
            }
            match track_state.sid.as_deref().and_then(|sid| self.track(sid)) {
                Some(track) => updated.push((track, track_state)),
                None => match RemoteTrackSignaling::new(track_state) {
                    Ok(track) => added.push(Rc::new(track)),
                    Err(e) => warn!(
                        "Participant [sid = {}] skips track: {}",
                        self.sid, e,
                    ),
                },
            }
        }

        let removed: Vec<_> = {
            let mut tracks = self.tracks.borrow_mut();
            let removed_sids: Vec<_> = tracks
                .keys()
                .filter(|sid| {
                    !updated.iter().any(|(track, _)| track.sid() == *sid)
                })
                .cloned()
                .collect();
            let removed = removed_sids
                .iter()
                .filter_map(|sid| tracks.remove(sid))
                .collect();
            for track in &added {
                tracks.insert(track.sid().to_string(), Rc::clone(track));
            }
            removed
        };

        for track in removed {
            debug!(
                "Participant [sid = {}] removed track {}",
                self.sid,
                track.sid(),
            );
            self.on_track_removed.send(&track);
        }
        for (track, track_state) in updated {
            track.update(track_state);
        }
        for track in added {
            debug!(
                "Participant [sid = {}] added track {}",
                self.sid,
                track.sid(),
            );
            self.on_track_added.send(&track);
        }
        true
    }

    /// Binds a transport object to the track with the provided `sid`.
    ///
    /// Returns `false` if there is no such track or it is already bound.
    pub fn set_transport(&self, sid: &str, transport: T) -> bool {
        match self.track(sid) {
            Some(track) => track.set_transport(transport),
            None => {
                trace!(
                    "Participant [sid = {}] has no track {}",
                    self.sid,
                    sid,
                );
                false
            }
        }
    }
}

impl<T> std::fmt::Debug for RemoteParticipant<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteParticipant")
            .field("sid", &self.sid)
            .field("identity", &self.identity)
            .field("revision", &self.revision.get())
            .field("tracks", &self.tracks.borrow().len())
            .finish()
    }
}
