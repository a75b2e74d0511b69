use std::rc::{Rc, Weak};

use futures::{
    future::{self, Either},
    StreamExt as _,
};
use log::debug;
use tokio::task::spawn_local;

use crate::{
    signaling::{RemoteTrackSignaling, TrackSignaling as _},
    sys::{MediaStreamTrack, TrackTransport as _},
};

/// Applies the signaled enabled flag of a remote track to its media source.
pub struct Receiver {
    signaling: Rc<RemoteTrackSignaling<MediaStreamTrack>>,
}

impl Receiver {
    pub fn new(
        signaling: Rc<RemoteTrackSignaling<MediaStreamTrack>>,
    ) -> Rc<Self> {
        Rc::new(Self { signaling })
    }

    pub fn signaling(&self) -> &Rc<RemoteTrackSignaling<MediaStreamTrack>> {
        &self.signaling
    }

    pub fn spawn_tasks(self: Rc<Self>) {
        Rc::clone(&self).spawn_on_enabled();
    }

    /// Spawns listener mirroring the enabled flag into the media source once
    /// it is bound.
    ///
    /// Finishes when the signaling is dropped, even if no media source was
    /// bound by then.
    fn spawn_on_enabled(self: Rc<Self>) {
        let mut on_updated = self.signaling.updates();
        let transport = self.signaling.transport();
        let signaling: Weak<_> = Rc::downgrade(&self.signaling);
        drop(self);
        spawn_local(async move {
            // Updates stream ends only once the signaling is dropped.
            let dropped =
                on_updated.by_ref().for_each(|_| future::ready(()));
            let track = match future::select(transport, dropped).await {
                Either::Left((track, _)) => track,
                Either::Right(((), _)) => {
                    debug!("Remote track dropped before its media source bound");
                    return;
                }
            };
            debug!("Receiver [id = {}] got its media source", track.id());
            loop {
                let is_enabled = match signaling.upgrade() {
                    Some(signaling) => signaling.is_enabled(),
                    None => break,
                };
                if track.enabled() != is_enabled {
                    track.set_enabled(is_enabled).await;
                }
                if on_updated.next().await.is_none() {
                    break;
                }
            }
        });
    }
}
