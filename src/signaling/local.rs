use std::future::Future;

use futures::{future, StreamExt as _};
use futures_signals::signal::{Mutable, SignalExt as _};
use log::{debug, trace, warn};

use crate::{
    error::{Error, Result},
    proto::{PublicationState, PublicationUpdate},
    signaling::{Signaling, TrackSignaling},
    sys::TrackTransport,
};

/// Outcome of publishing a local track.
#[derive(Clone, Debug, Eq, PartialEq)]
enum PublishStatus {
    Pending,
    Published(String),
    Failed(String),
}

/// Signaling of a track published by the local participant.
///
/// Its enabled flag is driven locally, the server only acknowledges the
/// publication by assigning a `sid`.
#[derive(Debug)]
pub struct LocalTrackPublicationSignaling {
    signaling: Signaling,
    status: Mutable<PublishStatus>,
}

impl LocalTrackPublicationSignaling {
    /// Creates a new unpublished [`LocalTrackPublicationSignaling`] taking
    /// its `id`, `kind` and enabled flag from the provided transport object.
    pub fn new<T>(transport: &T, name: Option<String>) -> Self
    where
        T: TrackTransport + ?Sized,
    {
        Self {
            signaling: Signaling::new(
                transport.id().to_string(),
                name,
                transport.kind(),
                transport.is_enabled(),
            ),
            status: Mutable::new(PublishStatus::Pending),
        }
    }

    /// Server-assigned identifier, [`None`] until published.
    pub fn sid(&self) -> Option<String> {
        match &*self.status.lock_ref() {
            PublishStatus::Published(sid) => Some(sid.clone()),
            PublishStatus::Pending | PublishStatus::Failed(_) => None,
        }
    }

    /// Snapshot of this publication to be sent to the server.
    pub fn state(&self) -> PublicationState {
        PublicationState {
            enabled: self.is_enabled(),
            id: self.id().to_string(),
            kind: self.kind(),
            name: self.name().to_string(),
        }
    }

    /// Applies the server acknowledgement.
    ///
    /// Sets the `sid` once. Repeating the same `sid` is a no-op, and a
    /// different `sid` after the first one is ignored. Never emits an
    /// "updated" notification.
    pub fn update(&self, update: &PublicationUpdate) -> &Self {
        let mut status = self.status.lock_mut();
        if let PublishStatus::Published(sid) = &*status {
            if *sid == update.sid {
                trace!(
                    "LocalTrack [id = {}] already published as {}",
                    self.id(),
                    sid,
                );
            } else {
                warn!(
                    "LocalTrack [id = {}] published as {}, ignoring sid {}",
                    self.id(),
                    sid,
                    update.sid,
                );
            }
            return self;
        }
        debug!(
            "LocalTrack [id = {}] published as {}",
            self.id(),
            update.sid,
        );
        *status = PublishStatus::Published(update.sid.clone());
        self
    }

    /// Marks this publication as rejected by the server.
    ///
    /// Ignored if a `sid` was already assigned.
    pub fn publish_failed(&self, reason: impl Into<String>) -> &Self {
        let reason = reason.into();
        let mut status = self.status.lock_mut();
        if let PublishStatus::Published(sid) = &*status {
            warn!(
                "LocalTrack [id = {}] already published as {}, ignoring \
                 failure: {}",
                self.id(),
                sid,
                reason,
            );
            return self;
        }
        debug!(
            "LocalTrack [id = {}] failed to publish: {}",
            self.id(),
            reason,
        );
        *status = PublishStatus::Failed(reason);
        self
    }

    /// Resolves with the assigned `sid` once published, or with
    /// [`Error::PublishFailed`] once rejected.
    pub fn when_published(&self) -> impl Future<Output = Result<String>> {
        let name = self.name().to_string();
        let mut outcome = Box::pin(
            self.status.signal_cloned().to_stream().filter_map(
                move |status| {
                    future::ready(match status {
                        PublishStatus::Pending => None,
                        PublishStatus::Published(sid) => Some(Ok(sid)),
                        PublishStatus::Failed(reason) => {
                            Some(Err(Error::PublishFailed {
                                name: name.clone(),
                                reason,
                            }))
                        }
                    })
                },
            ),
        );
        async move {
            match outcome.next().await {
                Some(outcome) => outcome,
                None => future::pending().await,
            }
        }
    }
}

impl TrackSignaling for LocalTrackPublicationSignaling {
    fn signaling(&self) -> &Signaling {
        &self.signaling
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use futures::FutureExt as _;

    use super::*;
    use crate::{proto::TrackKind, sys::MediaStreamTrack};

    fn publication() -> (LocalTrackPublicationSignaling, Rc<Cell<usize>>) {
        let source = MediaStreamTrack::new("mic-1", TrackKind::Audio);
        let publication =
            LocalTrackPublicationSignaling::new(&source, Some("mic".into()));
        let updates = Rc::new(Cell::new(0));
        publication.on_updated({
            let updates = Rc::clone(&updates);
            move || updates.set(updates.get() + 1)
        });
        (publication, updates)
    }

    fn ack(sid: &str) -> PublicationUpdate {
        PublicationUpdate {
            sid: sid.to_string(),
        }
    }

    #[test]
    fn derives_identity_from_transport() {
        let (publication, _) = publication();

        assert_eq!(publication.id(), "mic-1");
        assert_eq!(publication.kind(), TrackKind::Audio);
        assert_eq!(publication.name(), "mic");
        assert!(publication.is_enabled());
        assert!(publication.sid().is_none());
    }

    #[tokio::test]
    async fn disabled_source_publishes_disabled() {
        let source = MediaStreamTrack::new("cam-1", TrackKind::Video);
        source.set_enabled(false).await;

        let publication = LocalTrackPublicationSignaling::new(&source, None);

        assert!(!publication.is_enabled());
        assert!(!publication.state().enabled);
    }

    #[test]
    fn update_sets_sid_once() {
        let (publication, updates) = publication();

        publication.update(&ack("MT1")).update(&ack("MT1"));
        assert_eq!(publication.sid().as_deref(), Some("MT1"));

        publication.update(&ack("MT2"));
        assert_eq!(publication.sid().as_deref(), Some("MT1"));
        assert_eq!(updates.get(), 0);
    }

    #[test]
    fn state_tracks_enabled_flag() {
        let (publication, updates) = publication();
        publication.update(&ack("MT1")).disable();

        assert_eq!(
            publication.state(),
            PublicationState {
                enabled: false,
                id: "mic-1".to_string(),
                kind: TrackKind::Audio,
                name: "mic".to_string(),
            },
        );
        assert_eq!(updates.get(), 1);
    }

    #[test]
    fn when_published_resolves_with_sid() {
        let (publication, _) = publication();
        let mut published = publication.when_published().boxed_local();
        assert!((&mut published).now_or_never().is_none());

        publication.update(&ack("MT1"));

        assert_eq!(published.now_or_never(), Some(Ok("MT1".to_string())));
        assert_eq!(
            publication.when_published().now_or_never(),
            Some(Ok("MT1".to_string())),
        );
    }

    #[test]
    fn when_published_reports_failure() {
        let (publication, updates) = publication();
        let published = publication.when_published().boxed_local();

        publication.publish_failed("quota exceeded");

        assert_eq!(
            published.now_or_never(),
            Some(Err(Error::PublishFailed {
                name: "mic".to_string(),
                reason: "quota exceeded".to_string(),
            })),
        );
        assert!(publication.sid().is_none());
        assert_eq!(updates.get(), 0);
    }

    #[test]
    fn failure_after_publish_is_ignored() {
        let (publication, _) = publication();

        publication.update(&ack("MT1")).publish_failed("late");

        assert_eq!(publication.sid().as_deref(), Some("MT1"));
    }
}
