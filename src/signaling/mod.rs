//! Signaling state of local and remote tracks.
//!
//! Every entity embeds a [`Signaling`] holding the fields shared by all
//! tracks, and exposes the common operations through the [`TrackSignaling`]
//! trait.

mod local;
mod remote;

use std::cell::Cell;

use futures::channel::mpsc;
use log::{debug, trace};

use crate::{
    proto::TrackKind,
    reactive::{Observers, SubscriptionId},
};

pub use self::{
    local::LocalTrackPublicationSignaling, remote::RemoteTrackSignaling,
};

/// Attributes shared by every track signaling entity.
///
/// `id`, `name` and `kind` are fixed at construction. The enabled flag is
/// the only state reconciled afterwards, and an "updated" notification is
/// emitted if and only if it actually flips.
#[derive(Debug)]
pub struct Signaling {
    id: String,
    name: String,
    kind: TrackKind,
    is_enabled: Cell<bool>,
    observers: Observers,
}

impl Signaling {
    /// Creates new [`Signaling`] named after its `id` unless a non-empty
    /// `name` is provided.
    pub fn new(
        id: String,
        name: Option<String>,
        kind: TrackKind,
        is_enabled: bool,
    ) -> Self {
        let name = match name {
            Some(name) if !name.is_empty() => name,
            _ => id.clone(),
        };
        Self {
            id,
            name,
            kind,
            is_enabled: Cell::new(is_enabled),
            observers: Observers::new(),
        }
    }

    /// Sets the enabled flag, notifying observers if it changed.
    ///
    /// Returns whether the flag changed.
    fn set_enabled(&self, is_enabled: bool) -> bool {
        if self.is_enabled.get() == is_enabled {
            trace!(
                "Track [id = {}] is already {}",
                self.id,
                if is_enabled { "enabled" } else { "disabled" },
            );
            return false;
        }
        self.is_enabled.set(is_enabled);
        debug!(
            "Track [id = {}] {}",
            self.id,
            if is_enabled { "enabled" } else { "disabled" },
        );
        self.observers.emit();
        true
    }
}

/// Operations available on every track signaling entity.
pub trait TrackSignaling {
    /// Returns the embedded shared state.
    fn signaling(&self) -> &Signaling;

    /// Client-local identifier of the track.
    fn id(&self) -> &str {
        &self.signaling().id
    }

    fn name(&self) -> &str {
        &self.signaling().name
    }

    fn kind(&self) -> TrackKind {
        self.signaling().kind
    }

    fn is_enabled(&self) -> bool {
        self.signaling().is_enabled.get()
    }

    /// Sets the enabled flag. Emits a single "updated" notification if the
    /// flag changed, and nothing otherwise.
    fn set_enabled(&self, is_enabled: bool) -> &Self
    where
        Self: Sized,
    {
        self.signaling().set_enabled(is_enabled);
        self
    }

    /// Same as `set_enabled(true)`.
    fn enable(&self) -> &Self
    where
        Self: Sized,
    {
        self.set_enabled(true)
    }

    /// Same as `set_enabled(false)`.
    fn disable(&self) -> &Self
    where
        Self: Sized,
    {
        self.set_enabled(false)
    }

    /// Registers a callback invoked synchronously on every "updated"
    /// notification.
    fn on_updated<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + 'static,
        Self: Sized,
    {
        self.signaling().observers.subscribe(callback)
    }

    /// Removes a callback registered with [`TrackSignaling::on_updated`].
    fn off_updated(&self, id: SubscriptionId) -> bool {
        self.signaling().observers.unsubscribe(id)
    }

    /// Returns a stream of "updated" notifications.
    fn updates(&self) -> mpsc::UnboundedReceiver<()> {
        self.signaling().observers.updates()
    }
}
