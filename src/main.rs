use std::{error::Error as StdError, rc::Rc, time::Duration};

use futures::StreamExt as _;
use log::{error, info};
use tokio::{task, task::spawn_local, time::sleep};

use track_signaling::{
    component::{Receiver, RemoteParticipant},
    sys::{MediaStreamTrack, RtcPeerConnection, TrackTransport as _},
    DataTrackOptions, LocalDataTrack, LocalTrackPublicationSignaling,
    ParticipantState, PublicationUpdate, TrackKind, TrackSignaling as _,
    TrackState,
};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("debug"),
    )
    .init();

    task::LocalSet::new()
        .run_until(async {
            if let Err(e) = publish_data_track().await {
                error!("Failed to publish data track: {}", e);
            }

            receive_remote_tracks().await;
        })
        .await;
}

/// Publishes a local data track and waits for the server acknowledgement.
async fn publish_data_track() -> Result<(), Box<dyn StdError>> {
    let data_track = LocalDataTrack::new(DataTrackOptions {
        name: Some("chat".to_string()),
        max_retransmits: Some(3),
        ..DataTrackOptions::default()
    });
    let mut outgoing = data_track
        .sender()
        .outgoing()
        .ok_or("outgoing payloads already taken")?;
    spawn_local(async move {
        while let Some(payload) = outgoing.next().await {
            info!("Wire <- {:?}", payload);
        }
    });

    let publication =
        Rc::new(LocalTrackPublicationSignaling::new(&data_track, None));
    info!(
        "Publishing {}",
        serde_json::to_string(&publication.state())?,
    );

    spawn_local({
        let publication = Rc::clone(&publication);
        async move {
            sleep(Duration::from_millis(200)).await;
            publication.update(&PublicationUpdate {
                sid: "MT-local-1".to_string(),
            });
        }
    });

    match publication.when_published().await {
        Ok(sid) => info!("Track {} published as {}", publication.id(), sid),
        Err(e) => error!("{}", e),
    }
    data_track.send("hello")?;
    publication.disable();
    info!(
        "Publication changed: {}",
        serde_json::to_string(&publication.state())?,
    );

    Ok(())
}

/// Receives tracks of a remote participant binding their media sources out
/// of order.
async fn receive_remote_tracks() {
    let peer = RtcPeerConnection::new();
    let participant = RemoteParticipant::<MediaStreamTrack>::new(
        "PA1".to_string(),
        "alice".to_string(),
    );

    let mut on_track_added = participant.on_track_added();
    spawn_local(async move {
        while let Some(track) = on_track_added.next().await {
            info!("Track [sid = {}] added", track.sid());
            track.on_updated({
                let track = Rc::downgrade(&track);
                move || {
                    if let Some(track) = track.upgrade() {
                        info!(
                            "Track [sid = {}] updated, enabled: {}",
                            track.sid(),
                            track.is_enabled(),
                        );
                    }
                }
            });
            Receiver::new(track).spawn_tasks();
        }
    });

    let state = |revision, video_enabled| ParticipantState {
        sid: "PA1".to_string(),
        identity: "alice".to_string(),
        revision,
        tracks: vec![
            TrackState {
                id: "mic".to_string(),
                enabled: true,
                kind: TrackKind::Audio,
                name: "microphone".to_string(),
                sid: Some("MT1".to_string()),
            },
            TrackState {
                id: "cam".to_string(),
                enabled: video_enabled,
                kind: TrackKind::Video,
                name: "camera".to_string(),
                sid: Some("MT2".to_string()),
            },
        ],
    };
    participant.update(state(1, true));

    for (sid, id, kind, negotiation) in vec![
        ("MT2", "cam", TrackKind::Video, 300),
        ("MT1", "mic", TrackKind::Audio, 100),
    ] {
        let peer = peer.clone();
        let participant = Rc::clone(&participant);
        spawn_local(async move {
            let media = peer
                .receive_track(
                    id.to_string(),
                    kind,
                    Duration::from_millis(negotiation),
                )
                .await;
            participant.set_transport(sid, media);
        });
    }

    sleep(Duration::from_millis(150)).await;
    participant.update(state(2, false));
    // Stale revision, ignored.
    participant.update(state(1, true));

    let video = match participant.track("MT2") {
        Some(video) => video,
        None => return,
    };
    let media = video.transport().await;
    sleep(Duration::from_millis(100)).await;
    info!(
        "MediaStreamTrack [id = {}] enabled: {}",
        media.id(),
        media.enabled(),
    );
}
