mod media;
mod participant;

pub use self::{media::Receiver, participant::RemoteParticipant};
