use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Data channel sender has no consumer left to deliver payloads to.
    #[error("data channel {id} is closed")]
    ChannelClosed { id: String },

    /// Server refused to publish a local track.
    #[error("failed to publish track {name}: {reason}")]
    PublishFailed { name: String, reason: String },

    /// Remote track record arrived without a server-assigned sid.
    #[error("remote track {id} has no sid")]
    MissingSid { id: String },
}
