use thiserror::Error;

/// Errors from server startup, registration, or the accept loop.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding the listening socket failed.
    #[error("bind failed: {0}")]
    Bind(std::io::Error),

    /// A service with this name is already registered.
    #[error("service {0:?} already registered")]
    DuplicateService(String),

    /// `ServerOptions::network` named something other than `tcp`/`udp`.
    #[error("network {0:?} is not supported")]
    UnsupportedNetwork(String),

    /// A resolver plugin failed during init/shutdown.
    #[error("plugin error: {0}")]
    Plugin(#[from] tessera_plugin::PluginError),

    /// An envelope codec or serializer tag looked up at startup was missing.
    #[error("codec error: {0}")]
    Codec(#[from] tessera_codec::CodecError),

    /// `ServerOptions::serialization_type` named an unregistered tag.
    #[error("unknown serializer tag {0:?}")]
    UnknownSerializer(String),

    /// A frame failed to parse or a socket read/write failed mid-frame.
    #[error("protocol error: {0}")]
    Protocol(#[from] tessera_proto::ProtocolError),
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, ServerError>;
