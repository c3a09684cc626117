use thiserror::Error;

use tessera_core::FrameworkError;

/// Errors raised while assembling or sending one call, before a
/// [`FrameworkError`] carried in the response itself is even in play.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ClientError {
    /// `path` wasn't `/service/method`, or payload marshalling failed.
    #[error("client message error: {0}")]
    ClientMsg(String),

    /// `ClientOptions::network` named something other than `tcp`/`udp`.
    #[error("network {0:?} is not supported")]
    UnsupportedNetwork(String),

    /// An envelope codec or serializer tag looked up at call time was missing.
    #[error("codec error: {0}")]
    Codec(#[from] tessera_codec::CodecError),

    /// A tracing plugin failed to build its client interceptor.
    #[error("plugin error: {0}")]
    Plugin(#[from] tessera_plugin::PluginError),

    /// `ClientOptions::serialization_type` named an unregistered tag.
    #[error("unknown serializer tag {0:?}")]
    UnknownSerializer(String),

    /// A frame failed to parse or a socket read/write failed mid-frame.
    #[error("protocol error: {0}")]
    Protocol(#[from] tessera_proto::ProtocolError),

    /// Selecting a target address failed (no selector, or resolver returned
    /// no nodes).
    #[error("selector error: {0}")]
    Selector(#[from] tessera_selector::SelectorError),

    /// Acquiring a pooled connection failed.
    #[error("pool error: {0}")]
    Pool(String),

    /// The call's deadline elapsed before a response arrived.
    #[error("call deadline exceeded")]
    DeadlineExceeded,

    /// The server returned a non-zero `ret_code`.
    #[error(transparent)]
    Remote(#[from] FrameworkError),
}

impl From<ClientError> for FrameworkError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Remote(err) => err,
            ClientError::UnsupportedNetwork(network) => FrameworkError::network_not_supported(network),
            other => FrameworkError::client_msg(other.to_string()),
        }
    }
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, ClientError>;
