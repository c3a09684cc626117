//! Framework error codes, distinguished from opaque user (handler) errors.

use thiserror::Error;

/// A coded framework error, or a handler error wrapped under
/// [`FrameworkError::HANDLER_ERROR`].
///
/// Carries the same `(code, message)` shape a [`tessera_codec::Response`]
/// puts on the wire in `ret_code`/`ret_msg`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("rpc error {code}: {message}")]
pub struct FrameworkError {
    /// Numeric error code. `0` is reserved for success and never appears here.
    pub code: i32,
    /// Human-readable detail.
    pub message: String,
}

impl FrameworkError {
    /// Success sentinel. Never actually constructed as an error value; kept
    /// for symmetry with `Response::ret_code`.
    pub const OK: i32 = 0;
    /// Payload marshalling or frame parsing failed.
    pub const CLIENT_MSG_ERROR: i32 = 1001;
    /// An auth provider's credential was rejected.
    pub const CLIENT_CERT_FAIL: i32 = 1002;
    /// `ClientOptions::network` named a transport this build doesn't support.
    pub const NETWORK_NOT_SUPPORTED: i32 = 1003;
    /// `servicePath` named a service with no registered handler.
    pub const UNKNOWN_SERVICE: i32 = 1004;
    /// `servicePath` named a method not registered on its service.
    pub const UNKNOWN_METHOD: i32 = 1005;
    /// Default wrap code for an opaque user (handler) error.
    pub const HANDLER_ERROR: i32 = 1006;

    /// Construct a framework error with an arbitrary code.
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// A [`Self::CLIENT_MSG_ERROR`].
    #[must_use]
    pub fn client_msg(message: impl Into<String>) -> Self {
        Self::new(Self::CLIENT_MSG_ERROR, message)
    }

    /// A [`Self::CLIENT_CERT_FAIL`].
    #[must_use]
    pub fn cert_fail(message: impl Into<String>) -> Self {
        Self::new(Self::CLIENT_CERT_FAIL, message)
    }

    /// A [`Self::NETWORK_NOT_SUPPORTED`].
    #[must_use]
    pub fn network_not_supported(network: impl std::fmt::Display) -> Self {
        Self::new(Self::NETWORK_NOT_SUPPORTED, format!("unsupported network: {network}"))
    }

    /// A [`Self::UNKNOWN_SERVICE`].
    #[must_use]
    pub fn unknown_service(service_name: impl std::fmt::Display) -> Self {
        Self::new(Self::UNKNOWN_SERVICE, format!("unknown service: {service_name}"))
    }

    /// A [`Self::UNKNOWN_METHOD`].
    #[must_use]
    pub fn unknown_method(service_name: impl std::fmt::Display, method: impl std::fmt::Display) -> Self {
        Self::new(Self::UNKNOWN_METHOD, format!("unknown method: {service_name}/{method}"))
    }

    /// Wrap an opaque user (handler) error under [`Self::HANDLER_ERROR`].
    #[must_use]
    pub fn handler_error(message: impl Into<String>) -> Self {
        Self::new(Self::HANDLER_ERROR, message)
    }

    /// Whether this is the default handler-error wrap code, i.e. an opaque
    /// user error rather than a framework-classified one.
    #[must_use]
    pub fn is_handler_error(&self) -> bool {
        self.code == Self::HANDLER_ERROR
    }
}

impl From<tessera_codec::CodecError> for FrameworkError {
    fn from(err: tessera_codec::CodecError) -> Self {
        Self::client_msg(err.to_string())
    }
}

impl From<tessera_proto::ProtocolError> for FrameworkError {
    fn from(err: tessera_proto::ProtocolError) -> Self {
        Self::client_msg(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_error_is_recognised() {
        let err = FrameworkError::handler_error("divide by zero");
        assert!(err.is_handler_error());
        assert_eq!(err.code, FrameworkError::HANDLER_ERROR);
    }

    #[test]
    fn coded_errors_are_not_handler_errors() {
        assert!(!FrameworkError::unknown_method("Calculator", "Frobnicate").is_handler_error());
    }
}
