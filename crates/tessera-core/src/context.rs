//! Call-scoped context: routing info, both metadata directions, and an
//! optional deadline. Lives for exactly one invocation.

use tokio::time::Instant;

use crate::metadata::Metadata;

/// Context threaded through a single RPC invocation, client or server side.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    /// Service name parsed from `/service/method` (client) or the envelope's
    /// `service_path` (server).
    pub service_name: String,
    /// Method name parsed the same way.
    pub method: String,
    /// Outbound (client) or already-decoded-inbound (server) metadata.
    pub client_metadata: Metadata,
    /// Server-direction metadata, populated from the decoded request
    /// envelope; empty on the client until a response arrives.
    pub server_metadata: Metadata,
    /// Absolute deadline for the call, if `timeout > 0` was configured.
    pub deadline: Option<Instant>,
}

impl CallContext {
    /// A fresh context for `service_name`/`method`, no metadata, no deadline.
    #[must_use]
    pub fn new(service_name: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            method: method.into(),
            client_metadata: Metadata::new(),
            server_metadata: Metadata::new(),
            deadline: None,
        }
    }

    /// Parse `/service/method` (leading slash optional, exactly one internal
    /// slash) into a fresh context.
    ///
    /// # Errors
    ///
    /// Returns an error message suitable for wrapping in a
    /// [`crate::codes::FrameworkError::client_msg`] if `path` doesn't have
    /// exactly that shape.
    pub fn from_path(path: &str) -> Result<Self, String> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let mut parts = trimmed.splitn(2, '/');
        let service_name = parts.next().filter(|s| !s.is_empty());
        let method = parts.next().filter(|s| !s.is_empty());
        match (service_name, method) {
            (Some(service_name), Some(method)) if !method.contains('/') => {
                Ok(Self::new(service_name, method))
            }
            _ => Err(format!("invalid service path: {path:?}, want /service/method")),
        }
    }

    /// Set an absolute deadline `timeout` from now.
    #[must_use]
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        if !timeout.is_zero() {
            self.deadline = Some(Instant::now() + timeout);
        }
        self
    }

    /// `/service_name/method`, as sent on the wire.
    #[must_use]
    pub fn service_path(&self) -> String {
        format!("/{}/{}", self.service_name, self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_with_leading_slash() {
        let ctx = CallContext::from_path("/Calculator/Calculate").unwrap();
        assert_eq!(ctx.service_name, "Calculator");
        assert_eq!(ctx.method, "Calculate");
    }

    #[test]
    fn parses_path_without_leading_slash() {
        let ctx = CallContext::from_path("Calculator/Calculate").unwrap();
        assert_eq!(ctx.service_name, "Calculator");
        assert_eq!(ctx.method, "Calculate");
    }

    #[test]
    fn rejects_path_without_slash() {
        assert!(CallContext::from_path("Calculator").is_err());
    }

    #[test]
    fn rejects_path_with_extra_slash() {
        assert!(CallContext::from_path("/Calculator/Calculate/Extra").is_err());
    }

    #[test]
    fn round_trips_service_path() {
        let ctx = CallContext::new("Calculator", "Calculate");
        assert_eq!(ctx.service_path(), "/Calculator/Calculate");
    }
}
