//! Per-RPC auth providers: client-side credential suppliers, and the
//! matching server-side verifier.

use async_trait::async_trait;
use bytes::Bytes;

use crate::{
    codes::FrameworkError,
    context::CallContext,
    interceptor::{ClientInterceptor, ClientNext, ServerInterceptor, ServerNext},
    metadata::{AUTHORIZATION_KEY, Metadata},
};
use tessera_codec::{Request, Response};

/// Supplies per-call metadata, most commonly an `authorization` token.
/// Registered in `ClientOptions::per_rpc_auth`; later providers in that list
/// override earlier ones on shared keys (see [`crate::metadata::merge`]).
#[async_trait]
pub trait PerRpcAuth: Send + Sync {
    /// Produce the metadata this provider contributes for one call.
    async fn get_metadata(&self, ctx: &CallContext) -> Result<Metadata, FrameworkError>;
}

/// A static bearer token, sent as `Bearer <token>` under the
/// [`AUTHORIZATION_KEY`] metadata key.
#[derive(Debug, Clone)]
pub struct BearerTokenAuth {
    token: String,
}

impl BearerTokenAuth {
    /// Wrap a static token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl PerRpcAuth for BearerTokenAuth {
    async fn get_metadata(&self, _ctx: &CallContext) -> Result<Metadata, FrameworkError> {
        let mut md = Metadata::new();
        md.insert(AUTHORIZATION_KEY.to_owned(), Bytes::from(format!("Bearer {}", self.token)));
        Ok(md)
    }
}

/// Server-side client interceptor wrapper used for the symmetric case where
/// an auth check must run on the client before a call is sent (e.g.
/// rejecting a call early if no provider is configured for a protected
/// method). Most auth enforcement instead happens server-side; see
/// `tessera-server`'s dispatcher, which checks [`AUTHORIZATION_KEY`] against
/// an expected value and raises [`FrameworkError::cert_fail`] on mismatch or
/// absence, exactly mirroring a client sending `token` where the server
/// expects `Bearer token`.
#[derive(Debug, Clone)]
pub struct RequireAuthClientInterceptor;

#[async_trait]
impl ClientInterceptor for RequireAuthClientInterceptor {
    async fn intercept(
        &self,
        ctx: &mut CallContext,
        req: &Request,
        next: ClientNext<'_>,
    ) -> Result<Response, FrameworkError> {
        if !ctx.client_metadata.contains_key(AUTHORIZATION_KEY) && !req.metadata.contains_key(AUTHORIZATION_KEY) {
            return Err(FrameworkError::cert_fail("no authorization metadata attached to call"));
        }
        next.call(ctx, req).await
    }
}

/// Check an expected bearer value (`"Bearer <token>"`) against a request's
/// `authorization` metadata. Used by the server-side auth enforcement path.
///
/// # Errors
///
/// Returns [`FrameworkError::cert_fail`] if the header is absent or doesn't
/// match `expected` exactly.
pub fn verify_bearer(metadata: &Metadata, expected: &str) -> Result<(), FrameworkError> {
    match metadata.get(AUTHORIZATION_KEY) {
        Some(value) if value.as_ref() == expected.as_bytes() => Ok(()),
        Some(_) => Err(FrameworkError::cert_fail("authorization token mismatch")),
        None => Err(FrameworkError::cert_fail("missing authorization metadata")),
    }
}

/// Server-side enforcement counterpart to [`BearerTokenAuth`]: rejects any
/// call whose `authorization` metadata doesn't match `expected` exactly
/// (e.g. a client sending `token` where this interceptor expects
/// `Bearer token`) before the dispatcher ever sees the request.
#[derive(Debug, Clone)]
pub struct RequireBearerServerInterceptor {
    expected: String,
}

impl RequireBearerServerInterceptor {
    /// Require `Bearer <token>` on every intercepted call.
    #[must_use]
    pub fn new(token: impl std::fmt::Display) -> Self {
        Self { expected: format!("Bearer {token}") }
    }
}

#[async_trait]
impl ServerInterceptor for RequireBearerServerInterceptor {
    async fn intercept(
        &self,
        ctx: &mut CallContext,
        req: &Request,
        next: ServerNext<'_>,
    ) -> Result<Response, FrameworkError> {
        verify_bearer(&req.metadata, &self.expected)?;
        next.call(ctx, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bearer_auth_sets_expected_header() {
        let auth = BearerTokenAuth::new("secret");
        let ctx = CallContext::new("Calculator", "Calculate");
        let md = auth.get_metadata(&ctx).await.unwrap();
        assert_eq!(md.get(AUTHORIZATION_KEY).unwrap().as_ref(), b"Bearer secret");
    }

    #[test]
    fn verify_bearer_rejects_mismatch() {
        let mut md = Metadata::new();
        md.insert(AUTHORIZATION_KEY.to_owned(), Bytes::from_static(b"token"));
        let err = verify_bearer(&md, "Bearer token").unwrap_err();
        assert_eq!(err.code, FrameworkError::CLIENT_CERT_FAIL);
    }

    #[test]
    fn verify_bearer_rejects_absence() {
        let md = Metadata::new();
        assert!(verify_bearer(&md, "Bearer token").is_err());
    }

    #[test]
    fn verify_bearer_accepts_exact_match() {
        let mut md = Metadata::new();
        md.insert(AUTHORIZATION_KEY.to_owned(), Bytes::from_static(b"Bearer token"));
        assert!(verify_bearer(&md, "Bearer token").is_ok());
    }
}
