//! Symmetric client/server interceptor chains, composed right-associatively:
//! `interceptors[0]` is outermost and observes the final error on the way
//! back up. A zero-length chain calls the terminal directly.

use std::sync::Arc;

use async_trait::async_trait;
use tessera_codec::{Request, Response};

use crate::{codes::FrameworkError, context::CallContext};

/// Middleware around a client call. `next` is the rest of the chain
/// (including the terminal network send).
#[async_trait]
pub trait ClientInterceptor: Send + Sync {
    /// Observe/modify the call, then continue the chain via `next`.
    async fn intercept(
        &self,
        ctx: &mut CallContext,
        req: &Request,
        next: ClientNext<'_>,
    ) -> Result<Response, FrameworkError>;
}

/// The innermost client step: actually sending the request and getting a
/// response back.
#[async_trait]
pub trait ClientTerminal: Send + Sync {
    /// Perform the call with no further interceptors.
    async fn call(&self, ctx: &mut CallContext, req: &Request) -> Result<Response, FrameworkError>;
}

/// The remaining chain available to an interceptor's `next` call.
pub struct ClientNext<'a> {
    remaining: &'a [Arc<dyn ClientInterceptor>],
    terminal: &'a (dyn ClientTerminal + Sync),
}

impl<'a> ClientNext<'a> {
    /// Build a `Next` over the full chain and its terminal.
    #[must_use]
    pub fn new(chain: &'a [Arc<dyn ClientInterceptor>], terminal: &'a (dyn ClientTerminal + Sync)) -> Self {
        Self { remaining: chain, terminal }
    }

    /// Invoke the next interceptor, or the terminal if the chain is exhausted.
    pub async fn call(self, ctx: &mut CallContext, req: &Request) -> Result<Response, FrameworkError> {
        match self.remaining.split_first() {
            Some((first, rest)) => {
                first.intercept(ctx, req, ClientNext { remaining: rest, terminal: self.terminal }).await
            }
            None => self.terminal.call(ctx, req).await,
        }
    }
}

/// Run `interceptors` (outermost first) around `terminal`.
pub async fn run_client_chain(
    interceptors: &[Arc<dyn ClientInterceptor>],
    terminal: &(dyn ClientTerminal + Sync),
    ctx: &mut CallContext,
    req: &Request,
) -> Result<Response, FrameworkError> {
    ClientNext::new(interceptors, terminal).call(ctx, req).await
}

/// Middleware around a server's handling of one request.
#[async_trait]
pub trait ServerInterceptor: Send + Sync {
    /// Observe/modify the call, then continue the chain via `next`.
    async fn intercept(
        &self,
        ctx: &mut CallContext,
        req: &Request,
        next: ServerNext<'_>,
    ) -> Result<Response, FrameworkError>;
}

/// The innermost server step: looking up and invoking the matched handler.
#[async_trait]
pub trait ServerTerminal: Send + Sync {
    /// Invoke the matched handler with no further interceptors.
    async fn call(&self, ctx: &mut CallContext, req: &Request) -> Result<Response, FrameworkError>;
}

/// The remaining chain available to an interceptor's `next` call.
pub struct ServerNext<'a> {
    remaining: &'a [Arc<dyn ServerInterceptor>],
    terminal: &'a (dyn ServerTerminal + Sync),
}

impl<'a> ServerNext<'a> {
    /// Build a `Next` over the full chain and its terminal.
    #[must_use]
    pub fn new(chain: &'a [Arc<dyn ServerInterceptor>], terminal: &'a (dyn ServerTerminal + Sync)) -> Self {
        Self { remaining: chain, terminal }
    }

    /// Invoke the next interceptor, or the terminal if the chain is exhausted.
    pub async fn call(self, ctx: &mut CallContext, req: &Request) -> Result<Response, FrameworkError> {
        match self.remaining.split_first() {
            Some((first, rest)) => {
                first.intercept(ctx, req, ServerNext { remaining: rest, terminal: self.terminal }).await
            }
            None => self.terminal.call(ctx, req).await,
        }
    }
}

/// Run `interceptors` (outermost first) around `terminal`.
pub async fn run_server_chain(
    interceptors: &[Arc<dyn ServerInterceptor>],
    terminal: &(dyn ServerTerminal + Sync),
    ctx: &mut CallContext,
    req: &Request,
) -> Result<Response, FrameworkError> {
    ServerNext::new(interceptors, terminal).call(ctx, req).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;

    use super::*;

    fn sample_request() -> Request {
        Request {
            service_path: "/Calculator/Calculate".to_owned(),
            payload: Bytes::new(),
            metadata: Default::default(),
        }
    }

    struct RecordingInterceptor {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl ClientInterceptor for RecordingInterceptor {
        async fn intercept(
            &self,
            ctx: &mut CallContext,
            req: &Request,
            next: ClientNext<'_>,
        ) -> Result<Response, FrameworkError> {
            self.log.lock().unwrap().push(self.name);
            let result = next.call(ctx, req).await;
            self.log.lock().unwrap().push(self.name);
            result
        }
    }

    struct OkTerminal;

    #[async_trait]
    impl ClientTerminal for OkTerminal {
        async fn call(&self, _ctx: &mut CallContext, _req: &Request) -> Result<Response, FrameworkError> {
            Ok(Response::ok(Bytes::new()))
        }
    }

    struct ErrTerminal;

    #[async_trait]
    impl ClientTerminal for ErrTerminal {
        async fn call(&self, _ctx: &mut CallContext, _req: &Request) -> Result<Response, FrameworkError> {
            Err(FrameworkError::handler_error("boom"))
        }
    }

    #[tokio::test]
    async fn chain_runs_outermost_first_both_ways() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let interceptors: Vec<Arc<dyn ClientInterceptor>> = vec![
            Arc::new(RecordingInterceptor { name: "A", log: log.clone() }),
            Arc::new(RecordingInterceptor { name: "B", log: log.clone() }),
            Arc::new(RecordingInterceptor { name: "C", log: log.clone() }),
        ];
        let mut ctx = CallContext::new("Calculator", "Calculate");
        let result = run_client_chain(&interceptors, &OkTerminal, &mut ctx, &sample_request()).await;

        assert!(result.is_ok());
        assert_eq!(*log.lock().unwrap(), vec!["A", "B", "C", "C", "B", "A"]);
    }

    #[tokio::test]
    async fn empty_chain_calls_terminal_directly() {
        let mut ctx = CallContext::new("Calculator", "Calculate");
        let result = run_client_chain(&[], &OkTerminal, &mut ctx, &sample_request()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn terminal_error_propagates_unmodified_through_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let interceptors: Vec<Arc<dyn ClientInterceptor>> =
            vec![Arc::new(RecordingInterceptor { name: "A", log: log.clone() })];
        let mut ctx = CallContext::new("Calculator", "Calculate");
        let result = run_client_chain(&interceptors, &ErrTerminal, &mut ctx, &sample_request()).await;

        let err = result.unwrap_err();
        assert_eq!(err.code, FrameworkError::HANDLER_ERROR);
        assert_eq!(*log.lock().unwrap(), vec!["A", "A"]);
    }
}
