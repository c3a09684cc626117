//! Typed service dispatch, replacing runtime reflection: handlers are
//! registered at startup as monomorphized closures rather than discovered by
//! introspecting a user object. The four signature-validation rules this
//! replaces become the Rust type system's job at the registration call site;
//! the one rule that survives as a runtime check is uniqueness (duplicate
//! method name within a service, duplicate service name within a server).

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};
use tessera_codec::Serializer;

use crate::{codes::FrameworkError, context::CallContext};

/// A boxed, `Send` future, used to erase a handler's concrete future type.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A method handler, erased to operate on serialized bytes so heterogeneous
/// methods can share one `HashMap`.
pub trait MethodHandler: Send + Sync {
    /// Decode `payload` with `serializer`, invoke the method, re-encode the
    /// result with the same serializer.
    fn call<'a>(
        &'a self,
        ctx: CallContext,
        payload: Bytes,
        serializer: Serializer,
    ) -> BoxFuture<'a, Result<Bytes, FrameworkError>>;
}

struct TypedMethod<F> {
    handler: F,
}

impl<F, Fut, Req, Rep> MethodHandler for TypedMethod<F>
where
    F: Fn(CallContext, Req) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Rep, FrameworkError>> + Send,
    Req: DeserializeOwned + Send,
    Rep: Serialize + Send,
{
    fn call<'a>(
        &'a self,
        ctx: CallContext,
        payload: Bytes,
        serializer: Serializer,
    ) -> BoxFuture<'a, Result<Bytes, FrameworkError>> {
        Box::pin(async move {
            let req: Req = serializer
                .deserialize(&payload)
                .map_err(|e| FrameworkError::client_msg(e.to_string()))?;
            let rep = (self.handler)(ctx, req).await?;
            serializer.serialize(&rep).map_err(|e| FrameworkError::client_msg(e.to_string()))
        })
    }
}

/// A registered service: a name plus its methods.
pub struct Service {
    name: String,
    methods: HashMap<String, Arc<dyn MethodHandler>>,
}

impl Service {
    /// The service's registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Arc<dyn MethodHandler>> {
        self.methods.get(name)
    }
}

/// Builds a [`Service`], rejecting duplicate method names.
pub struct ServiceBuilder {
    name: String,
    methods: HashMap<String, Arc<dyn MethodHandler>>,
}

impl ServiceBuilder {
    /// Start building a service named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), methods: HashMap::new() }
    }

    /// Register a typed method handler.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` was already registered on this builder.
    pub fn method<F, Fut, Req, Rep>(mut self, name: impl Into<String>, handler: F) -> Result<Self, String>
    where
        F: Fn(CallContext, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Rep, FrameworkError>> + Send + 'static,
        Req: DeserializeOwned + Send + 'static,
        Rep: Serialize + Send + 'static,
    {
        let name = name.into();
        if self.methods.contains_key(&name) {
            return Err(format!("duplicate method {name:?} on service {:?}", self.name));
        }
        self.methods.insert(name, Arc::new(TypedMethod { handler }));
        Ok(self)
    }

    /// Finish building the service.
    #[must_use]
    pub fn build(self) -> Service {
        Service { name: self.name, methods: self.methods }
    }
}
