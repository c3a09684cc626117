use thiserror::Error;

/// Errors from resolving or balancing a service name to an address.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// No selector/balancer/resolver is registered under this name.
    #[error("no {kind} registered under name {name:?}")]
    UnknownName {
        /// `"resolver"`, `"balancer"`, or `"selector"`.
        kind: &'static str,
        /// The unrecognised name.
        name: String,
    },

    /// A resolver returned zero nodes for a service name.
    #[error("resolver returned no nodes for service {0:?}")]
    NoNodes(String),

    /// The resolver backend itself failed.
    #[error("resolve failed: {0}")]
    ResolveFailed(String),
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, SelectorError>;
