use thiserror::Error;

/// Errors from plugin initialization or shutdown.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PluginError {
    /// The plugin's backing store (etcd, a KV store, ...) failed.
    #[error("plugin backend error: {0}")]
    Backend(String),

    /// No plugin is registered under this name.
    #[error("no plugin registered under name {0:?}")]
    UnknownName(String),
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, PluginError>;
