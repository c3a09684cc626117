//! Generic tag → codec registry, instantiated once for envelope codecs and
//! once for payload serializers. Both registries are global, write-once
//! (registration happens at process startup, before `serve`/the first
//! `invoke`), read-mostly thereafter — hence `OnceLock<RwLock<HashMap<...>>>`
//! rather than a `DashMap`: writes are rare and contention isn't a concern,
//! but a `RwLock` still lets concurrent calls look a tag up without
//! serializing on each other.

use std::{
    collections::HashMap,
    sync::{Arc, OnceLock, RwLock},
};

use crate::errors::{CodecError, Result};

/// A registry mapping a tag string to a `T`, shared behind `Arc`. `T` may be
/// unsized (e.g. `dyn EnvelopeCodec`) so the registry can hold trait objects.
pub struct CodecRegistry<T: ?Sized> {
    entries: OnceLock<RwLock<HashMap<String, Arc<T>>>>,
}

impl<T: ?Sized> CodecRegistry<T> {
    /// An empty registry. Intended for `static` use:
    /// `static REGISTRY: CodecRegistry<Serializer> = CodecRegistry::new();`
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: OnceLock::new() }
    }

    fn map(&self) -> &RwLock<HashMap<String, Arc<T>>> {
        self.entries.get_or_init(|| RwLock::new(HashMap::new()))
    }

    /// Register `value` under `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DuplicateTag`] if `tag` is already registered.
    pub fn register(&self, tag: impl Into<String>, value: Arc<T>) -> Result<()> {
        let tag = tag.into();
        let mut map = self.map().write().unwrap_or_else(std::sync::PoisonError::into_inner);
        if map.contains_key(&tag) {
            return Err(CodecError::DuplicateTag(tag));
        }
        map.insert(tag, value);
        Ok(())
    }

    /// Look up the value registered under `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownTag`] if nothing is registered under `tag`.
    pub fn get(&self, tag: &str) -> Result<Arc<T>> {
        let map = self.map().read().unwrap_or_else(std::sync::PoisonError::into_inner);
        map.get(tag).cloned().ok_or_else(|| CodecError::UnknownTag(tag.to_owned()))
    }

    /// All tags currently registered, in arbitrary order.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        let map = self.map().read().unwrap_or_else(std::sync::PoisonError::into_inner);
        map.keys().cloned().collect()
    }
}

impl<T: ?Sized> Default for CodecRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_get() {
        let registry: CodecRegistry<u32> = CodecRegistry::new();
        registry.register("a", Arc::new(1)).unwrap();
        assert_eq!(*registry.get("a").unwrap(), 1);
    }

    #[test]
    fn duplicate_registration_rejected() {
        let registry: CodecRegistry<u32> = CodecRegistry::new();
        registry.register("a", Arc::new(1)).unwrap();
        assert!(registry.register("a", Arc::new(2)).is_err());
    }

    #[test]
    fn unknown_tag_rejected() {
        let registry: CodecRegistry<u32> = CodecRegistry::new();
        assert!(registry.get("missing").is_err());
    }
}
