//! Per-call key→bytes metadata maps.

use std::collections::HashMap;

use bytes::Bytes;

/// Reserved metadata key auth providers write to and auth interceptors read.
pub const AUTHORIZATION_KEY: &str = "authorization";

/// A case-sensitive key→bytes map. Two disjoint instances exist per call: one
/// populated outbound by the client (and by `perRPCAuth` providers), one
/// populated server-side from the decoded request envelope.
pub type Metadata = HashMap<String, Bytes>;

/// Merge `incoming` into `base`. Keys present in both take `incoming`'s
/// value; unrelated keys in `base` are preserved. Used to apply successive
/// `perRPCAuth` providers, where later providers override earlier keys.
pub fn merge(base: &mut Metadata, incoming: Metadata) {
    base.extend(incoming);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overrides_shared_keys_and_keeps_the_rest() {
        let mut base = Metadata::new();
        base.insert("authorization".to_owned(), Bytes::from_static(b"token-a"));
        base.insert("trace-id".to_owned(), Bytes::from_static(b"abc"));

        let mut incoming = Metadata::new();
        incoming.insert("authorization".to_owned(), Bytes::from_static(b"token-b"));

        merge(&mut base, incoming);

        assert_eq!(base.get("authorization"), Some(&Bytes::from_static(b"token-b")));
        assert_eq!(base.get("trace-id"), Some(&Bytes::from_static(b"abc")));
    }
}
