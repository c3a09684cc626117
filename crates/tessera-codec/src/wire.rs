//! `bytes::Buf`/`BufMut` helpers for the manual, length-prefixed binary
//! envelope format (tag `proto`).

use std::collections::HashMap;

use bytes::{Buf, BufMut, Bytes};

use crate::errors::{CodecError, Result};

/// Upper bound on any single length-prefixed field, guarding against a
/// corrupt or hostile length prefix forcing an enormous allocation.
const MAX_FIELD_LEN: usize = 16 * 1024 * 1024;

pub(crate) trait BufMutExt: BufMut {
    fn put_str_field(&mut self, s: &str) {
        self.put_u32(s.len() as u32);
        self.put_slice(s.as_bytes());
    }

    fn put_bytes_field(&mut self, b: &[u8]) {
        self.put_u32(b.len() as u32);
        self.put_slice(b);
    }

    fn put_metadata(&mut self, md: &HashMap<String, Bytes>) {
        self.put_u32(md.len() as u32);
        for (k, v) in md {
            self.put_str_field(k);
            self.put_bytes_field(v);
        }
    }
}

impl<T: BufMut> BufMutExt for T {}

pub(crate) trait BufExt: Buf {
    fn try_u32_field(&mut self) -> Result<u32> {
        if self.remaining() < 4 {
            return Err(CodecError::InvalidLength);
        }
        Ok(self.get_u32())
    }

    fn try_bytes_field(&mut self) -> Result<Bytes> {
        let len = self.try_u32_field()? as usize;
        if len > MAX_FIELD_LEN || self.remaining() < len {
            return Err(CodecError::InvalidLength);
        }
        Ok(self.copy_to_bytes(len))
    }

    fn try_str_field(&mut self) -> Result<String> {
        let bytes = self.try_bytes_field()?;
        Ok(std::str::from_utf8(&bytes)?.to_owned())
    }

    fn try_metadata(&mut self) -> Result<HashMap<String, Bytes>> {
        let count = self.try_u32_field()? as usize;
        if count > MAX_FIELD_LEN {
            return Err(CodecError::InvalidLength);
        }
        let mut map = HashMap::with_capacity(count.min(1024));
        for _ in 0..count {
            let key = self.try_str_field()?;
            let value = self.try_bytes_field()?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<T: Buf> BufExt for T {}
