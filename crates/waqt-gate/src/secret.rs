//! Process-wide HMAC signing secret.

use std::fmt;
use std::sync::Arc;

use crate::error::EmptySecret;

/// Shared secret used to verify HMAC-signed bearer tokens.
///
/// Cloning is cheap and every clone reads the same immutable bytes.
#[derive(Clone)]
pub struct SigningSecret(Arc<[u8]>);

impl SigningSecret {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, EmptySecret> {
        let bytes = secret.as_ref();
        if bytes.is_empty() {
            return Err(EmptySecret);
        }
        Ok(Self(Arc::from(bytes)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret([REDACTED; {} bytes])", self.0.len())
    }
}
