//! Opaque handle tokens and their random minting.

use std::collections::HashMap;
use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{StoreError, StoreResult};

/// Random bytes per handle; hex-encoded to twice this many characters.
const HANDLE_BYTES: usize = 8;

/// An opaque token identifying a stored value.
///
/// Handles are minted from cryptographically strong random bytes. A single
/// mint carries no uniqueness guarantee of its own; stores retry minting
/// until the candidate does not collide with a live handle, so a handle is
/// collision-free only within the store that issued it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(String);

impl Handle {
    /// Mint a candidate handle from OS randomness.
    pub fn mint() -> StoreResult<Self> {
        let mut bytes = [0u8; HANDLE_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| StoreError::EntropyUnavailable(e.to_string()))?;
        Ok(Self(hex::encode(bytes)))
    }

    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Mint handles until one does not collide with a live key.
///
/// Callers must hold whatever exclusivity guards `entries` for the duration
/// of the loop and the subsequent insert, so the uniqueness check and the
/// insertion are atomic together.
pub(crate) fn mint_unused<V>(entries: &HashMap<Handle, V>) -> StoreResult<Handle> {
    loop {
        let candidate = Handle::mint()?;
        if !entries.contains_key(&candidate) {
            return Ok(candidate);
        }
    }
}
