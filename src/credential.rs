//! Salted scrypt credentials.
//!
//! A credential is persisted as `salt.hash` where both segments are lowercase
//! hex. The salt is 8 random bytes, and the hash is a 32 byte scrypt key derived
//! from the password and the hex salt text. Cost parameters live in
//! [`KdfParams`] and are not encoded in the credential, so hashing and
//! verification must share one [`CredentialManager`].
//!
//! Hashing and verification are CPU bound. Async callers should run them on the
//! blocking pool (see [`crate::auth`]).

use rand::{rngs::OsRng, RngCore};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Separator between the salt and hash segments.
pub const SEPARATOR: char = '.';

/// Number of random salt bytes (16 hex characters once encoded).
pub const SALT_LEN: usize = 8;

/// Length of the derived key in bytes (64 hex characters once encoded).
pub const KEY_LEN: usize = 32;

/// Largest scrypt working set (`128 * r * N` bytes) a manager accepts: 1 GiB.
pub const MAX_MEMORY: u64 = 1 << 30;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("malformed credential")]
    Malformed,
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("invalid scrypt parameters: {0}")]
    InvalidParams(String),
    #[error("failed to generate salt")]
    Rng(#[from] rand::Error),
    #[error("key derivation failed")]
    Derive,
}

/// scrypt cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// log2 of the CPU/memory cost `N`.
    pub log_n: u8,
    /// Block size.
    pub r: u32,
    /// Parallelization.
    pub p: u32,
}

impl KdfParams {
    #[must_use]
    pub const fn new(log_n: u8, r: u32, p: u32) -> Self {
        Self { log_n, r, p }
    }

    /// Bytes scrypt allocates for its `V` array, `None` if it does not fit in a `u128`.
    #[must_use]
    pub fn memory_cost(&self) -> Option<u128> {
        let n = 1u128.checked_shl(u32::from(self.log_n))?;
        (128 * u128::from(self.r)).checked_mul(n)
    }
}

impl Default for KdfParams {
    // N = 16384, r = 8, p = 1
    fn default() -> Self {
        Self::new(14, 8, 1)
    }
}

/// A parsed `salt.hash` credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    salt: String,
    hash: String,
}

impl Credential {
    #[must_use]
    pub fn salt(&self) -> &str {
        &self.salt
    }

    #[must_use]
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl FromStr for Credential {
    type Err = CredentialError;

    fn from_str(stored: &str) -> Result<Self, Self::Err> {
        let mut segments = stored.split(SEPARATOR);

        let (Some(salt), Some(hash), None) = (segments.next(), segments.next(), segments.next())
        else {
            return Err(CredentialError::Malformed);
        };

        if !is_hex_segment(salt) || !is_hex_segment(hash) {
            return Err(CredentialError::Malformed);
        }

        Ok(Self {
            salt: salt.to_string(),
            hash: hash.to_string(),
        })
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.salt, self.hash)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("salt", &self.salt)
            .field("hash", &"***")
            .finish()
    }
}

fn is_hex_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.len() % 2 == 0 && segment.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Derives and checks salted password credentials.
#[derive(Debug, Clone)]
pub struct CredentialManager {
    params: scrypt::Params,
    kdf: KdfParams,
}

impl CredentialManager {
    /// # Errors
    /// Returns [`CredentialError::InvalidParams`] if scrypt rejects the cost parameters
    /// or they need more than [`MAX_MEMORY`] bytes per derivation.
    pub fn new(kdf: KdfParams) -> Result<Self, CredentialError> {
        let params = scrypt::Params::new(kdf.log_n, kdf.r, kdf.p, KEY_LEN)
            .map_err(|e| CredentialError::InvalidParams(e.to_string()))?;

        match kdf.memory_cost() {
            Some(bytes) if bytes <= u128::from(MAX_MEMORY) => {}
            _ => {
                return Err(CredentialError::InvalidParams(format!(
                    "128 * r * 2^log_n exceeds {MAX_MEMORY} bytes (log_n={}, r={})",
                    kdf.log_n, kdf.r
                )));
            }
        }

        Ok(Self { params, kdf })
    }

    #[must_use]
    pub const fn kdf(&self) -> KdfParams {
        self.kdf
    }

    /// Hash `plaintext` with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error if the password is empty, the OS RNG fails, or scrypt fails.
    pub fn hash(&self, plaintext: &str) -> Result<Credential, CredentialError> {
        if plaintext.is_empty() {
            return Err(CredentialError::EmptyPassword);
        }

        let mut salt = [0u8; SALT_LEN];
        OsRng.try_fill_bytes(&mut salt)?;
        let salt = hex::encode(salt);

        let key = self.derive(plaintext, &salt)?;

        Ok(Credential {
            salt,
            hash: hex::encode(key),
        })
    }

    /// Check `plaintext` against a stored `salt.hash` string.
    ///
    /// # Errors
    /// Returns [`CredentialError::Malformed`] if `stored` is not two non-empty hex
    /// segments, or [`CredentialError::Derive`] if scrypt fails.
    pub fn verify(&self, plaintext: &str, stored: &str) -> Result<bool, CredentialError> {
        let credential: Credential = stored.parse()?;
        let expected = hex::decode(credential.hash()).map_err(|_| CredentialError::Malformed)?;

        let derived = self.derive(plaintext, credential.salt())?;

        Ok(constant_time_eq(&derived, &expected))
    }

    fn derive(&self, plaintext: &str, salt: &str) -> Result<[u8; KEY_LEN], CredentialError> {
        let mut key = [0u8; KEY_LEN];
        scrypt::scrypt(plaintext.as_bytes(), salt.as_bytes(), &self.params, &mut key)
            .map_err(|_| CredentialError::Derive)?;
        Ok(key)
    }
}

/// Byte comparison whose running time depends only on the input lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
