//! # Sigil (salted password credentials)
//!
//! `sigil` signs users up with a salted scrypt hash of their password and signs
//! them in by re-deriving that hash.
//!
//! ## Credentials
//!
//! A credential is stored as `salt.hash`: 8 random bytes of salt and a 32 byte
//! scrypt key, both hex encoded. The scrypt cost parameters are process-wide and
//! are not part of the stored string, so every instance sharing a directory must
//! run with the same `--scrypt-*` settings.
//!
//! ## User directory
//!
//! Users live behind the [`directory::UserDirectory`] trait. The server uses
//! PostgreSQL when a DSN is configured and an in-memory directory otherwise.
//! Email uniqueness under concurrent signups is enforced by the directory.
//!
//! ## Errors
//!
//! Unknown emails and wrong passwords map to different status codes (`404` and
//! `400`) but share the same response body.

pub mod api;
pub mod auth;
pub mod cli;
pub mod credential;
pub mod directory;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
