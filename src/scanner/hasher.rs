//! SHA-256 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing content digests
//! of whole files. Files are streamed through a fixed-size buffer, so memory
//! use does not grow with file size. The file handle lives only for the
//! duration of one digest computation and is released on every exit path.
//!
//! # Example
//!
//! ```no_run
//! use dupemark::scanner::Hasher;
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.digest_file(Path::new("song.mp3")).unwrap();
//! println!("{} (tag {})", digest, digest.fragment());
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::{Serialize, Serializer};
use sha2::{Digest as _, Sha256};

use super::HashError;

/// Buffer size for streaming digest computation (64KB).
pub const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Number of leading digest bytes embedded in a marked file name.
pub const FRAGMENT_BYTES: usize = 8;

/// A 256-bit content digest.
///
/// Two files with equal digests are treated as content-identical.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Wrap raw digest bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full digest as a 64-character lowercase hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// Short tag used in marked file names: hex of the first 8 bytes.
    #[must_use]
    pub fn fragment(&self) -> String {
        to_hex(&self.0[..FRAGMENT_BYTES])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.fragment())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;

    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Streaming SHA-256 hasher for file content.
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default 64KB read buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: HASH_BUFFER_SIZE,
        }
    }

    /// Use a custom read buffer size (minimum 1 byte).
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Compute the digest of a file's full content.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read to the end.
    pub fn digest_file(&self, path: &Path) -> Result<Digest, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let digest = self
            .digest_reader(&mut file)
            .map_err(|e| HashError::from_io(path, e))?;
        log::trace!("Digested {}: {}", path.display(), digest.fragment());
        Ok(digest)
    }

    /// Compute the digest of everything a reader yields.
    ///
    /// # Errors
    ///
    /// Propagates any read error other than `Interrupted`.
    pub fn digest_reader<R: Read>(&self, reader: &mut R) -> io::Result<Digest> {
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..n]);
        }

        Ok(Digest(hasher.finalize().into()))
    }

    /// Compute the digest of an in-memory byte slice.
    #[must_use]
    pub fn digest_bytes(&self, data: &[u8]) -> Digest {
        Digest(Sha256::digest(data).into())
    }
}
