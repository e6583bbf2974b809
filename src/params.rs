//! Per-call transform parameters.
//!
//! Nothing here is global: callers build a [`Params`] value (it is `Copy`)
//! and hand it to each engine call. Mode and padding are fixed to AES-CBC
//! with ISO 10126 padding, so only the key size and digest vary.

use crate::error::{AontError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// AES block size in bytes; also the IV length.
pub const BLOCK_LEN: usize = 16;

/// Digest used to bind the key to the whole ciphertext
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha3,
    Blake3,
    Sha512,
}

impl HashAlgorithm {
    /// Digest output length in bytes
    pub fn digest_len(self) -> usize {
        match self {
            Self::Sha256 | Self::Sha3 | Self::Blake3 => 32,
            Self::Sha512 => 64,
        }
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = AontError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha3" | "sha3-256" => Ok(Self::Sha3),
            "blake3" => Ok(Self::Blake3),
            "sha512" => Ok(Self::Sha512),
            _ => Err(AontError::UnsupportedAlgorithm(format!("hash: {}", s))),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sha256 => "sha256",
            Self::Sha3 => "sha3",
            Self::Blake3 => "blake3",
            Self::Sha512 => "sha512",
        };
        f.write_str(name)
    }
}

/// AES key size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeySize {
    Aes128,
    Aes192,
    #[default]
    Aes256,
}

impl KeySize {
    /// Key length in bytes
    pub fn key_len(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }

    pub fn bits(self) -> usize {
        self.key_len() * 8
    }
}

impl std::str::FromStr for KeySize {
    type Err = AontError;
    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.to_lowercase();
        match lowered.trim_start_matches("aes") {
            "128" => Ok(Self::Aes128),
            "192" => Ok(Self::Aes192),
            "256" => Ok(Self::Aes256),
            _ => Err(AontError::UnsupportedAlgorithm(format!("key size: {}", s))),
        }
    }
}

impl fmt::Display for KeySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "aes{}", self.bits())
    }
}

/// Cipher and digest selection for one transform or reverse transform.
///
/// Both directions must agree; the stream does not record them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Params {
    pub key_size: KeySize,
    pub hash: HashAlgorithm,
}

impl Params {
    pub fn new(key_size: KeySize, hash: HashAlgorithm) -> Self {
        Self { key_size, hash }
    }

    pub fn block_len(&self) -> usize {
        BLOCK_LEN
    }

    pub fn iv_len(&self) -> usize {
        BLOCK_LEN
    }

    pub fn key_len(&self) -> usize {
        self.key_size.key_len()
    }

    /// Bytes of ISO 10126 padding added to `plaintext_len` bytes (1..=block).
    pub fn pad_len(&self, plaintext_len: u64) -> u64 {
        let block = self.block_len() as u64;
        block - plaintext_len % block
    }

    /// Exact length of the transformed stream for a plaintext of `plaintext_len`.
    pub fn transformed_len(&self, plaintext_len: u64) -> u64 {
        plaintext_len + self.pad_len(plaintext_len) + self.key_len() as u64 + self.iv_len() as u64
    }

    /// Per-part size that splits the transformed stream into `parts` roughly
    /// equal pieces (the last one may be shorter).
    pub fn estimate_part_size(&self, plaintext_len: u64, parts: usize) -> Result<u64> {
        if parts == 0 {
            return Err(AontError::Config("part count must be at least 1".into()));
        }
        Ok(self.transformed_len(plaintext_len).div_ceil(parts as u64))
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-cbc/{}", self.key_size, self.hash)
    }
}
