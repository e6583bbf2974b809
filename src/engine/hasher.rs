use crate::params::HashAlgorithm;
use digest::Digest;
use sha2::{Sha256, Sha512};
use sha3::Sha3_256;

/// Incremental digest over `IV || Ciphertext`, fed in emission order
pub enum StreamHasher {
    Sha256(Sha256),
    Sha3(Sha3_256),
    Blake3(Box<blake3::Hasher>),
    Sha512(Sha512),
}

impl StreamHasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            HashAlgorithm::Sha3 => Self::Sha3(Sha3_256::new()),
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
            HashAlgorithm::Sha512 => Self::Sha512(Sha512::new()),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => Digest::update(h, data),
            Self::Sha3(h) => Digest::update(h, data),
            Self::Blake3(h) => {
                h.update(data);
            }
            Self::Sha512(h) => Digest::update(h, data),
        }
    }

    pub fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha256(h) => h.finalize().to_vec(),
            Self::Sha3(h) => h.finalize().to_vec(),
            Self::Blake3(h) => h.finalize().as_bytes().to_vec(),
            Self::Sha512(h) => h.finalize().to_vec(),
        }
    }
}

/// XOR `data` with `mask` repeated cyclically.
///
/// A mask longer than `data` contributes only its prefix. Applying the same
/// mask twice restores the input, so this both mangles and recovers keys.
pub fn xor_cyclic_in_place(data: &mut [u8], mask: &[u8]) {
    if mask.is_empty() {
        return;
    }
    for (d, m) in data.iter_mut().zip(mask.iter().cycle()) {
        *d ^= m;
    }
}
