//! AES-CBC with ISO 10126 padding.
//!
//! The CBC state machines come from the `cbc` crate; padding is handled
//! here because the final block is produced and checked separately from
//! the bulk of the stream.

use crate::error::{AontError, Result};
use crate::params::{KeySize, BLOCK_LEN};
use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

/// CBC encryptor for the configured key size
pub enum CbcEncryptor {
    Aes128(cbc::Encryptor<Aes128>),
    Aes192(cbc::Encryptor<Aes192>),
    Aes256(cbc::Encryptor<Aes256>),
}

impl CbcEncryptor {
    pub fn new(key_size: KeySize, key: &[u8], iv: &[u8]) -> Result<Self> {
        let enc = match key_size {
            KeySize::Aes128 => Self::Aes128(init(key, iv)?),
            KeySize::Aes192 => Self::Aes192(init(key, iv)?),
            KeySize::Aes256 => Self::Aes256(init(key, iv)?),
        };
        Ok(enc)
    }

    /// Encrypt whole blocks in place, carrying the chain across calls.
    /// `data.len()` must be a multiple of [`BLOCK_LEN`].
    pub fn encrypt_blocks(&mut self, data: &mut [u8]) {
        debug_assert_eq!(data.len() % BLOCK_LEN, 0);
        match self {
            Self::Aes128(c) => encrypt_chunks(c, data),
            Self::Aes192(c) => encrypt_chunks(c, data),
            Self::Aes256(c) => encrypt_chunks(c, data),
        }
    }
}

/// CBC decryptor for the configured key size
pub enum CbcDecryptor {
    Aes128(cbc::Decryptor<Aes128>),
    Aes192(cbc::Decryptor<Aes192>),
    Aes256(cbc::Decryptor<Aes256>),
}

impl CbcDecryptor {
    pub fn new(key_size: KeySize, key: &[u8], iv: &[u8]) -> Result<Self> {
        let dec = match key_size {
            KeySize::Aes128 => Self::Aes128(init(key, iv)?),
            KeySize::Aes192 => Self::Aes192(init(key, iv)?),
            KeySize::Aes256 => Self::Aes256(init(key, iv)?),
        };
        Ok(dec)
    }

    /// Decrypt whole blocks in place, carrying the chain across calls.
    /// `data.len()` must be a multiple of [`BLOCK_LEN`].
    pub fn decrypt_blocks(&mut self, data: &mut [u8]) {
        debug_assert_eq!(data.len() % BLOCK_LEN, 0);
        match self {
            Self::Aes128(c) => decrypt_chunks(c, data),
            Self::Aes192(c) => decrypt_chunks(c, data),
            Self::Aes256(c) => decrypt_chunks(c, data),
        }
    }
}

fn init<C: KeyIvInit>(key: &[u8], iv: &[u8]) -> Result<C> {
    C::new_from_slices(key, iv).map_err(|_| {
        AontError::Config(format!(
            "invalid key/IV length: {} / {} bytes",
            key.len(),
            iv.len()
        ))
    })
}

fn encrypt_chunks<C: BlockEncryptMut>(cipher: &mut C, data: &mut [u8]) {
    for chunk in data.chunks_exact_mut(BLOCK_LEN) {
        cipher.encrypt_block_mut(GenericArray::from_mut_slice(chunk));
    }
}

fn decrypt_chunks<C: BlockDecryptMut>(cipher: &mut C, data: &mut [u8]) {
    for chunk in data.chunks_exact_mut(BLOCK_LEN) {
        cipher.decrypt_block_mut(GenericArray::from_mut_slice(chunk));
    }
}

/// Fill a padding region: random bytes, last byte = region length.
pub fn fill_padding<G: RngCore + ?Sized>(rng: &mut G, pad: &mut [u8]) {
    debug_assert!((1..=BLOCK_LEN).contains(&pad.len()));
    let last = pad.len() - 1;
    rng.fill_bytes(&mut pad[..last]);
    pad[last] = pad.len() as u8;
}

/// Pad length encoded in a decrypted final block, if it is plausible.
///
/// Only the last byte is checkable, so a wrong key passes 1 time in 16.
pub fn padding_len(final_block: &[u8]) -> Option<usize> {
    let n = *final_block.last()? as usize;
    if n == 0 || n > BLOCK_LEN || n > final_block.len() {
        None
    } else {
        Some(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cbc_roundtrip_all_key_sizes() {
        for key_size in [KeySize::Aes128, KeySize::Aes192, KeySize::Aes256] {
            let key = vec![7u8; key_size.key_len()];
            let iv = [9u8; BLOCK_LEN];
            let original: Vec<u8> = (0..96).map(|i| i as u8).collect();

            let mut data = original.clone();
            let mut enc = CbcEncryptor::new(key_size, &key, &iv).unwrap();
            enc.encrypt_blocks(&mut data[..32]);
            enc.encrypt_blocks(&mut data[32..]);
            assert_ne!(data, original);

            let mut dec = CbcDecryptor::new(key_size, &key, &iv).unwrap();
            dec.decrypt_blocks(&mut data);
            assert_eq!(data, original, "{key_size}");
        }
    }

    #[test]
    fn test_aes256_cbc_known_vector() {
        // NIST SP 800-38A F.2.5, first block
        let key = hex::decode("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4")
            .unwrap();
        let iv = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let mut block = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let mut enc = CbcEncryptor::new(KeySize::Aes256, &key, &iv).unwrap();
        enc.encrypt_blocks(&mut block);
        assert_eq!(hex::encode(&block), "f58c4c04d6e5f1ba779eabfb5f7bfbd6");
    }

    #[test]
    fn test_wrong_key_length_rejected() {
        let result = CbcEncryptor::new(KeySize::Aes256, &[0u8; 16], &[0u8; BLOCK_LEN]);
        assert!(matches!(result, Err(AontError::Config(_))));
    }

    #[test]
    fn test_fill_padding_encodes_length() {
        let mut rng = StdRng::seed_from_u64(1);
        for len in 1..=BLOCK_LEN {
            let mut pad = vec![0u8; len];
            fill_padding(&mut rng, &mut pad);
            assert_eq!(pad[len - 1] as usize, len);
            assert_eq!(padding_len(&pad), Some(len));
        }
    }

    #[test]
    fn test_padding_len_rejects_out_of_range() {
        let mut block = [0u8; BLOCK_LEN];
        assert_eq!(padding_len(&block), None);
        block[BLOCK_LEN - 1] = 17;
        assert_eq!(padding_len(&block), None);
        block[BLOCK_LEN - 1] = 16;
        assert_eq!(padding_len(&block), Some(16));
        assert_eq!(padding_len(&[]), None);
    }
}
