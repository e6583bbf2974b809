use crate::engine::cipher::{padding_len, CbcDecryptor};
use crate::engine::hasher::{xor_cyclic_in_place, StreamHasher};
use crate::engine::{read_full, BUF_SIZE};
use crate::error::{AontError, Result};
use crate::params::Params;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use tracing::debug;
use zeroize::Zeroizing;

/// A transformed source the reverse transform can rewind.
///
/// Reversal reads the ciphertext twice: once to hash it and recover the
/// key, then again to decrypt. Forward-only sources such as stdin cannot
/// satisfy that and do not implement this trait.
pub trait RandomAccess: Read + Seek {
    /// Total length of the logical stream
    fn byte_len(&mut self) -> io::Result<u64>;
}

impl RandomAccess for File {
    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

impl<T: AsRef<[u8]>> RandomAccess for Cursor<T> {
    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().as_ref().len() as u64)
    }
}

impl<R: RandomAccess + ?Sized> RandomAccess for &mut R {
    fn byte_len(&mut self) -> io::Result<u64> {
        (**self).byte_len()
    }
}

/// Byte counts from one reverse transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnTransformSummary {
    pub input_bytes: u64,
    pub plaintext_bytes: u64,
}

/// Reverse the all-or-nothing transform.
///
/// Pass 1 hashes `IV || Ciphertext` and unmangles the trailing key. Pass 2
/// checks the padding of the final block before anything is written, then
/// rewinds and streams the plaintext into `sink`.
///
/// Every validation failure surfaces as [`AontError::Integrity`], whatever
/// the cause.
pub fn untransform<R, W>(source: &mut R, sink: &mut W, params: &Params) -> Result<UnTransformSummary>
where
    R: RandomAccess + ?Sized,
    W: Write + ?Sized,
{
    let total = source.byte_len()?;
    let iv_len = params.iv_len() as u64;
    let key_len = params.key_len() as u64;
    let block = params.block_len() as u64;

    if total < iv_len + key_len {
        return Err(AontError::Format("cannot read final block".into()));
    }
    let databytes = total - key_len;
    let cipher_len = databytes - iv_len;
    if cipher_len == 0 || cipher_len % block != 0 {
        debug!(total, "ciphertext region has an impossible length");
        return Err(AontError::Integrity);
    }

    // Pass 1: hash everything up to the key, then recover it
    seek_to(source, 0)?;
    let mut iv = vec![0u8; params.iv_len()];
    source.read_exact(&mut iv)?;

    let mut hasher = StreamHasher::new(params.hash);
    hasher.update(&iv);
    let mut buf = Zeroizing::new(vec![0u8; BUF_SIZE]);
    let mut remaining = cipher_len;
    while remaining > 0 {
        let want = remaining.min(BUF_SIZE as u64) as usize;
        source.read_exact(&mut buf[..want])?;
        hasher.update(&buf[..want]);
        remaining -= want as u64;
    }
    let digest = hasher.finalize();

    let mut key = Zeroizing::new(vec![0u8; params.key_len()]);
    if read_full(source, &mut key)? != key.len() {
        return Err(AontError::Format("cannot read final block".into()));
    }
    xor_cyclic_in_place(&mut key, &digest);
    debug!(databytes, "pass 1 complete, key recovered");

    // Pass 2a: the final block must carry valid padding under this key
    let mut tail = Zeroizing::new([0u8; 2 * crate::params::BLOCK_LEN]);
    seek_to(source, databytes - 2 * block)?;
    source.read_exact(&mut tail[..])?;
    let (chain, last) = tail.split_at_mut(params.block_len());
    CbcDecryptor::new(params.key_size, &key, chain)?.decrypt_blocks(last);
    let pad = match padding_len(last) {
        Some(pad) => pad as u64,
        None => {
            debug!("pass 2 rejected the recovered key");
            return Err(AontError::Integrity);
        }
    };

    // Pass 2b: rewind and decrypt
    seek_to(source, iv_len)?;
    let mut decryptor = CbcDecryptor::new(params.key_size, &key, &iv)?;
    let mut remaining = cipher_len;
    let mut plaintext_bytes = 0u64;
    while remaining > 0 {
        let want = remaining.min(BUF_SIZE as u64) as usize;
        source.read_exact(&mut buf[..want])?;
        decryptor.decrypt_blocks(&mut buf[..want]);
        remaining -= want as u64;

        let keep = if remaining == 0 {
            want - pad as usize
        } else {
            want
        };
        sink.write_all(&buf[..keep])?;
        plaintext_bytes += keep as u64;
    }
    sink.flush()?;

    debug!(total, plaintext_bytes, params = %params, "reverse transform complete");

    Ok(UnTransformSummary {
        input_bytes: total,
        plaintext_bytes,
    })
}

fn seek_to<R: RandomAccess + ?Sized>(source: &mut R, offset: u64) -> Result<()> {
    source
        .seek(SeekFrom::Start(offset))
        .map_err(AontError::from_io)?;
    Ok(())
}
