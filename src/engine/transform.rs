use crate::engine::cipher::{fill_padding, CbcEncryptor};
use crate::engine::hasher::{xor_cyclic_in_place, StreamHasher};
use crate::engine::{read_full, BUF_SIZE};
use crate::error::Result;
use crate::params::Params;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::io::{Read, Write};
use tracing::debug;
use zeroize::Zeroizing;

/// Byte counts from one forward transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformSummary {
    pub plaintext_bytes: u64,
    pub output_bytes: u64,
}

/// Apply the all-or-nothing transform to everything `source` yields.
///
/// Writes `IV || Ciphertext || MangledKey` to `sink` and flushes it. Key and
/// IV are drawn fresh from the OS RNG; nothing is kept between calls.
pub fn transform<R, W>(source: &mut R, sink: &mut W, params: &Params) -> Result<TransformSummary>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    transform_with_rng(source, sink, params, &mut OsRng)
}

/// [`transform`] with a caller-supplied RNG for key, IV and padding bytes
pub fn transform_with_rng<R, W, G>(
    source: &mut R,
    sink: &mut W,
    params: &Params,
    rng: &mut G,
) -> Result<TransformSummary>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    G: RngCore + CryptoRng + ?Sized,
{
    let mut key = Zeroizing::new(vec![0u8; params.key_len()]);
    rng.fill_bytes(&mut key);
    let mut iv = vec![0u8; params.iv_len()];
    rng.fill_bytes(&mut iv);

    let mut encryptor = CbcEncryptor::new(params.key_size, &key, &iv)?;
    let mut hasher = StreamHasher::new(params.hash);

    sink.write_all(&iv)?;
    hasher.update(&iv);
    let mut output_bytes = iv.len() as u64;
    let mut plaintext_bytes = 0u64;

    // Room for one extra block so the padding fits after a short final read
    let mut buf = Zeroizing::new(vec![0u8; BUF_SIZE + params.block_len()]);
    loop {
        let n = read_full(source, &mut buf[..BUF_SIZE])?;
        plaintext_bytes += n as u64;

        let last = n < BUF_SIZE;
        let len = if last {
            let pad = params.pad_len(n as u64) as usize;
            fill_padding(rng, &mut buf[n..n + pad]);
            n + pad
        } else {
            n
        };

        encryptor.encrypt_blocks(&mut buf[..len]);
        sink.write_all(&buf[..len])?;
        hasher.update(&buf[..len]);
        output_bytes += len as u64;

        if last {
            break;
        }
    }

    let digest = hasher.finalize();
    let mut mangled = key.to_vec();
    xor_cyclic_in_place(&mut mangled, &digest);
    sink.write_all(&mangled)?;
    output_bytes += mangled.len() as u64;
    sink.flush()?;

    debug!(
        plaintext_bytes,
        output_bytes,
        params = %params,
        "transform complete"
    );

    Ok(TransformSummary {
        plaintext_bytes,
        output_bytes,
    })
}
