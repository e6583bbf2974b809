pub mod cipher;
pub mod hasher;
pub mod transform;
pub mod untransform;

pub use cipher::*;
pub use hasher::*;
pub use transform::*;
pub use untransform::*;

use std::io::{self, Read};

/// Chunk size for streaming through the cipher; a multiple of the block size.
pub const BUF_SIZE: usize = 0x10000;

/// Read until `buf` is full or the source is exhausted.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
