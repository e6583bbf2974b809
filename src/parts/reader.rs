use crate::engine::RandomAccess;
use crate::error::{AontError, Result};
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only view of an ordered list of files as one byte stream.
///
/// The order is taken as given. Only absolute seeks are supported; they are
/// resolved through a table of cumulative part lengths.
#[derive(Debug)]
pub struct PartReader {
    paths: Vec<PathBuf>,
    /// `cumulative[i]` = total length of parts `0..=i`
    cumulative: Vec<u64>,
    index: usize,
    file: Option<File>,
    pos: u64,
}

impl PartReader {
    /// Open `paths` as one stream, positioned at offset 0.
    pub fn open<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            return Err(AontError::Config("no input files to join".into()));
        }

        let paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        let mut cumulative = Vec::with_capacity(paths.len());
        let mut total = 0u64;
        for path in &paths {
            total += fs::metadata(path)?.len();
            cumulative.push(total);
        }
        let file = File::open(&paths[0])?;
        debug!(parts = paths.len(), total, "joined part set");

        Ok(Self {
            paths,
            cumulative,
            index: 0,
            file: Some(file),
            pos: 0,
        })
    }

    /// Total length of the concatenation
    pub fn len(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Logical position within the concatenation
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Index of the part currently open
    pub fn current_part(&self) -> usize {
        self.index
    }

    pub fn parts(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Map a logical offset to `(part index, offset within that part)`.
    pub fn locate(&self, offset: u64) -> Result<(usize, u64)> {
        let total = self.len();
        if offset >= total {
            return Err(AontError::Range { offset, total });
        }
        let index = self.cumulative.partition_point(|&end| end <= offset);
        let start = if index == 0 {
            0
        } else {
            self.cumulative[index - 1]
        };
        Ok((index, offset - start))
    }

    /// Seek to an absolute logical offset.
    pub fn seek_to(&mut self, offset: u64) -> Result<u64> {
        let (index, local) = self.locate(offset)?;
        if index != self.index || self.file.is_none() {
            self.switch_to(index)?;
        }
        if let Some(file) = self.file.as_mut() {
            file.seek(SeekFrom::Start(local))?;
        }
        self.pos = offset;
        Ok(offset)
    }

    /// Close the current part, then open part `index` at its start.
    fn switch_to(&mut self, index: usize) -> io::Result<()> {
        self.file = None;
        let path = &self.paths[index];
        debug!(part = index, path = %path.display(), "switching part");
        self.file = Some(File::open(path)?);
        self.index = index;
        Ok(())
    }
}

impl Read for PartReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            let file = match self.file.as_mut() {
                Some(file) => file,
                None => break,
            };
            let n = match file.read(&mut buf[total..]) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if n == 0 {
                if self.index + 1 >= self.paths.len() {
                    break;
                }
                self.switch_to(self.index + 1)?;
                continue;
            }
            total += n;
            self.pos += n as u64;
        }
        Ok(total)
    }
}

impl Seek for PartReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match pos {
            SeekFrom::Start(offset) => self.seek_to(offset).map_err(AontError::into_io),
            _ => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "part reader only supports absolute seeks",
            )),
        }
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }
}

impl RandomAccess for PartReader {
    fn byte_len(&mut self) -> io::Result<u64> {
        Ok(self.len())
    }
}
