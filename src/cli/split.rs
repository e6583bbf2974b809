use crate::cli::{discard_output, open_sink, open_source, STDIO};
use crate::error::{AontError, Result};
use crate::parts::{PartReader, PartWriter};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Options for verbatim splitting
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitOptions {
    /// Part count, 0 = not given
    pub number: usize,
    /// Part size in bytes, 0 = not given
    pub size: u64,
}

impl SplitOptions {
    /// Resolve the part size, dividing the input evenly when only a count
    /// was given.
    pub fn part_size(&self, input_len: Option<u64>) -> Result<u64> {
        if self.size != 0 || self.number == 0 {
            return Ok(self.size);
        }
        let len = input_len.ok_or_else(|| {
            AontError::Config("a part count without a part size needs a file input".into())
        })?;
        Ok(len.div_ceil(self.number as u64).max(1))
    }
}

/// Copy `input` byte for byte into parts named by `template`.
pub fn split_file(input: &str, template: &str, options: &SplitOptions) -> Result<Vec<PathBuf>> {
    let input_len = if input == STDIO {
        None
    } else {
        Some(std::fs::metadata(input)?.len())
    };
    let size = options.part_size(input_len)?;

    let mut source = open_source(input)?;
    let mut writer = PartWriter::new(template, options.number, size)?;
    let copied = io::copy(&mut source, &mut writer)?;
    let parts = writer.finish()?;

    info!(input, bytes = copied, parts = parts.len(), "split");
    Ok(parts)
}

/// Concatenate `inputs` in the given order into `output` (`-` = stdout).
pub fn join_files<P: AsRef<Path>>(inputs: &[P], output: &str) -> Result<u64> {
    let mut reader = PartReader::open(inputs)?;
    let mut sink = open_sink(output)?;
    let copied = match io::copy(&mut reader, &mut sink).and_then(|n| sink.flush().map(|_| n)) {
        Ok(n) => n,
        Err(e) => {
            drop(sink);
            discard_output(output);
            return Err(e.into());
        }
    };

    info!(parts = inputs.len(), output, bytes = copied, "joined");
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_part_size_from_count() {
        let opts = SplitOptions {
            number: 3,
            size: 0,
        };
        assert_eq!(opts.part_size(Some(100)).unwrap(), 34);
        assert_eq!(opts.part_size(Some(0)).unwrap(), 1);
        assert!(matches!(opts.part_size(None), Err(AontError::Config(_))));

        let explicit = SplitOptions {
            number: 3,
            size: 10,
        };
        assert_eq!(explicit.part_size(None).unwrap(), 10);
    }

    #[test]
    fn test_split_then_join_is_identity() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("blob");
        let data: Vec<u8> = (0..1000u32).map(|i| (i % 253) as u8).collect();
        std::fs::write(&input, &data).unwrap();

        let template = dir.path().join("blob.{}").to_string_lossy().into_owned();
        let opts = SplitOptions {
            number: 0,
            size: 300,
        };
        let parts = split_file(&input.to_string_lossy(), &template, &opts).unwrap();
        assert_eq!(parts.len(), 4);
        assert_eq!(std::fs::metadata(&parts[3]).unwrap().len(), 100);

        let output = dir.path().join("joined");
        let copied = join_files(&parts, &output.to_string_lossy()).unwrap();
        assert_eq!(copied, 1000);
        assert_eq!(std::fs::read(&output).unwrap(), data);
    }

    #[test]
    fn test_split_by_count_only() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("blob");
        std::fs::write(&input, vec![5u8; 101]).unwrap();

        let template = dir.path().join("p*").to_string_lossy().into_owned();
        let opts = SplitOptions { number: 4, size: 0 };
        let parts = split_file(&input.to_string_lossy(), &template, &opts).unwrap();
        let sizes: Vec<u64> = parts
            .iter()
            .map(|p| std::fs::metadata(p).unwrap().len())
            .collect();
        assert_eq!(sizes, [26, 26, 26, 23]);
    }
}
