use crate::error::{AontError, Result};
use crate::naming::PartTemplate;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::debug;

/// Write-only stream that fans its bytes out over numbered part files.
///
/// Part 1 is created on the first byte written. A part is closed and the
/// next one opened once it holds `size` bytes, until `number` parts exist;
/// from then on the last part takes everything that remains.
pub struct PartWriter {
    template: PartTemplate,
    /// Maximum number of parts, 0 = uncapped
    number: usize,
    /// Nominal part size, `u64::MAX` when unbounded
    size: u64,
    current: Option<BufWriter<File>>,
    /// Bytes written to the current part
    current_size: u64,
    created: Vec<PathBuf>,
}

impl PartWriter {
    /// Create a writer over `template`.
    ///
    /// `number == 0` leaves the part count uncapped; `size == 0` means one
    /// unbounded part. When more than one part can result, the template
    /// needs exactly one placeholder.
    pub fn new(template: &str, number: usize, size: u64) -> Result<Self> {
        let size = if size == 0 { u64::MAX } else { size };
        let multi = number > 1 || (number == 0 && size != u64::MAX);
        let template = PartTemplate::parse(template);
        if multi && template.placeholders() != 1 {
            return Err(AontError::Config(format!(
                "filename template {} needs exactly one `*` or `{{}}` placeholder",
                template
            )));
        }

        Ok(Self {
            template,
            number,
            size,
            current: None,
            current_size: 0,
            created: Vec::new(),
        })
    }

    /// Paths of the parts opened so far
    pub fn parts(&self) -> &[PathBuf] {
        &self.created
    }

    fn may_open_another(&self) -> bool {
        self.number == 0 || self.created.len() < self.number
    }

    /// Ensure the current part still has room, opening the next one if not.
    fn ensure_room(&mut self) -> io::Result<()> {
        let needs_next = match self.current {
            None => true,
            Some(_) => self.current_size >= self.size && self.may_open_another(),
        };
        if needs_next {
            if let Some(mut done) = self.current.take() {
                done.flush()?;
            }
            let path = self.template.path_for(self.created.len() + 1);
            debug!(part = self.created.len() + 1, path = %path.display(), "opening part");
            let file = File::create(&path)?;
            self.current = Some(BufWriter::new(file));
            self.created.push(path);
            self.current_size = 0;
        }
        Ok(())
    }

    /// Flush and close the last part, returning every part path.
    ///
    /// Creates an empty part 1 when nothing was written so the output can
    /// still be joined.
    pub fn finish(mut self) -> Result<Vec<PathBuf>> {
        if self.current.is_none() {
            self.ensure_room()?;
        }
        if let Some(mut last) = self.current.take() {
            last.flush()?;
        }
        Ok(std::mem::take(&mut self.created))
    }
}

impl Write for PartWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            self.ensure_room()?;
            let left = buf.len() - written;
            // The last allowed part grows past `size`, so room only counts
            // while another part may follow
            let chunk = if self.may_open_another() {
                let room = self.size.saturating_sub(self.current_size);
                if room < left as u64 {
                    room as usize
                } else {
                    left
                }
            } else {
                left
            };
            let file = match self.current.as_mut() {
                Some(file) => file,
                None => return Err(io::Error::other("no part open")),
            };
            file.write_all(&buf[written..written + chunk])?;
            self.current_size += chunk as u64;
            written += chunk;
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.current.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn template_in(dir: &tempfile::TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn test_single_unbounded_part() {
        let dir = tempdir().unwrap();
        let mut writer = PartWriter::new(&template_in(&dir, "out.bin"), 0, 0).unwrap();
        writer.write_all(&[1u8; 1000]).unwrap();
        let parts = writer.finish().unwrap();
        assert_eq!(parts, vec![dir.path().join("out.bin")]);
        assert_eq!(std::fs::read(&parts[0]).unwrap().len(), 1000);
    }

    #[test]
    fn test_splits_by_size_uncapped() {
        let dir = tempdir().unwrap();
        let mut writer = PartWriter::new(&template_in(&dir, "p*.bin"), 0, 10).unwrap();
        writer.write_all(&[7u8; 25]).unwrap();
        let parts = writer.finish().unwrap();
        let sizes: Vec<usize> = parts
            .iter()
            .map(|p| std::fs::read(p).unwrap().len())
            .collect();
        assert_eq!(sizes, vec![10, 10, 5]);
        assert_eq!(parts[2], dir.path().join("p3.bin"));
    }

    #[test]
    fn test_last_part_absorbs_overflow() {
        let dir = tempdir().unwrap();
        let mut writer = PartWriter::new(&template_in(&dir, "p{}.bin"), 2, 10).unwrap();
        for _ in 0..5 {
            writer.write_all(&[3u8; 7]).unwrap();
        }
        let parts = writer.finish().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(std::fs::read(&parts[0]).unwrap().len(), 10);
        assert_eq!(std::fs::read(&parts[1]).unwrap().len(), 25);
    }

    #[test]
    fn test_writes_after_cap_reached_go_to_last_part() {
        let dir = tempdir().unwrap();
        let mut writer = PartWriter::new(&template_in(&dir, "p*"), 2, 10).unwrap();
        writer.write_all(&[1u8; 25]).unwrap();
        writer.write_all(&[2u8; 1]).unwrap();
        writer.write_all(&[3u8; 40]).unwrap();
        let parts = writer.finish().unwrap();
        assert_eq!(parts.len(), 2);

        let last = std::fs::read(&parts[1]).unwrap();
        assert_eq!(last.len(), 56);
        assert_eq!(&last[..15], &[1u8; 15]);
        assert_eq!(last[15], 2);
        assert!(last[16..].iter().all(|&b| b == 3));
    }

    #[test]
    fn test_write_spanning_boundaries_keeps_order() {
        let dir = tempdir().unwrap();
        let data: Vec<u8> = (0..=255).collect();
        let mut writer = PartWriter::new(&template_in(&dir, "s*"), 0, 100).unwrap();
        writer.write_all(&data).unwrap();
        let parts = writer.finish().unwrap();
        assert_eq!(parts.len(), 3);
        let joined: Vec<u8> = parts
            .iter()
            .flat_map(|p| std::fs::read(p).unwrap())
            .collect();
        assert_eq!(joined, data);
    }

    #[test]
    fn test_lazy_open_and_empty_finish() {
        let dir = tempdir().unwrap();
        let writer = PartWriter::new(&template_in(&dir, "e*"), 3, 10).unwrap();
        assert!(writer.parts().is_empty());
        assert!(!dir.path().join("e1").exists());
        let parts = writer.finish().unwrap();
        assert_eq!(parts, vec![dir.path().join("e1")]);
        assert_eq!(std::fs::read(&parts[0]).unwrap().len(), 0);
    }

    #[test]
    fn test_template_without_placeholder_rejected_for_many_parts() {
        let dir = tempdir().unwrap();
        let result = PartWriter::new(&template_in(&dir, "plain.bin"), 3, 10);
        assert!(matches!(result, Err(AontError::Config(_))));
        let result = PartWriter::new(&template_in(&dir, "plain.bin"), 0, 10);
        assert!(matches!(result, Err(AontError::Config(_))));
        // A count above one needs numbering even without a size
        let result = PartWriter::new(&template_in(&dir, "plain.bin"), 3, 0);
        assert!(matches!(result, Err(AontError::Config(_))));
        assert!(PartWriter::new(&template_in(&dir, "plain.bin"), 1, 10).is_ok());
    }

    #[test]
    fn test_template_with_two_placeholders_rejected() {
        let dir = tempdir().unwrap();
        let result = PartWriter::new(&template_in(&dir, "a*b*"), 3, 10);
        assert!(matches!(result, Err(AontError::Config(_))));
    }

    #[test]
    fn test_single_part_with_placeholder_is_numbered() {
        let dir = tempdir().unwrap();
        let mut writer = PartWriter::new(&template_in(&dir, "one.part*"), 1, 10).unwrap();
        writer.write_all(&[0u8; 50]).unwrap();
        let parts = writer.finish().unwrap();
        assert_eq!(parts, vec![dir.path().join("one.part1")]);
        assert_eq!(std::fs::read(&parts[0]).unwrap().len(), 50);
    }
}
