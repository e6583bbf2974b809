pub mod info;
pub mod list;
pub mod reverse;
pub mod split;
pub mod transform;

pub use info::*;
pub use list::*;
pub use reverse::*;
pub use split::*;
pub use transform::*;

use crate::error::{AontError, Result};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

/// Name that stands for standard input or output
pub const STDIO: &str = "-";

/// Parse a size such as `4096`, `64k`, `1.5m` or `2g` (powers of 1024).
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u64>() {
        return Ok(n);
    }

    let invalid = || AontError::Config(format!("not a valid size: {}", s));
    let suffix = s.chars().last().ok_or_else(invalid)?;
    let exponent = "kmgtp"
        .find(suffix.to_ascii_lowercase())
        .ok_or_else(invalid)?;
    let mantissa: f64 = s[..s.len() - suffix.len_utf8()]
        .parse()
        .map_err(|_| invalid())?;
    if !mantissa.is_finite() || mantissa < 0.0 {
        return Err(invalid());
    }

    let multiplier = 1024f64.powi(exponent as i32 + 1);
    Ok((mantissa * multiplier) as u64)
}

/// Part count and size only make sense when producing parts.
pub fn reject_split_options(mode: &str, number: Option<usize>, size: Option<u64>) -> Result<()> {
    if number.is_some() || size.is_some() {
        return Err(AontError::Config(format!(
            "part count and part size may only be given when transforming or splitting, not in {} mode",
            mode
        )));
    }
    Ok(())
}

/// Open a byte source; `-` is standard input.
pub(crate) fn open_source(name: &str) -> Result<Box<dyn Read>> {
    if name == STDIO {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(File::open(name)?))
    }
}

/// Open a plain sink; `-` is standard output.
pub(crate) fn open_sink(name: &str) -> Result<Box<dyn Write>> {
    if name == STDIO {
        Ok(Box::new(io::stdout().lock()))
    } else {
        Ok(Box::new(BufWriter::new(File::create(name)?)))
    }
}

/// Remove a partially written output file after a failure.
pub(crate) fn discard_output(name: &str) {
    if name != STDIO && Path::new(name).exists() {
        if let Err(e) = std::fs::remove_file(name) {
            tracing::warn!(path = name, error = %e, "could not remove incomplete output");
        }
    }
}

/// Human readable byte count
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {} ({} bytes)", value, UNITS[unit], bytes)
    }
}
