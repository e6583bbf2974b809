use crate::cli::format_size;
use crate::error::{AontError, Result};
use crate::params::Params;
use crate::parts::PartReader;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// One input file of a transformed stream
#[derive(Debug, Clone, Serialize)]
pub struct PartEntry {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Layout of a transformed stream as seen by the reverse transform
#[derive(Debug, Clone, Serialize)]
pub struct StreamInfo {
    pub parts: Vec<PartEntry>,
    pub total_bytes: u64,
    pub params: Params,
    /// Hex of the leading IV
    pub iv: String,
    pub ciphertext_bytes: u64,
    pub key_bytes: u64,
    /// Ciphertext region is non-empty and block aligned
    pub well_formed: bool,
}

/// Inspect `inputs` (in order) without recovering the key.
pub fn stream_info<P: AsRef<Path>>(inputs: &[P], params: &Params) -> Result<StreamInfo> {
    let mut reader = PartReader::open(inputs)?;
    let total_bytes = reader.len();
    let iv_len = params.iv_len() as u64;
    let key_bytes = params.key_len() as u64;
    if total_bytes < iv_len + key_bytes {
        return Err(AontError::Format("cannot read final block".into()));
    }

    let mut iv = vec![0u8; params.iv_len()];
    reader.read_exact(&mut iv)?;

    let parts = inputs
        .iter()
        .map(|p| -> Result<PartEntry> {
            Ok(PartEntry {
                path: p.as_ref().to_path_buf(),
                bytes: std::fs::metadata(p)?.len(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let ciphertext_bytes = total_bytes - iv_len - key_bytes;
    let block = params.block_len() as u64;

    Ok(StreamInfo {
        parts,
        total_bytes,
        params: *params,
        iv: hex::encode(iv),
        ciphertext_bytes,
        key_bytes,
        well_formed: ciphertext_bytes != 0 && ciphertext_bytes % block == 0,
    })
}

/// Render [`StreamInfo`] as text, or as JSON when `json` is set.
pub fn show_info<P: AsRef<Path>>(inputs: &[P], params: &Params, json: bool) -> Result<String> {
    let info = stream_info(inputs, params)?;
    if json {
        return Ok(serde_json::to_string_pretty(&info)?);
    }

    let mut output = String::new();
    output.push_str("AONT Stream Information\n");
    output.push_str("=======================\n\n");

    output.push_str(&format!("Parts ({}):\n", info.parts.len()));
    for part in &info.parts {
        output.push_str(&format!("  {}  {}\n", part.path.display(), format_size(part.bytes)));
    }
    output.push('\n');

    output.push_str("Layout:\n");
    output.push_str(&format!("  Parameters: {}\n", info.params));
    output.push_str(&format!("  Total: {}\n", format_size(info.total_bytes)));
    output.push_str(&format!("  IV: {}\n", info.iv));
    output.push_str(&format!("  Ciphertext: {}\n", format_size(info.ciphertext_bytes)));
    output.push_str(&format!("  Mangled key: {} bytes\n", info.key_bytes));
    if !info.well_formed {
        output.push_str("\n  Ciphertext length is not block aligned; parts are missing or extra.\n");
    }

    Ok(output)
}
