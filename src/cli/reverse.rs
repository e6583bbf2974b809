use crate::cli::{discard_output, open_sink, STDIO};
use crate::engine::{untransform, UnTransformSummary};
use crate::error::{AontError, Result};
use crate::naming::expand_all;
use crate::params::Params;
use crate::parts::PartReader;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Options for the reverse command
#[derive(Debug, Clone, Copy, Default)]
pub struct ReverseOptions {
    pub params: Params,
}

/// Suffix that replaces `.partN` when the output name is derived
pub const RESTORED_SUFFIX: &str = ".restored";

/// Split the reverse arguments into an ordered input list and an output name.
///
/// One argument: it is expanded and the output is derived from the first
/// match. Two or more: the last argument is the output.
pub fn resolve_reverse_args<S: AsRef<str>>(args: &[S]) -> Result<(Vec<PathBuf>, String)> {
    let (patterns, output) = match args {
        [] => return Err(AontError::Config("no input files given".into())),
        [single] => (std::slice::from_ref(single), None),
        [inputs @ .., last] => (inputs, Some(last.as_ref().to_string())),
    };

    if patterns.iter().any(|p| p.as_ref() == STDIO) {
        return Err(AontError::Config(
            "reverse needs a seekable input and cannot read standard input".into(),
        ));
    }

    let inputs = expand_all(patterns)?;
    let output = match output {
        Some(output) => output,
        None => derive_output_name(&inputs[0])?,
    };

    if output != STDIO && output.contains(".part") && Path::new(&output).exists() {
        return Err(AontError::Config(format!(
            "refusing to overwrite {}; was the output argument forgotten?",
            output
        )));
    }

    Ok((inputs, output))
}

/// `name.bin.part1` -> `name.bin.restored`
pub fn derive_output_name(first: &Path) -> Result<String> {
    let name = first.to_string_lossy();
    match name.rfind(".part") {
        Some(idx) => Ok(format!("{}{}", &name[..idx], RESTORED_SUFFIX)),
        None => Err(AontError::Config(format!(
            "cannot derive an output name from {}; give one explicitly",
            name
        ))),
    }
}

/// Reverse the transform held in `inputs` (concatenated in the given order)
/// into `output` (`-` = stdout). A failed reversal leaves no output file.
pub fn reverse_files<P: AsRef<Path>>(
    inputs: &[P],
    output: &str,
    options: &ReverseOptions,
) -> Result<UnTransformSummary> {
    if inputs.is_empty() {
        return Err(AontError::Config("no input files given".into()));
    }

    let mut sink = open_sink(output)?;
    let result = if let [single] = inputs {
        File::open(single.as_ref())
            .map_err(AontError::from)
            .and_then(|mut source| untransform(&mut source, &mut sink, &options.params))
    } else {
        PartReader::open(inputs)
            .and_then(|mut source| untransform(&mut source, &mut sink, &options.params))
    };
    drop(sink);

    match result {
        Ok(summary) => {
            info!(
                parts = inputs.len(),
                output,
                plaintext_bytes = summary.plaintext_bytes,
                "reversed"
            );
            Ok(summary)
        }
        Err(e) => {
            discard_output(output);
            Err(e)
        }
    }
}
