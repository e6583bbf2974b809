use crate::cli::{discard_output, open_sink, open_source, STDIO};
use crate::engine::{transform, TransformSummary};
use crate::error::{AontError, Result};
use crate::params::Params;
use crate::parts::PartWriter;
use std::path::PathBuf;
use tracing::info;

/// Options for the transform command
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// Requested part count, 0 = not given
    pub number: usize,
    /// Requested part size in bytes, 0 = not given
    pub size: u64,
    pub params: Params,
}

/// Resolved destination of a transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
    Parts {
        template: String,
        number: usize,
        size: u64,
    },
}

/// Result of [`transform_file`]
#[derive(Debug, Clone)]
pub struct TransformReport {
    pub summary: TransformSummary,
    pub target: OutputTarget,
    /// Files written; empty when the output went to stdout
    pub outputs: Vec<PathBuf>,
}

/// Decide where the transformed stream goes.
///
/// `input_len` is needed only when a part count is given without a size,
/// so the size can be derived from the expected output length.
pub fn plan_output(
    input: &str,
    output: Option<&str>,
    options: &TransformOptions,
    input_len: Option<u64>,
) -> Result<OutputTarget> {
    let mut number = options.number;
    let mut size = options.size;
    if size == 0 {
        if number != 0 {
            let len = input_len.ok_or_else(|| {
                AontError::Config(
                    "a part count without a part size needs a file input of known length".into(),
                )
            })?;
            size = options.params.estimate_part_size(len, number)?;
        } else {
            number = 1;
        }
    }

    let to_stdout = output == Some(STDIO) || (output.is_none() && input == STDIO);
    if to_stdout {
        if number != 1 {
            return Err(AontError::Config(
                "cannot split output written to standard output".into(),
            ));
        }
        return Ok(OutputTarget::Stdout);
    }

    let target = match (output, number) {
        (None, 1) => OutputTarget::File(PathBuf::from(format!("{}.aont", input))),
        (None, _) => OutputTarget::Parts {
            template: format!("{}.part*", input),
            number,
            size,
        },
        (Some(out), 1) => OutputTarget::File(PathBuf::from(out)),
        (Some(out), _) => OutputTarget::Parts {
            template: out.to_string(),
            number,
            size,
        },
    };
    Ok(target)
}

/// Transform `input` (`-` = stdin) into a file, stdout, or a set of parts.
pub fn transform_file(
    input: &str,
    output: Option<&str>,
    options: &TransformOptions,
) -> Result<TransformReport> {
    let input_len = if input == STDIO {
        None
    } else {
        Some(std::fs::metadata(input)?.len())
    };
    let target = plan_output(input, output, options, input_len)?;
    let mut source = open_source(input)?;

    let (summary, outputs) = match &target {
        OutputTarget::Stdout => {
            let mut sink = open_sink(STDIO)?;
            (transform(&mut source, &mut sink, &options.params)?, Vec::new())
        }
        OutputTarget::File(path) => {
            let name = path.to_string_lossy();
            let mut sink = open_sink(&name)?;
            match transform(&mut source, &mut sink, &options.params) {
                Ok(summary) => (summary, vec![path.clone()]),
                Err(e) => {
                    drop(sink);
                    discard_output(&name);
                    return Err(e);
                }
            }
        }
        OutputTarget::Parts {
            template,
            number,
            size,
        } => {
            let mut writer = PartWriter::new(template, *number, *size)?;
            let summary = transform(&mut source, &mut writer, &options.params)?;
            (summary, writer.finish()?)
        }
    };

    info!(
        input,
        plaintext_bytes = summary.plaintext_bytes,
        output_bytes = summary.output_bytes,
        parts = outputs.len(),
        "transformed"
    );

    Ok(TransformReport {
        summary,
        target,
        outputs,
    })
}
