//! AONT - All-Or-Nothing Transform with multi-part file splitting
//!
//! Transforms a plaintext into a package that can only be inverted once
//! every byte of it is present, then optionally spreads that package over
//! several files. Holding some of the parts reveals nothing useful.
//!
//! ## Wire Format
//!
//! ```text
//! IV (16) || AES-CBC ciphertext (ISO 10126 padding) || Key XOR cyclic(Hash(IV || Ciphertext))
//! ```
//!
//! The key is random and never stored in the clear. Reversal hashes the
//! whole package to unmangle it, so a missing, corrupt or reordered byte
//! yields a wrong key and the reversal fails before any plaintext is written.
//!
//! - **engine**: streaming transform and two-pass reverse transform
//! - **parts**: `PartWriter` (split) and `PartReader` (join, seekable)
//! - **naming**: part templates, wildcard expansion, natural ordering
//! - **params**: cipher key size and hash selection
//!
//! ## Example
//!
//! ```no_run
//! use aont::cli::{reverse_files, transform_file, ReverseOptions, TransformOptions};
//!
//! // Transform into three parts
//! let options = TransformOptions {
//!     number: 3,
//!     ..Default::default()
//! };
//! let report = transform_file("secret.pdf", None, &options).unwrap();
//!
//! // All three parts are needed to get it back
//! reverse_files(&report.outputs, "secret.pdf.restored", &ReverseOptions::default()).unwrap();
//! ```

pub mod cli;
pub mod engine;
pub mod error;
pub mod naming;
pub mod params;
pub mod parts;

pub use engine::{transform, untransform, RandomAccess, TransformSummary, UnTransformSummary};
pub use error::{AontError, Result};
pub use params::{HashAlgorithm, KeySize, Params};
pub use parts::{PartReader, PartWriter};
